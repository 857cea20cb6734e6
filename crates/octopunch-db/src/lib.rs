//! Octopunch-DB: storage facade for vCenter registrations.
//!
//! The [`api::Database`] facade forwards every operation to a
//! [`backend::Backend`] selected from configuration. The SQLite backend uses
//! rusqlite with r2d2 connection pooling and embedded migrations.
//!
//! # Modules
//!
//! - `api` - The facade callers use
//! - `backend` - Backend trait and registry
//! - `sqlite` - SQLite backend
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use octopunch_common::{DatabaseConfig, RequestContext};
//! use octopunch_db::api::Database;
//! use octopunch_db::models::NewVcenter;
//!
//! # async fn demo() -> octopunch_common::Result<()> {
//! let db = Database::open(&DatabaseConfig::default())?;
//! let ctx = RequestContext::admin();
//!
//! let vc = db
//!     .vcenter_create(&ctx, NewVcenter::new("vc-east", "10.0.0.5", "admin", "secret"))
//!     .await?;
//! println!("Registered vCenter: {}", vc.id);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backend;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod sqlite;

pub use api::Database;
pub use octopunch_common::MAX_INT;
