//! Octopunch-Common: shared types, configuration, and errors.
//!
//! - **Typed IDs**: [`VcenterId`] wraps the UUID that keys a vCenter record
//! - **Request context**: [`RequestContext`] carries caller scope through every call
//! - **Configuration**: [`Config`] and [`DatabaseConfig`] loaded from TOML
//! - **Error Handling**: common error type and result alias
//!
//! # Examples
//!
//! ```
//! use octopunch_common::{Config, Error, Result, VcenterId};
//!
//! let config = Config::default();
//! assert_eq!(config.database.connection, "octopunch.sqlite");
//!
//! fn lookup(id: VcenterId) -> Result<()> {
//!     Err(Error::not_found("vcenter", id))
//! }
//! assert!(lookup(VcenterId::new()).unwrap_err().is_not_found());
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod ids;

pub use config::{BackendKind, Config, DatabaseConfig};
pub use context::RequestContext;
pub use error::{Error, Result};
pub use ids::*;

/// The maximum value a signed 32-bit INT column may hold.
pub const MAX_INT: i64 = 0x7FFF_FFFF;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_int_matches_i32() {
        assert_eq!(MAX_INT, i64::from(i32::MAX));
    }
}
