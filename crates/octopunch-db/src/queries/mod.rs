//! Database query modules.
//!
//! - vcenters: vCenter registration CRUD and filtered listing

pub mod vcenters;
