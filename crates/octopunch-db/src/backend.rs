//! Backend interface and registry.
//!
//! A [`Backend`] implements the storage operations behind the
//! [`Database`](crate::api::Database) facade. Calls are blocking; the facade
//! decides which thread runs them.

use std::sync::Arc;

use octopunch_common::{BackendKind, DatabaseConfig, RequestContext, Result, VcenterId};

use crate::models::{NewVcenter, VcenterFilters, VcenterInfo, VcenterUpdate};
use crate::sqlite::SqliteBackend;

/// Engine-name marker of embedded stores whose pool must not be disposed
/// while the process runs.
pub const EMBEDDED_ENGINE_MARKER: &str = "sqlite";

/// Storage operations for vCenter records.
pub trait Backend: Send + Sync {
    /// Identifying name of the active engine (e.g. "sqlite").
    fn engine_name(&self) -> &str;

    /// Whether the connection pool can be torn down without losing data.
    ///
    /// Embedded engines answer `false` by default.
    fn supports_safe_dispose(&self) -> bool {
        !self.engine_name().contains(EMBEDDED_ENGINE_MARKER)
    }

    /// Drop the connection pool so the next call establishes new connections.
    fn dispose_engine(&self) -> Result<()>;

    fn vcenter_get_all(
        &self,
        context: &RequestContext,
        filters: Option<&VcenterFilters>,
    ) -> Result<Vec<VcenterInfo>>;

    /// Fails with `NotFound` when no record has this ID.
    fn vcenter_get(&self, context: &RequestContext, id: VcenterId) -> Result<VcenterInfo>;

    fn vcenter_create(&self, context: &RequestContext, values: &NewVcenter)
        -> Result<VcenterInfo>;

    /// Fails with `NotFound` when no record has this ID.
    fn vcenter_delete(&self, context: &RequestContext, id: VcenterId) -> Result<()>;

    /// Apply `body` (if any) and return the record. Fails with `NotFound`
    /// when no record has this ID.
    fn vcenter_update(
        &self,
        context: &RequestContext,
        id: VcenterId,
        body: Option<&VcenterUpdate>,
    ) -> Result<VcenterInfo>;
}

/// Resolve the configured backend kind to a connected implementation.
pub fn open_backend(config: &DatabaseConfig) -> Result<Arc<dyn Backend>> {
    match config.backend {
        BackendKind::Sqlite => Ok(Arc::new(SqliteBackend::connect(config.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopunch_common::Error;

    struct NamedEngine(&'static str);

    impl Backend for NamedEngine {
        fn engine_name(&self) -> &str {
            self.0
        }

        fn dispose_engine(&self) -> Result<()> {
            Ok(())
        }

        fn vcenter_get_all(
            &self,
            _context: &RequestContext,
            _filters: Option<&VcenterFilters>,
        ) -> Result<Vec<VcenterInfo>> {
            Ok(Vec::new())
        }

        fn vcenter_get(&self, _context: &RequestContext, id: VcenterId) -> Result<VcenterInfo> {
            Err(Error::not_found("vcenter", id))
        }

        fn vcenter_create(
            &self,
            _context: &RequestContext,
            _values: &NewVcenter,
        ) -> Result<VcenterInfo> {
            Err(Error::internal("read-only"))
        }

        fn vcenter_delete(&self, _context: &RequestContext, id: VcenterId) -> Result<()> {
            Err(Error::not_found("vcenter", id))
        }

        fn vcenter_update(
            &self,
            _context: &RequestContext,
            id: VcenterId,
            _body: Option<&VcenterUpdate>,
        ) -> Result<VcenterInfo> {
            Err(Error::not_found("vcenter", id))
        }
    }

    #[test]
    fn test_embedded_engines_are_not_safely_disposable() {
        assert!(!NamedEngine("sqlite").supports_safe_dispose());
        assert!(!NamedEngine("pysqlite").supports_safe_dispose());
        assert!(NamedEngine("mysql").supports_safe_dispose());
        assert!(NamedEngine("postgresql").supports_safe_dispose());
    }

    #[test]
    fn test_open_backend_sqlite() {
        let backend = open_backend(&DatabaseConfig::in_memory()).unwrap();
        assert_eq!(backend.engine_name(), "sqlite");
        assert!(!backend.supports_safe_dispose());
    }
}
