//! SQLite backend.
//!
//! Serves the [`Backend`] operations from a lazily built r2d2 pool. The pool
//! lives behind a lock so [`Backend::dispose_engine`] can drop it; the next
//! operation builds a fresh one from the same configuration.

use octopunch_common::{DatabaseConfig, Error, RequestContext, Result, VcenterId};
use parking_lot::RwLock;

use crate::backend::Backend;
use crate::migrations;
use crate::models::{NewVcenter, VcenterFilters, VcenterInfo, VcenterUpdate};
use crate::pool::{build_pool, build_pool_counted, get_conn, open_pool, DbPool, PooledConnection};
use crate::queries::vcenters;

const ENGINE_NAME: &str = "sqlite";

/// Relational backend on SQLite.
pub struct SqliteBackend {
    config: DatabaseConfig,
    pool: RwLock<Option<DbPool>>,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("connection", &self.config.connection)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl SqliteBackend {
    /// Create a backend without opening any connection yet.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    /// Create a backend and build its pool immediately, surfacing
    /// connection and migration errors up front.
    pub fn connect(config: DatabaseConfig) -> Result<Self> {
        let backend = Self::new(config);
        backend.pool()?;
        Ok(backend)
    }

    /// Whether a pool is currently established.
    pub fn is_connected(&self) -> bool {
        self.pool.read().is_some()
    }

    /// Current pool, building it if it was never created or was disposed.
    pub fn pool(&self) -> Result<DbPool> {
        if let Some(pool) = self.pool.read().as_ref() {
            return Ok(pool.clone());
        }

        let mut guard = self.pool.write();
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }
        let pool = build_pool(&self.config)?;
        *guard = Some(pool.clone());
        Ok(pool)
    }

    fn conn(&self) -> Result<PooledConnection> {
        get_conn(&self.pool()?)
    }

    /// Apply pending schema migrations, returning how many ran.
    ///
    /// Building the pool migrates as well, so the count covers whichever of
    /// the two did the work.
    pub fn sync_schema(&self) -> Result<usize> {
        let mut guard = self.pool.write();
        if let Some(pool) = guard.as_ref() {
            return Ok(migrations::run_migrations(&*get_conn(pool)?)?);
        }
        let (pool, applied) = build_pool_counted(&self.config)?;
        *guard = Some(pool);
        Ok(applied)
    }

    /// Schema version recorded in the database. Never migrates.
    pub fn schema_version(&self) -> Result<usize> {
        let pool = match self.pool.read().as_ref() {
            Some(pool) => pool.clone(),
            None => open_pool(&self.config)?,
        };
        Ok(migrations::current_version(&*get_conn(&pool)?)?)
    }
}

impl Backend for SqliteBackend {
    fn engine_name(&self) -> &str {
        ENGINE_NAME
    }

    fn dispose_engine(&self) -> Result<()> {
        if self.pool.write().take().is_some() {
            tracing::info!(connection = %self.config.connection, "Disposed database pool");
        }
        Ok(())
    }

    fn vcenter_get_all(
        &self,
        context: &RequestContext,
        filters: Option<&VcenterFilters>,
    ) -> Result<Vec<VcenterInfo>> {
        tracing::debug!(request_id = %context.request_id, ?filters, "vcenter_get_all");
        let conn = self.conn()?;
        vcenters::list_vcenters(&conn, filters.unwrap_or(&VcenterFilters::default()))
    }

    fn vcenter_get(&self, context: &RequestContext, id: VcenterId) -> Result<VcenterInfo> {
        tracing::debug!(request_id = %context.request_id, vcenter_id = %id, "vcenter_get");
        let conn = self.conn()?;
        vcenters::get_vcenter(&conn, id)?.ok_or_else(|| Error::not_found("vcenter", id))
    }

    fn vcenter_create(
        &self,
        context: &RequestContext,
        values: &NewVcenter,
    ) -> Result<VcenterInfo> {
        let conn = self.conn()?;
        let vcenter = vcenters::create_vcenter(&conn, values)?;
        tracing::debug!(
            request_id = %context.request_id,
            vcenter_id = %vcenter.id,
            name = %vcenter.name,
            "vcenter_create"
        );
        Ok(vcenter)
    }

    fn vcenter_delete(&self, context: &RequestContext, id: VcenterId) -> Result<()> {
        tracing::debug!(request_id = %context.request_id, vcenter_id = %id, "vcenter_delete");
        let conn = self.conn()?;
        if !vcenters::delete_vcenter(&conn, id)? {
            return Err(Error::not_found("vcenter", id));
        }
        Ok(())
    }

    fn vcenter_update(
        &self,
        context: &RequestContext,
        id: VcenterId,
        body: Option<&VcenterUpdate>,
    ) -> Result<VcenterInfo> {
        tracing::debug!(request_id = %context.request_id, vcenter_id = %id, "vcenter_update");
        let conn = self.conn()?;
        vcenters::update_vcenter(&conn, id, body.unwrap_or(&VcenterUpdate::default()))
    }
}
