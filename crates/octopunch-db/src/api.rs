//! Database facade.
//!
//! [`Database`] exposes the vCenter operations with stable signatures and
//! forwards each call to the backend chosen at construction. Results and
//! errors come back exactly as the backend produced them.
//!
//! Backend calls block, so by default each one runs on tokio's blocking
//! thread pool. With `use_tpool = false` they run inline on the calling task.

use std::sync::Arc;

use octopunch_common::{DatabaseConfig, Error, RequestContext, Result, VcenterId};

use crate::backend::{open_backend, Backend};
use crate::models::{NewVcenter, VcenterFilters, VcenterInfo, VcenterUpdate};

/// Handle to the configured storage backend.
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn Backend>,
    use_tpool: bool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("engine", &self.backend.engine_name())
            .field("use_tpool", &self.use_tpool)
            .finish()
    }
}

impl Database {
    /// Resolve the configured backend and connect to it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use octopunch_common::{DatabaseConfig, RequestContext};
    /// use octopunch_db::api::Database;
    ///
    /// # async fn demo() -> octopunch_common::Result<()> {
    /// let db = Database::open(&DatabaseConfig::file("/var/lib/octopunch/octopunch.sqlite"))?;
    /// let vcenters = db.vcenter_get_all(&RequestContext::admin(), None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let backend = open_backend(config)?;
        tracing::info!(
            backend = %config.backend,
            engine = backend.engine_name(),
            use_tpool = config.use_tpool,
            "Database backend selected"
        );
        Ok(Self {
            backend,
            use_tpool: config.use_tpool,
        })
    }

    /// Wrap an already constructed backend.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            use_tpool: true,
        }
    }

    /// Run backend calls inline instead of on the blocking thread pool.
    pub fn without_tpool(mut self) -> Self {
        self.use_tpool = false;
        self
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Name of the active engine.
    pub fn engine_name(&self) -> &str {
        self.backend.engine_name()
    }

    async fn run<T, F>(&self, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Backend) -> Result<T> + Send + 'static,
    {
        if !self.use_tpool {
            return call(self.backend.as_ref());
        }

        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || call(backend.as_ref()))
            .await
            .map_err(|e| Error::internal(format!("spawn_blocking join error: {e}")))?
    }

    /// Force the engine to establish new connections.
    ///
    /// Does nothing when the backend reports that disposing would lose data
    /// (embedded stores).
    pub async fn dispose_engine(&self) -> Result<()> {
        if !self.backend.supports_safe_dispose() {
            tracing::debug!(
                engine = self.backend.engine_name(),
                "Skipping dispose for embedded engine"
            );
            return Ok(());
        }
        self.run(|backend| backend.dispose_engine()).await
    }

    /// List vCenters, optionally restricted by `filters`.
    pub async fn vcenter_get_all(
        &self,
        context: &RequestContext,
        filters: Option<VcenterFilters>,
    ) -> Result<Vec<VcenterInfo>> {
        let context = context.clone();
        self.run(move |backend| backend.vcenter_get_all(&context, filters.as_ref()))
            .await
    }

    /// Get one vCenter.
    pub async fn vcenter_get(&self, context: &RequestContext, id: VcenterId) -> Result<VcenterInfo> {
        let context = context.clone();
        self.run(move |backend| backend.vcenter_get(&context, id)).await
    }

    /// Register a vCenter.
    pub async fn vcenter_create(
        &self,
        context: &RequestContext,
        values: NewVcenter,
    ) -> Result<VcenterInfo> {
        let context = context.clone();
        self.run(move |backend| backend.vcenter_create(&context, &values))
            .await
    }

    /// Delete a vCenter.
    pub async fn vcenter_delete(&self, context: &RequestContext, id: VcenterId) -> Result<()> {
        let context = context.clone();
        self.run(move |backend| backend.vcenter_delete(&context, id))
            .await
    }

    /// Update a vCenter with the fields present in `body`.
    pub async fn vcenter_update(
        &self,
        context: &RequestContext,
        id: VcenterId,
        body: Option<VcenterUpdate>,
    ) -> Result<VcenterInfo> {
        let context = context.clone();
        self.run(move |backend| backend.vcenter_update(&context, id, body.as_ref()))
            .await
    }

    /// Tear down the handle, releasing the backend's connections.
    ///
    /// Unlike [`Database::dispose_engine`] this always releases the pool; an
    /// in-memory database is gone afterwards.
    pub async fn close(self) -> Result<()> {
        self.run(|backend| backend.dispose_engine()).await
    }
}
