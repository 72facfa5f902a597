//! Site view sessions and the shared catalog

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    config::SessionsConfig,
    error::{AppError, AppResult},
    models::{RecordField, SiteId},
    reconcile::{CatalogIndex, SaveOutcome, SiteWorkspace, WorkspaceSnapshot},
    repository::InventoryStore,
};

type SessionHandle = Arc<Mutex<SiteWorkspace>>;

struct SessionEntry {
    workspace: SessionHandle,
    last_access: Instant,
}

#[derive(Clone)]
struct CatalogState {
    index: Arc<CatalogIndex>,
    loaded: bool,
}

/// Registry of open site views.
///
/// Each view owns its own workspace behind its own lock, so edits in one
/// session never observe another session's draft. Views left idle longer
/// than the configured timeout are dropped along with any open draft.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn InventoryStore>,
    catalog: Arc<RwLock<CatalogState>>,
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    max_open: usize,
    idle_timeout: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn InventoryStore>, config: SessionsConfig) -> Self {
        Self {
            store,
            catalog: Arc::new(RwLock::new(CatalogState {
                index: Arc::new(CatalogIndex::empty()),
                loaded: false,
            })),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_open: config.max_open,
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
        }
    }

    /// Reload the shared catalog. On failure the previous index stays in use.
    pub async fn reload_catalog(&self) -> AppResult<usize> {
        let entries = match self.store.load_catalog_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Catalog reload failed, keeping previous catalog: {}", e);
                return Err(e);
            }
        };
        let index = Arc::new(CatalogIndex::build(&entries));
        *self.catalog.write().await = CatalogState {
            index,
            loaded: true,
        };
        tracing::info!("Catalog loaded with {} entries", entries.len());
        Ok(entries.len())
    }

    pub async fn catalog(&self) -> Arc<CatalogIndex> {
        self.catalog.read().await.index.clone()
    }

    pub async fn catalog_loaded(&self) -> bool {
        self.catalog.read().await.loaded
    }

    /// Catalog for a new or refreshed view, retrying a load that never succeeded
    async fn current_catalog(&self) -> Arc<CatalogIndex> {
        if !self.catalog_loaded().await {
            let _ = self.reload_catalog().await;
        }
        self.catalog().await
    }

    pub async fn open_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Open a view of `site`, optionally filtered to one category
    pub async fn open(
        &self,
        site: SiteId,
        category: Option<String>,
    ) -> AppResult<(Uuid, WorkspaceSnapshot)> {
        self.evict_idle().await;
        if self.open_count().await >= self.max_open {
            return Err(AppError::Conflict(format!(
                "Too many open site views (limit {})",
                self.max_open
            )));
        }

        let catalog = self.current_catalog().await;
        let workspace = SiteWorkspace::load(self.store.as_ref(), site, catalog, category).await?;
        let snapshot = workspace.snapshot();

        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_open {
            return Err(AppError::Conflict(format!(
                "Too many open site views (limit {})",
                self.max_open
            )));
        }
        sessions.insert(
            id,
            SessionEntry {
                workspace: Arc::new(Mutex::new(workspace)),
                last_access: Instant::now(),
            },
        );
        tracing::info!("Session {} opened for site {}", id, snapshot.site);
        Ok((id, snapshot))
    }

    async fn handle(&self, id: Uuid) -> AppResult<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        entry.last_access = Instant::now();
        Ok(entry.workspace.clone())
    }

    /// Close views idle longer than the timeout. Views with a request in
    /// flight are kept.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_access.elapsed() < self.idle_timeout
                || Arc::strong_count(&entry.workspace) > 1;
            if !keep {
                tracing::info!("Session {} closed after being idle", id);
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn snapshot(&self, id: Uuid) -> AppResult<WorkspaceSnapshot> {
        let handle = self.handle(id).await?;
        let workspace = handle.lock().await;
        Ok(workspace.snapshot())
    }

    /// Close a view, discarding any open draft
    pub async fn close(&self, id: Uuid) -> AppResult<()> {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(_) => {
                tracing::info!("Session {} closed", id);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {} not found", id))),
        }
    }

    pub async fn refresh(&self, id: Uuid) -> AppResult<WorkspaceSnapshot> {
        let handle = self.handle(id).await?;
        let catalog = self.current_catalog().await;
        let mut workspace = handle.lock().await;
        workspace.set_catalog(catalog);
        workspace.refresh(self.store.as_ref()).await?;
        Ok(workspace.snapshot())
    }

    pub async fn set_category_filter(
        &self,
        id: Uuid,
        category: Option<String>,
    ) -> AppResult<WorkspaceSnapshot> {
        let handle = self.handle(id).await?;
        let mut workspace = handle.lock().await;
        workspace.set_category_filter(category);
        Ok(workspace.snapshot())
    }

    pub async fn begin_edit(&self, id: Uuid, record_id: Uuid) -> AppResult<WorkspaceSnapshot> {
        let handle = self.handle(id).await?;
        let mut workspace = handle.lock().await;
        workspace.begin_edit(record_id)?;
        Ok(workspace.snapshot())
    }

    pub async fn begin_add_new(&self, id: Uuid) -> AppResult<WorkspaceSnapshot> {
        let handle = self.handle(id).await?;
        let mut workspace = handle.lock().await;
        workspace.begin_add_new()?;
        Ok(workspace.snapshot())
    }

    pub async fn update_field(
        &self,
        id: Uuid,
        field: RecordField,
        value: Option<String>,
    ) -> AppResult<WorkspaceSnapshot> {
        let handle = self.handle(id).await?;
        let mut workspace = handle.lock().await;
        workspace.update_field(field, value)?;
        Ok(workspace.snapshot())
    }

    pub async fn cancel(&self, id: Uuid) -> AppResult<WorkspaceSnapshot> {
        let handle = self.handle(id).await?;
        let mut workspace = handle.lock().await;
        workspace.cancel()?;
        Ok(workspace.snapshot())
    }

    /// Run the save sequence. The session stays locked until the commit completes.
    pub async fn save(&self, id: Uuid) -> AppResult<(SaveOutcome, WorkspaceSnapshot)> {
        let handle = self.handle(id).await?;
        let mut workspace = handle.lock().await;
        let outcome = workspace.attempt_save(self.store.as_ref()).await?;
        Ok((outcome, workspace.snapshot()))
    }
}
