//! Project wiring for command handlers.
//!
//! Locates the `.civica` directory, loads config, and builds the stores the
//! engine needs: file-backed key/value storage, the system clock, and the
//! HTTP remote with the session's bearer token attached.

use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use civica_core::clock::{Clock, SystemClock};
use civica_core::config::{ProjectConfig, find_civica_dir, load_project_config};
use civica_core::engine::Engine;
use civica_core::ledger::LocalLedger;
use civica_core::remote::HttpRemote;
use civica_core::session::SessionStore;
use civica_core::storage::{FileStorage, Storage};
use civica_core::tracking::TrackingStore;

pub struct AppContext {
    pub civica_dir: PathBuf,
    pub config: ProjectConfig,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Locate the project from `cwd` and open its stores.
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let civica_dir = find_civica_dir(cwd)
            .context("No .civica directory found. Run `civ init` first.")?;
        let config = load_project_config(&civica_dir)?;
        let storage: Arc<dyn Storage> =
            Arc::new(FileStorage::open(&civica_dir.join("state"))?);
        Ok(Self {
            civica_dir,
            config,
            storage,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn sessions(&self) -> SessionStore {
        SessionStore::new(Arc::clone(&self.storage), Arc::clone(&self.clock))
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Build the lifecycle engine. The current session's token (if any)
    /// rides on every remote call.
    pub fn engine(&self) -> Arc<Engine> {
        let token = self.sessions().current().map(|session| session.token);
        let remote = Arc::new(HttpRemote::new(
            &self.config.api,
            token,
            Arc::clone(&self.clock),
        ));
        Arc::new(Engine::new(
            self.sessions(),
            LocalLedger::new(Arc::clone(&self.storage), Arc::clone(&self.clock)),
            TrackingStore::new(Arc::clone(&self.storage), Arc::clone(&self.clock)),
            remote,
        ))
    }

    /// Forced logout after a rejected credential. Best effort.
    pub fn clear_session(&self) {
        if let Err(err) = self.sessions().logout() {
            tracing::warn!(error = %err, "failed to clear session");
        }
    }
}
