use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use log::{info, warn};

use super::store::{LoadError, PortfolioStore};

/// Holds the current catalogue snapshot. Readers keep the `Arc` they were
/// handed for as long as they need it; a reload builds a new store and swaps
/// the pointer, never touching a snapshot in use.
#[derive(Debug)]
pub struct SharedPortfolio {
    path: PathBuf,
    current: RwLock<Arc<PortfolioStore>>,
}

impl SharedPortfolio {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        let store = PortfolioStore::load(&path)?;

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(store)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Arc<PortfolioStore> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Rebuilds the catalogue from its source. On failure the previous
    /// snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<PortfolioStore>, LoadError> {
        let store = match PortfolioStore::load(&self.path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("portfolio reload failed, keeping previous snapshot: {}", e);
                return Err(e);
            }
        };

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&store);

        info!("portfolio reloaded ({} entries)", store.len());
        Ok(store)
    }
}
