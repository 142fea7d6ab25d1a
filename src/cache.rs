use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::debug;

use crate::analysis::profile::{PlayerProfile, ScanPolicy};
use crate::api::RemoteDataSource;
use crate::error::AppError;
use crate::model::Identity;

type Resolution = Result<Arc<PlayerProfile>, AppError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RegistryKey {
    identity: Identity,
    window_size: usize,
}

/// Run-scoped cache of resolved player profiles.
///
/// Concurrent callers asking for the same (identity, window) wait on a
/// single resolution instead of each hitting the source.
pub struct PlayerRegistry {
    source: Arc<dyn RemoteDataSource>,
    policy: ScanPolicy,
    slots: Mutex<HashMap<RegistryKey, Arc<OnceLock<Resolution>>>>,
    resolutions: AtomicUsize,
}

impl PlayerRegistry {
    pub fn new(source: Arc<dyn RemoteDataSource>) -> Self {
        Self::with_policy(source, ScanPolicy::default())
    }

    pub fn with_policy(source: Arc<dyn RemoteDataSource>, policy: ScanPolicy) -> Self {
        PlayerRegistry {
            source,
            policy,
            slots: Mutex::new(HashMap::new()),
            resolutions: AtomicUsize::new(0),
        }
    }

    pub fn source(&self) -> &dyn RemoteDataSource {
        self.source.as_ref()
    }

    pub fn get_or_create(&self, identity: &Identity, window_size: usize) -> Resolution {
        let key = RegistryKey {
            identity: identity.clone(),
            window_size,
        };

        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let resolution = slot
            .get_or_init(|| {
                self.resolutions.fetch_add(1, Ordering::SeqCst);
                debug!(player = %identity, window_size, "resolving profile");
                PlayerProfile::resolve_with(self.source.as_ref(), identity, window_size, &self.policy)
                    .map(Arc::new)
            })
            .clone();

        // A missing player stays missing for the rest of the run; anything
        // else (transport trouble) may succeed on a later call.
        if let Err(e) = &resolution {
            if !matches!(e, AppError::IdentityNotFound(_)) {
                let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
                if slots.get(&key).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
                    slots.remove(&key);
                }
            }
        }

        resolution
    }

    /// Number of remote resolutions started so far.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    /// Cached entries, including remembered misses.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
