//! Deduplicated, reference-counted handles to loaded resources.
//!
//! Every consumer that asks for the same file under the same label shares one
//! instance.  The registry only keeps `Weak` references, so a resource is
//! dropped as soon as the last `Arc` handle goes away and the next request
//! loads it again.
//!
//! Keys are `(absolute path, label)`.  The label separates different
//! resource kinds built from one file (a mesh and the localizer wrapping it,
//! for example).

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use crate::{CoreError, CoreResult};

type Slot = Weak<dyn Any + Send + Sync>;

// ── ResourceKey ───────────────────────────────────────────────────────────────

/// Registry key: absolute file path plus a resource-kind label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub path:  PathBuf,
    pub label: &'static str,
}

impl ResourceKey {
    /// Build a key, resolving `path` against the current directory.
    ///
    /// The file does not have to exist yet; only the path is normalized.
    pub fn new(path: &Path, label: &'static str) -> CoreResult<Self> {
        Ok(Self { path: std::path::absolute(path)?, label })
    }
}

// ── ResourceRegistry ──────────────────────────────────────────────────────────

/// Map from [`ResourceKey`] to a weak handle of any `Send + Sync` type.
///
/// Loading happens outside the internal lock so a loader may itself request
/// other resources (a localizer loads its mesh through the same registry).
/// If two threads race to load the same key, the first insert wins and the
/// second caller receives the winner's handle.
#[derive(Default)]
pub struct ResourceRegistry {
    slots: Mutex<HashMap<ResourceKey, Slot>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by the `load_*` resource functions.
    pub fn global() -> &'static ResourceRegistry {
        static GLOBAL: OnceLock<ResourceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ResourceRegistry::new)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ResourceKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the live resource for `key`, if any.
    ///
    /// Errors if the key holds a live resource of a different type.
    pub fn get<T: Any + Send + Sync>(&self, key: &ResourceKey) -> CoreResult<Option<Arc<T>>> {
        let live = self.slots().get(key).and_then(Weak::upgrade);
        match live {
            None => Ok(None),
            Some(any) => any.downcast::<T>().map(Some).map_err(|_| CoreError::ResourceType {
                path:  key.path.clone(),
                label: key.label,
            }),
        }
    }

    /// Return the shared resource for `(path, label)`, loading it with `load`
    /// when no live instance exists.
    ///
    /// A failed load leaves the registry untouched.
    pub fn get_or_load<T, E, F>(&self, path: &Path, label: &'static str, load: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        E: From<CoreError>,
        F: FnOnce(&Path) -> Result<T, E>,
    {
        let key = ResourceKey::new(path, label)?;
        if let Some(existing) = self.get::<T>(&key)? {
            log::debug!("resource cache hit: {} [{}]", key.path.display(), label);
            return Ok(existing);
        }

        let loaded = Arc::new(load(&key.path)?);

        let mut slots = self.slots();
        if let Some(any) = slots.get(&key).and_then(Weak::upgrade) {
            // Lost a race with another loader; share its instance.
            return any.downcast::<T>().map_err(|_| {
                E::from(CoreError::ResourceType { path: key.path.clone(), label })
            });
        }
        let erased: Arc<dyn Any + Send + Sync> = loaded.clone();
        slots.insert(key, Arc::downgrade(&erased));
        Ok(loaded)
    }

    /// Number of keys whose resource is still alive.
    pub fn live_count(&self) -> usize {
        self.slots().values().filter(|w| w.strong_count() > 0).count()
    }

    /// Drop entries whose resource has been released.  Returns how many were
    /// removed.
    pub fn purge(&self) -> usize {
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|_, w| w.strong_count() > 0);
        before - slots.len()
    }
}
