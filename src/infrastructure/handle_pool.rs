//! Database Handle Pool
//!
//! Keeps opened database handles so repeated lookups skip the open/close
//! cycle. Handles are keyed by file path, expire after a maximum lifetime,
//! and are dropped wholesale when the data directory is reconfigured.
//!
//! Every handle is stamped with the pool generation it was opened under.
//! `clear` bumps the generation, so a handle opened from a configuration
//! that was replaced mid-lookup is never served from the pool.

use crate::domain::errors::LookupError;
use crate::domain::ports::GeoDatabase;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Handle pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum time a handle is reused before the file is reopened
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

/// A pooled database handle.
struct PooledHandle {
    db: Arc<dyn GeoDatabase>,
    generation: u64,
    opened_at: Instant,
}

impl PooledHandle {
    fn new(db: Arc<dyn GeoDatabase>, generation: u64) -> Self {
        Self {
            db,
            generation,
            opened_at: Instant::now(),
        }
    }

    fn is_expired(&self, max_lifetime: Duration) -> bool {
        self.opened_at.elapsed() > max_lifetime
    }
}

/// Pool of open database handles.
pub struct HandlePool {
    config: PoolConfig,
    handles: DashMap<PathBuf, PooledHandle>,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl HandlePool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            handles: DashMap::new(),
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Current pool generation. Read it together with the path being
    /// looked up and pass it to [`get_or_open`](Self::get_or_open).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Return the pooled handle for `path`, or open it with `open` and pool
    /// the result.
    ///
    /// `generation` is the pool generation observed when `path` was chosen.
    /// If the pool has been cleared since, the handle is opened and returned
    /// but not pooled. Failed opens are not pooled.
    pub fn get_or_open<F>(
        &self,
        path: &Path,
        generation: u64,
        open: F,
    ) -> Result<Arc<dyn GeoDatabase>, LookupError>
    where
        F: FnOnce(&Path) -> Result<Arc<dyn GeoDatabase>, LookupError>,
    {
        if generation != self.generation() {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("opening {} outside the pool, configuration changed", path.display());
            return open(path);
        }

        if let Some(handle) = self.handles.get(path) {
            if handle.generation == generation && !handle.is_expired(self.config.max_lifetime) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(handle.db.clone());
            }
        }

        // Expired, stale or missing. Drop any old entry before reopening.
        if self.handles.remove(path).is_some() {
            tracing::debug!("discarding stale handle for {}", path.display());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let db = open(path)?;
        self.handles
            .insert(path.to_path_buf(), PooledHandle::new(db.clone(), generation));
        Ok(db)
    }

    /// Drop every pooled handle and start a new generation.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let count = self.handles.len();
        self.handles.clear();
        if count > 0 {
            tracing::debug!("handle pool cleared {} handles", count);
        }
    }

    /// Number of pooled handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            handles: self.handles.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for HandlePool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Pool statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Handles currently pooled
    pub handles: usize,
    /// Lookups served from a pooled handle
    pub hits: u64,
    /// Lookups that had to open the file
    pub misses: u64,
}
