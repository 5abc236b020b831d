//! Cache of generated static pages.
//!
//! Rendered output is stored per path with its generation time. An entry is
//! served until it is older than the revalidate interval or until the
//! revalidation endpoint invalidates it. Invalidation targets are either a
//! concrete path (`/articles/hello`) or a route template
//! (`/articles/[slug]`), which matches every concrete page of that route.
//!
//! The rendering layer fills the cache through [`MemoryPageCache::store`] and
//! serves from [`MemoryPageCache::get`]. The revalidation server only
//! invalidates; with nothing rendered, invalidations remove zero entries and
//! are still recorded in the history exposed at `GET /api/revalidate/history`.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};

/// Invalidation history entries kept for inspection.
const HISTORY_LIMIT: usize = 256;

/// Whether a target names a single page or a layout and everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationKind {
    Page,
    Layout,
}

/// A path (or route template) to invalidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevalidateTarget {
    pub path: String,
    pub kind: InvalidationKind,
}

impl RevalidateTarget {
    pub fn page(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: InvalidationKind::Page,
        }
    }

    pub fn layout(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: InvalidationKind::Layout,
        }
    }

    /// Whether a cached page at `path` is covered by this target.
    pub fn matches(&self, path: &str) -> bool {
        let target: Vec<&str> = segments(&self.path);
        let candidate: Vec<&str> = segments(path);

        let prefix_ok = |n: usize| {
            target
                .iter()
                .zip(candidate.iter())
                .take(n)
                .all(|(t, c)| is_dynamic(t) || t == c)
        };

        match self.kind {
            InvalidationKind::Page => {
                target.len() == candidate.len() && prefix_ok(target.len())
            }
            InvalidationKind::Layout => {
                candidate.len() >= target.len() && prefix_ok(target.len())
            }
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// `[slug]` style route segment.
fn is_dynamic(segment: &str) -> bool {
    segment.starts_with('[') && segment.ends_with(']')
}

/// Paths invalidated when a revalidation request names no path: the home
/// page and every article page.
pub fn default_targets() -> Vec<RevalidateTarget> {
    vec![
        RevalidateTarget::page("/"),
        RevalidateTarget::page("/articles/[slug]"),
    ]
}

/// Record of one invalidation.
#[derive(Debug, Clone, Serialize)]
pub struct Invalidation {
    pub target: RevalidateTarget,
    pub removed: usize,
    pub at: DateTime<Utc>,
}

/// Something that can discard generated output.
pub trait PageCache: Send + Sync {
    /// Discard every entry matching `target`; returns how many were removed.
    fn invalidate(&self, target: &RevalidateTarget) -> Result<usize>;

    /// Recent invalidations, oldest first.
    fn history(&self) -> Vec<Invalidation> {
        Vec::new()
    }
}

/// A generated page.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    pages: HashMap<String, CachedPage>,
    history: VecDeque<Invalidation>,
}

/// In-process page cache with time-based staleness.
#[derive(Debug)]
pub struct MemoryPageCache {
    revalidate_after: Duration,
    inner: RwLock<Inner>,
}

impl MemoryPageCache {
    pub fn new(revalidate_after: Duration) -> Self {
        Self {
            revalidate_after,
            inner: RwLock::new(Inner::default()),
        }
    }

    fn lock_err() -> AppError {
        AppError::Cache("lock poisoned".to_string())
    }

    /// Store freshly generated output for `path`.
    pub fn store(&self, path: impl Into<String>, body: impl Into<String>) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_err())?;
        inner.pages.insert(
            path.into(),
            CachedPage {
                body: body.into(),
                generated_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Cached output for `path` if present and still fresh.
    pub fn get(&self, path: &str) -> Result<Option<CachedPage>> {
        let inner = self.inner.read().map_err(|_| Self::lock_err())?;
        Ok(inner
            .pages
            .get(path)
            .filter(|page| self.is_fresh(page, Utc::now()))
            .cloned())
    }

    fn is_fresh(&self, page: &CachedPage, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(page.generated_at);
        age.to_std().map(|a| a < self.revalidate_after).unwrap_or(true)
    }

    /// Number of cached entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.pages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recent invalidations, oldest first.
    pub fn history(&self) -> Vec<Invalidation> {
        self.inner
            .read()
            .map(|i| i.history.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl PageCache for MemoryPageCache {
    fn invalidate(&self, target: &RevalidateTarget) -> Result<usize> {
        let mut inner = self.inner.write().map_err(|_| Self::lock_err())?;
        let before = inner.pages.len();
        inner.pages.retain(|path, _| !target.matches(path));
        let removed = before - inner.pages.len();

        if inner.history.len() == HISTORY_LIMIT {
            inner.history.pop_front();
        }
        inner.history.push_back(Invalidation {
            target: target.clone(),
            removed,
            at: Utc::now(),
        });

        log::info!(
            "Invalidated {} ({:?}): {} cached page(s) removed",
            target.path,
            target.kind,
            removed
        );
        Ok(removed)
    }

    fn history(&self) -> Vec<Invalidation> {
        MemoryPageCache::history(self)
    }
}
