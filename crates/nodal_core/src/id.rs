//! Unique identifier generation

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

/// A process-wide unique identifier.
///
/// Serialized as a bare integer so documents stay readable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(u64);

impl Id {
    /// Wrap a raw integer, e.g. one read back from a document
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw integer
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Id {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Shared handle to a registry.
pub type SharedIds = Arc<IdRegistry>;

/// Monotonic id source.
///
/// Ids are never handed out twice. Restoring an id from a document goes
/// through [`IdRegistry::reserve`], which moves the counter past it so a
/// later [`IdRegistry::next_id`] cannot collide with the restored entity.
pub struct IdRegistry {
    next: AtomicU64,
}

impl IdRegistry {
    /// Create a registry whose first id is 1
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a registry with an explicit first id
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Create a fresh shared registry
    pub fn shared() -> SharedIds {
        Arc::new(Self::new())
    }

    /// The process-wide registry used by top-level wiring
    pub fn global() -> SharedIds {
        static GLOBAL: OnceLock<SharedIds> = OnceLock::new();
        GLOBAL.get_or_init(IdRegistry::shared).clone()
    }

    /// Mint the next id
    pub fn next_id(&self) -> Id {
        Id(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Make sure `id` will never be minted
    pub fn reserve(&self, id: Id) {
        self.next.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }

    /// The id the next call to [`IdRegistry::next_id`] will return
    pub fn peek(&self) -> Id {
        Id(self.next.load(Ordering::Relaxed))
    }
}

impl Default for IdRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdRegistry").field("next", &self.peek()).finish()
    }
}
