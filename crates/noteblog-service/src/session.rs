//! Concurrent session store with TTL-based expiry.
//!
//! Maps opaque session identifiers to the per-visitor state of the blog:
//! an optional user snapshot and a last-access timestamp. The map is a
//! sharded `DashMap`, so operations on different identifiers only contend
//! when they hash to the same shard, and then only for the duration of a
//! single map operation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::types::{SessionId, SessionRecord, UserSnapshot};

/// Server-side state bound to one session identifier.
struct SessionEntry {
    user: Option<UserSnapshot>,
    /// Nanoseconds since the owning store's epoch. Only ever moves forward.
    last_access: AtomicU64,
}

impl SessionEntry {
    fn new(at: u64) -> Self {
        Self {
            user: None,
            last_access: AtomicU64::new(at),
        }
    }

    /// Advances the access timestamp and returns the resulting value.
    fn touch(&self, at: u64) -> u64 {
        self.last_access.fetch_max(at, Ordering::AcqRel).max(at)
    }

    fn is_expired(&self, at: u64, ttl: Duration) -> bool {
        let idle = at.saturating_sub(self.last_access.load(Ordering::Acquire));
        u128::from(idle) > ttl.as_nanos()
    }
}

/// Thread-safe store of visitor sessions.
///
/// Reads hold a shard read guard for their whole duration and writes take
/// the shard write guard, so all operations on one identifier are
/// linearizable. The access timestamp is an atomic, which lets `resolve`
/// touch a session without upgrading to a write guard.
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionEntry>,
    epoch: Instant,
    ttl: Duration,
}

impl SessionStore {
    /// Creates an empty store whose sessions expire after `ttl` of inactivity.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            epoch: Instant::now(),
            ttl,
        }
    }

    /// Returns the configured idle timeout.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Inserts a new anonymous session and returns its identifier.
    pub fn create(&self) -> SessionId {
        self.create_at(Instant::now())
    }

    pub fn create_at(&self, now: Instant) -> SessionId {
        let at = self.offset(now);
        loop {
            let id = SessionId::generate();
            // A v4 collision is astronomically unlikely, but never hand out a live id twice.
            if let Entry::Vacant(slot) = self.sessions.entry(id.clone()) {
                slot.insert(SessionEntry::new(at));
                tracing::debug!(session = %id, "session created");
                return id;
            }
        }
    }

    /// Returns a copy of the session if it exists and has not expired,
    /// touching its access time.
    pub fn resolve(&self, id: &str) -> Option<SessionRecord> {
        self.resolve_at(id, Instant::now())
    }

    pub fn resolve_at(&self, id: &str, now: Instant) -> Option<SessionRecord> {
        let at = self.offset(now);
        {
            let entry = self.sessions.get(id)?;
            if !entry.is_expired(at, self.ttl) {
                let last = entry.touch(at);
                return Some(SessionRecord {
                    id: entry.key().clone(),
                    user: entry.user.clone(),
                    last_access: self.instant(last),
                });
            }
        }

        // Expired but not yet swept. A concurrent touch or login wins.
        let ttl = self.ttl;
        self.sessions
            .remove_if(id, |_, entry| entry.is_expired(at, ttl));
        None
    }

    /// Attaches or replaces the user of a session, creating it if needed.
    pub fn set_user(&self, id: &SessionId, user: UserSnapshot) {
        self.set_user_at(id, user, Instant::now());
    }

    pub fn set_user_at(&self, id: &SessionId, user: UserSnapshot, now: Instant) {
        let at = self.offset(now);
        let mut entry = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| SessionEntry::new(at));
        entry.touch(at);
        entry.user = Some(user);
    }

    /// Removes a session. Returns whether one was present; removing an
    /// unknown id is a no-op.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::debug!(session = id, "session removed");
        }
        removed
    }

    /// Removes every session idle for longer than `ttl` as of `now`.
    /// Returns the count removed.
    ///
    /// Walks a snapshot of the keys and removes each stale entry with a
    /// conditional per-key remove, so no shard stays locked across the walk.
    pub fn evict_expired(&self, now: Instant, ttl: Duration) -> usize {
        let at = self.offset(now);
        let keys: Vec<SessionId> = self.sessions.iter().map(|e| e.key().clone()).collect();

        keys.iter()
            .filter(|id| {
                self.sessions
                    .remove_if(id.as_str(), |_, entry| entry.is_expired(at, ttl))
                    .is_some()
            })
            .count()
    }

    /// Returns the number of stored sessions, including expired ones that
    /// have not been swept yet.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    fn offset(&self, now: Instant) -> u64 {
        let nanos = now.saturating_duration_since(self.epoch).as_nanos();
        u64::try_from(nanos).unwrap_or(u64::MAX)
    }

    fn instant(&self, nanos: u64) -> Instant {
        self.epoch + Duration::from_nanos(nanos)
    }
}
