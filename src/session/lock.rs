// src/session/lock.rs

//! Epoch-based cooperative cancellation.
//!
//! `SessionLock` is not a mutex. It hands out run identifiers and remembers
//! which one is current; runs poll `is_owner` between units and end themselves
//! once a newer identifier has been issued.

use log::trace;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier held by a lock that has never been acquired.
pub const START_EPOCH: i32 = i32::MIN;

const ACTIVE: u64 = 1;

/// Epoch in the high half, active flag in the low bit.
fn pack(epoch: i32, active: bool) -> u64 {
    (u64::from(epoch as u32) << 32) | u64::from(active)
}

fn unpack(word: u64) -> (i32, bool) {
    ((word >> 32) as u32 as i32, word & ACTIVE != 0)
}

#[derive(Debug)]
pub struct SessionLock {
    // Both halves change together, so an owner is never observed idle.
    state: AtomicU64,
}

impl Default for SessionLock {
    fn default() -> Self {
        SessionLock::starting_at(START_EPOCH)
    }
}

impl SessionLock {
    pub fn new() -> Self {
        SessionLock::default()
    }

    /// A lock whose next `acquire` returns `current + 1` (wrapping).
    pub fn starting_at(current: i32) -> Self {
        SessionLock {
            state: AtomicU64::new(pack(current, false)),
        }
    }

    /// Moves to the next epoch, wrapping from `i32::MAX` to `i32::MIN`.
    fn advance_to(&self, active: bool) -> i32 {
        let previous = self.state.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |word| {
            let (epoch, _) = unpack(word);
            Some(pack(epoch.wrapping_add(1), active))
        });
        // The closure never declines, so both arms carry the previous word.
        let (epoch, _) = unpack(previous.unwrap_or_else(|word| word));
        epoch.wrapping_add(1)
    }

    fn load(&self) -> (i32, bool) {
        unpack(self.state.load(Ordering::SeqCst))
    }

    /// Issues a new identifier and marks the lock active. The previous owner,
    /// if any, fails its next `is_owner` check.
    pub fn acquire(&self) -> i32 {
        let id = self.advance_to(true);
        trace!("SessionLock: acquired epoch {}", id);
        id
    }

    /// Marks the lock idle if `id` is still current. Stale releases are ignored.
    pub fn release(&self, id: i32) {
        let released = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |word| {
                match unpack(word) {
                    (epoch, true) if epoch == id => Some(pack(id, false)),
                    _ => None,
                }
            })
            .is_ok();
        if released {
            trace!("SessionLock: released epoch {}", id);
        } else {
            trace!("SessionLock: ignoring stale release of epoch {}", id);
        }
    }

    pub fn is_owner(&self, id: i32) -> bool {
        self.load().0 == id
    }

    pub fn is_active(&self) -> bool {
        self.load().1
    }

    pub fn current(&self) -> i32 {
        self.load().0
    }

    /// The epoch of the run holding the lock, if one does.
    pub fn active_epoch(&self) -> Option<i32> {
        match self.load() {
            (epoch, true) => Some(epoch),
            _ => None,
        }
    }

    /// Supersedes whatever run is active without starting a new one.
    pub fn stop(&self) -> i32 {
        let id = self.advance_to(false);
        trace!("SessionLock: stopped at epoch {}", id);
        id
    }
}

/// Cloneable handle that can stop a session's active run from any thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    lock: Arc<SessionLock>,
}

impl StopHandle {
    pub(crate) fn new(lock: Arc<SessionLock>) -> Self {
        StopHandle { lock }
    }

    pub fn stop(&self) {
        self.lock.stop();
    }

    pub fn is_active(&self) -> bool {
        self.lock.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn acquire_issues_consecutive_ids() {
        let lock = SessionLock::new();
        let id0 = lock.acquire();
        let id1 = lock.acquire();
        assert_eq!(id0, START_EPOCH + 1);
        assert_eq!(id1, id0 + 1);
        assert!(lock.is_active());

        lock.release(id0);
        assert!(lock.is_active());
        assert!(!lock.is_owner(id0));

        lock.release(id1);
        assert!(!lock.is_active());
        assert!(lock.is_owner(id1));
    }

    #[test]
    fn ids_wrap_at_the_top_of_the_range() {
        let lock = SessionLock::starting_at(i32::MAX - 1);
        assert_eq!(lock.acquire(), i32::MAX);
        assert_eq!(lock.acquire(), i32::MIN);
        assert_eq!(lock.acquire(), i32::MIN + 1);
    }

    #[test]
    fn stop_supersedes_the_active_run() {
        let lock = SessionLock::new();
        let running = lock.acquire();
        let stopped = lock.stop();
        assert_ne!(running, stopped);
        assert!(!lock.is_owner(running));
        assert!(!lock.is_active());
        // The superseded run's own release changes nothing.
        lock.release(running);
        assert!(!lock.is_active());
        assert_eq!(lock.current(), stopped);
    }

    #[test]
    fn stop_handle_works_across_threads() {
        let lock = Arc::new(SessionLock::new());
        let id = lock.acquire();
        let handle = StopHandle::new(lock.clone());
        std::thread::spawn(move || handle.stop())
            .join()
            .unwrap();
        assert!(!lock.is_owner(id));
        assert!(!lock.is_active());
    }

    #[test]
    fn packed_state_keeps_negative_epochs() {
        for epoch in [i32::MIN, -1, 0, 7, i32::MAX] {
            assert_eq!(unpack(pack(epoch, true)), (epoch, true));
            assert_eq!(unpack(pack(epoch, false)), (epoch, false));
        }
        let lock = SessionLock::new();
        assert_eq!(lock.active_epoch(), None);
        let id = lock.acquire();
        assert_eq!(lock.active_epoch(), Some(id));
    }

    #[test]
    fn concurrent_stop_never_leaves_an_owner_idle() {
        let lock = Arc::new(SessionLock::new());
        let done = Arc::new(AtomicBool::new(false));
        let stopper = {
            let lock = lock.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    lock.stop();
                }
            })
        };

        let mut idle_owners = 0;
        for _ in 0..50_000 {
            let id = lock.acquire();
            // The stopper may supersede `id`, but must not idle it in place.
            if lock.load() == (id, false) {
                idle_owners += 1;
            }
        }
        done.store(true, Ordering::SeqCst);
        stopper.join().unwrap();
        assert_eq!(idle_owners, 0);
    }
}
