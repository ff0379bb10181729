// Copyright 2020 - 2021 Alex Dukhno
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::query_response::QueryError;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LockKind {
    Shared,
    Reserved,
    Exclusive,
}

impl Display for LockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LockKind::Shared => write!(f, "shared"),
            LockKind::Reserved => write!(f, "reserved"),
            LockKind::Exclusive => write!(f, "exclusive"),
        }
    }
}

/// Pure lock arithmetic shared by every connection to one database file:
/// any number of shared holders, at most one reserved, at most one
/// exclusive. The manager never blocks; an impossible transition surfaces
/// immediately as a lock-conflict error.
#[derive(Debug, Default)]
pub struct LockManager {
    shared: usize,
    reserved: usize,
    exclusive: usize,
}

impl LockManager {
    pub fn new() -> LockManager {
        LockManager::default()
    }

    pub fn shared(&self) -> usize {
        self.shared
    }

    pub fn reserved(&self) -> usize {
        self.reserved
    }

    pub fn exclusive(&self) -> usize {
        self.exclusive
    }

    /// Grants `requested` to a holder that currently owns `held`.
    /// Re-requesting the held kind succeeds without a state change.
    pub fn add_lock(&mut self, requested: LockKind, held: Option<LockKind>) -> Result<(), QueryError> {
        if held == Some(requested) {
            return Ok(());
        }
        match requested {
            LockKind::Shared => self.add_shared(),
            LockKind::Reserved => self.add_reserved(held),
            LockKind::Exclusive => self.add_exclusive(held),
        }?;
        log::trace!(
            "[LOCKS] {} granted (shared {} reserved {} exclusive {})",
            requested,
            self.shared,
            self.reserved,
            self.exclusive
        );
        Ok(())
    }

    /// Releases `held`; releasing nothing is a no-op.
    pub fn remove_lock(&mut self, held: Option<LockKind>) {
        match held {
            None => {}
            Some(LockKind::Shared) => self.shared -= 1,
            Some(LockKind::Reserved) => self.reserved -= 1,
            Some(LockKind::Exclusive) => self.exclusive -= 1,
        }
        if let Some(kind) = held {
            log::trace!(
                "[LOCKS] {} released (shared {} reserved {} exclusive {})",
                kind,
                self.shared,
                self.reserved,
                self.exclusive
            );
        }
    }

    fn add_shared(&mut self) -> Result<(), QueryError> {
        if self.exclusive != 0 {
            return Err(QueryError::lock_conflict(
                "a shared lock was requested while an exclusive lock is held",
            ));
        }
        self.shared += 1;
        Ok(())
    }

    fn add_reserved(&mut self, held: Option<LockKind>) -> Result<(), QueryError> {
        if self.reserved != 0 {
            return Err(QueryError::lock_conflict(
                "a reserved lock was requested while another reserved lock is held",
            ));
        }
        if self.exclusive != 0 {
            return Err(QueryError::lock_conflict(
                "a reserved lock was requested while an exclusive lock is held",
            ));
        }
        if held == Some(LockKind::Shared) {
            self.shared -= 1;
        }
        self.reserved += 1;
        Ok(())
    }

    fn add_exclusive(&mut self, held: Option<LockKind>) -> Result<(), QueryError> {
        if self.exclusive != 0 {
            return Err(QueryError::lock_conflict(
                "an exclusive lock was requested while another exclusive lock is held",
            ));
        }
        if self.shared != 0 {
            return Err(QueryError::lock_conflict(
                "an exclusive lock was requested while shared locks are held",
            ));
        }
        if self.reserved != 0 {
            // only the reserved holder itself may upgrade
            if held != Some(LockKind::Reserved) {
                return Err(QueryError::lock_conflict(
                    "an exclusive lock was requested while a reserved lock is held",
                ));
            }
            self.reserved -= 1;
        }
        self.exclusive += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invariant_holds(locks: &LockManager) -> bool {
        locks.exclusive <= 1 && locks.reserved <= 1 && (locks.exclusive == 0 || (locks.shared == 0 && locks.reserved == 0))
    }

    #[test]
    fn shared_locks_stack() {
        let mut locks = LockManager::new();
        assert_eq!(locks.add_lock(LockKind::Shared, None), Ok(()));
        assert_eq!(locks.add_lock(LockKind::Shared, None), Ok(()));
        assert_eq!(locks.shared(), 2);
        assert!(invariant_holds(&locks));
    }

    #[test]
    fn re_requesting_the_held_kind_changes_nothing() {
        let mut locks = LockManager::new();
        assert_eq!(locks.add_lock(LockKind::Shared, None), Ok(()));
        assert_eq!(locks.add_lock(LockKind::Shared, Some(LockKind::Shared)), Ok(()));
        assert_eq!(locks.shared(), 1);
    }

    #[test]
    fn only_one_reserved_holder() {
        let mut locks = LockManager::new();
        assert_eq!(locks.add_lock(LockKind::Reserved, None), Ok(()));
        assert!(locks.add_lock(LockKind::Reserved, None).is_err());
        assert_eq!(locks.reserved(), 1);
        assert!(invariant_holds(&locks));
    }

    #[test]
    fn reserved_coexists_with_shared_readers() {
        let mut locks = LockManager::new();
        assert_eq!(locks.add_lock(LockKind::Shared, None), Ok(()));
        assert_eq!(locks.add_lock(LockKind::Reserved, None), Ok(()));
        assert_eq!(locks.shared(), 1);
        assert_eq!(locks.reserved(), 1);
        assert!(invariant_holds(&locks));
    }

    #[test]
    fn upgrading_shared_to_reserved_releases_the_shared_count() {
        let mut locks = LockManager::new();
        assert_eq!(locks.add_lock(LockKind::Shared, None), Ok(()));
        assert_eq!(locks.add_lock(LockKind::Reserved, Some(LockKind::Shared)), Ok(()));
        assert_eq!(locks.shared(), 0);
        assert_eq!(locks.reserved(), 1);
    }

    #[test]
    fn exclusive_requires_an_idle_database() {
        let mut locks = LockManager::new();
        assert_eq!(locks.add_lock(LockKind::Shared, None), Ok(()));
        assert!(locks.add_lock(LockKind::Exclusive, None).is_err());
        locks.remove_lock(Some(LockKind::Shared));
        assert_eq!(locks.add_lock(LockKind::Exclusive, None), Ok(()));
        assert!(locks.add_lock(LockKind::Shared, None).is_err());
        assert!(locks.add_lock(LockKind::Reserved, None).is_err());
        assert!(locks.add_lock(LockKind::Exclusive, None).is_err());
        assert!(invariant_holds(&locks));
    }

    #[test]
    fn only_the_reserved_holder_may_upgrade_to_exclusive() {
        let mut locks = LockManager::new();
        assert_eq!(locks.add_lock(LockKind::Reserved, None), Ok(()));
        assert!(locks.add_lock(LockKind::Exclusive, None).is_err());
        assert_eq!(locks.add_lock(LockKind::Exclusive, Some(LockKind::Reserved)), Ok(()));
        assert_eq!(locks.reserved(), 0);
        assert_eq!(locks.exclusive(), 1);
        assert!(invariant_holds(&locks));
    }

    #[test]
    fn releasing_nothing_is_a_no_op() {
        let mut locks = LockManager::new();
        locks.remove_lock(None);
        assert_eq!(locks.shared(), 0);
        assert_eq!(locks.reserved(), 0);
        assert_eq!(locks.exclusive(), 0);
    }
}
