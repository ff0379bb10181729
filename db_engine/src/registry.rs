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

use crate::{connection::Connection, lock_manager::LockManager};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use relation::Database;
use std::{path::Path, sync::Arc, time::Duration};
use storage::StorageError;

static PROCESS_REGISTRY: Lazy<Registry> = Lazy::new(Registry::default);

/// Opens a connection against the process-wide registry, lazily loading
/// the persisted database or creating an empty one.
pub fn connect<S: Into<String>>(filename: S) -> Result<Connection, StorageError> {
    PROCESS_REGISTRY.connect(filename)
}

/// Same as [`connect`]; the timeout is accepted for signature
/// compatibility and ignored - no operation in the engine blocks.
pub fn connect_timeout<S: Into<String>>(filename: S, _timeout: Duration) -> Result<Connection, StorageError> {
    connect(filename)
}

struct DatabaseSlot {
    database: Database,
    locks: LockManager,
}

/// Maps a filename to the committed database and the lock manager every
/// connection to that file shares. Independent registries can be created
/// where process-wide state is unwanted, e.g. in tests.
#[derive(Default, Clone)]
pub struct Registry {
    inner: Arc<DashMap<String, DatabaseSlot>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn connect<S: Into<String>>(&self, filename: S) -> Result<Connection, StorageError> {
        let filename = filename.into();
        if !self.inner.contains_key(&filename) {
            let database = if Path::new(&filename).exists() {
                storage::read_database(&filename)?
            } else {
                log::debug!("[REGISTRY] creating empty database for {:?}", filename);
                Database::new(&filename)
            };
            self.inner.entry(filename.clone()).or_insert_with(|| DatabaseSlot {
                database,
                locks: LockManager::new(),
            });
        }
        let committed = self.committed(&filename);
        Ok(Connection::new(filename, self.clone(), committed))
    }

    /// A deep copy of the last published database.
    pub(crate) fn committed(&self, filename: &str) -> Database {
        self.inner.get(filename).map(|slot| slot.database.clone()).unwrap()
    }

    /// Publishes a connection's working database as the committed state.
    pub(crate) fn publish(&self, filename: &str, database: Database) {
        if let Some(mut slot) = self.inner.get_mut(filename) {
            log::debug!("[REGISTRY] publishing {:?}", filename);
            slot.database = database;
        }
    }

    /// Runs a lock transition inside the registry's critical section.
    pub(crate) fn with_locks<T, F>(&self, filename: &str, operation: F) -> T
    where
        F: FnOnce(&mut LockManager) -> T,
    {
        let mut slot = self.inner.get_mut(filename).unwrap();
        operation(&mut slot.locks)
    }
}
