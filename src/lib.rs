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

//! featherdb is a single-process, embedded, file-backed relational engine
//! that speaks a subset of SQLite's SQL. Open a database by filename,
//! execute statements, read rows back as scalar tuples:
//!
//! ```no_run
//! let mut connection = featherdb::connect("school.db").unwrap();
//! connection.execute("CREATE TABLE names (name TEXT, id INTEGER);").unwrap();
//! connection.execute("INSERT INTO names VALUES ('James', 1);").unwrap();
//! let rows = connection.execute("SELECT * FROM names ORDER BY id;").unwrap();
//! connection.close().unwrap();
//! ```
//!
//! Connections to the same filename share one committed database and one
//! lock manager; writes run against deep-copied snapshots published on
//! commit. Use a [`Registry`] value instead of [`connect`] to keep that
//! shared state out of process-wide scope, e.g. in tests.

pub use db_engine::{connect, connect_timeout, Connection, LockKind, LockManager, QueryError, Registry, ResultSet};
pub use scalar::ScalarValue;
pub use storage::StorageError;
