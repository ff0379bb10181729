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

//! The embedded database node: connections parse and dispatch statements,
//! a shared lock manager arbitrates access per database file, and the
//! registry maps filenames to committed state.

mod connection;
mod lock_manager;
mod query_response;
mod registry;

pub use connection::{Connection, ResultSet};
pub use lock_manager::{LockKind, LockManager};
pub use query_response::QueryError;
pub use registry::{connect, connect_timeout, Registry};

#[cfg(test)]
mod tests;
