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

//! In-memory relational data model: databases own tables and views, tables
//! own insertion-ordered rows of scalar cells. Everything is a plain value;
//! a transaction snapshot is a `clone` of the committed `Database`.

mod database;
mod join;
mod row;
mod table;
mod view;

pub use database::{Database, Relation};
pub use join::left_outer_join;
pub use row::{Row, RowPredicate};
pub use table::{sort_rows, ColumnDef, DistinctKey, ProjectionColumn, Table};
pub use view::View;
