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

use crate::table::{ColumnDef, Table};
use scalar::ScalarValue;

/// A table-shaped wrapper around a stored SELECT. The rows are ephemeral:
/// every read re-executes the stored statement and replaces them before
/// projection runs.
#[derive(Debug, PartialEq, Clone)]
pub struct View {
    table: Table,
    base_table: String,
    view_columns: Vec<String>,
    statement: String,
}

impl View {
    /// Derives the view schema from the backing schema: qualification is
    /// stripped (`table.col` becomes `col`, last tag wins on collisions)
    /// and, unless the column list is the single wildcard, the result is
    /// restricted to the named columns in list order.
    pub fn new<S: ToString>(
        view_name: S,
        base_table: String,
        view_columns: Vec<String>,
        backing_schema: &[ColumnDef],
        statement: String,
    ) -> View {
        let mut unqualified: Vec<ColumnDef> = vec![];
        for column in backing_schema {
            let name = unqualify(column.name());
            match unqualified.iter_mut().find(|existing| existing.name() == name) {
                Some(existing) => *existing = ColumnDef::new(name, column.sql_type()),
                None => unqualified.push(ColumnDef::new(name, column.sql_type())),
            }
        }
        let schema = if view_columns.len() == 1 && view_columns[0] == "*" {
            unqualified
        } else {
            view_columns
                .iter()
                .map(|column| unqualify(column))
                .filter_map(|name| {
                    unqualified
                        .iter()
                        .find(|column| column.name() == name)
                        .map(|column| ColumnDef::new(name, column.sql_type()))
                })
                .collect()
        };
        View {
            table: Table::new(view_name, schema),
            base_table,
            view_columns,
            statement,
        }
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn base_table(&self) -> &str {
        &self.base_table
    }

    pub fn view_columns(&self) -> &[String] {
        &self.view_columns
    }

    /// The originating SELECT text, re-executed on every read.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// Swaps in freshly materialized rows; each goes through the ordinary
    /// positional insert so the view schema's checks still apply.
    pub fn replace_rows(&mut self, rows: Vec<Vec<ScalarValue>>) {
        self.table = Table::new(self.table.name().to_owned(), self.table.columns().to_vec());
        for row in rows {
            self.table.insert(row, None);
        }
    }
}

fn unqualify(column: &str) -> String {
    match column.find('.') {
        Some(dot) => column[dot + 1..].to_owned(),
        None => column.to_owned(),
    }
}
