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

use crate::row::{Row, RowPredicate};
use scalar::ScalarValue;
use std::collections::BTreeMap;
use types::SqlType;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ColumnDef {
    name: String,
    sql_type: Option<SqlType>,
}

impl ColumnDef {
    pub fn new<S: ToString>(name: S, sql_type: Option<SqlType>) -> ColumnDef {
        ColumnDef {
            name: name.to_string(),
            sql_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> Option<SqlType> {
        self.sql_type
    }
}

/// One projected output column.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ProjectionColumn {
    /// Emit the cell at this schema index.
    Cell(usize),
    /// Expand positionally to every schema column.
    Wildcard,
}

/// What DISTINCT deduplicates on.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DistinctKey {
    Cell(usize),
    WholeRow,
}

/// Schema plus an insertion-ordered sequence of rows. Inserts that break
/// the schema contract are dropped without an error.
#[derive(Debug, PartialEq, Clone)]
pub struct Table {
    name: String,
    columns: Vec<ColumnDef>,
    default_values: BTreeMap<String, ScalarValue>,
    rows: Vec<Row>,
    size: usize,
}

impl Table {
    pub fn new<S: ToString>(name: S, columns: Vec<ColumnDef>) -> Table {
        Table::with_defaults(name, columns, BTreeMap::new())
    }

    pub fn with_defaults<S: ToString>(
        name: S,
        columns: Vec<ColumnDef>,
        default_values: BTreeMap<String, ScalarValue>,
    ) -> Table {
        Table {
            name: name.to_string(),
            columns,
            default_values,
            rows: vec![],
            size: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    pub fn add_column(&mut self, column: ColumnDef) {
        self.columns.push(column);
    }

    pub fn default_values(&self) -> &BTreeMap<String, ScalarValue> {
        &self.default_values
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Positional or column-list insert. A value list wider than the schema
    /// or a value that fails its column's type check drops the whole row.
    pub fn insert(&mut self, mut values: Vec<ScalarValue>, columns: Option<&[String]>) -> bool {
        if values.len() > self.columns.len() {
            log::debug!(
                "[INSERT] {} values do not fit {} columns of {:?}, row dropped",
                values.len(),
                self.columns.len(),
                self.name
            );
            return false;
        }
        let values = match columns {
            Some(column_names) => {
                while values.len() < column_names.len() {
                    values.push(ScalarValue::Null);
                }
                self.columns
                    .iter()
                    .map(|column| {
                        match column_names.iter().position(|name| name.as_str() == column.name()) {
                            Some(position) => values[position].clone(),
                            None => self.default_for(column.name()),
                        }
                    })
                    .collect()
            }
            None => {
                while values.len() < self.columns.len() {
                    values.push(ScalarValue::Null);
                }
                values
            }
        };
        if !self.type_check(&values) {
            return false;
        }
        self.rows.push(Row::new(values));
        self.size += 1;
        true
    }

    /// `DEFAULT VALUES` insert: every column gets its declared default or
    /// null when none was declared.
    pub fn insert_default_values(&mut self) {
        let values = self
            .columns
            .iter()
            .map(|column| self.default_for(column.name()))
            .collect();
        self.rows.push(Row::new(values));
        self.size += 1;
    }

    /// Raw append used when loading a persisted table; the writer emitted
    /// rows that already satisfied the schema.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
        self.size += 1;
    }

    fn default_for(&self, column_name: &str) -> ScalarValue {
        self.default_values
            .get(column_name)
            .cloned()
            .unwrap_or(ScalarValue::Null)
    }

    fn type_check(&self, values: &[ScalarValue]) -> bool {
        for (value, column) in values.iter().zip(self.columns.iter()) {
            if let Some(tag) = column.sql_type() {
                if !tag.accepts(value.type_family()) {
                    log::debug!(
                        "[INSERT] value {} does not fit {} column {:?}.{:?}, row dropped",
                        value,
                        tag,
                        self.name,
                        column.name()
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Applies the assignments to every matching row (all rows when no
    /// predicate is given). An assignment that fails its column's type
    /// check makes the whole update a no-op.
    pub fn update_matching(&mut self, assignments: &[(usize, ScalarValue)], predicate: Option<&RowPredicate>) -> usize {
        if self.size == 0 {
            return 0;
        }
        for (index, value) in assignments {
            if let Some(tag) = self.columns[*index].sql_type() {
                if !tag.accepts(value.type_family()) {
                    log::debug!(
                        "[UPDATE] value {} does not fit {} column {:?}.{:?}, update dropped",
                        value,
                        tag,
                        self.name,
                        self.columns[*index].name()
                    );
                    return 0;
                }
            }
        }
        let mut updated = 0;
        for row in self.rows.iter_mut() {
            if predicate.map_or(true, |predicate| row.matches(predicate)) {
                for (index, value) in assignments {
                    row.set_cell(*index, value.clone());
                }
                updated += 1;
            }
        }
        updated
    }

    /// Removes every matching row; no predicate clears the table.
    pub fn remove_matching(&mut self, predicate: Option<&RowPredicate>) -> usize {
        let before = self.rows.len();
        match predicate {
            None => self.rows.clear(),
            Some(predicate) => self.rows.retain(|row| !row.matches(predicate)),
        }
        self.size = self.rows.len();
        before - self.size
    }

    pub fn filter_rows(&self, predicate: Option<&RowPredicate>) -> Vec<Row> {
        self.rows
            .iter()
            .filter(|row| predicate.map_or(true, |predicate| row.matches(predicate)))
            .cloned()
            .collect()
    }

    /// Projects already filtered and sorted rows onto the requested output
    /// columns. DISTINCT suppresses rows whose key was seen before; rows
    /// that project to nothing are dropped.
    pub fn project_rows(
        &self,
        rows: &[Row],
        columns: &[ProjectionColumn],
        distinct: Option<DistinctKey>,
    ) -> Vec<Vec<ScalarValue>> {
        let mut seen: Vec<Vec<ScalarValue>> = vec![];
        let mut result = vec![];
        for row in rows {
            if let Some(key) = distinct {
                let key = match key {
                    DistinctKey::Cell(index) => vec![row.cell(index).clone()],
                    DistinctKey::WholeRow => row.cells().to_vec(),
                };
                if seen.contains(&key) {
                    continue;
                }
                seen.push(key);
            }
            let mut record = vec![];
            for column in columns {
                match column {
                    ProjectionColumn::Cell(index) => record.push(row.cell(*index).clone()),
                    ProjectionColumn::Wildcard => record.extend(row.cells().iter().cloned()),
                }
            }
            if !record.is_empty() {
                result.push(record);
            }
        }
        result
    }
}

/// Stable multi-key sort; a descending sort reverses the comparator so
/// equal keys keep their encounter order, like a reversed stable sort.
pub fn sort_rows(rows: &mut [Row], keys: &[usize], descending: bool) {
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|left, right| {
        let ordering = keys
            .iter()
            .map(|&key| left.cell(key).cmp(right.cell(key)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}
