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

use crate::{
    row::Row,
    table::{ColumnDef, Table},
};
use scalar::ScalarValue;

/// Materializes `left LEFT OUTER JOIN right ON left_key = right_key` into a
/// transient table whose columns carry their `table.column` qualification.
/// Every left row appears exactly once: concatenated with the first right
/// row sharing its key, or padded with nulls when no right row matches.
pub fn left_outer_join(left: &Table, right: &Table, left_key: usize, right_key: usize) -> Table {
    let mut joined = Table::new("JoinedTable", vec![]);
    for column in left.columns() {
        joined.add_column(ColumnDef::new(
            format!("{}.{}", left.name(), column.name()),
            column.sql_type(),
        ));
    }
    for column in right.columns() {
        joined.add_column(ColumnDef::new(
            format!("{}.{}", right.name(), column.name()),
            column.sql_type(),
        ));
    }

    let keys: Vec<&ScalarValue> = left.rows().iter().map(|row| row.cell(left_key)).collect();
    let matching: Vec<&Row> = right
        .rows()
        .iter()
        .filter(|row| keys.contains(&row.cell(right_key)))
        .collect();

    for row in left.rows() {
        let mut cells = row.cells().to_vec();
        match matching.iter().find(|right_row| right_row.cell(right_key) == row.cell(left_key)) {
            Some(right_row) => cells.extend(right_row.cells().iter().cloned()),
            None => cells.extend(std::iter::repeat(ScalarValue::Null).take(right.column_count())),
        }
        joined.insert(cells, None);
    }
    log::debug!(
        "[JOIN] {:?} x {:?} -> {} rows",
        left.name(),
        right.name(),
        joined.size()
    );
    joined
}
