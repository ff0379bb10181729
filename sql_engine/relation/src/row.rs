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

use query_ast::PredicateOp;
use scalar::ScalarValue;

/// A predicate with its column already resolved against the table schema.
#[derive(Debug, PartialEq, Clone)]
pub struct RowPredicate {
    pub column: usize,
    pub op: PredicateOp,
    pub value: ScalarValue,
}

/// An ordered tuple of cells. Rows have no identity beyond their contents;
/// the optional primary-key marker designates one cell as the row's key.
#[derive(Debug, PartialEq, Clone)]
pub struct Row {
    cells: Vec<ScalarValue>,
    primary_key: Option<usize>,
}

impl Row {
    pub fn new(cells: Vec<ScalarValue>) -> Row {
        Row {
            cells,
            primary_key: None,
        }
    }

    pub fn cells(&self) -> &[ScalarValue] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<ScalarValue> {
        self.cells
    }

    pub fn arity(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, index: usize) -> &ScalarValue {
        &self.cells[index]
    }

    pub fn set_cell(&mut self, index: usize, value: ScalarValue) {
        self.cells[index] = value;
    }

    pub fn set_primary_key(&mut self, index: usize) {
        self.primary_key = Some(index);
    }

    pub fn primary_key(&self) -> Option<&ScalarValue> {
        self.primary_key.map(|index| &self.cells[index])
    }

    /// §comparison semantics: IS / IS NOT test for null; every other
    /// operator is false as soon as either side is null, otherwise the
    /// cells' natural ordering decides.
    pub fn matches(&self, predicate: &RowPredicate) -> bool {
        let cell = &self.cells[predicate.column];
        match predicate.op {
            PredicateOp::IsNull => cell.is_null(),
            PredicateOp::IsNotNull => !cell.is_null(),
            op => {
                if cell.is_null() || predicate.value.is_null() {
                    return false;
                }
                match op {
                    PredicateOp::Eq => cell == &predicate.value,
                    PredicateOp::NotEq => cell != &predicate.value,
                    PredicateOp::Lt => cell < &predicate.value,
                    PredicateOp::LtEq => cell <= &predicate.value,
                    PredicateOp::Gt => cell > &predicate.value,
                    PredicateOp::GtEq => cell >= &predicate.value,
                    PredicateOp::IsNull | PredicateOp::IsNotNull => unreachable!(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate(column: usize, op: PredicateOp, value: ScalarValue) -> RowPredicate {
        RowPredicate { column, op, value }
    }

    #[test]
    fn comparison_operators_over_cells() {
        let row = Row::new(vec![ScalarValue::string("Li"), ScalarValue::int(2)]);
        assert!(row.matches(&predicate(1, PredicateOp::Eq, ScalarValue::int(2))));
        assert!(row.matches(&predicate(1, PredicateOp::NotEq, ScalarValue::int(3))));
        assert!(row.matches(&predicate(1, PredicateOp::Lt, ScalarValue::int(3))));
        assert!(row.matches(&predicate(1, PredicateOp::LtEq, ScalarValue::int(2))));
        assert!(row.matches(&predicate(1, PredicateOp::Gt, ScalarValue::int(1))));
        assert!(row.matches(&predicate(1, PredicateOp::GtEq, ScalarValue::int(2))));
        assert!(row.matches(&predicate(0, PredicateOp::Gt, ScalarValue::string("James"))));
    }

    #[test]
    fn null_on_either_side_fails_ordinary_comparisons() {
        let row = Row::new(vec![ScalarValue::Null, ScalarValue::int(2)]);
        assert!(!row.matches(&predicate(0, PredicateOp::Eq, ScalarValue::string("Li"))));
        assert!(!row.matches(&predicate(0, PredicateOp::Eq, ScalarValue::Null)));
        assert!(!row.matches(&predicate(1, PredicateOp::Eq, ScalarValue::Null)));
        assert!(!row.matches(&predicate(1, PredicateOp::Lt, ScalarValue::Null)));
    }

    #[test]
    fn is_and_is_not_test_for_null_only() {
        let row = Row::new(vec![ScalarValue::Null, ScalarValue::int(0), ScalarValue::string("")]);
        assert!(row.matches(&predicate(0, PredicateOp::IsNull, ScalarValue::Null)));
        assert!(!row.matches(&predicate(1, PredicateOp::IsNull, ScalarValue::Null)));
        assert!(!row.matches(&predicate(2, PredicateOp::IsNull, ScalarValue::Null)));
        assert!(!row.matches(&predicate(0, PredicateOp::IsNotNull, ScalarValue::Null)));
        assert!(row.matches(&predicate(1, PredicateOp::IsNotNull, ScalarValue::Null)));
        assert!(row.matches(&predicate(2, PredicateOp::IsNotNull, ScalarValue::Null)));
    }

    #[test]
    fn primary_key_marker() {
        let mut row = Row::new(vec![ScalarValue::string("Li"), ScalarValue::int(2)]);
        assert_eq!(row.primary_key(), None);
        row.set_primary_key(1);
        assert_eq!(row.primary_key(), Some(&ScalarValue::int(2)));
    }
}
