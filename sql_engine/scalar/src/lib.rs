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

use bigdecimal::{BigDecimal, ToPrimitive};
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use types::SqlTypeFamily;

/// A single cell value. Numbers carry the family they were produced with so
/// that column type checks can tell an integer literal from a real one;
/// comparisons and equality ignore the family and work on the numeric value.
#[derive(Debug, Clone)]
pub enum ScalarValue {
    Num {
        value: BigDecimal,
        type_family: SqlTypeFamily,
    },
    String(String),
    Bytes(Vec<u8>),
    Null,
}

impl ScalarValue {
    pub fn int(value: i64) -> ScalarValue {
        ScalarValue::Num {
            value: BigDecimal::from(value),
            type_family: SqlTypeFamily::Integer,
        }
    }

    pub fn real(value: f64) -> ScalarValue {
        // f64 renders as a finite decimal, which BigDecimal parses exactly
        ScalarValue::Num {
            value: BigDecimal::from_str(&value.to_string()).unwrap_or_default(),
            type_family: SqlTypeFamily::Real,
        }
    }

    pub fn string<S: ToString>(value: S) -> ScalarValue {
        ScalarValue::String(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn type_family(&self) -> Option<SqlTypeFamily> {
        match self {
            ScalarValue::Num { type_family, .. } => Some(*type_family),
            ScalarValue::String(_) => Some(SqlTypeFamily::String),
            ScalarValue::Bytes(_) => Some(SqlTypeFamily::Bytes),
            ScalarValue::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Num { value, .. } => value.to_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Num { value, .. } => value.to_f64(),
            _ => None,
        }
    }

    /// Renders the value the way it would appear inside a statement, for
    /// `?` placeholder substitution.
    pub fn as_literal(&self) -> String {
        match self {
            ScalarValue::String(value) => format!("'{}'", value.replace('\'', "''")),
            ScalarValue::Num { value, type_family } => {
                let rendered = value.to_string();
                // keep a real literal lexing as a real
                if *type_family == SqlTypeFamily::Real && !rendered.contains('.') && !rendered.contains('E') {
                    format!("{}.0", rendered)
                } else {
                    rendered
                }
            }
            other => other.to_string(),
        }
    }
}

impl From<query_ast::Value> for ScalarValue {
    fn from(value: query_ast::Value) -> Self {
        match value {
            query_ast::Value::Int(value) => ScalarValue::Num {
                value: BigDecimal::from(value),
                type_family: SqlTypeFamily::Integer,
            },
            query_ast::Value::Number(value) => ScalarValue::Num {
                value: BigDecimal::from_str(&value).unwrap_or_default(),
                type_family: SqlTypeFamily::Real,
            },
            query_ast::Value::String(value) => ScalarValue::String(value),
            query_ast::Value::Null => ScalarValue::Null,
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &ScalarValue) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScalarValue {}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &ScalarValue) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScalarValue {
    /// Total order over cells in SQLite storage-class order:
    /// NULL < numeric < text < bytes.
    fn cmp(&self, other: &ScalarValue) -> Ordering {
        use ScalarValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Num { value: left, .. }, Num { value: right, .. }) => left.cmp(right),
            (Num { .. }, _) => Ordering::Less,
            (_, Num { .. }) => Ordering::Greater,
            (String(left), String(right)) => left.cmp(right),
            (String(_), _) => Ordering::Less,
            (_, String(_)) => Ordering::Greater,
            (Bytes(left), Bytes(right)) => left.cmp(right),
        }
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Num { value, .. } => write!(f, "{}", value),
            ScalarValue::String(value) => write!(f, "{}", value),
            ScalarValue::Bytes(value) => {
                write!(f, "X'")?;
                for byte in value {
                    write!(f, "{:02X}", byte)?;
                }
                write!(f, "'")
            }
            ScalarValue::Null => write!(f, "NULL"),
        }
    }
}
