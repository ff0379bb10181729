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

use query_ast::DataType;
use std::fmt::{self, Display, Formatter};

/// Declared column type tag. A column without a tag accepts any value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    pub fn family(&self) -> SqlTypeFamily {
        match self {
            SqlType::Text => SqlTypeFamily::String,
            SqlType::Integer => SqlTypeFamily::Integer,
            SqlType::Real => SqlTypeFamily::Real,
            SqlType::Blob => SqlTypeFamily::Bytes,
        }
    }

    /// Type acceptance for a cell about to enter a column with this tag.
    /// `None` stands for a null cell, which every column accepts. BLOB
    /// columns accept anything.
    pub fn accepts(&self, family: Option<SqlTypeFamily>) -> bool {
        match (self, family) {
            (_, None) => true,
            (SqlType::Blob, _) => true,
            (tag, Some(family)) => tag.family() == family,
        }
    }

    pub fn from_tag(tag: &str) -> Option<SqlType> {
        match tag {
            "TEXT" => Some(SqlType::Text),
            "INTEGER" => Some(SqlType::Integer),
            "REAL" => Some(SqlType::Real),
            "BLOB" => Some(SqlType::Blob),
            _ => None,
        }
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Text => write!(f, "TEXT"),
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::Real => write!(f, "REAL"),
            SqlType::Blob => write!(f, "BLOB"),
        }
    }
}

impl From<DataType> for SqlType {
    fn from(data_type: DataType) -> SqlType {
        match data_type {
            DataType::Text => SqlType::Text,
            DataType::Integer => SqlType::Integer,
            DataType::Real => SqlType::Real,
            DataType::Blob => SqlType::Blob,
        }
    }
}

/// Dynamic family of a non-null cell value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlTypeFamily {
    Integer,
    Real,
    String,
    Bytes,
}
