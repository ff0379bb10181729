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

//! JSON persistence of a [`Database`]. One database file holds one JSON
//! document: `{"name", "size", "joined_table", "tables": [{"name",
//! "default_values", "schema": [{col: tag}], "rows": [{col: value}]}]}`.
//! Rows are written as column-keyed objects in schema declaration order;
//! readers tolerate missing optional fields. Views are written with their
//! current materialization, exactly like tables.

use relation::{ColumnDef, Database, Row, Table};
use scalar::ScalarValue;
use serde_json::{Map, Number, Value as Json};
use std::{
    fmt::{self, Display, Formatter},
    fs, io,
    path::Path,
};
use types::SqlType;

#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Json(serde_json::Error),
    UnexpectedDocument(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(error) => write!(f, "database file is not accessible: {}", error),
            StorageError::Json(error) => write!(f, "database file is not valid JSON: {}", error),
            StorageError::UnexpectedDocument(reason) => write!(f, "unexpected database document: {}", reason),
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> StorageError {
        StorageError::Io(error)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> StorageError {
        StorageError::Json(error)
    }
}

fn unexpected<S: ToString>(reason: S) -> StorageError {
    StorageError::UnexpectedDocument(reason.to_string())
}

pub fn read_database<P: AsRef<Path>>(path: P) -> Result<Database, StorageError> {
    let text = fs::read_to_string(&path)?;
    let document: Json = serde_json::from_str(&text)?;
    let database = database_from_document(&document)?;
    log::debug!(
        "[STORAGE] loaded {:?} with {} relations from {:?}",
        database.name(),
        database.size(),
        path.as_ref()
    );
    Ok(database)
}

pub fn write_database<P: AsRef<Path>>(path: P, database: &Database) -> Result<(), StorageError> {
    let document = document_from_database(database);
    fs::write(&path, serde_json::to_string(&document)?)?;
    log::debug!(
        "[STORAGE] flushed {:?} with {} relations to {:?}",
        database.name(),
        database.size(),
        path.as_ref()
    );
    Ok(())
}

fn document_from_database(database: &Database) -> Json {
    let mut tables = vec![];
    for relation in database.relations() {
        let table = relation.table();
        let mut schema = Map::new();
        for column in table.columns() {
            let tag = match column.sql_type() {
                Some(tag) => Json::String(tag.to_string()),
                None => Json::Null,
            };
            schema.insert(column.name().to_owned(), tag);
        }
        let mut default_values = Map::new();
        for (column_name, value) in table.default_values() {
            default_values.insert(column_name.clone(), json_from_scalar(value));
        }
        let mut rows = vec![];
        for row in table.rows() {
            let mut record = Map::new();
            for (column, cell) in table.columns().iter().zip(row.cells()) {
                record.insert(column.name().to_owned(), json_from_scalar(cell));
            }
            rows.push(Json::Object(record));
        }
        let mut table_document = Map::new();
        table_document.insert("name".to_owned(), Json::String(table.name().to_owned()));
        table_document.insert("default_values".to_owned(), Json::Object(default_values));
        table_document.insert("schema".to_owned(), Json::Array(vec![Json::Object(schema)]));
        table_document.insert("rows".to_owned(), Json::Array(rows));
        tables.push(Json::Object(table_document));
    }
    let joined_table = match database.joined_table() {
        Some(table) => Json::String(table.name().to_owned()),
        None => Json::Null,
    };
    let mut document = Map::new();
    document.insert("name".to_owned(), Json::String(database.name().to_owned()));
    document.insert("joined_table".to_owned(), joined_table);
    document.insert("size".to_owned(), Json::Number(Number::from(database.size() as u64)));
    document.insert("tables".to_owned(), Json::Array(tables));
    Json::Object(document)
}

fn database_from_document(document: &Json) -> Result<Database, StorageError> {
    let document = document.as_object().ok_or_else(|| unexpected("root is not an object"))?;
    let name = document
        .get("name")
        .and_then(Json::as_str)
        .ok_or_else(|| unexpected("database name is missing"))?;
    let mut database = Database::new(name);
    // "joined_table" carries only a name; the transient join it pointed at
    // cannot be rebuilt, so it is tolerated and discarded. "size" is
    // recomputed while tables are added.
    if let Some(tables) = document.get("tables") {
        let tables = tables.as_array().ok_or_else(|| unexpected("tables is not an array"))?;
        for table_document in tables {
            database.add_table(table_from_document(table_document)?);
        }
    }
    Ok(database)
}

fn table_from_document(document: &Json) -> Result<Table, StorageError> {
    let document = document
        .as_object()
        .ok_or_else(|| unexpected("table entry is not an object"))?;
    let name = document
        .get("name")
        .and_then(Json::as_str)
        .ok_or_else(|| unexpected("table name is missing"))?;
    let schema = document
        .get("schema")
        .and_then(Json::as_array)
        .and_then(|entries| entries.first())
        .and_then(Json::as_object)
        .ok_or_else(|| unexpected("table schema is missing"))?;
    let mut columns = vec![];
    for (column_name, tag) in schema {
        // an unknown or null tag loads as an untyped column
        let sql_type = tag.as_str().and_then(SqlType::from_tag);
        columns.push(ColumnDef::new(column_name, sql_type));
    }
    let mut default_values = std::collections::BTreeMap::new();
    if let Some(defaults) = document.get("default_values").and_then(Json::as_object) {
        for (column_name, value) in defaults {
            default_values.insert(column_name.clone(), scalar_from_json(value)?);
        }
    }
    let mut table = Table::with_defaults(name, columns, default_values);
    if let Some(rows) = document.get("rows").and_then(Json::as_array) {
        for record in rows {
            let record = record
                .as_object()
                .ok_or_else(|| unexpected("table row is not an object"))?;
            let mut cells = vec![];
            for column in table.columns() {
                let cell = match record.get(column.name()) {
                    Some(value) => scalar_from_json(value)?,
                    None => ScalarValue::Null,
                };
                cells.push(cell);
            }
            table.push_row(Row::new(cells));
        }
    }
    Ok(table)
}

fn json_from_scalar(value: &ScalarValue) -> Json {
    match value {
        ScalarValue::Null => Json::Null,
        ScalarValue::String(value) => Json::String(value.clone()),
        ScalarValue::Bytes(bytes) => Json::Array(bytes.iter().map(|byte| Json::Number(Number::from(*byte))).collect()),
        number => match number.as_i64() {
            Some(value) if number.type_family() == Some(types::SqlTypeFamily::Integer) => {
                Json::Number(Number::from(value))
            }
            _ => number
                .as_f64()
                .and_then(Number::from_f64)
                .map(Json::Number)
                .unwrap_or(Json::Null),
        },
    }
}

fn scalar_from_json(value: &Json) -> Result<ScalarValue, StorageError> {
    match value {
        Json::Null => Ok(ScalarValue::Null),
        Json::String(value) => Ok(ScalarValue::String(value.clone())),
        Json::Number(number) => match number.as_i64() {
            Some(value) => Ok(ScalarValue::int(value)),
            None => number
                .as_f64()
                .map(ScalarValue::real)
                .ok_or_else(|| unexpected(format!("unrepresentable number {}", number))),
        },
        Json::Array(bytes) => {
            let mut buffer = Vec::with_capacity(bytes.len());
            for byte in bytes {
                let byte = byte
                    .as_u64()
                    .filter(|byte| *byte < 256)
                    .ok_or_else(|| unexpected("byte array holds a value out of range"))?;
                buffer.push(byte as u8);
            }
            Ok(ScalarValue::Bytes(buffer))
        }
        other => Err(unexpected(format!("cell value {} is not supported", other))),
    }
}
