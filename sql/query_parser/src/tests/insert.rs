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

use super::*;

fn insert(columns: Vec<&str>, rows: Vec<Vec<Value>>) -> Statement {
    Statement::Query(Query::Insert(InsertQuery {
        table_name: "names".to_owned(),
        columns: columns.into_iter().map(ToOwned::to_owned).collect(),
        source: InsertSource::Values(Values(rows)),
    }))
}

#[test]
fn insert_single_row() {
    assert_eq!(
        QUERY_PARSER.parse("INSERT INTO names VALUES ('James', 1);"),
        Ok(insert(
            vec![],
            vec![vec![Value::String("James".to_owned()), Value::Int(1)]]
        ))
    );
}

#[test]
fn insert_multiple_rows() {
    assert_eq!(
        QUERY_PARSER.parse("INSERT INTO names VALUES ('James', 1), (NULL, 4);"),
        Ok(insert(
            vec![],
            vec![
                vec![Value::String("James".to_owned()), Value::Int(1)],
                vec![Value::Null, Value::Int(4)],
            ]
        ))
    );
}

#[test]
fn insert_into_named_columns() {
    assert_eq!(
        QUERY_PARSER.parse("INSERT INTO names (id, name) VALUES (2, 'Li');"),
        Ok(insert(
            vec!["id", "name"],
            vec![vec![Value::Int(2), Value::String("Li".to_owned())]]
        ))
    );
}

#[test]
fn insert_default_values() {
    assert_eq!(
        QUERY_PARSER.parse("INSERT INTO names DEFAULT VALUES;"),
        Ok(Statement::Query(Query::Insert(InsertQuery {
            table_name: "names".to_owned(),
            columns: vec![],
            source: InsertSource::DefaultValues,
        })))
    );
}

#[test]
fn insert_numeric_literals() {
    assert_eq!(
        QUERY_PARSER.parse("INSERT INTO t VALUES (-17, 3.5, 2.5E2);"),
        Ok(Statement::Query(Query::Insert(InsertQuery {
            table_name: "t".to_owned(),
            columns: vec![],
            source: InsertSource::Values(Values(vec![vec![
                Value::Int(-17),
                Value::Number("3.5".to_owned()),
                Value::Number("2.5E2".to_owned()),
            ]])),
        })))
    );
}

#[test]
fn insert_without_into_is_not_recognized() {
    assert_eq!(
        QUERY_PARSER.parse("INSERT names VALUES (1);"),
        Err(ParseError::UnsupportedStatement)
    );
}
