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

#[test]
fn update_single_assignment() {
    assert_eq!(
        QUERY_PARSER.parse("UPDATE names SET name = 'Li' WHERE id = 2;"),
        Ok(Statement::Query(Query::Update(UpdateQuery {
            table_name: "names".to_owned(),
            assignments: vec![Assignment {
                column: "name".to_owned(),
                value: Value::String("Li".to_owned()),
            }],
            where_clause: Some(Predicate {
                column: "id".to_owned(),
                op: PredicateOp::Eq,
                value: Value::Int(2),
            }),
        })))
    );
}

#[test]
fn update_every_row() {
    assert_eq!(
        QUERY_PARSER.parse("UPDATE names SET id = 0, name = NULL;"),
        Ok(Statement::Query(Query::Update(UpdateQuery {
            table_name: "names".to_owned(),
            assignments: vec![
                Assignment {
                    column: "id".to_owned(),
                    value: Value::Int(0),
                },
                Assignment {
                    column: "name".to_owned(),
                    value: Value::Null,
                },
            ],
            where_clause: None,
        })))
    );
}

#[test]
fn delete_with_predicate() {
    assert_eq!(
        QUERY_PARSER.parse("DELETE FROM names WHERE id > 3;"),
        Ok(Statement::Query(Query::Delete(DeleteQuery {
            table_name: "names".to_owned(),
            where_clause: Some(Predicate {
                column: "id".to_owned(),
                op: PredicateOp::Gt,
                value: Value::Int(3),
            }),
        })))
    );
}

#[test]
fn delete_every_row() {
    assert_eq!(
        QUERY_PARSER.parse("DELETE FROM names;"),
        Ok(Statement::Query(Query::Delete(DeleteQuery {
            table_name: "names".to_owned(),
            where_clause: None,
        })))
    );
}
