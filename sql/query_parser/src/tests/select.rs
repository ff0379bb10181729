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
fn select_wildcard() {
    assert_eq!(
        QUERY_PARSER.parse("SELECT * FROM names;"),
        Ok(Statement::Query(Query::Select(select_all("names"))))
    );
}

#[test]
fn select_columns_with_order_by() {
    assert_eq!(
        QUERY_PARSER.parse("SELECT name, id FROM names ORDER BY id, name DESC;"),
        Ok(Statement::Query(Query::Select(SelectQuery {
            select_items: vec![
                SelectItem::Column("name".to_owned()),
                SelectItem::Column("id".to_owned()),
            ],
            order_by: Some(OrderBy {
                columns: vec!["id".to_owned(), "name".to_owned()],
                descending: true,
            }),
            ..select_all("names")
        })))
    );
}

#[test]
fn select_order_by_ascending_keyword() {
    assert_eq!(
        QUERY_PARSER.parse("SELECT * FROM names ORDER BY id ASC;"),
        Ok(Statement::Query(Query::Select(SelectQuery {
            order_by: Some(OrderBy {
                columns: vec!["id".to_owned()],
                descending: false,
            }),
            ..select_all("names")
        })))
    );
}

#[test]
fn select_distinct_column() {
    assert_eq!(
        QUERY_PARSER.parse("SELECT DISTINCT name FROM names;"),
        Ok(Statement::Query(Query::Select(SelectQuery {
            select_items: vec![SelectItem::Column("name".to_owned())],
            distinct: Some("name".to_owned()),
            ..select_all("names")
        })))
    );
}

#[test]
fn select_distinct_wildcard() {
    assert_eq!(
        QUERY_PARSER.parse("SELECT DISTINCT * FROM names;"),
        Ok(Statement::Query(Query::Select(SelectQuery {
            distinct: Some("*".to_owned()),
            ..select_all("names")
        })))
    );
}

#[test]
fn select_leading_aggregate() {
    assert_eq!(
        QUERY_PARSER.parse("SELECT MAX id FROM names;"),
        Ok(Statement::Query(Query::Select(SelectQuery {
            select_items: vec![SelectItem::Column("id".to_owned())],
            aggregate: Some(Aggregate::Max),
            ..select_all("names")
        })))
    );
    assert_eq!(
        QUERY_PARSER.parse("SELECT MIN id FROM names;"),
        Ok(Statement::Query(Query::Select(SelectQuery {
            select_items: vec![SelectItem::Column("id".to_owned())],
            aggregate: Some(Aggregate::Min),
            ..select_all("names")
        })))
    );
}

#[test]
fn select_left_outer_join() {
    assert_eq!(
        QUERY_PARSER.parse(
            "SELECT names.name, grades.grade FROM names \
             LEFT OUTER JOIN grades ON names.id = grades.id ORDER BY names.id;"
        ),
        Ok(Statement::Query(Query::Select(SelectQuery {
            select_items: vec![
                SelectItem::Column("names.name".to_owned()),
                SelectItem::Column("grades.grade".to_owned()),
            ],
            source: TableExpression::LeftOuterJoin {
                left: "names".to_owned(),
                right: "grades".to_owned(),
                on_left: "names.id".to_owned(),
                on_right: "grades.id".to_owned(),
            },
            order_by: Some(OrderBy {
                columns: vec!["names.id".to_owned()],
                descending: false,
            }),
            ..select_all("names")
        })))
    );
}

#[test]
fn parsed_select_renders_back_to_sql() {
    let sql = "SELECT names.name, grades.grade FROM names LEFT OUTER JOIN grades ON names.id = grades.id";
    match QUERY_PARSER.parse(&format!("{};", sql)) {
        Ok(Statement::Query(Query::Select(query))) => assert_eq!(query.to_string(), sql),
        other => panic!("expected a select statement but was {:?}", other),
    }
}

#[test]
fn statement_without_a_known_verb_is_unsupported() {
    assert_eq!(QUERY_PARSER.parse("VACUUM;"), Err(ParseError::UnsupportedStatement));
    assert_eq!(QUERY_PARSER.parse("5;"), Err(ParseError::UnsupportedStatement));
}
