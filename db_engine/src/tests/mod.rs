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
use scalar::ScalarValue;


const DB: &str = "test.db";

fn string(value: &str) -> ScalarValue {
    ScalarValue::string(value)
}

fn int(value: i64) -> ScalarValue {
    ScalarValue::int(value)
}

fn real(value: f64) -> ScalarValue {
    ScalarValue::real(value)
}

fn null() -> ScalarValue {
    ScalarValue::Null
}

#[rstest::fixture]
fn registry() -> Registry {
    Registry::new()
}

/// A registry holding `test.db` with the `names` table of the examples.
#[rstest::fixture]
fn with_names() -> Registry {
    let registry = Registry::new();
    let mut connection = registry.connect(DB).expect("connected");
    connection
        .execute("CREATE TABLE names (name TEXT, id INTEGER);")
        .expect("table created");
    connection
        .execute("INSERT INTO names VALUES ('James', 1), ('Yaxin', 3), ('Li', 2), (NULL, 4);")
        .expect("rows inserted");
    registry
}

/// `with_names` plus the `grades` table used by the join scenarios.
#[rstest::fixture]
fn with_names_and_grades(with_names: Registry) -> Registry {
    let mut connection = with_names.connect(DB).expect("connected");
    connection
        .execute("CREATE TABLE grades (id INTEGER, grade REAL);")
        .expect("table created");
    connection
        .execute("INSERT INTO grades VALUES (3, 3.0), (1, 2.0), (2, 3.5);")
        .expect("rows inserted");
    with_names
}
