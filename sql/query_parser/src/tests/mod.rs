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
use query_ast::Aggregate;

#[cfg(test)]
mod insert;
#[cfg(test)]
mod select;
#[cfg(test)]
mod transaction;
#[cfg(test)]
mod update_delete;

const QUERY_PARSER: QueryParser = QueryParser::new();

fn table(name: &str) -> TableExpression {
    TableExpression::Table { name: name.to_owned() }
}

fn select_all(table_name: &str) -> SelectQuery {
    SelectQuery {
        select_items: vec![SelectItem::Wildcard],
        distinct: None,
        aggregate: None,
        source: table(table_name),
        where_clause: None,
        order_by: None,
    }
}
