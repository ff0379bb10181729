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

use crate::{table::Table, view::View};
use std::collections::BTreeMap;

/// A named relation: a base table or a view over one.
#[derive(Debug, PartialEq, Clone)]
pub enum Relation {
    Table(Table),
    View(View),
}

impl Relation {
    pub fn name(&self) -> &str {
        match self {
            Relation::Table(table) => table.name(),
            Relation::View(view) => view.name(),
        }
    }

    /// The table shape of the relation; for a view that is its (possibly
    /// stale) materialization.
    pub fn table(&self) -> &Table {
        match self {
            Relation::Table(table) => table,
            Relation::View(view) => view.table(),
        }
    }

    /// Mutable table shape; for a view that is its ephemeral
    /// materialization, which the next read will overwrite anyway.
    pub fn table_mut(&mut self) -> &mut Table {
        match self {
            Relation::Table(table) => table,
            Relation::View(view) => view.table_mut(),
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Relation::Table(table) => Some(table),
            Relation::View(_) => None,
        }
    }
}

/// A named collection of tables and views plus the scratch slot for the
/// most recently materialized join.
#[derive(Debug, PartialEq, Clone)]
pub struct Database {
    name: String,
    size: usize,
    relations: BTreeMap<String, Relation>,
    joined_table: Option<Table>,
}

impl Database {
    pub fn new<S: ToString>(name: S) -> Database {
        Database {
            name: name.to_string(),
            size: 0,
            relations: BTreeMap::new(),
            joined_table: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn relation_mut(&mut self, name: &str) -> Option<&mut Relation> {
        self.relations.get_mut(name)
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    pub fn add_table(&mut self, table: Table) {
        self.relations.insert(table.name().to_owned(), Relation::Table(table));
        self.size += 1;
    }

    pub fn add_view(&mut self, view: View) {
        self.relations.insert(view.name().to_owned(), Relation::View(view));
        self.size += 1;
    }

    /// Replaces a relation in place without touching the size counter.
    pub fn replace(&mut self, relation: Relation) {
        self.relations.insert(relation.name().to_owned(), relation);
    }

    pub fn remove(&mut self, name: &str) -> Option<Relation> {
        let removed = self.relations.remove(name);
        if removed.is_some() {
            self.size -= 1;
        }
        removed
    }

    pub fn joined_table(&self) -> Option<&Table> {
        self.joined_table.as_ref()
    }

    pub fn set_joined_table(&mut self, table: Table) {
        self.joined_table = Some(table);
    }

    pub fn clear_joined_table(&mut self) {
        self.joined_table = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnDef;
    use scalar::ScalarValue;
    use types::SqlType;

    fn names_table() -> Table {
        Table::new(
            "names",
            vec![
                ColumnDef::new("name", Some(SqlType::Text)),
                ColumnDef::new("id", Some(SqlType::Integer)),
            ],
        )
    }

    #[test]
    fn size_tracks_tables_and_views() {
        let mut database = Database::new("test.db");
        assert_eq!(database.size(), 0);
        database.add_table(names_table());
        assert_eq!(database.size(), 1);
        database.add_view(View::new(
            "v",
            "names".to_owned(),
            vec!["*".to_owned()],
            names_table().columns(),
            "SELECT * FROM names;".to_owned(),
        ));
        assert_eq!(database.size(), 2);
        database.remove("v");
        database.remove("names");
        assert_eq!(database.size(), 0);
        database.remove("absent");
        assert_eq!(database.size(), 0);
    }

    #[test]
    fn snapshots_are_deep_and_independent() {
        let mut database = Database::new("test.db");
        database.add_table(names_table());
        let snapshot = database.clone();
        database
            .relation_mut("names")
            .and_then(Relation::as_table_mut)
            .unwrap()
            .insert(vec![ScalarValue::string("James"), ScalarValue::int(1)], None);
        assert_eq!(snapshot.relation("names").unwrap().table().size(), 0);
        assert_eq!(database.relation("names").unwrap().table().size(), 1);
        assert_ne!(snapshot, database);
    }

    #[test]
    fn scratch_join_slot_is_consumed_once() {
        let mut database = Database::new("test.db");
        database.set_joined_table(names_table());
        assert!(database.joined_table().is_some());
        database.clear_joined_table();
        assert!(database.joined_table().is_none());
    }
}
