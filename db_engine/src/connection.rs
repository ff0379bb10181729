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

use crate::{lock_manager::LockKind, query_response::QueryError, registry::Registry};
use query_ast::{
    Aggregate, Definition, InsertQuery, InsertSource, Query, SelectItem, SelectQuery, Statement, TableExpression,
    TransactionMode, TransactionStatement, Values,
};
use query_parser::{ParseError, QueryParser};
use relation::{
    left_outer_join, sort_rows, Database, DistinctKey, ProjectionColumn, Relation, RowPredicate, Table, View,
};
use scalar::ScalarValue;
use std::collections::BTreeMap;
use storage::StorageError;
use types::SqlType;

const QUERY_PARSER: QueryParser = QueryParser::new();

/// Rows returned by a SELECT; every other statement answers with an empty
/// result set.
pub type ResultSet = Vec<Vec<ScalarValue>>;

#[derive(Debug, Clone, Copy)]
enum LockAction {
    Read,
    Write,
    Commit,
    Relinquish,
}

enum SourceKind {
    Single(String),
    Join { left: String },
}

/// Per-caller handle on a database file. The connection operates either on
/// the shared committed database (reads in auto-commit) or on its private
/// deep-copied snapshot (writes and open transactions); commit publishes
/// the snapshot through the registry.
pub struct Connection {
    filename: String,
    registry: Registry,
    database: Database,
    transaction_mode: Option<TransactionMode>,
    transaction_lock: Option<LockKind>,
}

impl Connection {
    pub(crate) fn new(filename: String, registry: Registry, database: Database) -> Connection {
        Connection {
            filename,
            registry,
            database,
            transaction_mode: None,
            transaction_lock: None,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Runs one SQL statement. Statements that match none of the
    /// recognized verbs answer with an empty result set.
    pub fn execute(&mut self, sql: &str) -> Result<ResultSet, QueryError> {
        let statement = match QUERY_PARSER.parse(sql) {
            Ok(statement) => statement,
            Err(ParseError::UnsupportedStatement) => {
                log::debug!("[DISPATCH] unrecognized statement {:?}", sql);
                return Ok(vec![]);
            }
            Err(error) => return Err(error.into()),
        };
        log::trace!("[DISPATCH] {:?}", statement);
        match statement {
            Statement::Transaction(transaction) => self.execute_transaction(transaction).map(|()| vec![]),
            Statement::Definition(definition) => self.execute_definition(definition).map(|()| vec![]),
            Statement::Query(Query::Insert(insert)) => self.execute_insert(insert).map(|()| vec![]),
            Statement::Query(Query::Update(update)) => self.execute_update(update).map(|()| vec![]),
            Statement::Query(Query::Delete(delete)) => self.execute_delete(delete).map(|()| vec![]),
            Statement::Query(Query::Select(select)) => self.execute_select(select),
        }
    }

    /// Substitutes each parameter tuple into the `?` placeholders and
    /// executes the statement once per tuple. Text parameters are
    /// single-quoted, everything else is rendered decimally.
    pub fn executemany(&mut self, statement: &str, params: &[Vec<ScalarValue>]) -> Result<(), QueryError> {
        for tuple in params {
            let mut bound = statement.to_owned();
            for value in tuple {
                if !bound.contains('?') {
                    break;
                }
                bound = bound.replacen('?', &value.as_literal(), 1);
            }
            self.execute(&bound)?;
        }
        Ok(())
    }

    /// Flushes the connection's current database to its file.
    pub fn close(self) -> Result<(), StorageError> {
        storage::write_database(&self.filename, &self.database)
    }

    fn execute_transaction(&mut self, statement: TransactionStatement) -> Result<(), QueryError> {
        match statement {
            TransactionStatement::Begin(mode) => {
                if self.transaction_mode.is_some() {
                    return Err(QueryError::transaction_already_started());
                }
                match mode {
                    TransactionMode::Deferred => {}
                    TransactionMode::Immediate => self.acquire(LockKind::Reserved)?,
                    TransactionMode::Exclusive => self.acquire(LockKind::Exclusive)?,
                }
                // the snapshot is installed only after the lock is granted
                self.database = self.registry.committed(&self.filename);
                self.transaction_mode = Some(mode);
                log::debug!("[TXN] {:?} started on {:?}", mode, self.filename);
                Ok(())
            }
            TransactionStatement::Commit => {
                if self.transaction_mode.is_none() {
                    return Err(QueryError::no_active_transaction());
                }
                match self.transaction_lock {
                    None | Some(LockKind::Shared) => {
                        // nothing written: drop the snapshot and rejoin the
                        // committed state
                        self.release();
                        self.transaction_mode = None;
                        self.database = self.registry.committed(&self.filename);
                    }
                    Some(LockKind::Reserved) => {
                        self.acquire(LockKind::Exclusive)?;
                        self.release();
                        self.transaction_mode = None;
                        self.registry.publish(&self.filename, self.database.clone());
                    }
                    Some(LockKind::Exclusive) => {
                        self.release();
                        self.transaction_mode = None;
                        self.registry.publish(&self.filename, self.database.clone());
                    }
                }
                log::debug!("[TXN] committed on {:?}", self.filename);
                Ok(())
            }
            TransactionStatement::Rollback => {
                if self.transaction_mode.is_none() {
                    return Err(QueryError::no_active_transaction());
                }
                self.release();
                self.transaction_mode = None;
                self.database = self.registry.committed(&self.filename);
                log::debug!("[TXN] rolled back on {:?}", self.filename);
                Ok(())
            }
        }
    }

    fn execute_definition(&mut self, definition: Definition) -> Result<(), QueryError> {
        match definition {
            Definition::CreateTable {
                table_name,
                columns,
                if_not_exists,
            } => self.write_statement(move |connection| {
                if connection.database.contains(&table_name) {
                    if if_not_exists {
                        return Ok(());
                    }
                    return Err(QueryError::table_already_exists(&table_name));
                }
                let mut defaults = BTreeMap::new();
                let mut schema = vec![];
                for column in columns {
                    if let Some(value) = column.default {
                        defaults.insert(column.name.clone(), ScalarValue::from(value));
                    }
                    schema.push(relation::ColumnDef::new(column.name, column.data_type.map(SqlType::from)));
                }
                connection
                    .database
                    .add_table(Table::with_defaults(table_name, schema, defaults));
                Ok(())
            }),
            Definition::DropTable { table_name, if_exists } => self.write_statement(move |connection| {
                if !connection.database.contains(&table_name) {
                    if if_exists {
                        return Ok(());
                    }
                    return Err(QueryError::table_does_not_exist(&table_name));
                }
                connection.database.remove(&table_name);
                Ok(())
            }),
            Definition::CreateView { view_name, query } => self.execute_create_view(view_name, query),
        }
    }

    /// CREATE VIEW reads first (running the stored SELECT to materialize
    /// the initial rows and, for a join source, the scratch joined table),
    /// captures the backing schema, and only then upgrades to a write to
    /// install the view.
    fn execute_create_view(&mut self, view_name: String, query: SelectQuery) -> Result<(), QueryError> {
        self.lock_check(LockAction::Read)?;
        if self.database.contains(&view_name) {
            return Err(self.abort_statement(QueryError::view_already_exists(view_name)));
        }
        let is_join = matches!(query.source, TableExpression::LeftOuterJoin { .. });
        let base_name = query.source.base_table().to_owned();
        if !is_join && !self.database.contains(&base_name) {
            return Err(self.abort_statement(QueryError::table_does_not_exist(base_name)));
        }
        let statement_text = format!("{};", query);
        let view_columns: Vec<String> = query.select_items.iter().map(|item| item.to_string()).collect();
        let rows = self.execute_select(query)?;
        let (backing_schema, base_table) = if is_join {
            match self.database.joined_table() {
                Some(joined) => (joined.columns().to_vec(), joined.name().to_owned()),
                None => return Err(QueryError::table_does_not_exist(base_name)),
            }
        } else {
            match self.database.relation(&base_name) {
                Some(relation) => (relation.table().columns().to_vec(), base_name),
                None => return Err(QueryError::table_does_not_exist(base_name)),
            }
        };
        self.lock_check(LockAction::Write)?;
        let mut view = View::new(&view_name, base_table, view_columns, &backing_schema, statement_text);
        view.replace_rows(rows);
        self.database.add_view(view);
        self.database.clear_joined_table();
        if self.transaction_mode.is_none() {
            self.lock_check(LockAction::Commit)?;
        }
        Ok(())
    }

    fn execute_insert(&mut self, insert: InsertQuery) -> Result<(), QueryError> {
        self.write_statement(move |connection| {
            let table = match connection.database.relation_mut(&insert.table_name) {
                Some(relation) => relation.table_mut(),
                None => return Err(QueryError::table_does_not_exist(&insert.table_name)),
            };
            match insert.source {
                InsertSource::DefaultValues => table.insert_default_values(),
                InsertSource::Values(Values(rows)) => {
                    let columns = if insert.columns.is_empty() {
                        None
                    } else {
                        Some(insert.columns.as_slice())
                    };
                    for row in rows {
                        let values = row.into_iter().map(ScalarValue::from).collect();
                        table.insert(values, columns);
                    }
                }
            }
            Ok(())
        })
    }

    fn execute_update(&mut self, update: query_ast::UpdateQuery) -> Result<(), QueryError> {
        self.write_statement(move |connection| {
            let table_name = update.table_name;
            let table = match connection.database.relation_mut(&table_name) {
                Some(relation) => relation.table_mut(),
                None => return Err(QueryError::table_does_not_exist(&table_name)),
            };
            let mut assignments = vec![];
            for assignment in update.assignments {
                match table.column_index(&unqualify_for(&assignment.column, &table_name)) {
                    Some(index) => assignments.push((index, ScalarValue::from(assignment.value))),
                    None => {
                        log::debug!(
                            "[UPDATE] column {:?} is not in {:?}, update dropped",
                            assignment.column,
                            table_name
                        );
                        return Ok(());
                    }
                }
            }
            let predicate = match resolve_predicate(table, &table_name, update.where_clause.as_ref()) {
                Resolved::Unconditional => None,
                Resolved::Predicate(predicate) => Some(predicate),
                Resolved::NoMatch => return Ok(()),
            };
            table.update_matching(&assignments, predicate.as_ref());
            Ok(())
        })
    }

    fn execute_delete(&mut self, delete: query_ast::DeleteQuery) -> Result<(), QueryError> {
        self.write_statement(move |connection| {
            let table_name = delete.table_name;
            let table = match connection.database.relation_mut(&table_name) {
                Some(relation) => relation.table_mut(),
                None => return Err(QueryError::table_does_not_exist(&table_name)),
            };
            let predicate = match resolve_predicate(table, &table_name, delete.where_clause.as_ref()) {
                Resolved::Unconditional => None,
                Resolved::Predicate(predicate) => Some(predicate),
                Resolved::NoMatch => return Ok(()),
            };
            table.remove_matching(predicate.as_ref());
            Ok(())
        })
    }

    fn execute_select(&mut self, query: SelectQuery) -> Result<ResultSet, QueryError> {
        self.lock_check(LockAction::Read)?;
        let result = self.run_select(&query);
        if self.transaction_mode.is_none() {
            self.lock_check(LockAction::Relinquish)?;
        }
        result
    }

    fn run_select(&mut self, query: &SelectQuery) -> Result<ResultSet, QueryError> {
        let (table, source) = match &query.source {
            TableExpression::Table { name } => {
                let table = match self.database.relation(name) {
                    Some(Relation::View(view)) => {
                        let view = view.clone();
                        self.refresh_view(view)?
                    }
                    Some(Relation::Table(table)) => table.clone(),
                    None => return Err(QueryError::table_does_not_exist(name)),
                };
                (table, SourceKind::Single(name.clone()))
            }
            TableExpression::LeftOuterJoin {
                left,
                right,
                on_left,
                on_right,
            } => {
                let left_table = match self.database.relation(left) {
                    Some(relation) => relation.table().clone(),
                    None => return Err(QueryError::table_does_not_exist(left)),
                };
                let right_table = match self.database.relation(right) {
                    Some(relation) => relation.table().clone(),
                    None => return Err(QueryError::table_does_not_exist(right)),
                };
                let left_key = left_table
                    .column_index(&unqualify_for(on_left, left))
                    .ok_or_else(|| QueryError::column_does_not_exist(on_left))?;
                let right_key = right_table
                    .column_index(&unqualify_for(on_right, right))
                    .ok_or_else(|| QueryError::column_does_not_exist(on_right))?;
                let joined = left_outer_join(&left_table, &right_table, left_key, right_key);
                self.database.set_joined_table(joined.clone());
                (joined, SourceKind::Join { left: left.clone() })
            }
        };

        let resolve = |column: &str| -> Option<usize> {
            match &source {
                SourceKind::Single(alias) => table.column_index(&unqualify_for(column, alias)),
                SourceKind::Join { left } => {
                    if column.contains('.') {
                        table.column_index(column)
                    } else {
                        table.column_index(&format!("{}.{}", left, column))
                    }
                }
            }
        };

        let mut predicate = None;
        if let Some(where_clause) = &query.where_clause {
            match resolve(&where_clause.column) {
                Some(index) => {
                    predicate = Some(RowPredicate {
                        column: index,
                        op: where_clause.op,
                        value: ScalarValue::from(where_clause.value.clone()),
                    })
                }
                None => {
                    log::debug!("[SELECT] predicate column {:?} is unknown, no rows match", where_clause.column);
                    return Ok(vec![]);
                }
            }
        }
        let mut rows = table.filter_rows(predicate.as_ref());
        if let Some(order_by) = &query.order_by {
            // ordering keys that are not in the schema are dropped
            let keys: Vec<usize> = order_by.columns.iter().filter_map(|column| resolve(column)).collect();
            sort_rows(&mut rows, &keys, order_by.descending);
        }
        let columns: Vec<ProjectionColumn> = query
            .select_items
            .iter()
            .filter_map(|item| match item {
                SelectItem::Wildcard => Some(ProjectionColumn::Wildcard),
                SelectItem::Column(column) => resolve(column).map(ProjectionColumn::Cell),
            })
            .collect();
        let distinct = query.distinct.as_ref().and_then(|column| {
            if column == "*" {
                Some(DistinctKey::WholeRow)
            } else {
                resolve(column).map(DistinctKey::Cell)
            }
        });
        let mut result = table.project_rows(&rows, &columns, distinct);
        if let Some(aggregate) = query.aggregate {
            result = match aggregate {
                Aggregate::Min => result.into_iter().min(),
                Aggregate::Max => result.into_iter().max(),
            }
            .map(|row| vec![row])
            .unwrap_or_default();
        }
        Ok(result)
    }

    /// Re-executes the view's stored SELECT and swaps the materialization;
    /// a view never serves stale rows.
    fn refresh_view(&mut self, view: View) -> Result<Table, QueryError> {
        let rows = self.execute(view.statement())?;
        let mut refreshed = View::new(
            view.name(),
            view.base_table().to_owned(),
            view.view_columns().to_vec(),
            view.table().columns(),
            view.statement().to_owned(),
        );
        refreshed.replace_rows(rows);
        let table = refreshed.table().clone();
        self.database.replace(Relation::View(refreshed));
        Ok(table)
    }

    /// Write-statement harness: takes the write lock, runs the operation
    /// against the working snapshot, then publishes (auto-commit) or keeps
    /// the lock for the open transaction. An error in auto-commit
    /// relinquishes the lock.
    fn write_statement<F>(&mut self, operation: F) -> Result<(), QueryError>
    where
        F: FnOnce(&mut Connection) -> Result<(), QueryError>,
    {
        self.lock_check(LockAction::Write)?;
        match operation(self) {
            Ok(()) => {
                if self.transaction_mode.is_none() {
                    self.lock_check(LockAction::Commit)?;
                }
                Ok(())
            }
            Err(error) => Err(self.abort_statement(error)),
        }
    }

    fn abort_statement(&mut self, error: QueryError) -> QueryError {
        if self.transaction_mode.is_none() {
            self.release();
        }
        error
    }

    /// Central lock policy: decides, from the transaction mode and the
    /// currently held lock, which transition to request and what to do
    /// with the working database handle.
    fn lock_check(&mut self, action: LockAction) -> Result<(), QueryError> {
        match self.transaction_mode {
            None => match action {
                LockAction::Read => {
                    self.acquire(LockKind::Shared)?;
                    self.database = self.registry.committed(&self.filename);
                }
                LockAction::Write => {
                    self.acquire(LockKind::Exclusive)?;
                    self.database = self.registry.committed(&self.filename);
                }
                LockAction::Commit => {
                    self.acquire(LockKind::Exclusive)?;
                    self.release();
                    self.registry.publish(&self.filename, self.database.clone());
                }
                LockAction::Relinquish => self.release(),
            },
            Some(TransactionMode::Deferred) => match action {
                LockAction::Read => {
                    if self.transaction_lock.is_none() {
                        self.acquire(LockKind::Shared)?;
                    }
                }
                LockAction::Write => self.acquire(LockKind::Reserved)?,
                LockAction::Commit | LockAction::Relinquish => {}
            },
            Some(TransactionMode::Immediate) => match action {
                LockAction::Write => {
                    if self.transaction_lock != Some(LockKind::Exclusive) {
                        self.acquire(LockKind::Reserved)?;
                    }
                }
                LockAction::Read | LockAction::Commit | LockAction::Relinquish => {}
            },
            Some(TransactionMode::Exclusive) => {}
        }
        Ok(())
    }

    fn acquire(&mut self, kind: LockKind) -> Result<(), QueryError> {
        let held = self.transaction_lock;
        self.registry
            .with_locks(&self.filename, |locks| locks.add_lock(kind, held))?;
        self.transaction_lock = Some(kind);
        Ok(())
    }

    fn release(&mut self) {
        let held = self.transaction_lock.take();
        if held.is_some() {
            self.registry.with_locks(&self.filename, |locks| locks.remove_lock(held));
        }
    }
}

enum Resolved {
    Unconditional,
    Predicate(RowPredicate),
    NoMatch,
}

fn resolve_predicate(table: &Table, table_name: &str, predicate: Option<&query_ast::Predicate>) -> Resolved {
    match predicate {
        None => Resolved::Unconditional,
        Some(predicate) => match table.column_index(&unqualify_for(&predicate.column, table_name)) {
            Some(index) => Resolved::Predicate(RowPredicate {
                column: index,
                op: predicate.op,
                value: ScalarValue::from(predicate.value.clone()),
            }),
            None => {
                log::debug!("[WHERE] column {:?} is not in {:?}, no rows match", predicate.column, table_name);
                Resolved::NoMatch
            }
        },
    }
}

fn unqualify_for(column: &str, table_name: &str) -> String {
    let prefix = format!("{}.", table_name);
    match column.strip_prefix(&prefix) {
        Some(stripped) => stripped.to_owned(),
        None => column.to_owned(),
    }
}
