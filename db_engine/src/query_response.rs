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

use query_parser::ParseError;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum QueryErrorKind {
    MalformedStatement(String),
    TableAlreadyExists(String),
    TableDoesNotExist(String),
    ViewAlreadyExists(String),
    ColumnDoesNotExist(String),
    TransactionAlreadyStarted,
    NoActiveTransaction,
    UnknownTransactionMode(String),
    LockConflict(String),
}

impl Display for QueryErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            QueryErrorKind::MalformedStatement(reason) => write!(f, "malformed statement: {}", reason),
            QueryErrorKind::TableAlreadyExists(table_name) => write!(f, "table \"{}\" already exists", table_name),
            QueryErrorKind::TableDoesNotExist(table_name) => write!(f, "table \"{}\" does not exist", table_name),
            QueryErrorKind::ViewAlreadyExists(view_name) => write!(f, "view \"{}\" already exists", view_name),
            QueryErrorKind::ColumnDoesNotExist(column) => write!(f, "column \"{}\" does not exist", column),
            QueryErrorKind::TransactionAlreadyStarted => {
                write!(f, "cannot start a transaction within a transaction")
            }
            QueryErrorKind::NoActiveTransaction => write!(f, "cannot commit - no transaction is active"),
            QueryErrorKind::UnknownTransactionMode(mode) => write!(f, "unknown transaction mode \"{}\"", mode),
            QueryErrorKind::LockConflict(reason) => write!(f, "database is locked: {}", reason),
        }
    }
}

/// An error surfaced to the caller of [`Connection::execute`].
///
/// [`Connection::execute`]: crate::Connection::execute
#[derive(Debug, PartialEq, Clone)]
pub struct QueryError {
    kind: QueryErrorKind,
}

impl QueryError {
    /// The tokenizer made no progress or a recognized verb breaks grammar.
    pub fn malformed_statement<S: ToString>(reason: S) -> QueryError {
        QueryError {
            kind: QueryErrorKind::MalformedStatement(reason.to_string()),
        }
    }

    /// CREATE TABLE without IF NOT EXISTS over an existing relation.
    pub fn table_already_exists<S: ToString>(table_name: S) -> QueryError {
        QueryError {
            kind: QueryErrorKind::TableAlreadyExists(table_name.to_string()),
        }
    }

    /// A statement names a table the database does not hold.
    pub fn table_does_not_exist<S: ToString>(table_name: S) -> QueryError {
        QueryError {
            kind: QueryErrorKind::TableDoesNotExist(table_name.to_string()),
        }
    }

    /// CREATE VIEW over a name that is already taken.
    pub fn view_already_exists<S: ToString>(view_name: S) -> QueryError {
        QueryError {
            kind: QueryErrorKind::ViewAlreadyExists(view_name.to_string()),
        }
    }

    /// A join key names a column its table does not hold.
    pub fn column_does_not_exist<S: ToString>(column: S) -> QueryError {
        QueryError {
            kind: QueryErrorKind::ColumnDoesNotExist(column.to_string()),
        }
    }

    /// BEGIN while a transaction is already open.
    pub fn transaction_already_started() -> QueryError {
        QueryError {
            kind: QueryErrorKind::TransactionAlreadyStarted,
        }
    }

    /// COMMIT or ROLLBACK without an open transaction.
    pub fn no_active_transaction() -> QueryError {
        QueryError {
            kind: QueryErrorKind::NoActiveTransaction,
        }
    }

    pub fn unknown_transaction_mode<S: ToString>(mode: S) -> QueryError {
        QueryError {
            kind: QueryErrorKind::UnknownTransactionMode(mode.to_string()),
        }
    }

    /// An impossible lock transition was requested.
    pub fn lock_conflict<S: ToString>(reason: S) -> QueryError {
        QueryError {
            kind: QueryErrorKind::LockConflict(reason.to_string()),
        }
    }

    pub fn is_lock_conflict(&self) -> bool {
        matches!(self.kind, QueryErrorKind::LockConflict(_))
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl From<ParseError> for QueryError {
    fn from(error: ParseError) -> QueryError {
        match error {
            ParseError::MalformedStatement(reason) => QueryError::malformed_statement(reason),
            ParseError::UnsupportedStatement => QueryError::malformed_statement("statement is not supported"),
            ParseError::UnknownTransactionMode(mode) => QueryError::unknown_transaction_mode(mode),
        }
    }
}
