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
fn begin_defaults_to_deferred() {
    assert_eq!(
        QUERY_PARSER.parse("BEGIN TRANSACTION;"),
        Ok(Statement::Transaction(TransactionStatement::Begin(
            TransactionMode::Deferred
        )))
    );
}

#[test]
fn begin_with_explicit_modes() {
    assert_eq!(
        QUERY_PARSER.parse("BEGIN DEFERRED TRANSACTION;"),
        Ok(Statement::Transaction(TransactionStatement::Begin(
            TransactionMode::Deferred
        )))
    );
    assert_eq!(
        QUERY_PARSER.parse("BEGIN IMMEDIATE TRANSACTION;"),
        Ok(Statement::Transaction(TransactionStatement::Begin(
            TransactionMode::Immediate
        )))
    );
    assert_eq!(
        QUERY_PARSER.parse("BEGIN EXCLUSIVE TRANSACTION;"),
        Ok(Statement::Transaction(TransactionStatement::Begin(
            TransactionMode::Exclusive
        )))
    );
}

#[test]
fn begin_with_unknown_mode() {
    assert_eq!(
        QUERY_PARSER.parse("BEGIN EVENTUAL TRANSACTION;"),
        Err(ParseError::UnknownTransactionMode("EVENTUAL".to_owned()))
    );
}

#[test]
fn commit_and_rollback() {
    assert_eq!(
        QUERY_PARSER.parse("COMMIT TRANSACTION;"),
        Ok(Statement::Transaction(TransactionStatement::Commit))
    );
    assert_eq!(
        QUERY_PARSER.parse("ROLLBACK TRANSACTION;"),
        Ok(Statement::Transaction(TransactionStatement::Rollback))
    );
}

#[test]
fn bare_commit_is_not_recognized() {
    assert_eq!(QUERY_PARSER.parse("COMMIT;"), Err(ParseError::UnsupportedStatement));
    assert_eq!(QUERY_PARSER.parse("ROLLBACK;"), Err(ParseError::UnsupportedStatement));
}

#[test]
fn missing_semicolon() {
    assert_eq!(
        QUERY_PARSER.parse("BEGIN TRANSACTION"),
        Err(ParseError::MalformedStatement(
            "statement does not end with ';'".to_owned()
        ))
    );
}
