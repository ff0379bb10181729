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

use query_ast::{
    Assignment, ColumnDef, DataType, DeleteQuery, Definition, InsertQuery, InsertSource, OrderBy, Predicate,
    PredicateOp, Query, SelectItem, SelectQuery, Statement, TableExpression, TransactionMode, TransactionStatement,
    UpdateQuery, Value, Values,
};
use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    vec::IntoIter,
};

mod lexer;

pub use lexer::{Lexer, LexerError, Token};

#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// The scan made no progress or the statement breaks the grammar of a
    /// recognized verb.
    MalformedStatement(String),
    /// The statement matches none of the recognized verbs; the dispatcher
    /// answers it with an empty result.
    UnsupportedStatement,
    /// `BEGIN <mode> TRANSACTION` with a mode name that is not known.
    UnknownTransactionMode(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedStatement(reason) => write!(f, "malformed statement: {}", reason),
            ParseError::UnsupportedStatement => write!(f, "statement is not supported"),
            ParseError::UnknownTransactionMode(mode) => write!(f, "unknown transaction mode {}", mode),
        }
    }
}

impl From<LexerError> for ParseError {
    fn from(error: LexerError) -> ParseError {
        ParseError::MalformedStatement(error.to_string())
    }
}

pub struct QueryParser;

impl QueryParser {
    pub const fn new() -> QueryParser {
        QueryParser
    }

    pub fn parse(&self, sql: &str) -> Result<Statement, ParseError> {
        let tokens = Lexer::new(sql).tokenize()?;
        match tokens.last() {
            Some(Token::SemiColon) => {}
            _ => {
                return Err(ParseError::MalformedStatement(
                    "statement does not end with ';'".to_owned(),
                ))
            }
        }
        let mut stream = TokenStream::new(tokens);
        let verb = match stream.next() {
            Some(Token::Ident(word)) => word,
            _ => return Err(ParseError::UnsupportedStatement),
        };
        if keyword_is(&verb, "BEGIN") {
            self.parse_begin(&mut stream)
        } else if keyword_is(&verb, "COMMIT") {
            self.parse_transaction_end(&mut stream, TransactionStatement::Commit)
        } else if keyword_is(&verb, "ROLLBACK") {
            self.parse_transaction_end(&mut stream, TransactionStatement::Rollback)
        } else if keyword_is(&verb, "CREATE") {
            if stream.accept_keyword("TABLE") {
                self.parse_create_table(&mut stream)
            } else if stream.accept_keyword("VIEW") {
                self.parse_create_view(&mut stream)
            } else {
                Err(ParseError::UnsupportedStatement)
            }
        } else if keyword_is(&verb, "DROP") {
            if stream.accept_keyword("TABLE") {
                self.parse_drop_table(&mut stream)
            } else {
                Err(ParseError::UnsupportedStatement)
            }
        } else if keyword_is(&verb, "INSERT") {
            if stream.accept_keyword("INTO") {
                self.parse_insert(&mut stream)
            } else {
                Err(ParseError::UnsupportedStatement)
            }
        } else if keyword_is(&verb, "DELETE") {
            if stream.accept_keyword("FROM") {
                self.parse_delete(&mut stream)
            } else {
                Err(ParseError::UnsupportedStatement)
            }
        } else if keyword_is(&verb, "UPDATE") {
            self.parse_update(&mut stream)
        } else if keyword_is(&verb, "SELECT") {
            let query = self.parse_select(&mut stream)?;
            stream.expect_end()?;
            Ok(Statement::Query(Query::Select(query)))
        } else {
            Err(ParseError::UnsupportedStatement)
        }
    }

    fn parse_begin(&self, stream: &mut TokenStream) -> Result<Statement, ParseError> {
        let word = match stream.next() {
            Some(Token::Ident(word)) => word,
            _ => return Err(ParseError::UnsupportedStatement),
        };
        if keyword_is(&word, "TRANSACTION") {
            stream.expect_end()?;
            return Ok(Statement::Transaction(TransactionStatement::Begin(
                TransactionMode::Deferred,
            )));
        }
        if !stream.accept_keyword("TRANSACTION") {
            return Err(ParseError::UnsupportedStatement);
        }
        stream.expect_end()?;
        let mode = if keyword_is(&word, "DEFERRED") {
            TransactionMode::Deferred
        } else if keyword_is(&word, "IMMEDIATE") {
            TransactionMode::Immediate
        } else if keyword_is(&word, "EXCLUSIVE") {
            TransactionMode::Exclusive
        } else {
            return Err(ParseError::UnknownTransactionMode(word));
        };
        Ok(Statement::Transaction(TransactionStatement::Begin(mode)))
    }

    fn parse_transaction_end(
        &self,
        stream: &mut TokenStream,
        statement: TransactionStatement,
    ) -> Result<Statement, ParseError> {
        if !stream.accept_keyword("TRANSACTION") {
            return Err(ParseError::UnsupportedStatement);
        }
        stream.expect_end()?;
        Ok(Statement::Transaction(statement))
    }

    fn parse_create_table(&self, stream: &mut TokenStream) -> Result<Statement, ParseError> {
        let mut if_not_exists = false;
        if stream.accept_keyword("IF") {
            stream.expect_keyword("NOT")?;
            stream.expect_keyword("EXISTS")?;
            if_not_exists = true;
        }
        let table_name = stream.expect_ident("table name")?;
        stream.expect_token(Token::LeftParen)?;
        let mut columns = vec![];
        loop {
            let name = stream.expect_ident("column name")?;
            let mut data_type = None;
            if let Some(Token::Ident(word)) = stream.peek() {
                if !keyword_is(word, "DEFAULT") {
                    let tag = stream.expect_ident("column type")?;
                    data_type = Some(parse_data_type(&tag)?);
                }
            }
            let mut default = None;
            if stream.accept_keyword("DEFAULT") {
                default = Some(self.parse_value(stream)?);
            }
            columns.push(ColumnDef {
                name,
                data_type,
                default,
            });
            match stream.next() {
                Some(Token::Comma) => continue,
                Some(Token::RightParen) => break,
                other => return Err(unexpected("',' or ')'", other)),
            }
        }
        stream.expect_end()?;
        Ok(Statement::Definition(Definition::CreateTable {
            table_name,
            columns,
            if_not_exists,
        }))
    }

    fn parse_create_view(&self, stream: &mut TokenStream) -> Result<Statement, ParseError> {
        let view_name = stream.expect_ident("view name")?;
        stream.expect_keyword("AS")?;
        stream.expect_keyword("SELECT")?;
        let query = self.parse_select(stream)?;
        stream.expect_end()?;
        Ok(Statement::Definition(Definition::CreateView { view_name, query }))
    }

    fn parse_drop_table(&self, stream: &mut TokenStream) -> Result<Statement, ParseError> {
        let mut if_exists = false;
        if stream.accept_keyword("IF") {
            stream.expect_keyword("EXISTS")?;
            if_exists = true;
        }
        let table_name = stream.expect_ident("table name")?;
        stream.expect_end()?;
        Ok(Statement::Definition(Definition::DropTable { table_name, if_exists }))
    }

    fn parse_insert(&self, stream: &mut TokenStream) -> Result<Statement, ParseError> {
        let table_name = stream.expect_ident("table name")?;
        let mut columns = vec![];
        if stream.accept_token(&Token::LeftParen) {
            loop {
                columns.push(stream.expect_ident("column name")?);
                match stream.next() {
                    Some(Token::Comma) => continue,
                    Some(Token::RightParen) => break,
                    other => return Err(unexpected("',' or ')'", other)),
                }
            }
        }
        if stream.accept_keyword("DEFAULT") {
            stream.expect_keyword("VALUES")?;
            stream.expect_end()?;
            return Ok(Statement::Query(Query::Insert(InsertQuery {
                table_name,
                columns,
                source: InsertSource::DefaultValues,
            })));
        }
        stream.expect_keyword("VALUES")?;
        let mut rows = vec![];
        loop {
            stream.expect_token(Token::LeftParen)?;
            let mut row = vec![];
            if !stream.accept_token(&Token::RightParen) {
                loop {
                    row.push(self.parse_value(stream)?);
                    match stream.next() {
                        Some(Token::Comma) => continue,
                        Some(Token::RightParen) => break,
                        other => return Err(unexpected("',' or ')'", other)),
                    }
                }
            }
            rows.push(row);
            if !stream.accept_token(&Token::Comma) {
                break;
            }
        }
        stream.expect_end()?;
        Ok(Statement::Query(Query::Insert(InsertQuery {
            table_name,
            columns,
            source: InsertSource::Values(Values(rows)),
        })))
    }

    fn parse_delete(&self, stream: &mut TokenStream) -> Result<Statement, ParseError> {
        let table_name = stream.expect_ident("table name")?;
        let where_clause = self.parse_where(stream)?;
        stream.expect_end()?;
        Ok(Statement::Query(Query::Delete(DeleteQuery {
            table_name,
            where_clause,
        })))
    }

    fn parse_update(&self, stream: &mut TokenStream) -> Result<Statement, ParseError> {
        let table_name = stream.expect_ident("table name")?;
        stream.expect_keyword("SET")?;
        let mut assignments = vec![];
        loop {
            let column = stream.expect_ident("column name")?;
            stream.expect_token(Token::Eq)?;
            let value = self.parse_value(stream)?;
            assignments.push(Assignment { column, value });
            if !stream.accept_token(&Token::Comma) {
                break;
            }
        }
        let where_clause = self.parse_where(stream)?;
        stream.expect_end()?;
        Ok(Statement::Query(Query::Update(UpdateQuery {
            table_name,
            assignments,
            where_clause,
        })))
    }

    fn parse_select(&self, stream: &mut TokenStream) -> Result<SelectQuery, ParseError> {
        let mut aggregate = None;
        if let Some(Token::Ident(word)) = stream.peek() {
            if keyword_is(word, "MIN") {
                aggregate = Some(query_ast::Aggregate::Min);
            } else if keyword_is(word, "MAX") {
                aggregate = Some(query_ast::Aggregate::Max);
            }
            if aggregate.is_some() {
                stream.next();
            }
        }
        let mut distinct = None;
        let mut select_items = vec![];
        if stream.accept_keyword("DISTINCT") {
            // DISTINCT names the projection item that follows it
            match stream.next() {
                Some(Token::Asterisk) => {
                    distinct = Some("*".to_owned());
                    select_items.push(SelectItem::Wildcard);
                }
                Some(Token::Ident(column)) => {
                    distinct = Some(column.clone());
                    select_items.push(SelectItem::Column(column));
                }
                other => return Err(unexpected("a column after DISTINCT", other)),
            }
        }
        loop {
            match stream.peek() {
                Some(Token::Ident(word)) if keyword_is(word, "FROM") => break,
                Some(Token::Asterisk) => {
                    select_items.push(SelectItem::Wildcard);
                    stream.next();
                }
                Some(Token::Ident(_)) => {
                    let column = stream.expect_ident("column")?;
                    select_items.push(SelectItem::Column(column));
                }
                Some(Token::Comma) => {
                    stream.next();
                }
                other => return Err(unexpected("a projection column or FROM", other.cloned())),
            }
        }
        stream.expect_keyword("FROM")?;
        let table = stream.expect_ident("table name")?;
        let source = if stream.accept_keyword("LEFT") {
            stream.expect_keyword("OUTER")?;
            stream.expect_keyword("JOIN")?;
            let right = stream.expect_ident("joined table name")?;
            stream.expect_keyword("ON")?;
            let on_left = stream.expect_ident("join column")?;
            stream.expect_token(Token::Eq)?;
            let on_right = stream.expect_ident("join column")?;
            TableExpression::LeftOuterJoin {
                left: table,
                right,
                on_left,
                on_right,
            }
        } else {
            TableExpression::Table { name: table }
        };
        let where_clause = self.parse_where(stream)?;
        let order_by = if stream.accept_keyword("ORDER") {
            stream.expect_keyword("BY")?;
            let mut columns = vec![];
            let mut descending = false;
            loop {
                match stream.peek() {
                    Some(Token::Ident(word)) if keyword_is(word, "ASC") => {
                        stream.next();
                        break;
                    }
                    Some(Token::Ident(word)) if keyword_is(word, "DESC") => {
                        descending = true;
                        stream.next();
                        break;
                    }
                    Some(Token::Ident(_)) => columns.push(stream.expect_ident("ordering column")?),
                    Some(Token::Comma) => {
                        stream.next();
                    }
                    _ => break,
                }
            }
            Some(OrderBy { columns, descending })
        } else {
            None
        };
        Ok(SelectQuery {
            select_items,
            distinct,
            aggregate,
            source,
            where_clause,
            order_by,
        })
    }

    fn parse_where(&self, stream: &mut TokenStream) -> Result<Option<Predicate>, ParseError> {
        if !stream.accept_keyword("WHERE") {
            return Ok(None);
        }
        let column = stream.expect_ident("predicate column")?;
        let (op, value) = match stream.next() {
            Some(Token::Eq) => (PredicateOp::Eq, self.parse_value(stream)?),
            Some(Token::NotEq) => (PredicateOp::NotEq, self.parse_value(stream)?),
            Some(Token::Lt) => (PredicateOp::Lt, self.parse_value(stream)?),
            Some(Token::LtEq) => (PredicateOp::LtEq, self.parse_value(stream)?),
            Some(Token::Gt) => (PredicateOp::Gt, self.parse_value(stream)?),
            Some(Token::GtEq) => (PredicateOp::GtEq, self.parse_value(stream)?),
            Some(Token::Ident(word)) if keyword_is(&word, "IS") => {
                let op = if stream.accept_keyword("NOT") {
                    PredicateOp::IsNotNull
                } else {
                    PredicateOp::IsNull
                };
                stream.expect_token(Token::Null)?;
                (op, Value::Null)
            }
            other => return Err(unexpected("a comparison operator", other)),
        };
        Ok(Some(Predicate { column, op, value }))
    }

    fn parse_value(&self, stream: &mut TokenStream) -> Result<Value, ParseError> {
        match stream.next() {
            Some(Token::Number(raw)) => {
                if raw.contains('.') || raw.contains('E') {
                    Ok(Value::Number(raw))
                } else {
                    match raw.parse::<i64>() {
                        Ok(value) => Ok(Value::Int(value)),
                        Err(_) => Ok(Value::Number(raw)),
                    }
                }
            }
            Some(Token::String(value)) => Ok(Value::String(value)),
            Some(Token::Null) => Ok(Value::Null),
            other => Err(unexpected("a literal value", other)),
        }
    }
}

fn parse_data_type(tag: &str) -> Result<DataType, ParseError> {
    if tag.eq_ignore_ascii_case("TEXT") {
        Ok(DataType::Text)
    } else if tag.eq_ignore_ascii_case("INTEGER") {
        Ok(DataType::Integer)
    } else if tag.eq_ignore_ascii_case("REAL") {
        Ok(DataType::Real)
    } else if tag.eq_ignore_ascii_case("BLOB") {
        Ok(DataType::Blob)
    } else {
        Err(ParseError::MalformedStatement(format!("unknown column type {}", tag)))
    }
}

fn keyword_is(word: &str, keyword: &str) -> bool {
    word.eq_ignore_ascii_case(keyword)
}

fn unexpected(expected: &str, found: Option<Token>) -> ParseError {
    match found {
        Some(token) => ParseError::MalformedStatement(format!("expected {}, found {}", expected, token)),
        None => ParseError::MalformedStatement(format!("expected {}, found end of statement", expected)),
    }
}

struct TokenStream {
    iter: Peekable<IntoIter<Token>>,
}

impl TokenStream {
    fn new(tokens: Vec<Token>) -> TokenStream {
        TokenStream {
            iter: tokens.into_iter().peekable(),
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.iter.peek()
    }

    #[allow(clippy::should_implement_trait)]
    fn next(&mut self) -> Option<Token> {
        self.iter.next()
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.next() {
            Some(Token::Ident(word)) => Ok(word),
            other => Err(unexpected(what, other)),
        }
    }

    fn expect_token(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            other => Err(unexpected(&expected.to_string(), other)),
        }
    }

    fn accept_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.next();
            true
        } else {
            false
        }
    }

    fn accept_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Ident(word)) if keyword_is(word, keyword) => {
                self.next();
                true
            }
            _ => false,
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.accept_keyword(keyword) {
            Ok(())
        } else {
            let found = self.next();
            Err(unexpected(keyword, found))
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.expect_token(Token::SemiColon)?;
        match self.next() {
            None => Ok(()),
            Some(token) => Err(ParseError::MalformedStatement(format!(
                "unexpected {} after end of statement",
                token
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
