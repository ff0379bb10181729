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

use std::fmt::{self, Display, Formatter};

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Transaction(TransactionStatement),
    Definition(Definition),
    Query(Query),
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum TransactionStatement {
    Begin(TransactionMode),
    Commit,
    Rollback,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TransactionMode {
    Deferred,
    Immediate,
    Exclusive,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Definition {
    CreateTable {
        table_name: String,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    },
    CreateView {
        view_name: String,
        query: SelectQuery,
    },
    DropTable {
        table_name: String,
        if_exists: bool,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: Option<DataType>,
    pub default: Option<Value>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DataType {
    Text,
    Integer,
    Real,
    Blob,
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Text => write!(f, "TEXT"),
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Real => write!(f, "REAL"),
            DataType::Blob => write!(f, "BLOB"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Query {
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
    Select(SelectQuery),
}

#[derive(Debug, PartialEq, Clone)]
pub struct InsertQuery {
    pub table_name: String,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

#[derive(Debug, PartialEq, Clone)]
pub enum InsertSource {
    DefaultValues,
    Values(Values),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Values(pub Vec<Vec<Value>>);

#[derive(Debug, PartialEq, Clone)]
pub struct UpdateQuery {
    pub table_name: String,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DeleteQuery {
    pub table_name: String,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SelectQuery {
    pub select_items: Vec<SelectItem>,
    pub distinct: Option<String>,
    pub aggregate: Option<Aggregate>,
    pub source: TableExpression,
    pub where_clause: Option<Predicate>,
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum SelectItem {
    Wildcard,
    Column(String),
}

impl Display for SelectItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Wildcard => write!(f, "*"),
            SelectItem::Column(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Aggregate {
    Min,
    Max,
}

impl Display for Aggregate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Min => write!(f, "MIN"),
            Aggregate::Max => write!(f, "MAX"),
        }
    }
}

/// The FROM part of a SELECT: a single relation or a left outer join over
/// two of them. Join keys are kept in their qualified `table.column` form.
#[derive(Debug, PartialEq, Clone)]
pub enum TableExpression {
    Table {
        name: String,
    },
    LeftOuterJoin {
        left: String,
        right: String,
        on_left: String,
        on_right: String,
    },
}

impl TableExpression {
    /// Name of the relation projection starts from; for a join that is the
    /// left side.
    pub fn base_table(&self) -> &str {
        match self {
            TableExpression::Table { name } => name,
            TableExpression::LeftOuterJoin { left, .. } => left,
        }
    }
}

impl Display for TableExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TableExpression::Table { name } => write!(f, "{}", name),
            TableExpression::LeftOuterJoin {
                left,
                right,
                on_left,
                on_right,
            } => write!(f, "{} LEFT OUTER JOIN {} ON {} = {}", left, right, on_left, on_right),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct OrderBy {
    pub columns: Vec<String>,
    pub descending: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Predicate {
    pub column: String,
    pub op: PredicateOp,
    pub value: Value,
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.op {
            PredicateOp::IsNull => write!(f, "{} IS NULL", self.column),
            PredicateOp::IsNotNull => write!(f, "{} IS NOT NULL", self.column),
            _ => write!(f, "{} {} {}", self.column, self.op, self.value),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PredicateOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    IsNull,
    IsNotNull,
}

impl Display for PredicateOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PredicateOp::Eq => write!(f, "="),
            PredicateOp::NotEq => write!(f, "!="),
            PredicateOp::Lt => write!(f, "<"),
            PredicateOp::LtEq => write!(f, "<="),
            PredicateOp::Gt => write!(f, ">"),
            PredicateOp::GtEq => write!(f, ">="),
            PredicateOp::IsNull => write!(f, "IS"),
            PredicateOp::IsNotNull => write!(f, "IS NOT"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Int(i64),
    Number(String),
    String(String),
    Null,
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Number(value) => write!(f, "{}", value),
            // embedded quotes are doubled so the rendering lexes back
            Value::String(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl Display for SelectQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if let Some(aggregate) = &self.aggregate {
            write!(f, "{} ", aggregate)?;
        }
        if self.distinct.is_some() {
            write!(f, "DISTINCT ")?;
        }
        for (index, item) in self.select_items.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, " FROM {}", self.source)?;
        if let Some(predicate) = &self.where_clause {
            write!(f, " WHERE {}", predicate)?;
        }
        if let Some(order_by) = &self.order_by {
            write!(f, " ORDER BY ")?;
            for (index, column) in order_by.columns.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", column)?;
            }
            if order_by.descending {
                write!(f, " DESC")?;
            }
        }
        Ok(())
    }
}
