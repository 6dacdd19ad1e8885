//! Builder for sparse, parameterized `UPDATE` statements.
//!
//! Columns are emitted in the order they are offered to the builder, so a
//! caller that walks its patch fields in declaration order gets a stable
//! statement shape. Placeholders are `$1..$n` in emission order and the row
//! id is always bound last.

use bookshelf_core::types::{DbId, Timestamp};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};

// ---------------------------------------------------------------------------
// Bind values
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built statements.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    BigInt(i64),
    Int(i32),
    Text(String),
    Timestamp(Timestamp),
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::BigInt(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        BindValue::Int(v)
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl From<Timestamp> for BindValue {
    fn from(v: Timestamp) -> Self {
        BindValue::Timestamp(v)
    }
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

/// A finished `UPDATE` statement and its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl UpdateStatement {
    /// Prepare a `query_as` with every bind value applied in order.
    pub fn query_as<'q, O>(&'q self) -> QueryAs<'q, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        let mut q = sqlx::query_as::<_, O>(&self.sql);
        for value in &self.binds {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Int(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects `column = $n` assignments for a single-row update.
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    sets: Vec<String>,
    binds: Vec<BindValue>,
    returning: Option<&'static str>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            sets: Vec::new(),
            binds: Vec::new(),
            returning: None,
        }
    }

    /// Assign `column` to `value`.
    pub fn set(mut self, column: &'static str, value: impl Into<BindValue>) -> Self {
        self.binds.push(value.into());
        self.sets.push(format!("{column} = ${}", self.binds.len()));
        self
    }

    /// Assign `column` only when `value` is present.
    pub fn set_opt<V: Into<BindValue>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Append a `RETURNING` clause with the given column list.
    pub fn returning(mut self, columns: &'static str) -> Self {
        self.returning = Some(columns);
        self
    }

    /// Number of columns assigned so far.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Finish the statement for row `id`.
    ///
    /// Returns `None` when no column was assigned: an empty `SET` list is not
    /// valid SQL, so callers must treat that case as a no-op.
    pub fn build(mut self, id: DbId) -> Option<UpdateStatement> {
        if self.sets.is_empty() {
            return None;
        }

        self.binds.push(BindValue::BigInt(id));
        let mut sql = format!(
            "UPDATE {} SET {} WHERE id = ${}",
            self.table,
            self.sets.join(", "),
            self.binds.len()
        );
        if let Some(columns) = self.returning {
            sql.push_str(" RETURNING ");
            sql.push_str(columns);
        }

        Some(UpdateStatement {
            sql,
            binds: self.binds,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
