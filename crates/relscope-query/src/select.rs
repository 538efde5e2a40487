//! SELECT query builder.

use crate::association::{SubqueryMode, TableRef, build_related_subquery};
use crate::clause::{Limit, Offset, OrderBy, Where};
use crate::expr::{Dialect, Expr};
use relscope_core::{Model, Result, Value};
use std::marker::PhantomData;

/// One entry in a SELECT projection list.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Star scoped to a table (`users.*`). Scoping avoids ambiguity when
    /// the final statement joins other tables.
    TableStar(String),
    /// A named column, rendered as given.
    Column(String),
    /// An arbitrary expression, optionally aliased.
    Expr {
        expr: Expr,
        alias: Option<String>,
    },
}

impl Selection {
    fn build(&self, dialect: Dialect, params: &mut Vec<Value>, offset: usize) -> String {
        match self {
            Selection::TableStar(table) => format!("{table}.*"),
            Selection::Column(name) => name.clone(),
            Selection::Expr { expr, alias } => {
                let sql = expr.build_with_dialect(dialect, params, offset);
                match alias {
                    Some(alias) => format!("{sql} AS {alias}"),
                    None => sql,
                }
            }
        }
    }
}

/// A SELECT query builder.
///
/// Provides a fluent API for building SELECT queries with type-safe
/// conditions, plus the relationship operators built on correlated
/// subqueries: [`filter_related`](Select::filter_related),
/// [`filter_unrelated`](Select::filter_unrelated), and
/// [`with_related_counts`](Select::with_related_counts).
#[derive(Debug, Clone)]
pub struct Select<M: Model> {
    /// Projection entries (empty = all columns)
    selections: Vec<Selection>,
    /// WHERE clause conditions
    where_clause: Option<Where>,
    /// ORDER BY clauses
    order_by: Vec<OrderBy>,
    /// LIMIT clause
    limit: Option<Limit>,
    /// OFFSET clause
    offset: Option<Offset>,
    /// DISTINCT flag
    distinct: bool,
    /// Model type marker
    _marker: PhantomData<M>,
}

impl<M: Model> Select<M> {
    /// Create a new SELECT query for the model's table.
    pub fn new() -> Self {
        Self {
            selections: Vec::new(),
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: false,
            _marker: PhantomData,
        }
    }

    /// Select specific columns.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.selections = cols
            .iter()
            .map(|&c| Selection::Column(c.to_string()))
            .collect();
        self
    }

    /// Add an aliased expression to the projection.
    pub fn select_expr(mut self, expr: Expr, alias: impl Into<String>) -> Self {
        self.selections.push(Selection::Expr {
            expr,
            alias: Some(alias.into()),
        });
        self
    }

    /// Add a WHERE condition.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(expr),
            None => Where::new(expr),
        });
        self
    }

    /// Add an OR WHERE condition.
    pub fn or_filter(mut self, expr: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.or(expr),
            None => Where::new(expr),
        });
        self
    }

    /// Add ORDER BY clause.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(Limit(n));
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(Offset(n));
        self
    }

    /// Make this a DISTINCT query.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== Relationship Operators ====================

    /// Keep only rows with at least one related row (`WHERE EXISTS (...)`).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let (sql, params) = select!(User).filter_related("posts")?.build();
    /// ```
    pub fn filter_related(self, relationship: &str) -> Result<Self> {
        let expr = build_related_subquery::<M>(relationship, SubqueryMode::Exists, None)?;
        Ok(self.filter(expr))
    }

    /// Like [`filter_related`](Select::filter_related), with a
    /// join-predicate rewrite function.
    pub fn filter_related_with<F>(self, relationship: &str, rewrite: F) -> Result<Self>
    where
        F: Fn(Expr, &TableRef) -> Option<Expr>,
    {
        let expr = build_related_subquery::<M>(relationship, SubqueryMode::Exists, Some(&rewrite))?;
        Ok(self.filter(expr))
    }

    /// Keep only rows with no related rows.
    ///
    /// The condition is the boolean negation of the existence test,
    /// equivalent to `NOT (EXISTS (...))`.
    pub fn filter_unrelated(self, relationship: &str) -> Result<Self> {
        let expr = build_related_subquery::<M>(relationship, SubqueryMode::Exists, None)?;
        Ok(self.filter(expr.not()))
    }

    /// Like [`filter_unrelated`](Select::filter_unrelated), with a
    /// join-predicate rewrite function.
    pub fn filter_unrelated_with<F>(self, relationship: &str, rewrite: F) -> Result<Self>
    where
        F: Fn(Expr, &TableRef) -> Option<Expr>,
    {
        let expr = build_related_subquery::<M>(relationship, SubqueryMode::Exists, Some(&rewrite))?;
        Ok(self.filter(expr.not()))
    }

    /// Project all owning-table columns plus one count subquery per
    /// relationship, aliased `<name>_count`, in input order.
    ///
    /// Duplicate names produce duplicate aliased columns. The first invalid
    /// name aborts the whole call; no partial projection is applied.
    ///
    /// # Example
    ///
    /// ```ignore
    /// // SELECT users.*, (SELECT COUNT(*) FROM posts WHERE ...) AS posts_count, ...
    /// let (sql, params) = select!(User)
    ///     .with_related_counts(&["posts", "roles"])?
    ///     .build();
    /// ```
    pub fn with_related_counts(self, relationships: &[&str]) -> Result<Self> {
        self.with_related_counts_inner(relationships, None)
    }

    /// Like [`with_related_counts`](Select::with_related_counts), applying
    /// the same rewrite function to every relationship.
    pub fn with_related_counts_with<F>(self, relationships: &[&str], rewrite: F) -> Result<Self>
    where
        F: Fn(Expr, &TableRef) -> Option<Expr>,
    {
        self.with_related_counts_inner(relationships, Some(&rewrite))
    }

    fn with_related_counts_inner(
        mut self,
        relationships: &[&str],
        rewrite: Option<&dyn Fn(Expr, &TableRef) -> Option<Expr>>,
    ) -> Result<Self> {
        let mut selections = Vec::with_capacity(relationships.len() + 1);
        selections.push(Selection::TableStar(M::TABLE_NAME.to_string()));

        for name in relationships {
            let expr = build_related_subquery::<M>(name, SubqueryMode::Count, rewrite)?;
            selections.push(Selection::Expr {
                expr,
                alias: Some(format!("{name}_count")),
            });
        }

        self.selections = selections;
        Ok(self)
    }

    // ==================== SQL Generation ====================

    /// Build the SQL query and parameters (default PostgreSQL dialect).
    pub fn build(&self) -> (String, Vec<Value>) {
        self.build_with_dialect(Dialect::Postgres)
    }

    /// Build the SQL query and parameters with a specific dialect.
    #[tracing::instrument(level = "trace", skip(self), fields(table = M::TABLE_NAME))]
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        // SELECT
        sql.push_str("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if self.selections.is_empty() {
            sql.push('*');
        } else {
            let parts: Vec<_> = self
                .selections
                .iter()
                .map(|s| s.build(dialect, &mut params, 0))
                .collect();
            sql.push_str(&parts.join(", "));
        }

        // FROM
        sql.push_str(" FROM ");
        sql.push_str(M::TABLE_NAME);

        // WHERE
        if let Some(where_clause) = &self.where_clause {
            let (where_sql, where_params) = where_clause.build_with_dialect(dialect, params.len());
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params.extend(where_params);
        }

        // ORDER BY
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let order_strs: Vec<_> = self.order_by.iter().map(OrderBy::to_sql).collect();
            sql.push_str(&order_strs.join(", "));
        }

        // LIMIT
        if let Some(Limit(n)) = self.limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        // OFFSET
        if let Some(Offset(n)) = self.offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }

        tracing::trace!(sql = %sql, "Rendered SELECT");
        (sql, params)
    }
}

impl<M: Model> Default for Select<M> {
    fn default() -> Self {
        Self::new()
    }
}
