//! Dialect-aware subquery representation.

use crate::expr::{Dialect, Expr};
use relscope_core::Value;

/// What a correlated subquery projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubqueryProjection {
    /// `SELECT 1` — the cheapest projection for EXISTS tests.
    One,
    /// `SELECT COUNT(*)` — scalar row count.
    CountStar,
}

/// Non-generic SELECT representation used inside EXISTS and scalar COUNT
/// expressions.
///
/// SQL generation is deferred until a specific dialect is known, so the
/// same expression tree renders correctly for every supported backend.
/// ORDER BY / LIMIT / OFFSET are deliberately absent: they have no effect
/// inside either subquery shape.
#[derive(Debug, Clone)]
pub struct SubquerySelect {
    /// Table name for the FROM clause.
    pub table: String,
    /// Projection shape.
    pub projection: SubqueryProjection,
    /// Filter condition (the correlated join predicate, possibly rewritten).
    pub filter: Option<Expr>,
}

impl SubquerySelect {
    /// Create a `SELECT 1 FROM table` subquery.
    pub fn project_one(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: SubqueryProjection::One,
            filter: None,
        }
    }

    /// Create a `SELECT COUNT(*) FROM table` subquery.
    pub fn project_count(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: SubqueryProjection::CountStar,
            filter: None,
        }
    }

    /// Add a filter condition, AND-ing with any existing condition.
    #[must_use]
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(match self.filter {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    /// Build the subquery SQL, collecting parameters into `params`.
    ///
    /// Placeholder numbering continues from `offset + params.len()` so the
    /// subquery composes with an enclosing statement's parameters.
    pub fn build_with_dialect(
        &self,
        dialect: Dialect,
        params: &mut Vec<Value>,
        offset: usize,
    ) -> String {
        let mut sql = String::new();

        sql.push_str(match self.projection {
            SubqueryProjection::One => "SELECT 1 FROM ",
            SubqueryProjection::CountStar => "SELECT COUNT(*) FROM ",
        });
        sql.push_str(&self.table);

        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.build_with_dialect(dialect, params, offset));
        }

        sql
    }
}
