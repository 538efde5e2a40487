//! Correlated subquery construction for relscope.
//!
//! `relscope-query` is the **query construction layer**. It provides the
//! expression DSL, a fluent SELECT builder, and the relationship subquery
//! builders that turn `Model` metadata into correlated EXISTS and COUNT
//! fragments plus parameters.
//!
//! # Role In The Architecture
//!
//! - **Expression DSL**: `Expr` and operators build boolean/scalar trees.
//! - **Subquery builder**: `related_subquery` renders a one-to-many
//!   relationship as `EXISTS (SELECT 1 ...)` or `(SELECT COUNT(*) ...)`.
//! - **Derived operators**: `Select` gains `filter_related`,
//!   `filter_unrelated`, and `with_related_counts`.
//!
//! Everything is pure construction: the rendered SQL and collected
//! parameters are handed to whatever executes statements.

pub mod association;
pub mod clause;
pub mod expr;
pub mod select;
pub mod subquery;

pub use association::{
    SubqueryMode, TableRef, count_related, count_related_with, exists_related,
    exists_related_with, related_subquery, related_subquery_with,
};
pub use clause::{Limit, Offset, OrderBy, Where};
pub use expr::{BinaryOp, Dialect, Expr, UnaryOp};
pub use select::{Select, Selection};
pub use subquery::SubquerySelect;

/// Create a SELECT query for a model.
///
/// # Example
///
/// ```ignore
/// let (sql, params) = select!(User)
///     .filter_related("posts")?
///     .build();
/// ```
#[macro_export]
macro_rules! select {
    ($model:ty) => {
        $crate::Select::<$model>::new()
    };
}
