//! Correlated subquery builders for one-to-many relationships.
//!
//! Given a relationship declared on a `Model`, these builders construct the
//! correlated join predicate between the owning table and the related table
//! and wrap it as either an EXISTS boolean expression or a parenthesized
//! scalar COUNT(*) expression. Both shapes embed into a larger statement;
//! nothing here executes SQL.
//!
//! Callers can refine the join predicate with a rewrite function. The
//! function receives the base predicate and the related table reference and
//! its non-`None` result **replaces** the predicate in full — a rewriter
//! that wants to keep the correlation must conjoin it itself:
//!
//! ```ignore
//! let expr = exists_related_with::<User>("posts", |join, posts| {
//!     Some(join.and(posts.col("title").eq("first")))
//! })?;
//! ```

use crate::expr::Expr;
use crate::subquery::SubquerySelect;
use relscope_core::{Error, Model, RelationshipKind, Result, resolve_relationship};

/// The shape of a relationship subquery.
///
/// A closed enumeration: modes outside this set are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubqueryMode {
    /// `EXISTS (SELECT 1 ...)` — boolean existence test.
    Exists,
    /// `(SELECT COUNT(*) ...)` — scalar row count.
    Count,
}

/// A named table handle used to build column references.
///
/// The owning and related tables always get separate handles, so a rewrite
/// function can only reference columns through the reference it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    table: String,
}

impl TableRef {
    /// Create a reference to the named table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.table
    }

    /// Build a qualified column reference on this table.
    #[must_use]
    pub fn col(&self, column: &str) -> Expr {
        Expr::qualified(self.table.clone(), column)
    }
}

/// Rewrite hook over the join predicate: `(predicate, related table) ->
/// replacement or None to keep the original`.
type JoinRewrite<'a> = &'a dyn Fn(Expr, &TableRef) -> Option<Expr>;

/// Build a correlated subquery expression for a one-to-many relationship.
///
/// Resolves `relationship` on `M`, pairs the related table's foreign key
/// columns with the owner's key columns positionally, conjoins the
/// equalities left-to-right, and wraps the filtered projection according to
/// `mode`.
///
/// # Errors
///
/// - `Error::UnknownRelationship` if `relationship` is not declared on `M`
/// - `Error::UnsupportedCardinality` if it is not one-to-many
/// - `Error::KeyArityMismatch` if the two key lists differ in length or
///   are empty
pub fn related_subquery<M: Model>(relationship: &str, mode: SubqueryMode) -> Result<Expr> {
    build_related_subquery::<M>(relationship, mode, None)
}

/// Like [`related_subquery`], with a join-predicate rewrite function.
pub fn related_subquery_with<M, F>(relationship: &str, mode: SubqueryMode, rewrite: F) -> Result<Expr>
where
    M: Model,
    F: Fn(Expr, &TableRef) -> Option<Expr>,
{
    build_related_subquery::<M>(relationship, mode, Some(&rewrite))
}

/// Shorthand for [`related_subquery`] with `SubqueryMode::Exists`.
pub fn exists_related<M: Model>(relationship: &str) -> Result<Expr> {
    related_subquery::<M>(relationship, SubqueryMode::Exists)
}

/// Shorthand for [`related_subquery_with`] with `SubqueryMode::Exists`.
pub fn exists_related_with<M, F>(relationship: &str, rewrite: F) -> Result<Expr>
where
    M: Model,
    F: Fn(Expr, &TableRef) -> Option<Expr>,
{
    related_subquery_with::<M, F>(relationship, SubqueryMode::Exists, rewrite)
}

/// Shorthand for [`related_subquery`] with `SubqueryMode::Count`.
pub fn count_related<M: Model>(relationship: &str) -> Result<Expr> {
    related_subquery::<M>(relationship, SubqueryMode::Count)
}

/// Shorthand for [`related_subquery_with`] with `SubqueryMode::Count`.
pub fn count_related_with<M, F>(relationship: &str, rewrite: F) -> Result<Expr>
where
    M: Model,
    F: Fn(Expr, &TableRef) -> Option<Expr>,
{
    related_subquery_with::<M, F>(relationship, SubqueryMode::Count, rewrite)
}

#[tracing::instrument(level = "trace", skip(rewrite), fields(owner = M::TABLE_NAME))]
pub(crate) fn build_related_subquery<M: Model>(
    relationship: &str,
    mode: SubqueryMode,
    rewrite: Option<JoinRewrite<'_>>,
) -> Result<Expr> {
    let rel = resolve_relationship::<M>(relationship)?;

    if rel.kind != RelationshipKind::OneToMany {
        return Err(Error::UnsupportedCardinality {
            relationship: relationship.to_string(),
            found: rel.kind,
        });
    }

    let foreign_keys = rel.remote_key_cols();
    // Owner keys default to the model's primary key when the relationship
    // does not override them.
    let declared = rel.local_key_cols();
    let owner_keys: &[&str] = if declared.is_empty() {
        M::PRIMARY_KEY
    } else {
        declared
    };

    if foreign_keys.len() != owner_keys.len() || foreign_keys.is_empty() {
        return Err(Error::KeyArityMismatch {
            relationship: relationship.to_string(),
            foreign: foreign_keys.len(),
            owner: owner_keys.len(),
        });
    }

    let owner = TableRef::new(M::TABLE_NAME);
    let related = TableRef::new(rel.related_table);

    // Pair foreign/owner key columns positionally and conjoin left-to-right.
    let mut pairs = foreign_keys
        .iter()
        .zip(owner_keys.iter())
        .map(|(fk, ok)| related.col(fk).eq(owner.col(ok)));
    let first = pairs.next().ok_or_else(|| Error::KeyArityMismatch {
        relationship: relationship.to_string(),
        foreign: 0,
        owner: 0,
    })?;
    let base = pairs.fold(first, |acc, pair| acc.and(pair));

    let join = match rewrite {
        Some(f) => f(base.clone(), &related).unwrap_or(base),
        None => base,
    };

    let expr = match mode {
        SubqueryMode::Exists => {
            Expr::exists(SubquerySelect::project_one(rel.related_table).filter(join))
        }
        SubqueryMode::Count => {
            Expr::scalar_subquery(SubquerySelect::project_count(rel.related_table).filter(join))
        }
    };

    tracing::trace!(related = rel.related_table, "Built relationship subquery");
    Ok(expr)
}
