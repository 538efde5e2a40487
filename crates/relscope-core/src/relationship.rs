//! Relationship metadata.
//!
//! Relationships are declared as static metadata on each `Model`. This lets
//! the query layer generate correct correlated SQL without runtime
//! reflection: a lookup either yields a concrete, validated descriptor or a
//! typed error.

use crate::error::{Error, Result};
use crate::model::Model;
use std::fmt;

/// The type of relationship between two models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationshipKind {
    /// One-to-one: `User` has one `Profile`.
    OneToOne,
    /// Many-to-one: many `Post`s belong to one `User`.
    #[default]
    ManyToOne,
    /// One-to-many: one `User` has many `Post`s.
    OneToMany,
    /// Many-to-many via a link table.
    ManyToMany,
}

impl RelationshipKind {
    /// Human-readable name, used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::OneToOne => "one-to-one",
            RelationshipKind::ManyToOne => "many-to-one",
            RelationshipKind::OneToMany => "one-to-many",
            RelationshipKind::ManyToMany => "many-to-many",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about a relationship between models.
///
/// Key columns come in two flavors: `remote_*` are the foreign key columns
/// on the related table, `local_*` are the owner-side columns they match.
/// Single-column relationships use the scalar setters; composite keys use
/// the slice setters, with positional pairing between the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipInfo {
    /// Name of the relationship field.
    pub name: &'static str,

    /// The related model's table name.
    pub related_table: &'static str,

    /// Kind of relationship.
    pub kind: RelationshipKind,

    /// Owner-side key column (e.g. the owning table's `"id"`).
    pub local_key: Option<&'static str>,

    /// Composite owner-side key columns. Takes precedence over `local_key`.
    pub local_keys: Option<&'static [&'static str]>,

    /// Foreign key column on the related table (e.g. `"user_id"`).
    pub remote_key: Option<&'static str>,

    /// Composite foreign key columns on the related table. Takes precedence
    /// over `remote_key`.
    pub remote_keys: Option<&'static [&'static str]>,
}

impl RelationshipInfo {
    /// Create a new relationship with required fields.
    #[must_use]
    pub const fn new(
        name: &'static str,
        related_table: &'static str,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            name,
            related_table,
            kind,
            local_key: None,
            local_keys: None,
            remote_key: None,
            remote_keys: None,
        }
    }

    /// Set the owner-side key column.
    #[must_use]
    pub const fn local_key(mut self, key: &'static str) -> Self {
        self.local_key = Some(key);
        self.local_keys = None;
        self
    }

    /// Set composite owner-side key columns.
    ///
    /// The column order must match the `remote_keys` ordering.
    #[must_use]
    pub const fn local_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.local_keys = Some(keys);
        self.local_key = None;
        self
    }

    /// Set the foreign key column on the related table.
    #[must_use]
    pub const fn remote_key(mut self, key: &'static str) -> Self {
        self.remote_key = Some(key);
        self.remote_keys = None;
        self
    }

    /// Set composite foreign key columns on the related table.
    ///
    /// The column order must match the `local_keys` ordering.
    #[must_use]
    pub const fn remote_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.remote_keys = Some(keys);
        self.remote_key = None;
        self
    }

    /// Return the owner-side key columns (empty slice if unset).
    ///
    /// For single-column relationships this returns a 1-element slice backed
    /// by `self.local_key`. Callers fall back to the model's primary key
    /// when this is empty.
    #[must_use]
    pub fn local_key_cols(&self) -> &[&'static str] {
        if let Some(keys) = self.local_keys {
            return keys;
        }
        match &self.local_key {
            Some(key) => std::slice::from_ref(key),
            None => &[],
        }
    }

    /// Return the related-table foreign key columns (empty slice if unset).
    #[must_use]
    pub fn remote_key_cols(&self) -> &[&'static str] {
        if let Some(keys) = self.remote_keys {
            return keys;
        }
        match &self.remote_key {
            Some(key) => std::slice::from_ref(key),
            None => &[],
        }
    }
}

impl Default for RelationshipInfo {
    fn default() -> Self {
        Self::new("", "", RelationshipKind::default())
    }
}

/// Find a relationship by name in a model's `RELATIONSHIPS`.
#[must_use]
pub fn find_relationship<M: Model>(name: &str) -> Option<&'static RelationshipInfo> {
    M::RELATIONSHIPS.iter().find(|r| r.name == name)
}

/// Resolve a relationship by name, or fail with a typed error.
///
/// # Example
///
/// ```ignore
/// let rel = resolve_relationship::<User>("posts")?;
/// assert_eq!(rel.related_table, "posts");
/// ```
pub fn resolve_relationship<M: Model>(name: &str) -> Result<&'static RelationshipInfo> {
    find_relationship::<M>(name).ok_or_else(|| Error::UnknownRelationship {
        owner_table: M::TABLE_NAME,
        relationship: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Team;

    impl Model for Team {
        const TABLE_NAME: &'static str = "teams";
        const PRIMARY_KEY: &'static [&'static str] = &["id"];
        const RELATIONSHIPS: &'static [RelationshipInfo] = &[
            RelationshipInfo::new("heroes", "heroes", RelationshipKind::OneToMany)
                .remote_key("team_id"),
            RelationshipInfo::new("owner", "users", RelationshipKind::ManyToOne)
                .local_key("owner_id"),
        ];
    }

    #[test]
    fn kind_default_is_many_to_one() {
        assert_eq!(RelationshipKind::default(), RelationshipKind::ManyToOne);
    }

    #[test]
    fn kind_display_names_cardinality() {
        assert_eq!(RelationshipKind::OneToMany.to_string(), "one-to-many");
        assert_eq!(RelationshipKind::ManyToMany.to_string(), "many-to-many");
    }

    #[test]
    fn builder_chain_sets_keys() {
        let info = RelationshipInfo::new("heroes", "heroes", RelationshipKind::OneToMany)
            .remote_key("team_id")
            .local_key("id");

        assert_eq!(info.name, "heroes");
        assert_eq!(info.related_table, "heroes");
        assert_eq!(info.kind, RelationshipKind::OneToMany);
        assert_eq!(info.remote_key_cols(), &["team_id"]);
        assert_eq!(info.local_key_cols(), &["id"]);
    }

    #[test]
    fn composite_keys_take_precedence() {
        let info = RelationshipInfo::new("shifts", "shifts", RelationshipKind::OneToMany)
            .remote_key("ignored")
            .remote_keys(&["region_id", "badge_no"])
            .local_keys(&["region_id", "badge_no"]);

        assert_eq!(info.remote_key_cols(), &["region_id", "badge_no"]);
        assert_eq!(info.local_key_cols(), &["region_id", "badge_no"]);
    }

    #[test]
    fn unset_keys_yield_empty_slices() {
        let info = RelationshipInfo::new("heroes", "heroes", RelationshipKind::OneToMany);
        assert!(info.local_key_cols().is_empty());
        assert!(info.remote_key_cols().is_empty());
    }

    #[test]
    fn find_relationship_hits_and_misses() {
        let rel = find_relationship::<Team>("heroes");
        assert!(rel.is_some());
        assert_eq!(rel.unwrap().related_table, "heroes");

        assert!(find_relationship::<Team>("nonexistent").is_none());
    }

    #[test]
    fn resolve_relationship_returns_typed_error() {
        let rel = resolve_relationship::<Team>("heroes");
        assert!(rel.is_ok());

        let err = resolve_relationship::<Team>("powers").unwrap_err();
        assert_eq!(
            err,
            Error::UnknownRelationship {
                owner_table: "teams",
                relationship: "powers".to_string(),
            }
        );
    }
}
