//! Model trait for table-mapped record types.
//!
//! The `Model` trait is the read-only metadata registry the subquery
//! builders consult. Implementations declare their table name, primary key
//! column(s), and relationship descriptors as static data, so lookups are
//! allocation-free and "unknown relationship" is an explicit typed error
//! rather than a runtime reflection miss.

use crate::relationship::RelationshipInfo;

/// Trait for types that map to a database table.
///
/// Typically implemented by hand or by a derive macro in the surrounding
/// system; relscope only reads the associated constants.
///
/// # Example
///
/// ```
/// use relscope_core::{Model, RelationshipInfo, RelationshipKind};
///
/// struct User;
///
/// impl Model for User {
///     const TABLE_NAME: &'static str = "users";
///     const PRIMARY_KEY: &'static [&'static str] = &["id"];
///     const RELATIONSHIPS: &'static [RelationshipInfo] = &[
///         RelationshipInfo::new("posts", "posts", RelationshipKind::OneToMany)
///             .remote_key("user_id"),
///     ];
/// }
/// ```
pub trait Model: Sized + Send + Sync {
    /// The name of the database table.
    const TABLE_NAME: &'static str;

    /// The primary key column name(s), in declaration order.
    ///
    /// Relationships that do not override their owner-side key columns
    /// correlate against these.
    const PRIMARY_KEY: &'static [&'static str];

    /// Relationship metadata for this model.
    ///
    /// Models with no relationships can rely on the default empty slice.
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[];
}
