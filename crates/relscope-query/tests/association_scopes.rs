//! End-to-end construction tests for the relationship subquery operators.
//!
//! Mirrors a small blog schema: users own posts and roles (one-to-many,
//! single key), employees own shifts (one-to-many, composite key).

use relscope_core::{Error, Model, RelationshipInfo, RelationshipKind, Value};
use relscope_query::{Dialect, SubqueryMode, count_related, exists_related, exists_related_with,
    related_subquery, select};

#[derive(Debug)]
struct User;

impl Model for User {
    const TABLE_NAME: &'static str = "users";
    const PRIMARY_KEY: &'static [&'static str] = &["id"];
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[
        RelationshipInfo::new("posts", "posts", RelationshipKind::OneToMany).remote_key("user_id"),
        RelationshipInfo::new("roles", "roles", RelationshipKind::OneToMany).remote_key("user_id"),
        RelationshipInfo::new("profile", "profiles", RelationshipKind::OneToOne)
            .remote_key("user_id"),
    ];
}

#[derive(Debug)]
struct Employee;

impl Model for Employee {
    const TABLE_NAME: &'static str = "employees";
    const PRIMARY_KEY: &'static [&'static str] = &["region_id", "badge_no"];
    const RELATIONSHIPS: &'static [RelationshipInfo] = &[
        RelationshipInfo::new("shifts", "shifts", RelationshipKind::OneToMany)
            .remote_keys(&["region_id", "badge_no"]),
    ];
}

#[test]
fn exists_sql_references_related_table() {
    let (sql, params) = select!(User).filter_related("posts").unwrap().build();

    assert!(sql.to_lowercase().contains("exists"));
    assert!(sql.contains("posts"));
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE EXISTS (SELECT 1 FROM posts WHERE \"posts\".\"user_id\" = \"users\".\"id\")"
    );
    assert!(params.is_empty());
}

#[test]
fn absence_filter_is_negated_existence() {
    let (sql, _) = select!(User).filter_unrelated("posts").unwrap().build();

    assert_eq!(
        sql,
        "SELECT * FROM users WHERE NOT EXISTS (SELECT 1 FROM posts WHERE \"posts\".\"user_id\" = \"users\".\"id\")"
    );
}

#[test]
fn existence_and_absence_filters_differ_only_by_negation() {
    let (with_sql, _) = select!(User).filter_related("posts").unwrap().build();
    let (without_sql, _) = select!(User).filter_unrelated("posts").unwrap().build();

    assert_eq!(without_sql.replace("NOT EXISTS", "EXISTS"), with_sql);
}

#[test]
fn with_counts_projects_all_requested_relationships_in_order() {
    let (sql, params) = select!(User)
        .with_related_counts(&["posts", "roles"])
        .unwrap()
        .build();

    assert_eq!(
        sql,
        "SELECT users.*, \
         (SELECT COUNT(*) FROM posts WHERE \"posts\".\"user_id\" = \"users\".\"id\") AS posts_count, \
         (SELECT COUNT(*) FROM roles WHERE \"roles\".\"user_id\" = \"users\".\"id\") AS roles_count \
         FROM users"
    );
    assert!(params.is_empty());

    // Counts appear in input order, after the scoped star.
    let posts_at = sql.find("posts_count").unwrap();
    let roles_at = sql.find("roles_count").unwrap();
    assert!(sql.starts_with("SELECT users.*"));
    assert!(posts_at < roles_at);
}

#[test]
fn with_counts_allows_duplicates() {
    let (sql, _) = select!(User)
        .with_related_counts(&["posts", "posts"])
        .unwrap()
        .build();

    assert_eq!(sql.matches("AS posts_count").count(), 2);
}

#[test]
fn count_column_embeds_as_aliased_projection() {
    let expr = count_related::<User>("posts").unwrap();
    let (sql, _) = select!(User).select_expr(expr, "posts_count").build();

    assert!(sql.starts_with("SELECT (SELECT COUNT(*) FROM posts"));
    assert!(sql.contains(") AS posts_count FROM users"));
}

#[test]
fn rewrite_narrows_both_shapes() {
    let narrow = |join: relscope_query::Expr, posts: &relscope_query::TableRef| {
        Some(join.and(posts.col("title").eq("first")))
    };

    let (exists_sql, exists_params) = select!(User)
        .filter_related_with("posts", narrow)
        .unwrap()
        .build();
    assert!(exists_sql.contains("\"posts\".\"user_id\" = \"users\".\"id\" AND \"posts\".\"title\" = $1"));
    assert_eq!(exists_params, vec![Value::Text("first".to_string())]);

    let (count_sql, count_params) = select!(User)
        .with_related_counts_with(&["posts"], narrow)
        .unwrap()
        .build();
    assert!(count_sql.contains("SELECT COUNT(*) FROM posts WHERE \"posts\".\"user_id\" = \"users\".\"id\" AND \"posts\".\"title\" = $1"));
    assert_eq!(count_params, vec![Value::Text("first".to_string())]);
}

#[test]
fn rewrite_applies_to_every_requested_relationship() {
    let (sql, params) = select!(User)
        .with_related_counts_with(&["posts", "roles"], |join, related| {
            Some(join.and(related.col("archived").eq(false)))
        })
        .unwrap()
        .build();

    assert!(sql.contains("\"posts\".\"archived\" = $1"));
    assert!(sql.contains("\"roles\".\"archived\" = $2"));
    assert_eq!(params, vec![Value::Bool(false), Value::Bool(false)]);
}

#[test]
fn composite_keys_conjoin_every_pair() {
    let (sql, _) = select!(Employee).filter_related("shifts").unwrap().build();

    // Owner keys fall back to the composite primary key; a row matching only
    // one column of the pair must not correlate.
    assert_eq!(
        sql,
        "SELECT * FROM employees WHERE EXISTS (SELECT 1 FROM shifts WHERE \
         \"shifts\".\"region_id\" = \"employees\".\"region_id\" AND \
         \"shifts\".\"badge_no\" = \"employees\".\"badge_no\")"
    );
}

#[test]
fn unknown_relationship_fails_and_leaves_query_untouched() {
    let err = select!(User)
        .with_related_counts(&["posts", "powers"])
        .unwrap_err();

    assert_eq!(
        err,
        Error::UnknownRelationship {
            owner_table: "users",
            relationship: "powers".to_string(),
        }
    );
}

#[test]
fn non_one_to_many_relationship_is_rejected() {
    let err = exists_related::<User>("profile").unwrap_err();

    assert_eq!(
        err,
        Error::UnsupportedCardinality {
            relationship: "profile".to_string(),
            found: RelationshipKind::OneToOne,
        }
    );
    assert!(err.to_string().contains("one-to-one"));
}

#[test]
fn construction_is_idempotent() {
    let build = || {
        select!(User)
            .with_related_counts_with(&["posts"], |join, posts| {
                Some(join.and(posts.col("title").eq("first")))
            })
            .unwrap()
            .filter(relscope_query::Expr::col("id").eq(1_i64))
            .build()
    };

    assert_eq!(build(), build());
}

#[test]
fn operators_compose_with_plain_filters() {
    let (sql, params) = select!(User)
        .filter(relscope_query::Expr::col("active").eq(true))
        .filter_related("posts")
        .unwrap()
        .build();

    assert_eq!(
        sql,
        "SELECT * FROM users WHERE \"active\" = $1 AND EXISTS (SELECT 1 FROM posts WHERE \"posts\".\"user_id\" = \"users\".\"id\")"
    );
    assert_eq!(params, vec![Value::Bool(true)]);
}

#[test]
fn sqlite_dialect_renders_numbered_question_marks() {
    let (sql, _) = select!(User)
        .filter_related_with("posts", |join, posts| {
            Some(join.and(posts.col("title").eq("first")))
        })
        .unwrap()
        .build_with_dialect(Dialect::Sqlite);

    assert!(sql.contains("?1"));
    assert!(!sql.contains("$1"));
}

#[test]
fn bare_expression_builders_return_embeddable_fragments() {
    let exists = exists_related::<User>("posts").unwrap();
    let count = related_subquery::<User>("posts", SubqueryMode::Count).unwrap();

    let mut params = Vec::new();
    let exists_sql = exists.build_with_dialect(Dialect::Postgres, &mut params, 0);
    let count_sql = count.build_with_dialect(Dialect::Postgres, &mut params, 0);

    assert!(exists_sql.starts_with("EXISTS ("));
    assert!(count_sql.starts_with("(SELECT COUNT(*)"));
    assert!(count_sql.ends_with(')'));
}

#[test]
fn rewrite_can_drop_the_correlation_entirely() {
    // The rewrite return value replaces the join predicate in full. Keeping
    // the original constraints is the rewriter's job.
    let expr = exists_related_with::<User, _>("posts", |_, posts| {
        Some(posts.col("title").eq("first"))
    })
    .unwrap();

    let mut params = Vec::new();
    let sql = expr.build_with_dialect(Dialect::Postgres, &mut params, 0);
    assert_eq!(sql, "EXISTS (SELECT 1 FROM posts WHERE \"posts\".\"title\" = $1)");
}
