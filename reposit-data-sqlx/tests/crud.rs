use reposit_data::prelude::*;
use reposit_data_sqlx::DbContext;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::FromRow;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, FromRow)]
struct Item {
    id: i64,
    name: String,
    qty: Option<i64>,
    note: Option<String>,
    code: Option<String>,
    status: Option<String>,
    #[sqlx(default)]
    cached_label: Option<String>,
}

impl Entity for Item {
    type Id = i64;

    fn table_name() -> &'static str {
        "items"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::identity("id"),
            FieldDef::column("name"),
            FieldDef::column("qty"),
            FieldDef::column("note"),
            FieldDef::column("code"),
            FieldDef::column("status"),
            FieldDef::excluded("cached_label"),
        ];
        FIELDS
    }

    fn id(&self) -> &i64 {
        &self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::new("id", self.id),
            FieldValue::new("name", self.name.clone()),
            FieldValue::new("qty", self.qty),
            FieldValue::new("note", self.note.clone()),
            FieldValue::new("code", self.code.clone()),
            FieldValue::new("status", self.status.clone()),
            FieldValue::new("cached_label", self.cached_label.clone()),
        ]
    }
}

// Keyed by a caller-supplied label, no identity column: inserts take the
// plain (row-count) path.
#[derive(Debug, Clone, FromRow)]
struct Tag {
    label: String,
    hits: Option<i64>,
}

impl Entity for Tag {
    type Id = String;

    fn table_name() -> &'static str {
        "tags"
    }

    fn id_column() -> &'static str {
        "label"
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[FieldDef::column("label"), FieldDef::column("hits")];
        FIELDS
    }

    fn id(&self) -> &String {
        &self.label
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::new("label", self.label.clone()),
            FieldValue::new("hits", self.hits),
        ]
    }
}

fn item(name: &str) -> Item {
    Item {
        id: 0,
        name: name.to_string(),
        qty: None,
        note: None,
        code: None,
        status: None,
        cached_label: None,
    }
}

async fn ctx() -> Arc<DbContext> {
    // One connection: in-memory SQLite databases are per-connection, so every
    // statement must go through the same one.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    let ctx = Arc::new(DbContext::new(pool));
    for stmt in [
        "CREATE TABLE items (\
            id INTEGER PRIMARY KEY AUTOINCREMENT, \
            name TEXT NOT NULL, \
            qty INTEGER, \
            note TEXT, \
            code TEXT, \
            status TEXT NOT NULL DEFAULT 'new')",
        "CREATE TABLE tags (label TEXT PRIMARY KEY, hits INTEGER)",
    ] {
        ctx.execute(stmt, Vec::new()).await.expect("create schema");
    }
    ctx
}

#[tokio::test]
async fn identity_insert_returns_key_and_refetches_equal() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    let mut source = item("anvil");
    source.qty = Some(3);
    source.note = Some("heavy".into());

    let key = items
        .insert(&source, true)
        .await
        .unwrap()
        .generated_key()
        .expect("identity path yields a key");

    let stored = items.find_by_id(key).await.unwrap().expect("row exists");
    assert_eq!(stored.name, source.name);
    assert_eq!(stored.qty, source.qty);
    assert_eq!(stored.note, source.note);
}

#[tokio::test]
async fn sparse_insert_skips_unset_columns() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    // 'status' is unset; a sparse insert must leave the column out of the
    // statement so the table default applies.
    let key = items
        .insert(&item("bolt"), true)
        .await
        .unwrap()
        .generated_key()
        .unwrap();
    let stored = items.find_by_id(key).await.unwrap().unwrap();
    assert_eq!(stored.status.as_deref(), Some("new"));
    assert_eq!(stored.qty, None);

    // A full insert writes NULL into 'status' explicitly and trips the
    // NOT NULL constraint.
    let err = items.insert(&item("nut"), false).await.unwrap_err();
    assert!(matches!(err, DataError::Database(_)));
}

#[tokio::test]
async fn plain_insert_without_identity_reports_row_count() {
    let ctx = ctx().await;
    let tags = ctx.repository::<Tag>().unwrap();

    let result = tags
        .insert(
            &Tag {
                label: "blue".into(),
                hits: None,
            },
            true,
        )
        .await
        .unwrap();
    assert_eq!(result, InsertResult::RowsAffected(1));
    assert_eq!(result.generated_key(), None);

    let stored = tags.find_by_id("blue".to_string()).await.unwrap().unwrap();
    assert_eq!(stored.hits, None);
}

#[tokio::test]
async fn sparse_update_leaves_unset_columns_alone() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    let mut source = item("crate");
    source.qty = Some(1);
    source.note = Some("keep".into());
    let key = items.insert(&source, true).await.unwrap().generated_key().unwrap();

    let mut patch = item("crate-renamed");
    patch.id = key;
    patch.qty = Some(9);
    let affected = items.update(&patch, true).await.unwrap();
    assert_eq!(affected, 1);

    let stored = items.find_by_id(key).await.unwrap().unwrap();
    assert_eq!(stored.name, "crate-renamed");
    assert_eq!(stored.qty, Some(9));
    // note was unset in the patch, so the sparse update kept the old value
    assert_eq!(stored.note.as_deref(), Some("keep"));

    // A full update writes every mapped column, nulling 'note'... and
    // nulling 'status' too, which the NOT NULL constraint rejects.
    let err = items.update(&patch, false).await.unwrap_err();
    assert!(matches!(err, DataError::Database(_)));

    let mut full = patch.clone();
    full.note = None;
    full.status = Some("used".into());
    assert_eq!(items.update(&full, false).await.unwrap(), 1);
    let stored = items.find_by_id(key).await.unwrap().unwrap();
    assert_eq!(stored.note, None);
    assert_eq!(stored.status.as_deref(), Some("used"));
}

#[tokio::test]
async fn update_with_unknown_key_affects_no_rows() {
    let ctx = ctx().await;
    let tags = ctx.repository::<Tag>().unwrap();

    let orphan = Tag {
        label: "no-such-tag".into(),
        hits: Some(1),
    };
    // zero affected rows, not an error: the caller can tell "nothing
    // matched" apart from a store failure
    assert_eq!(tags.update(&orphan, true).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_with_absent_criteria_is_a_no_op() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    items.insert(&item("survivor"), true).await.unwrap();

    assert_eq!(items.delete(None).await.unwrap(), 0);
    assert_eq!(items.row_count(items.query()).await.unwrap(), 1);

    let deleted = items
        .delete(Some(items.query().where_eq("name", "survivor")))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(items.row_count(items.query()).await.unwrap(), 0);
}

#[tokio::test]
async fn page_find_windows_are_disjoint_and_ordered() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    for i in 1..=25 {
        items
            .insert(&item(&format!("row{i:02}")), true)
            .await
            .unwrap();
    }

    let ordered = |page| {
        let items = items.clone();
        async move {
            items
                .page_find(page, 10, items.query().order_by("name", true))
                .await
                .unwrap()
        }
    };

    let p1 = ordered(1).await;
    let p2 = ordered(2).await;
    let p3 = ordered(3).await;
    assert_eq!(p1.len(), 10);
    assert_eq!(p2.len(), 10);
    assert_eq!(p3.len(), 5);
    assert_eq!(p1[0].name, "row01");
    assert_eq!(p2[0].name, "row11");
    assert_eq!(p3[4].name, "row25");

    let mut seen = HashSet::new();
    for row in p1.iter().chain(&p2).chain(&p3) {
        assert!(seen.insert(row.id), "pages overlap at id {}", row.id);
    }
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn page_envelope_counts_totals() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();
    for i in 0..7 {
        items.insert(&item(&format!("i{i}")), true).await.unwrap();
    }

    let page = items
        .page(&Pageable::new(2, 3), items.query().order_by("name", true))
        .await
        .unwrap();
    assert_eq!(page.content.len(), 3);
    assert_eq!(page.total_elements, 7);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn invalid_paging_parameters_are_rejected() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    let err = items.page_find(0, 10, items.query()).await.unwrap_err();
    assert!(matches!(err, DataError::InvalidArgument(_)));

    let err = items.page_find(1, 0, items.query()).await.unwrap_err();
    assert!(matches!(err, DataError::InvalidArgument(_)));
}

#[tokio::test]
async fn max_and_row_count_reduce_over_criteria() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    for (name, qty) in [("a", 2), ("b", 8), ("c", 5)] {
        let mut it = item(name);
        it.qty = Some(qty);
        items.insert(&it, true).await.unwrap();
    }

    let max: Option<i64> = items
        .max("qty", items.query().where_not_eq("name", "b"))
        .await
        .unwrap();
    assert_eq!(max, Some(5));

    let none: Option<i64> = items
        .max("qty", items.query().where_eq("name", "zzz"))
        .await
        .unwrap();
    assert_eq!(none, None);

    let count = items
        .row_count(items.query().where_gt("qty", 2i64))
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn generate_id_extends_the_stored_sequence() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    for code in ["CUST0001", "CUST0002", "ORD0044"] {
        let mut it = item(code);
        it.code = Some(code.to_string());
        items.insert(&it, true).await.unwrap();
    }

    assert_eq!(items.generate_id("code", "CUST", 4).await.unwrap(), "CUST0003");
    assert_eq!(items.generate_id("code", "ORD", 4).await.unwrap(), "ORD0045");
    // no row matches the prefix: the sequence starts at 1
    assert_eq!(items.generate_id("code", "ACC", 4).await.unwrap(), "ACC0001");
}

#[tokio::test]
async fn find_first_returns_none_on_miss() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    let missing = items
        .find_first(items.query().where_eq("name", "ghost"))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn criteria_for_another_table_are_rejected() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    let foreign = QueryBuilder::new("tags");
    let err = items.find(foreign).await.unwrap_err();
    assert!(matches!(err, DataError::InvalidArgument(_)));
}

#[tokio::test]
async fn transaction_slot_allows_one_open_transaction() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    ctx.begin().await.unwrap();
    assert!(ctx.in_transaction().await);

    let err = ctx.begin().await.unwrap_err();
    assert!(matches!(err, DataError::Transaction(_)));

    items.insert(&item("tentative"), true).await.unwrap();
    ctx.rollback().await.unwrap();
    assert!(!ctx.in_transaction().await);
    assert_eq!(items.row_count(items.query()).await.unwrap(), 0);

    ctx.begin().await.unwrap();
    items.insert(&item("durable"), true).await.unwrap();
    ctx.commit().await.unwrap();
    assert_eq!(items.row_count(items.query()).await.unwrap(), 1);

    let err = ctx.commit().await.unwrap_err();
    assert!(matches!(err, DataError::Transaction(_)));
    let err = ctx.rollback().await.unwrap_err();
    assert!(matches!(err, DataError::Transaction(_)));
}

#[tokio::test]
async fn close_is_idempotent() {
    let ctx = ctx().await;
    ctx.close().await;
    ctx.close().await;
}

#[tokio::test]
async fn excluded_fields_never_reach_the_store() {
    let ctx = ctx().await;
    let items = ctx.repository::<Item>().unwrap();

    // 'cached_label' has no backing column; if the write included it the
    // statement would fail outright.
    let mut it = item("plain");
    it.cached_label = Some("derived".into());
    let key = items.insert(&it, true).await.unwrap().generated_key().unwrap();

    let stored = items.find_by_id(key).await.unwrap().unwrap();
    assert_eq!(stored.cached_label, None);
}
