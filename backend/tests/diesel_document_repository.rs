//! Integration tests for `DieselDocumentRepository` against embedded PostgreSQL.
//!
//! The cases mirror the in-memory store's contract tests so both adapters
//! are held to the same behaviour, and add the cases only a real database
//! can show: literal `%` and `_` in substring filters, atomic multi-row
//! inserts, row locking in `update_one` and the schema's constraints.

use std::str::FromStr;

use beer_catalog::domain::ports::{
    DocumentRepository, DocumentRepositoryError, FieldChanges, Filter, PageWindow, Sort,
    SortDirection,
};
use beer_catalog::domain::{AuditStamp, Beer, BeerDraft, Document, DocumentId, NewBeer};
use beer_catalog::outbound::persistence::{DbPool, DieselDocumentRepository, PoolConfig};
use chrono::{TimeZone, Utc};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::error::SqlState;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

#[path = "support/pg_embed.rs"]
mod pg_embed;

mod support;

use pg_embed::shared_cluster;
use support::{format_postgres_error, handle_cluster_setup_failure, provision_database};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    id: DocumentId,
    text: String,
    #[serde(flatten)]
    audit: AuditStamp,
}

impl Document for Note {
    const COLLECTION: &'static str = "notes";

    fn id(&self) -> DocumentId {
        self.id
    }

    fn audit(&self) -> &AuditStamp {
        &self.audit
    }
}

struct TestContext {
    /// Tokio runtime reused for every async call in one test.
    runtime: Runtime,
    beers: DieselDocumentRepository<Beer>,
    notes: DieselDocumentRepository<Note>,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_database(cluster).map_err(|err| err.to_string())?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        beers: DieselDocumentRepository::new(pool.clone()),
        notes: DieselDocumentRepository::new(pool),
        database_url,
        _database: database,
    })
}

#[fixture]
fn diesel_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn audit() -> AuditStamp {
    AuditStamp {
        created_at: Utc
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp"),
        created_by: "admin".to_owned(),
    }
}

fn draft(id: i64, name: &str, price: &str) -> BeerDraft {
    BeerDraft {
        id: DocumentId::new(id),
        name: name.to_owned(),
        brewery: "Kirin".to_owned(),
        country: "Japan".to_owned(),
        price: Some(Decimal::from_str(price).expect("decimal")),
        currency: "JPY".to_owned(),
    }
}

fn stamped(draft: BeerDraft) -> Beer {
    NewBeer::try_from(draft).expect("valid beer").stamp(audit())
}

fn beer(id: i64, name: &str) -> Beer {
    stamped(draft(id, name, "2.5"))
}

async fn seed(beers: &DieselDocumentRepository<Beer>) {
    beers
        .insert_many(&[
            beer(3, "Dark Lager"),
            beer(1, "Pale Ale"),
            beer(2, "lager"),
            beer(4, "Stout"),
        ])
        .await
        .expect("seed");
}

fn ids(page: &[Beer]) -> Vec<i64> {
    page.iter().map(|found| found.id().get()).collect()
}

#[rstest]
fn insert_then_find_round_trips(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        let id = ctx.beers.insert_one(&beer(7, "Ichiban")).await.expect("insert");

        assert_eq!(ctx.beers.find_by_id(id).await, Ok(Some(beer(7, "Ichiban"))));
        assert_eq!(ctx.beers.find_by_id(DocumentId::new(8)).await, Ok(None));
    });
}

#[rstest]
fn stored_fields_keep_their_supplied_form(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    let mut supplied = draft(-3, " Lager ", "10");
    supplied.currency = "usd".to_owned();
    let supplied = stamped(supplied);

    ctx.runtime.block_on(async {
        ctx.beers.insert_one(&supplied).await.expect("insert");

        let found = ctx
            .beers
            .find_by_id(DocumentId::new(-3))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found, supplied);
        assert_eq!(found.name(), " Lager ");
        assert_eq!(found.currency().as_str(), "usd");
    });
}

#[rstest]
fn insert_one_maps_primary_key_clash_to_duplicate(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        ctx.beers.insert_one(&beer(7, "Ichiban")).await.expect("insert");

        let err = ctx
            .beers
            .insert_one(&beer(7, "Other"))
            .await
            .expect_err("duplicate");

        assert_eq!(err, DocumentRepositoryError::duplicate(DocumentId::new(7)));
        let kept = ctx
            .beers
            .find_by_id(DocumentId::new(7))
            .await
            .expect("lookup")
            .map(|stored| stored.name().to_owned());
        assert_eq!(kept, Some("Ichiban".to_owned()));
    });
}

#[rstest]
#[case::clashes_with_stored(vec![beer(9, "New"), beer(1, "Clash")], 1)]
#[case::lowest_stored_clash_is_named(vec![beer(9, "New"), beer(4, "Clash"), beer(3, "Clash")], 3)]
#[case::repeats_within_batch(vec![beer(9, "New"), beer(9, "Again")], 9)]
fn insert_many_is_all_or_nothing(
    diesel_context: Option<TestContext>,
    #[case] batch: Vec<Beer>,
    #[case] culprit: i64,
) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;

        let err = ctx.beers.insert_many(&batch).await.expect_err("rejected batch");

        assert_eq!(err, DocumentRepositoryError::duplicate(DocumentId::new(culprit)));
        assert_eq!(ctx.beers.count(&Filter::All).await, Ok(4));
        assert_eq!(ctx.beers.find_by_id(DocumentId::new(9)).await, Ok(None));
    });
}

#[rstest]
fn filters_ignore_case_and_keep_identifier_order(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;
        let filter = Filter::contains("name", "LAGER");

        assert_eq!(ctx.beers.count(&filter).await, Ok(2));
        let names: Vec<String> = ctx
            .beers
            .filter_by(&filter)
            .await
            .expect("filter")
            .iter()
            .map(|found| found.name().to_owned())
            .collect();
        assert_eq!(names, ["lager", "Dark Lager"]);

        let first = ctx.beers.find_one(&filter).await.expect("find one");
        assert_eq!(first.map(|found| found.id()), Some(DocumentId::new(2)));
    });
}

#[rstest]
#[case::percent("%", vec![5])]
#[case::underscore("e_a", vec![6])]
#[case::backslash("\\", vec![8])]
fn substring_filters_match_wildcards_literally(
    diesel_context: Option<TestContext>,
    #[case] needle: &str,
    #[case] expected: Vec<i64>,
) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;
        ctx.beers
            .insert_many(&[
                beer(5, "50% Stout"),
                beer(6, "Pale_Ale"),
                beer(7, "PaleXAle"),
                beer(8, "Back\\Bay"),
            ])
            .await
            .expect("insert");

        let found = ctx
            .beers
            .filter_by(&Filter::contains("name", needle))
            .await
            .expect("filter");
        assert_eq!(ids(&found), expected);
    });
}

#[rstest]
#[case::first_page(0, 2, vec![1, 2])]
#[case::last_partial(3, 2, vec![4])]
#[case::past_end(10, 2, vec![])]
#[case::empty_window(0, 0, vec![])]
fn paginated_windows_identifier_order(
    diesel_context: Option<TestContext>,
    #[case] start: u64,
    #[case] size: u64,
    #[case] expected: Vec<i64>,
) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;

        let page = ctx
            .beers
            .paginated(&Filter::All, &Sort::default(), PageWindow::new(start, size))
            .await
            .expect("page");

        assert_eq!(ids(&page), expected);
    });
}

#[rstest]
fn paginated_honours_field_sort(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;

        let page = ctx
            .beers
            .paginated(
                &Filter::All,
                &Sort::by_field("name", SortDirection::Desc),
                PageWindow::new(0, 10),
            )
            .await
            .expect("page");

        assert_eq!(ids(&page), [2, 4, 1, 3]);
    });
}

#[rstest]
fn price_sort_is_numeric(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        ctx.beers
            .insert_many(&[
                stamped(draft(1, "Export", "10")),
                stamped(draft(2, "Helles", "9.5")),
                stamped(draft(3, "Bock", "100")),
            ])
            .await
            .expect("seed");

        let page = ctx
            .beers
            .paginated(
                &Filter::All,
                &Sort::by_field("price", SortDirection::Asc),
                PageWindow::new(0, 10),
            )
            .await
            .expect("page");

        assert_eq!(ids(&page), [2, 1, 3]);
    });
}

#[rstest]
fn update_replaces_only_listed_fields(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;

        ctx.beers
            .update_one(
                DocumentId::new(4),
                &FieldChanges::new().set("name", "Imperial Stout"),
            )
            .await
            .expect("update");

        let updated = ctx
            .beers
            .find_by_id(DocumentId::new(4))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(updated.name(), "Imperial Stout");
        assert_eq!(updated.country(), "Japan");
    });
}

#[rstest]
fn concurrent_updates_both_land(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;
        let rename = FieldChanges::new().set("name", "Imperial Stout");
        let relocate = FieldChanges::new().set("country", "Ireland");

        let (renamed, relocated) = tokio::join!(
            ctx.beers.update_one(DocumentId::new(4), &rename),
            ctx.beers.update_one(DocumentId::new(4), &relocate),
        );
        renamed.expect("rename");
        relocated.expect("relocate");

        let updated = ctx
            .beers
            .find_by_id(DocumentId::new(4))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(updated.name(), "Imperial Stout");
        assert_eq!(updated.country(), "Ireland");
    });
}

#[rstest]
#[case::identifier(FieldChanges::new().set("id", 40))]
#[case::invalid_value(FieldChanges::new().set("name", ""))]
fn update_rejects_unsafe_changes(
    diesel_context: Option<TestContext>,
    #[case] changes: FieldChanges,
) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;

        ctx.beers
            .update_one(DocumentId::new(4), &changes)
            .await
            .expect_err("rejected");

        let unchanged = ctx.beers.find_by_id(DocumentId::new(4)).await;
        assert_eq!(unchanged, Ok(Some(beer(4, "Stout"))));
    });
}

#[rstest]
fn update_of_missing_document_is_a_no_op(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;

        ctx.beers
            .update_one(DocumentId::new(99), &FieldChanges::new().set("name", "x"))
            .await
            .expect("no-op");

        assert_eq!(ctx.beers.count(&Filter::All).await, Ok(4));
    });
}

#[rstest]
fn delete_reports_removed_count(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;

        assert_eq!(ctx.beers.delete_by_id(DocumentId::new(1)).await, Ok(1));
        assert_eq!(ctx.beers.delete_by_id(DocumentId::new(1)).await, Ok(0));
        assert_eq!(ctx.beers.count(&Filter::All).await, Ok(3));
    });
}

#[rstest]
fn collections_are_isolated(diesel_context: Option<TestContext>) {
    let Some(ctx) = diesel_context else {
        return;
    };
    ctx.runtime.block_on(async {
        seed(&ctx.beers).await;
        ctx.notes
            .insert_one(&Note {
                id: DocumentId::new(1),
                text: "tasting notes".to_owned(),
                audit: audit(),
            })
            .await
            .expect("same id in another collection");

        assert_eq!(ctx.notes.count(&Filter::All).await, Ok(1));
        assert_eq!(ctx.beers.count(&Filter::All).await, Ok(4));
    });
}

#[rstest]
#[case::array("[1, 2]")]
#[case::string("\"lager\"")]
#[case::null("null")]
fn schema_rejects_non_object_bodies(diesel_context: Option<TestContext>, #[case] body: &str) {
    let Some(ctx) = diesel_context else {
        return;
    };
    let mut client = Client::connect(&ctx.database_url, NoTls)
        .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)));

    let err = client
        .execute(
            "INSERT INTO documents (collection, id, body) VALUES ('beers', 50, $1::text::jsonb)",
            &[&body],
        )
        .expect_err("non-object body");

    assert_eq!(
        err.code(),
        Some(&SqlState::CHECK_VIOLATION),
        "{}",
        format_postgres_error(&err)
    );
    let constraint = err.as_db_error().and_then(|db| db.constraint());
    assert_eq!(constraint, Some("documents_body_is_object"));
}
