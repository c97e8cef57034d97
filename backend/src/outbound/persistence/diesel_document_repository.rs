//! PostgreSQL-backed `DocumentRepository` implementation using Diesel ORM.
//!
//! Every collection shares the `documents` table. Filters and sorts are
//! compiled into JSONB predicates over the `body` column so the database
//! evaluates them with the same meaning as [`Filter::matches`] and
//! [`Sort::compare`].

use std::collections::HashSet;
use std::marker::PhantomData;

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{Bool, Jsonb, Text};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use serde_json::Value;

use crate::domain::ports::{
    DocumentRepository, DocumentRepositoryError, FieldChanges, Filter, PageWindow, Sort,
    SortDirection, SortKey,
};
use crate::domain::{Document, DocumentId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DocumentRow, NewDocumentRow};
use super::pool::DbPool;
use super::schema::documents;

type DocumentPredicate = Box<dyn BoxableExpression<documents::table, Pg, SqlType = Bool>>;
type DocumentQuery = documents::BoxedQuery<'static, Pg>;

/// Diesel-backed implementation of the document repository port for one
/// document type.
pub struct DieselDocumentRepository<D> {
    pool: DbPool,
    _document: PhantomData<fn() -> D>,
}

impl<D> Clone for DieselDocumentRepository<D> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<D> DieselDocumentRepository<D> {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _document: PhantomData,
        }
    }
}

/// Escape LIKE wildcards so the needle matches literally, then wrap it for a
/// substring match.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn predicate(filter: &Filter) -> DocumentPredicate {
    match filter {
        Filter::All => Box::new(sql::<Bool>("TRUE")),
        Filter::IdEquals(id) => Box::new(documents::id.eq(id.get())),
        Filter::FieldEquals { field, value } => Box::new(
            sql::<Bool>("(body -> ")
                .bind::<Text, _>(field.clone())
                .sql(") = ")
                .bind::<Jsonb, _>(value.clone()),
        ),
        Filter::FieldContains { field, needle } => Box::new(
            sql::<Bool>("(jsonb_typeof(body -> ")
                .bind::<Text, _>(field.clone())
                .sql(") = 'string' AND (body ->> ")
                .bind::<Text, _>(field.clone())
                .sql(") ILIKE ")
                .bind::<Text, _>(like_pattern(needle))
                .sql(")"),
        ),
        Filter::And(filters) => filters
            .iter()
            .map(predicate)
            .reduce(|acc, next| -> DocumentPredicate { Box::new(acc.and(next)) })
            .unwrap_or_else(|| Box::new(sql::<Bool>("TRUE"))),
    }
}

fn scoped(collection: &'static str, filter: &Filter) -> DocumentQuery {
    documents::table
        .into_boxed()
        .filter(documents::collection.eq(collection))
        .filter(predicate(filter))
}

fn ordered(query: DocumentQuery, sort: &Sort) -> DocumentQuery {
    let field = match &sort.key {
        SortKey::Id => {
            return match sort.direction {
                SortDirection::Asc => query.order_by(documents::id.asc()),
                SortDirection::Desc => query.order_by(documents::id.desc()),
            };
        }
        SortKey::Field(field) => sql::<Jsonb>("body -> ").bind::<Text, _>(field.clone()),
    };
    let query = match sort.direction {
        SortDirection::Asc => query.order_by(field.asc()),
        SortDirection::Desc => query.order_by(field.desc()),
    };
    query.then_order_by(documents::id.asc())
}

fn windowed(query: DocumentQuery, window: PageWindow) -> DocumentQuery {
    let offset = i64::try_from(window.start()).unwrap_or(i64::MAX);
    let limit = i64::try_from(window.page_size()).unwrap_or(i64::MAX);
    query.offset(offset).limit(limit)
}

fn decode<D: Document>(row: DocumentRow) -> Result<D, DocumentRepositoryError> {
    serde_json::from_value(row.body).map_err(|err| {
        DocumentRepositoryError::serialization(format!("document {}: {err}", row.id))
    })
}

fn encode<D: Document>(document: &D) -> Result<NewDocumentRow<'static>, DocumentRepositoryError> {
    let body = serde_json::to_value(document).map_err(|err| {
        DocumentRepositoryError::serialization(format!("document {}: {err}", document.id()))
    })?;
    Ok(NewDocumentRow {
        collection: D::COLLECTION,
        id: document.id().get(),
        body,
    })
}

fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Failure inside the read-merge-write transaction of `update_one`.
enum UpdateFailure {
    Database(DieselError),
    Rejected(DocumentRepositoryError),
}

impl From<DieselError> for UpdateFailure {
    fn from(value: DieselError) -> Self {
        Self::Database(value)
    }
}

/// Lowest identifier in `ids` already stored in `collection`.
async fn first_stored(
    conn: &mut AsyncPgConnection,
    collection: &'static str,
    ids: &[i64],
) -> Result<Option<DocumentId>, DocumentRepositoryError> {
    let stored: Option<i64> = documents::table
        .filter(documents::collection.eq(collection))
        .filter(documents::id.eq_any(ids))
        .select(documents::id)
        .order_by(documents::id.asc())
        .first(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, None))?;
    Ok(stored.map(DocumentId::new))
}

#[async_trait]
impl<D: Document> DocumentRepository<D> for DieselDocumentRepository<D> {
    async fn count(&self, filter: &Filter) -> Result<u64, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = scoped(D::COLLECTION, filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        u64::try_from(total).map_err(|_| DocumentRepositoryError::query("negative row count"))
    }

    async fn find_by_id(&self, id: DocumentId) -> Result<Option<D>, DocumentRepositoryError> {
        self.find_one(&Filter::id(id)).await
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DocumentRow> = ordered(scoped(D::COLLECTION, filter), &Sort::default())
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        row.map(decode).transpose()
    }

    async fn filter_by(&self, filter: &Filter) -> Result<Vec<D>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DocumentRow> = ordered(scoped(D::COLLECTION, filter), &Sort::default())
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        rows.into_iter().map(decode).collect()
    }

    async fn paginated(
        &self,
        filter: &Filter,
        sort: &Sort,
        window: PageWindow,
    ) -> Result<Vec<D>, DocumentRepositoryError> {
        if window.page_size() == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DocumentRow> = windowed(ordered(scoped(D::COLLECTION, filter), sort), window)
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        rows.into_iter().map(decode).collect()
    }

    async fn insert_one(&self, document: &D) -> Result<DocumentId, DocumentRepositoryError> {
        let row = encode(document)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id: i64 = diesel::insert_into(documents::table)
            .values(&row)
            .returning(documents::id)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(document.id())))?;

        Ok(DocumentId::new(id))
    }

    async fn insert_many(
        &self,
        batch: &[D],
    ) -> Result<Vec<DocumentId>, DocumentRepositoryError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::with_capacity(batch.len());
        let mut rows = Vec::with_capacity(batch.len());
        for document in batch {
            if !seen.insert(document.id()) {
                return Err(DocumentRepositoryError::duplicate(document.id()));
            }
            rows.push(encode(document)?);
        }
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // A single multi-row INSERT is atomic: a key collision stores nothing.
        let inserted = diesel::insert_into(documents::table)
            .values(&rows)
            .returning(documents::id)
            .get_results::<i64>(&mut conn)
            .await;

        match inserted {
            Ok(stored) => Ok(stored.into_iter().map(DocumentId::new).collect()),
            Err(error) if is_unique_violation(&error) => {
                let taken = first_stored(&mut conn, D::COLLECTION, &ids).await?;
                Err(map_diesel_error(error, taken))
            }
            Err(error) => Err(map_diesel_error(error, None)),
        }
    }

    async fn update_one(
        &self,
        id: DocumentId,
        changes: &FieldChanges,
    ) -> Result<(), DocumentRepositoryError> {
        if changes.touches_identifier() {
            return Err(DocumentRepositoryError::query(format!(
                "document {id}: identifiers cannot be updated"
            )));
        }
        if changes.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, UpdateFailure, _>(|conn| {
            async move {
                let current: Option<Value> = documents::table
                    .filter(documents::collection.eq(D::COLLECTION))
                    .filter(documents::id.eq(id.get()))
                    .select(documents::body)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let Some(mut body) = current else {
                    return Ok(());
                };

                changes.merge_into(&mut body);
                serde_json::from_value::<D>(body.clone()).map_err(|err| {
                    UpdateFailure::Rejected(DocumentRepositoryError::serialization(format!(
                        "document {id} would become invalid: {err}"
                    )))
                })?;

                diesel::update(
                    documents::table
                        .filter(documents::collection.eq(D::COLLECTION))
                        .filter(documents::id.eq(id.get())),
                )
                .set(documents::body.eq(body))
                .execute(conn)
                .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|failure| match failure {
            UpdateFailure::Database(err) => map_diesel_error(err, None),
            UpdateFailure::Rejected(err) => err,
        })
    }

    async fn delete_by_id(&self, id: DocumentId) -> Result<u64, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(
            documents::table
                .filter(documents::collection.eq(D::COLLECTION))
                .filter(documents::id.eq(id.get())),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, None))?;

        Ok(removed as u64)
    }
}
