//! In-memory document store for development and tests.
//!
//! One [`InMemoryDocumentStore`] holds every collection; typed repositories
//! are cheap handles onto it. Documents are kept as JSON bodies so filters
//! and sorts use the reference semantics defined alongside the port.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::ports::{
    DocumentRepository, DocumentRepositoryError, FieldChanges, Filter, PageWindow, Sort,
};
use crate::domain::{Document, DocumentId};

type Collection = BTreeMap<DocumentId, Value>;

/// Shared storage for every in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<&'static str, Collection>>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository handle for documents of type `D`.
    pub fn repository<D: Document>(&self) -> InMemoryDocumentRepository<D> {
        InMemoryDocumentRepository {
            store: self.clone(),
            _document: PhantomData,
        }
    }
}

/// Typed view of one collection in an [`InMemoryDocumentStore`].
pub struct InMemoryDocumentRepository<D> {
    store: InMemoryDocumentStore,
    _document: PhantomData<fn() -> D>,
}

impl<D> Clone for InMemoryDocumentRepository<D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _document: PhantomData,
        }
    }
}

fn decode<D: Document>(id: DocumentId, body: &Value) -> Result<D, DocumentRepositoryError> {
    D::deserialize(body)
        .map_err(|err| DocumentRepositoryError::serialization(format!("document {id}: {err}")))
}

fn encode<D: Document>(document: &D) -> Result<Value, DocumentRepositoryError> {
    serde_json::to_value(document).map_err(|err| {
        DocumentRepositoryError::serialization(format!("document {}: {err}", document.id()))
    })
}

fn matching<'a>(
    collection: Option<&'a Collection>,
    filter: &'a Filter,
) -> impl Iterator<Item = (DocumentId, &'a Value)> + 'a {
    collection
        .into_iter()
        .flat_map(BTreeMap::iter)
        .filter(move |(id, body)| filter.matches(**id, body))
        .map(|(id, body)| (*id, body))
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[async_trait]
impl<D: Document> DocumentRepository<D> for InMemoryDocumentRepository<D> {
    async fn count(&self, filter: &Filter) -> Result<u64, DocumentRepositoryError> {
        let collections = self.store.collections.read().await;
        let total = matching(collections.get(D::COLLECTION), filter).count();
        Ok(total as u64)
    }

    async fn find_by_id(&self, id: DocumentId) -> Result<Option<D>, DocumentRepositoryError> {
        let collections = self.store.collections.read().await;
        collections
            .get(D::COLLECTION)
            .and_then(|collection| collection.get(&id))
            .map(|body| decode(id, body))
            .transpose()
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, DocumentRepositoryError> {
        let collections = self.store.collections.read().await;
        matching(collections.get(D::COLLECTION), filter)
            .next()
            .map(|(id, body)| decode(id, body))
            .transpose()
    }

    async fn filter_by(&self, filter: &Filter) -> Result<Vec<D>, DocumentRepositoryError> {
        let collections = self.store.collections.read().await;
        matching(collections.get(D::COLLECTION), filter)
            .map(|(id, body)| decode(id, body))
            .collect()
    }

    async fn paginated(
        &self,
        filter: &Filter,
        sort: &Sort,
        window: PageWindow,
    ) -> Result<Vec<D>, DocumentRepositoryError> {
        let collections = self.store.collections.read().await;
        let mut hits: Vec<_> = matching(collections.get(D::COLLECTION), filter).collect();
        hits.sort_by(|left, right| sort.compare(*left, *right));
        hits.into_iter()
            .skip(to_usize(window.start()))
            .take(to_usize(window.page_size()))
            .map(|(id, body)| decode(id, body))
            .collect()
    }

    async fn insert_one(&self, document: &D) -> Result<DocumentId, DocumentRepositoryError> {
        let id = document.id();
        let body = encode(document)?;
        let mut collections = self.store.collections.write().await;
        let collection = collections.entry(D::COLLECTION).or_default();
        if collection.contains_key(&id) {
            return Err(DocumentRepositoryError::duplicate(id));
        }
        collection.insert(id, body);
        Ok(id)
    }

    async fn insert_many(
        &self,
        documents: &[D],
    ) -> Result<Vec<DocumentId>, DocumentRepositoryError> {
        let encoded = documents
            .iter()
            .map(|document| Ok((document.id(), encode(document)?)))
            .collect::<Result<Vec<_>, DocumentRepositoryError>>()?;

        let mut collections = self.store.collections.write().await;
        let collection = collections.entry(D::COLLECTION).or_default();

        let mut batch = HashSet::with_capacity(encoded.len());
        for (id, _) in &encoded {
            if collection.contains_key(id) || !batch.insert(*id) {
                return Err(DocumentRepositoryError::duplicate(*id));
            }
        }

        Ok(encoded
            .into_iter()
            .map(|(id, body)| {
                collection.insert(id, body);
                id
            })
            .collect())
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
        let mut collections = self.store.collections.write().await;
        let Some(body) = collections
            .get_mut(D::COLLECTION)
            .and_then(|collection| collection.get_mut(&id))
        else {
            return Ok(());
        };

        let mut updated = body.clone();
        changes.merge_into(&mut updated);
        decode::<D>(id, &updated).map_err(|err| {
            DocumentRepositoryError::serialization(format!("update rejected: {err}"))
        })?;
        *body = updated;
        Ok(())
    }

    async fn delete_by_id(&self, id: DocumentId) -> Result<u64, DocumentRepositoryError> {
        let mut collections = self.store.collections.write().await;
        let removed = collections
            .get_mut(D::COLLECTION)
            .and_then(|collection| collection.remove(&id));
        Ok(u64::from(removed.is_some()))
    }
}
