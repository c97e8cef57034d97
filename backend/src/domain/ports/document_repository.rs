//! Storage-agnostic document repository port.
//!
//! `DocumentRepository<D>` is the only persistence contract the catalog
//! depends on. It is generic over the [`Document`] type so one adapter per
//! backing store serves every collection. The query vocabulary ([`Filter`],
//! [`Sort`], [`PageWindow`], [`FieldChanges`]) is defined here, together with
//! its reference semantics over a JSON document body, so adapters agree on
//! what a filter or sort means regardless of how they evaluate it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use pagination::PageWindow;
use serde_json::{Map, Value};

use crate::domain::{Document, DocumentId};

use super::define_port_error;

/// JSON field holding a document's identifier.
pub const ID_FIELD: &str = "id";

define_port_error! {
    /// Errors raised by document repository adapters.
    pub enum DocumentRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "document store query failed: {message}",
        /// A document with the same identifier already exists in the collection.
        Duplicate { id: DocumentId } =>
            "document {id} already exists",
        /// A document could not be encoded to or decoded from its stored form.
        Serialization { message: String } =>
            "document serialisation failed: {message}",
    }
}

/// Predicate selecting documents within one collection.
///
/// # Examples
/// ```
/// use beer_catalog::domain::DocumentId;
/// use beer_catalog::domain::ports::Filter;
/// use serde_json::json;
///
/// let filter = Filter::contains("name", "LAG");
/// assert!(filter.matches(DocumentId::new(1), &json!({"id": 1, "name": "Pale Lager"})));
/// assert_eq!(Filter::contains("name", "  "), Filter::All);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// The document with this identifier.
    IdEquals(DocumentId),
    /// Documents whose top-level `field` equals the scalar `value`.
    FieldEquals {
        /// Top-level field name.
        field: String,
        /// Scalar JSON value to compare against.
        value: Value,
    },
    /// Documents whose string `field` contains `needle`, ignoring case.
    FieldContains {
        /// Top-level field name.
        field: String,
        /// Literal substring; wildcards carry no special meaning.
        needle: String,
    },
    /// Documents matching every inner filter.
    And(Vec<Filter>),
}

impl Filter {
    /// Match a single identifier.
    #[must_use]
    pub fn id(id: DocumentId) -> Self {
        Self::IdEquals(id)
    }

    /// Match a scalar field value exactly.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive substring match; a blank needle matches everything.
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        if needle.trim().is_empty() {
            return Self::All;
        }
        Self::FieldContains {
            field: field.into(),
            needle,
        }
    }

    /// Conjunction of `self` and `other`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, filter) | (filter, Self::All) => filter,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), filter) => {
                left.push(filter);
                Self::And(left)
            }
            (filter, Self::And(mut right)) => {
                right.insert(0, filter);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Evaluate the filter against a document's JSON body.
    #[must_use]
    pub fn matches(&self, id: DocumentId, body: &Value) -> bool {
        match self {
            Self::All => true,
            Self::IdEquals(expected) => *expected == id,
            Self::FieldEquals { field, value } => body.get(field) == Some(value),
            Self::FieldContains { field, needle } => body
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
            Self::And(filters) => filters.iter().all(|filter| filter.matches(id, body)),
        }
    }
}

/// Direction applied to a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// Key a page is ordered by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Document identifier.
    #[default]
    Id,
    /// A top-level document field; identifier ascending breaks ties.
    Field(String),
}

/// Total ordering for paginated reads. Defaults to identifier ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sort {
    /// Primary key to order by.
    pub key: SortKey,
    /// Direction of the primary key.
    pub direction: SortDirection,
}

impl Sort {
    /// Order by a top-level field, then by identifier ascending.
    pub fn by_field(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: SortKey::Field(field.into()),
            direction,
        }
    }

    /// Compare two documents under this ordering.
    ///
    /// Field values follow the JSON ordering used by PostgreSQL `jsonb`:
    /// null < string < number < boolean < array < object. Documents missing
    /// the field sort after all others when ascending.
    #[must_use]
    pub fn compare(&self, left: (DocumentId, &Value), right: (DocumentId, &Value)) -> Ordering {
        let primary = match &self.key {
            SortKey::Id => left.0.cmp(&right.0),
            SortKey::Field(field) => compare_present(left.1.get(field), right.1.get(field)),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| left.0.cmp(&right.0))
    }
}

fn compare_present(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => compare_json(l, r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

const fn json_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_json(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::String(l), Value::String(r)) => l.cmp(r),
        (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
            (Some(l), Some(r)) => l.cmp(&r),
            _ => l
                .as_f64()
                .partial_cmp(&r.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        _ => json_rank(left).cmp(&json_rank(right)),
    }
}

/// Top-level field replacements applied by [`DocumentRepository::update_one`].
///
/// Only the listed fields change; every other field keeps its stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldChanges(BTreeMap<String, Value>);

impl FieldChanges {
    /// Start an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `field` with `value`.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Whether no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the change set tries to rewrite the immutable identifier.
    #[must_use]
    pub fn touches_identifier(&self) -> bool {
        self.0.contains_key(ID_FIELD)
    }

    /// Changes as a JSON object, ready for a merge.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect::<Map<_, _>>())
    }

    /// Apply the changes to a JSON document body in place.
    pub fn merge_into(&self, body: &mut Value) {
        if let Value::Object(fields) = body {
            for (field, value) in &self.0 {
                fields.insert(field.clone(), value.clone());
            }
        }
    }
}

/// Port for storing and querying documents of one type.
///
/// Absence is never an error: lookups return `Ok(None)`. Adapters never map
/// their failures to domain error codes; that is the caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository<D: Document>: Send + Sync {
    /// Number of documents matching `filter`.
    async fn count(&self, filter: &Filter) -> Result<u64, DocumentRepositoryError>;

    /// The document with `id`, if stored.
    async fn find_by_id(&self, id: DocumentId) -> Result<Option<D>, DocumentRepositoryError>;

    /// The first match in identifier order, if any.
    async fn find_one(&self, filter: &Filter) -> Result<Option<D>, DocumentRepositoryError>;

    /// Every match, in identifier order.
    async fn filter_by(&self, filter: &Filter) -> Result<Vec<D>, DocumentRepositoryError>;

    /// One window of the matches ordered by `sort`.
    ///
    /// No upper bound is applied to the page size here.
    async fn paginated(
        &self,
        filter: &Filter,
        sort: &Sort,
        window: PageWindow,
    ) -> Result<Vec<D>, DocumentRepositoryError>;

    /// Store one document, returning its identifier.
    ///
    /// Fails with [`DocumentRepositoryError::Duplicate`] if the identifier is
    /// already stored.
    async fn insert_one(&self, document: &D) -> Result<DocumentId, DocumentRepositoryError>;

    /// Store a batch of documents atomically, returning their identifiers in
    /// input order. Nothing is stored if any document is rejected.
    async fn insert_many(
        &self,
        documents: &[D],
    ) -> Result<Vec<DocumentId>, DocumentRepositoryError>;

    /// Replace the listed fields of the document with `id`.
    ///
    /// Updating an absent identifier is a no-op. Changes that touch the
    /// identifier are rejected with [`DocumentRepositoryError::Query`].
    async fn update_one(
        &self,
        id: DocumentId,
        changes: &FieldChanges,
    ) -> Result<(), DocumentRepositoryError>;

    /// Remove the document with `id`, returning how many were removed (0 or 1).
    async fn delete_by_id(&self, id: DocumentId) -> Result<u64, DocumentRepositoryError>;
}
