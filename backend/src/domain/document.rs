//! Document capability shared by every persisted catalog entity.
//!
//! A document lives in exactly one named partition (its collection), is keyed
//! by a caller-supplied [`DocumentId`], and carries an [`AuditStamp`]
//! recording when and by whom it was created. Repository adapters rely only
//! on this trait plus serde, so one adapter serves every document type.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Caller-supplied document identifier.
///
/// Identifiers are never generated by the store; uniqueness within a
/// collection is checked by the application layer and enforced by adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(i64);

impl DocumentId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for DocumentId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Creation metadata stamped onto a document by the command that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStamp {
    /// Instant the document was created.
    pub created_at: DateTime<Utc>,
    /// Identity responsible for the creation.
    pub created_by: String,
}

/// An entity that can be stored by a [`crate::domain::ports::DocumentRepository`].
///
/// # Examples
/// ```
/// use beer_catalog::domain::{Beer, Document};
///
/// assert_eq!(Beer::COLLECTION, "beers");
/// ```
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the partition holding documents of this type.
    const COLLECTION: &'static str;

    /// Identifier of this document.
    fn id(&self) -> DocumentId;

    /// Creation metadata of this document.
    fn audit(&self) -> &AuditStamp;
}
