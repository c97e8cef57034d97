//! Port naming the beer collection's repository.
//!
//! Services depend on `BeerRepository` rather than the generic document port
//! so their bounds read in domain terms. Every `DocumentRepository<Beer>` is a
//! `BeerRepository`.

use crate::domain::Beer;

use super::DocumentRepository;

/// Repository over the beer collection.
pub trait BeerRepository: DocumentRepository<Beer> {}

impl<T> BeerRepository for T where T: DocumentRepository<Beer> + ?Sized {}
