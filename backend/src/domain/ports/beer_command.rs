//! Driving port for catalog mutations.

use async_trait::async_trait;

use crate::domain::{BeerDraft, DocumentId, Error};

/// Request to add a beer to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBeerRequest {
    /// Caller-supplied fields; validated by the command handler.
    pub beer: BeerDraft,
}

/// Response from adding a beer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateBeerResponse {
    /// Identifier the beer was stored under.
    pub id: DocumentId,
}

/// Driving port for catalog write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BeerCommand: Send + Sync {
    /// Validate and store a new beer.
    ///
    /// Fails with `Validation` for bad fields, `Conflict` when the identifier
    /// is taken and `Internal` for storage failures.
    async fn create_beer(&self, request: CreateBeerRequest) -> Result<CreateBeerResponse, Error>;
}

/// Fixture command that accepts every request without storing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBeerCommand;

#[async_trait]
impl BeerCommand for FixtureBeerCommand {
    async fn create_beer(&self, request: CreateBeerRequest) -> Result<CreateBeerResponse, Error> {
        Ok(CreateBeerResponse {
            id: request.beer.id,
        })
    }
}
