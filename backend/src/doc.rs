//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every beer catalog endpoint and health check along
//! with the schema wrappers for domain errors. The document is served by
//! Swagger UI in debug builds and exported via `cargo run --bin openapi-dump`.

use crate::inbound::http::beers::{
    BeerBody, BeerPageBody, BoxPriceBody, CreateBeerRequestBody, CreateBeerResponseBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, FieldErrorsSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Beer catalog API",
        description = "Create, look up and list beers, and price boxes in any currency."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::beers::list_beers,
        crate::inbound::http::beers::create_beer,
        crate::inbound::http::beers::get_beer,
        crate::inbound::http::beers::box_price,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        BeerBody,
        BeerPageBody,
        BoxPriceBody,
        CreateBeerRequestBody,
        CreateBeerResponseBody,
        ErrorSchema,
        ErrorCodeSchema,
        FieldErrorsSchema
    )),
    tags(
        (name = "beers", description = "Beer catalog operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
