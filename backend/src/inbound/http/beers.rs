//! Beer catalog HTTP handlers.
//!
//! ```text
//! GET  /api/v1/beers?name=&start=&pageSize=
//! POST /api/v1/beers
//! GET  /api/v1/beers/{beerId}
//! GET  /api/v1/beers/{beerId}/boxprice?currency=&quantity=
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    BeerResponse, BoxPriceRequest, BoxPriceResponse, CreateBeerRequest, GetBeerRequest,
    ListBeersRequest, ListBeersResponse,
};
use crate::domain::{BeerDraft, DocumentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_page_window, parse_quantity, parse_target_currency};

/// Prefix every beer route is mounted under.
pub const BEERS_PATH: &str = "/api/v1/beers";

/// Beer as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeerBody {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Lager")]
    pub name: String,
    #[schema(example = "Brew Co")]
    pub brewery: String,
    #[schema(example = "Germany")]
    pub country: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 10.0)]
    pub price: Decimal,
    #[schema(example = "USD")]
    pub currency: String,
}

impl From<BeerResponse> for BeerBody {
    fn from(value: BeerResponse) -> Self {
        Self {
            id: value.id.get(),
            name: value.name,
            brewery: value.brewery,
            country: value.country,
            price: value.price,
            currency: value.currency.to_string(),
        }
    }
}

/// Request body for adding a beer.
///
/// Absent fields decode to blanks so the domain reports every violation in a
/// single field map.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBeerRequestBody {
    #[serde(default)]
    #[schema(example = 1, minimum = 1)]
    pub id: i64,
    #[serde(default)]
    #[schema(example = "Lager", max_length = 30)]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Brew Co", max_length = 30)]
    pub brewery: String,
    #[serde(default)]
    #[schema(example = "Germany", max_length = 20)]
    pub country: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>, example = 10.0, minimum = 0)]
    pub price: Option<Decimal>,
    #[serde(default)]
    #[schema(example = "USD", max_length = 5)]
    pub currency: String,
}

impl From<CreateBeerRequestBody> for BeerDraft {
    fn from(value: CreateBeerRequestBody) -> Self {
        Self {
            id: DocumentId::new(value.id),
            name: value.name,
            brewery: value.brewery,
            country: value.country,
            price: value.price,
            currency: value.currency,
        }
    }
}

/// Identifier of a newly added beer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBeerResponseBody {
    #[schema(example = 1)]
    pub id: i64,
}

/// One page of beers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeerPageBody {
    pub start: u64,
    pub page_size: u64,
    pub total: u64,
    pub data: Vec<BeerBody>,
}

impl From<ListBeersResponse> for BeerPageBody {
    fn from(value: ListBeersResponse) -> Self {
        Self {
            start: value.start,
            page_size: value.page_size,
            total: value.total,
            data: value.data.into_iter().map(BeerBody::from).collect(),
        }
    }
}

/// Total price of a box of beers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoxPriceBody {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 60.0)]
    pub price_total: Decimal,
    #[schema(example = "USD")]
    pub currency: String,
}

impl From<BoxPriceResponse> for BoxPriceBody {
    fn from(value: BoxPriceResponse) -> Self {
        Self {
            price_total: value.price_total,
            currency: value.currency.to_string(),
        }
    }
}

/// Query string for listing beers.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListBeersQuery {
    /// Case-insensitive substring of the beer name.
    pub name: Option<String>,
    /// Matches to skip; defaults to 0.
    #[param(minimum = 0)]
    pub start: Option<i64>,
    /// Page length; defaults to 50.
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

/// Query string for pricing a box.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BoxPriceQuery {
    /// Currency to price in; blank keeps the beer's own currency.
    pub currency: Option<String>,
    /// Units per box; defaults to 6.
    #[param(minimum = 1)]
    pub quantity: Option<i64>,
}

/// Path segment naming a beer.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeerPath {
    beer_id: i64,
}

impl BeerPath {
    fn id(self) -> DocumentId {
        DocumentId::new(self.beer_id)
    }
}

/// List beers whose name contains `name`, in identifier order.
#[utoipa::path(
    get,
    path = "/api/v1/beers",
    params(ListBeersQuery),
    responses(
        (status = 200, description = "Page of beers", body = BeerPageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["beers"],
    operation_id = "listBeers"
)]
#[get("/beers")]
pub async fn list_beers(
    state: web::Data<HttpState>,
    query: web::Query<ListBeersQuery>,
) -> ApiResult<web::Json<BeerPageBody>> {
    let ListBeersQuery {
        name,
        start,
        page_size,
    } = query.into_inner();
    let window = parse_page_window(start, page_size)?;
    let page = state
        .beers_query
        .list_beers(ListBeersRequest {
            name: name.unwrap_or_default(),
            window,
        })
        .await?;
    Ok(web::Json(BeerPageBody::from(page)))
}

/// Add a beer to the catalog.
#[utoipa::path(
    post,
    path = "/api/v1/beers",
    request_body = CreateBeerRequestBody,
    responses(
        (status = 201, description = "Beer created", body = CreateBeerResponseBody,
            headers(("Location" = String, description = "URL of the new beer"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Identifier already taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["beers"],
    operation_id = "createBeer"
)]
#[post("/beers")]
pub async fn create_beer(
    state: web::Data<HttpState>,
    payload: web::Json<CreateBeerRequestBody>,
) -> ApiResult<HttpResponse> {
    let created = state
        .beers
        .create_beer(CreateBeerRequest {
            beer: BeerDraft::from(payload.into_inner()),
        })
        .await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("{BEERS_PATH}/{}", created.id)))
        .json(CreateBeerResponseBody {
            id: created.id.get(),
        }))
}

/// Fetch a single beer.
#[utoipa::path(
    get,
    path = "/api/v1/beers/{beerId}",
    params(("beerId" = i64, Path, description = "Beer identifier")),
    responses(
        (status = 200, description = "Beer", body = BeerBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["beers"],
    operation_id = "getBeer"
)]
#[get("/beers/{beerId}")]
pub async fn get_beer(
    state: web::Data<HttpState>,
    path: web::Path<BeerPath>,
) -> ApiResult<web::Json<BeerBody>> {
    let beer = state
        .beers_query
        .get_beer(GetBeerRequest {
            id: path.into_inner().id(),
        })
        .await?;
    Ok(web::Json(BeerBody::from(beer)))
}

/// Price a box of a beer, optionally in another currency.
#[utoipa::path(
    get,
    path = "/api/v1/beers/{beerId}/boxprice",
    params(("beerId" = i64, Path, description = "Beer identifier"), BoxPriceQuery),
    responses(
        (status = 200, description = "Box price", body = BoxPriceBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Conversion or storage failure", body = ErrorSchema)
    ),
    tags = ["beers"],
    operation_id = "getBoxPrice"
)]
#[get("/beers/{beerId}/boxprice")]
pub async fn box_price(
    state: web::Data<HttpState>,
    path: web::Path<BeerPath>,
    query: web::Query<BoxPriceQuery>,
) -> ApiResult<web::Json<BoxPriceBody>> {
    let BoxPriceQuery { currency, quantity } = query.into_inner();
    let currency = parse_target_currency(currency.as_deref())?;
    let quantity = parse_quantity(quantity)?;
    let price = state
        .beers_query
        .box_price(BoxPriceRequest {
            id: path.into_inner().id(),
            currency,
            quantity,
        })
        .await?;
    Ok(web::Json(BoxPriceBody::from(price)))
}

#[cfg(test)]
#[path = "beers_tests.rs"]
mod tests;
