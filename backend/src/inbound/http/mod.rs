//! HTTP inbound adapter exposing REST endpoints.

pub mod beers;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Mount the catalog endpoints under `/api/v1`.
///
/// Extractor failures are rewritten into `validation` errors so malformed
/// bodies, query strings and paths share the domain error shape.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use beer_catalog::inbound::http::{api_scope, state::HttpState};
///
/// let _app = App::new()
///     .app_data(web::Data::new(HttpState::default()))
///     .service(api_scope());
/// ```
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(beers::list_beers)
        .service(beers::create_beer)
        .service(beers::get_beer)
        .service(beers::box_price)
}
