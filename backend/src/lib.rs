//! Beer catalog service library.
//!
//! The [`domain`] module holds the catalog model, the generic document
//! repository port and the command/query services. Adapters live under
//! [`inbound`] (actix-web) and [`outbound`] (Postgres, in-memory storage and
//! currency conversion).

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
