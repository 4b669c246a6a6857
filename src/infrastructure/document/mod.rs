//! Output document fetchers

mod http;
mod routing;

pub use http::HttpDocumentFetcher;
pub use routing::RoutingDocumentFetcher;
