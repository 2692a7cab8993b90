// Relevanssi REST implementation

pub mod cli;
pub mod config;
pub mod links;
pub mod projector;
pub mod query;
pub mod response;
pub mod server;
pub mod store;

/// Route of the search endpoint
pub const SEARCH_ROUTE: &str = "/relevanssi/v1/search";
