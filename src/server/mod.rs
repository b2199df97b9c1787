pub mod config;
mod http_layers;
mod media_routes;
mod pagination;
mod request_routes;
mod search;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use pagination::{Page, PageRequest, PaginationQuery};
pub use server::{make_app, run_server};
pub(self) use media_routes::make_media_routes;
pub(self) use request_routes::make_request_routes;
pub(self) use search::make_search_routes;
