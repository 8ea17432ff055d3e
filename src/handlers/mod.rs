//! File handlers operating on the dispatcher's volume.
//!
//! Every handler answers exactly once and leaves closing the connection to
//! the dispatcher.

mod delete;
mod get;
mod listing;
mod put;
mod rename;

pub use delete::delete_handler;
pub use get::get_handler;
pub use listing::{list_directory, render_listing};
pub use put::put_handler;
pub use rename::move_handler;

use crate::http::request::Method;
use crate::http::router::Router;
use crate::storage::Volume;

/// Headers the built-in handlers read.
pub const HEADERS: &[&str] = &["content-length"];

/// The whole volume under `/`, one route per supported method.
pub fn file_router<V: Volume>() -> Router<V> {
    Router::new()
        .route("/*", Method::GET, get_handler::<V>)
        .route("/*", Method::PUT, put_handler::<V>)
        .route("/*", Method::DELETE, delete_handler::<V>)
        .route("/*", Method::MOVE, move_handler::<V>)
}
