mod chronolog_api;
pub mod domain;
pub mod http;

pub use chronolog_api::{ChronologApi, HttpServerConfig};
