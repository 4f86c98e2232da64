//! Security-tool catalog library exports

pub mod cache;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod meta;
pub mod model;
pub mod parser;
pub mod repo;
pub mod taxonomy;
pub mod web;

pub use catalog::{CatalogStats, CategoryCount, ToolCatalog};
pub use config::DiscoveryConfig;
pub use error::CatalogError;
pub use model::ToolRecord;
