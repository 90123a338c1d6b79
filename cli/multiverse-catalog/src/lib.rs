//! HTTP client for the public character/episode/location catalog API.
//!
//! This crate provides:
//! - HTTP client construction from injected configuration
//! - Typed entities and the paginated page envelope
//! - Field maps for the filter endpoints
//! - A single error kind for failed fetches
//! - Mock server recording/replay for integration testing
//!
//! ## Usage
//!
//! ```ignore
//! use multiverse_catalog::{CatalogApi, CatalogClient, CatalogClientConfig, Characters};
//!
//! let client = CatalogClient::new(CatalogClientConfig::new("https://rickandmortyapi.com/api"))?;
//! let page = client.list_page::<Characters>(1).await?;
//! ```

mod client;
mod config;
mod error;
mod mock;
pub mod query;
pub mod resource;
pub mod types;

pub use client::{CatalogApi, CatalogClient};
pub use config::{
    CatalogClientConfig,
    CatalogMockMode,
    DEFAULT_CATALOG_URL,
    DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use error::CatalogClientError;
pub use query::{CharacterFilter, EpisodeFilter, FieldMap, LocationFilter};
pub use resource::{Characters, Episodes, Locations, Resource};
pub use types::{Character, Episode, Location, Page, PageInfo};
