//! Resource kinds served by the catalog.
//!
//! Each collection of the remote API (characters, episodes, locations)
//! is represented by a marker type implementing [Resource],
//! which ties the URL path segment to the entity type it returns.

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{Character, Episode, Location};

pub trait Resource: Debug + Send + Sync + 'static {
    /// Path segment below the base URL, e.g. `character`
    const PATH: &'static str;
    /// Plural name used in user facing messages, e.g. `characters`
    const LABEL: &'static str;
    /// Singular name used in user facing messages
    const SINGULAR: &'static str;

    type Entity: DeserializeOwned + Serialize + Clone + Debug + Send + 'static;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Characters;

impl Resource for Characters {
    type Entity = Character;

    const LABEL: &'static str = "characters";
    const PATH: &'static str = "character";
    const SINGULAR: &'static str = "character";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Episodes;

impl Resource for Episodes {
    type Entity = Episode;

    const LABEL: &'static str = "episodes";
    const PATH: &'static str = "episode";
    const SINGULAR: &'static str = "episode";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Locations;

impl Resource for Locations {
    type Entity = Location;

    const LABEL: &'static str = "locations";
    const PATH: &'static str = "location";
    const SINGULAR: &'static str = "location";
}
