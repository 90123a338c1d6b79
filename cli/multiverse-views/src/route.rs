//! Addressable pages of the application.

use std::fmt;
use std::str::FromStr;

use multiverse_catalog::types::EntityId;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Characters,
    Character(EntityId),
    Episodes,
    Episode(EntityId),
    Locations,
    Location(EntityId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no page at '{0}'")]
    UnknownPath(String),
    #[error("'{id}' is not a valid {collection} id")]
    InvalidId { collection: &'static str, id: String },
}

impl Route {
    /// The listing page a detail page belongs to, detail pages link back to it.
    pub fn parent(&self) -> Option<Route> {
        match self {
            Route::Home => None,
            Route::Characters | Route::Episodes | Route::Locations => Some(Route::Home),
            Route::Character(_) => Some(Route::Characters),
            Route::Episode(_) => Some(Route::Episodes),
            Route::Location(_) => Some(Route::Locations),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    /// Parse an absolute path such as `/characters/1`.
    ///
    /// A trailing slash is accepted.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let unknown = || RouteError::UnknownPath(path.to_string());

        let trimmed = path.strip_prefix('/').ok_or_else(unknown)?;
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Route::Home);
        }

        let mut segments = trimmed.split('/');
        let collection = segments.next().unwrap_or_default();
        let id = segments.next();
        if segments.next().is_some() {
            return Err(unknown());
        }

        let parse_id = |collection: &'static str, id: &str| {
            id.parse::<EntityId>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| RouteError::InvalidId {
                    collection,
                    id: id.to_string(),
                })
        };

        let route = match (collection, id) {
            ("characters", None) => Route::Characters,
            ("characters", Some(id)) => Route::Character(parse_id("character", id)?),
            ("episodes", None) => Route::Episodes,
            ("episodes", Some(id)) => Route::Episode(parse_id("episode", id)?),
            ("locations", None) => Route::Locations,
            ("locations", Some(id)) => Route::Location(parse_id("location", id)?),
            _ => return Err(unknown()),
        };
        Ok(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Characters => write!(f, "/characters"),
            Route::Character(id) => write!(f, "/characters/{id}"),
            Route::Episodes => write!(f, "/episodes"),
            Route::Episode(id) => write!(f, "/episodes/{id}"),
            Route::Locations => write!(f, "/locations"),
            Route::Location(id) => write!(f, "/locations/{id}"),
        }
    }
}
