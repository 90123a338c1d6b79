//! Page state for the catalog front-end.
//!
//! The types in this crate own everything a page needs to know
//! besides how to draw itself:
//! which request to issue for the current page and filters,
//! which response may update the page,
//! when a typed search query is quiet long enough to be sent,
//! and how related entities of a detail page are resolved.

pub mod debounce;
pub mod detail;
pub mod list;
pub mod pagination;
pub mod route;
pub mod stats;

pub use debounce::{DEFAULT_DEBOUNCE, Debounced, Debouncer};
pub use detail::{
    CharacterDetail,
    Detail,
    DetailError,
    EpisodeDetail,
    Expansion,
    LocationDetail,
    MAX_EXPANDED_REFERENCES,
    expand_references,
    load_character_detail,
    load_episode_detail,
    load_location_detail,
};
pub use list::{ListCoordinator, ListQuery, ListRequest, ListStatus, RequestId};
pub use pagination::{PageLink, PageWindow};
pub use route::{Route, RouteError};
pub use stats::CatalogStats;
