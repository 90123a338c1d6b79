//! Query parameters for the filter endpoints.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{CharacterStatus, Gender};

pub const PAGE_KEY: &str = "page";
pub const NAME_KEY: &str = "name";

/// Ordered map of filter fields forwarded to a collection endpoint.
///
/// Keys are not validated, the remote API decides what it understands.
/// Entries with an empty value are kept in the map but never sent,
/// so clearing a filter is the same as setting it to `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(IndexMap<String, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    /// Entries that would be sent to the remote, in insertion order.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Whether any entry other than `page` would be sent.
    pub fn has_filters(&self) -> bool {
        self.active().any(|(key, _)| key != PAGE_KEY)
    }

    /// Whether nothing at all would be sent.
    pub fn is_blank(&self) -> bool {
        self.active().next().is_none()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for FieldMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

fn push_opt(fields: &mut FieldMap, key: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        fields.set(key, value.to_string());
    }
}

/// Filters understood by the character endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterFilter {
    pub name: Option<String>,
    pub status: Option<CharacterStatus>,
    pub species: Option<String>,
    pub kind: Option<String>,
    pub gender: Option<Gender>,
    pub page: Option<u32>,
}

impl From<CharacterFilter> for FieldMap {
    fn from(filter: CharacterFilter) -> Self {
        let mut fields = FieldMap::new();
        push_opt(&mut fields, NAME_KEY, filter.name);
        push_opt(&mut fields, "status", filter.status.map(|s| s.query_value()));
        push_opt(&mut fields, "species", filter.species);
        push_opt(&mut fields, "type", filter.kind);
        push_opt(&mut fields, "gender", filter.gender.map(|g| g.query_value()));
        push_opt(&mut fields, PAGE_KEY, filter.page);
        fields
    }
}

/// Filters understood by the episode endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeFilter {
    pub name: Option<String>,
    /// Episode code or a prefix of it, e.g. `S01`
    pub episode: Option<String>,
    pub page: Option<u32>,
}

impl From<EpisodeFilter> for FieldMap {
    fn from(filter: EpisodeFilter) -> Self {
        let mut fields = FieldMap::new();
        push_opt(&mut fields, NAME_KEY, filter.name);
        push_opt(&mut fields, "episode", filter.episode);
        push_opt(&mut fields, PAGE_KEY, filter.page);
        fields
    }
}

/// Filters understood by the location endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub dimension: Option<String>,
    pub page: Option<u32>,
}

impl From<LocationFilter> for FieldMap {
    fn from(filter: LocationFilter) -> Self {
        let mut fields = FieldMap::new();
        push_opt(&mut fields, NAME_KEY, filter.name);
        push_opt(&mut fields, "type", filter.kind);
        push_opt(&mut fields, "dimension", filter.dimension);
        push_opt(&mut fields, PAGE_KEY, filter.page);
        fields
    }
}
