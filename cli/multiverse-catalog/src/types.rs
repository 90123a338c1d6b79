//! Catalog entity types.
//!
//! These mirror the JSON returned by the remote API.
//! Relations between entities are only ever expressed as reference URLs,
//! which have to be fetched separately to be resolved.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

pub type EntityId = u32;

// ---------------------------------------------------------------------------
// Page envelope
// ---------------------------------------------------------------------------

/// Envelope returned by every collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub info: PageInfo,
    pub results: Vec<T>,
}

/// Pagination metadata of a [Page].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Total number of items matching the request across all pages
    pub count: u64,
    /// Total number of pages
    pub pages: u32,
    pub next: Option<Url>,
    pub prev: Option<Url>,
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    /// Subtype or subspecies, empty if the catalog has none.
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: Gender,
    pub origin: EntityLink,
    pub location: EntityLink,
    pub image: Url,
    /// Episodes the character appears in, in airing order.
    pub episode: Vec<Url>,
    pub url: Url,
    pub created: DateTime<Utc>,
}

impl Character {
    pub fn subtype(&self) -> Option<&str> {
        non_empty(&self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterStatus {
    Alive,
    Dead,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CharacterStatus {
    pub const ALL: [CharacterStatus; 3] = [Self::Alive, Self::Dead, Self::Unknown];

    /// Value accepted by the `status` filter.
    pub fn query_value(&self) -> &'static str {
        match self {
            CharacterStatus::Alive => "alive",
            CharacterStatus::Dead => "dead",
            CharacterStatus::Unknown => "unknown",
        }
    }
}

impl Display for CharacterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharacterStatus::Alive => write!(f, "Alive"),
            CharacterStatus::Dead => write!(f, "Dead"),
            CharacterStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for CharacterStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.query_value().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant::new(s, Self::ALL.map(|v| v.query_value())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Genderless,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 4] = [Self::Female, Self::Male, Self::Genderless, Self::Unknown];

    /// Value accepted by the `gender` filter.
    pub fn query_value(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Genderless => "genderless",
            Gender::Unknown => "unknown",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Female => write!(f, "Female"),
            Gender::Male => write!(f, "Male"),
            Gender::Genderless => write!(f, "Genderless"),
            Gender::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gender| gender.query_value().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant::new(s, Self::ALL.map(|v| v.query_value())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not one of: {}", expected.join(", "))]
pub struct UnknownVariant {
    value: String,
    expected: Vec<&'static str>,
}

impl UnknownVariant {
    fn new<const N: usize>(value: &str, expected: [&'static str; N]) -> Self {
        Self {
            value: value.to_string(),
            expected: expected.to_vec(),
        }
    }
}

/// Name and reference of a related entity, e.g. a character's origin.
///
/// The catalog uses an empty `url` for origins and locations it knows
/// nothing about ("unknown").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLink {
    pub name: String,
    #[serde(
        deserialize_with = "deserialize_optional_url",
        serialize_with = "serialize_optional_url"
    )]
    pub url: Option<Url>,
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EntityId,
    pub name: String,
    /// Display string as provided by the catalog, e.g. "December 2, 2013"
    pub air_date: String,
    pub episode: EpisodeCode,
    pub characters: Vec<Url>,
    pub url: Url,
    pub created: DateTime<Utc>,
}

/// Episode code in the form `SNNEMM`, e.g. `S01E03`.
///
/// Codes that do not follow the format are kept verbatim,
/// [EpisodeCode::season] and [EpisodeCode::number] return `None` for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRef)]
#[serde(transparent)]
#[as_ref(forward)]
pub struct EpisodeCode(String);

impl EpisodeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    fn parts(&self) -> Option<(u32, u32)> {
        let rest = self.0.strip_prefix('S')?;
        let (season, episode) = rest.split_once('E')?;
        Some((season.parse().ok()?, episode.parse().ok()?))
    }

    pub fn season(&self) -> Option<u32> {
        self.parts().map(|(season, _)| season)
    }

    pub fn number(&self) -> Option<u32> {
        self.parts().map(|(_, episode)| episode)
    }

    /// "Season 1, Episode 3", or the raw code if it cannot be parsed.
    pub fn describe(&self) -> String {
        match self.parts() {
            Some((season, episode)) => format!("Season {season}, Episode {episode}"),
            None => self.0.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: EntityId,
    pub name: String,
    /// Free text category, e.g. "Planet"
    #[serde(rename = "type")]
    pub kind: String,
    pub dimension: String,
    pub residents: Vec<Url>,
    pub url: Url,
    pub created: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

fn deserialize_optional_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(url) => Url::parse(url).map(Some).map_err(serde::de::Error::custom),
    }
}

fn serialize_optional_url<S>(url: &Option<Url>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(url.as_ref().map(Url::as_str).unwrap_or_default())
}
