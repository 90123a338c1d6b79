//! Detail pages: one entity plus the entities it references.
//!
//! Related entities are only known by URL.
//! Loading a detail page fetches the primary entity first,
//! then dereferences up to [MAX_EXPANDED_REFERENCES] of its references
//! concurrently and waits for all of them.

use futures::future::try_join_all;
use multiverse_catalog::resource::Resource;
use multiverse_catalog::types::EntityId;
use multiverse_catalog::{
    CatalogApi,
    CatalogClientError,
    Character,
    Characters,
    Episode,
    Episodes,
    Location,
    Locations,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// References beyond this many are not fetched.
pub const MAX_EXPANDED_REFERENCES: usize = 20;

/// The fetched prefix of a reference list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expansion<T> {
    pub items: Vec<T>,
    /// Number of references the entity has, fetched or not.
    pub total: usize,
}

impl<T> Expansion<T> {
    pub fn is_truncated(&self) -> bool {
        self.total > self.items.len()
    }

    /// "Showing 20 of 35", only if not every reference was fetched.
    pub fn truncation_notice(&self) -> Option<String> {
        self.is_truncated()
            .then(|| format!("Showing {} of {}", self.items.len(), self.total))
    }
}

/// Fetch the first [MAX_EXPANDED_REFERENCES] of `urls`.
///
/// Fails as a whole if any single fetch fails.
pub async fn expand_references<T, C>(
    client: &C,
    urls: &[Url],
) -> Result<Expansion<T>, CatalogClientError>
where
    T: DeserializeOwned,
    C: CatalogApi,
{
    let total = urls.len();
    let fetched = &urls[..total.min(MAX_EXPANDED_REFERENCES)];
    let items = try_join_all(fetched.iter().map(|url| client.get_by_url::<T>(url))).await?;
    Ok(Expansion { items, total })
}

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Failed to load {singular} details. Please try again later.")]
    Primary {
        singular: &'static str,
        #[source]
        source: CatalogClientError,
    },
    #[error("Failed to load {singular} details. Please try again later.")]
    Expansion {
        singular: &'static str,
        #[source]
        source: CatalogClientError,
    },
}

impl DetailError {
    /// Whether the primary entity does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            DetailError::Primary { source, .. } => source.is_not_found(),
            DetailError::Expansion { .. } => false,
        }
    }
}

/// An entity and the entities it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail<E, T> {
    pub entity: E,
    pub related: Expansion<T>,
}

/// A character and the episodes it appears in.
pub type CharacterDetail = Detail<Character, Episode>;
/// An episode and its cast.
pub type EpisodeDetail = Detail<Episode, Character>;
/// A location and its residents.
pub type LocationDetail = Detail<Location, Character>;

async fn load_detail<R, T, C>(
    client: &C,
    id: EntityId,
    references: impl FnOnce(&R::Entity) -> &[Url],
) -> Result<Detail<R::Entity, T>, DetailError>
where
    R: Resource,
    T: DeserializeOwned,
    C: CatalogApi,
{
    let entity = client
        .get_by_id::<R>(id)
        .await
        .map_err(|source| DetailError::Primary {
            singular: R::SINGULAR,
            source,
        })?;

    let urls = references(&entity);
    debug!(
        resource = R::PATH,
        id,
        references = urls.len(),
        "expanding references"
    );

    let related = expand_references::<T, C>(client, urls)
        .await
        .map_err(|source| DetailError::Expansion {
            singular: R::SINGULAR,
            source,
        })?;

    Ok(Detail { entity, related })
}

#[instrument(skip(client))]
pub async fn load_character_detail<C: CatalogApi>(
    client: &C,
    id: EntityId,
) -> Result<CharacterDetail, DetailError> {
    load_detail::<Characters, Episode, C>(client, id, |character| {
        character.episode.as_slice()
    })
    .await
}

#[instrument(skip(client))]
pub async fn load_episode_detail<C: CatalogApi>(
    client: &C,
    id: EntityId,
) -> Result<EpisodeDetail, DetailError> {
    load_detail::<Episodes, Character, C>(client, id, |episode| {
        episode.characters.as_slice()
    })
    .await
}

#[instrument(skip(client))]
pub async fn load_location_detail<C: CatalogApi>(
    client: &C,
    id: EntityId,
) -> Result<LocationDetail, DetailError> {
    load_detail::<Locations, Character, C>(client, id, |location| {
        location.residents.as_slice()
    })
    .await
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use httpmock::Mock;
    use multiverse_catalog::{CatalogClient, CatalogClientConfig};
    use multiverse_test_utils::fixtures;
    use pretty_assertions::assert_eq;

    use super::*;

    fn client(server: &MockServer) -> CatalogClient {
        CatalogClient::new(CatalogClientConfig::new(server.base_url())).unwrap()
    }

    /// One mock per character id, answering `/character/{id}`.
    fn mock_characters(server: &MockServer, ids: impl IntoIterator<Item = u32>) -> Vec<Mock<'_>> {
        ids.into_iter()
            .map(|id| {
                server.mock(|when, then| {
                    when.method(GET).path(format!("/character/{id}"));
                    then.status(200)
                        .json_body(fixtures::character_json(id, "Morty Smith", "Alive", 1));
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn episode_with_35_characters_fetches_20() {
        let server = MockServer::start_async().await;
        let episode = fixtures::with_references(
            fixtures::episode_json(28, "The Ricklantis Mixup", "S03E07", 0),
            "characters",
            fixtures::reference_urls(&server.base_url(), "character", 1..=35),
        );
        server.mock(|when, then| {
            when.path("/episode/28");
            then.status(200).json_body(episode);
        });
        let characters = mock_characters(&server, 1..=35);

        let detail = load_episode_detail(&client(&server), 28).await.unwrap();

        assert_eq!(detail.related.items.len(), 20);
        assert_eq!(detail.related.total, 35);
        assert_eq!(
            detail.related.truncation_notice().as_deref(),
            Some("Showing 20 of 35")
        );
        for (index, mock) in characters.iter().enumerate() {
            mock.assert_hits(if index < 20 { 1 } else { 0 });
        }
    }

    #[tokio::test]
    async fn expanded_items_keep_reference_order() {
        let server = MockServer::start_async().await;
        let location = fixtures::with_references(
            fixtures::location_json(3, "Citadel of Ricks", 0),
            "residents",
            fixtures::reference_urls(&server.base_url(), "character", [9, 2, 5]),
        );
        server.mock(|when, then| {
            when.path("/location/3");
            then.status(200).json_body(location);
        });
        mock_characters(&server, [2, 5, 9]);

        let detail = load_location_detail(&client(&server), 3).await.unwrap();
        let ids: Vec<_> = detail.related.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[tokio::test]
    async fn primary_failure_makes_no_reference_requests() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/episode/999");
            then.status(404).json_body(serde_json::json!({"error": "Episode not found"}));
        });
        let characters = mock_characters(&server, 1..=3);

        let err = load_episode_detail(&client(&server), 999)
            .await
            .unwrap_err();

        assert!(matches!(err, DetailError::Primary { .. }));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Failed to load episode details. Please try again later."
        );
        for mock in characters {
            mock.assert_hits(0);
        }
    }

    #[tokio::test]
    async fn character_with_5_episodes_fetches_all() {
        let server = MockServer::start_async().await;
        let character = fixtures::with_references(
            fixtures::character_json(1, "Rick Sanchez", "Alive", 0),
            "episode",
            fixtures::reference_urls(&server.base_url(), "episode", 1..=5),
        );
        server.mock(|when, then| {
            when.path("/character/1");
            then.status(200).json_body(character);
        });
        let episodes: Vec<_> = (1..=5)
            .map(|id| {
                server.mock(|when, then| {
                    when.path(format!("/episode/{id}"));
                    then.status(200).json_body(fixtures::episode_json(
                        id,
                        "Pilot",
                        &format!("S01E0{id}"),
                        1,
                    ));
                })
            })
            .collect();

        let detail = load_character_detail(&client(&server), 1).await.unwrap();

        assert_eq!(detail.related.items.len(), 5);
        assert_eq!(detail.related.truncation_notice(), None);
        for mock in episodes {
            mock.assert();
        }
    }

    #[tokio::test]
    async fn any_failed_reference_fails_the_expansion() {
        let server = MockServer::start_async().await;
        let location = fixtures::with_references(
            fixtures::location_json(20, "Earth (Replacement Dimension)", 0),
            "residents",
            fixtures::reference_urls(&server.base_url(), "character", 1..=4),
        );
        server.mock(|when, then| {
            when.path("/location/20");
            then.status(200).json_body(location);
        });
        mock_characters(&server, 1..=3);
        server.mock(|when, then| {
            when.path("/character/4");
            then.status(500);
        });

        let err = load_location_detail(&client(&server), 20)
            .await
            .unwrap_err();

        assert!(matches!(err, DetailError::Expansion { .. }));
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Failed to load location details. Please try again later."
        );
    }

    #[tokio::test]
    async fn no_references_is_an_empty_expansion() {
        let server = MockServer::start_async().await;
        let urls: Vec<Url> = Vec::new();
        let expansion = expand_references::<Character, _>(&client(&server), &urls)
            .await
            .unwrap();
        assert_eq!(expansion.items, Vec::<Character>::new());
        assert!(!expansion.is_truncated());
    }
}
