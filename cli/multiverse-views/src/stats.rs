//! Collection sizes shown on the home page.

use multiverse_catalog::{CatalogApi, CatalogClientError, Characters, Episodes, Locations};
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub characters: u64,
    pub episodes: u64,
    pub locations: u64,
}

impl CatalogStats {
    /// Fetch the first page of every collection concurrently and read their counts.
    #[instrument(skip_all)]
    pub async fn load<C: CatalogApi>(client: &C) -> Result<Self, CatalogClientError> {
        let (characters, episodes, locations) = futures::try_join!(
            client.list_page::<Characters>(1),
            client.list_page::<Episodes>(1),
            client.list_page::<Locations>(1),
        )?;

        Ok(Self {
            characters: characters.info.count,
            episodes: episodes.info.count,
            locations: locations.info.count,
        })
    }

    /// Like [Self::load], but a failure only gets logged and all counts are zero.
    pub async fn load_or_default<C: CatalogApi>(client: &C) -> Self {
        match Self::load(client).await {
            Ok(stats) => stats,
            Err(err) => {
                debug!(error = %err, "failed to load catalog stats, showing zeros");
                Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use multiverse_catalog::{CatalogClient, CatalogClientConfig};
    use multiverse_test_utils::fixtures;
    use pretty_assertions::assert_eq;

    use super::*;

    fn mock_first_page(server: &MockServer, resource: &str, count: u64) {
        let resource = resource.to_string();
        server.mock(|when, then| {
            when.path(format!("/{resource}")).query_param("page", "1");
            then.status(200)
                .json_body(fixtures::page_json(&resource, 1, count, 1, vec![]));
        });
    }

    #[tokio::test]
    async fn counts_of_all_collections() {
        let server = MockServer::start_async().await;
        mock_first_page(&server, "character", 826);
        mock_first_page(&server, "episode", 51);
        mock_first_page(&server, "location", 126);
        let client = CatalogClient::new(CatalogClientConfig::new(server.base_url())).unwrap();

        let stats = CatalogStats::load(&client).await.unwrap();
        assert_eq!(stats, CatalogStats {
            characters: 826,
            episodes: 51,
            locations: 126,
        });
    }

    #[tokio::test]
    async fn any_failure_falls_back_to_zeros() {
        let server = MockServer::start_async().await;
        mock_first_page(&server, "character", 826);
        mock_first_page(&server, "episode", 51);
        server.mock(|when, then| {
            when.path("/location");
            then.status(503);
        });
        let client = CatalogClient::new(CatalogClientConfig::new(server.base_url())).unwrap();

        assert!(CatalogStats::load(&client).await.is_err());
        assert_eq!(
            CatalogStats::load_or_default(&client).await,
            CatalogStats::default()
        );
    }
}
