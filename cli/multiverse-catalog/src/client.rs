//! Catalog client performing the HTTP requests.

use std::fmt::Debug;
use std::iter;
use std::str::FromStr;

use reqwest::header::{self, HeaderMap};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
use crate::mock::MockGuard;
use crate::query::{FieldMap, NAME_KEY, PAGE_KEY};
use crate::resource::Resource;
use crate::types::{EntityId, Page};

/// A client for the catalog API.
///
/// Every call is a fresh round trip:
/// there is no caching and no retry.
pub struct CatalogClient {
    http: reqwest::Client,
    /// URL requests are sent to, differs from the configured URL when mocking
    base_url: Url,
    config: CatalogClientConfig,

    _mock_guard: Option<MockGuard>,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        // create a mock server if configured
        let mock_guard = MockGuard::new(&config);
        let effective_url = match mock_guard {
            Some(ref mock) => mock.url(),
            None => config.catalog_url.clone(),
        };

        let base_url = Url::parse(&effective_url).map_err(|e| {
            CatalogClientError::Other(format!("invalid catalog url '{effective_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogClientError::Other(format!(
                "catalog url '{effective_url}' cannot be used as a base url"
            )));
        }

        let http = build_http_client(&config)?;

        Ok(Self {
            http,
            base_url,
            config,
            _mock_guard: mock_guard,
        })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }

    /// `{base}/{segments..}?{query..}`
    fn endpoint<'a>(
        &self,
        segments: &[&str],
        query: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects urls that cannot be a base
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        let mut query = query.into_iter().peekable();
        if query.peek().is_some() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogClientError> {
        let endpoint = url.to_string();
        debug!(%endpoint, "sending catalog request");

        let result = async {
            let response = self.http.get(url).send().await?.error_for_status()?;
            response.json::<T>().await
        }
        .await;

        result.map_err(|source| {
            debug!(%endpoint, error = %source, "catalog request failed");
            CatalogClientError::FetchFailed { endpoint, source }
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// The complete catalog API interface.
///
/// All operations share one failure contract:
/// any transport error, non-success status or undecodable body
/// is a [CatalogClientError::FetchFailed].
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    /// Fetch page `page` (1-based) of a collection.
    ///
    /// Pages beyond the last one are not rejected locally,
    /// the remote answers them with "not found".
    async fn list_page<R: Resource>(&self, page: u32) -> Result<Page<R::Entity>, CatalogClientError>;

    /// Fetch a single entity.
    async fn get_by_id<R: Resource>(&self, id: EntityId) -> Result<R::Entity, CatalogClientError>;

    /// Fetch the first page of entities whose name contains `name`.
    ///
    /// An empty name is the same as an unfiltered request for page 1.
    async fn search_by_name<R: Resource>(
        &self,
        name: &str,
    ) -> Result<Page<R::Entity>, CatalogClientError>;

    /// Fetch entities matching all non-empty fields.
    async fn filter_by_fields<R: Resource>(
        &self,
        fields: &FieldMap,
    ) -> Result<Page<R::Entity>, CatalogClientError>;

    /// Dereference a reference URL exactly as given.
    async fn get_by_url<T: DeserializeOwned>(&self, url: &Url) -> Result<T, CatalogClientError>;
}

// ---------------------------------------------------------------------------
// CatalogApi implementation for CatalogClient
// ---------------------------------------------------------------------------

impl CatalogApi for CatalogClient {
    #[instrument(skip(self), fields(resource = R::PATH))]
    async fn list_page<R: Resource>(&self, page: u32) -> Result<Page<R::Entity>, CatalogClientError> {
        let page = page.to_string();
        let url = self.endpoint(&[R::PATH], [(PAGE_KEY, page.as_str())]);
        let page: Page<R::Entity> = self.fetch(url).await?;

        debug!(
            n_results = page.results.len(),
            count = page.info.count,
            pages = page.info.pages,
            "received page"
        );
        Ok(page)
    }

    #[instrument(skip(self), fields(resource = R::PATH))]
    async fn get_by_id<R: Resource>(&self, id: EntityId) -> Result<R::Entity, CatalogClientError> {
        let id = id.to_string();
        let url = self.endpoint(&[R::PATH, id.as_str()], iter::empty());
        self.fetch(url).await
    }

    #[instrument(skip(self), fields(resource = R::PATH))]
    async fn search_by_name<R: Resource>(
        &self,
        name: &str,
    ) -> Result<Page<R::Entity>, CatalogClientError> {
        if name.is_empty() {
            return self.list_page::<R>(1).await;
        }
        let url = self.endpoint(&[R::PATH], [(NAME_KEY, name)]);
        self.fetch(url).await
    }

    #[instrument(skip_all, fields(resource = R::PATH))]
    async fn filter_by_fields<R: Resource>(
        &self,
        fields: &FieldMap,
    ) -> Result<Page<R::Entity>, CatalogClientError> {
        if fields.is_blank() {
            debug!("no active fields, requesting first page");
            return self.list_page::<R>(1).await;
        }
        let url = self.endpoint(&[R::PATH], fields.active());
        self.fetch(url).await
    }

    #[instrument(skip_all, fields(url = %url))]
    async fn get_by_url<T: DeserializeOwned>(&self, url: &Url) -> Result<T, CatalogClientError> {
        self.fetch(url.clone()).await
    }
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build the HTTP client with the configured headers and timeouts.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| CatalogClientError::Other(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| CatalogClientError::Other(e.to_string()),
            )?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| CatalogClientError::Other(e.to_string()))
}

#[cfg(test)]
pub mod tests {
    use std::collections::BTreeMap;

    use httpmock::prelude::*;
    use multiverse_test_utils::fixtures;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::config::CatalogMockMode;
    use crate::resource::{Characters, Episodes, Locations};
    use crate::types::{Character, CharacterStatus, Episode};

    fn client_config(url: &str) -> CatalogClientConfig {
        CatalogClientConfig::new(url)
    }

    fn client(server: &MockServer) -> CatalogClient {
        CatalogClient::new(client_config(&server.base_url())).unwrap()
    }

    fn character_page(page: u32, pages: u32) -> serde_json::Value {
        fixtures::page_json("character", page, 20 * pages as u64, pages, vec![
            fixtures::character_json(page, "Rick Sanchez", "Alive", 2),
        ])
    }

    #[tokio::test]
    async fn list_page_requests_page_and_decodes() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/character").query_param("page", "2");
            then.status(200).json_body(character_page(2, 42));
        });

        let page = client(&server).list_page::<Characters>(2).await.unwrap();
        mock.assert();
        assert_eq!(page.info.pages, 42);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 2);
    }

    /// Requesting every page announced by the first one reports the same page count.
    #[tokio::test]
    async fn page_count_is_stable_across_pages() {
        let server = MockServer::start_async().await;
        let pages = 3;
        for page in 1..=pages {
            let page_param = page.to_string();
            server.mock(|when, then| {
                when.path("/character").query_param("page", page_param.as_str());
                then.status(200).json_body(character_page(page, pages));
            });
        }

        let client = client(&server);
        let first = client.list_page::<Characters>(1).await.unwrap();
        for page in 1..=first.info.pages {
            let response = client.list_page::<Characters>(page).await.unwrap();
            assert_eq!(response.info.pages, first.info.pages);
        }
    }

    #[tokio::test]
    async fn base_url_path_and_trailing_slash_are_kept() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/api/episode/28");
            then.status(200)
                .json_body(fixtures::episode_json(28, "The Ricklantis Mixup", "S03E07", 4));
        });

        let client = CatalogClient::new(client_config(&server.url("/api/"))).unwrap();
        let episode: Episode = client.get_by_id::<Episodes>(28).await.unwrap();
        mock.assert();
        assert_eq!(episode.episode.to_string(), "S03E07");
        assert_eq!(episode.characters.len(), 4);
    }

    #[tokio::test]
    async fn get_by_id_not_found() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/character/9999");
            then.status(404).json_body(json!({ "error": "Character not found" }));
        });

        let result = client(&server).get_by_id::<Characters>(9999).await;
        mock.assert();
        let err = result.unwrap_err();
        assert!(
            matches!(err, CatalogClientError::FetchFailed { .. }),
            "expected FetchFailed, found: {err:?}"
        );
        assert!(err.is_not_found());
        assert!(err.endpoint().unwrap().ends_with("/character/9999"));
    }

    /// Pages beyond the last page are answered by the remote, not rejected locally
    #[tokio::test]
    async fn out_of_range_page_is_a_fetch_failure() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/location").query_param("page", "99");
            then.status(404)
                .json_body(json!({ "error": "There is nothing here" }));
        });

        let result = client(&server).list_page::<Locations>(99).await;
        mock.assert();
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn server_error_is_a_fetch_failure() {
        let server = MockServer::start_async().await;
        server.mock(|_, then| {
            then.status(500);
        });

        let err = client(&server)
            .list_page::<Characters>(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogClientError::FetchFailed { .. }));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn undecodable_body_is_a_fetch_failure() {
        let server = MockServer::start_async().await;
        server.mock(|_, then| {
            then.status(200).json_body(json!({ "unexpected": "shape" }));
        });

        let err = client(&server)
            .list_page::<Characters>(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogClientError::FetchFailed { .. }));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn search_by_name_sends_name() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/character").query_param("name", "morty smith");
            then.status(200).json_body(character_page(1, 1));
        });

        let page = client(&server)
            .search_by_name::<Characters>("morty smith")
            .await
            .unwrap();
        mock.assert();
        assert_eq!(page.results.len(), 1);
    }

    #[tokio::test]
    async fn empty_search_is_an_unfiltered_first_page() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/episode").query_param("page", "1");
            then.status(200).json_body(fixtures::page_json("episode", 1, 51, 3, vec![]));
        });

        let page = client(&server)
            .search_by_name::<Episodes>("")
            .await
            .unwrap();
        mock.assert();
        assert_eq!(page.info.count, 51);
    }

    #[tokio::test]
    async fn filter_omits_empty_fields_and_forwards_unknown_keys() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/character")
                .query_param("status", "dead")
                .query_param("flavor", "pickle")
                .query_param("page", "1");
            then.status(200).json_body(fixtures::page_json("character", 1, 2, 1, vec![
                fixtures::character_json(8, "Adjudicator Rick", "Dead", 1),
                fixtures::character_json(15, "Alien Rick", "Dead", 1),
            ]));
        });

        let fields = FieldMap::from([
            ("name", ""),
            ("status", "dead"),
            ("flavor", "pickle"),
            ("gender", ""),
            ("page", "1"),
        ]);
        let page = client(&server)
            .filter_by_fields::<Characters>(&fields)
            .await
            .unwrap();
        mock.assert();

        // the mock above would also match with extra parameters
        let request_url = client(&server).endpoint(&["character"], fields.active());
        assert_eq!(request_url.query(), Some("status=dead&flavor=pickle&page=1"));

        let statuses = page
            .results
            .iter()
            .map(|c: &Character| c.status)
            .collect::<Vec<_>>();
        assert_eq!(statuses, vec![CharacterStatus::Dead, CharacterStatus::Dead]);
    }

    #[tokio::test]
    async fn empty_filter_is_the_same_request_as_list_page() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/character").query_param("page", "1");
            then.status(200).json_body(character_page(1, 42));
        });

        let client = client(&server);
        let filtered = client
            .filter_by_fields::<Characters>(&FieldMap::new())
            .await
            .unwrap();
        let listed = client.list_page::<Characters>(1).await.unwrap();

        mock.assert_hits(2);
        assert_eq!(filtered, listed);
    }

    #[tokio::test]
    async fn get_by_url_uses_the_url_verbatim() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/somewhere/else/episode/1");
            then.status(200)
                .json_body(fixtures::episode_json(1, "Pilot", "S01E01", 2));
        });

        // the configured base url is never consulted
        let client = CatalogClient::new(client_config("http://example.invalid/api")).unwrap();
        let url = Url::parse(&server.url("/somewhere/else/episode/1")).unwrap();
        let episode: Episode = client.get_by_url(&url).await.unwrap();
        mock.assert();
        assert_eq!(episode.name, "Pilot");
    }

    #[tokio::test]
    async fn extra_headers_set_on_all_requests() {
        let mut extra_headers: BTreeMap<String, String> = BTreeMap::new();
        extra_headers.insert("multiverse-test".to_string(), "test-value".to_string());
        extra_headers.insert("multiverse-test2".to_string(), "test-value2".to_string());

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("multiverse-test", "test-value")
                .header("multiverse-test2", "test-value2");
            then.status(200).json_body(character_page(1, 1));
        });

        let config = CatalogClientConfig {
            extra_headers,
            ..client_config(&server.base_url())
        };

        let client = CatalogClient::new(config).unwrap();
        let _ = client.list_page::<Characters>(1).await;
        mock.assert();
    }

    #[tokio::test]
    async fn user_agent_set_on_all_requests() {
        let expected_agent = "my-custom-user-agent";

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("user-agent", expected_agent);
            then.status(200).json_body(character_page(1, 1));
        });

        let config = CatalogClientConfig {
            user_agent: Some(expected_agent.to_owned()),
            ..client_config(&server.base_url())
        };

        let client = CatalogClient::new(config).unwrap();
        let _ = client.list_page::<Characters>(1).await;
        mock.assert();
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = CatalogClient::new(client_config("not a url")).unwrap_err();
        assert!(matches!(err, CatalogClientError::Other(_)));
    }

    #[test]
    fn invalid_header_is_rejected() {
        let config = CatalogClientConfig {
            extra_headers: BTreeMap::from([("bad header".to_string(), "x".to_string())]),
            ..client_config("http://localhost")
        };
        assert!(matches!(
            CatalogClient::new(config),
            Err(CatalogClientError::Other(_))
        ));
    }

    /// Record a session against an upstream server, then answer the same
    /// request from the recording alone.
    ///
    /// Not a tokio test: the mock servers are started and the recording is
    /// saved outside of the runtime.
    #[test]
    fn recorded_catalog_is_replayed() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let upstream = MockServer::start();
        let upstream_mock = upstream.mock(|when, then| {
            when.path("/api/character").query_param("page", "1");
            then.status(200).json_body(character_page(1, 3));
        });
        let recording_dir = tempfile::tempdir().unwrap();
        let recording = recording_dir.path().join("characters.yaml");

        let recorder = CatalogClient::new(CatalogClientConfig {
            mock_mode: CatalogMockMode::Record(recording.clone()),
            ..client_config(&upstream.url("/api"))
        })
        .unwrap();
        let recorded = runtime
            .block_on(recorder.list_page::<Characters>(1))
            .unwrap();
        // saved on drop
        drop(recorder);
        upstream_mock.assert();
        assert!(recording.exists());

        // the path prefix of the base url survives, the host does not matter
        let replayer = CatalogClient::new(CatalogClientConfig {
            mock_mode: CatalogMockMode::Replay(recording),
            ..client_config("https://catalog.invalid/api")
        })
        .unwrap();
        let replayed = runtime
            .block_on(replayer.list_page::<Characters>(1))
            .unwrap();

        upstream_mock.assert_hits(1);
        assert_eq!(replayed.info, recorded.info);
        assert_eq!(replayed.results, recorded.results);
        assert_eq!(replayed.results[0].name, "Rick Sanchez");
    }
}
