//! Mock server recording and replay for integration testing.
//!
//! In record mode all requests are proxied to the real catalog
//! and the exchanges are written to a file when the client is dropped.
//! In replay mode a local server answers from such a file,
//! so tests can run against a fixed snapshot of the catalog.

use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;

use httpmock::{MockServer, RecordingID};
use tracing::debug;

use crate::config::{CatalogClientConfig, CatalogMockMode};

/// Keeps a `MockServer` running until the `CatalogClient` is dropped.
#[allow(dead_code)] // https://github.com/rust-lang/rust/issues/122833
pub(crate) enum MockGuard {
    Record(MockRecorder),
    Replay {
        server: MockServer,
        path_prefix: String,
    },
}

impl MockGuard {
    pub(crate) fn new(config: &CatalogClientConfig) -> Option<Self> {
        match &config.mock_mode {
            CatalogMockMode::None => None,
            CatalogMockMode::Record(path) => {
                let server = MockServer::start();
                let recording = start_recording(&server, &config.catalog_url);

                debug!(?path, server = server.base_url(), "mock server recording");
                Some(MockGuard::Record(MockRecorder {
                    path: path.to_path_buf(),
                    catalog_url: config.catalog_url.clone(),
                    server,
                    recording,
                }))
            },
            CatalogMockMode::Replay(path) => {
                let server = MockServer::start();
                server.playback(path);
                debug!(?path, server = server.base_url(), "mock server replaying");

                Some(MockGuard::Replay {
                    server,
                    path_prefix: catalog_path(&config.catalog_url),
                })
            },
        }
    }

    /// Base URL requests should be sent to instead of the catalog.
    ///
    /// The path of the configured catalog URL is kept,
    /// so recordings contain the same paths as the real API.
    pub(crate) fn url(&self) -> String {
        match self {
            MockGuard::Record(recorder) => format!(
                "{}{}",
                recorder.server.base_url(),
                catalog_path(&recorder.catalog_url)
            ),
            MockGuard::Replay {
                server,
                path_prefix,
            } => format!("{}{path_prefix}", server.base_url()),
        }
    }
}

fn start_recording(server: &MockServer, catalog_url: &str) -> RecordingID {
    server.forward_to(catalog_origin(catalog_url).as_str(), |rule| {
        rule.filter(|when| {
            when.any_request();
        });
    });
    server.record(|rule| {
        rule.filter(|when| {
            when.any_request();
        });
    })
}

/// Path of the catalog URL without a trailing slash, e.g. `/api`.
fn catalog_path(catalog_url: &str) -> String {
    match url::Url::parse(catalog_url) {
        Ok(url) => url.path().trim_end_matches('/').to_string(),
        Err(_) => String::new(),
    }
}

/// Scheme, host and port of the catalog URL.
///
/// The mock server forwards the full request path,
/// so only the origin may be passed to `forward_to`.
fn catalog_origin(catalog_url: &str) -> String {
    match url::Url::parse(catalog_url) {
        Ok(url) => url.origin().ascii_serialization(),
        Err(_) => catalog_url.to_string(),
    }
}

impl Debug for MockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let url = self.url();
        let mode = match self {
            MockGuard::Record(_) => "MockGuard::Record",
            MockGuard::Replay { .. } => "MockGuard::Replay",
        };
        write!(f, "{mode} url={url}")
    }
}

/// Writes recorded exchanges to `path` when dropped.
pub(crate) struct MockRecorder {
    pub(crate) path: PathBuf,
    pub(crate) catalog_url: String,
    pub(crate) server: MockServer,
    pub(crate) recording: RecordingID,
}

impl Drop for MockRecorder {
    fn drop(&mut self) {
        // `record_save` appends a timestamp, so we rename after write.
        // https://github.com/alexliesenfeld/httpmock/issues/115
        let Some(file_name) = self.path.file_name().and_then(|name| name.to_str()) else {
            debug!(path = ?self.path, "recording path has no usable file name, discarding");
            return;
        };
        let tempfile = match self
            .server
            .record_save(&self.recording, format!("httpmock_{file_name}"))
        {
            Ok(tempfile) => tempfile,
            Err(err) => {
                debug!(?err, "failed to save mock recording");
                return;
            },
        };
        debug!(
            src = %tempfile.as_path().display(),
            dest = %self.path.as_path().display(),
            "renaming recorded mock file"
        );
        // the recording directory may be on another filesystem
        let moved = fs::rename(&tempfile, &self.path).or_else(|_| {
            fs::copy(&tempfile, &self.path)?;
            fs::remove_file(&tempfile)
        });
        if let Err(err) = moved {
            debug!(%err, "failed to move recorded mock file");
            return;
        }
        debug!(path = ?self.path, "saved mock recording");
    }
}
