use anyhow::Result;
use bpaf::Bpaf;
use multiverse_catalog::types::EntityId;
use multiverse_catalog::{CatalogApi, EpisodeFilter, Episodes as EpisodeResource, FieldMap};
use multiverse_views::load_episode_detail;
use tracing::instrument;

use super::list::{detail_failure, show_detail, show_listing};

// List episodes
#[derive(Debug, Bpaf, Clone)]
pub struct Episodes {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Page to show, starting at 1.
    /// Filtered listings have a single page.
    #[bpaf(long, argument("N"), fallback(1))]
    pub page: u32,

    /// Only episodes whose name contains this text
    #[bpaf(long, argument("TEXT"))]
    pub name: Option<String>,

    /// Only episodes whose code starts with this, e.g. 'S02'
    #[bpaf(long("code"), argument("CODE"))]
    pub episode: Option<String>,
}

impl Episodes {
    pub(crate) fn fields(&self) -> FieldMap {
        EpisodeFilter {
            name: self.name.clone(),
            episode: self.episode.clone(),
            page: None,
        }
        .into()
    }

    #[instrument(name = "episodes", skip_all, fields(page = self.page))]
    pub async fn handle(self, client: &impl CatalogApi) -> Result<()> {
        show_listing::<EpisodeResource, _>(client, &self.fields(), self.page, self.json).await
    }
}

// Show an episode
#[derive(Debug, Bpaf, Clone)]
pub struct Episode {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    #[bpaf(positional("ID"))]
    pub id: EntityId,
}

impl Episode {
    #[instrument(name = "episode", skip_all, fields(id = self.id))]
    pub async fn handle(self, client: &impl CatalogApi) -> Result<()> {
        let detail = load_episode_detail(client, self.id)
            .await
            .map_err(detail_failure)?;
        show_detail(&detail, "Characters", self.json)
    }
}
