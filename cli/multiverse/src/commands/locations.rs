use anyhow::Result;
use bpaf::Bpaf;
use multiverse_catalog::types::EntityId;
use multiverse_catalog::{CatalogApi, FieldMap, LocationFilter, Locations as LocationResource};
use multiverse_views::load_location_detail;
use tracing::instrument;

use super::list::{detail_failure, show_detail, show_listing};

// List locations
#[derive(Debug, Bpaf, Clone)]
pub struct Locations {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Page to show, starting at 1.
    /// Filtered listings have a single page.
    #[bpaf(long, argument("N"), fallback(1))]
    pub page: u32,

    /// Only locations whose name contains this text
    #[bpaf(long, argument("TEXT"))]
    pub name: Option<String>,

    /// Only locations of this type, e.g. 'Planet'
    #[bpaf(long("type"), argument("TYPE"))]
    pub kind: Option<String>,

    /// Only locations in this dimension
    #[bpaf(long, argument("DIMENSION"))]
    pub dimension: Option<String>,
}

impl Locations {
    pub(crate) fn fields(&self) -> FieldMap {
        LocationFilter {
            name: self.name.clone(),
            kind: self.kind.clone(),
            dimension: self.dimension.clone(),
            page: None,
        }
        .into()
    }

    #[instrument(name = "locations", skip_all, fields(page = self.page))]
    pub async fn handle(self, client: &impl CatalogApi) -> Result<()> {
        show_listing::<LocationResource, _>(client, &self.fields(), self.page, self.json).await
    }
}

// Show a location
#[derive(Debug, Bpaf, Clone)]
pub struct Location {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    #[bpaf(positional("ID"))]
    pub id: EntityId,
}

impl Location {
    #[instrument(name = "location", skip_all, fields(id = self.id))]
    pub async fn handle(self, client: &impl CatalogApi) -> Result<()> {
        let detail = load_location_detail(client, self.id)
            .await
            .map_err(detail_failure)?;
        show_detail(&detail, "Residents", self.json)
    }
}
