use anyhow::Result;
use bpaf::Bpaf;
use multiverse_catalog::types::{CharacterStatus, EntityId, Gender};
use multiverse_catalog::{CatalogApi, CharacterFilter, Characters as CharacterResource, FieldMap};
use multiverse_views::load_character_detail;
use tracing::instrument;

use super::list::{detail_failure, show_detail, show_listing};

// List characters
#[derive(Debug, Bpaf, Clone)]
pub struct Characters {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Page to show, starting at 1.
    /// Filtered listings have a single page.
    #[bpaf(long, argument("N"), fallback(1))]
    pub page: u32,

    /// Only characters whose name contains this text
    #[bpaf(long, argument("TEXT"))]
    pub name: Option<String>,

    /// Only characters with this status (alive, dead, unknown)
    #[bpaf(long, argument("STATUS"))]
    pub status: Option<CharacterStatus>,

    /// Only characters of this species
    #[bpaf(long, argument("SPECIES"))]
    pub species: Option<String>,

    /// Only characters of this type, e.g. 'Parasite'
    #[bpaf(long("type"), argument("TYPE"))]
    pub kind: Option<String>,

    /// Only characters with this gender (female, male, genderless, unknown)
    #[bpaf(long, argument("GENDER"))]
    pub gender: Option<Gender>,
}

impl Characters {
    pub(crate) fn fields(&self) -> FieldMap {
        CharacterFilter {
            name: self.name.clone(),
            status: self.status,
            species: self.species.clone(),
            kind: self.kind.clone(),
            gender: self.gender,
            page: None,
        }
        .into()
    }

    #[instrument(name = "characters", skip_all, fields(page = self.page))]
    pub async fn handle(self, client: &impl CatalogApi) -> Result<()> {
        show_listing::<CharacterResource, _>(client, &self.fields(), self.page, self.json).await
    }
}

// Show a character
#[derive(Debug, Bpaf, Clone)]
pub struct Character {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    #[bpaf(positional("ID"))]
    pub id: EntityId,
}

impl Character {
    #[instrument(name = "character", skip_all, fields(id = self.id))]
    pub async fn handle(self, client: &impl CatalogApi) -> Result<()> {
        let detail = load_character_detail(client, self.id)
            .await
            .map_err(detail_failure)?;
        show_detail(&detail, "Episodes", self.json)
    }
}
