use anyhow::Result;
use bpaf::Bpaf;
use multiverse_catalog::CatalogApi;
use multiverse_views::Route;
use tracing::instrument;

use super::characters::{Character, Characters};
use super::episodes::{Episode, Episodes};
use super::home::Home;
use super::locations::{Location, Locations};

// Show the page at a path
#[derive(Debug, Bpaf, Clone)]
pub struct Open {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Path of the page, e.g. '/', '/characters' or '/episodes/28'
    #[bpaf(positional("PATH"))]
    pub route: Route,
}

impl Open {
    #[instrument(name = "open", skip_all, fields(route = %self.route))]
    pub async fn handle(self, client: &impl CatalogApi) -> Result<()> {
        let json = self.json;
        let page = 1;

        match self.route {
            Route::Home => Home { json }.handle(client).await,
            Route::Characters => {
                Characters {
                    json,
                    page,
                    name: None,
                    status: None,
                    species: None,
                    kind: None,
                    gender: None,
                }
                .handle(client)
                .await
            },
            Route::Character(id) => Character { json, id }.handle(client).await,
            Route::Episodes => {
                Episodes {
                    json,
                    page,
                    name: None,
                    episode: None,
                }
                .handle(client)
                .await
            },
            Route::Episode(id) => Episode { json, id }.handle(client).await,
            Route::Locations => {
                Locations {
                    json,
                    page,
                    name: None,
                    kind: None,
                    dimension: None,
                }
                .handle(client)
                .await
            },
            Route::Location(id) => Location { json, id }.handle(client).await,
        }
    }
}
