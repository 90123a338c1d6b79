use anyhow::Result;
use bpaf::Bpaf;
use multiverse_catalog::CatalogApi;
use multiverse_views::CatalogStats;
use tracing::instrument;

use crate::utils::render::render_stats;

// Show the home page
#[derive(Debug, Bpaf, Clone, Default)]
pub struct Home {
    /// Display the counts as JSON
    #[bpaf(long)]
    pub json: bool,
}

impl Home {
    #[instrument(name = "home", skip_all)]
    pub async fn handle(self, client: &impl CatalogApi) -> Result<()> {
        // the home page never fails, unavailable counts are shown as 0
        let stats = CatalogStats::load_or_default(client).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("{}", render_stats(&stats));
        }
        Ok(())
    }
}
