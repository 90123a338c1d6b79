//! Shared implementation of the listing and detail commands.

use anyhow::{Result, anyhow, bail};
use multiverse_catalog::{CatalogApi, FieldMap, PageInfo, Resource};
use multiverse_views::{Detail, DetailError, ListCoordinator};
use serde::Serialize;
use tracing::debug;

use crate::utils::colors::stdout_supports_color;
use crate::utils::errors::display_chain;
use crate::utils::render::{RenderEntity, render_detail, render_listing};

#[derive(Debug, Serialize)]
struct ListingJson<'a, T> {
    page: u32,
    filters: &'a FieldMap,
    info: Option<&'a PageInfo>,
    results: &'a [T],
}

/// Load page `page` of `R` with `filters` applied into a fresh coordinator.
///
/// Filtered listings have a single page, `page` only applies without filters.
pub(crate) async fn load_listing<R, C>(
    client: &C,
    filters: &FieldMap,
    page: u32,
) -> ListCoordinator<R>
where
    R: Resource,
    C: CatalogApi,
{
    let mut coordinator = ListCoordinator::<R>::new();
    if filters.has_filters() {
        for (key, value) in filters.active() {
            coordinator.set_filter(key, value);
        }
    } else {
        coordinator.set_page(page);
    }
    coordinator.refresh(client).await;
    coordinator
}

/// Print a listing page, or its failure message as an error.
pub(crate) async fn show_listing<R, C>(
    client: &C,
    filters: &FieldMap,
    page: u32,
    json: bool,
) -> Result<()>
where
    R: Resource,
    R::Entity: RenderEntity,
    C: CatalogApi,
{
    if filters.has_filters() && page != 1 {
        bail!(
            "'--page' cannot be combined with filters, filtered {} have a single page",
            R::LABEL
        );
    }
    let coordinator = load_listing::<R, C>(client, filters, page).await;

    if let Some(message) = coordinator.error_message() {
        bail!("{message}");
    }

    if json {
        let listing = ListingJson {
            page: coordinator.page(),
            filters: coordinator.filters(),
            info: coordinator.page_meta(),
            results: coordinator.results(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("{}", render_listing(&coordinator, stdout_supports_color()));
    }
    Ok(())
}

/// The failure message of a detail page, the cause is only logged.
pub(crate) fn detail_failure(err: DetailError) -> anyhow::Error {
    debug!(cause = %display_chain(&err), "detail page failed");
    anyhow!("{err}")
}

/// Print a detail page.
pub(crate) fn show_detail<E, T>(detail: &Detail<E, T>, related_heading: &str, json: bool) -> Result<()>
where
    E: RenderEntity + Serialize,
    T: RenderEntity + Serialize,
{
    debug!(
        related = detail.related.items.len(),
        total = detail.related.total,
        "showing detail page"
    );
    if json {
        println!("{}", serde_json::to_string_pretty(detail)?);
    } else {
        println!(
            "{}",
            render_detail(detail, related_heading, stdout_supports_color())
        );
    }
    Ok(())
}
