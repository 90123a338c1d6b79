//! Plain text pages.

use chrono::{DateTime, Utc};
use indoc::formatdoc;
use itertools::Itertools;
use multiverse_catalog::{Character, Episode, Location, Resource};
use multiverse_views::{CatalogStats, Detail, ListCoordinator, ListStatus};

use crate::utils::colors::paint_status;

/// "Nov 4, 2017"
pub fn display_date(created: &DateTime<Utc>) -> String {
    created.format("%b %-d, %Y").to_string()
}

pub trait RenderEntity {
    /// One line of a listing
    fn list_line(&self, colored: bool) -> String;

    /// Heading of the detail page
    fn title(&self) -> String;

    /// Labelled fields of the detail page
    fn fields(&self, colored: bool) -> Vec<(&'static str, String)>;
}

impl RenderEntity for Character {
    fn list_line(&self, colored: bool) -> String {
        format!(
            "#{:<4} {} ({} - {}) last seen at {}",
            self.id,
            self.name,
            paint_status(self.status, colored),
            self.species,
            self.location.name
        )
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn fields(&self, colored: bool) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Status", paint_status(self.status, colored)),
            ("Species", self.species.clone()),
        ];
        if let Some(subtype) = self.subtype() {
            fields.push(("Type", subtype.to_string()));
        }
        fields.extend([
            ("Gender", self.gender.to_string()),
            ("Origin", self.origin.name.clone()),
            ("Last known location", self.location.name.clone()),
            ("Episodes", self.episode.len().to_string()),
            ("Created", display_date(&self.created)),
        ]);
        fields
    }
}

impl RenderEntity for Episode {
    fn list_line(&self, _colored: bool) -> String {
        format!(
            "#{:<4} {} {} (aired {})",
            self.id, self.episode, self.name, self.air_date
        )
    }

    fn title(&self) -> String {
        format!("{} - {}", self.episode, self.name)
    }

    fn fields(&self, _colored: bool) -> Vec<(&'static str, String)> {
        vec![
            ("Episode", self.episode.describe()),
            ("Air date", self.air_date.clone()),
            ("Characters", self.characters.len().to_string()),
            ("Created", display_date(&self.created)),
        ]
    }
}

impl RenderEntity for Location {
    fn list_line(&self, _colored: bool) -> String {
        format!(
            "#{:<4} {} ({}, {})",
            self.id, self.name, self.kind, self.dimension
        )
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn fields(&self, _colored: bool) -> Vec<(&'static str, String)> {
        vec![
            ("Type", self.kind.clone()),
            ("Dimension", self.dimension.clone()),
            ("Residents", self.residents.len().to_string()),
            ("Created", display_date(&self.created)),
        ]
    }
}

/// Listing page for the current state of `coordinator`.
pub fn render_listing<R>(coordinator: &ListCoordinator<R>, colored: bool) -> String
where
    R: Resource,
    R::Entity: RenderEntity,
{
    let mut lines = Vec::new();

    if coordinator.has_active_filters() {
        let chips = coordinator
            .active_filters()
            .map(|(key, value)| format!("{key}: {value}"))
            .join(", ");
        lines.push(format!("Filters: {chips}"));
        lines.push(String::new());
    }

    match coordinator.status() {
        ListStatus::Loading => lines.push(format!("Loading {}...", R::LABEL)),
        ListStatus::Failed(message) => lines.push(message.clone()),
        ListStatus::Ready => {
            if let Some(message) = coordinator.empty_message() {
                lines.push(message);
            }
            lines.extend(
                coordinator
                    .results()
                    .iter()
                    .map(|entity| entity.list_line(colored)),
            );
            if let Some(summary) = coordinator.summary() {
                lines.push(String::new());
                lines.push(summary);
            }
            if let Some(window) = coordinator.page_window() {
                lines.push(window.to_string());
            }
        },
    }

    lines.join("\n")
}

/// Detail page of an entity and the entities it references.
pub fn render_detail<E, T>(detail: &Detail<E, T>, related_heading: &str, colored: bool) -> String
where
    E: RenderEntity,
    T: RenderEntity,
{
    let fields = detail.entity.fields(colored);
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut lines = vec![detail.entity.title(), String::new()];
    lines.extend(
        fields
            .iter()
            .map(|(label, value)| format!("{:<width$}  {value}", format!("{label}:"), width = width + 1)),
    );

    lines.push(String::new());
    lines.push(format!("{related_heading}:"));
    if detail.related.items.is_empty() {
        lines.push("  none".to_string());
    }
    lines.extend(
        detail
            .related
            .items
            .iter()
            .map(|entity| format!("  {}", entity.list_line(colored))),
    );
    if let Some(notice) = detail.related.truncation_notice() {
        lines.push(format!("  {notice}"));
    }

    lines.join("\n")
}

pub fn render_stats(stats: &CatalogStats) -> String {
    formatdoc! {"
        Explore the multiverse

        Characters: {characters}
        Episodes:   {episodes}
        Locations:  {locations}

        Use 'multiverse characters', 'multiverse episodes' or 'multiverse locations' to browse.",
        characters = stats.characters,
        episodes = stats.episodes,
        locations = stats.locations,
    }
}
