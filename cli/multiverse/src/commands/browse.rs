//! Interactive listing: search as you type, switch pages with the arrow keys.
//!
//! Keystrokes, debounced searches and finished requests are all handled on
//! one task. Requests are never cancelled, the coordinator drops responses
//! to requests that were superseded while in flight.

use std::io::{Write, stdout};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use multiverse_catalog::query::{NAME_KEY, PAGE_KEY};
use multiverse_catalog::{
    CatalogApi,
    CatalogClientError,
    Characters,
    Episodes,
    Locations,
    Page,
    Resource,
};
use multiverse_views::{Debouncer, ListCoordinator, ListRequest, PageWindow, RequestId};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::utils::colors::stdout_supports_color;
use crate::utils::render::{RenderEntity, render_listing};

const HELP: &str = "type to search · ←/→ change page · Del clear filters · Esc quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Characters,
    Episodes,
    Locations,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrowseArgError {
    #[error("unknown collection '{0}', expected one of: characters, episodes, locations")]
    UnknownCollection(String),
    #[error("expected KEY=VALUE, got '{0}'")]
    InvalidFilter(String),
    #[error("'page' is not a filter, pages are changed with the arrow keys")]
    PageFilter,
}

impl FromStr for Collection {
    type Err = BrowseArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "characters" | "character" => Ok(Collection::Characters),
            "episodes" | "episode" => Ok(Collection::Episodes),
            "locations" | "location" => Ok(Collection::Locations),
            _ => Err(BrowseArgError::UnknownCollection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub key: String,
    pub value: String,
}

impl FromStr for FilterArg {
    type Err = BrowseArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((PAGE_KEY, _)) => Err(BrowseArgError::PageFilter),
            Some((key, value)) if !key.is_empty() => Ok(FilterArg {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(BrowseArgError::InvalidFilter(s.to_string())),
        }
    }
}

// Search a collection interactively
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {
    /// Filter to start with, e.g. 'status=dead'. May be given multiple times.
    #[bpaf(long("filter"), argument("KEY=VALUE"))]
    pub filters: Vec<FilterArg>,

    /// Collection to browse: characters, episodes or locations
    #[bpaf(positional("COLLECTION"))]
    pub collection: Collection,
}

impl Browse {
    #[instrument(name = "browse", skip_all, fields(collection = ?self.collection))]
    pub async fn handle(self, config: &Config, client: &impl CatalogApi) -> Result<()> {
        let debounce = config.search_debounce();
        match self.collection {
            Collection::Characters => browse::<Characters, _>(client, &self.filters, debounce).await,
            Collection::Episodes => browse::<Episodes, _>(client, &self.filters, debounce).await,
            Collection::Locations => browse::<Locations, _>(client, &self.filters, debounce).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyAction {
    Quit,
    /// The search text changed
    Search(String),
    GoToPage(u32),
    ClearFilters,
    Ignore,
}

/// Apply a key press to the search `input` and decide what to do next.
fn on_key(key: KeyEvent, input: &mut String, window: Option<&PageWindow>) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if control => KeyAction::Quit,
        KeyCode::Char(_) if control => KeyAction::Ignore,
        KeyCode::Char(c) => {
            input.push(c);
            KeyAction::Search(input.clone())
        },
        KeyCode::Backspace => match input.pop() {
            Some(_) => KeyAction::Search(input.clone()),
            None => KeyAction::Ignore,
        },
        KeyCode::Delete => {
            input.clear();
            KeyAction::ClearFilters
        },
        KeyCode::Left | KeyCode::PageUp => window
            .and_then(PageWindow::previous)
            .map_or(KeyAction::Ignore, KeyAction::GoToPage),
        KeyCode::Right | KeyCode::PageDown => window
            .and_then(PageWindow::next)
            .map_or(KeyAction::Ignore, KeyAction::GoToPage),
        KeyCode::Home => window
            .filter(|window| window.has_previous())
            .map_or(KeyAction::Ignore, |_| KeyAction::GoToPage(1)),
        KeyCode::End => window
            .filter(|window| window.has_next())
            .map_or(KeyAction::Ignore, |window| KeyAction::GoToPage(window.total)),
        _ => KeyAction::Ignore,
    }
}

type Completion<R> = (
    RequestId,
    Result<Page<<R as Resource>::Entity>, CatalogClientError>,
);

fn issue<'a, R, C>(client: &'a C, request: ListRequest) -> LocalBoxFuture<'a, Completion<R>>
where
    R: Resource,
    C: CatalogApi,
{
    async move {
        let result = request.query.fetch::<R, C>(client).await;
        (request.id, result)
    }
    .boxed_local()
}

fn browse_screen<R>(coordinator: &ListCoordinator<R>, input: &str, colored: bool) -> String
where
    R: Resource,
    R::Entity: RenderEntity,
{
    format!(
        "Search {}: {input}\n\n{}\n\n{HELP}",
        R::LABEL,
        render_listing(coordinator, colored)
    )
}

fn draw<R>(coordinator: &ListCoordinator<R>, input: &str, colored: bool) -> Result<()>
where
    R: Resource,
    R::Entity: RenderEntity,
{
    let mut out = stdout().lock();
    execute!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    // raw mode does not translate newlines
    write!(
        out,
        "{}",
        browse_screen(coordinator, input, colored).replace('\n', "\r\n")
    )?;
    out.flush()?;
    Ok(())
}

/// Raw mode on an alternate screen, restored when dropped.
struct RawTerminal;

impl RawTerminal {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("Could not enable raw terminal mode")?;
        execute!(stdout(), terminal::EnterAlternateScreen)?;
        Ok(RawTerminal)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(err) = execute!(stdout(), terminal::LeaveAlternateScreen) {
            debug!(%err, "could not leave alternate screen");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            debug!(%err, "could not disable raw terminal mode");
        }
    }
}

async fn browse<R, C>(client: &C, filters: &[FilterArg], debounce: Duration) -> Result<()>
where
    R: Resource,
    R::Entity: RenderEntity,
    C: CatalogApi,
{
    let mut coordinator = ListCoordinator::<R>::new();
    for filter in filters {
        coordinator.set_filter(&filter.key, &filter.value);
    }
    let mut input = coordinator
        .filters()
        .get(NAME_KEY)
        .unwrap_or_default()
        .to_string();

    let (mut debouncer, mut debounced) = Debouncer::new(debounce);
    let mut in_flight = FuturesUnordered::new();
    in_flight.push(issue::<R, C>(client, coordinator.begin()));

    let colored = stdout_supports_color();
    let _terminal = RawTerminal::enter()?;
    let mut events = EventStream::new();
    draw(&coordinator, &input, colored)?;

    loop {
        tokio::select! {
            Some((id, result)) = in_flight.next(), if !in_flight.is_empty() => {
                if coordinator.complete(id, result) {
                    draw(&coordinator, &input, colored)?;
                }
            },
            Some(text) = debounced.recv() => {
                debug!(%text, "search settled");
                if let Some(request) = coordinator.set_search(&text) {
                    in_flight.push(issue::<R, C>(client, request));
                    draw(&coordinator, &input, colored)?;
                }
            },
            event = events.next() => {
                let key = match event {
                    Some(Ok(Event::Key(key))) => key,
                    Some(Ok(Event::Resize(..))) => {
                        draw(&coordinator, &input, colored)?;
                        continue;
                    },
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Err(err).context("Could not read terminal input"),
                    None => return Ok(()),
                };

                let window = coordinator.page_window();
                let request = match on_key(key, &mut input, window.as_ref()) {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Search(text) => {
                        debouncer.schedule(text);
                        draw(&coordinator, &input, colored)?;
                        None
                    },
                    KeyAction::GoToPage(page) => coordinator.set_page(page),
                    KeyAction::ClearFilters => {
                        debouncer.cancel();
                        coordinator.clear_filters()
                    },
                    KeyAction::Ignore => None,
                };

                if let Some(request) = request {
                    in_flight.push(issue::<R, C>(client, request));
                    draw(&coordinator, &input, colored)?;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use multiverse_test_utils::fixtures;
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_updates_search() {
        let mut input = String::new();
        assert_eq!(
            on_key(press(KeyCode::Char('r')), &mut input, None),
            KeyAction::Search("r".to_string())
        );
        assert_eq!(
            on_key(press(KeyCode::Char('i')), &mut input, None),
            KeyAction::Search("ri".to_string())
        );
        assert_eq!(
            on_key(press(KeyCode::Backspace), &mut input, None),
            KeyAction::Search("r".to_string())
        );
        assert_eq!(input, "r");
    }

    #[test]
    fn backspace_on_empty_input_is_ignored() {
        let mut input = String::new();
        assert_eq!(
            on_key(press(KeyCode::Backspace), &mut input, None),
            KeyAction::Ignore
        );
    }

    #[test]
    fn arrows_follow_page_window() {
        let mut input = String::new();
        let first = PageWindow::new(1, 42);
        assert_eq!(
            on_key(press(KeyCode::Left), &mut input, Some(&first)),
            KeyAction::Ignore
        );
        assert_eq!(
            on_key(press(KeyCode::Right), &mut input, Some(&first)),
            KeyAction::GoToPage(2)
        );
        assert_eq!(
            on_key(press(KeyCode::End), &mut input, Some(&first)),
            KeyAction::GoToPage(42)
        );
        // no pagination while filtered
        assert_eq!(
            on_key(press(KeyCode::Right), &mut input, None),
            KeyAction::Ignore
        );
    }

    #[test]
    fn control_c_and_escape_quit() {
        let mut input = String::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(on_key(ctrl_c, &mut input, None), KeyAction::Quit);
        assert_eq!(on_key(press(KeyCode::Esc), &mut input, None), KeyAction::Quit);
        assert!(input.is_empty());
    }

    #[test]
    fn delete_clears_input_and_filters() {
        let mut input = "rick".to_string();
        assert_eq!(
            on_key(press(KeyCode::Delete), &mut input, None),
            KeyAction::ClearFilters
        );
        assert!(input.is_empty());
    }

    #[test]
    fn parses_collections_and_filters() {
        assert_eq!("Episodes".parse(), Ok(Collection::Episodes));
        assert_eq!(
            "aliens".parse::<Collection>(),
            Err(BrowseArgError::UnknownCollection("aliens".to_string()))
        );
        assert_eq!(
            "status=dead".parse(),
            Ok(FilterArg {
                key: "status".to_string(),
                value: "dead".to_string()
            })
        );
        assert_eq!("page=5".parse::<FilterArg>(), Err(BrowseArgError::PageFilter));
        assert!("=dead".parse::<FilterArg>().is_err());
        assert!("status".parse::<FilterArg>().is_err());
    }

    #[test]
    fn screen_shows_search_and_listing() {
        let mut coordinator = ListCoordinator::<Episodes>::new();
        let request = coordinator.set_search("pilot").unwrap();
        let page = serde_json::from_value(fixtures::page_json("episode", 1, 1, 1, vec![
            fixtures::episode_json(1, "Pilot", "S01E01", 19),
        ]))
        .unwrap();
        coordinator.complete(request.id, Ok(page));

        let screen = browse_screen(&coordinator, "pilot", false);
        assert!(screen.starts_with("Search episodes: pilot\n"));
        assert!(screen.contains("Filters: name: pilot"));
        assert!(screen.contains("S01E01 Pilot"));
        assert!(screen.ends_with(HELP));
    }
}
