//! State of a listing page (characters, episodes or locations).
//!
//! A [ListCoordinator] records what the user asked for (page, filters),
//! what was last loaded, and whether a load is in flight or failed.
//! Every change of intent produces a [ListRequest] that the caller issues
//! and hands back through [ListCoordinator::complete].
//!
//! Requests are never cancelled.
//! Instead each request carries an id and only the response to the
//! most recently issued request is allowed to update the page,
//! so a slow response for an old search cannot overwrite a newer one.

use multiverse_catalog::query::{NAME_KEY, PAGE_KEY};
use multiverse_catalog::{CatalogApi, CatalogClientError, FieldMap, Page, PageInfo, Resource};
use tracing::debug;

use crate::pagination::PageWindow;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Ready,
    /// Loading failed, carries the message to show instead of the results
    Failed(String),
}

/// Which endpoint a [ListRequest] has to call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    /// No filter is active: plain paginated listing.
    Plain { page: u32 },
    /// At least one filter is active: filter endpoint with all active fields and the page.
    Filtered(FieldMap),
}

impl ListQuery {
    pub async fn fetch<R: Resource, C: CatalogApi>(
        &self,
        client: &C,
    ) -> Result<Page<R::Entity>, CatalogClientError> {
        match self {
            ListQuery::Plain { page } => client.list_page::<R>(*page).await,
            ListQuery::Filtered(fields) => client.filter_by_fields::<R>(fields).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub id: RequestId,
    pub query: ListQuery,
}

/// Message shown when a listing fails to load.
pub fn failure_message<R: Resource>() -> String {
    format!("Failed to load {}. Please try again later.", R::LABEL)
}

#[derive(Debug)]
pub struct ListCoordinator<R: Resource> {
    page: u32,
    filters: FieldMap,
    results: Vec<R::Entity>,
    page_meta: Option<PageInfo>,
    status: ListStatus,
    latest_request: RequestId,
}

impl<R: Resource> Default for ListCoordinator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ListCoordinator<R> {
    /// A fresh page: page 1, no filters, nothing loaded yet.
    pub fn new() -> Self {
        Self {
            page: 1,
            filters: FieldMap::new(),
            results: Vec::new(),
            page_meta: None,
            status: ListStatus::Loading,
            latest_request: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn filters(&self) -> &FieldMap {
        &self.filters
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    /// Results of the last successful load, even if a later load failed.
    ///
    /// Views should use [Self::visible_results] instead.
    pub fn results(&self) -> &[R::Entity] {
        &self.results
    }

    pub fn page_meta(&self) -> Option<&PageInfo> {
        self.page_meta.as_ref()
    }

    /// Results to display, `None` while loading or after a failure.
    pub fn visible_results(&self) -> Option<&[R::Entity]> {
        match self.status {
            ListStatus::Ready => Some(&self.results),
            ListStatus::Loading | ListStatus::Failed(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ListStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Active filters in the order they were first set, e.g. for rendering chips.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.active()
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.has_filters()
    }

    /// Go to `page`, pages below 1 are treated as 1.
    ///
    /// Returns the request to issue, or `None` if nothing changed.
    pub fn set_page(&mut self, page: u32) -> Option<ListRequest> {
        let page = page.max(1);
        if page == self.page {
            return None;
        }
        self.page = page;
        Some(self.begin())
    }

    /// Set filter `key` to `value`, an empty value clears the filter.
    ///
    /// Any change resets the page to 1.
    /// Returns the request to issue, or `None` if nothing changed.
    pub fn set_filter(&mut self, key: &str, value: &str) -> Option<ListRequest> {
        if self.filters.get(key).unwrap_or_default() == value {
            return None;
        }
        self.filters.set(key, value);
        self.page = 1;
        Some(self.begin())
    }

    /// Set the name search, see [Self::set_filter].
    pub fn set_search(&mut self, text: &str) -> Option<ListRequest> {
        self.set_filter(NAME_KEY, text)
    }

    /// Remove all filters and go back to page 1.
    pub fn clear_filters(&mut self) -> Option<ListRequest> {
        if self.filters.is_blank() && self.page == 1 {
            return None;
        }
        self.filters = FieldMap::new();
        self.page = 1;
        Some(self.begin())
    }

    /// Start loading the current page with the current filters.
    ///
    /// Marks the page as loading and supersedes every request issued before.
    pub fn begin(&mut self) -> ListRequest {
        self.status = ListStatus::Loading;
        self.latest_request += 1;

        let query = if self.filters.has_filters() {
            ListQuery::Filtered(self.filters.clone().with(PAGE_KEY, self.page.to_string()))
        } else {
            ListQuery::Plain { page: self.page }
        };

        debug!(
            resource = R::PATH,
            request = self.latest_request,
            ?query,
            "starting list request"
        );

        ListRequest {
            id: self.latest_request,
            query,
        }
    }

    /// Apply the response to request `id`.
    ///
    /// Responses to superseded requests are dropped and `false` is returned.
    /// A failure keeps the previously loaded results but marks the page failed.
    pub fn complete(
        &mut self,
        id: RequestId,
        result: Result<Page<R::Entity>, CatalogClientError>,
    ) -> bool {
        if id != self.latest_request {
            debug!(
                resource = R::PATH,
                request = id,
                latest = self.latest_request,
                "dropping response to superseded request"
            );
            return false;
        }

        match result {
            Ok(page) => {
                self.results = page.results;
                self.page_meta = Some(page.info);
                self.status = ListStatus::Ready;
            },
            Err(err) => {
                debug!(resource = R::PATH, request = id, error = %err, "list request failed");
                self.status = ListStatus::Failed(failure_message::<R>());
            },
        }
        true
    }

    /// Issue a request for the current state and apply its response.
    pub async fn refresh<C: CatalogApi>(&mut self, client: &C) -> &ListStatus {
        let request = self.begin();
        let result = request.query.fetch::<R, C>(client).await;
        self.complete(request.id, result);
        &self.status
    }

    /// Whether to show the pagination control.
    ///
    /// Filtered listings only ever show their first page.
    pub fn show_pagination(&self) -> bool {
        self.status == ListStatus::Ready && self.page_meta.is_some() && !self.has_active_filters()
    }

    pub fn page_window(&self) -> Option<PageWindow> {
        if !self.show_pagination() {
            return None;
        }
        self.page_meta
            .as_ref()
            .map(|info| PageWindow::new(self.page, info.pages))
    }

    /// "Showing 20 of 826 characters"
    pub fn summary(&self) -> Option<String> {
        let results = self.visible_results()?;
        let info = self.page_meta.as_ref()?;
        Some(format!(
            "Showing {} of {} {}",
            results.len(),
            info.count,
            R::LABEL
        ))
    }

    /// Message for a loaded but empty listing.
    pub fn empty_message(&self) -> Option<String> {
        match self.visible_results() {
            Some([]) if self.has_active_filters() => {
                Some(format!("No {} found matching your criteria.", R::LABEL))
            },
            Some([]) => Some(format!("No {} found.", R::LABEL)),
            _ => None,
        }
    }
}
