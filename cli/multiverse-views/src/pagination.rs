//! Page number window of the pagination control.

use std::fmt;

/// Maximum number of consecutive page numbers shown around the current page.
pub const MAX_PAGES_SHOWN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(u32),
    Ellipsis,
}

impl fmt::Display for PageLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageLink::Page(page) => write!(f, "{page}"),
            PageLink::Ellipsis => write!(f, "..."),
        }
    }
}

/// Page links to offer for `current` out of `total` pages.
///
/// At most [MAX_PAGES_SHOWN] consecutive pages are listed, centred on the
/// current page where possible. The first and last page are always
/// reachable, separated from the window by an ellipsis if there is a gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub current: u32,
    pub total: u32,
    pub links: Vec<PageLink>,
}

impl PageWindow {
    pub fn new(current: u32, total: u32) -> Self {
        let half = MAX_PAGES_SHOWN / 2;
        let mut start = current.saturating_sub(half).max(1);
        let end = total.min(start + MAX_PAGES_SHOWN - 1);

        // near the end the window would be short, shift it back
        if end.saturating_sub(start) < MAX_PAGES_SHOWN - 1 {
            start = end.saturating_sub(MAX_PAGES_SHOWN - 1).max(1);
        }

        let mut links = Vec::new();
        if start > 1 {
            links.push(PageLink::Page(1));
            if start > 2 {
                links.push(PageLink::Ellipsis);
            }
        }
        links.extend((start..=end).map(PageLink::Page));
        if end < total {
            if end + 1 < total {
                links.push(PageLink::Ellipsis);
            }
            links.push(PageLink::Page(total));
        }

        Self {
            current,
            total,
            links,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total
    }

    pub fn previous(&self) -> Option<u32> {
        self.has_previous().then(|| self.current - 1)
    }

    pub fn next(&self) -> Option<u32> {
        self.has_next().then(|| self.current + 1)
    }
}

impl fmt::Display for PageWindow {
    /// `< 1 ... 4 5 [6] 7 8 ... 42 >`, unavailable directions are left out
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.links.len() + 2);
        if self.has_previous() {
            parts.push("<".to_string());
        }
        for link in &self.links {
            match link {
                PageLink::Page(page) if *page == self.current => parts.push(format!("[{page}]")),
                link => parts.push(link.to_string()),
            }
        }
        if self.has_next() {
            parts.push(">".to_string());
        }
        write!(f, "{}", parts.join(" "))
    }
}
