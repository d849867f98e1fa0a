//! Fixed-size, 1-indexed pagination.

use serde::Serialize;

/// Number of items on every listing page.
pub const PAGE_SIZE: u64 = 10;

/// Highest page number accepted; larger requests are clamped to it.
pub const MAX_PAGE: u64 = u32::MAX as u64;

/// A requested page number, always in `1..=MAX_PAGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u64,
}

impl PageRequest {
    /// Page `number`, clamped into `1..=MAX_PAGE`.
    pub fn new(number: u64) -> Self {
        Self {
            number: number.clamp(1, MAX_PAGE),
        }
    }

    /// Parse the `page` query parameter. Missing or garbage values mean page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<u64>().ok())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn per_page(&self) -> u64 {
        PAGE_SIZE
    }

    /// Number of items before this page.
    pub fn offset(&self) -> u64 {
        (self.number - 1) * PAGE_SIZE
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { number: 1 }
    }
}

/// One page of results plus enough metadata to render page links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Build a page from its items and the total count of the full result.
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        let per_page = request.per_page();
        let total_pages = total_items.div_ceil(per_page).max(1);
        Self {
            items,
            number: request.number(),
            per_page,
            total_items,
            total_pages,
        }
    }

    /// Cut the requested page out of an already ordered, complete result.
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.per_page() as usize)
            .collect();
        Self::new(items, request, total)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Swap the items for another representation, keeping the metadata.
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            number: self.number,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
