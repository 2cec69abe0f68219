use serde::{Serialize, Serializer};

use crate::{card::RestaurantCard, SharedRestaurant};

pub const DEFAULT_PER_PAGE: usize = 12;
pub const DEFAULT_MAX_VISIBLE_PAGES: u64 = 5;

/// One entry of the page picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMarker {
    Page(u64),
    Ellipsis,
}

impl Serialize for PageMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Page(page) => serializer.serialize_u64(*page),
            Self::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// A single page cut out of the processed list.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: usize,
    /// One-based index of the first item shown, zero when there is nothing.
    pub start: usize,
    pub end: usize,
    #[serde(skip)]
    pub restaurants: Vec<SharedRestaurant>,
}

impl Page {
    pub fn new(restaurants: &[SharedRestaurant], current_page: u64, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_count = restaurants.len();
        let total_pages = total_count.div_ceil(per_page) as u64;
        let offset = usize::try_from(current_page.max(1) - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(per_page);
        let end = offset.saturating_add(per_page).min(total_count);

        Self {
            current_page,
            total_pages,
            total_count,
            start: if total_count > 0 { offset.saturating_add(1) } else { 0 },
            end,
            restaurants: restaurants
                .get(offset..end)
                .map(<[SharedRestaurant]>::to_vec)
                .unwrap_or_default(),
        }
    }

    /// The selection points past the last page and should go back to page 1.
    pub fn is_out_of_range(&self) -> bool {
        self.total_pages > 0 && self.current_page > self.total_pages
    }

    /// `None` when there is nothing to show.
    pub fn range_label(&self) -> Option<String> {
        if self.total_count == 0 {
            return None;
        }
        let plural = if self.total_count == 1 { "" } else { "s" };
        Some(format!(
            "Showing {}-{} of {} restaurant{plural}",
            self.start, self.end, self.total_count
        ))
    }

    pub fn cards(&self) -> Vec<RestaurantCard> {
        self.restaurants
            .iter()
            .map(|restaurant| RestaurantCard::from(restaurant.as_ref()))
            .collect()
    }

    pub fn visible_pages(&self) -> Vec<PageMarker> {
        visible_pages(self.current_page, self.total_pages, DEFAULT_MAX_VISIBLE_PAGES)
    }
}

/// Page picker entries: every page when they fit, otherwise a window around
/// `current` with the first and last page pinned.
pub fn visible_pages(current: u64, total: u64, max_visible: u64) -> Vec<PageMarker> {
    if total <= 1 {
        return Vec::new();
    }
    let max_visible = max_visible.max(1);
    if total <= max_visible {
        return (1..=total).map(PageMarker::Page).collect();
    }

    let current = current.clamp(1, total);
    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = total.min(start.saturating_add(max_visible - 1));
    if end - start + 1 < max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }

    let mut pages = Vec::with_capacity(max_visible as usize + 4);
    if start > 1 {
        pages.push(PageMarker::Page(1));
        if start > 2 {
            pages.push(PageMarker::Ellipsis);
        }
    }
    pages.extend((start..=end).map(PageMarker::Page));
    if end < total {
        if end < total - 1 {
            pages.push(PageMarker::Ellipsis);
        }
        pages.push(PageMarker::Page(total));
    }
    pages
}
