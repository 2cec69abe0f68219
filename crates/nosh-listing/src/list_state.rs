//! List selection state kept in a URL query string.
//!
//! The query string is the only storage. Reading projects it into a
//! [`ListSelection`], correcting malformed `page`/`sort` values on the way;
//! writing runs a pure [`reduce`] over the parsed parameters and serializes
//! the result back, keeping any parameters this module does not own.

use derive_builder::Builder;

use crate::{filter::FilterOptions, sort::SortOption};

pub const SEARCH_QUERY_PARAM: &str = "q";
pub const PAGE_PARAM: &str = "page";
pub const SORT_PARAM: &str = "sort";
pub const OPEN_NOW_PARAM: &str = "openNow";
pub const IS_NEW_PARAM: &str = "isNew";
pub const FREE_DELIVERY_PARAM: &str = "freeDelivery";

const FIRST_PAGE: u64 = 1;

/// Ordered query parameters, with the same set/delete semantics as a
/// browser's `URLSearchParams`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => Self(pairs),
            Err(error) => {
                tracing::warn!(%error, query, "discarding unparseable query string");
                Self::default()
            }
        }
    }

    pub fn encode(&self) -> String {
        match serde_urlencoded::to_string(&self.0) {
            Ok(encoded) => encoded,
            Err(error) => {
                tracing::error!(%error, "failed to encode query parameters");
                String::new()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Replaces the first `key` in place and drops any repeats, or appends.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter().position(|(name, _)| name == key) {
            Some(index) => {
                self.0[index].1 = value;
                let mut seen = 0;
                self.0.retain(|(name, _)| {
                    if name != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn delete(&mut self, key: &str) {
        self.0.retain(|(name, _)| name != key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn set_flag(&mut self, key: &str, enabled: bool) {
        if enabled {
            self.set(key, "true");
        } else {
            self.delete(key);
        }
    }

    fn set_search_query(&mut self, query: &str) {
        if query.is_empty() {
            self.delete(SEARCH_QUERY_PARAM);
        } else {
            self.set(SEARCH_QUERY_PARAM, query);
        }
    }

    fn set_sort(&mut self, sort: SortOption) {
        if sort == SortOption::BestMatch {
            self.delete(SORT_PARAM);
        } else {
            self.set(SORT_PARAM, sort.token());
        }
    }

    fn reset_page(&mut self) {
        self.set(PAGE_PARAM, FIRST_PAGE.to_string());
    }
}

/// Typed view of the list selection. Built fresh on every read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListSelection {
    pub search_query: String,
    pub page: u64,
    pub sort: SortOption,
    pub open_now: bool,
    pub is_new: bool,
    pub free_delivery: bool,
}

impl Default for ListSelection {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            page: FIRST_PAGE,
            sort: SortOption::BestMatch,
            open_now: false,
            is_new: false,
            free_delivery: false,
        }
    }
}

impl ListSelection {
    /// Lenient projection; anything unrecognised reads as its default.
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            search_query: params
                .get(SEARCH_QUERY_PARAM)
                .unwrap_or_default()
                .to_string(),
            page: params
                .get(PAGE_PARAM)
                .and_then(parse_page)
                .unwrap_or(FIRST_PAGE),
            sort: params
                .get(SORT_PARAM)
                .map(SortOption::from_key)
                .unwrap_or_default(),
            open_now: params.get(OPEN_NOW_PARAM) == Some("true"),
            is_new: params.get(IS_NEW_PARAM) == Some("true"),
            free_delivery: params.get(FREE_DELIVERY_PARAM) == Some("true"),
        }
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            query: self.search_query.clone(),
            open_now: self.open_now,
            is_new: self.is_new,
            free_delivery: self.free_delivery,
        }
    }

    pub fn has_active_filters(&self) -> bool {
        self.filter_options().is_active()
    }
}

/// Accepts the same page values a JavaScript `Number()` check would treat as
/// a positive integer (`"3"`, `" 3 "`, `"3.0"`, `"1e2"`). Anything past
/// `u64::MAX` saturates, which is still beyond the last page.
fn parse_page(raw: &str) -> Option<u64> {
    let number: f64 = raw.trim().parse().ok()?;
    let whole = number.is_finite() && number.fract() == 0.0;
    (whole && number >= 1.0).then_some(number as u64)
}

/// Removes a malformed `page` or `sort`. Returns `None` when nothing changed,
/// so an already valid query string is never rewritten.
pub fn validate(params: &QueryParams) -> Option<QueryParams> {
    let bad_page = params
        .get(PAGE_PARAM)
        .is_some_and(|page| parse_page(page).is_none());
    let bad_sort = params
        .get(SORT_PARAM)
        .is_some_and(|sort| sort.parse::<SortOption>().is_err());
    if !bad_page && !bad_sort {
        return None;
    }

    let mut corrected = params.clone();
    if bad_page {
        corrected.delete(PAGE_PARAM);
    }
    if bad_sort {
        corrected.delete(SORT_PARAM);
    }
    Some(corrected)
}

/// Several fields written in one go. Unset fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
#[builder(default, setter(strip_option))]
pub struct ListPatch {
    #[builder(setter(into, strip_option))]
    pub search_query: Option<String>,
    pub page: Option<i64>,
    pub sort: Option<SortOption>,
    pub open_now: Option<bool>,
    pub is_new: Option<bool>,
    pub free_delivery: Option<bool>,
}

impl ListPatch {
    pub fn builder() -> ListPatchBuilder {
        ListPatchBuilder::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListAction {
    /// Also returns to page one and best match.
    SetSearchQuery(String),
    /// Written verbatim; a bad value is dropped on the next read.
    SetPage(i64),
    SetSort(SortOption),
    SetOpenNow(bool),
    SetIsNew(bool),
    SetFreeDelivery(bool),
    SetMultiple(ListPatch),
}

/// Applies `action` to a copy of `params`.
///
/// A [`ListAction::SetMultiple`] follows the single-field reset rules unless
/// the patch names the reset field itself: an explicit `page` wins over the
/// page reset, and an explicit `sort` wins over the sort reset that a new
/// search query would cause.
pub fn reduce(params: &QueryParams, action: ListAction) -> QueryParams {
    let mut next = params.clone();
    match action {
        ListAction::SetSearchQuery(query) => {
            next.set_search_query(&query);
            next.reset_page();
            next.delete(SORT_PARAM);
        }
        ListAction::SetPage(page) => next.set(PAGE_PARAM, page.to_string()),
        ListAction::SetSort(sort) => {
            next.set_sort(sort);
            next.reset_page();
        }
        ListAction::SetOpenNow(enabled) => {
            next.set_flag(OPEN_NOW_PARAM, enabled);
            next.reset_page();
        }
        ListAction::SetIsNew(enabled) => {
            next.set_flag(IS_NEW_PARAM, enabled);
            next.reset_page();
        }
        ListAction::SetFreeDelivery(enabled) => {
            next.set_flag(FREE_DELIVERY_PARAM, enabled);
            next.reset_page();
        }
        ListAction::SetMultiple(patch) => {
            let resets_page = patch.search_query.is_some()
                || patch.sort.is_some()
                || patch.open_now.is_some()
                || patch.is_new.is_some()
                || patch.free_delivery.is_some();

            if let Some(query) = &patch.search_query {
                next.set_search_query(query);
                if patch.sort.is_none() {
                    next.delete(SORT_PARAM);
                }
            }
            if let Some(sort) = patch.sort {
                next.set_sort(sort);
            }
            if let Some(enabled) = patch.open_now {
                next.set_flag(OPEN_NOW_PARAM, enabled);
            }
            if let Some(enabled) = patch.is_new {
                next.set_flag(IS_NEW_PARAM, enabled);
            }
            if let Some(enabled) = patch.free_delivery {
                next.set_flag(FREE_DELIVERY_PARAM, enabled);
            }
            match patch.page {
                Some(page) => next.set(PAGE_PARAM, page.to_string()),
                None if resets_page => next.reset_page(),
                None => {}
            }
        }
    }
    next
}

/// Wherever the query string lives: the address bar, a CLI argument, a test.
pub trait QueryLocation {
    fn query(&self) -> String;
    fn replace_query(&mut self, query: String);
}

/// A location held in memory that counts its rewrites.
#[derive(Clone, Debug, Default)]
pub struct MemoryLocation {
    query: String,
    writes: usize,
}

impl MemoryLocation {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            writes: 0,
        }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl QueryLocation for MemoryLocation {
    fn query(&self) -> String {
        self.query.clone()
    }

    fn replace_query(&mut self, query: String) {
        self.writes += 1;
        self.query = query;
    }
}

/// Reads and writes the list selection through a [`QueryLocation`].
#[derive(Debug)]
pub struct ListStateController<L> {
    location: L,
}

impl<L: QueryLocation> ListStateController<L> {
    pub fn new(location: L) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn into_location(self) -> L {
        self.location
    }

    /// Current selection. Malformed values are removed from the location
    /// before the selection is returned.
    pub fn selection(&mut self) -> ListSelection {
        let params = QueryParams::parse(&self.location.query());
        match validate(&params) {
            Some(corrected) => {
                tracing::debug!(
                    from = %params.encode(),
                    to = %corrected.encode(),
                    "correcting list selection"
                );
                self.location.replace_query(corrected.encode());
                ListSelection::from_params(&corrected)
            }
            None => ListSelection::from_params(&params),
        }
    }

    pub fn dispatch(&mut self, action: ListAction) -> ListSelection {
        let params = QueryParams::parse(&self.location.query());
        tracing::debug!(?action, "updating list selection");
        let next = reduce(&params, action);
        self.location.replace_query(next.encode());
        self.selection()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) -> ListSelection {
        self.dispatch(ListAction::SetSearchQuery(query.into()))
    }

    pub fn set_page(&mut self, page: i64) -> ListSelection {
        self.dispatch(ListAction::SetPage(page))
    }

    pub fn set_sort(&mut self, sort: SortOption) -> ListSelection {
        self.dispatch(ListAction::SetSort(sort))
    }

    pub fn set_open_now(&mut self, enabled: bool) -> ListSelection {
        self.dispatch(ListAction::SetOpenNow(enabled))
    }

    pub fn set_is_new(&mut self, enabled: bool) -> ListSelection {
        self.dispatch(ListAction::SetIsNew(enabled))
    }

    pub fn set_free_delivery(&mut self, enabled: bool) -> ListSelection {
        self.dispatch(ListAction::SetFreeDelivery(enabled))
    }

    pub fn set_multiple(&mut self, patch: ListPatch) -> ListSelection {
        self.dispatch(ListAction::SetMultiple(patch))
    }
}
