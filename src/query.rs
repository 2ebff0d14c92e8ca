//! Client-side filtering, sorting and paging over already-fetched lists.
//!
//! Every function here is pure: the same input and configuration always give
//! the same output, regardless of whether the list came from the backend or
//! from the mock store.

use crate::model::{Keyword, Mention, Sentiment, UnknownVariant};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortField {
    #[default]
    CreatedAt,
    Sentiment,
    Platform,
    Score,
}

impl SortField {
    /// Name used by the `/mentions/search` endpoint.
    pub fn api_name(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Sentiment => "sentiment",
            SortField::Platform => "platform",
            SortField::Score => "sentiment_score",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Applies the direction to an ascending comparison. Equal stays equal,
    /// so a stable sort keeps ties in input order either way.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentFilter {
    #[default]
    All,
    Only(Sentiment),
}

impl SentimentFilter {
    pub fn matches(&self, sentiment: Sentiment) -> bool {
        match self {
            SentimentFilter::All => true,
            SentimentFilter::Only(wanted) => *wanted == sentiment,
        }
    }

    pub fn as_option(&self) -> Option<Sentiment> {
        match self {
            SentimentFilter::All => None,
            SentimentFilter::Only(s) => Some(*s),
        }
    }
}

impl fmt::Display for SentimentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentFilter::All => f.write_str("all"),
            SentimentFilter::Only(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for SentimentFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(SentimentFilter::All)
        } else {
            s.parse().map(SentimentFilter::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub text_query: Option<String>,
    pub sentiment: SentimentFilter,
    /// Day prefix (`YYYY-MM-DD`) matched against the timestamp as received.
    pub date_filter: Option<String>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page_size: usize,
    pub page_index: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            text_query: None,
            sentiment: SentimentFilter::All,
            date_filter: None,
            sort_field: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
            page_size: 20,
            page_index: 0,
        }
    }
}

impl ViewConfig {
    /// Header-click behaviour: the active column flips direction, a new
    /// column starts descending.
    pub fn sort_by(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_order = self.sort_order.toggled();
        } else {
            self.sort_field = field;
            self.sort_order = SortOrder::Desc;
        }
    }
}

pub fn matches_text(mention: &Mention, query: Option<&str>) -> bool {
    match query {
        None | Some("") => true,
        Some(q) => mention.text.to_lowercase().contains(&q.to_lowercase()),
    }
}

pub fn matches_date(mention: &Mention, prefix: Option<&str>) -> bool {
    match prefix {
        None | Some("") => true,
        Some(p) => mention.created_at_literal().starts_with(p),
    }
}

/// Ascending comparison on a single column.
pub fn compare(a: &Mention, b: &Mention, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Sentiment => a.sentiment.as_str().cmp(b.sentiment.as_str()),
        SortField::Platform => a.platform.as_str().cmp(b.platform.as_str()),
        SortField::Score => a.score().total_cmp(&b.score()),
    }
}

/// Filters then sorts, in that order. Pagination is left to the caller so
/// that counts reflect the whole filtered set.
pub fn filter_and_sort(mentions: &[Mention], config: &ViewConfig) -> Vec<Mention> {
    let mut rows: Vec<Mention> = mentions
        .iter()
        .filter(|m| matches_text(m, config.text_query.as_deref()))
        .filter(|m| config.sentiment.matches(m.sentiment))
        .filter(|m| matches_date(m, config.date_filter.as_deref()))
        .cloned()
        .collect();

    rows.sort_by(|a, b| config.sort_order.apply(compare(a, b, config.sort_field)));
    rows
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

/// The `page_index`-th window of `page_size` items. Out-of-range pages are
/// empty.
pub fn page<T>(items: &[T], page_size: usize, page_index: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page_index.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum KeywordSort {
    Name,
    #[default]
    Date,
}

pub fn filter_keywords(
    keywords: &[Keyword],
    search: &str,
    sort: KeywordSort,
    order: SortOrder,
) -> Vec<Keyword> {
    let needle = search.to_lowercase();
    let mut rows: Vec<Keyword> = keywords
        .iter()
        .filter(|k| !k.keyword.is_empty() && k.keyword.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        let ordering = match sort {
            KeywordSort::Name => a.keyword.cmp(&b.keyword),
            KeywordSort::Date => a.created_at.cmp(&b.created_at),
        };
        order.apply(ordering)
    });
    rows
}
