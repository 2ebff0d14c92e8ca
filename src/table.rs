use crate::feeds::FeedData;
use crate::model::{Mention, Page, Pagination};
use crate::query::{self, SentimentFilter, SortField, ViewConfig};
use std::collections::BTreeSet;

/// Ids of the rows picked for export.
///
/// Kept apart from the filters: narrowing the view does not drop ids that
/// fall out of it, so a user can filter, pick, filter again and pick more.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    /// Flips one row. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<i64> for Selection {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// State behind the mentions table: the fetched rows, the view settings and
/// the export selection.
pub struct MentionsTable {
    mentions: Vec<Mention>,
    config: ViewConfig,
    selection: Selection,
    loading: bool,
    error: Option<String>,
}

impl MentionsTable {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            mentions: Vec::new(),
            config,
            selection: Selection::default(),
            loading: true,
            error: None,
        }
    }

    pub fn update_data(&mut self, data: FeedData) {
        self.loading = false;
        match data {
            FeedData::Mentions(page) => {
                self.mentions = page.data;
                self.error = None;
            }
            FeedData::Error(e) => {
                self.error = Some(e);
            }
            FeedData::Loading => {
                self.loading = true;
            }
            _ => {}
        }
    }

    pub fn set_mentions(&mut self, mentions: Vec<Mention>) {
        let total = mentions.len() as u64;
        self.update_data(FeedData::Mentions(Page {
            data: mentions,
            pagination: Pagination::new(total, total, 0),
        }));
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_text_query(&mut self, query: Option<String>) {
        self.config.text_query = query;
        self.config.page_index = 0;
    }

    pub fn set_sentiment(&mut self, filter: SentimentFilter) {
        self.config.sentiment = filter;
        self.config.page_index = 0;
    }

    pub fn set_date_filter(&mut self, prefix: Option<String>) {
        self.config.date_filter = prefix;
        self.config.page_index = 0;
    }

    pub fn sort_by(&mut self, field: SortField) {
        self.config.sort_by(field);
    }

    /// Every row passing the filters, in display order.
    pub fn filtered(&self) -> Vec<Mention> {
        query::filter_and_sort(&self.mentions, &self.config)
    }

    /// The current page of [`Self::filtered`].
    pub fn visible(&self) -> Vec<Mention> {
        let rows = self.filtered();
        query::page(&rows, self.config.page_size, self.config.page_index).to_vec()
    }

    pub fn page_count(&self) -> usize {
        query::page_count(self.filtered().len(), self.config.page_size)
    }

    pub fn go_to_page(&mut self, index: usize) {
        let last = self.page_count().saturating_sub(1);
        self.config.page_index = index.min(last);
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.config.page_index + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.config.page_index.saturating_sub(1));
    }

    pub fn toggle_row(&mut self, id: i64) -> bool {
        self.selection.toggle(id)
    }

    /// Clears the selection when every filtered row is already picked,
    /// otherwise picks all filtered rows.
    pub fn toggle_all(&mut self) {
        let filtered = self.filtered();
        if filtered.is_empty() || filtered.iter().all(|m| self.selection.contains(m.id)) {
            self.selection.clear();
        } else {
            self.selection = filtered.iter().map(|m| m.id).collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Rows for CSV export: the selected rows among the filtered set, or the
    /// whole filtered set when nothing is selected.
    pub fn export_rows(&self) -> Vec<Mention> {
        let filtered = self.filtered();
        if self.selection.is_empty() {
            filtered
        } else {
            filtered
                .into_iter()
                .filter(|m| self.selection.contains(m.id))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Platform, Sentiment};
    use chrono::{Duration, TimeZone, Utc};

    fn mentions() -> Vec<Mention> {
        let base = Utc.with_ymd_and_hms(2024, 6, 7, 12, 0, 0).unwrap();
        (0..45)
            .map(|id| Mention {
                id,
                text: if id % 5 == 0 {
                    format!("Support ticket {id}")
                } else {
                    format!("Product review {id}")
                },
                platform: Platform::Reddit,
                url: format!("https://example.com/mention/{id}"),
                sentiment: Sentiment::ALL[(id % 3) as usize],
                sentiment_score: Some(0.0),
                created_at: base - Duration::hours(id),
                created_at_raw: None,
            })
            .collect()
    }

    fn table() -> MentionsTable {
        let mut table = MentionsTable::new(ViewConfig::default());
        table.set_mentions(mentions());
        table
    }

    #[test]
    fn test_update_data_tracks_loading_and_errors() {
        let mut table = MentionsTable::new(ViewConfig::default());
        assert!(table.is_loading());
        table.update_data(FeedData::Error("API error: 500".to_string()));
        assert!(!table.is_loading());
        assert_eq!(table.error(), Some("API error: 500"));
        table.set_mentions(mentions());
        assert_eq!(table.error(), None);
        assert_eq!(table.filtered().len(), 45);
    }

    #[test]
    fn test_paging_is_clamped() {
        let mut table = table();
        assert_eq!(table.page_count(), 3);
        assert_eq!(table.visible().len(), 20);
        table.next_page();
        table.next_page();
        table.next_page();
        assert_eq!(table.config().page_index, 2);
        assert_eq!(table.visible().len(), 5);
        table.prev_page();
        assert_eq!(table.config().page_index, 1);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut table = table();
        table.go_to_page(2);
        table.set_text_query(Some("support".to_string()));
        assert_eq!(table.config().page_index, 0);
        assert_eq!(table.filtered().len(), 9);
    }

    #[test]
    fn test_selection_survives_refiltering() {
        let mut table = table();
        table.set_sentiment(SentimentFilter::Only(Sentiment::Positive));
        assert!(table.toggle_row(0));
        table.set_sentiment(SentimentFilter::Only(Sentiment::Negative));
        assert!(table.toggle_row(1));

        assert!(table.selection().contains(0));
        assert_eq!(table.selection().len(), 2);
        // Only the negative row is in view, so only it is exported.
        let exported: Vec<i64> = table.export_rows().iter().map(|m| m.id).collect();
        assert_eq!(exported, vec![1]);
    }

    #[test]
    fn test_export_without_selection_takes_all_filtered_pages() {
        let mut table = table();
        table.set_text_query(Some("review".to_string()));
        assert_eq!(table.export_rows().len(), 36);
    }

    #[test]
    fn test_toggle_all_selects_then_clears() {
        let mut table = table();
        table.set_text_query(Some("support".to_string()));
        table.toggle_all();
        assert_eq!(table.selection().len(), 9);
        table.toggle_all();
        assert!(table.selection().is_empty());
    }

    #[test]
    fn test_toggle_row_twice_deselects() {
        let mut selection = Selection::default();
        assert!(selection.toggle(4));
        assert!(!selection.toggle(4));
        assert!(selection.is_empty());
    }
}
