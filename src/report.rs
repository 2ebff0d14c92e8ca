use std::fmt::Write;

use crate::dashboard::DashboardState;
use crate::feeds::DataOrigin;
use crate::model::{Keyword, Mention, Stats, TrendPoint};
use crate::table::{MentionsTable, Selection};

const TEXT_WIDTH: usize = 60;

/// First line of `text` wrapped at `width`, with an ellipsis when anything
/// was cut.
pub fn clip(text: &str, width: usize) -> String {
    let lines = textwrap::wrap(text, width.max(1));
    match lines.first() {
        None => String::new(),
        Some(first) if lines.len() == 1 => first.to_string(),
        Some(first) => format!("{}...", first.trim_end()),
    }
}

pub fn render_stats(output: &mut String, stats: &Stats) {
    let _ = writeln!(output, "## Sentiment");
    let _ = writeln!(output, "Total mentions: {}", stats.total_mentions);
    let _ = writeln!(
        output,
        "Positive: {} ({:.0}%)",
        stats.positive_count, stats.positive_percentage
    );
    let _ = writeln!(
        output,
        "Negative: {} ({:.0}%)",
        stats.negative_count, stats.negative_percentage
    );
    let _ = writeln!(
        output,
        "Neutral:  {} ({:.0}%)",
        stats.neutral_count, stats.neutral_percentage
    );
}

fn render_trends(output: &mut String, trends: &[TrendPoint]) {
    let _ = writeln!(output, "## Trend");
    if trends.is_empty() {
        let _ = writeln!(output, "No trend data available.");
        return;
    }
    let _ = writeln!(
        output,
        "{:<10}  {:>5}  {:>5}  {:>5}  {:>5}",
        "Date", "Total", "Pos", "Neg", "Neu"
    );
    for point in trends {
        let _ = writeln!(
            output,
            "{:<10}  {:>5}  {:>5}  {:>5}  {:>5}",
            point.date, point.count, point.positive, point.negative, point.neutral
        );
    }
}

fn render_alerts(output: &mut String, stats: &Stats) {
    let _ = writeln!(output, "## Recent alerts");
    if stats.recent_alerts.is_empty() {
        let _ = writeln!(output, "No recent alerts.");
    }
    for alert in &stats.recent_alerts {
        let _ = writeln!(
            output,
            "- [{}] {}",
            alert.created_at.format("%Y-%m-%d %H:%M"),
            alert.message
        );
    }
}

pub fn build_dashboard(state: &DashboardState) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Brand Mentions Dashboard");
    if state.origin == DataOrigin::Demo {
        let _ = writeln!(
            output,
            "Backend unavailable: showing generated sample data."
        );
    }
    let _ = writeln!(output);
    render_stats(&mut output, &state.stats);
    let _ = writeln!(output);
    render_trends(&mut output, &state.trends);
    let _ = writeln!(output);
    render_alerts(&mut output, &state.stats);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Latest mentions ({} of {})",
        state.mentions.data.len(),
        state.mentions.pagination.total
    );
    render_mention_rows(&mut output, &state.mentions.data, &Selection::default());
    output
}

/// A one-line summary for each background stats refresh.
pub fn stats_line(stats: &Stats) -> String {
    format!(
        "total={} positive={} ({:.0}%) negative={} ({:.0}%) neutral={} ({:.0}%)",
        stats.total_mentions,
        stats.positive_count,
        stats.positive_percentage,
        stats.negative_count,
        stats.negative_percentage,
        stats.neutral_count,
        stats.neutral_percentage
    )
}

pub fn render_mention_rows(output: &mut String, rows: &[Mention], selection: &Selection) {
    if rows.is_empty() {
        let _ = writeln!(output, "No mentions found.");
        return;
    }
    let _ = writeln!(
        output,
        "    {:>5}  {:<24}  {:<6}  {:<8}  {:>6}  Text",
        "ID", "Created At", "Source", "Label", "Score"
    );
    for mention in rows {
        let mark = if selection.contains(mention.id) { "[x]" } else { "[ ]" };
        let _ = writeln!(
            output,
            "{} {:>5}  {:<24}  {:<6}  {:<8}  {:>6.2}  {}",
            mark,
            mention.id,
            mention.created_at_iso(),
            mention.platform.as_str(),
            mention.sentiment.as_str(),
            mention.score(),
            clip(&mention.text, TEXT_WIDTH)
        );
    }
}

pub fn build_mentions_table(table: &MentionsTable) -> String {
    let mut output = String::new();
    if let Some(error) = table.error() {
        let _ = writeln!(output, "Error: {}", error);
        return output;
    }

    let config = table.config();
    let filtered = table.filtered().len();
    let _ = writeln!(
        output,
        "Sorted by {} {} | {} matching | page {} of {} | {} selected",
        config.sort_field.api_name(),
        config.sort_order.as_str(),
        filtered,
        if filtered == 0 { 0 } else { config.page_index + 1 },
        table.page_count(),
        table.selection().len()
    );
    render_mention_rows(&mut output, &table.visible(), table.selection());
    output
}

pub fn build_keywords(keywords: &[Keyword]) -> String {
    let mut output = String::new();
    if keywords.is_empty() {
        let _ = writeln!(output, "No keywords tracked.");
        return output;
    }
    let _ = writeln!(
        output,
        "{:>5}  {:<24}  {:<8}  {:<8}  {:<6}  Added",
        "ID", "Keyword", "Platform", "Label", "Active"
    );
    for keyword in keywords {
        let _ = writeln!(
            output,
            "{:>5}  {:<24}  {:<8}  {:<8}  {:<6}  {}",
            keyword.id,
            clip(&keyword.keyword, 24),
            keyword.platform,
            keyword.sentiment.as_str(),
            if keyword.is_active { "yes" } else { "no" },
            keyword.created_at.format("%Y-%m-%d")
        );
    }
    output
}
