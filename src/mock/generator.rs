use super::corpus;
use super::Dataset;
use crate::model::{Alert, Mention, Platform, Sentiment, TrendPoint};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Mentions fall somewhere in the trailing week, at whole-hour offsets.
pub const MENTION_WINDOW_HOURS: i64 = 168;
pub const MOCK_MENTION_COUNT: usize = 50;
pub const TREND_DAYS: i64 = 7;

const POSITIVE_SHARE: f64 = 0.58;
const NEGATIVE_SHARE: f64 = 0.23;

pub fn generate_mention<R: Rng + ?Sized>(rng: &mut R, id: i64, now: DateTime<Utc>) -> Mention {
    let sentiment = Sentiment::ALL[rng.gen_range(0..Sentiment::ALL.len())];
    let text = corpus::samples_for(sentiment)
        .choose(rng)
        .copied()
        .unwrap_or_default();
    let platform = Platform::ALL[rng.gen_range(0..Platform::ALL.len())];
    let hours_ago = rng.gen_range(0..MENTION_WINDOW_HOURS);

    Mention {
        id,
        text: text.to_string(),
        platform,
        url: format!("https://example.com/mention/{}", id),
        sentiment,
        // Independent of the sentiment label.
        sentiment_score: Some(rng.gen_range(-1.0..1.0)),
        created_at: now - Duration::hours(hours_ago),
        created_at_raw: None,
    }
}

/// Seven daily buckets ending at `today`, oldest first.
pub fn generate_trends<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Vec<TrendPoint> {
    (0..TREND_DAYS)
        .rev()
        .map(|days_ago| {
            let count: u32 = rng.gen_range(100..400);
            let positive = (count as f64 * POSITIVE_SHARE).floor() as u32;
            let negative = (count as f64 * NEGATIVE_SHARE).floor() as u32;

            TrendPoint {
                date: today - Duration::days(days_ago),
                count,
                positive,
                negative,
                neutral: count - positive - negative,
            }
        })
        .collect()
}

pub fn generate_alerts(now: DateTime<Utc>) -> Vec<Alert> {
    vec![
        Alert {
            id: 1,
            message: "230% spike in mentions detected in the last hour".to_string(),
            created_at: now - Duration::minutes(15),
        },
        Alert {
            id: 2,
            message: "Negative sentiment increased by 45% compared to yesterday".to_string(),
            created_at: now - Duration::minutes(30),
        },
    ]
}

pub fn generate_dataset<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Dataset {
    let mentions = (0..MOCK_MENTION_COUNT as i64)
        .map(|id| generate_mention(rng, id, now))
        .collect();

    Dataset {
        mentions,
        trends: generate_trends(rng, now.date_naive()),
        alerts: generate_alerts(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 8, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_mention_fields_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = now();
        for id in 0..500 {
            let mention = generate_mention(&mut rng, id, now);
            assert!(mention.created_at <= now);
            assert!(mention.created_at > now - Duration::hours(MENTION_WINDOW_HOURS));
            let score = mention.score();
            assert!((-1.0..1.0).contains(&score), "score {score} out of range");
            assert_eq!(mention.url, format!("https://example.com/mention/{}", id));
        }
    }

    #[test]
    fn test_mention_text_matches_sentiment_corpus() {
        let mut rng = StdRng::seed_from_u64(11);
        for id in 0..100 {
            let mention = generate_mention(&mut rng, id, now());
            assert!(corpus::samples_for(mention.sentiment).contains(&mention.text.as_str()));
        }
    }

    #[test]
    fn test_generator_covers_all_labels() {
        let mut rng = StdRng::seed_from_u64(3);
        let mentions: Vec<Mention> = (0..200).map(|id| generate_mention(&mut rng, id, now())).collect();
        for sentiment in Sentiment::ALL {
            assert!(mentions.iter().any(|m| m.sentiment == sentiment));
        }
        for platform in Platform::ALL {
            assert!(mentions.iter().any(|m| m.platform == platform));
        }
    }

    #[test]
    fn test_same_seed_same_mention() {
        let a = generate_mention(&mut StdRng::seed_from_u64(42), 5, now());
        let b = generate_mention(&mut StdRng::seed_from_u64(42), 5, now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_trends_cover_seven_consecutive_days() {
        let mut rng = StdRng::seed_from_u64(1);
        let today = now().date_naive();
        let trends = generate_trends(&mut rng, today);

        assert_eq!(trends.len(), 7);
        assert_eq!(trends.last().map(|t| t.date), Some(today));
        for pair in trends.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn test_trend_counts_balance() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            for point in generate_trends(&mut rng, now().date_naive()) {
                assert!(point.is_balanced());
                assert!((100..400).contains(&point.count));
            }
        }
    }

    #[test]
    fn test_alerts_are_recent() {
        let alerts = generate_alerts(now());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].created_at, now() - Duration::minutes(15));
        assert_eq!(alerts[1].created_at, now() - Duration::minutes(30));
        assert!(alerts[0].message.contains("spike"));
    }

    #[test]
    fn test_dataset_has_fifty_indexed_mentions() {
        let mut rng = StdRng::seed_from_u64(5);
        let dataset = generate_dataset(&mut rng, now());
        assert_eq!(dataset.mentions.len(), MOCK_MENTION_COUNT);
        let ids: Vec<i64> = dataset.mentions.iter().map(|m| m.id).collect();
        assert_eq!(ids, (0..50).collect::<Vec<i64>>());
        assert_eq!(dataset.trends.len(), 7);
        assert_eq!(dataset.alerts.len(), 2);
    }
}
