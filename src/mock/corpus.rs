use crate::model::Sentiment;

pub const POSITIVE_SAMPLES: [&str; 5] = [
    "Absolutely loving the new features, amazing work!",
    "Best product in the market, highly recommend!",
    "Finally found exactly what I was looking for.",
    "Outstanding customer service and quality.",
    "This company truly cares about their users.",
];

pub const NEGATIVE_SAMPLES: [&str; 5] = [
    "Disappointed with the recent changes.",
    "Not worth the price anymore.",
    "Customer support was unhelpful.",
    "Quality has declined significantly.",
    "Better alternatives available.",
];

pub const NEUTRAL_SAMPLES: [&str; 5] = [
    "The company announced new features today.",
    "Market share remains stable this quarter.",
    "Planning to update their website soon.",
    "New partnerships coming in Q1.",
    "Expanding to new regions.",
];

pub fn samples_for(sentiment: Sentiment) -> &'static [&'static str] {
    match sentiment {
        Sentiment::Positive => &POSITIVE_SAMPLES,
        Sentiment::Negative => &NEGATIVE_SAMPLES,
        Sentiment::Neutral => &NEUTRAL_SAMPLES,
    }
}
