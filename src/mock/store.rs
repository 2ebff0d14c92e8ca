use super::generator;
use super::Dataset;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Owner of the fallback dataset.
///
/// Holds exactly one snapshot at a time. `regenerate` builds a complete new
/// snapshot before swapping it in, so readers never observe a mix of old and
/// new sequences.
pub struct DatasetStore {
    rng: StdRng,
    snapshot: Dataset,
}

impl DatasetStore {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rng)
    }

    pub fn with_rng(mut rng: StdRng) -> Self {
        let snapshot = generator::generate_dataset(&mut rng, Utc::now());
        Self { rng, snapshot }
    }

    pub fn current(&self) -> &Dataset {
        &self.snapshot
    }

    pub fn regenerate(&mut self) -> Dataset {
        let fresh = generator::generate_dataset(&mut self.rng, Utc::now());
        self.snapshot = fresh.clone();
        tracing::debug!(
            mentions = fresh.mentions.len(),
            trends = fresh.trends.len(),
            "regenerated mock dataset"
        );
        fresh
    }
}
