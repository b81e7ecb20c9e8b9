//! Random roll engine.
//!
//! Samples uniform integers from an inclusive range and resolves whole dice
//! requests. Every randomized group waits once on a [`RollDelay`] before
//! sampling so clients can animate the roll; the delay is injected so tests
//! and the CLI can skip it.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::error::{DiceError, DiceResult};
use crate::request::{DiceRequest, DiceResponse, DiceSpec};
use crate::success::Classifier;

/// Default bounds of the artificial rolling latency, in milliseconds.
pub const DEFAULT_LATENCY_MS: RangeInclusive<u64> = 600..=1000;

/// An inclusive integer sampling range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollRange {
    min: i64,
    max: i64,
}

impl RollRange {
    /// Build a range from integer bounds.
    pub fn new(min: i64, max: i64) -> DiceResult<Self> {
        if min > max {
            return Err(DiceError::EmptyRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound (inclusive).
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Returns true if `value` lies within the range.
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Draw `count` independent values from this range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<i64> {
        (0..count)
            .map(|_| rng.random_range(self.min..=self.max))
            .collect()
    }
}

/// Suspends a roll for the simulated "rolling" latency.
#[async_trait]
pub trait RollDelay: Send + Sync {
    /// Wait for `duration` without blocking other tasks.
    async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl RollDelay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RollDelay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// Resolves dice requests against a shared RNG.
pub struct DiceEngine {
    rng: Mutex<StdRng>,
    delay: Arc<dyn RollDelay>,
    latency_ms: RangeInclusive<u64>,
}

impl DiceEngine {
    /// An engine seeded from the operating system.
    pub fn new(delay: Arc<dyn RollDelay>) -> Self {
        Self::with_rng(StdRng::from_os_rng(), delay)
    }

    /// An engine with a fixed seed, for reproducible rolls.
    pub fn seeded(seed: u64, delay: Arc<dyn RollDelay>) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), delay)
    }

    fn with_rng(rng: StdRng, delay: Arc<dyn RollDelay>) -> Self {
        Self {
            rng: Mutex::new(rng),
            delay,
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }

    /// Override the latency bounds (milliseconds, inclusive).
    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency_ms = min_ms.min(max_ms)..=max_ms.max(min_ms);
        self
    }

    /// The configured latency bounds.
    pub fn latency_ms(&self) -> &RangeInclusive<u64> {
        &self.latency_ms
    }

    /// Draw `count` values from `range` without any delay.
    pub async fn sample(&self, range: RollRange, count: usize) -> Vec<i64> {
        let mut rng = self.rng.lock().await;
        range.sample(&mut *rng, count)
    }

    /// Wait once for the rolling latency, then draw `count` values.
    pub async fn roll(&self, range: RollRange, count: usize) -> Vec<i64> {
        let pause = {
            let mut rng = self.rng.lock().await;
            Duration::from_millis(rng.random_range(self.latency_ms.clone()))
        };
        self.delay.wait(pause).await;
        self.sample(range, count).await
    }

    /// Resolve a whole request.
    ///
    /// `classifier` is `Some` only when classification was asked for and is
    /// enabled. Array mode never classifies.
    pub async fn resolve(
        &self,
        request: &DiceRequest,
        classifier: Option<Classifier>,
    ) -> DiceResult<Vec<DiceResponse>> {
        match request {
            DiceRequest::Many(specs) => {
                try_join_all(specs.iter().map(|spec| self.resolve_entry(spec))).await
            }
            DiceRequest::Single(spec) => self.resolve_single(spec, classifier).await,
        }
    }

    async fn resolve_entry(&self, spec: &DiceSpec) -> DiceResult<DiceResponse> {
        if let Some(value) = spec.fixed_value() {
            return Ok(DiceResponse::new(value));
        }
        let max = spec.num.checked_mul(spec.roll).ok_or(DiceError::Overflow {
            num: spec.num,
            size: spec.roll,
        })?;
        let range = RollRange::new(spec.num, max)?;
        let value = self.roll(range, 1).await.first().copied().unwrap_or(spec.num);
        Ok(DiceResponse::new(value))
    }

    async fn resolve_single(
        &self,
        spec: &DiceSpec,
        classifier: Option<Classifier>,
    ) -> DiceResult<Vec<DiceResponse>> {
        if let Some(value) = spec.fixed_value() {
            return Ok(vec![DiceResponse::new(value)]);
        }
        let count = usize::try_from(spec.num).map_err(|_| DiceError::NegativeCount(spec.num))?;
        let range = RollRange::new(1, spec.roll)?;
        let values = self.roll(range, count).await;
        tracing::trace!(dice = %spec, ?values, "rolled");

        let reference = spec.effective_reference();
        Ok(values
            .into_iter()
            .map(|value| match (classifier, reference) {
                (Some(classifier), Some(reference)) => {
                    DiceResponse::classified(value, classifier.classify(reference, value))
                }
                _ => DiceResponse::new(value),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::success::{DiceResolverKey, SuccessType};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts waits and records the requested durations.
    #[derive(Default)]
    struct CountingDelay {
        waits: AtomicUsize,
        durations: std::sync::Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl RollDelay for CountingDelay {
        async fn wait(&self, duration: Duration) {
            self.waits.fetch_add(1, Ordering::SeqCst);
            self.durations.lock().unwrap().push(duration);
        }
    }

    fn engine() -> (DiceEngine, Arc<CountingDelay>) {
        let delay = Arc::new(CountingDelay::default());
        (DiceEngine::seeded(42, delay.clone()), delay)
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert_eq!(
            RollRange::new(5, 4),
            Err(DiceError::EmptyRange { min: 5, max: 4 })
        );
    }

    #[test]
    fn integer_bounds_are_kept_as_given() {
        let range = RollRange::new(-2, -1).unwrap();
        assert_eq!(range.min(), -2);
        assert_eq!(range.max(), -1);
        assert!(range.contains(-2) && range.contains(-1));
        assert!(!range.contains(0));
    }

    #[test]
    fn sample_deterministic_with_seed() {
        let range = RollRange::new(1, 20).unwrap();
        let mut rng1 = StdRng::seed_from_u64(99);
        let mut rng2 = StdRng::seed_from_u64(99);
        assert_eq!(range.sample(&mut rng1, 5), range.sample(&mut rng2, 5));
    }

    #[test]
    fn single_value_range() {
        let range = RollRange::new(4, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(range.sample(&mut rng, 3), vec![4, 4, 4]);
    }

    #[tokio::test]
    async fn roll_waits_once_per_group() {
        let (engine, delay) = engine();
        let values = engine.roll(RollRange::new(1, 6).unwrap(), 10).await;
        assert_eq!(values.len(), 10);
        assert_eq!(delay.waits.load(Ordering::SeqCst), 1);
        let pause = delay.durations.lock().unwrap()[0];
        assert!((600..=1000).contains(&(pause.as_millis() as u64)));
    }

    #[tokio::test]
    async fn sample_never_waits() {
        let (engine, delay) = engine();
        engine.sample(RollRange::new(1, 6).unwrap(), 4).await;
        assert_eq!(delay.waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn custom_latency_bounds() {
        let delay = Arc::new(CountingDelay::default());
        let engine = DiceEngine::seeded(7, delay.clone()).with_latency(10, 10);
        engine.roll(RollRange::new(1, 6).unwrap(), 1).await;
        assert_eq!(
            delay.durations.lock().unwrap()[0],
            Duration::from_millis(10)
        );
    }

    #[tokio::test]
    async fn single_fixed_values_skip_randomness() {
        let (engine, delay) = engine();
        let zero_dice = engine
            .resolve(&DiceSpec::new(0, 6).into(), None)
            .await
            .unwrap();
        assert_eq!(zero_dice, vec![DiceResponse::new(6)]);

        let no_faces = engine
            .resolve(&DiceSpec::new(2, -3).into(), None)
            .await
            .unwrap();
        assert_eq!(no_faces, vec![DiceResponse::new(-3)]);

        let one_face = engine
            .resolve(&DiceSpec::new(4, 1).into(), None)
            .await
            .unwrap();
        assert_eq!(one_face, vec![DiceResponse::new(4)]);

        assert_eq!(delay.waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn single_mode_rolls_each_die() {
        let (engine, delay) = engine();
        let results = engine
            .resolve(&DiceSpec::new(5, 8).into(), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 5);
        for r in &results {
            assert!((1..=8).contains(&r.roll));
            assert!(r.result_type.is_none());
        }
        assert_eq!(delay.waits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_mode_classifies_with_reference() {
        let (engine, _) = engine();
        let spec = DiceSpec::new(3, 100).with_reference(50);
        let results = engine
            .resolve(&spec.into(), Some(Classifier::new(Some(DiceResolverKey::D100))))
            .await
            .unwrap();
        for r in &results {
            let expected = if r.roll <= 50 {
                SuccessType::Success
            } else {
                SuccessType::Failure
            };
            assert_eq!(r.result_type, Some(expected));
        }
    }

    #[tokio::test]
    async fn unknown_table_classifies_as_unknown() {
        let (engine, _) = engine();
        let spec = DiceSpec::new(1, 20).with_reference(10);
        let results = engine.resolve(&spec.into(), Some(Classifier::new(None))).await.unwrap();
        assert_eq!(results[0].result_type, Some(SuccessType::Unknown));
    }

    #[tokio::test]
    async fn single_mode_without_reference_is_unclassified() {
        let (engine, _) = engine();
        let spec = DiceSpec::new(2, 20).with_reference(0);
        let results = engine
            .resolve(&spec.into(), Some(Classifier::new(Some(DiceResolverKey::D20))))
            .await
            .unwrap();
        assert!(results.iter().all(|r| r.result_type.is_none()));
    }

    #[tokio::test]
    async fn single_mode_without_classifier_is_unclassified() {
        let (engine, _) = engine();
        let spec = DiceSpec::new(2, 20).with_reference(10);
        let results = engine.resolve(&spec.into(), None).await.unwrap();
        assert!(results.iter().all(|r| r.result_type.is_none()));
    }

    #[tokio::test]
    async fn array_mode_sums_per_entry() {
        let (engine, delay) = engine();
        let request = DiceRequest::Many(vec![
            DiceSpec::new(2, 6),
            DiceSpec::new(0, 4),
            DiceSpec::new(3, 1),
            DiceSpec::new(1, 20).with_reference(10),
        ]);
        let results = engine
            .resolve(&request, Some(Classifier::new(Some(DiceResolverKey::D20))))
            .await
            .unwrap();
        assert_eq!(results.len(), 4);
        assert!((2..=12).contains(&results[0].roll));
        assert_eq!(results[1].roll, 4);
        assert_eq!(results[2].roll, 3);
        assert!((1..=20).contains(&results[3].roll));
        assert!(results.iter().all(|r| r.result_type.is_none()));
        // One wait per randomized entry.
        assert_eq!(delay.waits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_array_resolves_empty() {
        let (engine, _) = engine();
        let results = engine
            .resolve(&DiceRequest::Many(Vec::new()), None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    proptest! {
        #[test]
        fn sampled_values_stay_in_range(
            min in -1000i64..1000,
            span in 0i64..1000,
            count in 0usize..50,
            seed in any::<u64>(),
        ) {
            let range = RollRange::new(min, min + span).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let values = range.sample(&mut rng, count);
            prop_assert_eq!(values.len(), count);
            for v in values {
                prop_assert!(range.contains(v));
            }
        }

        #[test]
        fn array_entries_stay_in_bounds(
            entries in proptest::collection::vec((0i64..20, -2i64..30), 0..8),
            seed in any::<u64>(),
        ) {
            let specs: Vec<DiceSpec> = entries.iter().map(|(n, r)| DiceSpec::new(*n, *r)).collect();
            let request = DiceRequest::Many(specs.clone());
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let engine = DiceEngine::seeded(seed, Arc::new(NoDelay));
            let results = runtime.block_on(engine.resolve(&request, None)).unwrap();
            prop_assert_eq!(results.len(), specs.len());
            for (spec, result) in specs.iter().zip(&results) {
                match spec.fixed_value() {
                    Some(fixed) => prop_assert_eq!(result.roll, fixed),
                    None => {
                        prop_assert!(result.roll >= spec.num);
                        prop_assert!(result.roll <= spec.num * spec.roll);
                    }
                }
            }
        }

        #[test]
        fn single_rolls_stay_in_bounds(
            num in 1i64..30,
            size in 2i64..120,
            seed in any::<u64>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let engine = DiceEngine::seeded(seed, Arc::new(NoDelay));
            let results = runtime
                .block_on(engine.resolve(&DiceSpec::new(num, size).into(), None))
                .unwrap();
            prop_assert_eq!(results.len() as i64, num);
            for r in results {
                prop_assert!((1..=size).contains(&r.roll));
            }
        }
    }
}
