use lap_delta::{analyze_laps, AnalysisConfig, Axis, DomainAnalysis, LapTrace};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

use crate::error::ApiError;

/// A lap identity at one upload. Re-uploading an id bumps its generation.
type LapRef = (String, u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    subject: LapRef,
    reference: Option<LapRef>,
    axis: Axis,
}

struct StoredLap {
    trace: Arc<LapTrace>,
    track_length_m: Option<f64>,
    generation: u64,
}

#[derive(Default)]
struct Laps {
    by_id: HashMap<String, StoredLap>,
    next_generation: u64,
}

/// In-memory lap registry with analyses memoized by lap identity.
///
/// Cache entries are keyed by (subject, reference, axis) at a given upload
/// generation, so a re-upload can never be served a stale analysis.
pub struct LapStore {
    cfg: AnalysisConfig,
    laps: Mutex<Laps>,
    cache: Mutex<HashMap<CacheKey, Arc<DomainAnalysis>>>,
}

impl LapStore {
    pub fn new(cfg: AnalysisConfig) -> Self {
        Self {
            cfg,
            laps: Mutex::new(Laps::default()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Store a lap under `id`. Returns true when an earlier upload was replaced.
    ///
    /// A track length that is not a positive finite value is stored as unknown.
    pub fn insert(&self, id: &str, mut trace: LapTrace, track_length_m: Option<f64>) -> bool {
        trace.id = Some(id.to_string());
        let track_length_m = track_length_m.filter(|len| len.is_finite() && *len > 0.0);
        let replaced = {
            let mut laps = self.laps.lock();
            laps.next_generation += 1;
            let stored = StoredLap {
                trace: Arc::new(trace),
                track_length_m,
                generation: laps.next_generation,
            };
            laps.by_id.insert(id.to_string(), stored).is_some()
        };

        if replaced {
            self.cache.lock().retain(|key, _| {
                key.subject.0 != id && key.reference.as_ref().map_or(true, |r| r.0 != id)
            });
        }
        replaced
    }

    /// True while every lap in `key` is still at the generation it was analysed at.
    fn is_current(laps: &Laps, key: &CacheKey) -> bool {
        let current = |(id, generation): &LapRef| {
            laps.by_id.get(id).is_some_and(|lap| lap.generation == *generation)
        };
        current(&key.subject) && key.reference.as_ref().map_or(true, current)
    }

    fn lookup(&self, id: &str) -> Result<(Arc<LapTrace>, Option<f64>, u64), ApiError> {
        let laps = self.laps.lock();
        let lap = laps
            .by_id
            .get(id)
            .ok_or_else(|| ApiError::LapNotFound(id.to_string()))?;
        Ok((Arc::clone(&lap.trace), lap.track_length_m, lap.generation))
    }

    /// Analysis of `subject_id` against `reference_id` on `axis`, computed at
    /// most once per pair of uploads.
    pub fn analyze(
        &self,
        subject_id: &str,
        reference_id: Option<&str>,
        axis: Axis,
    ) -> Result<Arc<DomainAnalysis>, ApiError> {
        let (subject, track_length_m, subject_gen) = self.lookup(subject_id)?;
        let reference = reference_id.map(|id| self.lookup(id)).transpose()?;

        let key_for = |axis| CacheKey {
            subject: (subject_id.to_string(), subject_gen),
            reference: reference_id
                .zip(reference.as_ref())
                .map(|(id, r)| (id.to_string(), r.2)),
            axis,
        };

        if let Some(hit) = self.cache.lock().get(&key_for(axis)) {
            tracing::debug!("cache hit for {} on {}", subject_id, axis.as_str());
            return Ok(Arc::clone(hit));
        }

        let mut cfg = self.cfg.clone();
        if track_length_m.is_some() {
            cfg.align.expected_lap_distance_m = track_length_m;
        }
        let analysis = analyze_laps(&subject, reference.as_ref().map(|r| &*r.0), &cfg)?;

        let by_distance = Arc::new(analysis.by_distance);
        let by_time = Arc::new(analysis.by_time);
        let result = match axis {
            Axis::Distance => Arc::clone(&by_distance),
            Axis::Time => Arc::clone(&by_time),
        };

        // Holding the laps lock orders this insert against a re-upload's purge
        let laps = self.laps.lock();
        let key = key_for(Axis::Distance);
        if Self::is_current(&laps, &key) {
            let mut cache = self.cache.lock();
            cache.insert(key, by_distance);
            cache.insert(key_for(Axis::Time), by_time);
        } else {
            tracing::debug!("{} was re-uploaded during analysis, not caching", subject_id);
        }
        Ok(result)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}
