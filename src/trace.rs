//! Trace model: request records, a delimited-text loader, and synthetic
//! workload generators.
//!
//! Generators are fully deterministic (seeded xorshift core, no external
//! RNG crate) so that replaying the same spec always produces the same
//! trace, which the engine's determinism guarantees build on.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::slice;

use crate::state::CachedObject;

/// One simulated cache request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord<K> {
    pub key: K,
    pub size: u64,
}

impl<K> TraceRecord<K> {
    pub fn new(key: K, size: u64) -> Self {
        Self { key, size }
    }

    pub fn to_object(&self) -> CachedObject<K>
    where
        K: Clone,
    {
        CachedObject::new(self.key.clone(), self.size)
    }
}

/// An ordered sequence of simulated cache requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace<K> {
    records: Vec<TraceRecord<K>>,
}

impl<K> Trace<K> {
    pub fn new(records: Vec<TraceRecord<K>>) -> Self {
        Self { records }
    }

    /// Builds a unit-size trace from bare keys; the shape most scenario
    /// tests want.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self {
            records: keys
                .into_iter()
                .map(|key| TraceRecord::new(key, 1))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, TraceRecord<K>> {
        self.records.iter()
    }

    pub fn push(&mut self, record: TraceRecord<K>) {
        self.records.push(record);
    }
}

impl<'a, K> IntoIterator for &'a Trace<K> {
    type Item = &'a TraceRecord<K>;
    type IntoIter = slice::Iter<'a, TraceRecord<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Delimited-text loader
// ---------------------------------------------------------------------------

/// Shape of a delimited trace file.
#[derive(Debug, Clone)]
pub struct TraceFormat {
    pub delimiter: char,
    /// Column holding the request key.
    pub key_col: usize,
    /// Column holding the object size; `None` means unit sizes.
    pub size_col: Option<usize>,
    pub has_header: bool,
    /// Force every object to size 1 even when a size column exists.
    pub unit_sizes: bool,
}

impl Default for TraceFormat {
    fn default() -> Self {
        Self {
            delimiter: ',',
            key_col: 0,
            size_col: Some(1),
            has_header: false,
            unit_sizes: false,
        }
    }
}

/// Error loading or parsing a trace file.
#[derive(Debug)]
pub enum TraceError {
    Io(io::Error),
    Parse { line: usize, reason: String },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::Io(err) => write!(f, "trace i/o error: {err}"),
            TraceError::Parse { line, reason } => {
                write!(f, "trace parse error at line {line}: {reason}")
            },
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceError::Io(err) => Some(err),
            TraceError::Parse { .. } => None,
        }
    }
}

impl From<io::Error> for TraceError {
    fn from(err: io::Error) -> Self {
        TraceError::Io(err)
    }
}

/// Loads a delimited trace file into string-keyed records.
///
/// Blank lines are skipped; sizes must be positive integers.
pub fn load_trace(path: &Path, format: &TraceFormat) -> Result<Trace<String>, TraceError> {
    let contents = fs::read_to_string(path)?;
    let mut records = Vec::new();
    let skip = usize::from(format.has_header);

    for (idx, line) in contents.lines().enumerate().skip(skip) {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(format.delimiter).collect();

        let key = fields
            .get(format.key_col)
            .map(|field| field.trim())
            .filter(|field| !field.is_empty())
            .ok_or_else(|| TraceError::Parse {
                line: line_no,
                reason: format!("missing key column {}", format.key_col),
            })?;

        let size = if format.unit_sizes {
            1
        } else {
            match format.size_col {
                Some(col) => {
                    let raw = fields.get(col).map(|field| field.trim()).ok_or_else(|| {
                        TraceError::Parse {
                            line: line_no,
                            reason: format!("missing size column {col}"),
                        }
                    })?;
                    let size: u64 = raw.parse().map_err(|_| TraceError::Parse {
                        line: line_no,
                        reason: format!("size '{raw}' is not an unsigned integer"),
                    })?;
                    if size == 0 {
                        return Err(TraceError::Parse {
                            line: line_no,
                            reason: "size must be positive".to_string(),
                        });
                    }
                    size
                },
                None => 1,
            }
        };

        records.push(TraceRecord::new(key.to_string(), size));
    }

    Ok(Trace::new(records))
}

// ---------------------------------------------------------------------------
// Synthetic workloads
// ---------------------------------------------------------------------------

/// Key access pattern for synthetic traces.
#[derive(Debug, Clone, Copy)]
pub enum AccessPattern {
    /// Uniform random keys in `[0, universe)`.
    Uniform,
    /// Hot/cold split with a configurable hot fraction and hot access
    /// probability.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Sequential scan over `[0, universe)`.
    Scan,
    /// Zipfian distribution; `theta` controls skew (0.0 = uniform,
    /// 0.99 = highly skewed, the YCSB default).
    Zipfian { theta: f64 },
}

/// Object size model for synthetic traces.
#[derive(Debug, Clone, Copy)]
pub enum SizeModel {
    /// Every object costs 1.
    Unit,
    /// Sizes drawn uniformly from `[min, max]`, stable per key.
    UniformRange { min: u64, max: u64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkloadSpec {
    pub universe: u64,
    pub pattern: AccessPattern,
    pub sizes: SizeModel,
    pub seed: u64,
}

impl WorkloadSpec {
    pub fn generator(self) -> WorkloadGenerator {
        WorkloadGenerator::new(self)
    }

    /// Materializes `operations` records into a trace.
    pub fn synthesize(self, operations: usize) -> Trace<u64> {
        let mut generator = self.generator();
        let records = (0..operations).map(|_| generator.next_record()).collect();
        Trace::new(records)
    }
}

/// Deterministic record stream for a [`WorkloadSpec`].
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    universe: u64,
    pattern: AccessPattern,
    sizes: SizeModel,
    rng: XorShift64,
    scan_pos: u64,
    zipfian: Option<ZipfianState>,
}

impl WorkloadGenerator {
    pub fn new(spec: WorkloadSpec) -> Self {
        let universe = spec.universe.max(1);
        let zipfian = match spec.pattern {
            AccessPattern::Zipfian { theta } => Some(ZipfianState::new(universe, theta)),
            _ => None,
        };
        Self {
            universe,
            pattern: spec.pattern,
            sizes: spec.sizes,
            rng: XorShift64::new(spec.seed),
            scan_pos: 0,
            zipfian,
        }
    }

    pub fn next_record(&mut self) -> TraceRecord<u64> {
        let key = self.next_key();
        TraceRecord::new(key, self.size_for(key))
    }

    fn next_key(&mut self) -> u64 {
        match self.pattern {
            AccessPattern::Uniform => self.rng.next_u64() % self.universe,
            AccessPattern::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                let hot_fraction = hot_fraction.clamp(0.0, 1.0);
                let hot_prob = hot_prob.clamp(0.0, 1.0);
                let hot_size = ((self.universe as f64) * hot_fraction).round() as u64;
                let hot_size = hot_size.max(1).min(self.universe);
                if self.rng.next_f64() < hot_prob {
                    self.rng.next_u64() % hot_size
                } else if hot_size == self.universe {
                    self.rng.next_u64() % self.universe
                } else {
                    hot_size + (self.rng.next_u64() % (self.universe - hot_size))
                }
            },
            AccessPattern::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
            AccessPattern::Zipfian { .. } => {
                let zipf = self.zipfian.as_ref().expect("zipfian state present");
                let u = self.rng.next_f64();
                zipf.sample(u)
            },
        }
    }

    /// Sizes are a pure function of the key so that repeated requests for
    /// the same key agree on its cost.
    fn size_for(&self, key: u64) -> u64 {
        match self.sizes {
            SizeModel::Unit => 1,
            SizeModel::UniformRange { min, max } => {
                let (min, max) = (min.max(1), max.max(min.max(1)));
                let span = max - min + 1;
                min + XorShift64::new(key ^ 0x9e37_79b9_7f4a_7c15).next_u64() % span
            },
        }
    }
}

/// Zipfian distribution state for inverse CDF sampling (YCSB algorithm).
#[derive(Debug, Clone)]
struct ZipfianState {
    n: u64,
    theta: f64,
    zeta_n: f64,
    alpha: f64,
    eta: f64,
}

impl ZipfianState {
    fn new(n: u64, theta: f64) -> Self {
        let theta = theta.clamp(0.0, 0.9999); // Avoid division issues at theta=1
        let zeta_2 = Self::zeta(2, theta);
        let zeta_n = Self::zeta(n, theta);
        let alpha = 1.0 / (1.0 - theta);
        let eta = (1.0 - (2.0 / n as f64).powf(1.0 - theta)) / (1.0 - zeta_2 / zeta_n);

        Self {
            n,
            theta,
            zeta_n,
            alpha,
            eta,
        }
    }

    /// zeta(n, theta) = sum(1/i^theta for i in 1..=n)
    fn zeta(n: u64, theta: f64) -> f64 {
        let mut sum = 0.0;
        for i in 1..=n {
            sum += 1.0 / (i as f64).powf(theta);
        }
        sum
    }

    fn sample(&self, u: f64) -> u64 {
        let uz = u * self.zeta_n;

        if uz < 1.0 {
            return 0;
        }
        if uz < 1.0 + 0.5_f64.powf(self.theta) {
            return 1;
        }

        let spread = (self.n as f64) * (self.eta * u - self.eta + 1.0).powf(self.alpha);
        (spread as u64).min(self.n - 1)
    }
}

#[derive(Debug, Clone, Copy)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}
