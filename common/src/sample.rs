use core::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The independent variable swept by a benchmark run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Configuration {
    /// A plain thread or process count
    Count(u32),
    /// A process×thread pair, `total_workers` is the grouping key
    Hybrid {
        processes: u32,
        threads: u32,
        total_workers: u32,
    },
}

impl Configuration {
    /// `None` when `processes × threads` does not fit the worker count
    pub fn hybrid(processes: u32, threads: u32) -> Option<Self> {
        Some(Configuration::Hybrid {
            processes,
            threads,
            total_workers: processes.checked_mul(threads)?,
        })
    }

    /// Number of parallel workers, used as x value and as bar group key
    pub fn workers(&self) -> u32 {
        match *self {
            Configuration::Count(n) => n,
            Configuration::Hybrid { total_workers, .. } => total_workers,
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Configuration::Count(n) => write!(f, "{n}"),
            Configuration::Hybrid {
                processes, threads, ..
            } => write!(f, "{processes}p×{threads}t"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub configuration: Configuration,
    /// Wall-clock seconds
    pub duration: f64,
}

impl Sample {
    pub fn new(configuration: Configuration, duration: f64) -> Self {
        Self {
            configuration,
            duration,
        }
    }
}

/// Samples sharing the same worker count
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerGroup {
    pub workers: u32,
    pub samples: Vec<Sample>,
}

/// Samples in file order
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn configurations(&self) -> Vec<Configuration> {
        self.samples.iter().map(|s| s.configuration).collect()
    }

    pub fn durations(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.duration).collect()
    }

    pub fn max_duration(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.duration).reduce(f64::max)
    }

    /// Stable sort by worker count, equal keys keep file order
    pub fn sorted_by_workers(&self) -> Dataset {
        let mut samples = self.samples.clone();
        samples.sort_by_key(|s| s.configuration.workers());
        Dataset { samples }
    }

    /// Groups in ascending worker order
    pub fn group_by_workers(&self) -> Vec<WorkerGroup> {
        let sorted = self.sorted_by_workers();
        let chunks = sorted
            .samples
            .into_iter()
            .chunk_by(|s| s.configuration.workers());
        let groups = chunks
            .into_iter()
            .map(|(workers, samples)| WorkerGroup {
                workers,
                samples: samples.collect(),
            })
            .collect();
        groups
    }
}

impl FromIterator<Sample> for Dataset {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Dataset {
            samples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
