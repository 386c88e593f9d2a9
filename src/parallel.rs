use std::fmt;
use std::str::FromStr;

use crate::error::RecommendError;
use crate::recommend::Recommender;

pub const MAX_WORKER_PROCESSES_KEY: &str = "max_worker_processes";
pub const MAX_PARALLEL_WORKERS_GATHER_KEY: &str = "max_parallel_workers_per_gather";
pub const MAX_PARALLEL_WORKERS_KEY: &str = "max_parallel_workers";

/// Keys in postgresql.conf that are tuned for parallelism, in output order.
pub const PARALLEL_KEYS: [&str; 3] = [
    MAX_WORKER_PROCESSES_KEY,
    MAX_PARALLEL_WORKERS_GATHER_KEY,
    MAX_PARALLEL_WORKERS_KEY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParallelKey {
    MaxWorkerProcesses,
    MaxParallelWorkersPerGather,
    MaxParallelWorkers,
}

impl ParallelKey {
    pub const ALL: [ParallelKey; 3] = [
        ParallelKey::MaxWorkerProcesses,
        ParallelKey::MaxParallelWorkersPerGather,
        ParallelKey::MaxParallelWorkers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParallelKey::MaxWorkerProcesses => MAX_WORKER_PROCESSES_KEY,
            ParallelKey::MaxParallelWorkersPerGather => MAX_PARALLEL_WORKERS_GATHER_KEY,
            ParallelKey::MaxParallelWorkers => MAX_PARALLEL_WORKERS_KEY,
        }
    }
}

impl fmt::Display for ParallelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParallelKey {
    type Err = RecommendError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            MAX_WORKER_PROCESSES_KEY => Ok(ParallelKey::MaxWorkerProcesses),
            MAX_PARALLEL_WORKERS_GATHER_KEY => Ok(ParallelKey::MaxParallelWorkersPerGather),
            MAX_PARALLEL_WORKERS_KEY => Ok(ParallelKey::MaxParallelWorkers),
            other => Err(RecommendError::UnknownKey(other.to_string())),
        }
    }
}

/// Recommends values for [`PARALLEL_KEYS`] based on the number of CPUs.
///
/// The CPU count is not validated on construction; every call to
/// [`ParallelRecommender::recommend`] rejects counts of 1 or less.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelRecommender {
    cpus: i64,
}

impl ParallelRecommender {
    pub fn new(cpus: i64) -> Self {
        Self { cpus }
    }

    pub fn cpus(&self) -> i64 {
        self.cpus
    }

    /// Returns the postgresql.conf formatted value for `key`.
    pub fn recommend(&self, key: &str) -> Result<String, RecommendError> {
        self.check_cpus()?;
        Ok(self.value_for(key.parse()?))
    }

    pub fn recommend_key(&self, key: ParallelKey) -> Result<String, RecommendError> {
        self.check_cpus()?;
        Ok(self.value_for(key))
    }

    fn value_for(&self, key: ParallelKey) -> String {
        let val = match key {
            ParallelKey::MaxWorkerProcesses | ParallelKey::MaxParallelWorkers => self.cpus,
            // half the cpus, ties rounded up; cannot overflow at i64::MAX
            ParallelKey::MaxParallelWorkersPerGather => self.cpus / 2 + self.cpus % 2,
        };

        val.to_string()
    }

    fn check_cpus(&self) -> Result<(), RecommendError> {
        if self.cpus <= 1 {
            return Err(RecommendError::InsufficientResources { cpus: self.cpus });
        }
        Ok(())
    }
}

impl Recommender for ParallelRecommender {
    fn keys(&self) -> &'static [&'static str] {
        &PARALLEL_KEYS
    }

    fn recommend(&self, key: &str) -> Result<String, RecommendError> {
        ParallelRecommender::recommend(self, key)
    }
}
