use crate::utils::pool::{Reusable, ReusePool};

/// Appended to the label of every stat produced by the warm (second) run of a record.
pub const WARM_LABEL_SUFFIX: &str = " (warm)";

const LABEL_CAPACITY: usize = 128;

pub type StatPool = ReusePool<Stat>;

pub fn new_stat_pool(capacity: usize) -> StatPool {
    ReusePool::new(capacity, Stat::new)
}

/// One latency measurement of a query, or of one stage of a query when partial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stat {
    label: String,
    latency_us: i64,
    total_results: u64,
    is_warm: bool,
    is_partial: bool,
    timed_out: bool,
    debug_query: String,
}

impl Stat {
    pub fn new() -> Self {
        Self {
            label: String::with_capacity(LABEL_CAPACITY),
            ..Default::default()
        }
    }

    /// Fills a (possibly pooled) stat, keeping the label allocation.
    pub fn init(
        mut self,
        label: &str,
        latency_us: i64,
        total_results: u64,
        timed_out: bool,
        debug_query: &str,
    ) -> Self {
        self.label.clear();
        self.label.push_str(label);
        self.latency_us = latency_us;
        self.total_results = total_results;
        self.timed_out = timed_out;
        self.is_warm = false;
        self.is_partial = false;
        self.debug_query.clear();
        self.debug_query.push_str(debug_query);
        self
    }

    pub fn partial(mut self) -> Self {
        self.is_partial = true;
        self
    }

    pub(crate) fn mark_warm(&mut self) {
        self.is_warm = true;
        if !self.label.ends_with(WARM_LABEL_SUFFIX) {
            self.label.push_str(WARM_LABEL_SUFFIX);
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn latency_us(&self) -> i64 {
        self.latency_us
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    pub fn is_warm(&self) -> bool {
        self.is_warm
    }

    pub fn is_partial(&self) -> bool {
        self.is_partial
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn debug_query(&self) -> &str {
        &self.debug_query
    }

    /// A top-level measurement of a cold run, the unit counted for throughput and burn-in.
    pub fn is_effective(&self) -> bool {
        !self.is_partial && !self.is_warm
    }
}

impl Reusable for Stat {
    fn reset(&mut self) {
        self.label.clear();
        self.latency_us = 0;
        self.total_results = 0;
        self.is_warm = false;
        self.is_partial = false;
        self.timed_out = false;
        self.debug_query.clear();
    }
}
