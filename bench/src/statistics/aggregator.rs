use crate::error::BenchError;
use crate::statistics::stat::{Stat, StatPool};
use crate::statistics::stat_group::{write_stat_group_map, StatGroup};
use aibench_report::quantiles::LatencyQuantiles;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

pub const ALL_QUERIES_LABEL: &str = "All queries";

/// Interval view handed to the reporter. The instantaneous group is reset once read.
#[derive(Debug, Clone)]
pub struct IntervalSnapshot {
    pub interval_count: u64,
    pub interval_quantiles: LatencyQuantiles,
    pub interval_encoded_histogram: Option<String>,
    pub cumulative_count: u64,
    pub cumulative_quantiles: LatencyQuantiles,
}

#[derive(Debug)]
pub struct SnapshotRequest {
    pub reply: oneshot::Sender<IntervalSnapshot>,
}

/// Single consumer of the stat channel and the only writer of every [`StatGroup`].
#[derive(Debug)]
pub struct StatAggregator {
    burn_in: u64,
    burned: u64,
    workers: usize,
    stats_mapping: BTreeMap<String, StatGroup>,
    instantaneous: StatGroup,
    ops_count: u64,
    stat_pool: Arc<StatPool>,
}

/// Final state of the aggregator once the stat channel is drained.
#[derive(Debug)]
pub struct AggregatedStats {
    pub stats_mapping: BTreeMap<String, StatGroup>,
    pub ops_count: u64,
    pub workers: usize,
}

impl StatAggregator {
    pub fn new(burn_in: u64, workers: usize, stat_pool: Arc<StatPool>) -> Result<Self, BenchError> {
        let all_queries = StatGroup::new()?;
        let instantaneous = StatGroup::empty_like(&all_queries);
        let mut stats_mapping = BTreeMap::new();
        stats_mapping.insert(ALL_QUERIES_LABEL.to_owned(), all_queries);
        Ok(Self {
            burn_in,
            burned: 0,
            workers,
            stats_mapping,
            instantaneous,
            ops_count: 0,
            stat_pool,
        })
    }

    pub fn push(&mut self, stat: Stat) {
        if stat.is_effective() {
            self.ops_count += stat.total_results();
        }

        if self.burned < self.burn_in {
            if stat.is_effective() {
                self.burned += 1;
                if self.burned == self.burn_in {
                    info!(
                        "Burn-in complete after {} queries with {} workers",
                        self.burn_in, self.workers
                    );
                }
            }
            self.stat_pool.put(stat);
            return;
        }

        match self.stats_mapping.get_mut(stat.label()) {
            Some(group) => group.push(&stat),
            None => {
                let mut group = StatGroup::empty_like(&self.instantaneous);
                group.push(&stat);
                self.stats_mapping.insert(stat.label().to_owned(), group);
            }
        }

        if !stat.is_partial() {
            if let Some(all_queries) = self.stats_mapping.get_mut(ALL_QUERIES_LABEL) {
                all_queries.push(&stat);
            }
            self.instantaneous.push(&stat);
        }

        self.stat_pool.put(stat);
    }

    pub fn take_interval_snapshot(&mut self) -> IntervalSnapshot {
        let interval_encoded_histogram = match self.instantaneous.encode() {
            Ok(encoded) => Some(encoded),
            Err(error) => {
                debug!("Skipping interval histogram encoding: {error}");
                None
            }
        };
        let (cumulative_count, cumulative_quantiles) = self
            .stats_mapping
            .get(ALL_QUERIES_LABEL)
            .map(|group| (group.count(), group.quantiles()))
            .unwrap_or_default();

        let snapshot = IntervalSnapshot {
            interval_count: self.instantaneous.count(),
            interval_quantiles: self.instantaneous.quantiles(),
            interval_encoded_histogram,
            cumulative_count,
            cumulative_quantiles,
        };
        self.instantaneous.reset();
        snapshot
    }

    /// Consumes stats until every sender is dropped, answering snapshot requests in between.
    pub async fn run(
        mut self,
        mut stats: mpsc::Receiver<Stat>,
        mut snapshot_requests: mpsc::Receiver<SnapshotRequest>,
    ) -> AggregatedStats {
        loop {
            tokio::select! {
                stat = stats.recv() => match stat {
                    Some(stat) => self.push(stat),
                    None => break,
                },
                Some(request) = snapshot_requests.recv() => {
                    let _ = request.reply.send(self.take_interval_snapshot());
                }
            }
        }
        debug!("Stat channel drained, {} labels aggregated", self.stats_mapping.len());
        self.finish()
    }

    pub fn finish(self) -> AggregatedStats {
        AggregatedStats {
            stats_mapping: self.stats_mapping,
            ops_count: self.ops_count,
            workers: self.workers,
        }
    }
}

impl AggregatedStats {
    pub fn all_queries(&self) -> Option<&StatGroup> {
        self.stats_mapping.get(ALL_QUERIES_LABEL)
    }

    pub fn write_report<W: Write>(&self, writer: &mut W, elapsed: Duration) -> io::Result<()> {
        let rate = match elapsed.as_secs_f64() {
            secs if secs > 0.0 => self.ops_count as f64 / secs,
            _ => 0.0,
        };
        writeln!(
            writer,
            "Run complete after {} inferences with {} workers (Overall inference rate {:.2} inferences/sec):",
            self.ops_count, self.workers, rate
        )?;
        write_stat_group_map(writer, &self.stats_mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::stat::new_stat_pool;

    fn aggregator(burn_in: u64) -> StatAggregator {
        StatAggregator::new(burn_in, 2, Arc::new(new_stat_pool(16))).unwrap()
    }

    fn query(label: &str, latency_us: i64) -> Stat {
        Stat::new().init(label, latency_us, 1, false, "")
    }

    fn all_queries_count(stats: &AggregatedStats) -> u64 {
        stats.all_queries().map(StatGroup::count).unwrap_or_default()
    }

    #[test]
    fn should_keep_partial_stats_out_of_all_queries() {
        let mut aggregator = aggregator(0);
        aggregator.push(query("Query", 100));
        aggregator.push(query("Stage", 40).partial());
        let stats = aggregator.finish();

        assert_eq!(all_queries_count(&stats), 1);
        assert_eq!(stats.stats_mapping["Stage"].count(), 1);
        assert_eq!(stats.ops_count, 1);
    }

    #[test]
    fn should_exclude_burn_in_from_histograms_but_count_it() {
        let mut aggregator = aggregator(3);
        for latency in 1..=10 {
            aggregator.push(query("Query", latency * 100));
        }
        let stats = aggregator.finish();

        assert_eq!(stats.ops_count, 10);
        assert_eq!(all_queries_count(&stats), 7);
        assert_eq!(stats.stats_mapping["Query"].count(), 7);
    }

    #[test]
    fn partial_stats_should_not_advance_burn_in() {
        let mut aggregator = aggregator(1);
        aggregator.push(query("Stage", 10).partial());
        aggregator.push(query("Query", 10));
        aggregator.push(query("Query", 20));
        let stats = aggregator.finish();

        assert_eq!(all_queries_count(&stats), 1);
        assert!(!stats.stats_mapping.contains_key("Stage"));
    }

    #[test]
    fn warm_stats_should_aggregate_under_their_own_label() {
        let mut aggregator = aggregator(0);
        aggregator.push(query("Query", 100));
        let mut warm = query("Query", 50);
        warm.mark_warm();
        aggregator.push(warm);
        let stats = aggregator.finish();

        assert_eq!(stats.stats_mapping["Query"].count(), 1);
        assert_eq!(stats.stats_mapping["Query (warm)"].count(), 1);
        assert_eq!(stats.ops_count, 1);
    }

    #[test]
    fn snapshot_should_reset_interval_only() {
        let mut aggregator = aggregator(0);
        aggregator.push(query("Query", 100));
        aggregator.push(query("Query", 200));

        let first = aggregator.take_interval_snapshot();
        let second = aggregator.take_interval_snapshot();

        assert_eq!(first.interval_count, 2);
        assert_eq!(first.cumulative_count, 2);
        assert_eq!(second.interval_count, 0);
        assert_eq!(second.cumulative_count, 2);
    }

    #[tokio::test]
    async fn should_drain_channel_and_answer_snapshot_requests() {
        let (stats_tx, stats_rx) = mpsc::channel(4);
        let (snapshot_tx, snapshot_rx) = mpsc::channel(1);
        let task = tokio::spawn(aggregator(0).run(stats_rx, snapshot_rx));

        for _ in 0..5 {
            stats_tx.send(query("Query", 100)).await.unwrap();
        }
        let (reply, receiver) = oneshot::channel();
        snapshot_tx.send(SnapshotRequest { reply }).await.unwrap();
        let snapshot = receiver.await.unwrap();
        assert!(snapshot.cumulative_count <= 5);
        assert_eq!(snapshot.interval_count, snapshot.cumulative_count);

        drop(stats_tx);
        let stats = task.await.unwrap();
        assert_eq!(all_queries_count(&stats), 5);
    }

    #[test]
    fn should_write_run_complete_header() {
        let mut aggregator = aggregator(0);
        aggregator.push(query("Query", 100));
        let stats = aggregator.finish();
        let mut output = Vec::new();
        stats.write_report(&mut output, Duration::from_secs(2)).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.starts_with(
            "Run complete after 1 inferences with 2 workers (Overall inference rate 0.50 inferences/sec):"
        ));
        assert!(output.contains("All queries:"));
        assert!(output.contains("Query      :"));
    }
}
