use crate::error::BenchError;
use crate::processor::MetricCollector;
use crate::statistics::aggregator::{IntervalSnapshot, SnapshotRequest};
use crate::utils::counters::RunCounters;
use aibench_report::run_time_stats::ClientRunTimeStats;
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// Fixed-width table with interval latency quantiles
    Inference,
    /// CSV progress lines driven by the processed counter
    Load,
}

/// Periodic progress printer, stopped by the shutdown flag raised when the last worker finishes.
pub struct Reporter {
    style: ReportStyle,
    period: Duration,
    counters: Arc<RunCounters>,
    snapshots: mpsc::Sender<SnapshotRequest>,
    shutdown: watch::Receiver<bool>,
}

impl Reporter {
    pub fn new(
        style: ReportStyle,
        period: Duration,
        counters: Arc<RunCounters>,
        snapshots: mpsc::Sender<SnapshotRequest>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            style,
            period,
            counters,
            snapshots,
            shutdown,
        }
    }

    pub async fn run(mut self) -> BTreeMap<i64, ClientRunTimeStats> {
        let start = Instant::now();
        let wall_start = unix_nanos();
        let mut ticker = ticker(start, self.period);
        let mut previous_tick = start;
        let mut previous_total = 0;
        let mut series = BTreeMap::new();

        print_line(&self.header());
        loop {
            if *self.shutdown.borrow() {
                break;
            }
            tokio::select! {
                now = ticker.tick() => {
                    let took = now.duration_since(previous_tick).as_secs_f64();
                    let test_time = now.duration_since(start).as_secs_f64();
                    let total = self.counters.processed();
                    let stats = match self.style {
                        ReportStyle::Inference => match self.request_snapshot().await {
                            Some(snapshot) => inference_line(&snapshot, took, test_time, total),
                            None => break,
                        },
                        ReportStyle::Load => load_line(total, previous_total, took, test_time),
                    };
                    let offset =
                        i64::try_from(now.duration_since(start).as_nanos()).unwrap_or(i64::MAX);
                    series.insert(wall_start.saturating_add(offset), stats);
                    previous_tick = now;
                    previous_total = total;
                }
                _ = self.shutdown.changed() => break,
            }
        }
        debug!("Reporter stopped after {} snapshots", series.len());
        series
    }

    fn header(&self) -> String {
        match self.style {
            ReportStyle::Inference => format!(
                "{:>26} {:>25} {:>25} {:>26} {:>26} {:>26}",
                "Test time",
                "Inference Rate",
                "Total Inferences",
                "p50 lat. (msec)",
                "p95 lat. (msec)",
                "p99 lat. (msec)"
            ),
            ReportStyle::Load => {
                "time,per. inferences/s,inferences total,overall inferences/s".to_owned()
            }
        }
    }

    async fn request_snapshot(&self) -> Option<IntervalSnapshot> {
        let (reply, receiver) = oneshot::channel();
        self.snapshots.send(SnapshotRequest { reply }).await.ok()?;
        receiver.await.ok()
    }
}

fn inference_line(
    snapshot: &IntervalSnapshot,
    took: f64,
    test_time: f64,
    total: u64,
) -> ClientRunTimeStats {
    let inference_rate = rate(snapshot.interval_count, took);
    let quantiles = snapshot.interval_quantiles;
    print_line(&format!(
        "{:>25.0}s {:>25.0} {:>25} {:>25.3} {:>25.3} {:>25.3}",
        test_time, inference_rate, total, quantiles.q50, quantiles.q95, quantiles.q99
    ));
    ClientRunTimeStats {
        inference_rate,
        test_time,
        total_inferences: total,
        overall_rate: rate(total, test_time),
        quantiles,
        overall_quantiles: snapshot.cumulative_quantiles,
        encoded_histogram: snapshot.interval_encoded_histogram.clone(),
    }
}

fn load_line(total: u64, previous_total: u64, took: f64, test_time: f64) -> ClientRunTimeStats {
    let inference_rate = rate(total.saturating_sub(previous_total), took);
    let overall_rate = rate(total, test_time);
    print_line(&format!(
        "{},{:.2},{:.6E},{:.2}",
        Utc::now().timestamp(),
        inference_rate,
        total as f64,
        overall_rate
    ));
    ClientRunTimeStats {
        inference_rate,
        test_time,
        total_inferences: total,
        overall_rate,
        ..Default::default()
    }
}

/// Polls the collector every period until shutdown. Collection errors are fatal unless ignored.
pub async fn poll_metric_collector(
    mut collector: Box<dyn MetricCollector>,
    period: Duration,
    ignore_errors: bool,
    mut shutdown: watch::Receiver<bool>,
) -> Result<BTreeMap<i64, serde_json::Value>, BenchError> {
    let mut ticker = ticker(Instant::now(), period);
    let mut series = BTreeMap::new();
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => match collector.collect_run_time_metrics().await {
                Ok((timestamp, metrics)) => {
                    series.insert(timestamp, metrics);
                }
                Err(error) if ignore_errors => warn!("Ignoring runtime stats error: {error}"),
                Err(error) => return Err(error),
            },
            _ = shutdown.changed() => break,
        }
    }
    Ok(series)
}

fn ticker(start: Instant, period: Duration) -> Interval {
    let mut ticker = interval_at(start + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn rate(count: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        count as f64 / seconds
    } else {
        0.0
    }
}

pub(crate) fn unix_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Writes one line of benchmark output to stdout, failures are only logged.
pub(crate) fn print_line(line: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(error) = writeln!(stdout, "{line}") {
        warn!("Cannot write benchmark output: {error}");
    }
}
