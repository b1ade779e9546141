use aibench::args::common::AiBenchArgs;
use aibench::args::kind::BenchmarkKindCommand;
use aibench::benchmark_runner::BenchmarkRunner;
use aibench::error::BenchError;
use aibench::generator::generate;
use aibench::load_runner::LoadRunner;
use aibench::logging::Logging;
use aibench::processors::host_metrics::HostMetricCollector;
use aibench::processors::synthetic::SyntheticFactory;
use aibench::utils::resolve_seed;
use clap::Parser;
use serde_json::json;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), BenchError> {
    let args = AiBenchArgs::parse();
    let mut logging = Logging::new();
    logging.init(args.debug, args.log_file.as_deref())?;

    let result = run(args).await;
    if let Err(error) = &result {
        error!("Benchmark failed: {error}");
    }
    result
}

async fn run(args: AiBenchArgs) -> Result<(), BenchError> {
    match args.command {
        BenchmarkKindCommand::Inference(inference) => {
            let config = inference.to_configuration(args.debug);
            info!("Using random seed {}", config.seed);
            let backend = inference.synthetic.backend_config(&config, 1);
            let mut runner = BenchmarkRunner::new(config)?.with_db_specific_config(
                "synthetic",
                json!({
                    "latency_us": backend.latency.as_micros() as u64,
                    "jitter_us": backend.jitter.as_micros() as u64,
                    "timeout_us": backend.timeout.as_micros() as u64,
                    "stages": backend.stages,
                }),
            );
            if inference.collect_host_metrics {
                runner = runner.with_metric_collector(Box::new(HostMetricCollector::new()));
            }
            let report = runner.run(&SyntheticFactory::new(backend)).await?;
            report.result.print_summary();
        }
        BenchmarkKindCommand::Load(load) => {
            let config = load.run.to_configuration(args.debug);
            info!("Using random seed {}", config.seed);
            let backend = load
                .synthetic
                .backend_config(&config, load.commands_per_record.get());
            let report = LoadRunner::new(config)?
                .run(&SyntheticFactory::new(backend))
                .await?;
            report.result.print_summary();
        }
        BenchmarkKindCommand::Generate(generate_args) => {
            let seed = resolve_seed(generate_args.seed);
            generate(
                generate_args.record_size.get(),
                generate_args.count,
                seed,
                generate_args.output.as_deref(),
            )
            .await?;
        }
    }
    Ok(())
}
