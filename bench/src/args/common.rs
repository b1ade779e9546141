use super::defaults::DEFAULT_DEBUG;
use super::kind::BenchmarkKindCommand;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AiBenchArgs {
    /// Benchmark kind
    #[command(subcommand)]
    pub command: BenchmarkKindCommand,

    /// Debug level, anything above 0 enables debug logs
    #[arg(long, global = true, default_value_t = DEFAULT_DEBUG, env = "AIBENCH_DEBUG")]
    pub debug: u8,

    /// Additionally write TRACE level logs to this file
    #[arg(long, global = true, env = "AIBENCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}
