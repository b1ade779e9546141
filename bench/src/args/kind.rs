use super::generate::GenerateArgs;
use super::run::{InferenceArgs, LoadArgs};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum BenchmarkKindCommand {
    #[command(
        about = "Inference benchmark",
        long_about = "N workers sending the input records as inference queries to the synthetic backend",
        visible_alias = "i",
        verbatim_doc_comment
    )]
    Inference(InferenceArgs),

    #[command(
        about = "Load benchmark",
        long_about = "N workers populating the synthetic backend with the input records",
        visible_alias = "l",
        verbatim_doc_comment
    )]
    Load(LoadArgs),

    #[command(
        about = "Generate input records",
        long_about = "Writes fixed-width records of random little-endian f32 tensors",
        visible_alias = "g",
        verbatim_doc_comment
    )]
    Generate(GenerateArgs),
}
