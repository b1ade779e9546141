use crate::error::BenchError;
use human_repr::HumanCount;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::info;

const OUTPUT_BUFFER_SIZE: usize = 4 << 20;
const TENSOR_ELEMENT_SIZE: usize = std::mem::size_of::<f32>();

/// Deterministic source of fixed-width records holding little-endian `f32` tensors in [-1, 1).
pub struct RecordGenerator {
    record_size: usize,
    rng: StdRng,
}

impl RecordGenerator {
    pub fn new(record_size: usize, seed: u64) -> Self {
        Self {
            record_size,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn fill(&mut self, record: &mut [u8]) {
        let mut elements = record.chunks_exact_mut(TENSOR_ELEMENT_SIZE);
        for element in &mut elements {
            let value: f32 = self.rng.gen_range(-1.0..1.0);
            element.copy_from_slice(&value.to_le_bytes());
        }
        self.rng.fill(elements.into_remainder());
    }

    /// Writes `count` records and returns the number of bytes written.
    pub async fn write_records<W>(&mut self, writer: W, count: u64) -> Result<u64, BenchError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut writer = BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, writer);
        let mut record = vec![0u8; self.record_size];
        for _ in 0..count {
            self.fill(&mut record);
            writer.write_all(&record).await?;
        }
        writer.flush().await?;
        Ok(count * self.record_size as u64)
    }
}

/// Generates records into `output`, or stdout when not set.
pub async fn generate(
    record_size: usize,
    count: u64,
    seed: u64,
    output: Option<&Path>,
) -> Result<u64, BenchError> {
    let mut generator = RecordGenerator::new(record_size, seed);
    let written = match output {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .map_err(|source| BenchError::CannotWriteToFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            generator.write_records(file, count).await?
        }
        None => generator.write_records(tokio::io::stdout(), count).await?,
    };
    info!(
        "Generated {count} records of {record_size} bytes ({}) with seed {seed}",
        written.human_count_bytes()
    );
    Ok(written)
}
