pub mod counters;
pub mod pool;
pub mod profile;

use crate::error::BenchError;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Resolves the PRNG seed, 0 means "derive it from the wall clock".
pub fn resolve_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(1)
}

pub fn write_output_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BenchError> {
    std::fs::write(path, contents).map_err(|source| BenchError::CannotWriteToFile {
        path: path.to_path_buf(),
        source,
    })
}
