use crate::error::BenchError;
use crate::utils::pool::ReusePool;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tracing::{debug, trace};

/// Read buffer of the input stream.
pub const INPUT_BUFFER_SIZE: usize = 4 << 20;

pub type RecordPool = ReusePool<Vec<u8>>;

pub fn new_record_pool(capacity: usize, record_size: usize) -> RecordPool {
    ReusePool::new(capacity, move || Vec::with_capacity(record_size))
}

/// One fixed-width unit of work, owned by a single worker until returned to the pool.
#[derive(Debug)]
pub struct Record {
    pub sequence: u64,
    pub payload: Vec<u8>,
}

pub type InputStream = Box<dyn AsyncRead + Unpin + Send>;

/// Opens the given file, or stdin when no path is set.
pub async fn open_input(path: Option<&Path>) -> Result<InputStream, BenchError> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|source| BenchError::CannotOpenInput {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}

pub struct Producer<R> {
    reader: BufReader<R>,
    record_size: usize,
    limit: u64,
    pool: Arc<RecordPool>,
}

impl<R: AsyncRead + Unpin> Producer<R> {
    pub fn new(input: R, record_size: usize, limit: u64, pool: Arc<RecordPool>) -> Self {
        Self {
            reader: BufReader::with_capacity(INPUT_BUFFER_SIZE, input),
            record_size,
            limit,
            pool,
        }
    }

    /// Sends records in input order until `limit` (0 = unlimited) or a clean end of input.
    /// Returns the number of records sent.
    pub async fn produce(mut self, sink: flume::Sender<Record>) -> Result<u64, BenchError> {
        let mut produced = 0u64;
        while self.limit == 0 || produced < self.limit {
            let mut payload = self.pool.get();
            payload.resize(self.record_size, 0);
            let read = self.read_record(&mut payload).await?;
            if read == 0 {
                self.pool.put(payload);
                debug!("Reached end of input after {produced} records");
                break;
            }
            if read < self.record_size {
                return Err(BenchError::TruncatedRecord {
                    record: produced,
                    expected: self.record_size,
                    read,
                });
            }

            trace!("Dispatching record #{produced}");
            sink.send_async(Record {
                sequence: produced,
                payload,
            })
            .await
            .map_err(|_| BenchError::DispatchChannelClosed)?;
            produced += 1;
        }
        Ok(produced)
    }

    /// Fills `buffer` completely unless the stream ends first, returns the bytes read.
    async fn read_record(&mut self, buffer: &mut [u8]) -> Result<usize, BenchError> {
        let mut filled = 0;
        while filled < buffer.len() {
            match self.reader.read(&mut buffer[filled..]).await {
                Ok(0) => break,
                Ok(read) => filled += read,
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            }
        }
        Ok(filled)
    }
}
