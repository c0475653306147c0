use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{Result, ScanError};

/// A domain paired with the full port list to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub domain: String,
    pub ports: Arc<[u16]>,
}

/// Read one domain per line from `input` and queue a job for each non-empty line.
///
/// Only the line terminator (`\n` or `\r\n`) is removed; other surrounding
/// whitespace is part of the domain. Returns the number of jobs queued once
/// input is exhausted. Dropping `jobs` on return closes the queue.
pub async fn feed_jobs<R>(input: R, ports: Arc<[u16]>, jobs: mpsc::Sender<Job>) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(input);
    let mut buf = Vec::new();
    let mut queued = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(ScanError::Input)?;
        if read == 0 {
            break;
        }

        let domain = trim_line_ending(&buf);
        if domain.is_empty() {
            continue;
        }

        let job = Job {
            domain: String::from_utf8_lossy(domain).into_owned(),
            ports: Arc::clone(&ports),
        };
        trace!(domain = %job.domain, "queueing job");
        if jobs.send(job).await.is_err() {
            debug!("job queue closed by workers, stopping input");
            break;
        }
        queued += 1;
    }

    debug!(queued, "input exhausted");
    Ok(queued)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
