use std::io;
use std::path::Path;

use clap::ValueEnum;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::scanner::ProbeResult;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    #[value(name = "plain", help = "One \"<url> <status>\" line per alive endpoint")]
    Plain,
    #[value(name = "json", help = "One JSON object per alive endpoint")]
    Json,
}

/// Boxed writer the sink can own: stdout or a file.
pub type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// Open the result destination: the given file (created or truncated), or stdout.
pub async fn open_writer(path: Option<&Path>) -> Result<BoxedWriter> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .map_err(ScanError::Output)?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}

/// Serializes probe results as lines on an output stream.
pub struct ResultSink<W> {
    writer: W,
    format: OutputFormat,
}

impl<W: AsyncWrite + Unpin> ResultSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Render one result as a newline-terminated line.
    pub fn format_line(&self, result: &ProbeResult) -> Result<String> {
        let mut line = match self.format {
            OutputFormat::Plain => result.to_string(),
            OutputFormat::Json => serde_json::to_string(result)
                .map_err(|e| ScanError::Output(io::Error::other(e)))?,
        };
        line.push('\n');
        Ok(line)
    }

    /// Write a single line in one call and flush it through.
    pub async fn write(&mut self, result: &ProbeResult) -> Result<()> {
        let line = self.format_line(result)?;
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(ScanError::Output)?;
        self.writer.flush().await.map_err(ScanError::Output)
    }

    /// Write every result received until all senders are gone, then flush.
    pub async fn drain(mut self, mut results: mpsc::Receiver<ProbeResult>) -> Result<usize> {
        let mut written = 0;
        while let Some(result) = results.recv().await {
            self.write(&result).await?;
            written += 1;
        }
        self.writer.flush().await.map_err(ScanError::Output)?;
        self.writer.shutdown().await.map_err(ScanError::Output)?;
        debug!(written, "result sink closed");
        Ok(written)
    }
}
