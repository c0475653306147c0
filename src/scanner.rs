pub mod client;
pub mod job;
pub mod policy;
mod results;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::output::ResultSink;

pub use client::{HttpProber, Prober, NOT_ALIVE};
pub use job::{feed_jobs, Job};
pub use policy::{candidate_urls, has_scheme, probe_port, PortOutcome};
pub use results::{ProbeResult, ScanSummary};

/// Queue shared by all workers; whoever holds the lock receives the next job.
type JobQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

#[derive(Debug, Default)]
struct ScanStats {
    jobs: AtomicUsize,
    probes: AtomicUsize,
    alive: AtomicUsize,
}

impl ScanStats {
    fn summary(&self) -> ScanSummary {
        ScanSummary {
            jobs: self.jobs.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            alive: self.alive.load(Ordering::Relaxed),
        }
    }
}

/// Fixed-size worker pool probing every job read from input.
pub struct Scanner {
    config: Arc<Config>,
    prober: Arc<dyn Prober>,
}

impl Scanner {
    pub fn new(config: Config, prober: Arc<dyn Prober>) -> Self {
        Self {
            config: Arc::new(config),
            prober,
        }
    }

    /// Scanner backed by one shared [`HttpProber`] built from the config.
    pub fn with_http_client(config: Config) -> Result<Self> {
        config.validate()?;
        let prober = HttpProber::new(config.timeout, config.workers)?;
        Ok(Self::new(config, Arc::new(prober)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Probe every domain read from `input`, writing alive endpoints to `output`.
    ///
    /// All workers are started before the first job is read. Returns once input
    /// is exhausted, every worker has drained the queue and the output has been
    /// flushed. A read error on `input` is returned immediately without waiting
    /// for workers still in flight.
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<ScanSummary>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let workers = self.config.workers;
        let (job_tx, job_rx) = mpsc::channel::<Job>(1);
        let (result_tx, result_rx) = mpsc::channel::<ProbeResult>(workers * 4);
        let queue: JobQueue = Arc::new(Mutex::new(job_rx));
        let stats = Arc::new(ScanStats::default());

        let sink = tokio::spawn(ResultSink::new(output, self.config.output_format).drain(result_rx));

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&self.prober),
                    result_tx.clone(),
                    Arc::clone(&stats),
                ))
            })
            .collect();
        // Workers own the only receiver and senders from here on, so the queue
        // closes for the reader if they all stop early.
        drop(queue);
        drop(result_tx);
        debug!(workers, "workers started");

        let queued = feed_jobs(input, Arc::clone(&self.config.ports), job_tx).await?;
        debug!(queued, "all jobs queued, waiting for workers");

        for handle in join_all(handles).await {
            handle?;
        }
        sink.await??;

        let summary = stats.summary();
        debug!(%summary, "sweep finished");
        Ok(summary)
    }
}

async fn worker(
    id: usize,
    queue: JobQueue,
    prober: Arc<dyn Prober>,
    results: mpsc::Sender<ProbeResult>,
    stats: Arc<ScanStats>,
) {
    debug!(worker = id, "worker started");

    loop {
        let job = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };
        let Some(job) = job else {
            break;
        };

        for &port in job.ports.iter() {
            let outcome = probe_port(prober.as_ref(), &job.domain, port).await;
            stats.probes.fetch_add(outcome.attempts, Ordering::Relaxed);

            if let Some(result) = outcome.result {
                stats.alive.fetch_add(1, Ordering::Relaxed);
                if results.send(result).await.is_err() {
                    debug!(worker = id, "result sink closed, worker stopping");
                    return;
                }
            }
        }
        stats.jobs.fetch_add(1, Ordering::Relaxed);
    }

    debug!(worker = id, "worker completed");
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Prober answering from a fixed URL -> status table and recording every call.
    pub struct ScriptedProber {
        answers: HashMap<String, u16>,
        calls: std::sync::Mutex<Vec<String>>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedProber {
        pub fn new(answers: &[(&str, u16)]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|(url, status)| (url.to_string(), *status))
                    .collect(),
                calls: std::sync::Mutex::new(Vec::new()),
                delay: Duration::ZERO,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, url: &str) -> u16 {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(url.to_string());

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.answers.get(url).copied().unwrap_or(NOT_ALIVE)
        }
    }
}
