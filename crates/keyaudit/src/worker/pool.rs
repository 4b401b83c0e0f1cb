use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info};

use crate::error::WorkerError;
use crate::worker::job::{JobHandler, ScanJob};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed-size pool of worker threads fed from a bounded job queue.
///
/// Results travel on an unbounded channel so a worker never blocks on a
/// dispatcher that is itself blocked submitting jobs.
pub struct WorkerPool<H: JobHandler> {
    job_sender: Sender<ScanJob>,
    result_receiver: Receiver<H::Output>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl<H: JobHandler> WorkerPool<H> {
    /// Spawns `worker_count` workers sharing `handler`. Setting `shutdown`
    /// makes every worker stop after its current file.
    pub fn new(
        handler: Arc<H>,
        worker_count: usize,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, WorkerError> {
        if worker_count == 0 {
            return Err(WorkerError::SpawnFailed(
                "worker_count must be > 0".to_string(),
            ));
        }

        let (job_sender, job_receiver) = bounded::<ScanJob>(worker_count * 2);
        let (result_sender, result_receiver) = unbounded::<H::Output>();

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let result_tx = result_sender.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_handler = Arc::clone(&handler);

            let handle = thread::Builder::new()
                .name(format!("scan-worker-{}", worker_id))
                .spawn(move || {
                    run_worker(worker_id, job_rx, result_tx, shutdown_flag, worker_handler);
                })
                .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Ok(Self {
            job_sender,
            result_receiver,
            workers,
            shutdown,
        })
    }

    /// Blocks while the queue is full. Fails once the pool is shutting down
    /// or every worker has exited.
    pub fn submit(&self, job: ScanJob) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        self.job_sender
            .send(job)
            .map_err(|_| WorkerError::ChannelClosed)
    }

    pub fn try_recv_result(&self) -> Option<H::Output> {
        self.result_receiver.try_recv().ok()
    }

    /// Stops dispatch and makes workers exit after their current job.
    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Closes the queue, waits for every worker, and hands back the result
    /// channel so the caller can drain what is left.
    pub fn wait(self) -> Receiver<H::Output> {
        // Drop sender to signal workers to exit once the queue is empty
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
        self.result_receiver
    }
}

fn run_worker<H: JobHandler>(
    worker_id: usize,
    job_receiver: Receiver<ScanJob>,
    result_sender: Sender<H::Output>,
    shutdown: Arc<AtomicBool>,
    handler: Arc<H>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(POLL_INTERVAL) {
            Ok(job) => {
                debug!("Worker {} handling entry {}", worker_id, job.index);

                let report = handler.handle(&job);

                if let Err(e) = result_sender.send(report) {
                    error!("Worker {} failed to send result: {}", worker_id, e);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}
