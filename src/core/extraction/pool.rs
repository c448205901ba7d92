//! Shared worker pool with per-job completion tickets

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use log::debug;

use crate::core::error::SyncError;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Blocking promise for one submitted job. `wait` parks the caller until
/// the worker reports, so batch completion costs no polling.
pub struct JobTicket<T> {
    receiver: Receiver<Result<T, SyncError>>,
}

impl<T> JobTicket<T> {
    pub fn wait(self) -> Result<T, SyncError> {
        match self.receiver.recv() {
            Ok(result) => result,
            // Worker dropped the sender without reporting: the pool died
            // under us.
            Err(_) => Err(SyncError::PoolShutDown),
        }
    }
}

/// Fixed-size thread pool. Workers pull tasks from one shared channel, so
/// submission order is queue order but completion order is unconstrained.
pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// `size` of 0 means one worker per logical CPU.
    pub fn new(size: usize) -> Self {
        let size = if size == 0 { num_cpus::get() } else { size };
        debug!("starting worker pool with {} workers", size);

        let (sender, receiver) = mpsc::channel::<Task>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                thread::spawn(move || loop {
                    let task = match receiver.lock() {
                        Ok(guard) => guard.recv(),
                        Err(_) => break,
                    };
                    match task {
                        Ok(task) => task(),
                        Err(_) => break,
                    }
                })
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Queue a job and hand back its completion ticket.
    pub fn submit<T, F>(&self, job: F) -> JobTicket<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, SyncError> + Send + 'static,
    {
        let (result_sender, receiver) = mpsc::channel();
        let task: Task = Box::new(move || {
            // The ticket may already be gone; nothing to do then.
            let _ = result_sender.send(job());
        });

        if let Some(sender) = &self.sender {
            // A failed send drops the task together with its result
            // sender, which resolves the ticket to PoolShutDown.
            let _ = sender.send(task);
        }

        JobTicket { receiver }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets every worker drain and exit.
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
