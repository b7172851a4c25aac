//! Small fire-and-forget worker pool.
//!
//! A fixed number of threads drain a bounded queue. When the queue is full new
//! jobs are rejected rather than piling up threads.

use std::{
	sync::{
		Arc, Mutex,
		mpsc::{self, Receiver, SyncSender, TrySendError},
	},
	thread::JoinHandle,
};

use crate::BotError;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct TaskPool {
	tx: Option<SyncSender<Job>>,
	workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
	pub fn new(name: &str, workers: usize, queue: usize) -> Result<Self, BotError> {
		let (tx, rx) = mpsc::sync_channel::<Job>(queue);
		let rx = Arc::new(Mutex::new(rx));

		let workers = (0..workers.max(1))
			.map(|i| {
				let rx = rx.clone();
				std::thread::Builder::new()
					.name(format!("{name}-{i}"))
					.spawn(move || worker(rx))
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self { tx: Some(tx), workers })
	}

	/// Queue a job. Returns `false` if the queue is full and the job was dropped.
	pub fn spawn(&self, job: impl FnOnce() + Send + 'static) -> bool {
		let Some(tx) = &self.tx else { return false };
		match tx.try_send(Box::new(job)) {
			Ok(()) => true,
			Err(TrySendError::Full(_)) => {
				tracing::warn!("task queue full; dropping job");
				false
			}
			Err(TrySendError::Disconnected(_)) => false,
		}
	}
}

impl Drop for TaskPool {
	/// Queued and running jobs finish before the workers exit.
	fn drop(&mut self) {
		self.tx.take();
		for handle in self.workers.drain(..) {
			let _ = handle.join();
		}
	}
}

fn worker(rx: Arc<Mutex<Receiver<Job>>>) {
	loop {
		// Hold the lock only while waiting for the next job.
		let job = {
			let rx = rx.lock().expect("task queue lock poisoned");
			rx.recv()
		};
		match job {
			Ok(job) => job(),
			Err(_) => break,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration,
	};

	#[test]
	fn runs_jobs_before_drop_returns() {
		let counter = Arc::new(AtomicUsize::new(0));
		{
			let pool = TaskPool::new("test", 2, 8).unwrap();
			for _ in 0..5 {
				let counter = counter.clone();
				assert!(pool.spawn(move || {
					counter.fetch_add(1, Ordering::SeqCst);
				}));
			}
		}
		assert_eq!(counter.load(Ordering::SeqCst), 5);
	}

	#[test]
	fn full_queue_rejects() {
		let pool = TaskPool::new("test", 1, 1).unwrap();
		let (started_tx, started_rx) = mpsc::channel();
		let (release_tx, release_rx) = mpsc::channel::<()>();

		// Occupy the only worker.
		assert!(pool.spawn(move || {
			started_tx.send(()).unwrap();
			let _ = release_rx.recv();
		}));
		started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

		// One slot in the queue, then full.
		assert!(pool.spawn(|| {}));
		assert!(!pool.spawn(|| {}));

		release_tx.send(()).unwrap();
	}
}
