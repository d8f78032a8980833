use std::{
    sync::{Arc, Condvar, Mutex, Weak},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};

use crate::{config::MLOG_CONFIG, error::ErrorReporter, rotation::RotatingFileSink};

pub enum Job {
    Record {
        sink: Arc<Mutex<RotatingFileSink>>,
        line: String,
        flush_now: bool,
        reporter: Arc<ErrorReporter>,
    },
    Shutdown,
}

struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

/// A pool of worker threads draining one bounded job queue.
///
/// `dispatch` blocks when the queue is full: producers wait rather than
/// drop records. Dropping the pool shuts every worker down and joins it.
pub struct WorkerPool {
    sender: Sender<Job>,
    pending: Arc<Pending>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(threads: usize, capacity: usize) -> Self {
        let (sender, receiver) = bounded::<Job>(capacity);
        let pending = Arc::new(Pending {
            count: Mutex::new(0),
            idle: Condvar::new(),
        });
        let workers = (0..threads)
            .map(|_| {
                let receiver = receiver.clone();
                let pending = Arc::clone(&pending);
                std::thread::spawn(move || worker_loop(receiver, pending))
            })
            .collect();
        Self {
            sender,
            pending,
            workers: Mutex::new(workers),
        }
    }

    pub fn size(&self) -> usize {
        self.workers.lock().unwrap().len()
    }

    pub fn dispatch(&self, job: Job) {
        let counted = matches!(job, Job::Record { .. });
        if counted {
            *self.pending.count.lock().unwrap() += 1;
        }
        if self.sender.send(job).is_err() && counted {
            let mut count = self.pending.count.lock().unwrap();
            *count -= 1;
            if *count == 0 {
                self.pending.idle.notify_all();
            }
        }
    }

    /// Blocks until every dispatched record has been written.
    pub fn wait_idle(&self) {
        let mut count = self.pending.count.lock().unwrap();
        while *count > 0 {
            count = self.pending.idle.wait(count).unwrap();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let workers = std::mem::take(&mut *self.workers.lock().unwrap());
        for _ in &workers {
            let _ = self.sender.send(Job::Shutdown);
        }
        for handle in workers {
            let _ = handle.join();
        }
    }
}

fn worker_loop(receiver: Receiver<Job>, pending: Arc<Pending>) {
    let flush_interval = Duration::from_millis(MLOG_CONFIG.FLUSH_INTERVAL_MS);
    let mut last_flush = Instant::now();
    let mut last_sink: Option<(Arc<Mutex<RotatingFileSink>>, Arc<ErrorReporter>)> = None;
    loop {
        let elapsed = last_flush.elapsed();
        let timeout = if elapsed >= flush_interval {
            Duration::from_millis(1)
        } else {
            flush_interval - elapsed
        };

        match receiver.recv_timeout(timeout) {
            Ok(Job::Record {
                sink,
                line,
                flush_now,
                reporter,
            }) => {
                {
                    let mut guard = sink.lock().unwrap();
                    if let Err(e) = guard.write(&line) {
                        reporter.report("log", &e.to_string());
                    }
                    if flush_now && let Err(e) = guard.flush() {
                        reporter.report("flush", &e.to_string());
                    }
                }
                last_sink = Some((sink, reporter));
                let mut count = pending.count.lock().unwrap();
                *count -= 1;
                if *count == 0 {
                    pending.idle.notify_all();
                }
            }
            Ok(Job::Shutdown) => {
                flush_last(&last_sink);
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if last_flush.elapsed() >= flush_interval {
                    flush_last(&last_sink);
                    last_flush = Instant::now();
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                flush_last(&last_sink);
                break;
            }
        }
    }
}

fn flush_last(last_sink: &Option<(Arc<Mutex<RotatingFileSink>>, Arc<ErrorReporter>)>) {
    if let Some((sink, reporter)) = last_sink
        && let Err(e) = sink.lock().unwrap().flush()
    {
        reporter.report("flush", &e.to_string());
    }
}

static SHARED_POOL: Mutex<Weak<WorkerPool>> = Mutex::new(Weak::new());

/// Process-wide pool shared across managers and reinitializations.
///
/// A live pool is reused as-is; its original thread count wins over
/// `threads`. Once the last owner drops its handle the workers are joined,
/// and the next call builds a fresh pool.
pub fn shared_pool(threads: usize, capacity: usize) -> Arc<WorkerPool> {
    let mut slot = SHARED_POOL.lock().unwrap();
    if let Some(pool) = slot.upgrade() {
        return pool;
    }
    let pool = Arc::new(WorkerPool::new(threads, capacity));
    *slot = Arc::downgrade(&pool);
    pool
}
