use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, warn};

use super::reorder::ReorderBuffer;
use crate::error::{CombyteError, Result};

/*
    The pool has three roles:
      - one splitter thread that numbers the input and feeds the job queue,
      - W worker threads that turn jobs into results,
      - the calling thread, which is the only writer and puts results back in order.

    Both queues hold W entries. A full job queue stalls the splitter and a full result
    queue stalls the workers, so memory stays bounded when the writer is slow.

    The writer never stops draining results, so the queues alone do not bound the
    reorder buffer when an early block is slow. The splitter also takes a credit from
    a channel of 2W slots before each job, and the writer returns one credit for every
    result it flushes. At most 2W blocks are ever between the splitter and the sink.

    Shutdown needs no signal. When the splitter finishes it drops its sender and the
    workers drain the queue and exit. When the writer gives up on an error it drops
    its receivers, the workers' next send fails, they exit, and the splitter's next
    send fails in turn.
*/

/// Blocks allowed between the splitter and the sink, per worker.
const CREDITS_PER_WORKER: usize = 2;

/// A unit of work or its result, tagged with its place in the stream.
pub struct Job<T> {
    pub seq: u64,
    pub data: T,
}

/// Handed to the splitter. Sequence numbers are assigned here so they are always contiguous.
pub struct Feeder<T> {
    tx: Sender<Job<T>>,
    credits: Sender<()>,
    next: u64,
}

impl<T> Feeder<T> {
    /// Queue the next job, blocking while too many blocks are in flight or the queue is full.
    /// Returns false once nobody is left to take jobs, in which case the splitter should stop.
    pub fn push(&mut self, data: T) -> bool {
        if self.credits.send(()).is_err() {
            return false;
        }
        let job = Job {
            seq: self.next,
            data,
        };
        if self.tx.send(job).is_err() {
            return false;
        }
        self.next += 1;
        true
    }

    /// Jobs queued so far.
    pub fn count(&self) -> u64 {
        self.next
    }
}

/// Worker count when the caller does not choose one.
pub fn default_workers() -> usize {
    match thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            warn!("Can't determine available parallelism ({}), using one worker.", e);
            1
        }
    }
}

/// Run splitter -> workers -> writer. `sink` sees every result exactly once, in the order the
/// splitter produced the inputs. Returns the number of results written.
pub fn run_pipeline<I, O, S, F, K>(
    workers: usize,
    splitter: S,
    work: F,
    mut sink: K,
) -> Result<u64>
where
    I: Send,
    O: Send,
    S: FnOnce(&mut Feeder<I>) -> Result<()> + Send,
    F: Fn(I) -> Result<O> + Sync,
    K: FnMut(O) -> Result<()>,
{
    let workers = workers.max(1);
    let work = &work;

    thread::scope(|s| {
        let (job_tx, job_rx) = bounded::<Job<I>>(workers);
        let (result_tx, result_rx) = bounded::<Job<Result<O>>>(workers);
        let (credit_tx, credit_rx) = bounded::<()>(CREDITS_PER_WORKER * workers);

        let splitter_handle = thread::Builder::new()
            .name("combyte-splitter".to_string())
            .spawn_scoped(s, move || {
                let mut feeder = Feeder {
                    tx: job_tx,
                    credits: credit_tx,
                    next: 0,
                };
                let result = splitter(&mut feeder);
                (feeder.count(), result)
            })
            .map_err(|e| CombyteError::Pipeline(format!("failed to start splitter: {}", e)))?;

        for id in 0..workers {
            let rx = job_rx.clone();
            let tx = result_tx.clone();
            thread::Builder::new()
                .name(format!("combyte-worker-{}", id))
                .spawn_scoped(s, move || worker(rx, tx, work))
                .map_err(|e| CombyteError::Pipeline(format!("failed to start worker: {}", e)))?;
        }
        // Only the threads may hold queue ends from here on, or the queues never close.
        drop(job_rx);
        drop(result_tx);

        let mut reorder = ReorderBuffer::new();
        let written = write_in_order(&result_rx, &credit_rx, &mut reorder, &mut sink);
        drop(result_rx);
        drop(credit_rx);

        let (fed, split_result) = splitter_handle
            .join()
            .map_err(|_| CombyteError::Pipeline("splitter thread panicked".to_string()))?;

        // Prefer reporting the first failure the writer saw.
        let written = written?;
        split_result?;

        if written != fed || !reorder.is_empty() {
            return Err(CombyteError::Pipeline(format!(
                "{} of {} blocks never reached the writer",
                fed - written,
                fed
            )));
        }
        debug!(
            "Pipeline wrote {} blocks with {} workers, holding at most {} out of order",
            written,
            workers,
            reorder.peak()
        );
        Ok(written)
    })
}

fn worker<I, O, F>(rx: Receiver<Job<I>>, tx: Sender<Job<Result<O>>>, work: &F)
where
    F: Fn(I) -> Result<O>,
{
    for job in rx.iter() {
        let data = work(job.data);
        if tx.send(Job { seq: job.seq, data }).is_err() {
            // Writer is gone.
            break;
        }
    }
}

/// The single writer. Stops at the first failed result or sink error.
fn write_in_order<O, K>(
    results: &Receiver<Job<Result<O>>>,
    credits: &Receiver<()>,
    reorder: &mut ReorderBuffer<O>,
    sink: &mut K,
) -> Result<u64>
where
    K: FnMut(O) -> Result<()>,
{
    let mut written = 0;
    for job in results.iter() {
        reorder.insert(job.seq, job.data?)?;
        while let Some(item) = reorder.pop_ready() {
            sink(item)?;
            written += 1;
            // The splitter paid for this block before queueing it, so the credit is there.
            if credits.try_recv().is_err() {
                return Err(CombyteError::Pipeline(format!(
                    "block {} was written without a credit",
                    written - 1
                )));
            }
        }
    }
    Ok(written)
}
