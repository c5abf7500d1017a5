//! Worker pool and dispatch
//!
//! Runs the selected action over every queued item across a bounded pool of
//! scoped threads, classifying failures at the worker boundary and folding
//! worker-local flags into one aggregate outcome.

use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;
use std::thread;

use super::diagnostics;
use super::{Action, ItemError, WorkQueue};

/// Drains the queue with `min(available_parallelism, queue len)` workers and
/// returns whether any item failed.
///
/// Per-item failures never stop the pool; every item is attempted so one run
/// surfaces every problem file. A worker panic is an environment fault and
/// propagates, taking the process down. After the pool finishes, the
/// action's success or failure hook runs once, provided at least one item
/// was processed.
pub fn dispatch(action: &dyn Action, queue: WorkQueue) -> bool {
    let total = queue.len();
    if total == 0 {
        return false;
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(total);

    // Serializes whole per-item diagnostic blocks so concurrent workers
    // cannot interleave the lines of two excerpts.
    let print_lock = Mutex::new(());
    let color = io::stderr().is_terminal();

    let any_failed = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| scope.spawn(|| drain(action, &queue, &print_lock, color)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .fold(false, |aggregate, failed| aggregate || failed)
    });

    if any_failed {
        action.on_any_failed();
    } else {
        action.on_all_succeeded();
    }
    any_failed
}

/// One worker: pop until empty, run the action, classify the outcome.
fn drain(action: &dyn Action, queue: &WorkQueue, print_lock: &Mutex<()>, color: bool) -> bool {
    let mut failed = false;

    while let Some(item) = queue.pop() {
        match action.run(&item) {
            Ok(()) => {}
            Err(ItemError::Parse(failure)) => {
                failed = true;
                let _guard = print_lock
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                let stderr = io::stderr();
                let mut err = stderr.lock();
                let _ = writeln!(err, "{}: {}", item.path_display(), failure.message);
                if let Some(source) = item.cached_source() {
                    let _ = diagnostics::render(&mut err, source, &failure, item.handler(), color);
                }
            }
            // The action already warned with the item's path.
            Err(ItemError::FormatMismatch | ItemError::NonIdempotent) => {
                failed = true;
            }
            Err(ItemError::Other(error)) => {
                failed = true;
                let _guard = print_lock
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                eprintln!("{}: {:?}", item.path_display(), error);
            }
        }
    }

    failed
}
