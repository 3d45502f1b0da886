//! Background recency tracker.
//!
//! One tracker thread per cache. It drains the bounded event queue and
//! applies each "touch" under the exclusive lock, moving the touched node to
//! the MRU position. The read path stays on the shared lock; all list
//! mutation triggered by reads funnels through here.
//!
//! Shutdown is flag-driven: the loop re-checks the cache's closed flag at
//! least once per poll interval and exits without draining what remains in
//! the queue. A hung consumer can therefore never hold up `close`.

use std::hash::Hash;
use std::sync::atomic::Ordering;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::cache::Shared;
use crate::ds::NodeHandle;

/// Upper bound on how long the tracker blocks waiting for an event before
/// re-checking the closed flag. Also bounds how long `Drop` waits to join.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Starts the tracker thread for `shared`, consuming touch events from
/// `events` until the cache closes or the sending side disconnects.
pub(crate) fn spawn<K, V>(shared: Arc<Shared<K, V>>, events: Receiver<NodeHandle>) -> JoinHandle<()>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    thread::spawn(move || run(shared, events))
}

fn run<K, V>(shared: Arc<Shared<K, V>>, events: Receiver<NodeHandle>)
where
    K: Clone + Eq + Hash,
{
    loop {
        if shared.closed.load(Ordering::Acquire) {
            return;
        }
        match events.recv_timeout(SHUTDOWN_POLL_INTERVAL) {
            Ok(handle) => {
                // Discard events that raced with close; the core is already
                // cleared and the handles are stale anyway.
                if shared.closed.load(Ordering::Acquire) {
                    return;
                }
                let mut core = shared.core.write();
                // The node may have been evicted, removed, or updated since
                // the event was queued; the generation check inside rejects
                // such stale handles.
                let _ = core.touch_handle(handle);
            },
            Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}
