// ==============================================
// LIFECYCLE TESTS (integration)
// ==============================================
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use memoria::prelude::*;

#[test]
fn close_releases_entries_and_disables_operations() {
    let cache: Memoria<u64, String> = Memoria::new(8).unwrap();
    for k in 0..8 {
        cache.put(k, format!("value-{}", k));
    }
    assert_eq!(cache.len(), 8);

    cache.close();

    assert!(cache.is_closed());
    assert_eq!(cache.len(), 0);
    assert!(cache.keys().is_empty());
    for k in 0..8 {
        assert_eq!(cache.get(&k), None);
    }

    // Mutators degrade to no-ops.
    assert!(cache.put(100, "late".to_string()).is_none());
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.remove(&100), None);
    assert_eq!(cache.pop_lru(), None);
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn close_is_idempotent() {
    let cache: Memoria<u64, u64> = Memoria::new(4).unwrap();
    cache.put(1, 10);

    cache.close();
    cache.close();
    cache.close();

    assert!(cache.is_closed());
    assert_eq!(cache.len(), 0);
}

#[test]
fn concurrent_close_runs_teardown_once() {
    // Many threads race to close; the closed flag hands teardown to exactly
    // one of them and the rest return immediately. Observable outcome: no
    // panic, no deadlock, cache empty and closed.
    let cache: Arc<Memoria<u64, u64>> = Arc::new(Memoria::new(64).unwrap());
    for k in 0..64 {
        cache.put(k, k);
    }

    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));
    let closers = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            let closers = Arc::clone(&closers);
            thread::spawn(move || {
                barrier.wait();
                cache.close();
                closers.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(closers.load(Ordering::SeqCst), num_threads);
    assert!(cache.is_closed());
    assert!(cache.is_empty());
}

#[test]
fn close_races_with_readers_and_writers() {
    let cache: Arc<Memoria<u64, u64>> = Arc::new(Memoria::new(128).unwrap());
    for k in 0..128 {
        cache.put(k, k * 3);
    }

    let workers: Vec<_> = (0..4)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..20_000u64 {
                    let key = (thread_id + i) % 128;
                    if i % 4 == 0 {
                        cache.put(key, key * 3);
                    } else if let Some(v) = cache.get(&key) {
                        // A hit taken before close still returns an intact
                        // value; after close everything misses.
                        assert_eq!(*v, key * 3);
                    }
                    if cache.is_closed() {
                        break;
                    }
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(5));
    cache.close();

    for handle in workers {
        handle.join().unwrap();
    }

    assert!(cache.is_closed());
    assert!(cache.is_empty());
    assert_eq!(cache.get(&0), None);
}

#[test]
fn close_returns_promptly() {
    // Close signals and returns; it never waits for the tracker to drain.
    let cache: Arc<Memoria<u64, u64>> = Arc::new(
        MemoriaBuilder::new(16)
            .event_queue_capacity(1)
            .try_build()
            .unwrap(),
    );
    for k in 0..16 {
        cache.put(k, k);
    }
    // Saturate the tiny queue.
    for _ in 0..100 {
        for k in 0..16 {
            let _ = cache.get(&k);
        }
    }

    let start = Instant::now();
    cache.close();
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_secs(1),
        "close took {:?}, should not wait on the tracker",
        elapsed
    );
    assert!(cache.is_empty());
}

#[test]
fn drop_joins_the_tracker() {
    // Dropping the cache must stop the tracker thread even without an
    // explicit close. If the join hung, this test would time out.
    let cache: Memoria<u64, u64> = Memoria::new(8).unwrap();
    cache.put(1, 1);
    let _ = cache.get(&1);
    drop(cache);
}

#[test]
fn new_cache_is_usable_after_another_was_closed() {
    // Each cache owns its tracker; lifecycles are independent.
    let first: Memoria<u64, u64> = Memoria::new(4).unwrap();
    first.put(1, 10);
    first.close();

    let second: Memoria<u64, u64> = Memoria::new(4).unwrap();
    second.put(1, 11);
    assert_eq!(second.get(&1).map(|v| *v), Some(11));
    assert!(!second.is_closed());
}
