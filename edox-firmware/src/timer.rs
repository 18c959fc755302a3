//! Deferred-callback facility: schedule a function to run after a delay.
//!
//! The queue is guarded by a critical-section mutex so callbacks may be
//! scheduled from interrupt context; the dispatcher runs as one of the
//! firmware's top-level futures and invokes due callbacks outside the lock.

use core::cell::RefCell;

use embassy_futures::select::{select, Either};
use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, CriticalSectionMutex},
    signal::Signal,
};
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;

pub type Callback = &'static (dyn Fn() + Sync);

#[derive(Clone, Copy)]
struct Entry {
    at: Instant,
    callback: Callback,
}

pub struct Scheduler<const N: usize> {
    queue: CriticalSectionMutex<RefCell<Vec<Entry, N>>>,
    changed: Signal<CriticalSectionRawMutex, ()>,
}

impl<const N: usize> Default for Scheduler<N> {
    fn default() -> Self {
        Self {
            queue: CriticalSectionMutex::new(RefCell::new(Vec::new())),
            changed: Signal::new(),
        }
    }
}

impl<const N: usize> Scheduler<N> {
    /// Run `callback` once, `after` from now. Returns false when the queue
    /// is full and the callback was not scheduled.
    pub fn schedule_after(&self, after: Duration, callback: Callback) -> bool {
        let at = Instant::now() + after;
        let ok = self.queue.lock(|q| {
            q.borrow_mut().push(Entry { at, callback }).is_ok()
        });
        if ok {
            self.changed.signal(());
        } else {
            crate::error!("timer queue full; callback dropped");
        }
        ok
    }

    fn next_due(&self) -> Option<Instant> {
        self.queue
            .lock(|q| q.borrow().iter().map(|e| e.at).min())
    }

    /// Remove and return the earliest entry due at `now`, if any.
    fn take_due(&self, now: Instant) -> Option<Callback> {
        self.queue.lock(|q| {
            let mut q = q.borrow_mut();
            let i = q
                .iter()
                .enumerate()
                .filter(|(_, e)| e.at <= now)
                .min_by_key(|(_, e)| e.at)
                .map(|(i, _)| i)?;
            Some(q.swap_remove(i).callback)
        })
    }

    pub async fn run(&self) {
        loop {
            match self.next_due() {
                None => self.changed.wait().await,
                Some(at) => {
                    if at > Instant::now() {
                        if let Either::Second(_) =
                            select(Timer::at(at), self.changed.wait()).await
                        {
                            continue;
                        }
                    }
                    while let Some(callback) = self.take_due(Instant::now()) {
                        callback();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "timer_test.rs"]
mod test;
