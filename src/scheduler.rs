//! Cancellable scheduling primitives for the single-threaded event loop.
//!
//! Nothing here owns a thread. The runtime delivers `Tick` events; the
//! timers consult a [`PollTicker`] to decide whether a tick is theirs, and a
//! [`Scheduler`] to release delayed work once it falls due.

/// Identifies one run of a [`PollTicker`]. A token from an earlier run is
/// never accepted again, so a tick queued before `stop` cannot act on a
/// session started afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    generation: u64,
}

#[derive(Debug, Default, Clone)]
pub struct PollTicker {
    generation: u64,
    running: bool,
}

impl PollTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking. Starting a running ticker keeps the current run.
    pub fn start(&mut self) -> TickToken {
        if !self.running {
            self.generation += 1;
            self.running = true;
        }
        TickToken {
            generation: self.generation,
        }
    }

    /// Stop ticking; a no-op when already stopped.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Token for the current run, if any.
    pub fn token(&self) -> Option<TickToken> {
        self.running.then_some(TickToken {
            generation: self.generation,
        })
    }

    pub fn accepts(&self, token: TickToken) -> bool {
        self.running && token.generation == self.generation
    }
}

#[derive(Debug, Clone)]
struct Task<T> {
    seq: u64,
    due_ms: u64,
    item: T,
}

/// Delayed items released in due-time order; items due together keep their
/// scheduling order.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    next_seq: u64,
    tasks: Vec<Task<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            tasks: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, item: T) {
        self.next_seq += 1;
        self.tasks.push(Task {
            seq: self.next_seq,
            due_ms,
            item,
        });
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Remove and return every item due at or before `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<T> {
        let (mut due, rest): (Vec<Task<T>>, Vec<Task<T>>) =
            self.tasks.drain(..).partition(|t| t.due_ms <= now_ms);
        self.tasks = rest;
        due.sort_by_key(|t| (t.due_ms, t.seq));
        due.into_iter().map(|t| t.item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_start_is_idempotent() {
        let mut ticker = PollTicker::new();
        let first = ticker.start();
        let second = ticker.start();
        assert_eq!(first, second);
        assert!(ticker.is_running());
    }

    #[test]
    fn test_ticker_stop_is_idempotent() {
        let mut ticker = PollTicker::new();
        ticker.stop();
        assert!(!ticker.is_running());
        ticker.start();
        ticker.stop();
        ticker.stop();
        assert!(!ticker.is_running());
        assert!(ticker.token().is_none());
    }

    #[test]
    fn test_stale_token_rejected_after_restart() {
        let mut ticker = PollTicker::new();
        let stale = ticker.start();
        ticker.stop();
        assert!(!ticker.accepts(stale));
        let fresh = ticker.start();
        assert!(!ticker.accepts(stale));
        assert!(ticker.accepts(fresh));
    }

    #[test]
    fn test_scheduler_releases_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(800, "third");
        scheduler.schedule(0, "first");
        scheduler.schedule(400, "second");
        scheduler.schedule(400, "second again");

        assert_eq!(scheduler.take_due(0), vec!["first"]);
        assert_eq!(scheduler.take_due(500), vec!["second", "second again"]);
        assert_eq!(scheduler.take_due(10_000), vec!["third"]);
        assert!(scheduler.take_due(20_000).is_empty());
    }

    #[test]
    fn test_scheduler_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, 1);
        scheduler.schedule(200, 2);
        scheduler.cancel_all();
        assert!(scheduler.take_due(1_000).is_empty());

        scheduler.schedule(100, 3);
        assert_eq!(scheduler.take_due(1_000), vec![3]);
    }
}
