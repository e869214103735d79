//! Process-wide command accounting.
//!
//! Each executing command holds a [`CommandPermit`]; transports that need a
//! quiet moment (bulk export, shutdown) wait on [`CommandGuard::block_until_idle`]
//! instead of taking every game lock in turn.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Counts commands currently executing anywhere in the process.
#[derive(Debug, Default)]
pub struct CommandGuard {
    in_flight: AtomicUsize,
}

impl CommandGuard {
    #[must_use]
    pub fn new() -> Self {
        CommandGuard {
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Register one executing command. The count drops with the permit.
    pub fn begin(&self) -> CommandPermit<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        CommandPermit { guard: self }
    }

    /// Number of commands executing right now.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Whether any command is executing right now.
    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.in_flight() > 0
    }

    /// Wait until no commands are executing, checking every `poll`.
    ///
    /// Commands that start after a check may still be running when this
    /// returns; callers wanting a hard fence must also stop admitting new
    /// commands.
    pub fn block_until_idle(&self, poll: Duration) {
        while self.in_progress() {
            std::thread::sleep(poll);
        }
    }
}

/// RAII registration of one executing command.
#[derive(Debug)]
pub struct CommandPermit<'a> {
    guard: &'a CommandGuard,
}

impl Drop for CommandPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permits_count_in_flight() {
        let guard = CommandGuard::new();
        assert!(!guard.in_progress());
        assert_eq!(guard.in_flight(), 0);

        let first = guard.begin();
        let second = guard.begin();
        assert_eq!(guard.in_flight(), 2);

        drop(first);
        assert_eq!(guard.in_flight(), 1);
        drop(second);
        assert!(!guard.in_progress());
    }

    #[test]
    fn test_block_until_idle_waits_for_drain() {
        let guard = CommandGuard::new();
        std::thread::scope(|scope| {
            let permit = guard.begin();
            scope.spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                drop(permit);
            });
            guard.block_until_idle(Duration::from_millis(1));
            assert!(!guard.in_progress());
        });
    }

    #[test]
    fn test_idle_guard_does_not_block() {
        let guard = CommandGuard::new();
        guard.block_until_idle(Duration::from_millis(1));
        assert_eq!(guard.in_flight(), 0);
    }
}
