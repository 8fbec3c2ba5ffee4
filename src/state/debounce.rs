/// Debounced search term
///
/// Holds the raw value (updated on every keystroke) and the settled value
/// (the one fetches use). Every `schedule` hands out a new `Ticket` and
/// invalidates all earlier ones, so only the last value scheduled before a
/// quiet period can ever settle. The UI pairs each ticket with a timer task
/// that calls `settle` once the delay has elapsed.

use std::time::Duration;

/// Identifies one scheduled update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    raw: String,
    settled: String,
    generation: u64,
    pending: Option<Ticket>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            raw: String::new(),
            settled: String::new(),
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The value as typed
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The last value that stayed unchanged for the full delay
    #[cfg(test)]
    pub fn settled(&self) -> &str {
        &self.settled
    }

    /// Record a new raw value and supersede any pending update
    pub fn schedule(&mut self, value: impl Into<String>) -> Ticket {
        self.raw = value.into();
        self.generation += 1;
        let ticket = Ticket(self.generation);
        self.pending = Some(ticket);
        ticket
    }

    /// Called when a ticket's delay has elapsed.
    ///
    /// Returns the newly settled value only if the ticket is still the
    /// pending one and the value actually changed. Each ticket settles at
    /// most once.
    pub fn settle(&mut self, ticket: Ticket) -> Option<&str> {
        if self.pending != Some(ticket) {
            return None;
        }
        self.pending = None;

        if self.raw == self.settled {
            return None;
        }

        self.settled = self.raw.clone();
        Some(&self.settled)
    }

    /// Drop the pending update, e.g. on teardown
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// A value is waiting for its quiet period
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer() -> Debouncer {
        Debouncer::new(Duration::from_millis(500))
    }

    #[test]
    fn test_rapid_updates_emit_only_final_value() {
        let mut search = debouncer();

        let tickets: Vec<Ticket> = ["c", "ch", "cha", "chai", "chair"]
            .into_iter()
            .map(|v| search.schedule(v))
            .collect();

        // Timers for superseded values fire first and must be ignored
        for ticket in &tickets[..tickets.len() - 1] {
            assert_eq!(search.settle(*ticket), None);
        }
        assert_eq!(search.settled(), "");

        assert_eq!(search.settle(*tickets.last().unwrap()), Some("chair"));
        assert_eq!(search.settled(), "chair");
    }

    #[test]
    fn test_single_update_emitted_exactly_once() {
        let mut search = debouncer();

        let ticket = search.schedule("table");
        assert!(search.is_pending());
        assert_eq!(search.raw(), "table");
        assert_eq!(search.settled(), "");

        assert_eq!(search.settle(ticket), Some("table"));
        assert_eq!(search.settle(ticket), None);
        assert!(!search.is_pending());
    }

    #[test]
    fn test_returning_to_settled_value_emits_nothing() {
        let mut search = debouncer();
        let first = search.schedule("sofa");
        search.settle(first);

        search.schedule("sofas");
        let back = search.schedule("sofa");

        assert_eq!(search.settle(back), None);
        assert_eq!(search.settled(), "sofa");
    }

    #[test]
    fn test_cancel_suppresses_pending_update() {
        let mut search = debouncer();
        let ticket = search.schedule("bed");

        search.cancel();

        assert_eq!(search.settle(ticket), None);
        assert_eq!(search.settled(), "");
        assert_eq!(search.raw(), "bed");
    }

    #[test]
    fn test_clearing_the_input_settles_empty_string() {
        let mut search = debouncer();
        let ticket = search.schedule("desk");
        search.settle(ticket);

        let ticket = search.schedule("");

        assert_eq!(search.settle(ticket), Some(""));
    }
}
