/// Request tickets for discarding stale responses.
///
/// Each new fetch of a kind takes a ticket; when its response arrives it is
/// applied only if no newer fetch of the same kind was started since.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestSequence {
    latest: u64,
}

/// Identifies one outstanding request
pub type Ticket = u64;

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating all earlier tickets
    pub fn next(&mut self) -> Ticket {
        self.latest = self.latest.wrapping_add(1);
        self.latest
    }

    /// Invalidate all outstanding tickets without starting a request
    pub fn invalidate(&mut self) {
        self.latest = self.latest.wrapping_add(1);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let mut sequence = RequestSequence::new();
        let first = sequence.next();
        let second = sequence.next();

        assert!(!sequence.is_current(first));
        assert!(sequence.is_current(second));
    }

    #[test]
    fn test_invalidate() {
        let mut sequence = RequestSequence::new();
        let ticket = sequence.next();

        sequence.invalidate();

        assert!(!sequence.is_current(ticket));
    }
}
