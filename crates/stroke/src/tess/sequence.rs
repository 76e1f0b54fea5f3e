/// Per-tool ordering of asynchronous tessellation results.
///
/// Sequence numbers are issued monotonically. A response is applied only
/// while the stroke is not ending, and only if it is newer than the last
/// applied one and not newer than the last issued one. Late arrivals of
/// older requests are therefore discarded.
#[derive(Debug, Clone, Default)]
pub struct SequenceGate {
    latest_issued: u64,
    last_applied: u64,
    ending: bool,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke: reset the counter and clear the ending flag
    pub fn begin(&mut self) {
        self.latest_issued = 0;
        self.last_applied = 0;
        self.ending = false;
    }

    /// Mark the stroke as ending; every later response is stale
    pub fn end(&mut self) {
        self.ending = true;
    }

    pub fn is_ending(&self) -> bool {
        self.ending
    }

    /// Next sequence number for an outgoing request
    pub fn issue(&mut self) -> u64 {
        self.latest_issued += 1;
        self.latest_issued
    }

    pub fn latest_issued(&self) -> u64 {
        self.latest_issued
    }

    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }

    /// True if `sequence` is the newest response seen so far. Accepting it
    /// records it as applied.
    pub fn accept(&mut self, sequence: u64) -> bool {
        if self.ending || sequence <= self.last_applied || sequence > self.latest_issued {
            return false;
        }
        self.last_applied = sequence;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_arrivals() {
        let mut gate = SequenceGate::new();
        gate.begin();
        let ids: Vec<u64> = (0..3).map(|_| gate.issue()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let applied: Vec<u64> = [1, 3, 2].into_iter().filter(|&s| gate.accept(s)).collect();
        assert_eq!(applied, vec![1, 3]);
    }

    #[test]
    fn test_ending_rejects_everything() {
        let mut gate = SequenceGate::new();
        let seq = gate.issue();
        gate.end();
        assert!(!gate.accept(seq));
        gate.begin();
        assert!(!gate.is_ending());
        assert_eq!(gate.issue(), 1);
    }

    #[test]
    fn test_unissued_and_repeated_sequences_rejected() {
        let mut gate = SequenceGate::new();
        assert!(!gate.accept(1));
        let seq = gate.issue();
        assert!(gate.accept(seq));
        assert!(!gate.accept(seq));
    }
}
