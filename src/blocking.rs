use std::collections::HashSet;

/// Keys of actions that are waiting for the daemon. A control whose key is blocked is
/// rendered disabled and further presses are ignored until the call resolves.
#[derive(Clone, Debug, Default)]
pub struct BlockingSet {
    pending: HashSet<&'static str>,
}

impl BlockingSet {
    pub fn is_blocked(&self, key: &'static str) -> bool {
        self.pending.contains(key)
    }

    /// Returns false when the action is already in flight.
    pub fn begin(&mut self, key: &'static str) -> bool {
        self.pending.insert(key)
    }

    pub fn finish(&mut self, key: &'static str) {
        self.pending.remove(key);
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_press_while_in_flight_is_ignored() {
        let mut blocking = BlockingSet::default();
        assert!(blocking.begin("connect"));
        assert!(blocking.is_blocked("connect"));
        assert!(!blocking.begin("connect"));
        assert!(!blocking.is_blocked("logout"));
        blocking.finish("connect");
        assert!(blocking.is_idle());
        assert!(blocking.begin("connect"));
    }
}
