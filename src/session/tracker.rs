use serde::Serialize;

/// Graph-walk counters for one session.
///
/// `references` and `stream_bytes` only grow. `depth` rises and falls with
/// nesting; its high-water mark is kept in `max_depth`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LimitTracker {
    depth: u64,
    max_depth: u64,
    references: u64,
    stream_bytes: u64,
}

impl LimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn record_reference(&mut self) {
        self.references += 1;
    }

    pub fn add_bytes(&mut self, bytes: u64) {
        self.stream_bytes = self.stream_bytes.saturating_add(bytes);
    }

    pub fn depth(&self) -> u64 {
        self.depth
    }

    pub fn max_depth(&self) -> u64 {
        self.max_depth
    }

    pub fn references(&self) -> u64 {
        self.references
    }

    pub fn stream_bytes(&self) -> u64 {
        self.stream_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_high_water_mark() {
        let mut tracker = LimitTracker::new();
        tracker.enter();
        tracker.enter();
        tracker.exit();
        tracker.enter();
        tracker.enter();
        assert_eq!(tracker.depth(), 3);
        assert_eq!(tracker.max_depth(), 3);

        for _ in 0..5 {
            tracker.exit();
        }
        assert_eq!(tracker.depth(), 0);
        assert_eq!(tracker.max_depth(), 3);
    }

    #[test]
    fn test_counters_only_grow() {
        let mut tracker = LimitTracker::new();
        tracker.record_reference();
        tracker.record_reference();
        tracker.add_bytes(10);
        tracker.add_bytes(u64::MAX);
        assert_eq!(tracker.references(), 2);
        assert_eq!(tracker.stream_bytes(), u64::MAX);
    }
}
