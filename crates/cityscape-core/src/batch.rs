//! Completion accounting for a batch of asynchronous loads.
//!
//! Each wall rebuild begins a new generation. Load tasks carry the generation
//! they were spawned under; completions from a superseded generation are
//! reported as [`BatchEvent::Stale`] and must not touch the scene. Requests
//! are never cancelled, only ignored.

/// Opaque batch token handed to load tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Generation(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchEvent {
    /// Completion from a superseded batch; drop the payload.
    Stale,
    Progress { completed: usize, total: usize },
    /// This completion was the last outstanding one.
    Finished,
}

#[derive(Clone, Debug, Default)]
pub struct BatchTracker {
    generation: u64,
    total: usize,
    completed: usize,
}

impl BatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a new batch, invalidating all prior generations.
    pub fn begin(&mut self, total: usize) -> Generation {
        self.generation += 1;
        self.total = total;
        self.completed = 0;
        Generation(self.generation)
    }

    pub fn current(&self) -> Generation {
        Generation(self.generation)
    }

    /// True while the current batch still has outstanding completions.
    pub fn in_flight(&self) -> bool {
        self.completed < self.total
    }

    /// Record one completion (success or failure alike).
    pub fn note(&mut self, generation: Generation) -> BatchEvent {
        if generation.0 != self.generation || self.completed >= self.total {
            return BatchEvent::Stale;
        }
        self.completed += 1;
        if self.completed == self.total {
            BatchEvent::Finished
        } else {
            BatchEvent::Progress {
                completed: self.completed,
                total: self.total,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finishes_exactly_on_the_last_completion() {
        let mut b = BatchTracker::new();
        let g = b.begin(3);
        assert!(b.in_flight());
        assert_eq!(
            b.note(g),
            BatchEvent::Progress {
                completed: 1,
                total: 3
            }
        );
        assert_eq!(
            b.note(g),
            BatchEvent::Progress {
                completed: 2,
                total: 3
            }
        );
        assert_eq!(b.note(g), BatchEvent::Finished);
        assert!(!b.in_flight());
    }

    #[test]
    fn completions_past_total_are_stale() {
        let mut b = BatchTracker::new();
        let g = b.begin(1);
        assert_eq!(b.note(g), BatchEvent::Finished);
        assert_eq!(b.note(g), BatchEvent::Stale);
    }

    #[test]
    fn old_generation_is_discarded_after_rebuild() {
        let mut b = BatchTracker::new();
        let g1 = b.begin(2);
        assert_eq!(
            b.note(g1),
            BatchEvent::Progress {
                completed: 1,
                total: 2
            }
        );

        let g2 = b.begin(2);
        assert_ne!(g1, g2);
        // Late arrival from the first batch: ignored, no progress on g2.
        assert_eq!(b.note(g1), BatchEvent::Stale);
        assert_eq!(
            b.note(g2),
            BatchEvent::Progress {
                completed: 1,
                total: 2
            }
        );
        assert_eq!(b.note(g2), BatchEvent::Finished);
    }

    #[test]
    fn empty_batch_is_immediately_settled() {
        let mut b = BatchTracker::new();
        let g = b.begin(0);
        assert!(!b.in_flight());
        assert_eq!(b.note(g), BatchEvent::Stale);
    }
}
