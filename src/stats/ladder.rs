//! Ordered threshold tables that map a score to a value.

/// A lower bound on a score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Bound {
    /// Admits scores greater than or equal to the threshold.
    AtLeast(f64),
    /// Admits scores strictly greater than the threshold.
    Above(f64),
}

impl Bound {
    pub(super) fn admits(self, score: f64) -> bool {
        match self {
            Bound::AtLeast(threshold) => score >= threshold,
            Bound::Above(threshold) => score > threshold,
        }
    }
}

/// A list of rungs checked from top to bottom.
///
/// The value of the first rung whose bound admits the score wins, and
/// `fallback` is used when no rung does. Rungs must be ordered from the
/// highest threshold to the lowest.
#[derive(Debug)]
pub(super) struct Ladder<T: 'static> {
    rungs: &'static [(Bound, T)],
    fallback: T,
}

impl<T: Copy> Ladder<T> {
    pub(super) const fn new(rungs: &'static [(Bound, T)], fallback: T) -> Self {
        Self { rungs, fallback }
    }

    /// Find the value for `score`.
    pub(super) fn find(&self, score: f64) -> T {
        self.rungs
            .iter()
            .find(|(bound, _)| bound.admits(score))
            .map(|(_, value)| *value)
            .unwrap_or(self.fallback)
    }
}
