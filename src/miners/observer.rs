//! Miner Observer

/// Observer trait for following itemset enumeration level by level.
///
/// The miner remains the only implementation of the search; observers only
/// record what happened, e.g. for logging or tests.
pub trait MinerObserver {
    /// Called once a level has been counted.
    ///
    /// # Parameters
    ///
    /// - `size`: Itemset size of this level
    /// - `candidates`: Number of candidates counted
    /// - `frequent`: Number of candidates that reached the minimum support
    fn on_level(&mut self, size: usize, candidates: usize, frequent: usize);

    /// Called when the search stops.
    fn on_complete(&mut self, _total: usize) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MinerObserver for NoopObserver {
    fn on_level(&mut self, _size: usize, _candidates: usize, _frequent: usize) {}
}
