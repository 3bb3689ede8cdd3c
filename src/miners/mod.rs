//! Miners for frequent itemsets

use thiserror::Error;

use crate::{basket::BasketMatrix, itemsets::FrequentItemsets};

pub mod apriori;
pub mod observer;

pub use apriori::AprioriMiner;
pub use observer::{MinerObserver, NoopObserver};

/// Miner Errors
#[derive(Debug, Error, PartialEq)]
pub enum MinerError {
    /// Minimum support outside (0, 1].
    #[error("minimum support must be in (0, 1], got {0}")]
    InvalidSupport(f64),

    /// A maximum itemset length of zero was requested.
    #[error("maximum itemset length must be at least 1")]
    InvalidMaxLen,
}

/// Parameters controlling itemset enumeration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningParameters {
    /// Minimum fraction of transactions an itemset must appear in.
    pub min_support: f64,

    /// Largest itemset size to enumerate; unbounded when `None`.
    pub max_len: Option<usize>,
}

impl MiningParameters {
    /// Parameters with the given minimum support and no length bound.
    pub fn new(min_support: f64) -> Self {
        Self {
            min_support,
            max_len: None,
        }
    }

    /// Bound the itemset size.
    #[must_use]
    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }

    /// Checks the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns a [`MinerError`] for a support outside (0, 1] or a zero length bound.
    pub fn validate(&self) -> Result<(), MinerError> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(MinerError::InvalidSupport(self.min_support));
        }

        if self.max_len == Some(0) {
            return Err(MinerError::InvalidMaxLen);
        }

        Ok(())
    }
}

/// Trait for enumerating the frequent itemsets of a basket
pub trait Miner {
    /// Find every itemset whose support reaches `parameters.min_support`.
    ///
    /// # Errors
    ///
    /// Returns a [`MinerError`] if the parameters are invalid.
    fn mine(
        basket: &BasketMatrix,
        parameters: &MiningParameters,
    ) -> Result<FrequentItemsets, MinerError>;
}
