//! Apriori Miner

use rustc_hash::FxHashSet;
use smallvec::{SmallVec, smallvec};
use tracing::debug;

use crate::{
    basket::{BasketMatrix, ItemId, fraction, is_sorted_subset},
    itemsets::{FrequentItemsets, ItemIds, Itemset},
    miners::{Miner, MinerError, MinerObserver, MiningParameters, NoopObserver},
};

/// Level-wise (Apriori) frequent itemset miner.
///
/// Size-`k` candidates are joined from frequent size-`k - 1` itemsets sharing a
/// prefix, pruned unless every `k - 1` subset is frequent, then counted in one
/// pass over the basket rows.
#[derive(Debug)]
pub struct AprioriMiner;

impl AprioriMiner {
    /// Mine with an observer receiving per-level callbacks.
    ///
    /// # Errors
    ///
    /// Returns a [`MinerError`] if the parameters are invalid.
    pub fn mine_with_observer(
        basket: &BasketMatrix,
        parameters: &MiningParameters,
        observer: &mut dyn MinerObserver,
    ) -> Result<FrequentItemsets, MinerError> {
        parameters.validate()?;

        let total = basket.transaction_count();
        let mut found: Vec<Itemset> = Vec::new();

        if total == 0 {
            observer.on_complete(0);

            return Ok(FrequentItemsets::new(basket, found));
        }

        let mut counts = vec![0_usize; basket.item_count()];

        for row in basket.rows() {
            for id in row {
                if let Some(count) = counts.get_mut(id.index()) {
                    *count += 1;
                }
            }
        }

        let mut level: Vec<ItemIds> = Vec::new();

        for (idx, &count) in counts.iter().enumerate() {
            let support = fraction(count, total);

            if support >= parameters.min_support {
                let items: ItemIds = smallvec![ItemId::from_index(idx)];

                found.push(Itemset::new(items.iter().copied(), support));
                level.push(items);
            }
        }

        debug!(
            size = 1,
            candidates = counts.len(),
            frequent = level.len(),
            "apriori level counted"
        );
        observer.on_level(1, counts.len(), level.len());

        let mut size = 1;

        while !level.is_empty() && parameters.max_len.is_none_or(|max| size < max) {
            size += 1;

            let candidates = join_candidates(&level);

            if candidates.is_empty() {
                break;
            }

            let mut counts = vec![0_usize; candidates.len()];

            for row in basket.rows().filter(|row| row.len() >= size) {
                for (candidate, count) in candidates.iter().zip(counts.iter_mut()) {
                    if is_sorted_subset(candidate, row) {
                        *count += 1;
                    }
                }
            }

            let candidate_count = candidates.len();
            let mut next: Vec<ItemIds> = Vec::new();

            for (candidate, count) in candidates.into_iter().zip(counts) {
                let support = fraction(count, total);

                if support >= parameters.min_support {
                    found.push(Itemset::new(candidate.iter().copied(), support));
                    next.push(candidate);
                }
            }

            debug!(
                size,
                candidates = candidate_count,
                frequent = next.len(),
                "apriori level counted"
            );
            observer.on_level(size, candidate_count, next.len());

            level = next;
        }

        observer.on_complete(found.len());

        Ok(FrequentItemsets::new(basket, found))
    }
}

impl Miner for AprioriMiner {
    fn mine(
        basket: &BasketMatrix,
        parameters: &MiningParameters,
    ) -> Result<FrequentItemsets, MinerError> {
        Self::mine_with_observer(basket, parameters, &mut NoopObserver)
    }
}

/// Joins lexically sorted frequent itemsets of one size into the candidates of
/// the next size.
fn join_candidates(level: &[ItemIds]) -> Vec<ItemIds> {
    let frequent: FxHashSet<&[ItemId]> = level.iter().map(SmallVec::as_slice).collect();
    let mut candidates = Vec::new();

    for (idx, left) in level.iter().enumerate() {
        let Some((_, left_prefix)) = left.split_last() else {
            continue;
        };

        for right in level.iter().skip(idx + 1) {
            let Some((&right_last, right_prefix)) = right.split_last() else {
                continue;
            };

            // itemsets sharing a prefix are contiguous
            if left_prefix != right_prefix {
                break;
            }

            let mut candidate = left.clone();
            candidate.push(right_last);

            if all_subsets_frequent(&candidate, &frequent) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

fn all_subsets_frequent(candidate: &[ItemId], frequent: &FxHashSet<&[ItemId]>) -> bool {
    (0..candidate.len()).all(|skip| {
        let subset: ItemIds = candidate
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != skip)
            .map(|(_, &id)| id)
            .collect();

        frequent.contains(subset.as_slice())
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{basket::build_basket, transactions::TransactionRecord};

    use super::*;

    fn bread_milk() -> Vec<TransactionRecord> {
        vec![
            TransactionRecord::new("T1", "bread"),
            TransactionRecord::new("T1", "milk"),
            TransactionRecord::new("T2", "bread"),
            TransactionRecord::new("T2", "milk"),
            TransactionRecord::new("T3", "bread"),
        ]
    }

    fn approx(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|actual| (actual - expected).abs() < 1e-9)
    }

    #[derive(Default)]
    struct RecordingObserver {
        levels: Vec<(usize, usize, usize)>,
        total: Option<usize>,
    }

    impl MinerObserver for RecordingObserver {
        fn on_level(&mut self, size: usize, candidates: usize, frequent: usize) {
            self.levels.push((size, candidates, frequent));
        }

        fn on_complete(&mut self, total: usize) {
            self.total = Some(total);
        }
    }

    #[test]
    fn bread_and_milk_supports() -> TestResult {
        let basket = build_basket(&bread_milk())?;
        let itemsets = AprioriMiner::mine(&basket, &MiningParameters::new(0.01))?;

        assert_eq!(itemsets.len(), 3);
        assert!(approx(itemsets.support_by_name(["bread"]), 1.0));
        assert!(approx(itemsets.support_by_name(["milk"]), 2.0 / 3.0));
        assert!(approx(itemsets.support_by_name(["bread", "milk"]), 2.0 / 3.0));

        Ok(())
    }

    #[test]
    fn itemsets_below_min_support_are_dropped() -> TestResult {
        let basket = build_basket(&bread_milk())?;
        let itemsets = AprioriMiner::mine(&basket, &MiningParameters::new(0.9))?;

        assert_eq!(itemsets.len(), 1);
        assert!(approx(itemsets.support_by_name(["bread"]), 1.0));
        assert_eq!(itemsets.support_by_name(["milk"]), None);

        Ok(())
    }

    #[test]
    fn max_len_bounds_itemset_size() -> TestResult {
        let basket = build_basket(&bread_milk())?;
        let parameters = MiningParameters::new(0.01).with_max_len(Some(1));
        let itemsets = AprioriMiner::mine(&basket, &parameters)?;

        assert_eq!(itemsets.max_len(), 1);
        assert_eq!(itemsets.len(), 2);

        Ok(())
    }

    #[test]
    fn three_item_sets_require_frequent_subsets() -> TestResult {
        let records = [
            TransactionRecord::new("1", "a"),
            TransactionRecord::new("1", "b"),
            TransactionRecord::new("1", "c"),
            TransactionRecord::new("2", "a"),
            TransactionRecord::new("2", "b"),
            TransactionRecord::new("2", "c"),
            TransactionRecord::new("3", "a"),
            TransactionRecord::new("3", "d"),
            TransactionRecord::new("4", "b"),
            TransactionRecord::new("4", "d"),
        ];

        let basket = build_basket(&records)?;
        let mut observer = RecordingObserver::default();
        let itemsets =
            AprioriMiner::mine_with_observer(&basket, &MiningParameters::new(0.5), &mut observer)?;

        assert!(approx(itemsets.support_by_name(["a", "b", "c"]), 0.5));
        assert!(approx(itemsets.support_by_name(["a", "b"]), 0.5));
        assert_eq!(itemsets.support_by_name(["a", "d"]), None);
        assert_eq!(itemsets.max_len(), 3);
        assert_eq!(observer.levels.first(), Some(&(1, 4, 4)));
        assert_eq!(observer.total, Some(itemsets.len()));

        Ok(())
    }

    #[test]
    fn empty_basket_yields_no_itemsets() -> TestResult {
        let basket = build_basket(std::iter::empty())?;
        let itemsets = AprioriMiner::mine(&basket, &MiningParameters::new(0.01))?;

        assert!(itemsets.is_empty());

        Ok(())
    }

    #[test]
    fn invalid_support_is_rejected() -> TestResult {
        let basket = build_basket(&bread_milk())?;

        assert_eq!(
            AprioriMiner::mine(&basket, &MiningParameters::new(-0.1)).err(),
            Some(MinerError::InvalidSupport(-0.1))
        );

        Ok(())
    }
}
