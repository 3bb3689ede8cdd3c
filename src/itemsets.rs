//! Frequent itemsets

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::basket::{BasketMatrix, ItemId};

/// Sorted item ids making up an itemset.
pub type ItemIds = SmallVec<[ItemId; 4]>;

/// A set of items together with the fraction of transactions containing all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Itemset {
    items: ItemIds,
    support: f64,
}

impl Itemset {
    /// Create an itemset; `items` are sorted and deduplicated.
    pub fn new(items: impl IntoIterator<Item = ItemId>, support: f64) -> Self {
        let mut items: ItemIds = items.into_iter().collect();
        items.sort_unstable();
        items.dedup();

        Self { items, support }
    }

    /// Item ids, sorted.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Support of the itemset.
    pub fn support(&self) -> f64 {
        self.support
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the itemset has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Output of a miner: every itemset that reached the minimum support, plus the
/// item names needed to turn ids back into labels.
#[derive(Debug, Clone, Default)]
pub struct FrequentItemsets {
    itemsets: Vec<Itemset>,
    supports: FxHashMap<ItemIds, f64>,
    item_names: Vec<String>,
    transaction_count: usize,
}

impl FrequentItemsets {
    /// Collects the itemsets found for `basket`, ordered by size and then by items.
    pub fn new(basket: &BasketMatrix, itemsets: impl IntoIterator<Item = Itemset>) -> Self {
        let mut itemsets: Vec<Itemset> = itemsets.into_iter().collect();

        itemsets.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.items.cmp(&b.items)));

        let supports = itemsets
            .iter()
            .map(|itemset| (itemset.items.clone(), itemset.support))
            .collect();

        Self {
            itemsets,
            supports,
            item_names: basket.items().to_vec(),
            transaction_count: basket.transaction_count(),
        }
    }

    /// Iterate over the itemsets in size-then-lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &Itemset> {
        self.itemsets.iter()
    }

    /// Number of frequent itemsets.
    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    /// Whether no itemset reached the minimum support.
    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    /// Number of transactions the supports were computed over.
    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    /// Size of the largest itemset.
    pub fn max_len(&self) -> usize {
        self.itemsets.last().map_or(0, Itemset::len)
    }

    /// Support of an exact (sorted) itemset, if it was frequent.
    pub fn support(&self, items: &[ItemId]) -> Option<f64> {
        self.supports.get(items).copied()
    }

    /// Support of the itemset with the given item names, if it was frequent.
    pub fn support_by_name<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Option<f64> {
        let mut ids = ItemIds::new();

        for name in names {
            let idx = self.item_names.iter().position(|item| item == name)?;
            ids.push(ItemId::from_index(idx));
        }

        ids.sort_unstable();
        ids.dedup();

        self.support(&ids)
    }

    /// Name of an item.
    pub fn item_name(&self, id: ItemId) -> Option<&str> {
        self.item_names.get(id.index()).map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a FrequentItemsets {
    type Item = &'a Itemset;
    type IntoIter = std::slice::Iter<'a, Itemset>;

    fn into_iter(self) -> Self::IntoIter {
        self.itemsets.iter()
    }
}
