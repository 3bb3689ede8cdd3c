//! Basket
//!
//! Reshapes a flat (transaction, item) log into a transaction × item
//! presence matrix.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::transactions::{TransactionId, TransactionRecord};

/// Errors related to basket construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BasketError {
    /// A record is missing a required field (record index, field name).
    #[error("record {index} is missing required field `{field}`")]
    InvalidInput {
        /// Position of the offending record in the input
        index: usize,

        /// Name of the missing field
        field: &'static str,
    },
}

/// Column index of an item in a [`BasketMatrix`].
///
/// Items are numbered in lexical order of their names, so ids are stable for
/// a given set of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(usize);

impl ItemId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Column index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sorted item ids present in one transaction.
pub type BasketRow = SmallVec<[ItemId; 8]>;

/// Binary transaction × item occurrence table.
///
/// Stored sparsely: each row holds the sorted ids of the items present.
#[derive(Debug, Clone, Default)]
pub struct BasketMatrix {
    transactions: Vec<TransactionId>,
    transaction_index: FxHashMap<TransactionId, usize>,
    items: Vec<String>,
    item_index: FxHashMap<String, ItemId>,
    rows: Vec<BasketRow>,
}

/// Builds the presence matrix for the given records.
///
/// Rows follow first-seen transaction order; columns are the distinct items in
/// lexical order. Repeated (transaction, item) pairs collapse to a single
/// presence flag.
///
/// # Errors
///
/// Returns [`BasketError::InvalidInput`] if a record has an empty transaction
/// id or item.
pub fn build_basket<'a>(
    records: impl IntoIterator<Item = &'a TransactionRecord>,
) -> Result<BasketMatrix, BasketError> {
    let records: Vec<&TransactionRecord> = records.into_iter().collect();

    records.iter().enumerate().try_for_each(|(index, record)| {
        if record.transaction().is_empty() {
            Err(BasketError::InvalidInput {
                index,
                field: "transaction",
            })
        } else if record.item().is_empty() {
            Err(BasketError::InvalidInput {
                index,
                field: "item",
            })
        } else {
            Ok(())
        }
    })?;

    let names: BTreeSet<&str> = records.iter().map(|record| record.item()).collect();
    let items: Vec<String> = names.into_iter().map(str::to_string).collect();

    let item_index: FxHashMap<String, ItemId> = items
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), ItemId(idx)))
        .collect();

    let mut transactions: Vec<TransactionId> = Vec::new();
    let mut transaction_index: FxHashMap<TransactionId, usize> = FxHashMap::default();
    let mut rows: Vec<BasketRow> = Vec::new();

    for record in records {
        let Some(&item) = item_index.get(record.item()) else {
            continue;
        };

        let row_idx = *transaction_index
            .entry(record.transaction().clone())
            .or_insert_with(|| {
                transactions.push(record.transaction().clone());
                rows.push(BasketRow::new());
                rows.len() - 1
            });

        if let Some(row) = rows.get_mut(row_idx)
            && let Err(pos) = row.binary_search(&item)
        {
            row.insert(pos, item);
        }
    }

    Ok(BasketMatrix {
        transactions,
        transaction_index,
        items,
        item_index,
        rows,
    })
}

impl BasketMatrix {
    /// Number of rows (distinct transactions).
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Number of columns (distinct items).
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Row labels.
    pub fn transactions(&self) -> &[TransactionId] {
        &self.transactions
    }

    /// Column labels, sorted.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Column of the named item.
    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_index.get(name).copied()
    }

    /// Name of the item in the given column.
    pub fn item_name(&self, id: ItemId) -> Option<&str> {
        self.items.get(id.0).map(String::as_str)
    }

    /// Items present in the given row.
    pub fn row(&self, row: usize) -> Option<&[ItemId]> {
        self.rows.get(row).map(SmallVec::as_slice)
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[ItemId]> {
        self.rows.iter().map(SmallVec::as_slice)
    }

    /// Cell value: whether `item` occurs in `transaction`.
    pub fn contains(&self, transaction: &TransactionId, item: &str) -> bool {
        let (Some(&row), Some(item)) = (
            self.transaction_index.get(transaction),
            self.item_index.get(item),
        ) else {
            return false;
        };

        self.rows
            .get(row)
            .is_some_and(|items| items.binary_search(item).is_ok())
    }

    /// Number of rows containing every one of the given (sorted) items.
    pub fn count_containing(&self, items: &[ItemId]) -> usize {
        self.rows
            .iter()
            .filter(|row| is_sorted_subset(items, row))
            .count()
    }

    /// Fraction of rows containing every one of the given (sorted) items.
    pub fn support_of(&self, items: &[ItemId]) -> f64 {
        fraction(self.count_containing(items), self.transaction_count())
    }
}

/// Whether every element of `needle` occurs in `haystack`; both sorted.
pub(crate) fn is_sorted_subset(needle: &[ItemId], haystack: &[ItemId]) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }

    let mut rest = haystack.iter();

    needle
        .iter()
        .all(|wanted| rest.by_ref().any(|candidate| candidate == wanted))
}

/// `count / total`, or zero for an empty total.
#[expect(
    clippy::cast_precision_loss,
    reason = "transaction counts stay far below 2^52"
)]
pub(crate) fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }

    count as f64 / total as f64
}
