//! Association rules
//!
//! Rule generation from frequent itemsets, and the selection queries the
//! recommendation layer runs over the mined rules.

use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    basket::{BasketMatrix, ItemId},
    config::MiningThresholds,
    itemsets::{FrequentItemsets, ItemIds},
    miners::{AprioriMiner, Miner, MinerError, MiningParameters},
};

mod metrics;
mod selection;

pub use metrics::RuleMetric;
pub use selection::{best_consequent, rank_by_confidence, rules_for_antecedent, top_n_by_confidence};

/// Item names on one side of a rule, sorted.
pub type RuleItems = SmallVec<[String; 2]>;

/// Errors raised while mining rules.
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    /// No itemset reached the minimum support.
    #[error("no itemset reaches a minimum support of {min_support}")]
    NoFrequentItemsets {
        /// The minimum support that excluded every itemset
        min_support: f64,
    },

    /// Metric threshold is negative or not a number.
    #[error("minimum lift must be a non-negative number, got {0}")]
    InvalidThreshold(f64),

    /// Wrapped itemset mining error.
    #[error(transparent)]
    Miner(#[from] MinerError),
}

/// An association rule `antecedents -> consequents` with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    antecedents: RuleItems,
    consequents: RuleItems,
    antecedent_support: f64,
    consequent_support: f64,
    support: f64,
    confidence: f64,
    lift: f64,
    leverage: f64,
    conviction: f64,
}

impl Rule {
    /// Builds a rule from the supports of its antecedent, consequent and union;
    /// the remaining metrics are derived.
    pub fn from_supports<A, C>(
        antecedents: A,
        consequents: C,
        antecedent_support: f64,
        consequent_support: f64,
        support: f64,
    ) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let confidence = if antecedent_support > 0.0 {
            support / antecedent_support
        } else {
            0.0
        };

        let lift = if consequent_support > 0.0 {
            confidence / consequent_support
        } else {
            0.0
        };

        let conviction = if confidence < 1.0 {
            (1.0 - consequent_support) / (1.0 - confidence)
        } else {
            f64::INFINITY
        };

        Self {
            antecedents: sorted_items(antecedents),
            consequents: sorted_items(consequents),
            antecedent_support,
            consequent_support,
            support,
            confidence,
            lift,
            leverage: support - antecedent_support * consequent_support,
            conviction,
        }
    }

    /// Left-hand side item names.
    pub fn antecedents(&self) -> &[String] {
        &self.antecedents
    }

    /// Right-hand side item names.
    pub fn consequents(&self) -> &[String] {
        &self.consequents
    }

    /// Whether the antecedent set contains `item`.
    pub fn antecedent_contains(&self, item: &str) -> bool {
        self.antecedents.iter().any(|name| name == item)
    }

    /// Support of the antecedent set alone.
    pub fn antecedent_support(&self) -> f64 {
        self.antecedent_support
    }

    /// Support of the consequent set alone.
    pub fn consequent_support(&self) -> f64 {
        self.consequent_support
    }

    /// Support of antecedents ∪ consequents.
    pub fn support(&self) -> f64 {
        self.support
    }

    /// `support / antecedent_support`
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// `confidence / consequent_support`
    pub fn lift(&self) -> f64 {
        self.lift
    }

    /// `support - antecedent_support * consequent_support`
    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    /// `(1 - consequent_support) / (1 - confidence)`; infinite for exact rules.
    pub fn conviction(&self) -> f64 {
        self.conviction
    }
}

fn sorted_items<I>(items: I) -> RuleItems
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut items: RuleItems = items.into_iter().map(Into::into).collect();
    items.sort_unstable();
    items.dedup();
    items
}

/// Rules mined for one basket, shared read-only once computed.
#[derive(Debug, Clone, Default)]
pub struct MinedRules {
    transaction_count: usize,
    item_count: usize,
    rules: Vec<Rule>,
}

impl MinedRules {
    /// Wrap rules mined from a basket with the given shape.
    pub fn new(transaction_count: usize, item_count: usize, rules: Vec<Rule>) -> Self {
        Self {
            transaction_count,
            item_count,
            rules,
        }
    }

    /// Transactions in the basket the rules were mined from.
    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    /// Distinct items in that basket.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// The rules, in generation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether no rule was found.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Generates every rule of the frequent itemsets whose `metric` reaches
/// `min_threshold`.
///
/// Each itemset of two or more items is split into every non-empty
/// antecedent/consequent pair. Rules are emitted itemset by itemset in the
/// collection's order, with smaller consequents first.
pub fn generate_rules(
    itemsets: &FrequentItemsets,
    metric: RuleMetric,
    min_threshold: f64,
) -> Vec<Rule> {
    let mut rules = Vec::new();

    for itemset in itemsets.iter().filter(|itemset| itemset.len() >= 2) {
        for consequent_len in 1..itemset.len() {
            for consequent in combinations(itemset.items(), consequent_len) {
                let antecedent: ItemIds = itemset
                    .items()
                    .iter()
                    .copied()
                    .filter(|id| !consequent.contains(id))
                    .collect();

                // subsets of a frequent itemset are always frequent
                let (Some(antecedent_support), Some(consequent_support)) =
                    (itemsets.support(&antecedent), itemsets.support(&consequent))
                else {
                    continue;
                };

                let rule = Rule::from_supports(
                    names(itemsets, &antecedent),
                    names(itemsets, &consequent),
                    antecedent_support,
                    consequent_support,
                    itemset.support(),
                );

                if metric.value(&rule) >= min_threshold {
                    rules.push(rule);
                }
            }
        }
    }

    rules
}

fn names(itemsets: &FrequentItemsets, ids: &[ItemId]) -> RuleItems {
    ids.iter()
        .filter_map(|&id| itemsets.item_name(id))
        .map(str::to_string)
        .collect()
}

/// Every `k`-combination of `items`, in lexical order.
fn combinations(items: &[ItemId], k: usize) -> Vec<ItemIds> {
    if k == 0 {
        return vec![ItemIds::new()];
    }

    let mut out = Vec::new();

    for (idx, &first) in items.iter().enumerate() {
        let rest = items.get(idx + 1..).unwrap_or_default();

        for mut tail in combinations(rest, k - 1) {
            tail.insert(0, first);
            out.push(tail);
        }
    }

    out
}

/// Mines the frequent itemsets of `basket` and derives the rules whose lift
/// reaches `thresholds.min_lift`.
///
/// Every returned rule's itemset has support ≥ `thresholds.min_support`. A
/// basket whose frequent itemsets produce no qualifying rule yields an empty
/// vector.
///
/// # Errors
///
/// - [`RuleError::NoFrequentItemsets`] if the minimum support excludes every itemset.
/// - [`RuleError::InvalidThreshold`] if the minimum lift is negative or NaN.
/// - [`RuleError::Miner`] if the support or length parameters are invalid.
#[instrument(
    skip_all,
    fields(transactions = basket.transaction_count(), items = basket.item_count())
)]
pub fn mine_rules(
    basket: &BasketMatrix,
    thresholds: &MiningThresholds,
) -> Result<Vec<Rule>, RuleError> {
    if thresholds.min_lift.is_nan() || thresholds.min_lift < 0.0 {
        return Err(RuleError::InvalidThreshold(thresholds.min_lift));
    }

    let parameters =
        MiningParameters::new(thresholds.min_support).with_max_len(thresholds.max_len);

    let itemsets = AprioriMiner::mine(basket, &parameters)?;

    if itemsets.is_empty() {
        return Err(RuleError::NoFrequentItemsets {
            min_support: thresholds.min_support,
        });
    }

    let rules = generate_rules(&itemsets, RuleMetric::Lift, thresholds.min_lift);

    debug!(
        itemsets = itemsets.len(),
        rules = rules.len(),
        "association rules generated"
    );

    Ok(rules)
}
