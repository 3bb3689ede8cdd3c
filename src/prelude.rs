//! Hamper prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    analysis::{Analysis, Query, Recommendation},
    basket::{BasketError, BasketMatrix, ItemId, build_basket},
    cache::{AnalysisCache, CacheKey},
    config::{ConfigError, DEFAULT_TOP_N, MiningThresholds},
    error::{AnalysisError, ComputationError},
    itemsets::{FrequentItemsets, Itemset},
    loader::{LoadError, load_transactions, read_transactions},
    miners::{AprioriMiner, Miner, MinerError, MinerObserver, MiningParameters, NoopObserver},
    report::ReportError,
    rules::{
        MinedRules, Rule, RuleError, RuleMetric, best_consequent, generate_rules, mine_rules,
        rules_for_antecedent, top_n_by_confidence,
    },
    transactions::{
        DayType, FilterError, PeriodOfDay, TransactionFilter, TransactionId, TransactionLog,
        TransactionRecord, normalize_item,
    },
};
