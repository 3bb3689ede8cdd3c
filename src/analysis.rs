//! Analysis session
//!
//! Holds a loaded transaction log for the lifetime of a session and answers
//! recommendation queries against it, mining each (filter, thresholds)
//! combination at most once.

use std::{num::NonZeroUsize, path::Path, sync::Arc};

use tracing::{debug, info, instrument, warn};

use crate::{
    basket::build_basket,
    cache::{AnalysisCache, CacheKey},
    config::{DEFAULT_TOP_N, MiningThresholds},
    error::{AnalysisError, ComputationError},
    loader::load_transactions,
    rules::{
        MinedRules, Rule, RuleError, best_consequent, mine_rules, rules_for_antecedent,
        top_n_by_confidence,
    },
    transactions::{TransactionFilter, TransactionLog, normalize_item},
};

/// A recommendation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    item: String,
    filter: TransactionFilter,
    top_n: NonZeroUsize,
}

impl Query {
    /// Query for companions of `item` over the whole log.
    pub fn new(item: &str) -> Self {
        Self {
            item: normalize_item(item),
            filter: TransactionFilter::all(),
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Narrow the log before mining.
    #[must_use]
    pub fn with_filter(mut self, filter: TransactionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Number of rules to list alongside the recommendation.
    #[must_use]
    pub fn with_top_n(mut self, top_n: NonZeroUsize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Normalised item name.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Transaction filter.
    pub fn filter(&self) -> &TransactionFilter {
        &self.filter
    }

    /// Number of rules to list.
    pub fn top_n(&self) -> NonZeroUsize {
        self.top_n
    }
}

/// Outcome of a recommendation query.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// At least one rule has the item in its antecedents.
    Found {
        /// Queried item
        item: String,

        /// Highest-confidence matching rule
        best: Rule,

        /// Top matching rules by confidence
        top: Vec<Rule>,
    },

    /// No rule has the item in its antecedents.
    NoRules {
        /// Queried item
        item: String,
    },
}

impl Recommendation {
    /// Queried item.
    pub fn item(&self) -> &str {
        match self {
            Self::Found { item, .. } | Self::NoRules { item } => item,
        }
    }

    /// First consequent of the best rule.
    pub fn consequent(&self) -> Option<&str> {
        match self {
            Self::Found { best, .. } => best.consequents().first().map(String::as_str),
            Self::NoRules { .. } => None,
        }
    }

    /// Best matching rule.
    pub fn best(&self) -> Option<&Rule> {
        match self {
            Self::Found { best, .. } => Some(best),
            Self::NoRules { .. } => None,
        }
    }
}

/// A read-only analysis session over one transaction log.
#[derive(Debug)]
pub struct Analysis {
    log: TransactionLog,
    items: Vec<String>,
    thresholds: MiningThresholds,
    cache: AnalysisCache,
}

impl Analysis {
    /// Start a session over an already loaded log.
    pub fn new(log: TransactionLog, thresholds: MiningThresholds) -> Self {
        let items = log.distinct_items();

        Self {
            log,
            items,
            thresholds,
            cache: AnalysisCache::new(),
        }
    }

    /// Load the log at `path` and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DataFileMissing`] if the file does not exist,
    /// or [`AnalysisError::Computation`] if it cannot be read or the thresholds
    /// are invalid.
    pub fn open(
        path: impl AsRef<Path>,
        thresholds: MiningThresholds,
    ) -> Result<Self, AnalysisError> {
        thresholds.validate()?;

        let log = load_transactions(path)?;

        Ok(Self::new(log, thresholds))
    }

    /// Replace the log, dropping cached rules that were derived from any
    /// other dataset.
    pub fn reload(&mut self, log: TransactionLog) {
        info!(
            previous = %self.log.fingerprint(),
            current = %log.fingerprint(),
            "transaction log reloaded"
        );

        self.cache.retain_dataset(log.fingerprint());
        self.items = log.distinct_items();
        self.log = log;
    }

    /// The loaded log.
    pub fn log(&self) -> &TransactionLog {
        &self.log
    }

    /// Mining thresholds in use.
    pub fn thresholds(&self) -> &MiningThresholds {
        &self.thresholds
    }

    /// Distinct normalised items, sorted; what a selector would offer.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Initial selection for an item selector.
    pub fn default_item(&self) -> Option<String> {
        self.log.default_item()
    }

    /// The memoisation layer.
    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Rules mined from the records matching `filter`.
    ///
    /// When no itemset reaches the minimum support the rule set is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Computation`] if the filter is invalid, the
    /// basket cannot be built or mining fails.
    #[instrument(skip(self))]
    pub fn rules(&mut self, filter: &TransactionFilter) -> Result<Arc<MinedRules>, AnalysisError> {
        filter.validate()?;

        let Self {
            log,
            thresholds,
            cache,
            ..
        } = self;

        let key = CacheKey::new(log.fingerprint(), *filter, thresholds);

        let mined = cache.get_or_try_insert(key, || {
            let basket = build_basket(log.filtered(filter))?;

            if basket.is_empty() && !filter.is_unrestricted() {
                warn!(
                    records = log.len(),
                    "filter excludes every record; month and weekday need a date_time \
                     column, period and day type need theirs or a timestamp"
                );
            }

            let rules = match mine_rules(&basket, thresholds) {
                Ok(rules) => rules,
                Err(RuleError::NoFrequentItemsets { min_support }) => {
                    info!(min_support, "no frequent itemsets; rule set is empty");

                    Vec::new()
                }
                Err(err) => return Err(ComputationError::from(err)),
            };

            Ok(MinedRules::new(
                basket.transaction_count(),
                basket.item_count(),
                rules,
            ))
        })?;

        debug!(rules = mined.rules().len(), "rules ready");

        Ok(mined)
    }

    /// Recommend the item most often bought together with `query.item()`.
    ///
    /// An item without matching rules is answered with
    /// [`Recommendation::NoRules`], not an error.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalysisError`] if the rules cannot be mined.
    pub fn recommend(&mut self, query: &Query) -> Result<Recommendation, AnalysisError> {
        let mined = self.rules(query.filter())?;

        let Some(best) = best_consequent(mined.rules(), query.item()) else {
            return Ok(Recommendation::NoRules {
                item: query.item().to_string(),
            });
        };

        let top = top_n_by_confidence(
            rules_for_antecedent(mined.rules(), query.item()),
            query.top_n(),
        )
        .into_iter()
        .cloned()
        .collect();

        Ok(Recommendation::Found {
            item: query.item().to_string(),
            best: best.clone(),
            top,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use testresult::TestResult;
    use tracing_subscriber::fmt::MakeWriter;

    use crate::transactions::{PeriodOfDay, TransactionRecord};

    use super::*;

    fn log() -> TransactionLog {
        TransactionLog::new(vec![
            TransactionRecord::new("1", "bread").with_period(PeriodOfDay::Morning),
            TransactionRecord::new("1", "coffee").with_period(PeriodOfDay::Morning),
            TransactionRecord::new("2", "bread").with_period(PeriodOfDay::Morning),
            TransactionRecord::new("2", "coffee").with_period(PeriodOfDay::Morning),
            TransactionRecord::new("3", "tea").with_period(PeriodOfDay::Afternoon),
            TransactionRecord::new("3", "cake").with_period(PeriodOfDay::Afternoon),
            TransactionRecord::new("4", "bread").with_period(PeriodOfDay::Afternoon),
        ])
    }

    #[test]
    fn recommends_highest_confidence_companion() -> TestResult {
        let mut analysis = Analysis::new(log(), MiningThresholds::default());

        let recommendation = analysis.recommend(&Query::new("Bread"))?;

        assert_eq!(recommendation.item(), "bread");
        assert_eq!(recommendation.consequent(), Some("coffee"));

        Ok(())
    }

    #[test]
    fn item_without_rules_is_not_an_error() -> TestResult {
        let mut analysis = Analysis::new(log(), MiningThresholds::default());

        let recommendation = analysis.recommend(&Query::new("croissant"))?;

        assert_eq!(
            recommendation,
            Recommendation::NoRules {
                item: "croissant".to_string()
            }
        );

        Ok(())
    }

    #[test]
    fn repeated_queries_reuse_mined_rules() -> TestResult {
        let mut analysis = Analysis::new(log(), MiningThresholds::default());

        analysis.recommend(&Query::new("bread"))?;
        analysis.recommend(&Query::new("tea"))?;

        assert_eq!(analysis.cache().misses(), 1);
        assert_eq!(analysis.cache().hits(), 1);

        Ok(())
    }

    #[test]
    fn filter_narrows_the_log_before_mining() -> TestResult {
        let mut analysis = Analysis::new(log(), MiningThresholds::default());
        let afternoon = TransactionFilter {
            period: Some(PeriodOfDay::Afternoon),
            ..TransactionFilter::all()
        };

        let mined = analysis.rules(&afternoon)?;

        assert_eq!(mined.transaction_count(), 2);

        let recommendation = analysis.recommend(&Query::new("bread").with_filter(afternoon))?;

        assert!(matches!(recommendation, Recommendation::NoRules { .. }));

        Ok(())
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .map_err(|err| io::Error::other(err.to_string()))?
                .extend_from_slice(buf);

            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn filter_without_matching_attributes_is_explained() -> TestResult {
        let mut analysis = Analysis::new(log(), MiningThresholds::default());
        let november = TransactionFilter {
            month: Some(11),
            ..TransactionFilter::all()
        };

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let mined = tracing::subscriber::with_default(subscriber, || analysis.rules(&november))?;

        assert_eq!(mined.transaction_count(), 0);
        assert!(mined.is_empty());

        let output = String::from_utf8(logs.0.lock().map_err(|err| err.to_string())?.clone())?;

        assert!(output.contains("filter excludes every record"));
        assert!(matches!(
            analysis.recommend(&Query::new("bread").with_filter(november))?,
            Recommendation::NoRules { .. }
        ));

        Ok(())
    }

    #[test]
    fn invalid_filter_is_a_computation_error() {
        let mut analysis = Analysis::new(log(), MiningThresholds::default());
        let filter = TransactionFilter {
            month: Some(0),
            ..TransactionFilter::all()
        };

        assert!(matches!(
            analysis.rules(&filter),
            Err(AnalysisError::Computation(ComputationError::Filter(_)))
        ));
    }

    #[test]
    fn unreachable_support_yields_empty_rules() -> TestResult {
        let thresholds = MiningThresholds {
            min_support: 1.0,
            ..MiningThresholds::default()
        };
        let mut analysis = Analysis::new(log(), thresholds);

        assert!(analysis.rules(&TransactionFilter::all())?.is_empty());

        Ok(())
    }

    #[test]
    fn reload_with_other_data_drops_cached_rules() -> TestResult {
        let mut analysis = Analysis::new(log(), MiningThresholds::default());

        analysis.rules(&TransactionFilter::all())?;
        analysis.reload(TransactionLog::new(vec![TransactionRecord::new("1", "scone")]));

        assert!(analysis.cache().is_empty());
        assert_eq!(analysis.items(), ["scone"]);

        Ok(())
    }

    #[test]
    fn missing_data_file() {
        let result = Analysis::open("/no/such/bread basket.csv", MiningThresholds::default());

        assert!(matches!(result, Err(AnalysisError::DataFileMissing { .. })));
    }
}
