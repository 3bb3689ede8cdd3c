//! Rule selection

use std::{cmp::Ordering, num::NonZeroUsize};

use crate::rules::Rule;

/// Ordering used to rank rules: confidence descending, then lift descending,
/// then consequent names ascending.
///
/// Callers rely on stable sorts, so rules equal under this ordering keep the
/// order they were generated in.
pub fn rank_by_confidence(a: &Rule, b: &Rule) -> Ordering {
    b.confidence()
        .total_cmp(&a.confidence())
        .then_with(|| b.lift().total_cmp(&a.lift()))
        .then_with(|| a.consequents().cmp(b.consequents()))
}

/// Rules whose antecedent set contains `item`, in input order.
pub fn rules_for_antecedent<'r>(rules: &'r [Rule], item: &str) -> Vec<&'r Rule> {
    rules
        .iter()
        .filter(|rule| rule.antecedent_contains(item))
        .collect()
}

/// The highest-ranked rule whose antecedent set contains `antecedent_item`.
///
/// Returns `None` when no rule matches.
pub fn best_consequent<'r>(rules: &'r [Rule], antecedent_item: &str) -> Option<&'r Rule> {
    rules
        .iter()
        .filter(|rule| rule.antecedent_contains(antecedent_item))
        .min_by(|a, b| rank_by_confidence(a, b))
}

/// The first `n` rules by [`rank_by_confidence`].
pub fn top_n_by_confidence<'r, I>(rules: I, n: NonZeroUsize) -> Vec<&'r Rule>
where
    I: IntoIterator<Item = &'r Rule>,
{
    let mut ranked: Vec<&Rule> = rules.into_iter().collect();

    ranked.sort_by(|a, b| rank_by_confidence(a, b));
    ranked.truncate(n.get());
    ranked
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn rule(antecedent: &str, consequent: &str, confidence: f64, lift: f64) -> Rule {
        // antecedent support 1.0 makes confidence == support
        Rule::from_supports([antecedent], [consequent], 1.0, confidence / lift, confidence)
    }

    fn rules() -> Vec<Rule> {
        vec![
            rule("bread", "milk", 0.4, 1.1),
            rule("coffee", "cake", 0.9, 1.3),
            rule("bread", "coffee", 0.6, 1.2),
            rule("bread", "tea", 0.6, 1.5),
            rule("tea", "bread", 0.7, 1.0),
        ]
    }

    #[test]
    fn best_consequent_picks_highest_confidence() -> TestResult {
        let rules = rules();

        let best = best_consequent(&rules, "bread").ok_or("expected a rule")?;

        // coffee and tea tie on confidence; tea wins on lift
        assert_eq!(best.consequents(), ["tea"]);

        Ok(())
    }

    #[test]
    fn best_consequent_only_considers_matching_antecedents() -> TestResult {
        let rules = rules();

        let best = best_consequent(&rules, "tea").ok_or("expected a rule")?;

        assert!(best.antecedent_contains("tea"));
        assert_eq!(best.consequents(), ["bread"]);

        Ok(())
    }

    #[test]
    fn best_consequent_without_match_is_none() {
        assert!(best_consequent(&rules(), "croissant").is_none());
        assert!(best_consequent(&[], "bread").is_none());
    }

    #[test]
    fn full_ties_keep_generation_order() -> TestResult {
        let rules = vec![
            Rule::from_supports(["a"], ["b"], 0.5, 0.5, 0.25),
            Rule::from_supports(["a"], ["b"], 0.5, 0.5, 0.25),
        ];

        let best = best_consequent(&rules, "a").ok_or("expected a rule")?;

        assert!(std::ptr::eq(best, rules.first().ok_or("empty")?));

        Ok(())
    }

    #[test]
    fn top_n_is_sorted_and_bounded() -> TestResult {
        let rules = rules();
        let n = NonZeroUsize::new(3).ok_or("zero")?;

        let top = top_n_by_confidence(&rules, n);
        let confidences: Vec<f64> = top.iter().map(|rule| rule.confidence()).collect();

        assert_eq!(top.len(), 3);
        assert!(confidences.is_sorted_by(|a, b| a >= b));
        assert_eq!(top.first().map(|rule| rule.consequents()), Some(&["cake".to_string()][..]));

        Ok(())
    }

    #[test]
    fn top_n_larger_than_input_returns_everything() -> TestResult {
        let rules = rules();
        let matching = rules_for_antecedent(&rules, "bread");
        let n = NonZeroUsize::new(10).ok_or("zero")?;

        assert_eq!(matching.len(), 3);
        assert_eq!(top_n_by_confidence(matching, n).len(), 3);

        Ok(())
    }
}
