//! Report
//!
//! Plain-text rendering of a [`Recommendation`].

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{analysis::Recommendation, rules::Rule};

const SUPPORT_EXPLAINED: &str = "How often the combination appears across all transactions.";
const CONFIDENCE_EXPLAINED: &str =
    "Probability that a customer buys item B when they buy item A.";
const LIFT_EXPLAINED: &str =
    "How much stronger the association is than if the items were unrelated.";

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

impl Recommendation {
    /// Writes the recommendation sentence, metric details, the top rules table,
    /// metric explanations and business suggestions; or the empty-result
    /// guidance when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        match self {
            Self::Found { item, best, top } => {
                let consequent = best
                    .consequents()
                    .first()
                    .map_or_else(String::new, Clone::clone);

                write_sentence(&mut out, item, &consequent)?;
                write_details(&mut out, best, top)?;
                write_explanations(&mut out, best)?;
                write_business_suggestions(&mut out, item, &consequent)?;
            }
            Self::NoRules { item } => {
                writeln!(out, "No rules found for item {item}.")?;
                writeln!(
                    out,
                    "Try a different item that is more often bought together with others."
                )?;
            }
        }

        Ok(())
    }
}

/// Writes the distinct items a query can be made for, one per line.
///
/// # Errors
///
/// Returns a [`ReportError`] if writing fails.
pub fn write_items(mut out: impl io::Write, items: &[String]) -> Result<(), ReportError> {
    for item in items {
        writeln!(out, "{item}")?;
    }

    Ok(())
}

fn write_sentence(out: &mut impl io::Write, item: &str, consequent: &str) -> io::Result<()> {
    writeln!(out, "Recommendation")?;
    writeln!(
        out,
        "If customers buy {}, they tend to also buy {}.",
        capitalize(item),
        capitalize(consequent)
    )
}

fn write_details(out: &mut impl io::Write, best: &Rule, top: &[Rule]) -> io::Result<()> {
    writeln!(out, "\nMetric details")?;
    writeln!(out, "  Support:    {:.4}", best.support())?;
    writeln!(out, "  Confidence: {:.4}", best.confidence())?;
    writeln!(out, "  Lift:       {:.4}", best.lift())?;

    let mut builder = Builder::default();

    builder.push_record(["Antecedents", "Consequents", "Support", "Confidence", "Lift"]);

    for rule in top {
        builder.push_record([
            rule.antecedents().join(", "),
            rule.consequents().join(", "),
            format!("{:.4}", rule.support()),
            format!("{:.4}", rule.confidence()),
            format!("{:.4}", rule.lift()),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "\nTop rules ({})\n{table}", top.len())
}

fn write_explanations(out: &mut impl io::Write, best: &Rule) -> io::Result<()> {
    let mut builder = Builder::default();

    builder.push_record(["Metric", "Meaning", "Value"]);
    builder.push_record([
        "Support".to_string(),
        SUPPORT_EXPLAINED.to_string(),
        format!("{:.2}%", best.support() * 100.0),
    ]);
    builder.push_record([
        "Confidence".to_string(),
        CONFIDENCE_EXPLAINED.to_string(),
        format!("{:.2}%", best.confidence() * 100.0),
    ]);
    builder.push_record([
        "Lift".to_string(),
        LIFT_EXPLAINED.to_string(),
        format!("{:.3}", best.lift()),
    ]);

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::last(), Alignment::right());

    writeln!(out, "\nMetrics explained\n{table}")
}

fn write_business_suggestions(
    out: &mut impl io::Write,
    item: &str,
    consequent: &str,
) -> io::Result<()> {
    writeln!(out, "\nBusiness recommendations")?;
    writeln!(out, "Based on this analysis:")?;
    writeln!(out, "  1. Cross-selling: place {consequent} near {item}.")?;
    writeln!(out, "  2. Bundling promotion: offer a {item} + {consequent} bundle.")?;
    writeln!(out, "  3. Automated product recommendations at the till or in the app.")?;
    writeln!(
        out,
        "  4. Stock management: keep both products available when demand rises."
    )
}

/// Uppercases the first character.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();

    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
