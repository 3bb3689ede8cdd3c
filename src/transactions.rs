//! Transactions
//!
//! The raw transaction log a basket matrix is built from, plus the predicates
//! used to narrow it down before any mining happens.

use std::{fmt, str::FromStr};

use jiff::civil::{DateTime, Weekday};
use thiserror::Error;

/// Item preferred as the initial selection when it exists in a log.
pub const PREFERRED_DEFAULT_ITEM: &str = "bread";

/// Normalises a free-text item name: surrounding whitespace is trimmed and the
/// result lowercased.
pub fn normalize_item(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Opaque transaction identifier, reused across the rows of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates an identifier, trimming surrounding whitespace.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for TransactionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Errors parsing a categorical attribute.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    /// Unknown period of day.
    #[error("unknown period of day: {0}")]
    UnknownPeriod(String),

    /// Unknown day type.
    #[error("unknown day type: {0}")]
    UnknownDayType(String),
}

/// Part of the day a transaction happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum PeriodOfDay {
    /// Morning
    Morning,

    /// Afternoon
    Afternoon,

    /// Evening
    Evening,

    /// Night
    Night,
}

impl FromStr for PeriodOfDay {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            "night" => Ok(Self::Night),
            _ => Err(AttributeError::UnknownPeriod(s.to_string())),
        }
    }
}

/// Whether a transaction happened on a weekday or at the weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum DayType {
    /// Monday to Friday
    Weekday,

    /// Saturday and Sunday
    Weekend,
}

impl DayType {
    /// Day type of the given calendar weekday.
    pub fn of(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Saturday | Weekday::Sunday => Self::Weekend,
            _ => Self::Weekday,
        }
    }
}

impl FromStr for DayType {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekday" => Ok(Self::Weekday),
            "weekend" => Ok(Self::Weekend),
            _ => Err(AttributeError::UnknownDayType(s.to_string())),
        }
    }
}

/// A single (transaction, item) line of the log.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    transaction: TransactionId,
    item: String,
    timestamp: Option<DateTime>,
    period: Option<PeriodOfDay>,
    day_type: Option<DayType>,
}

impl TransactionRecord {
    /// Creates a record, normalising the item name.
    pub fn new(transaction: impl Into<TransactionId>, item: &str) -> Self {
        Self {
            transaction: transaction.into(),
            item: normalize_item(item),
            timestamp: None,
            period: None,
            day_type: None,
        }
    }

    /// Attach the time the transaction happened.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Attach the period of day.
    #[must_use]
    pub fn with_period(mut self, period: PeriodOfDay) -> Self {
        self.period = Some(period);
        self
    }

    /// Attach the day type.
    #[must_use]
    pub fn with_day_type(mut self, day_type: DayType) -> Self {
        self.day_type = Some(day_type);
        self
    }

    /// Transaction identifier.
    pub fn transaction(&self) -> &TransactionId {
        &self.transaction
    }

    /// Normalised item name.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Time of the transaction, if known.
    pub fn timestamp(&self) -> Option<DateTime> {
        self.timestamp
    }

    /// Period of day, if known.
    pub fn period(&self) -> Option<PeriodOfDay> {
        self.period
    }

    /// Day type, falling back to the timestamp's weekday when not recorded.
    pub fn day_type(&self) -> Option<DayType> {
        self.day_type
            .or_else(|| self.timestamp.map(|ts| DayType::of(ts.weekday())))
    }

    /// Calendar month (1-12), if the timestamp is known.
    pub fn month(&self) -> Option<u8> {
        self.timestamp.and_then(|ts| u8::try_from(ts.month()).ok())
    }

    /// Day of week (0-6, Monday = 0), if the timestamp is known.
    pub fn weekday(&self) -> Option<u8> {
        self.timestamp
            .and_then(|ts| u8::try_from(ts.weekday().to_monday_zero_offset()).ok())
    }
}

/// Errors validating a [`TransactionFilter`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Month outside 1-12.
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u8),

    /// Weekday outside 0-6.
    #[error("weekday must be between 0 (Monday) and 6 (Sunday), got {0}")]
    WeekdayOutOfRange(u8),
}

/// Predicate over the raw transaction log, applied before basket construction.
///
/// Every populated field must match. A record that lacks the attribute a
/// populated field asks about is excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TransactionFilter {
    /// Period of day.
    pub period: Option<PeriodOfDay>,

    /// Weekday or weekend.
    pub day_type: Option<DayType>,

    /// Calendar month, 1-12.
    pub month: Option<u8>,

    /// Day of week, 0-6 with Monday = 0.
    pub weekday: Option<u8>,
}

impl TransactionFilter {
    /// Filter that keeps every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether no field is populated.
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the numeric fields are in range.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] for an out-of-range month or weekday.
    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some(month) = self.month
            && !(1..=12).contains(&month)
        {
            return Err(FilterError::MonthOutOfRange(month));
        }

        if let Some(weekday) = self.weekday
            && weekday > 6
        {
            return Err(FilterError::WeekdayOutOfRange(weekday));
        }

        Ok(())
    }

    /// Whether the record satisfies every populated field.
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        fn field<T: PartialEq>(wanted: Option<T>, actual: Option<T>) -> bool {
            wanted.is_none_or(|wanted| actual == Some(wanted))
        }

        field(self.period, record.period())
            && field(self.day_type, record.day_type())
            && field(self.month, record.month())
            && field(self.weekday, record.weekday())
    }
}

/// Content hash of a transaction log, used to key derived artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// Transaction log, loaded once per session and never mutated.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    records: Vec<TransactionRecord>,
    fingerprint: Fingerprint,
}

impl TransactionLog {
    /// Wraps the records and fingerprints their contents.
    pub fn new(records: impl Into<Vec<TransactionRecord>>) -> Self {
        let records = records.into();
        let fingerprint = fingerprint(&records);

        Self {
            records,
            fingerprint,
        }
    }

    /// All records, in load order.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Number of records (line items, not transactions).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Content fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Distinct item names, sorted.
    pub fn distinct_items(&self) -> Vec<String> {
        let mut items: Vec<String> = self
            .records
            .iter()
            .map(|record| record.item().to_string())
            .collect();

        items.sort_unstable();
        items.dedup();
        items
    }

    /// The item a selector should start on: `bread` when present, otherwise
    /// the first item alphabetically.
    pub fn default_item(&self) -> Option<String> {
        let items = self.distinct_items();

        if items.iter().any(|item| item == PREFERRED_DEFAULT_ITEM) {
            return Some(PREFERRED_DEFAULT_ITEM.to_string());
        }

        items.into_iter().next()
    }

    /// Records matching the filter, in load order.
    pub fn filtered<'a>(
        &'a self,
        filter: &'a TransactionFilter,
    ) -> impl Iterator<Item = &'a TransactionRecord> + 'a {
        self.records.iter().filter(move |record| filter.matches(record))
    }
}

fn fingerprint(records: &[TransactionRecord]) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();

    for record in records {
        hasher.update(record.transaction.as_str().as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(record.item.as_bytes());
        hasher.update(&[0x1f]);

        if let Some(ts) = record.timestamp {
            hasher.update(ts.to_string().as_bytes());
        }

        hasher.update(&[0x1f]);
        hasher.update(format!("{:?}|{:?}", record.period, record.day_type).as_bytes());
        hasher.update(&[0x1e]);
    }

    Fingerprint(hasher.finalize())
}
