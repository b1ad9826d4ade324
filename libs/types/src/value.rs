//! Closed value model for TYTX payloads
//!
//! Every value flowing through the codec is one of these variants. The
//! variants that JSON cannot represent exactly (Decimal, Date, Time,
//! DateTime) are the ones the suffix grammar marks on the wire; the rest
//! pass through containers natively.
//!
//! Maps preserve insertion order with a pair vector. Key order is
//! semantically significant for delimited-schema output and must survive
//! a decode/encode round trip.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use rust_decimal::Decimal;

/// A TYTX value: the closed tagged union the codec operates on
#[derive(Debug, Clone, PartialEq)]
pub enum TytxValue {
    /// Explicit absence; serialized with the NN marker on text targets
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Arbitrary-precision decimal (type code N)
    Decimal(Decimal),
    Str(String),
    /// Calendar date without time component (type code D)
    Date(NaiveDate),
    /// Wall-clock time without date component (type code H)
    Time(NaiveTime),
    /// Timezone-aware instant, always UTC (type code DHZ)
    DateTime(DateTime<Utc>),
    List(Vec<TytxValue>),
    /// Order-preserving key/value pairs
    Map(Vec<(String, TytxValue)>),
}

impl TytxValue {
    /// Short kind label for diagnostics and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            TytxValue::None => "none",
            TytxValue::Bool(_) => "bool",
            TytxValue::Int(_) => "int",
            TytxValue::Float(_) => "float",
            TytxValue::Decimal(_) => "decimal",
            TytxValue::Str(_) => "str",
            TytxValue::Date(_) => "date",
            TytxValue::Time(_) => "time",
            TytxValue::DateTime(_) => "datetime",
            TytxValue::List(_) => "list",
            TytxValue::Map(_) => "map",
        }
    }

    /// True for Date, Time and DateTime variants
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            TytxValue::Date(_) | TytxValue::Time(_) | TytxValue::DateTime(_)
        )
    }

    /// True for every non-container variant
    pub fn is_scalar(&self) -> bool {
        !matches!(self, TytxValue::List(_) | TytxValue::Map(_))
    }

    /// True when a container format would lose this value's type
    ///
    /// These are exactly the leaves that force suffix markers inside JSON
    /// containers and the ext-42 wrapper on MessagePack targets.
    pub fn is_lossy_leaf(&self) -> bool {
        matches!(self, TytxValue::Decimal(_)) || self.is_temporal()
    }

    /// Classify a host UTC datetime into exactly one temporal variant
    ///
    /// The three predicates are mutually exclusive and total:
    /// - epoch day (1970-01-01) carries only a time-of-day -> `Time`
    /// - midnight on any other day carries only a date -> `Date`
    /// - everything else is a full instant -> `DateTime`
    ///
    /// Producers must route host datetimes through this constructor so
    /// that every adapter classifies identically; ad-hoc classification
    /// is how ports drift apart.
    pub fn from_utc_datetime(dt: DateTime<Utc>) -> Self {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid");
        if dt.date_naive() == epoch {
            TytxValue::Time(dt.time())
        } else if dt.time().num_seconds_from_midnight() == 0 && dt.time().nanosecond() == 0 {
            TytxValue::Date(dt.date_naive())
        } else {
            TytxValue::DateTime(dt)
        }
    }

    /// Borrow the string content if this is a Str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TytxValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Look up a key in a Map value
    pub fn get(&self, key: &str) -> Option<&TytxValue> {
        match self {
            TytxValue::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for TytxValue {
    fn from(v: bool) -> Self {
        TytxValue::Bool(v)
    }
}

impl From<i64> for TytxValue {
    fn from(v: i64) -> Self {
        TytxValue::Int(v)
    }
}

impl From<f64> for TytxValue {
    fn from(v: f64) -> Self {
        TytxValue::Float(v)
    }
}

impl From<Decimal> for TytxValue {
    fn from(v: Decimal) -> Self {
        TytxValue::Decimal(v)
    }
}

impl From<&str> for TytxValue {
    fn from(v: &str) -> Self {
        TytxValue::Str(v.to_string())
    }
}

impl From<String> for TytxValue {
    fn from(v: String) -> Self {
        TytxValue::Str(v)
    }
}

impl From<NaiveDate> for TytxValue {
    fn from(v: NaiveDate) -> Self {
        TytxValue::Date(v)
    }
}

impl From<NaiveTime> for TytxValue {
    fn from(v: NaiveTime) -> Self {
        TytxValue::Time(v)
    }
}

impl From<DateTime<Utc>> for TytxValue {
    fn from(v: DateTime<Utc>) -> Self {
        TytxValue::from_utc_datetime(v)
    }
}

impl From<Vec<TytxValue>> for TytxValue {
    fn from(v: Vec<TytxValue>) -> Self {
        TytxValue::List(v)
    }
}
