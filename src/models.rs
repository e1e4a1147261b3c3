use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: String,
    /// Date text as it was handed to the engine.
    pub date: String,
    /// Calendar day parsed from `date`; `None` keeps the record out of temporal views.
    pub day: Option<NaiveDate>,
    pub source: String,
    pub destination: String,
    pub amount: f64,
    pub kind: String,
    pub description: Option<String>,
    pub is_flagged: bool,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        amount: f64,
        kind: impl Into<String>,
    ) -> Self {
        let date = date.into();
        Self {
            id: id.into(),
            day: parse_day(&date),
            date,
            source: source.into(),
            destination: destination.into(),
            amount,
            kind: kind.into(),
            description: None,
            is_flagged: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn flagged(mut self, is_flagged: bool) -> Self {
        self.is_flagged = is_flagged;
        self
    }

    pub fn is_self_transfer(&self) -> bool {
        self.source == self.destination
    }

    pub fn touches(&self, account: &str) -> bool {
        self.source == account || self.destination == account
    }
}

/// Parse a transaction date down to its calendar day. Time-of-day is dropped.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM[:SS]`,
/// RFC 3339 timestamps and US-style `M/D/YYYY`.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    parse_day_mdy(raw)
}

fn parse_day_mdy(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}
