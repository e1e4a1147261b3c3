use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Notice;
use crate::flags::{any_flagged, Constituents};
use crate::models::Transaction;

/// Money moved from one account to another within one calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct FlowBand<'a> {
    pub source: String,
    pub destination: String,
    pub day: NaiveDate,
    pub amount: f64,
    pub flagged: bool,
    #[serde(rename = "transaction_ids", serialize_with = "serialize_ids")]
    pub transactions: Vec<&'a Transaction>,
}

fn serialize_ids<S: Serializer>(txns: &[&Transaction], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_seq(txns.iter().map(|t| t.id.as_str()))
}

impl<'a> Constituents for FlowBand<'a> {
    fn constituents(&self) -> &[&Transaction] {
        &self.transactions
    }
}

/// An account's running balance right after one band was applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalanceSample {
    pub account: String,
    pub day: NaiveDate,
    pub balance: f64,
    pub inflow: f64,
    pub outflow: f64,
}

impl AccountBalanceSample {
    /// Size of the balance for display; the sign lives in `balance`.
    pub fn magnitude(&self) -> f64 {
        self.balance.abs()
    }
}

/// Inclusive day range; a missing side is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DayWindow {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from.map_or(true, |f| day >= f) && self.to.map_or(true, |t| day <= t)
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountFlowSummary {
    pub account: String,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub final_balance: f64,
    pub peak_magnitude: f64,
    pub samples: usize,
}

/// Chronological bands and the per-account balance histories they produce.
#[derive(Debug, Clone, Serialize)]
pub struct TemporalFlow<'a> {
    pub bands: Vec<FlowBand<'a>>,
    pub histories: BTreeMap<String, Vec<AccountBalanceSample>>,
    pub notices: Vec<Notice>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Bucket transactions by (source, destination, day) and order the buckets
/// by day. Buckets on the same day keep first-encountered order.
/// Transactions without a parsable day are left out and reported.
pub fn aggregate_bands<'a>(transactions: &[&'a Transaction]) -> (Vec<FlowBand<'a>>, Vec<Notice>) {
    let mut bands: Vec<FlowBand<'a>> = Vec::new();
    let mut slots: HashMap<(&str, &str, NaiveDate), usize> = HashMap::new();
    let mut notices = Vec::new();

    for &t in transactions {
        let Some(day) = t.day else {
            notices.push(
                Notice::MalformedDate {
                    transaction_id: t.id.clone(),
                    raw: t.date.clone(),
                }
                .report(),
            );
            continue;
        };
        let key = (t.source.as_str(), t.destination.as_str(), day);
        let slot = *slots.entry(key).or_insert_with(|| {
            bands.push(FlowBand {
                source: t.source.clone(),
                destination: t.destination.clone(),
                day,
                amount: 0.0,
                flagged: false,
                transactions: Vec::new(),
            });
            bands.len() - 1
        });
        let band = &mut bands[slot];
        band.amount += t.amount;
        band.transactions.push(t);
    }

    for band in &mut bands {
        band.flagged = any_flagged(&band.transactions);
    }
    bands.sort_by_key(|b| b.day);
    (bands, notices)
}

/// Apply bands in order to per-account balances starting at zero.
///
/// A regular band appends one sample to the source history and one to the
/// destination history. A self-transfer band appends a single sample with
/// inflow and outflow both equal to its amount and the balance unchanged.
pub fn replay(bands: &[FlowBand]) -> BTreeMap<String, Vec<AccountBalanceSample>> {
    let mut balances: HashMap<&str, f64> = HashMap::new();
    let mut histories: BTreeMap<String, Vec<AccountBalanceSample>> = BTreeMap::new();

    for band in bands {
        if band.source == band.destination {
            let balance = *balances.entry(band.source.as_str()).or_insert(0.0);
            histories
                .entry(band.source.clone())
                .or_default()
                .push(AccountBalanceSample {
                    account: band.source.clone(),
                    day: band.day,
                    balance,
                    inflow: band.amount,
                    outflow: band.amount,
                });
            continue;
        }

        let src = balances.entry(band.source.as_str()).or_insert(0.0);
        *src -= band.amount;
        let src_balance = *src;
        let dst = balances.entry(band.destination.as_str()).or_insert(0.0);
        *dst += band.amount;
        let dst_balance = *dst;

        histories
            .entry(band.source.clone())
            .or_default()
            .push(AccountBalanceSample {
                account: band.source.clone(),
                day: band.day,
                balance: src_balance,
                inflow: 0.0,
                outflow: band.amount,
            });
        histories
            .entry(band.destination.clone())
            .or_default()
            .push(AccountBalanceSample {
                account: band.destination.clone(),
                day: band.day,
                balance: dst_balance,
                inflow: band.amount,
                outflow: 0.0,
            });
    }
    histories
}

/// Bands plus replayed histories for a filtered transaction set.
pub fn aggregate<'a>(transactions: &[&'a Transaction]) -> TemporalFlow<'a> {
    let (bands, notices) = aggregate_bands(transactions);
    let histories = replay(&bands);
    log::debug!(
        "flow: {} transactions -> {} bands across {} accounts",
        transactions.len(),
        bands.len(),
        histories.len()
    );
    TemporalFlow {
        bands,
        histories,
        notices,
    }
}

impl<'a> TemporalFlow<'a> {
    /// First and last day covered by any band.
    pub fn day_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.bands.first()?.day, self.bands.last()?.day))
    }

    /// Bands and samples inside `window`. Balances keep the values from the
    /// full replay, so the first visible sample carries earlier history.
    pub fn restrict(&self, window: &DayWindow) -> TemporalFlow<'a> {
        let bands = self
            .bands
            .iter()
            .filter(|b| window.contains(b.day))
            .cloned()
            .collect();
        let histories = self
            .histories
            .iter()
            .filter_map(|(account, samples)| {
                let visible: Vec<AccountBalanceSample> = samples
                    .iter()
                    .filter(|s| window.contains(s.day))
                    .cloned()
                    .collect();
                (!visible.is_empty()).then(|| (account.clone(), visible))
            })
            .collect();
        TemporalFlow {
            bands,
            histories,
            notices: self.notices.clone(),
        }
    }

    pub fn history(&self, account: &str) -> &[AccountBalanceSample] {
        self.histories.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn flagged_bands(&self) -> impl Iterator<Item = &FlowBand<'a>> {
        self.bands.iter().filter(|b| b.is_flagged())
    }

    /// Per-account totals for scaling a ribbon view, ordered by account id.
    pub fn summarize(&self) -> Vec<AccountFlowSummary> {
        self.histories
            .iter()
            .map(|(account, samples)| AccountFlowSummary {
                account: account.clone(),
                total_inflow: samples.iter().map(|s| s.inflow).sum(),
                total_outflow: samples.iter().map(|s| s.outflow).sum(),
                final_balance: samples.last().map(|s| s.balance).unwrap_or(0.0),
                peak_magnitude: samples.iter().map(|s| s.magnitude()).fold(0.0, f64::max),
                samples: samples.len(),
            })
            .collect()
    }
}
