//! Read-only tape inspection
//!
//! Named event filters and a summary of a record array: row count, time
//! range with a human-scaled duration, and counts per category and side.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;
use types::flags::{EventFlags, BUY, DEPTH_SNAPSHOT, DEPTH_UPDATE, SELL, TRADE};
use types::record::EventRecord;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown filter '{name}'. Available: {available}")]
pub struct UnknownFilter {
    pub name: String,
    pub available: String,
}

/// Human-friendly selection of records by flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventFilter {
    Trade,
    TradeBuy,
    TradeSell,
    Depth,
    DepthBid,
    DepthAsk,
    Snapshot,
    SnapshotBid,
    SnapshotAsk,
}

impl EventFilter {
    pub const ALL: [EventFilter; 9] = [
        EventFilter::Trade,
        EventFilter::TradeBuy,
        EventFilter::TradeSell,
        EventFilter::Depth,
        EventFilter::DepthBid,
        EventFilter::DepthAsk,
        EventFilter::Snapshot,
        EventFilter::SnapshotBid,
        EventFilter::SnapshotAsk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventFilter::Trade => "trade",
            EventFilter::TradeBuy => "trade_buy",
            EventFilter::TradeSell => "trade_sell",
            EventFilter::Depth => "depth",
            EventFilter::DepthBid => "depth_bid",
            EventFilter::DepthAsk => "depth_ask",
            EventFilter::Snapshot => "snapshot",
            EventFilter::SnapshotBid => "snapshot_bid",
            EventFilter::SnapshotAsk => "snapshot_ask",
        }
    }

    /// Bits that must all be set for a record to match.
    pub fn mask(self) -> u64 {
        match self {
            EventFilter::Trade => TRADE,
            EventFilter::TradeBuy => TRADE | BUY,
            EventFilter::TradeSell => TRADE | SELL,
            EventFilter::Depth => DEPTH_UPDATE,
            EventFilter::DepthBid => DEPTH_UPDATE | BUY,
            EventFilter::DepthAsk => DEPTH_UPDATE | SELL,
            EventFilter::Snapshot => DEPTH_SNAPSHOT,
            EventFilter::SnapshotBid => DEPTH_SNAPSHOT | BUY,
            EventFilter::SnapshotAsk => DEPTH_SNAPSHOT | SELL,
        }
    }

    pub fn matches(self, flags: u64) -> bool {
        flags & self.mask() == self.mask()
    }

    /// Sorted, comma-separated filter names.
    pub fn available() -> String {
        let mut names: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

impl FromStr for EventFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownFilter {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records matching ANY of `filters`; all records when `filters` is empty.
pub fn filter_records(records: &[EventRecord], filters: &[EventFilter]) -> Vec<EventRecord> {
    if filters.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| filters.iter().any(|f| f.matches(r.flags)))
        .copied()
        .collect()
}

/// Counts per category and side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub depth_bid: usize,
    pub depth_ask: usize,
    pub snapshot_bid: usize,
    pub snapshot_ask: usize,
    pub trade_buy: usize,
    pub trade_sell: usize,
    /// Rows whose flag word fails validation
    pub invalid: usize,
}

impl EventCounts {
    pub fn trades(&self) -> usize {
        self.trade_buy + self.trade_sell
    }
}

/// Overview of a record array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TapeSummary {
    pub records: usize,
    /// First and last `exch_ts`, in row order
    pub start_ns: Option<i64>,
    pub end_ns: Option<i64>,
    pub counts: EventCounts,
}

impl TapeSummary {
    pub fn from_records(records: &[EventRecord]) -> Self {
        let mut counts = EventCounts::default();
        for record in records {
            let Ok(flags) = EventFlags::decode(record.flags) else {
                counts.invalid += 1;
                continue;
            };
            let buy = flags.contains(BUY);
            let slot = match (flags.contains(TRADE), flags.contains(DEPTH_SNAPSHOT), buy) {
                (true, _, true) => &mut counts.trade_buy,
                (true, _, false) => &mut counts.trade_sell,
                (false, true, true) => &mut counts.snapshot_bid,
                (false, true, false) => &mut counts.snapshot_ask,
                (false, false, true) => &mut counts.depth_bid,
                (false, false, false) => &mut counts.depth_ask,
            };
            *slot += 1;
        }
        if counts.invalid > 0 {
            warn!(invalid = counts.invalid, "Records with invalid flags");
        }
        Self {
            records: records.len(),
            start_ns: records.first().map(|r| r.exch_ts),
            end_ns: records.last().map(|r| r.exch_ts),
            counts,
        }
    }

    /// Span between the first and last row, in nanoseconds. `None` when
    /// empty or when the span does not fit in an i64.
    pub fn duration_ns(&self) -> Option<i64> {
        self.end_ns?.checked_sub(self.start_ns?)
    }
}

/// Render a nanosecond span in seconds below two minutes, minutes below two
/// hours, hours otherwise.
pub fn format_duration(duration_ns: i64) -> String {
    let secs = duration_ns as f64 / 1e9;
    if secs < 120.0 {
        format!("{:.2} seconds", secs)
    } else if secs < 7200.0 {
        format!("{:.2} minutes", secs / 60.0)
    } else {
        format!("{:.2} hours", secs / 3600.0)
    }
}

/// RFC 3339 UTC rendering of a nanosecond timestamp.
pub fn format_timestamp(ts_ns: i64) -> String {
    DateTime::<Utc>::from_timestamp_nanos(ts_ns).to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

/// One row as a fixed-width text line.
pub fn format_record(index: usize, record: &EventRecord) -> String {
    let flags = match EventFlags::decode(record.flags) {
        Ok(flags) => flags.to_string(),
        Err(_) => format!("{:#x}", record.flags),
    };
    format!(
        "{:>8}  {:<26} {:>20} {:>20} {:>14.4} {:>12.6}",
        index, flags, record.exch_ts, record.local_ts, record.price, record.quantity
    )
}

impl fmt::Display for TapeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "records  : {}", self.records)?;
        if let (Some(start), Some(end)) = (self.start_ns, self.end_ns) {
            writeln!(f, "Time range (exch_ts):")?;
            writeln!(f, "  start ns : {} ({})", start, format_timestamp(start))?;
            writeln!(f, "  end   ns : {} ({})", end, format_timestamp(end))?;
            match self.duration_ns() {
                Some(duration) => writeln!(f, "  duration : {}", format_duration(duration))?,
                None => writeln!(f, "  duration : out of range")?,
            }
        }
        let c = &self.counts;
        writeln!(f, "Events:")?;
        writeln!(f, "  depth    : {} bid / {} ask", c.depth_bid, c.depth_ask)?;
        writeln!(f, "  snapshot : {} bid / {} ask", c.snapshot_bid, c.snapshot_ask)?;
        write!(f, "  trade    : {} buy / {} sell", c.trade_buy, c.trade_sell)?;
        if c.invalid > 0 {
            write!(f, "\n  invalid  : {}", c.invalid)?;
        }
        Ok(())
    }
}
