//! Generation parameters
//!
//! [`GeneratorConfig`] carries every knob of a run. Missing JSON fields take
//! the documented defaults; [`GeneratorConfig::validate`] rejects unusable
//! values before any event is produced.

use crate::depth::DepthProfile;
use serde::{Deserialize, Serialize};
use types::errors::ConfigError;

/// Full parameter set for one generated tape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of periodic steps
    pub n_steps: u64,
    /// Spacing between steps in ns
    pub interval_ns: i64,
    pub tick_size: f64,
    /// Base quantity unit
    pub lot_size: f64,
    /// Starting mid and mean-reversion anchor
    pub base_price: f64,
    /// Depth levels per side
    pub levels: usize,
    /// Exchange timestamp of step 0 and of the initial snapshot
    pub base_exch_ts_ns: i64,
    /// Added to exch_ts to get local_ts
    pub feed_latency_ns: i64,
    pub regime_switch_prob: f64,
    pub trend_strength_ticks: f64,
    pub mean_reversion_strength: f64,
    pub sigma_low_ticks: f64,
    pub sigma_high_ticks: f64,
    pub volatility_switch_prob: f64,
    pub depth_profile: DepthProfile,
    pub trade_prob: f64,
    pub max_trades_per_step: u32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_steps: 1000,
            interval_ns: 100_000_000,
            tick_size: 0.1,
            lot_size: 0.001,
            base_price: 60000.0,
            levels: 10,
            base_exch_ts_ns: 1_723_161_256_000_000_000,
            feed_latency_ns: 1_000_000,
            regime_switch_prob: 0.01,
            trend_strength_ticks: 0.1,
            mean_reversion_strength: 0.02,
            sigma_low_ticks: 0.2,
            sigma_high_ticks: 0.7,
            volatility_switch_prob: 0.03,
            depth_profile: DepthProfile::Linear,
            trade_prob: 0.7,
            max_trades_per_step: 2,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Reject parameters that cannot produce a valid tape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tick_size", self.tick_size)?;
        positive("lot_size", self.lot_size)?;
        positive("base_price", self.base_price)?;

        if self.n_steps == 0 {
            return Err(ConfigError::Zero { name: "n_steps", value: 0 });
        }
        if self.levels == 0 {
            return Err(ConfigError::Zero { name: "levels", value: 0 });
        }

        self.book_fits_above_zero()?;

        probability("regime_switch_prob", self.regime_switch_prob)?;
        probability("volatility_switch_prob", self.volatility_switch_prob)?;
        probability("trade_prob", self.trade_prob)?;

        non_negative("sigma_low_ticks", self.sigma_low_ticks)?;
        non_negative("sigma_high_ticks", self.sigma_high_ticks)?;
        non_negative("trend_strength_ticks", self.trend_strength_ticks)?;
        non_negative("mean_reversion_strength", self.mean_reversion_strength)?;

        non_negative_nanos("interval_ns", self.interval_ns)?;
        non_negative_nanos("feed_latency_ns", self.feed_latency_ns)?;
        non_negative_nanos("base_exch_ts_ns", self.base_exch_ts_ns)?;

        self.buffer_capacity()?;
        self.last_local_ts()?;
        Ok(())
    }

    /// The starting book must fit above zero and its deepest level must
    /// still carry quantity.
    fn book_fits_above_zero(&self) -> Result<(), ConfigError> {
        let min = self.levels as f64 * self.tick_size;
        if self.base_price <= min {
            return Err(ConfigError::BelowBookDepth {
                name: "base_price",
                value: self.base_price,
                min,
            });
        }
        let deepest = self.depth_profile.quantity(self.lot_size, self.levels - 1);
        if !(deepest.is_finite() && deepest > 0.0) {
            return Err(ConfigError::DeepestLevelQuantity {
                name: "levels",
                value: self.levels,
            });
        }
        Ok(())
    }

    /// Records one step can emit: two per level plus the trade cap.
    pub fn events_per_step(&self) -> Option<u64> {
        (self.levels as u64)
            .checked_mul(2)?
            .checked_add(self.max_trades_per_step as u64)
    }

    /// Preallocation size for the periodic stream.
    pub fn buffer_capacity(&self) -> Result<usize, ConfigError> {
        let overflow = || ConfigError::BufferOverflow {
            n_steps: self.n_steps,
            per_step: self.events_per_step().unwrap_or(u64::MAX),
        };
        let per_step = self.events_per_step().ok_or_else(overflow)?;
        let total = self.n_steps.checked_mul(per_step).ok_or_else(overflow)?;
        usize::try_from(total).map_err(|_| overflow())
    }

    /// Local timestamp of the last step; fails if any step would overflow.
    pub fn last_local_ts(&self) -> Result<i64, ConfigError> {
        let overflow = || ConfigError::TimestampOverflow { n_steps: self.n_steps };
        let last_step = i64::try_from(self.n_steps.saturating_sub(1)).map_err(|_| overflow())?;
        last_step
            .checked_mul(self.interval_ns)
            .and_then(|offset| self.base_exch_ts_ns.checked_add(offset))
            .and_then(|ts| ts.checked_add(self.feed_latency_ns))
            .ok_or_else(overflow)
    }

    /// Load from a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn non_negative_nanos(name: &'static str, value: i64) -> Result<(), ConfigError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeNanos { name, value })
    }
}
