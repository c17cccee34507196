//! Regime-switching mid-price process
//!
//! A random walk in tick units whose drift depends on a market regime and
//! whose noise scale depends on a volatility state. Both states switch with
//! a small probability each step.
//!
//! Draw order per step (fixed, so a seed reproduces the path):
//! 1. uniform: regime switch? then uniform index over [`Regime::ALL`]
//! 2. uniform: volatility flip?
//! 3. standard normal shock

use crate::config::GeneratorConfig;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Drift regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    MeanRevert,
    TrendUp,
    TrendDown,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Regime::MeanRevert, Regime::TrendUp, Regime::TrendDown];
}

/// Noise scale state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    High,
}

impl Volatility {
    pub fn toggled(self) -> Self {
        match self {
            Volatility::Low => Volatility::High,
            Volatility::High => Volatility::Low,
        }
    }
}

/// Stateful mid-price walk.
#[derive(Debug, Clone)]
pub struct PriceProcess {
    mid: f64,
    regime: Regime,
    volatility: Volatility,
    base_price: f64,
    tick_size: f64,
    regime_switch_prob: f64,
    trend_strength_ticks: f64,
    mean_reversion_strength: f64,
    sigma_low_ticks: f64,
    sigma_high_ticks: f64,
    volatility_switch_prob: f64,
}

impl PriceProcess {
    /// Start at `base_price` in the mean-reverting, low-volatility state.
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            mid: config.base_price,
            regime: Regime::MeanRevert,
            volatility: Volatility::Low,
            base_price: config.base_price,
            tick_size: config.tick_size,
            regime_switch_prob: config.regime_switch_prob,
            trend_strength_ticks: config.trend_strength_ticks,
            mean_reversion_strength: config.mean_reversion_strength,
            sigma_low_ticks: config.sigma_low_ticks,
            sigma_high_ticks: config.sigma_high_ticks,
            volatility_switch_prob: config.volatility_switch_prob,
        }
    }

    pub fn mid(&self) -> f64 {
        self.mid
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    /// Drift for the current regime, in ticks.
    fn drift_ticks(&self) -> f64 {
        match self.regime {
            Regime::MeanRevert => {
                -self.mean_reversion_strength * (self.mid - self.base_price) / self.tick_size
            }
            Regime::TrendUp => self.trend_strength_ticks,
            Regime::TrendDown => -self.trend_strength_ticks,
        }
    }

    /// Advance one step and return the new mid. Never drops below one tick.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        if rng.gen::<f64>() < self.regime_switch_prob {
            self.regime = Regime::ALL[rng.gen_range(0..Regime::ALL.len())];
        }
        if rng.gen::<f64>() < self.volatility_switch_prob {
            self.volatility = self.volatility.toggled();
        }

        let sigma = match self.volatility {
            Volatility::Low => self.sigma_low_ticks,
            Volatility::High => self.sigma_high_ticks,
        };
        let shock: f64 = rng.sample(StandardNormal);
        let delta_ticks = self.drift_ticks() + sigma * shock;

        self.mid = (self.mid + delta_ticks * self.tick_size).max(self.tick_size);
        self.mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::DepthBookBuilder;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quiet_config() -> GeneratorConfig {
        GeneratorConfig {
            regime_switch_prob: 0.0,
            volatility_switch_prob: 0.0,
            sigma_low_ticks: 0.0,
            sigma_high_ticks: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_at_base() {
        let process = PriceProcess::new(&GeneratorConfig::default());
        assert_eq!(process.mid(), 60000.0);
        assert_eq!(process.regime(), Regime::MeanRevert);
        assert_eq!(process.volatility(), Volatility::Low);
    }

    #[test]
    fn test_same_seed_same_path() {
        let config = GeneratorConfig::default();
        let mut a = PriceProcess::new(&config);
        let mut b = PriceProcess::new(&config);
        let mut rng_a = ChaCha8Rng::seed_from_u64(7);
        let mut rng_b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            assert_eq!(a.step(&mut rng_a), b.step(&mut rng_b));
        }
    }

    #[test]
    fn test_mean_reversion_at_base_is_flat() {
        let mut process = PriceProcess::new(&quiet_config());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(process.step(&mut rng), 60000.0);
        }
    }

    #[test]
    fn test_mean_reversion_pulls_toward_base() {
        let config = GeneratorConfig {
            mean_reversion_strength: 0.5,
            ..quiet_config()
        };
        let mut process = PriceProcess::new(&config);
        process.mid = 60010.0;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let next = process.step(&mut rng);
        assert!(next < 60010.0 && next > 60000.0);
    }

    #[test]
    fn test_trend_moves_by_strength() {
        let config = GeneratorConfig {
            trend_strength_ticks: 2.0,
            ..quiet_config()
        };
        let mut process = PriceProcess::new(&config);
        process.regime = Regime::TrendDown;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let next = process.step(&mut rng);
        assert!((next - 59999.8).abs() < 1e-9);
    }

    #[test]
    fn test_floor_at_one_tick() {
        let config = GeneratorConfig {
            base_price: 0.3,
            trend_strength_ticks: 50.0,
            ..quiet_config()
        };
        let mut process = PriceProcess::new(&config);
        process.regime = Regime::TrendDown;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..5 {
            assert_eq!(process.step(&mut rng), config.tick_size);
        }
    }

    #[test]
    fn test_downtrend_at_floor_still_builds_positive_book() {
        let config = GeneratorConfig {
            base_price: 2.0,
            trend_strength_ticks: 3.0,
            ..quiet_config()
        };
        assert!(config.validate().is_ok());
        let builder = DepthBookBuilder::new(
            config.tick_size,
            config.levels,
            config.depth_profile,
            config.lot_size,
        );
        let mut process = PriceProcess::new(&config);
        process.regime = Regime::TrendDown;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            let ladder = builder.build(process.step(&mut rng));
            assert!(ladder.bids.iter().all(|l| l.price > 0.0));
        }
        assert_eq!(process.mid(), config.tick_size);
        let ladder = builder.build(process.mid());
        assert!((ladder.bids[config.levels - 1].price - config.tick_size).abs() < 1e-9);
    }

    #[test]
    fn test_certain_volatility_switch_flips_every_step() {
        let config = GeneratorConfig {
            volatility_switch_prob: 1.0,
            ..Default::default()
        };
        let mut process = PriceProcess::new(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        process.step(&mut rng);
        assert_eq!(process.volatility(), Volatility::High);
        process.step(&mut rng);
        assert_eq!(process.volatility(), Volatility::Low);
    }
}
