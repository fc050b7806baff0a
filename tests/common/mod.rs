// Common test utilities and helpers

#![allow(dead_code)]

use grid_signal_engine::{Aggression, GridSettings, MarketBias, NoTradeZone, OscillatorKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Settings used by the reference scenario: period 7, 10 grids, neutral,
/// 35-65 no-trade zone, low aggression, classic RSI
pub fn reference_settings() -> GridSettings {
    GridSettings {
        period: 7,
        grids: 10,
        bias: MarketBias::Neutral,
        no_trade_zone: NoTradeZone::Band35To65,
        aggression: Aggression::Low,
        oscillator: OscillatorKind::ClassicRsi,
    }
}

pub fn settings(
    oscillator: OscillatorKind,
    bias: MarketBias,
    no_trade_zone: NoTradeZone,
    aggression: Aggression,
) -> GridSettings {
    GridSettings {
        period: 7,
        grids: 10,
        bias,
        no_trade_zone,
        aggression,
        oscillator,
    }
}

/// Seeded random walk so failures are reproducible
pub fn random_walk(seed: u64, base_price: f64, count: usize, volatility: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut prices = Vec::with_capacity(count);
    let mut current_price = base_price;

    for _ in 0..count {
        let change_pct = rng.gen_range(-volatility..volatility);
        current_price *= 1.0 + change_pct;
        prices.push(current_price);
    }

    prices
}

pub const ALL_OSCILLATORS: [OscillatorKind; 2] = [OscillatorKind::ClassicRsi, OscillatorKind::Rsx];
pub const ALL_AGGRESSION: [Aggression; 3] = [Aggression::Low, Aggression::Medium, Aggression::High];
pub const ALL_ZONES: [NoTradeZone; 5] = [
    NoTradeZone::Off,
    NoTradeZone::Band45To55,
    NoTradeZone::Band40To60,
    NoTradeZone::Band35To65,
    NoTradeZone::Band30To70,
];
