// Suppression filters applied to crossing candidates
//
// Filters run in a fixed order (aggression, no-trade zone, direction) and
// may only clear a flag, never raise one.

use serde::Serialize;

use crate::core::crossing::Reading;
use crate::core::grid_ladder::GridLadder;
use crate::core::types::{Aggression, MarketBias, NoTradeZone};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalFlags {
    pub buy: bool,
    pub sell: bool,
}

impl SignalFlags {
    pub fn new(buy: bool, sell: bool) -> Self {
        Self { buy, sell }
    }

    pub fn any(&self) -> bool {
        self.buy || self.sell
    }
}

/// Flags after each stage, kept for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterTrace {
    pub crossing: SignalFlags,
    pub after_aggression: SignalFlags,
    pub after_no_trade_zone: SignalFlags,
    pub after_direction: SignalFlags,
}

#[derive(Debug, Clone)]
pub struct FilterPipeline {
    aggression: Aggression,
    no_trade_zone: NoTradeZone,
    bias: MarketBias,
}

impl FilterPipeline {
    pub fn new(aggression: Aggression, no_trade_zone: NoTradeZone, bias: MarketBias) -> Self {
        Self {
            aggression,
            no_trade_zone,
            bias,
        }
    }

    pub fn apply(&self, ladder: &GridLadder, reading: &Reading, flags: SignalFlags) -> FilterTrace {
        let after_aggression = self.aggression_filter(ladder, reading, flags);
        let after_no_trade_zone = self.no_trade_zone_filter(reading, after_aggression);
        let after_direction = self.direction_filter(ladder, reading, after_no_trade_zone);

        FilterTrace {
            crossing: flags,
            after_aggression,
            after_no_trade_zone,
            after_direction,
        }
    }

    /// Keeps new signals away from the line that produced the last one
    fn aggression_filter(&self, ladder: &GridLadder, reading: &Reading, mut flags: SignalFlags) -> SignalFlags {
        let level = self.aggression.level();

        if level > 0 {
            let top_value = ladder
                .last_index()
                .checked_sub(level)
                .map(|index| ladder.value(index))
                .unwrap_or(0.0);
            let bottom_value = ladder.value(1 + level);

            if reading.current > reading.signal_line && reading.previous >= bottom_value {
                flags.buy = false;
            }
            if reading.current < reading.signal_line && reading.previous <= top_value {
                flags.sell = false;
            }
        } else {
            let interval = grid_interval(ladder);
            if reading.previous > reading.signal_line - interval {
                flags.buy = false;
            }
            if reading.previous < reading.signal_line + interval {
                flags.sell = false;
            }
        }

        flags
    }

    fn no_trade_zone_filter(&self, reading: &Reading, mut flags: SignalFlags) -> SignalFlags {
        if self.no_trade_zone.contains(reading.previous) {
            flags.buy = false;
            flags.sell = false;
        }
        flags
    }

    /// Blocks trades against the configured market bias within two grid
    /// intervals of the signal line
    fn direction_filter(&self, ladder: &GridLadder, reading: &Reading, mut flags: SignalFlags) -> SignalFlags {
        let band = 2.0 * grid_interval(ladder);

        match self.bias {
            MarketBias::Down => {
                if reading.current >= reading.signal_line - band {
                    flags.buy = false;
                }
            }
            MarketBias::Up => {
                if reading.current <= reading.signal_line + band {
                    flags.sell = false;
                }
            }
            MarketBias::Neutral => {}
        }

        flags
    }
}

fn grid_interval(ladder: &GridLadder) -> f64 {
    100.0 / ladder.last_index() as f64
}
