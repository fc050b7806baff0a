// Grid line crossing detection between two consecutive oscillator readings

use serde::Serialize;

use crate::core::grid_ladder::GridLadder;

/// Oscillator readings that every crossing and filter rule looks at
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub previous: f64,
    pub current: f64,
    pub signal_line: f64,
}

/// Highest ladder index crossed on each side; 0 means no crossing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Crossings {
    pub buy_index: usize,
    pub sell_index: usize,
}

impl Crossings {
    pub fn detect(ladder: &GridLadder, reading: &Reading) -> Self {
        Self {
            buy_index: buy_line_index(ladder, reading),
            sell_index: sell_line_index(ladder, reading),
        }
    }

    pub fn buy(&self) -> bool {
        self.buy_index > 0
    }

    pub fn sell(&self) -> bool {
        self.sell_index > 0
    }
}

/// Upward cross through a line, only while the previous reading sat at or
/// below the signal line. Dropping back under 99 from above claims the top line.
pub fn buy_line_index(ladder: &GridLadder, reading: &Reading) -> usize {
    let Reading { previous, current, signal_line } = *reading;

    if previous > 99.0 && current <= 99.0 {
        return ladder.last_index();
    }

    ladder
        .iter()
        .filter(|&(_, line)| previous < line && current >= line && previous <= signal_line)
        .map(|(index, _)| index)
        .last()
        .unwrap_or(0)
}

/// Mirror of [`buy_line_index`]. Climbing back over 1 from below resolves
/// to index 0, which reads as no crossing.
pub fn sell_line_index(ladder: &GridLadder, reading: &Reading) -> usize {
    let Reading { previous, current, signal_line } = *reading;

    if previous < 1.0 && current >= 1.0 {
        return 0;
    }

    ladder
        .iter()
        .filter(|&(_, line)| previous > line && current <= line && previous >= signal_line)
        .map(|(index, _)| index)
        .last()
        .unwrap_or(0)
}
