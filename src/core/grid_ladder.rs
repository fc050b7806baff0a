// Fixed ladder of oscillator grid lines spanning 1..99

use serde::Serialize;

const LOWEST_LINE: f64 = 1.0;
const HIGHEST_LINE: f64 = 99.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLadder {
    lines: Vec<f64>,
}

impl GridLadder {
    /// Build `grids + 1` evenly spaced lines across 0..100, with the end
    /// points pulled in to 1 and 99 so they never sit on the oscillator's
    /// clamp limits.
    pub fn new(grids: usize) -> Self {
        let count = grids.max(1) + 1;
        let step = 100.0 / (count - 1) as f64;

        let mut lines: Vec<f64> = (0..count)
            .map(|i| (step * i as f64).clamp(LOWEST_LINE, HIGHEST_LINE))
            .collect();
        lines[0] = LOWEST_LINE;
        lines[count - 1] = HIGHEST_LINE;

        Self { lines }
    }

    /// Line value at `index`, or 0.0 when out of range. Callers treat 0.0 as
    /// "no line" rather than a real threshold.
    pub fn value(&self, index: usize) -> f64 {
        self.lines.get(index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn lines(&self) -> &[f64] {
        &self.lines
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.lines.iter().copied().enumerate()
    }
}
