// Grid signal state machine: oscillator -> crossings -> filters -> signal

use serde::Serialize;
use tracing::{debug, info};

use crate::core::crossing::{Crossings, Reading};
use crate::core::filters::{FilterPipeline, FilterTrace, SignalFlags};
use crate::core::grid_ladder::GridLadder;
use crate::core::indicator::Oscillator;
use crate::core::types::{GridSettings, Signal};
use crate::error::{EngineError, EngineResult};

const INITIAL_SIGNAL_LINE: f64 = 50.0;

/// Everything decided for one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDecision {
    pub price: f64,
    pub oscillator: f64,
    /// `None` on the warm-up sample
    pub previous_oscillator: Option<f64>,
    pub crossings: Crossings,
    pub filters: FilterTrace,
    pub signal: Signal,
    /// Signal line the sample was judged against
    pub prior_signal_line: f64,
    /// Signal line after this sample
    pub signal_line: f64,
}

/// Carry-over state between samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    pub previous_oscillator: Option<f64>,
    pub last_signal: i8,
    pub last_signal_index: usize,
    pub signal_line: f64,
    pub samples_processed: u64,
}

/// Long-lived per-strategy signal generator. Not thread safe: feed samples
/// one at a time.
#[derive(Debug, Clone)]
pub struct GridManager {
    settings: GridSettings,
    ladder: GridLadder,
    oscillator: Oscillator,
    filters: FilterPipeline,

    previous_oscillator: Option<f64>,
    current_oscillator: f64,
    last_signal: i8,
    last_signal_index: usize,
    signal_line: f64,
    samples_processed: u64,
}

impl GridManager {
    pub fn new(settings: GridSettings) -> EngineResult<Self> {
        settings.validate()?;

        let ladder = GridLadder::new(settings.grids);
        let oscillator = Oscillator::new(settings.oscillator, settings.period);
        let filters = FilterPipeline::new(settings.aggression, settings.no_trade_zone, settings.bias);

        info!(
            "🎯 Grid manager ready: period={}, grids={}, bias={:?}, no-trade zone=±{}, aggression={:?}, oscillator={:?}",
            settings.period,
            settings.grids,
            settings.bias,
            settings.no_trade_zone.half_width(),
            settings.aggression,
            settings.oscillator
        );
        debug!("Grid lines: {:?}", ladder.lines());

        Ok(Self {
            settings,
            ladder,
            oscillator,
            filters,
            previous_oscillator: None,
            current_oscillator: 0.0,
            last_signal: 0,
            last_signal_index: 0,
            signal_line: INITIAL_SIGNAL_LINE,
            samples_processed: 0,
        })
    }

    /// Process one price sample and return the signal for it
    pub fn process(&mut self, price: f64) -> EngineResult<Signal> {
        self.process_detailed(price).map(|decision| decision.signal)
    }

    /// Like [`process`](Self::process) but returns the full decision record
    pub fn process_detailed(&mut self, price: f64) -> EngineResult<SignalDecision> {
        debug!("Processing sample #{} price={:.4}", self.samples_processed + 1, price);

        let oscillator = self.oscillator.update(price);
        if !oscillator.is_finite() {
            return Err(EngineError::InvalidState(format!(
                "oscillator produced {} for price {}",
                oscillator, price
            )));
        }
        self.current_oscillator = oscillator;
        self.samples_processed += 1;

        let Some(previous) = self.previous_oscillator.replace(oscillator) else {
            debug!("Warm-up sample, oscillator={:.2} => {}", oscillator, Signal::DoNothing);
            return Ok(SignalDecision {
                price,
                oscillator,
                previous_oscillator: None,
                crossings: Crossings::default(),
                filters: FilterTrace::default(),
                signal: Signal::DoNothing,
                prior_signal_line: self.signal_line,
                signal_line: self.signal_line,
            });
        };

        let reading = Reading {
            previous,
            current: oscillator,
            signal_line: self.signal_line,
        };
        debug!("Oscillator={:.2} (prev={:.2}, signal line={:.2})", oscillator, previous, self.signal_line);

        let crossings = Crossings::detect(&self.ladder, &reading);
        let flags = SignalFlags::new(crossings.buy(), crossings.sell());
        let trace = self.filters.apply(&self.ladder, &reading, flags);
        debug!(
            "Lines buy={} sell={} | crossing {:?} -> aggression {:?} -> no-trade zone {:?} -> direction {:?}",
            crossings.buy_index,
            crossings.sell_index,
            trace.crossing,
            trace.after_aggression,
            trace.after_no_trade_zone,
            trace.after_direction
        );

        let signal = self.decide(trace.after_direction, &crossings);

        Ok(SignalDecision {
            price,
            oscillator,
            previous_oscillator: Some(previous),
            crossings,
            filters: trace,
            signal,
            prior_signal_line: reading.signal_line,
            signal_line: self.signal_line,
        })
    }

    /// Resolve final flags; buy wins if both survive
    fn decide(&mut self, flags: SignalFlags, crossings: &Crossings) -> Signal {
        let (signal, index) = if flags.buy {
            (Signal::Buy, crossings.buy_index)
        } else if flags.sell {
            (Signal::Sell, crossings.sell_index)
        } else {
            return Signal::DoNothing;
        };

        self.last_signal = signal.direction();
        self.last_signal_index = index;
        self.signal_line = self.ladder.value(index);

        info!(
            "{} {} at line {} ({:.2}), oscillator {:.2}",
            if signal == Signal::Buy { "🟢" } else { "🔴" },
            signal,
            index,
            self.signal_line,
            self.current_oscillator
        );

        signal
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn ladder(&self) -> &GridLadder {
        &self.ladder
    }

    pub fn previous_oscillator(&self) -> Option<f64> {
        self.previous_oscillator
    }

    pub fn current_oscillator(&self) -> f64 {
        self.current_oscillator
    }

    pub fn last_signal(&self) -> i8 {
        self.last_signal
    }

    pub fn last_signal_index(&self) -> usize {
        self.last_signal_index
    }

    pub fn signal_line(&self) -> f64 {
        self.signal_line
    }

    pub fn is_warmed_up(&self) -> bool {
        self.previous_oscillator.is_some()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            previous_oscillator: self.previous_oscillator,
            last_signal: self.last_signal,
            last_signal_index: self.last_signal_index,
            signal_line: self.signal_line,
            samples_processed: self.samples_processed,
        }
    }
}
