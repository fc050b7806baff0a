// RSX: a low-lag RSI built from cascaded double exponential filters
//
// Each stage runs a fast EMA and a slow EMA of the fast one and reports
// 1.5 * fast - 0.5 * slow. Three stages smooth the signed price change and
// three smooth its magnitude; their ratio is mapped onto 0..100.

const MIN_WARMUP: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SmoothingStage {
    fast: f64,
    slow: f64,
}

impl SmoothingStage {
    fn step(&mut self, input: f64, alpha: f64) -> f64 {
        let beta = 1.0 - alpha;
        self.fast = beta * self.fast + alpha * input;
        self.slow = alpha * self.fast + beta * self.slow;
        1.5 * self.fast - 0.5 * self.slow
    }
}

/// Three chained stages: change -> EMA -> EMA of EMA
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct FilterChain {
    first: SmoothingStage,
    second: SmoothingStage,
    third: SmoothingStage,
}

impl FilterChain {
    fn step(&mut self, input: f64, alpha: f64) -> f64 {
        let v = self.first.step(input, alpha);
        let v = self.second.step(v, alpha);
        self.third.step(v, alpha)
    }
}

#[derive(Debug, Clone)]
pub struct Rsx {
    alpha: f64,
    warmup_threshold: usize,
    warmup_progress: usize,
    scaled_price: Option<f64>,
    momentum: FilterChain,
    magnitude: FilterChain,
}

impl Rsx {
    pub fn new(period: usize) -> Self {
        Self {
            alpha: 3.0 / (period as f64 + 2.0),
            warmup_threshold: period.saturating_sub(1).max(MIN_WARMUP),
            warmup_progress: 0,
            scaled_price: None,
            momentum: FilterChain::default(),
            magnitude: FilterChain::default(),
        }
    }

    /// Feed the next price and return the oscillator in 0..=100.
    /// Reads exactly 50 until the warm-up progress passes the threshold.
    pub fn update(&mut self, price: f64) -> f64 {
        let scaled = 100.0 * price;
        let Some(prev_scaled) = self.scaled_price.replace(scaled) else {
            self.warmup_progress = 1;
            return 50.0;
        };

        let change = scaled - prev_scaled;
        let signed = self.momentum.step(change, self.alpha);
        let unsigned = self.magnitude.step(change.abs(), self.alpha);

        self.warmup_progress = if self.warmup_progress == 0 {
            1
        } else if self.warmup_threshold <= self.warmup_progress {
            self.warmup_threshold + 1
        } else {
            self.warmup_progress + 1
        };

        if self.is_warm() && unsigned > 0.0 {
            ((signed / unsigned + 1.0) * 50.0).clamp(0.0, 100.0)
        } else {
            50.0
        }
    }

    pub fn is_warm(&self) -> bool {
        self.warmup_progress > self.warmup_threshold
    }

    pub fn warmup_threshold(&self) -> usize {
        self.warmup_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_threshold_floor() {
        assert_eq!(Rsx::new(1).warmup_threshold(), 5);
        assert_eq!(Rsx::new(7).warmup_threshold(), 6);
        assert_eq!(Rsx::new(14).warmup_threshold(), 13);
    }

    #[test]
    fn test_neutral_during_warmup() {
        let mut rsx = Rsx::new(14);
        let threshold = rsx.warmup_threshold();
        let mut price = 100.0;

        // Calls 1..=threshold all read exactly 50
        for _ in 0..threshold {
            assert_eq!(rsx.update(price), 50.0);
            price += 1.5;
        }
        assert!(!rsx.is_warm());

        let value = rsx.update(price);
        assert!(rsx.is_warm());
        assert!(value > 50.0, "rising prices should read above 50, got {}", value);
    }

    #[test]
    fn test_flat_prices_stay_neutral() {
        let mut rsx = Rsx::new(7);
        for _ in 0..30 {
            assert_eq!(rsx.update(42.0), 50.0);
        }
    }

    #[test]
    fn test_falling_prices_read_below_50() {
        let mut rsx = Rsx::new(5);
        let mut last = 50.0;
        for i in 0..40 {
            last = rsx.update(200.0 - i as f64);
        }
        assert!(last < 50.0);
        assert!(last >= 0.0);
    }

    #[test]
    fn test_stage_combines_fast_and_slow() {
        let mut stage = SmoothingStage::default();
        let out = stage.step(10.0, 0.5);
        // fast = 5, slow = 2.5 => 7.5 - 1.25
        assert!((out - 6.25).abs() < 1e-12);
    }
}
