// Classic RSI with exponential (Wilder-style) smoothing, one price at a time

#[derive(Debug, Clone)]
pub struct ClassicRsi {
    period: usize,
    prev_price: Option<f64>,
    avg_gain: f64,
    avg_loss: f64,
}

impl ClassicRsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_price: None,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    /// Feed the next price and return the oscillator in 0..=100.
    /// The very first price only seeds the previous price and reads 50.
    pub fn update(&mut self, price: f64) -> f64 {
        let Some(prev) = self.prev_price.replace(price) else {
            return 50.0;
        };

        let delta = price - prev;
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        if self.avg_gain == 0.0 && self.avg_loss == 0.0 {
            // Nothing accumulated yet: seed straight from this delta
            self.avg_gain = gain;
            self.avg_loss = loss;
        } else {
            let alpha = 1.0 / self.period as f64;
            self.avg_gain = (1.0 - alpha) * self.avg_gain + alpha * gain;
            self.avg_loss = (1.0 - alpha) * self.avg_loss + alpha * loss;
        }

        if self.avg_loss == 0.0 {
            return 100.0;
        }

        let rs = self.avg_gain / self.avg_loss;
        (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
    }

    pub fn averages(&self) -> (f64, f64) {
        (self.avg_gain, self.avg_loss)
    }
}
