// Oscillator selection: classic RSI or RSX behind one update call

use crate::core::rsi::ClassicRsi;
use crate::core::rsx::Rsx;
use crate::core::types::OscillatorKind;

#[derive(Debug, Clone)]
pub enum Oscillator {
    Classic(ClassicRsi),
    Rsx(Rsx),
}

impl Oscillator {
    pub fn new(kind: OscillatorKind, period: usize) -> Self {
        match kind {
            OscillatorKind::ClassicRsi => Oscillator::Classic(ClassicRsi::new(period)),
            OscillatorKind::Rsx => Oscillator::Rsx(Rsx::new(period)),
        }
    }

    /// Feed one price sample, returning the new oscillator value in 0..=100
    pub fn update(&mut self, price: f64) -> f64 {
        match self {
            Oscillator::Classic(rsi) => rsi.update(price),
            Oscillator::Rsx(rsx) => rsx.update(price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_kind() {
        let mut classic = Oscillator::new(OscillatorKind::ClassicRsi, 7);
        let mut rsx = Oscillator::new(OscillatorKind::Rsx, 7);
        assert!(matches!(classic, Oscillator::Classic(_)));
        assert!(matches!(rsx, Oscillator::Rsx(_)));

        classic.update(100.0);
        rsx.update(100.0);

        // Classic reacts on the second sample, RSX is still warming up
        assert_eq!(classic.update(101.0), 100.0);
        assert_eq!(rsx.update(101.0), 50.0);
    }
}
