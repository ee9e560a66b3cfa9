//! GPIO pin abstractions
//!
//! Provides the digital output trait used for the sync pulse line.

/// Digital output pin
///
/// Implementations handle the register manipulation for the specific chip.
/// Pin mode configuration happens when the implementation is constructed.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_is_set_low_mirrors_high() {
        let mut pin = MockPin { high: false };
        assert!(pin.is_set_low());

        pin.set_high();
        assert!(pin.is_set_high());
        assert!(!pin.is_set_low());
    }
}
