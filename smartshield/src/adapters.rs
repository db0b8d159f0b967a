//! Bridges from `embedded-hal` 1.0 peripherals to the link traits
//!
//! Board support code hands its HAL's SPI bus and pins to these wrappers
//! instead of implementing [`smartshield_hal`] traits directly.

use embedded_hal::digital::{ErrorType, InputPin as _, OutputPin as _};
use embedded_hal::spi::{Error as _, ErrorKind};
use embedded_hal_async::digital::Wait;
use smartshield_hal::{InputPin, Mode, OutputPin, SpiBus, SpiConfig};

/// Clock mode to program into the HAL's SPI peripheral for `config`
///
/// `embedded-hal` has no bit-order setting; board code applies
/// `config.msb_first` and `config.frequency` when it builds the bus.
pub fn hal_spi_mode(config: &SpiConfig) -> embedded_hal::spi::Mode {
    match config.mode {
        Mode::Mode0 => embedded_hal::spi::MODE_0,
        Mode::Mode1 => embedded_hal::spi::MODE_1,
        Mode::Mode2 => embedded_hal::spi::MODE_2,
        Mode::Mode3 => embedded_hal::spi::MODE_3,
    }
}

/// An `embedded_hal::spi::SpiBus` as the link's byte-synchronous bus
///
/// Chip select is not touched; the shield has its own.
pub struct HalSpi<S>(pub S);

impl<S: embedded_hal::spi::SpiBus<u8>> SpiBus for HalSpi<S> {
    type Error = ErrorKind;

    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut buffer = [byte];
        self.transfer_in_place(&mut buffer)?;
        Ok(buffer[0])
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.0.transfer(read, write).map_err(|e| e.kind())?;
        self.0.flush().map_err(|e| e.kind())
    }

    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        self.0.transfer_in_place(data).map_err(|e| e.kind())?;
        self.0.flush().map_err(|e| e.kind())
    }
}

/// An `embedded_hal` pin as a link pin
///
/// Input errors read as low. Output errors are logged and dropped.
pub struct HalPin<P>(pub P);

impl<P: embedded_hal::digital::InputPin> InputPin for HalPin<P> {
    fn is_high(&mut self) -> bool {
        self.0.is_high().unwrap_or(false)
    }
}

impl<P: embedded_hal::digital::OutputPin> OutputPin for HalPin<P> {
    fn set_high(&mut self) {
        if self.0.set_high().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to drive pin high");
        }
    }

    fn set_low(&mut self) {
        if self.0.set_low().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to drive pin low");
        }
    }
}

impl<P: ErrorType> ErrorType for HalPin<P> {
    type Error = P::Error;
}

impl<P: Wait> Wait for HalPin<P> {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        self.0.wait_for_high().await
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        self.0.wait_for_low().await
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.0.wait_for_rising_edge().await
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.0.wait_for_falling_edge().await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.0.wait_for_any_edge().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Bus whose peer echoes each byte inverted
    #[derive(Default)]
    struct InvertingBus {
        flushes: usize,
        broken: bool,
    }

    #[derive(Debug)]
    struct Overrun;

    impl embedded_hal::spi::Error for Overrun {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Overrun
        }
    }

    impl embedded_hal::spi::ErrorType for InvertingBus {
        type Error = Overrun;
    }

    impl embedded_hal::spi::SpiBus<u8> for InvertingBus {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Overrun> {
            words.fill(0xFF);
            Ok(())
        }

        fn write(&mut self, _words: &[u8]) -> Result<(), Overrun> {
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Overrun> {
            if self.broken {
                return Err(Overrun);
            }
            for (rx, tx) in read.iter_mut().zip(write) {
                *rx = !tx;
            }
            Ok(())
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Overrun> {
            if self.broken {
                return Err(Overrun);
            }
            for word in words.iter_mut() {
                *word = !*word;
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Overrun> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct Level {
        high: bool,
    }

    impl ErrorType for Level {
        type Error = Infallible;
    }

    impl embedded_hal::digital::InputPin for Level {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    impl embedded_hal::digital::OutputPin for Level {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    impl Wait for Level {
        async fn wait_for_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }

        async fn wait_for_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
            self.high = !self.high;
            Ok(())
        }
    }

    #[test]
    fn test_spi_transfer() {
        let mut spi = HalSpi(InvertingBus::default());
        let mut read = [0u8; 3];
        spi.transfer(&mut read, &[0x00, 0x0F, 0xAA]).unwrap();
        assert_eq!(read, [0xFF, 0xF0, 0x55]);
        assert_eq!(spi.transfer_byte(0x01), Ok(0xFE));
        assert_eq!(spi.0.flushes, 2);
    }

    #[test]
    fn test_spi_error_kind() {
        let mut spi = HalSpi(InvertingBus {
            broken: true,
            ..InvertingBus::default()
        });
        assert_eq!(spi.transfer_byte(0), Err(ErrorKind::Overrun));
    }

    #[test]
    fn test_pins() {
        let mut pin = HalPin(Level { high: false });
        assert!(!InputPin::is_high(&mut pin));
        OutputPin::set_high(&mut pin);
        assert!(InputPin::is_high(&mut pin));
        OutputPin::set_low(&mut pin);
        assert!(InputPin::is_low(&mut pin));
    }

    /// Output pin whose driver always reports a fault
    struct Stuck {
        attempts: usize,
    }

    #[derive(Debug)]
    struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl ErrorType for Stuck {
        type Error = PinFault;
    }

    impl embedded_hal::digital::OutputPin for Stuck {
        fn set_low(&mut self) -> Result<(), PinFault> {
            self.attempts += 1;
            Err(PinFault)
        }

        fn set_high(&mut self) -> Result<(), PinFault> {
            self.attempts += 1;
            Err(PinFault)
        }
    }

    #[test]
    fn test_output_faults_are_absorbed() {
        let mut pin = HalPin(Stuck { attempts: 0 });
        OutputPin::set_low(&mut pin);
        OutputPin::set_high(&mut pin);
        OutputPin::set_state(&mut pin, false);
        assert_eq!(pin.0.attempts, 3);
    }

    #[test]
    fn test_spi_mode_mapping() {
        let config = SpiConfig::default();
        assert_eq!(hal_spi_mode(&config), embedded_hal::spi::MODE_0);

        let config = SpiConfig {
            mode: Mode::Mode3,
            ..SpiConfig::default()
        };
        let mode = hal_spi_mode(&config);
        assert_eq!(mode.polarity, embedded_hal::spi::Polarity::IdleHigh);
        assert_eq!(mode.phase, embedded_hal::spi::Phase::CaptureOnSecondTransition);
    }

    #[test]
    fn test_wait_forwards() {
        let mut pin = HalPin(Level { high: false });
        embassy_futures::block_on(pin.wait_for_high()).unwrap();
        assert!(pin.0.high);
    }
}
