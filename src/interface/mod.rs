pub mod mock;
pub mod uart;

pub use mock::MockUart;
pub use uart::{PinLevel, UartDevice};

use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::error::IspResult;
use std::time::Duration;

/// Byte-level capabilities shared by every device a caller can be handed,
/// real or mock
pub trait IoDevice {
    /// Read a single byte
    fn read_byte(&mut self) -> IspResult<u8>;

    /// Read everything currently waiting, without blocking for more
    fn read_all(&mut self) -> IspResult<Vec<u8>>;

    /// Write a raw buffer to the device
    ///
    /// ```
    /// use ispprogrammer::{IoDevice, MockUart};
    ///
    /// let mut device = MockUart::default();
    /// device.write(&[0x7f, 0x00]).unwrap();
    /// ```
    ///
    /// Anything other than bytes is rejected before a transport is involved:
    ///
    /// ```compile_fail
    /// use ispprogrammer::{IoDevice, MockUart};
    ///
    /// let mut device = MockUart::default();
    /// device.write("text").unwrap();
    /// ```
    ///
    /// ```compile_fail
    /// use ispprogrammer::{IoDevice, MockUart};
    ///
    /// let mut device = MockUart::default();
    /// device.write(&[1u16, 2]).unwrap();
    /// ```
    fn write(&mut self, data: &[u8]) -> IspResult<()>;

    /// Wait until pending output is sent
    fn flush(&mut self) -> IspResult<()>;

    fn set_baud_rate(&mut self, baud: u32) -> IspResult<()>;

    fn baud_rate(&self) -> IspResult<u32>;

    /// Read one `\n` terminated line and decode it as UTF-8
    fn read_line(&mut self) -> IspResult<String>;

    /// Release the device. Calling this more than once is fine
    fn disconnect(&mut self) -> IspResult<()>;
}

/// Parameters used to open a [`UartDevice`]
#[derive(Debug, Clone, PartialEq)]
pub struct UartParams {
    pub port: String,
    pub baud: u32,
    /// Read timeout
    pub timeout: Duration,
    /// Pulse the target into its bootloader right after opening
    pub isp_entry: bool,
}

impl Default for UartParams {
    fn default() -> Self {
        UartParams {
            port: DEFAULT_PORT.to_owned(),
            baud: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            isp_entry: false,
        }
    }
}
