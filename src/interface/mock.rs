use super::IoDevice;
use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT};
use crate::error::IspResult;

/// Stand-in device with no backing transport, for code that only needs
/// *a* device. Reads always yield zero/empty data
#[derive(Debug, Clone)]
pub struct MockUart {
    port: String,
    baud: u32,
}

impl MockUart {
    pub fn new(port: &str, baud: u32) -> Self {
        MockUart {
            port: port.to_owned(),
            baud,
        }
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl Default for MockUart {
    fn default() -> Self {
        MockUart::new(DEFAULT_PORT, DEFAULT_BAUD_RATE)
    }
}

impl IoDevice for MockUart {
    fn read_byte(&mut self) -> IspResult<u8> {
        Ok(0x00)
    }

    fn read_all(&mut self) -> IspResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn write(&mut self, _data: &[u8]) -> IspResult<()> {
        Ok(())
    }

    fn flush(&mut self) -> IspResult<()> {
        Ok(())
    }

    fn set_baud_rate(&mut self, baud: u32) -> IspResult<()> {
        self.baud = baud;
        Ok(())
    }

    fn baud_rate(&self) -> IspResult<u32> {
        Ok(self.baud)
    }

    fn read_line(&mut self) -> IspResult<String> {
        Ok(String::new())
    }

    fn disconnect(&mut self) -> IspResult<()> {
        Ok(())
    }
}
