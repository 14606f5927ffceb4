use tracing::{debug, trace};

use super::{IoDevice, UartParams};
use crate::constants::{ISP_PULSE_MS, MAX_READ_CHUNK};
use crate::error::{IspError, IspResult};
use crate::transport::Transport;
use crate::transport::serialport::SerialPortTransport;
use std::time::{Duration, Instant};

/// Logic level of a control line. `High` asserts the underlying DTR/RTS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    Low,
    High,
}

impl From<PinLevel> for bool {
    fn from(level: PinLevel) -> bool {
        level == PinLevel::High
    }
}

/// Serial device wrapper. The target's reset pin is wired to DTR and its
/// ISP entry (bootloader select) pin to RTS
///
/// The transport is owned exclusively and released on [`IoDevice::disconnect`]
/// or when the device is dropped, whichever comes first
pub struct UartDevice<T: Transport = SerialPortTransport> {
    port: String,
    transport: Option<T>,
}

impl UartDevice<SerialPortTransport> {
    /// Open the serial port described by `params`
    pub fn open(params: &UartParams) -> IspResult<Self> {
        let transport = SerialPortTransport::open(&params.port, params.baud, params.timeout)?;
        Self::from_transport(transport, params.isp_entry)
    }
}

impl<T: Transport> UartDevice<T> {
    /// Wrap an already opened transport whose control lines are at rest.
    /// Optionally runs [`UartDevice::isp_mode`], then flushes output and
    /// discards anything left in the port buffers
    pub fn from_transport(transport: T, isp_entry: bool) -> IspResult<Self> {
        let port = transport.name();
        debug!(port = %port, "connect serial");

        let mut device = UartDevice {
            port,
            transport: Some(transport),
        };

        if isp_entry {
            device.isp_mode()?;
        }

        device.flush()?;
        device.transport_mut()?.clear_buffers()?;

        Ok(device)
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Put the chip in ISP mode by resetting it while holding the ISP entry
    /// pin. Only works if reset and ISP entry are actually wired to DTR/RTS
    pub fn isp_mode(&mut self) -> IspResult<()> {
        let pulse = Duration::from_millis(ISP_PULSE_MS);
        debug!(port = %self.port, "entering ISP mode");

        self.set_reset_pin_level(PinLevel::Low)?;
        std::thread::sleep(pulse);
        self.set_reset_pin_level(PinLevel::High)?;
        self.set_isp_entry_pin_level(PinLevel::High)?;
        std::thread::sleep(pulse);
        self.set_reset_pin_level(PinLevel::Low)?;
        std::thread::sleep(pulse);
        self.set_isp_entry_pin_level(PinLevel::Low)?;

        Ok(())
    }

    /// Reset pin is on DTR
    pub fn set_reset_pin_level(&mut self, level: PinLevel) -> IspResult<()> {
        debug!(port = %self.port, ?level, "reset pin");
        self.transport_mut()?.write_data_terminal_ready(level.into())
    }

    /// ISP entry pin is on RTS
    pub fn set_isp_entry_pin_level(&mut self, level: PinLevel) -> IspResult<()> {
        debug!(port = %self.port, ?level, "isp entry pin");
        self.transport_mut()?.write_request_to_send(level.into())
    }

    /// Read up to `size` bytes, returning early once the port timeout has
    /// elapsed for the call as a whole
    pub fn read(&mut self, size: usize) -> IspResult<Vec<u8>> {
        let transport = self.transport_mut()?;
        let deadline = Instant::now() + transport.timeout();
        let mut buffer = vec![0; size];
        let mut filled = 0;

        while filled < size && (filled == 0 || Instant::now() < deadline) {
            let end = size.min(filled + MAX_READ_CHUNK);
            let bytes_read = transport.read(&mut buffer[filled..end])?;
            if bytes_read == 0 {
                break;
            }
            filled += bytes_read;
        }

        buffer.truncate(filled);
        trace!("Received bytes {:?}", buffer);
        Ok(buffer)
    }

    fn transport_mut(&mut self) -> IspResult<&mut T> {
        self.transport.as_mut().ok_or(IspError::Disconnected)
    }

    fn transport_ref(&self) -> IspResult<&T> {
        self.transport.as_ref().ok_or(IspError::Disconnected)
    }
}

impl<T: Transport> IoDevice for UartDevice<T> {
    fn read_byte(&mut self) -> IspResult<u8> {
        let mut byte = [0u8; 1];
        match self.transport_mut()?.read(&mut byte)? {
            0 => Err(IspError::Timeout),
            _ => {
                trace!("Received byte {:#04x}", byte[0]);
                Ok(byte[0])
            }
        }
    }

    fn read_all(&mut self) -> IspResult<Vec<u8>> {
        let waiting = self.transport_ref()?.bytes_to_read()?;
        if waiting == 0 {
            return Ok(Vec::new());
        }
        self.read(waiting)
    }

    fn write(&mut self, data: &[u8]) -> IspResult<()> {
        self.transport_mut()?.write_all(data)?;
        trace!("Sent bytes {:?}", data);
        Ok(())
    }

    fn flush(&mut self) -> IspResult<()> {
        self.transport_mut()?.flush()
    }

    fn set_baud_rate(&mut self, baud: u32) -> IspResult<()> {
        self.transport_mut()?.set_baud_rate(baud)
    }

    fn baud_rate(&self) -> IspResult<u32> {
        self.transport_ref()?.baud_rate()
    }

    /// Read until `\n`, or until the port timeout has elapsed for the line as
    /// a whole. Bytes that are not valid UTF-8 are reported as
    /// [`IspError::Timeout`], same as a read that came up short
    fn read_line(&mut self) -> IspResult<String> {
        let transport = self.transport_mut()?;
        let deadline = Instant::now() + transport.timeout();
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            if !line.is_empty() && Instant::now() >= deadline {
                break;
            }
            if transport.read(&mut byte)? == 0 {
                break;
            }
            line.push(byte[0]);
            if byte[0] == b'\n' {
                break;
            }
        }

        trace!("Received line {:?}", line);
        String::from_utf8(line).map_err(|_| IspError::Timeout)
    }

    fn disconnect(&mut self) -> IspResult<()> {
        if let Some(transport) = self.transport.take() {
            debug!(port = %self.port, "disconnect serial");
            drop(transport);
        }
        Ok(())
    }
}

impl<T: Transport> Drop for UartDevice<T> {
    fn drop(&mut self) {
        // disconnect never fails
        let _ = self.disconnect();
    }
}
