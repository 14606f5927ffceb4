use tracing::debug;

use super::Transport;
use crate::error::{IspError, IspResult};
use std::io::{Read, Write};
use std::time::Duration;

pub type ComPort = String;
pub type BaudRate = u32;

/// Serial port transport layer
pub struct SerialPortTransport {
    pub serial_port: Box<dyn serialport::SerialPort>,
    port: ComPort,
}

impl SerialPortTransport {
    /// Open `port` with flow control disabled
    ///
    /// DTR is held low through the open itself and RTS is dropped right after,
    /// so the target's reset circuit never sees a pulse from opening the port
    pub fn open(port: &str, baud: BaudRate, timeout: Duration) -> IspResult<SerialPortTransport> {
        let mut serial_port = serialport::new(port, baud)
            .timeout(timeout)
            .flow_control(serialport::FlowControl::None)
            .dtr_on_open(false)
            .open()?;

        serial_port.write_request_to_send(false)?;
        serial_port.write_data_terminal_ready(false)?;

        Ok(SerialPortTransport {
            serial_port,
            port: port.to_owned(),
        })
    }
}

impl Transport for SerialPortTransport {
    fn name(&self) -> String {
        self.port.clone()
    }

    fn timeout(&self) -> Duration {
        self.serial_port.timeout()
    }

    fn read(&mut self, buffer: &mut [u8]) -> IspResult<usize> {
        match self.serial_port.read(buffer) {
            Ok(n) => Ok(n),
            // Timeout error is fine, the caller decides what an empty read means
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(IspError::Io(e)),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> IspResult<()> {
        self.serial_port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> IspResult<()> {
        self.serial_port.flush()?;
        Ok(())
    }

    fn clear_buffers(&mut self) -> IspResult<()> {
        self.serial_port.clear(serialport::ClearBuffer::All)?;
        Ok(())
    }

    fn bytes_to_read(&self) -> IspResult<usize> {
        Ok(self.serial_port.bytes_to_read()? as usize)
    }

    fn baud_rate(&self) -> IspResult<u32> {
        Ok(self.serial_port.baud_rate()?)
    }

    fn set_baud_rate(&mut self, baud: u32) -> IspResult<()> {
        debug!(port = %self.port, baud, "set baud rate");
        self.serial_port.set_baud_rate(baud)?;
        Ok(())
    }

    fn write_data_terminal_ready(&mut self, level: bool) -> IspResult<()> {
        self.serial_port.write_data_terminal_ready(level)?;
        Ok(())
    }

    fn write_request_to_send(&mut self, level: bool) -> IspResult<()> {
        self.serial_port.write_request_to_send(level)?;
        Ok(())
    }
}
