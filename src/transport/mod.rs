//! Raw serial plumbing underneath [`crate::interface::UartDevice`]
//!
//! The device wrapper is generic over [`Transport`] so the control-line
//! sequencing can be exercised against something other than real hardware

pub mod serialport;

use crate::error::IspResult;
use std::time::Duration;

pub trait Transport: Send {
    /// Port identifier, used for logging
    fn name(&self) -> String;

    /// Read timeout applied to each [`Transport::read`]
    fn timeout(&self) -> Duration;

    /// Read whatever is available into `buffer`, blocking up to the port
    /// timeout. A timeout with nothing received yields `Ok(0)`
    fn read(&mut self, buffer: &mut [u8]) -> IspResult<usize>;

    /// Write the whole buffer
    fn write_all(&mut self, data: &[u8]) -> IspResult<()>;

    /// Block until pending output has been sent
    fn flush(&mut self) -> IspResult<()>;

    /// Discard both the receive and the transmit buffers
    fn clear_buffers(&mut self) -> IspResult<()>;

    /// Number of bytes waiting in the receive buffer
    fn bytes_to_read(&self) -> IspResult<usize>;

    fn baud_rate(&self) -> IspResult<u32>;

    fn set_baud_rate(&mut self, baud: u32) -> IspResult<()>;

    /// Drive the DTR line; `true` asserts it
    fn write_data_terminal_ready(&mut self, level: bool) -> IspResult<()>;

    /// Drive the RTS line; `true` asserts it
    fn write_request_to_send(&mut self, level: bool) -> IspResult<()>;
}
