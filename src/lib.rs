//! Serial (UART) access to a microcontroller, including the DTR/RTS pulse
//! pattern that drops it into its in-system-programming bootloader

pub use error::{IspError, IspResult};
pub use interface::{IoDevice, MockUart, PinLevel, UartDevice, UartParams};
pub use transport::{Transport, serialport::SerialPortTransport};

pub(crate) mod constants;
pub mod error;
pub mod interface;
pub mod ports;
pub mod transport;
pub mod util;

pub use constants::SEND_CHUNK_SIZE;

/// Write `data` to `device` in [`SEND_CHUNK_SIZE`] pieces, reporting the
/// running byte count after each one, then flush
pub fn send_chunked<D, F>(device: &mut D, data: &[u8], mut progress: F) -> IspResult<usize>
where
    D: IoDevice + ?Sized,
    F: FnMut(usize),
{
    let mut sent = 0;
    for chunk in data.chunks(SEND_CHUNK_SIZE) {
        device.write(chunk)?;
        sent += chunk.len();
        progress(sent);
    }
    device.flush()?;
    Ok(sent)
}
