use std::time::Duration;

pub(crate) const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub(crate) const DEFAULT_BAUD_RATE: u32 = 9600;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Width of each step of the reset/ISP-entry pulse pattern
pub(crate) const ISP_PULSE_MS: u64 = 100;

pub(crate) const MAX_READ_CHUNK: usize = 1024;
pub const SEND_CHUNK_SIZE: usize = 256;
