use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use ispprogrammer::{IspError, IspResult, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Dtr,
    Rts,
}

#[derive(Debug, Clone, Copy)]
pub struct LineEvent {
    pub line: Line,
    pub level: bool,
    pub at: Instant,
}

#[derive(Debug, Default)]
pub struct State {
    pub line_events: Vec<LineEvent>,
    pub written: Vec<u8>,
    pub input: VecDeque<u8>,
    pub baud: u32,
    pub baud_writes: usize,
    pub flushes: usize,
    pub clears: usize,
    pub fail_writes: bool,
    pub timeout: Duration,
    /// Once `input` runs dry, keep handing out this byte every few ms
    pub trickle: Option<u8>,
    pub closed: bool,
}

/// Shared view of what a [`RecordingTransport`] saw, usable after the
/// transport itself has been moved into (or dropped by) a device
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<State>>);

impl Recorder {
    pub fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    pub fn transport(&self) -> RecordingTransport {
        {
            let mut state = self.state();
            state.baud = 9600;
            state.timeout = Duration::from_secs(1);
        }
        RecordingTransport(self.clone())
    }

    pub fn feed(&self, bytes: &[u8]) {
        self.state().input.extend(bytes);
    }

    pub fn lines(&self) -> Vec<(Line, bool)> {
        self.state()
            .line_events
            .iter()
            .map(|event| (event.line, event.level))
            .collect()
    }
}

pub struct RecordingTransport(Recorder);

impl RecordingTransport {
    fn record_line(&mut self, line: Line, level: bool) -> IspResult<()> {
        self.0.state().line_events.push(LineEvent {
            line,
            level,
            at: Instant::now(),
        });
        Ok(())
    }
}

impl Transport for RecordingTransport {
    fn name(&self) -> String {
        "/dev/ttyFAKE0".to_owned()
    }

    fn timeout(&self) -> Duration {
        self.0.state().timeout
    }

    fn read(&mut self, buffer: &mut [u8]) -> IspResult<usize> {
        let mut state = self.0.state();
        let trickle = state.trickle;
        if state.input.is_empty() && !buffer.is_empty() {
            if let Some(byte) = trickle {
                drop(state);
                std::thread::sleep(Duration::from_millis(5));
                buffer[0] = byte;
                return Ok(1);
            }
        }
        let n = buffer.len().min(state.input.len());
        for (slot, byte) in buffer.iter_mut().zip(state.input.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> IspResult<()> {
        let mut state = self.0.state();
        if state.fail_writes {
            return Err(IspError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "unplugged",
            )));
        }
        state.written.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> IspResult<()> {
        self.0.state().flushes += 1;
        Ok(())
    }

    fn clear_buffers(&mut self) -> IspResult<()> {
        let mut state = self.0.state();
        state.clears += 1;
        state.input.clear();
        Ok(())
    }

    fn bytes_to_read(&self) -> IspResult<usize> {
        Ok(self.0.state().input.len())
    }

    fn baud_rate(&self) -> IspResult<u32> {
        Ok(self.0.state().baud)
    }

    fn set_baud_rate(&mut self, baud: u32) -> IspResult<()> {
        let mut state = self.0.state();
        state.baud = baud;
        state.baud_writes += 1;
        Ok(())
    }

    fn write_data_terminal_ready(&mut self, level: bool) -> IspResult<()> {
        self.record_line(Line::Dtr, level)
    }

    fn write_request_to_send(&mut self, level: bool) -> IspResult<()> {
        self.record_line(Line::Rts, level)
    }
}

impl Drop for RecordingTransport {
    fn drop(&mut self) {
        self.0.state().closed = true;
    }
}
