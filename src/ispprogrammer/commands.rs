use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ispprogrammer::{
    IoDevice, IspError, UartDevice, UartParams,
    error::IspResult,
    ports::{PortInfo, available_ports, port_from_product_id},
    send_chunked,
    util::create_progress_bar,
};
use tracing::{debug, info};

#[derive(Parser, Debug, Clone)]
pub(crate) struct ConnectionOptions {
    /// Serial port [default: /dev/ttyUSB0, or found through --pid]
    #[clap(short, long)]
    port: Option<String>,

    /// USB product id (hex) of the adapter to look for when no port is given
    #[clap(long, value_parser = parse_product_id)]
    pid: Vec<u16>,

    /// Baud rate
    #[clap(short, long, default_value_t = 9600)]
    baudrate: u32,

    /// Read timeout in seconds
    #[clap(short, long, default_value_t = 1.0)]
    timeout: f64,
}

impl ConnectionOptions {
    fn params(&self, isp_entry: bool) -> IspResult<UartParams> {
        self.params_with_ports(isp_entry, available_ports)
    }

    /// Build the open parameters. `ports` is only consulted when the port has
    /// to be found by product id
    fn params_with_ports<F>(&self, isp_entry: bool, ports: F) -> IspResult<UartParams>
    where
        F: FnOnce() -> IspResult<Vec<PortInfo>>,
    {
        let port = match (&self.port, self.pid.is_empty()) {
            (Some(port), _) => port.clone(),
            (None, false) => port_from_product_id(&ports()?, &self.pid)?,
            (None, true) => UartParams::default().port,
        };

        let timeout = Duration::try_from_secs_f64(self.timeout).map_err(|e| {
            IspError::Configuration(format!("Invalid timeout {}: {}", self.timeout, e))
        })?;

        Ok(UartParams {
            port,
            baud: self.baudrate,
            timeout,
            isp_entry,
        })
    }
}

fn parse_product_id(value: &str) -> Result<u16, String> {
    let digits = value.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid product id {:?}: {}", value, e))
}

#[derive(Parser, Debug, Clone)]
pub(crate) struct SendOptions {
    #[clap(flatten)]
    connection: ConnectionOptions,

    /// File to send
    file: PathBuf,

    /// Reset into the bootloader before sending
    #[clap(long, default_value_t = false)]
    isp: bool,
}

#[derive(Parser, Debug, Clone)]
pub(crate) struct MonitorOptions {
    #[clap(flatten)]
    connection: ConnectionOptions,

    /// Stop after this many lines
    #[clap(short, long)]
    lines: Option<usize>,

    /// Reset into the bootloader before listening
    #[clap(long, default_value_t = false)]
    isp: bool,
}

pub(crate) fn handle_list() -> IspResult<()> {
    let ports = available_ports()?;
    if ports.is_empty() {
        info!("No serial ports found");
    }

    for port in ports {
        println!("{}", describe_port(&port));
    }

    Ok(())
}

pub(crate) fn handle_isp(opts: ConnectionOptions) -> IspResult<()> {
    let mut device = UartDevice::open(&opts.params(true)?)?;
    info!("{} is in ISP mode", device.port());
    device.disconnect()
}

pub(crate) fn handle_send(opts: SendOptions) -> IspResult<()> {
    let data = std::fs::read(&opts.file).map_err(|e| {
        IspError::Configuration(format!("Failed to read {}: {}", opts.file.display(), e))
    })?;

    let mut device = UartDevice::open(&opts.connection.params(opts.isp)?)?;

    let pb = create_progress_bar(data.len() as u64, "Sending");
    let sent = send_chunked(&mut device, &data, |sent| pb.set_position(sent as u64))?;
    pb.finish_with_message("Done");

    info!("Sent {} bytes to {}", sent, device.port());
    Ok(())
}

pub(crate) fn handle_monitor(opts: MonitorOptions) -> IspResult<()> {
    let mut device = UartDevice::open(&opts.connection.params(opts.isp)?)?;
    monitor(&mut device, opts.lines, |line| print!("{}", line))
}

/// Keep reading lines, skipping empty reads and undecodable ones, until
/// `limit` lines have been printed. Without a limit this only ends on error
fn monitor<D, F>(device: &mut D, limit: Option<usize>, mut emit: F) -> IspResult<()>
where
    D: IoDevice + ?Sized,
    F: FnMut(&str),
{
    let mut printed = 0;
    while limit.is_none_or(|limit| printed < limit) {
        match device.read_line() {
            Ok(line) if line.is_empty() => continue,
            Ok(line) => {
                emit(&line);
                printed += 1;
            }
            Err(IspError::Timeout) => debug!("No complete line received"),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn describe_port(port: &ispprogrammer::ports::PortInfo) -> String {
    match (port.usb_id, &port.product) {
        (Some((vid, pid)), Some(product)) => {
            format!("{}\t{:04x}:{:04x}\t{}", port.name, vid, pid, product)
        }
        (Some((vid, pid)), None) => format!("{}\t{:04x}:{:04x}", port.name, vid, pid),
        (None, _) => port.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(port: Option<&str>, pid: Vec<u16>, timeout: f64) -> ConnectionOptions {
        ConnectionOptions {
            port: port.map(str::to_owned),
            pid,
            baudrate: 115200,
            timeout,
        }
    }

    fn usb_ports() -> IspResult<Vec<PortInfo>> {
        Ok(vec![
            PortInfo {
                name: "/dev/ttyS0".into(),
                usb_id: None,
                product: None,
            },
            PortInfo {
                name: "/dev/ttyUSB3".into(),
                usb_id: Some((0x1a86, 0x7523)),
                product: None,
            },
        ])
    }

    /// Replays a fixed list of read_line results
    struct LineScript(Vec<IspResult<String>>);

    impl IoDevice for LineScript {
        fn read_byte(&mut self) -> IspResult<u8> {
            Ok(0)
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
        fn set_baud_rate(&mut self, _baud: u32) -> IspResult<()> {
            Ok(())
        }
        fn baud_rate(&self) -> IspResult<u32> {
            Ok(9600)
        }
        fn read_line(&mut self) -> IspResult<String> {
            if self.0.is_empty() {
                return Err(IspError::Disconnected);
            }
            self.0.remove(0)
        }
        fn disconnect(&mut self) -> IspResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_monitor_skips_timeouts_and_empty_reads() {
        let mut device = LineScript(vec![
            Ok("boot\n".into()),
            Ok(String::new()),
            Err(IspError::Timeout),
            Ok("ready\n".into()),
        ]);
        let mut seen = Vec::new();
        monitor(&mut device, Some(2), |line| seen.push(line.to_owned())).unwrap();
        assert_eq!(seen, vec!["boot\n", "ready\n"]);
    }

    #[test]
    fn test_monitor_propagates_transport_errors() {
        let mut device = LineScript(vec![Ok("boot\n".into())]);
        let result = monitor(&mut device, None, |_| {});
        assert!(matches!(result, Err(IspError::Disconnected)));
    }

    #[test]
    fn test_params_from_options() {
        let opts = options(Some("/dev/ttyACM0"), vec![], 0.5);
        let params = opts
            .params_with_ports(true, || panic!("ports listed for an explicit port"))
            .unwrap();
        assert_eq!(params.port, "/dev/ttyACM0");
        assert_eq!(params.baud, 115200);
        assert_eq!(params.timeout, Duration::from_millis(500));
        assert!(params.isp_entry);
    }

    #[test]
    fn test_negative_timeout_is_rejected() {
        let opts = options(Some("/dev/ttyACM0"), vec![], -1.0);
        assert!(matches!(opts.params(false), Err(IspError::Configuration(_))));
    }

    #[test]
    fn test_port_found_by_product_id() {
        let opts = options(None, vec![0x6001, 0x7523], 1.0);
        let params = opts.params_with_ports(false, usb_ports).unwrap();
        assert_eq!(params.port, "/dev/ttyUSB3");
    }

    #[test]
    fn test_unknown_product_id_is_a_configuration_error() {
        let opts = options(None, vec![0x6001], 1.0);
        assert!(matches!(
            opts.params_with_ports(false, usb_ports),
            Err(IspError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_port_without_product_id() {
        let opts = options(None, vec![], 1.0);
        let params = opts
            .params_with_ports(false, || panic!("ports listed without a product id"))
            .unwrap();
        assert_eq!(params.port, "/dev/ttyUSB0");
    }

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id("7523"), Ok(0x7523));
        assert_eq!(parse_product_id("0xea60"), Ok(0xea60));
        assert!(parse_product_id("zz").is_err());
    }

    #[test]
    fn test_describe_port() {
        let port = PortInfo {
            name: "/dev/ttyUSB0".into(),
            usb_id: Some((0x1a86, 0x7523)),
            product: Some("USB Serial".into()),
        };
        assert_eq!(describe_port(&port), "/dev/ttyUSB0\t1a86:7523\tUSB Serial");
    }
}
