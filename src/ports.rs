use serialport::SerialPortType;

use crate::error::{IspError, IspResult};

/// A serial port found on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    /// USB vendor/product id, when the port is a USB adapter
    pub usb_id: Option<(u16, u16)>,
    pub product: Option<String>,
}

impl PortInfo {
    fn from_serialport(port: serialport::SerialPortInfo) -> Self {
        match port.port_type {
            SerialPortType::UsbPort(info) => PortInfo {
                name: port.port_name,
                usb_id: Some((info.vid, info.pid)),
                product: info.product,
            },
            _ => PortInfo {
                name: port.port_name,
                usb_id: None,
                product: None,
            },
        }
    }
}

pub fn available_ports() -> IspResult<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        IspError::Configuration(format!("Could not get available ports. Err {:?}", e))
    })?;

    Ok(ports.into_iter().map(PortInfo::from_serialport).collect())
}

/// Pick the first port among `ports` whose USB product id is in `product_ids`
pub fn port_from_product_id(ports: &[PortInfo], product_ids: &[u16]) -> IspResult<String> {
    ports
        .iter()
        .find(|port| matches!(port.usb_id, Some((_, pid)) if product_ids.contains(&pid)))
        .map(|port| port.name.clone())
        .ok_or_else(|| {
            IspError::Configuration(format!(
                "Looked at all available serial ports; could not find one that matches one of \
                product IDs {:?}. Try specifying a serial port?",
                product_ids
            ))
        })
}
