use crate::domain::{
    config::{FlowControlConfig, ParityConfig, SerialSettings},
    device::Device,
    error::{BridgeError, BridgeResult},
};
use async_trait::async_trait;
use serialport::SerialPortType;
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Seam between the bridge core and the host serial stack. The Device
/// Directory enumerates through it and the Connection Manager opens handles
/// through it, so tests can inject scripted fakes.
#[async_trait]
pub trait PortProvider: Send + Sync {
    /// List the serial devices currently attached to the host.
    async fn enumerate(&self) -> BridgeResult<Vec<Device>>;

    /// Open the named device for reading with the given settings. The
    /// returned reader uses a short internal timeout so the read loop can
    /// observe shutdown.
    async fn open(
        &self,
        device_id: &str,
        settings: &SerialSettings,
    ) -> BridgeResult<Box<dyn Read + Send>>;
}

/// `PortProvider` backed by the host OS via the serialport crate.
pub struct SystemPortProvider;

#[async_trait]
impl PortProvider for SystemPortProvider {
    async fn enumerate(&self) -> BridgeResult<Vec<Device>> {
        let ports = serialport::available_ports()
            .map_err(|e| BridgeError::Enumeration(e.to_string()))?;

        let devices = ports
            .into_iter()
            .map(|port| {
                let mut device = Device::new(port.port_name.clone(), port.port_name.clone());
                if let SerialPortType::UsbPort(usb) = port.port_type {
                    if let Some(product) = usb.product {
                        device.display_name = product;
                    }
                    device.vendor_tag = usb.manufacturer;
                }
                device
            })
            .collect();

        Ok(devices)
    }

    async fn open(
        &self,
        device_id: &str,
        settings: &SerialSettings,
    ) -> BridgeResult<Box<dyn Read + Send>> {
        let data_bits = match settings.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(BridgeError::Connection {
                    message: format!("Invalid data bits: {}", other),
                })
            }
        };

        let stop_bits = match settings.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            other => {
                return Err(BridgeError::Connection {
                    message: format!("Invalid stop bits: {}", other),
                })
            }
        };

        let parity = match settings.parity {
            ParityConfig::None => serialport::Parity::None,
            ParityConfig::Even => serialport::Parity::Even,
            ParityConfig::Odd => serialport::Parity::Odd,
        };

        let flow_control = match settings.flow_control {
            FlowControlConfig::None => serialport::FlowControl::None,
            FlowControlConfig::Software => serialport::FlowControl::Software,
            FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
        };

        let port = serialport::new(device_id, settings.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(flow_control)
            .timeout(Duration::from_millis(100))
            .open()?;

        debug!("Opened serial port {} at {} baud", device_id, settings.baud_rate);
        Ok(Box::new(port))
    }
}
