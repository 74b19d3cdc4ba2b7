use crate::cli::args::OutputFormat;
use crate::domain::config::BridgeConfig;
use crate::domain::device::Device;
use std::io;
use tabled::{Table, Tabled};

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::BridgeError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

#[derive(Tabled)]
struct DeviceTableRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    display_name: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
}

impl From<&Device> for DeviceTableRow {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id.clone(),
            display_name: device.display_name.clone(),
            vendor: device.vendor_tag.clone().unwrap_or_default(),
        }
    }
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn write_devices(&self, devices: &[Device]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                if devices.is_empty() {
                    println!("No serial devices attached");
                }
                for device in devices {
                    match &device.vendor_tag {
                        Some(vendor) => {
                            println!("{} - {} ({})", device.id, device.display_name, vendor)
                        }
                        None => println!("{} - {}", device.id, device.display_name),
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(devices)?);
            }
            OutputFormat::Table => {
                if !devices.is_empty() {
                    let rows: Vec<DeviceTableRow> =
                        devices.iter().map(DeviceTableRow::from).collect();
                    println!("{}", Table::new(rows));
                }
            }
        }
        Ok(())
    }

    pub fn write_config(&self, config: &BridgeConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            _ => {
                let toml_str = toml::to_string_pretty(config)
                    .unwrap_or_else(|e| format!("<serialization error: {}>", e));
                println!("{}", toml_str);
            }
        }
        Ok(())
    }

    pub fn write_message(&self, message: &str) -> Result<(), OutputError> {
        println!("{}", message);
        Ok(())
    }
}
