use crate::cli::args::{Args, Command, ConfigCommand, RunArgs};
use crate::cli::output::ConsoleWriter;
use crate::core::bridge::DeviceBridge;
use crate::domain::config::BridgeConfig;
use crate::domain::error::{BridgeError, BridgeResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::serial::{PortProvider, SystemPortProvider};
use std::sync::Arc;
use tracing::info;

/// Execute CLI command
pub async fn execute_command(args: Args) -> BridgeResult<()> {
    let writer = ConsoleWriter::new(args.output.clone());

    let config_manager = ConfigManager::new()?;
    let config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(config_path.as_ref())?
    } else {
        config_manager.load_config()?
    };

    if !args.quiet {
        let level = if args.verbose {
            "debug"
        } else {
            config.bridge.log_level.as_str()
        };
        init_logging(level).map_err(|e| BridgeError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;
    }

    match args.command {
        Command::Run(run_args) => execute_run(run_args, config).await,
        Command::Devices => execute_devices(&writer).await,
        Command::Config(config_args) => match config_args.command {
            ConfigCommand::Show => {
                writer.write_config(&config)?;
                Ok(())
            }
            ConfigCommand::Init => {
                let path = config_manager.save_config(&BridgeConfig::default())?;
                writer.write_message(&format!("Wrote default config to {}", path.display()))?;
                Ok(())
            }
        },
    }
}

async fn execute_run(run_args: RunArgs, mut config: BridgeConfig) -> BridgeResult<()> {
    if let Some(port) = run_args.listen_port {
        config.bridge.listen_port = port;
    }
    if let Some(baud) = run_args.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(interval) = run_args.poll_interval_ms {
        config.bridge.poll_interval_ms = interval;
    }
    if let Some(vendor) = run_args.auto_vendor {
        config.bridge.auto_select_vendor = Some(vendor);
    }

    info!(
        "Starting bridge: poll every {} ms, listening on port {}",
        config.bridge.poll_interval_ms, config.bridge.listen_port
    );

    let mut bridge = DeviceBridge::new(config, Arc::new(SystemPortProvider));
    if let Some(device_id) = run_args.device {
        bridge = bridge.with_initial_device(device_id);
    }

    bridge.run().await
}

async fn execute_devices(writer: &ConsoleWriter) -> BridgeResult<()> {
    let provider = SystemPortProvider;
    let devices = provider.enumerate().await?;
    writer.write_devices(&devices)?;
    Ok(())
}
