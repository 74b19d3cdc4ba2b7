use crate::core::bus::{AppLifecycle, BusMessage, MessageBus};
use crate::core::directory::DeviceDirectory;
use crate::core::link::{ConnectionManager, ConnectionState};
use crate::domain::config::BridgeConfig;
use crate::domain::error::BridgeResult;
use crate::infrastructure::serial::PortProvider;
use crate::infrastructure::ws::BroadcastGateway;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Top-level orchestrator: owns the bus, wires the Device Directory,
/// Connection Manager, and Broadcast Gateway together, and runs the command
/// loop that serializes `select` handling.
pub struct DeviceBridge {
    config: BridgeConfig,
    bus: Arc<MessageBus>,
    provider: Arc<dyn PortProvider>,
    initial_device: Option<String>,
}

impl DeviceBridge {
    pub fn new(config: BridgeConfig, provider: Arc<dyn PortProvider>) -> Self {
        Self {
            config,
            bus: Arc::new(MessageBus::new()),
            provider,
            initial_device: None,
        }
    }

    /// Connect to this device as soon as the bridge starts, without waiting
    /// for a `SelectDevice` command.
    pub fn with_initial_device(mut self, device_id: impl Into<String>) -> Self {
        self.initial_device = Some(device_id.into());
        self
    }

    /// The process-wide bus, for additional consumers (UI adapter,
    /// diagnostics).
    pub fn bus(&self) -> Arc<MessageBus> {
        Arc::clone(&self.bus)
    }

    /// Run the bridge until an `AppLifecycle::Closing` command arrives.
    ///
    /// Fatal only if the network listener cannot bind; every later failure
    /// is converted into bus state events.
    pub async fn run(self) -> BridgeResult<()> {
        let gateway = BroadcastGateway::bind(
            ("0.0.0.0", self.config.bridge.listen_port),
            Arc::clone(&self.bus),
        )
        .await?;
        info!("Broadcast gateway listening on {}", gateway.local_addr());
        tokio::spawn(gateway.run());

        let directory = DeviceDirectory::new(
            Arc::clone(&self.bus),
            Arc::clone(&self.provider),
            Duration::from_millis(self.config.bridge.poll_interval_ms),
        );
        tokio::spawn(directory.run());

        let (mut manager, mut reader_events) = ConnectionManager::new(
            Arc::clone(&self.bus),
            Arc::clone(&self.provider),
            self.config.serial.clone(),
        );

        let (_handle, mut commands) = self.bus.subscribe();
        let auto_vendor = self.config.bridge.auto_select_vendor.clone();

        if let Some(device_id) = self.initial_device.clone() {
            manager.select(Some(device_id)).await;
        }

        loop {
            tokio::select! {
                message = commands.recv() => {
                    let Some(message) = message else { break };
                    match message {
                        BusMessage::SelectDevice(target) => {
                            manager.select(target).await;
                        }
                        BusMessage::AppLifecycle(AppLifecycle::Started) => {
                            // A fresh consumer starts from a known Idle state.
                            manager.select(None).await;
                        }
                        BusMessage::AppLifecycle(AppLifecycle::Closing) => {
                            info!("Consumer closing, shutting the bridge down");
                            manager.select(None).await;
                            break;
                        }
                        BusMessage::DevicesChanged(set) => {
                            if let Some(vendor) = &auto_vendor {
                                if manager.state() != ConnectionState::Open {
                                    if let Some(device) = set
                                        .devices()
                                        .iter()
                                        .find(|d| d.vendor_matches(vendor))
                                    {
                                        info!(
                                            "Auto-selecting '{}' (vendor match '{}')",
                                            device.id, vendor
                                        );
                                        manager.select(Some(device.id.clone())).await;
                                    }
                                }
                            }
                        }
                        other => debug!("Bridge loop ignoring {:?}", other),
                    }
                }
                event = reader_events.recv() => {
                    let Some(event) = event else { break };
                    manager.handle_reader_event(event).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting the bridge down");
                    manager.select(None).await;
                    break;
                }
            }
        }

        Ok(())
    }
}
