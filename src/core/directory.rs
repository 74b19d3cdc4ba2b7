use crate::core::bus::{BusMessage, MessageBus};
use crate::domain::device::DeviceSet;
use crate::domain::error::BridgeResult;
use crate::infrastructure::serial::PortProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Polls the host for attached serial devices and publishes
/// `DevicesChanged` whenever the set differs from the last published one.
/// Owns the authoritative current set; enumeration failures leave it
/// untouched until the next successful poll.
pub struct DeviceDirectory {
    bus: Arc<MessageBus>,
    provider: Arc<dyn PortProvider>,
    poll_interval: Duration,
    current: DeviceSet,
}

impl DeviceDirectory {
    pub fn new(
        bus: Arc<MessageBus>,
        provider: Arc<dyn PortProvider>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            bus,
            provider,
            poll_interval,
            current: DeviceSet::default(),
        }
    }

    pub fn current(&self) -> &DeviceSet {
        &self.current
    }

    /// One enumeration cycle. Returns whether a change event was published.
    pub async fn poll_once(&mut self) -> BridgeResult<bool> {
        let devices = self.provider.enumerate().await?;
        let fresh = DeviceSet::new(devices);

        if fresh.same_devices(&self.current) {
            return Ok(false);
        }

        info!("Device set changed: {} device(s) attached", fresh.len());
        self.current = fresh.clone();
        self.bus.publish(BusMessage::DevicesChanged(fresh));
        Ok(true)
    }

    /// Fixed-interval poll loop. Enumeration errors are logged and
    /// swallowed; a failing poll never blocks the next one.
    pub async fn run(mut self) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(changed) => {
                    if !changed {
                        debug!("Device poll: no change");
                    }
                }
                Err(e) => warn!("Device enumeration failed: {}", e),
            }
        }
    }
}
