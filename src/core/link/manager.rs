use crate::core::bus::{BusMessage, MessageBus};
use crate::core::link::framer::LineFramer;
use crate::domain::{config::SerialSettings, error::BridgeError};
use crate::infrastructure::serial::PortProvider;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Connection lifecycle states. `Idle` and `Failed` are terminal until the
/// next `select`; only the manager transitions this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closing,
    Failed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "Idle"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Closing => write!(f, "Closing"),
            ConnectionState::Failed => write!(f, "Failed"),
        }
    }
}

/// Event from a reader task back to the manager. Tagged with the generation
/// of the connection it belongs to so events from a superseded handle can be
/// discarded (two connections may share a device id across reselects).
#[derive(Debug)]
pub struct ReaderEvent {
    pub generation: u64,
    pub reason: ReaderClosed,
}

#[derive(Debug)]
pub enum ReaderClosed {
    Error(BridgeError),
    EndOfStream,
}

struct ActiveConnection {
    generation: u64,
    device_id: String,
    shutdown: Arc<AtomicBool>,
    reader: tokio::task::JoinHandle<()>,
}

/// Owns the single active serial connection. `select` calls are serialized
/// by ownership: the bridge task holds the manager exclusively and processes
/// commands one at a time.
pub struct ConnectionManager {
    bus: Arc<MessageBus>,
    provider: Arc<dyn PortProvider>,
    settings: SerialSettings,
    state: ConnectionState,
    active: Option<ActiveConnection>,
    generation: u64,
    event_sender: mpsc::UnboundedSender<ReaderEvent>,
}

impl ConnectionManager {
    /// Returns the manager plus the channel on which reader tasks report
    /// close/error events; the bridge loop feeds those back via
    /// [`ConnectionManager::handle_reader_event`].
    pub fn new(
        bus: Arc<MessageBus>,
        provider: Arc<dyn PortProvider>,
        settings: SerialSettings,
    ) -> (Self, mpsc::UnboundedReceiver<ReaderEvent>) {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let manager = Self {
            bus,
            provider,
            settings,
            state: ConnectionState::Idle,
            active: None,
            generation: 0,
            event_sender,
        };
        (manager, event_receiver)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn connected_device(&self) -> Option<&str> {
        self.active.as_ref().map(|c| c.device_id.as_str())
    }

    /// Switch the active connection. `None` closes any open connection;
    /// `Some(id)` closes the current one (if any) and opens the named
    /// device. Selecting the currently open id is deliberately a close-then-
    /// reopen so a consumer can force a reconnect.
    pub async fn select(&mut self, target: Option<String>) {
        let had_connection = self.close_active().await;

        match target {
            None => {
                if had_connection {
                    self.state = ConnectionState::Idle;
                    self.bus.publish(BusMessage::DeviceSelected(false));
                }
                // select(None) while Idle is a no-op.
            }
            Some(device_id) => {
                if had_connection {
                    // Observable close before the reopen attempt.
                    self.bus.publish(BusMessage::DeviceSelected(false));
                }
                self.state = ConnectionState::Connecting;
                match self.open_connection(&device_id).await {
                    Ok(()) => {
                        self.state = ConnectionState::Open;
                        info!("Connected to device '{}'", device_id);
                        self.bus.publish(BusMessage::DeviceSelected(true));
                    }
                    Err(e) => {
                        warn!("Failed to open device '{}': {}", device_id, e);
                        self.state = ConnectionState::Failed;
                        self.bus.publish(BusMessage::DeviceSelected(false));
                    }
                }
            }
        }
    }

    /// React to a close/error event from a reader task. Stale events from a
    /// superseded generation are discarded.
    pub async fn handle_reader_event(&mut self, event: ReaderEvent) {
        let current = match &self.active {
            Some(conn) => conn.generation,
            None => {
                debug!("Discarding reader event with no active connection");
                return;
            }
        };
        if event.generation != current {
            debug!(
                "Discarding stale reader event (generation {} != {})",
                event.generation, current
            );
            return;
        }

        match event.reason {
            ReaderClosed::Error(e) => warn!("Connection error: {}", e),
            ReaderClosed::EndOfStream => info!("Device closed the connection"),
        }

        self.close_active().await;
        self.state = ConnectionState::Failed;
        self.bus.publish(BusMessage::DeviceSelected(false));
    }

    /// Tear down the active connection, if any, releasing the serial handle
    /// before returning. Returns whether a connection existed.
    async fn close_active(&mut self) -> bool {
        let Some(conn) = self.active.take() else {
            return false;
        };

        self.state = ConnectionState::Closing;
        conn.shutdown.store(true, Ordering::Relaxed);
        conn.reader.abort();
        // Join the task so the handle is dropped before a new open.
        let _ = conn.reader.await;
        debug!("Released serial handle for '{}'", conn.device_id);
        true
    }

    async fn open_connection(&mut self, device_id: &str) -> Result<(), BridgeError> {
        let reader = self.provider.open(device_id, &self.settings).await?;

        self.generation += 1;
        let generation = self.generation;
        let shutdown = Arc::new(AtomicBool::new(false));
        let framer = LineFramer::new(
            self.settings.delimiter.as_bytes().to_vec(),
            self.settings.max_frame_bytes,
        );

        let handle = spawn_reader(
            reader,
            framer,
            Arc::clone(&self.bus),
            self.event_sender.clone(),
            generation,
            Arc::clone(&shutdown),
        );

        self.active = Some(ActiveConnection {
            generation,
            device_id: device_id.to_string(),
            shutdown,
            reader: handle,
        });
        Ok(())
    }
}

/// Read loop for one connection. Owns the serial handle and a fresh framer;
/// publishes each framed record to the bus and reports close/error events
/// tagged with its generation.
fn spawn_reader(
    mut reader: Box<dyn Read + Send>,
    mut framer: LineFramer,
    bus: Arc<MessageBus>,
    events: mpsc::UnboundedSender<ReaderEvent>,
    generation: u64,
    shutdown: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut buffer = vec![0u8; 1024];

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Serial reads are blocking with a short timeout; keep them off
            // the async executor's hot path.
            tokio::time::sleep(Duration::from_millis(10)).await;

            match reader.read(&mut buffer) {
                Ok(0) => {
                    let _ = events.send(ReaderEvent {
                        generation,
                        reason: ReaderClosed::EndOfStream,
                    });
                    break;
                }
                Ok(n) => match framer.push(&buffer[..n]) {
                    Ok(records) => {
                        for record in records {
                            bus.publish(BusMessage::Data(record));
                        }
                    }
                    Err(e) => {
                        let _ = events.send(ReaderEvent {
                            generation,
                            reason: ReaderClosed::Error(e),
                        });
                        break;
                    }
                },
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
                Err(e) => {
                    let _ = events.send(ReaderEvent {
                        generation,
                        reason: ReaderClosed::Error(BridgeError::Network(e)),
                    });
                    break;
                }
            }
        }
    })
}
