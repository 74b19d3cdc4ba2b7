use crate::core::bus::{BusMessage, MessageBus};
use crate::domain::error::BridgeResult;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type ClientMap = Arc<Mutex<HashMap<Uuid, mpsc::UnboundedSender<WsMessage>>>>;

/// Bidirectional fan-out to browser-hosted clients over WebSocket.
///
/// Every bus `Data` record is forwarded verbatim as a text frame to every
/// connected client, fire-and-forget: each client has its own unbounded
/// outbound queue drained by a dedicated writer task, so a slow or dead
/// client never back-pressures the fan-out or the framer. Inbound client
/// text is republished on the bus as `ClientData`. New clients get no
/// history replay.
pub struct BroadcastGateway {
    listener: TcpListener,
    local_addr: SocketAddr,
    bus: Arc<MessageBus>,
}

impl BroadcastGateway {
    /// Bind the client-facing listener. Failure here is fatal to the
    /// process; nothing else in the gateway is.
    pub async fn bind(addr: impl ToSocketAddrs, bus: Arc<MessageBus>) -> BridgeResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            bus,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept loop plus the bus-to-clients forwarder.
    pub async fn run(self) {
        let clients: ClientMap = Arc::new(Mutex::new(HashMap::new()));

        // Forward every Data record to all connected clients.
        let (_handle, mut bus_rx) = self.bus.subscribe();
        let fanout_clients = Arc::clone(&clients);
        tokio::spawn(async move {
            while let Some(message) = bus_rx.recv().await {
                if let BusMessage::Data(record) = message {
                    let clients = fanout_clients.lock().await;
                    for (client_id, sender) in clients.iter() {
                        // Queue send; a dead client is cleaned up by its
                        // own writer task, not here.
                        if sender.send(WsMessage::Text(record.payload.clone())).is_err() {
                            debug!("Client {} queue closed, skipping", client_id);
                        }
                    }
                }
            }
        });

        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let bus = Arc::clone(&self.bus);
                    let clients = Arc::clone(&clients);
                    tokio::spawn(async move {
                        handle_client(stream, peer_addr, bus, clients).await;
                    });
                }
                Err(e) => {
                    // Transient accept errors (e.g. fd exhaustion) must not
                    // kill the gateway.
                    error!("Failed to accept client connection: {}", e);
                }
            }
        }
    }
}

/// Full lifecycle of one browser client: handshake, register in the fan-out
/// set, pump frames both ways, deregister on disconnect.
async fn handle_client(
    stream: TcpStream,
    peer_addr: SocketAddr,
    bus: Arc<MessageBus>,
    clients: ClientMap,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed with {}: {}", peer_addr, e);
            return;
        }
    };

    let client_id = Uuid::new_v4();
    info!("Client {} connected from {}", client_id, peer_addr);

    let (mut ws_sink, mut ws_source) = ws_stream.split();
    let (sender, mut outbound) = mpsc::unbounded_channel::<WsMessage>();
    clients.lock().await.insert(client_id, sender);

    // Writer task: drain this client's queue into its socket.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if ws_sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    // Reader loop: republish inbound payloads on the bus.
    while let Some(frame) = ws_source.next().await {
        match frame {
            Ok(WsMessage::Text(payload)) => {
                debug!("Client {} sent {} bytes", client_id, payload.len());
                bus.publish(BusMessage::ClientData(payload));
            }
            Ok(WsMessage::Binary(payload)) => {
                bus.publish(BusMessage::ClientData(
                    String::from_utf8_lossy(&payload).into_owned(),
                ));
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {} // ping/pong handled by tungstenite
            Err(e) => {
                debug!("Client {} read error: {}", client_id, e);
                break;
            }
        }
    }

    clients.lock().await.remove(&client_id);
    writer.abort();
    info!("Client {} disconnected", client_id);
}
