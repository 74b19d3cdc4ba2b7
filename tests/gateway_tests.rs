use futures_util::{SinkExt, StreamExt};
use serbridge::{BroadcastGateway, BusMessage, MessageBus, Record};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

/// Gateway tests against a live listener on an ephemeral port.

async fn start_gateway(bus: Arc<MessageBus>) -> std::net::SocketAddr {
    let gateway = BroadcastGateway::bind(("127.0.0.1", 0), Arc::clone(&bus))
        .await
        .expect("Failed to bind gateway");
    let addr = gateway.local_addr();
    tokio::spawn(gateway.run());
    addr
}

async fn connect(addr: std::net::SocketAddr) -> tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
> {
    let (stream, _) = connect_async(format!("ws://{}", addr))
        .await
        .expect("Failed to connect to gateway");
    // Give the server a moment to register the client in the fan-out set.
    tokio::time::sleep(Duration::from_millis(100)).await;
    stream
}

#[tokio::test]
async fn test_data_records_are_forwarded_verbatim() {
    let bus = Arc::new(MessageBus::new());
    let addr = start_gateway(Arc::clone(&bus)).await;
    let mut client = connect(addr).await;

    bus.publish(BusMessage::Data(Record::new("1,2,3,4")));

    let frame = timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream ended")
        .expect("read error");
    assert_eq!(frame, WsMessage::Text("1,2,3,4".to_string()));
}

#[tokio::test]
async fn test_all_clients_receive_each_record() {
    let bus = Arc::new(MessageBus::new());
    let addr = start_gateway(Arc::clone(&bus)).await;
    let mut first = connect(addr).await;
    let mut second = connect(addr).await;

    bus.publish(BusMessage::Data(Record::new("reading")));

    for client in [&mut first, &mut second] {
        let frame = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("read error");
        assert_eq!(frame, WsMessage::Text("reading".to_string()));
    }
}

#[tokio::test]
async fn test_disconnected_client_does_not_block_others() {
    let bus = Arc::new(MessageBus::new());
    let addr = start_gateway(Arc::clone(&bus)).await;
    let dropped = connect(addr).await;
    let mut alive = connect(addr).await;

    drop(dropped);
    tokio::time::sleep(Duration::from_millis(100)).await;

    bus.publish(BusMessage::Data(Record::new("still flowing")));

    let frame = timeout(Duration::from_secs(2), alive.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream ended")
        .expect("read error");
    assert_eq!(frame, WsMessage::Text("still flowing".to_string()));
}

#[tokio::test]
async fn test_client_payloads_are_republished_on_the_bus() {
    let bus = Arc::new(MessageBus::new());
    let addr = start_gateway(Arc::clone(&bus)).await;
    let (_handle, mut rx) = bus.subscribe();
    let mut client = connect(addr).await;

    client
        .send(WsMessage::Text("calibrate".to_string()))
        .await
        .expect("Failed to send");

    let message = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for bus message")
        .expect("bus channel closed");
    assert_eq!(message, BusMessage::ClientData("calibrate".to_string()));
}

#[tokio::test]
async fn test_new_clients_get_no_history() {
    let bus = Arc::new(MessageBus::new());
    let addr = start_gateway(Arc::clone(&bus)).await;

    bus.publish(BusMessage::Data(Record::new("before connect")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut client = connect(addr).await;
    bus.publish(BusMessage::Data(Record::new("after connect")));

    let frame = timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream ended")
        .expect("read error");
    assert_eq!(frame, WsMessage::Text("after connect".to_string()));
}

#[tokio::test]
async fn test_non_data_messages_are_not_forwarded() {
    let bus = Arc::new(MessageBus::new());
    let addr = start_gateway(Arc::clone(&bus)).await;
    let mut client = connect(addr).await;

    bus.publish(BusMessage::DeviceSelected(true));
    bus.publish(BusMessage::Data(Record::new("only this")));

    let frame = timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream ended")
        .expect("read error");
    assert_eq!(frame, WsMessage::Text("only this".to_string()));
}
