//! End-to-end tests over real WebSocket connections.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use splendor_server::SplendorServer;
use tokio_tungstenite::tungstenite::Message;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server(idle_timeout: Option<Duration>) -> String {
    let server = SplendorServer::builder()
        .bind("127.0.0.1:0")
        .seed(5)
        .idle_timeout(idle_timeout)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send_json(ws: &mut ClientWs, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

/// Reads the next text frame as JSON, failing after a second.
async fn recv_json(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(1), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("json");
        }
    }
}

fn create_room(user: &str, room: &str) -> Value {
    json!({
        "contextId": "80bdc250-5365-4caf-8dd9-a33e709a0116",
        "type": "CREATE_ROOM",
        "data": {
            "roomDTO": { "name": room, "password": "Tajne6Przez2Poufne.;" },
            "userDTO": { "uuid": user, "name": "James" },
        },
    })
}

#[tokio::test]
async fn test_create_room_round_trip() {
    let addr = start_server(None).await;
    let mut ws = connect(&addr).await;

    send_json(
        &mut ws,
        create_room("f8c3de3d-1fea-4d7c-a8b0-29f63c4c3454", "TajnyPokoj"),
    )
    .await;
    let resp = recv_json(&mut ws).await;

    assert_eq!(resp["contextId"], "80bdc250-5365-4caf-8dd9-a33e709a0116");
    assert_eq!(resp["type"], "CREATE_ROOM_RESPONSE");
    assert_eq!(resp["result"], "OK");
    assert_eq!(resp["data"]["room"]["name"], "TajnyPokoj");
    assert!(!resp["data"]["room"]["enterCode"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_binary_frames_are_dispatched_too() {
    let addr = start_server(None).await;
    let mut ws = connect(&addr).await;

    let body = json!({ "contextId": "b", "type": "NOPE" }).to_string();
    ws.send(Message::Binary(body.into_bytes().into()))
        .await
        .expect("send");

    let resp = recv_json(&mut ws).await;
    assert_eq!(resp["contextId"], "b");
    assert_eq!(resp["result"], "FAILURE");
}

#[tokio::test]
async fn test_join_reaches_both_clients_and_disconnect_frees_room() {
    let addr = start_server(None).await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;

    send_json(
        &mut alice,
        create_room("f8c3de3d-1fea-4d7c-a8b0-29f63c4c3454", "Salon"),
    )
    .await;
    let created = recv_json(&mut alice).await;
    let code = created["data"]["room"]["enterCode"].as_str().unwrap();

    send_json(
        &mut bob,
        json!({
            "contextId": "join",
            "type": "JOIN_ROOM",
            "data": {
                "roomDTO": { "enterCode": code, "password": "Tajne6Przez2Poufne.;" },
                "userDTO": { "uuid": "0b6f2b1e-4f7a-4c53-9d3e-8a5c2f1d7e90", "name": "Bob" },
            },
        }),
    )
    .await;
    assert_eq!(recv_json(&mut bob).await["type"], "JOIN_ROOM_RESPONSE");
    assert_eq!(recv_json(&mut alice).await["contextId"], "join");

    bob.close(None).await.expect("close");
    let notice = recv_json(&mut alice).await;
    assert_eq!(notice["type"], "LEAVE_ROOM_RESPONSE");
    assert_eq!(notice["data"]["user"]["name"], "Bob");

    // Alice leaving too frees the name for a new room.
    alice.close(None).await.expect("close");
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mut carol = connect(&addr).await;
    send_json(
        &mut carol,
        create_room("7d2c9e4a-1b3f-4a8e-b6d5-c0e9f8a7b6c5", "Salon"),
    )
    .await;
    assert_eq!(recv_json(&mut carol).await["result"], "OK");
}

#[tokio::test]
async fn test_idle_connection_is_closed() {
    let addr = start_server(Some(Duration::from_millis(50))).await;
    let mut ws = connect(&addr).await;

    let ended = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "server should close an idle connection");
}
