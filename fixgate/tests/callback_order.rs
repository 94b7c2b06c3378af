/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Lifecycle callbacks are logged in the order the engine delivers them.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use fixgate::FixApp;
use fixgate_core::{Message, MsgType, SessionId, tags};
use fixgate_engine::{
    Application, DefaultMessageFactory, FixCodec, Initiator, InitiatorParts, MemoryStoreFactory,
    ScreenLogFactory, SessionSettings, SocketInitiator,
};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Callback markers in the order they were logged.
    fn markers(&self) -> Vec<String> {
        const MARKERS: [&str; 5] = [
            "[OnCreate]",
            "[OnLogon]",
            "[FromApp]",
            "[OnLogout]",
            "[ExecutionReport]",
        ];
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .filter_map(|line| MARKERS.iter().find(|m| line.contains(**m)))
            .map(|m| (*m).to_string())
            .collect()
    }

    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn session() -> SessionId {
    SessionId::new("FIX.4.4", "CLIENT", "BROKER")
}

fn execution_report(cl_ord_id: &str) -> Message {
    let mut message = Message::new("FIX.4.4", MsgType::ExecutionReport);
    message.set_field(tags::CL_ORD_ID, cl_ord_id);
    message.set_field(tags::EXEC_TYPE, "0");
    message.set_field(tags::ORD_STATUS, "0");
    message.set_field(tags::LAST_PX, "101.5");
    message.set_field(tags::LAST_QTY, "100");
    message
}

fn from_broker(mut message: Message, seq: u64) -> BytesMut {
    message.set_field(tags::SENDER_COMP_ID, "BROKER");
    message.set_field(tags::TARGET_COMP_ID, "CLIENT");
    message.set_field(tags::MSG_SEQ_NUM, seq.to_string());
    message.set_field(tags::SENDING_TIME, "20260127-10:00:00.000");
    message.encode()
}

#[tokio::test]
async fn scripted_callbacks_keep_their_order() {
    let capture = Capture::default();
    let _guard = capture.install();
    let app = FixApp::new();
    let id = session();

    app.on_create(&id).await;
    app.on_logon(&id).await;
    app.from_app(&execution_report("A1"), &id).await;
    app.from_app(&execution_report("A2"), &id).await;
    app.on_logout(&id).await;

    assert_eq!(
        capture.markers(),
        vec![
            "[OnCreate]",
            "[OnLogon]",
            "[FromApp]",
            "[ExecutionReport]",
            "[FromApp]",
            "[ExecutionReport]",
            "[OnLogout]",
        ]
    );
    let out = capture.contents();
    assert!(out.contains("ClOrdID=A1 ExecType=0 OrdStatus=0 LastPx=101.5 LastQty=100"));
    assert!(out.contains("ClOrdID=A2 ExecType=0 OrdStatus=0 LastPx=101.5 LastQty=100"));
}

#[tokio::test]
async fn engine_drives_callbacks_in_transport_order() {
    let capture = Capture::default();
    let _guard = capture.install();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let settings = SessionSettings::parse(&format!(
        "[SESSION]\nBeginString=FIX.4.4\nSenderCompID=CLIENT\nTargetCompID=BROKER\n\
         SocketConnectHost=127.0.0.1\nSocketConnectPort={port}\nLogoutTimeout=1\n"
    ))
    .unwrap();
    let initiator = SocketInitiator::new(InitiatorParts {
        application: Arc::new(FixApp::new()),
        store_factory: Arc::new(MemoryStoreFactory),
        settings,
        log_factory: Arc::new(ScreenLogFactory),
        message_factory: Arc::new(DefaultMessageFactory::new()),
    })
    .unwrap();
    initiator.start().await.unwrap();

    let (socket, _) = listener.accept().await.unwrap();
    let mut broker = Framed::new(socket, FixCodec::new());
    let logon = Message::decode(&broker.next().await.unwrap().unwrap()).unwrap();
    assert_eq!(logon.msg_type(), &MsgType::Logon);

    let mut reply = Message::new("FIX.4.4", MsgType::Logon);
    reply.set_field(tags::ENCRYPT_METHOD, "0");
    reply.set_field(tags::HEART_BT_INT, "30");
    broker.send(from_broker(reply, 1)).await.unwrap();
    broker.send(from_broker(execution_report("A1"), 2)).await.unwrap();
    broker.send(from_broker(execution_report("A2"), 3)).await.unwrap();
    broker
        .send(from_broker(Message::new("FIX.4.4", MsgType::Logout), 4))
        .await
        .unwrap();

    let answer = Message::decode(&broker.next().await.unwrap().unwrap()).unwrap();
    assert_eq!(answer.msg_type(), &MsgType::Logout);
    drop(broker);

    tokio::time::timeout(Duration::from_secs(5), async {
        while !capture.contents().contains("[OnLogout]") {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    initiator.stop().await.unwrap();

    assert_eq!(
        capture.markers(),
        vec![
            "[OnCreate]",
            "[OnLogon]",
            "[FromApp]",
            "[ExecutionReport]",
            "[FromApp]",
            "[ExecutionReport]",
            "[OnLogout]",
        ]
    );
}
