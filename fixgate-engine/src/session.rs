/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session protocol for one connection.
//!
//! [`Session::run`] drives a single connection from Logon to disconnect:
//! stamping and sequencing outbound messages, checking inbound sequence
//! numbers, answering admin traffic and invoking the [`Application`]
//! callbacks. Gaps in the inbound sequence are accepted and logged; this
//! engine never asks the peer to resend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use chrono::Utc;
use fixgate_core::tags;
use fixgate_core::{Message, MsgType, SessionId, printable};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::Application;
use crate::codec::FixCodec;
use crate::config::SessionConfig;
use crate::error::EngineError;
use crate::factory::MessageFactory;
use crate::heartbeat::{HeartbeatAction, HeartbeatMonitor};
use crate::log::Log;
use crate::store::MessageStore;

const TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Disconnected,
    LogonSent { since: Instant },
    Active,
    LogoutSent { since: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Disconnect,
}

type Transport<T> = Framed<T, FixCodec>;

pub(crate) struct Session {
    config: Arc<SessionConfig>,
    application: Arc<dyn Application>,
    store: Arc<dyn MessageStore>,
    log: Arc<dyn Log>,
    message_factory: Arc<dyn MessageFactory>,
    phase: Phase,
    logged_on: bool,
    heartbeat: HeartbeatMonitor,
}

impl Session {
    pub(crate) fn new(
        config: Arc<SessionConfig>,
        application: Arc<dyn Application>,
        store: Arc<dyn MessageStore>,
        log: Arc<dyn Log>,
        message_factory: Arc<dyn MessageFactory>,
    ) -> Self {
        let heartbeat = HeartbeatMonitor::new(config.heartbeat_interval, Instant::now());
        Self {
            config,
            application,
            store,
            log,
            message_factory,
            phase: Phase::Disconnected,
            logged_on: false,
            heartbeat,
        }
    }

    pub(crate) fn session_id(&self) -> &SessionId {
        &self.config.session_id
    }

    pub(crate) fn log_event(&self, text: &str) {
        self.log.on_event(text);
    }

    /// Runs the session over `io` until the connection ends.
    ///
    /// Cancelling `shutdown` sends a Logout and waits up to `LogoutTimeout`
    /// for the reply. Messages queued on `outbound` are sent once logged on.
    pub(crate) async fn run<T>(
        &mut self,
        io: T,
        outbound: &mut mpsc::UnboundedReceiver<Message>,
        shutdown: &CancellationToken,
    ) -> Result<(), EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let outcome = self.pump(io, outbound, shutdown).await;
        if let Err(err) = &outcome {
            self.log.on_event(&format!("Disconnected with error: {err}"));
        } else {
            self.log.on_event("Disconnected");
        }
        self.phase = Phase::Disconnected;
        if std::mem::take(&mut self.logged_on) {
            self.application.on_logout(self.session_id()).await;
        }
        outcome
    }

    async fn pump<T>(
        &mut self,
        io: T,
        outbound: &mut mpsc::UnboundedReceiver<Message>,
        shutdown: &CancellationToken,
    ) -> Result<(), EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let codec = FixCodec::new().with_max_message_size(self.config.max_message_size);
        let mut framed = Framed::new(io, codec);

        if self.config.reset_on_logon {
            self.store.reset().await?;
        }
        self.send_logon(&mut framed).await?;

        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let flow = tokio::select! {
                () = shutdown.cancelled(), if !matches!(self.phase, Phase::LogoutSent { .. }) => {
                    self.on_shutdown(&mut framed).await?
                }
                frame = framed.next() => match frame {
                    None => {
                        self.log.on_event("Connection closed by peer");
                        Flow::Disconnect
                    }
                    Some(frame) => self.on_frame(&mut framed, &frame?).await?,
                },
                Some(message) = outbound.recv(), if self.phase == Phase::Active => {
                    self.send(&mut framed, message).await?;
                    Flow::Continue
                }
                _ = ticker.tick() => self.on_tick(&mut framed).await?,
            };
            if flow == Flow::Disconnect {
                return Ok(());
            }
        }
    }

    async fn on_shutdown<T>(&mut self, framed: &mut Transport<T>) -> Result<Flow, EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        if self.phase == Phase::Active {
            self.send_logout(framed, None).await?;
            Ok(Flow::Continue)
        } else {
            self.log.on_event("Shutdown requested before logon completed");
            Ok(Flow::Disconnect)
        }
    }

    async fn on_tick<T>(&mut self, framed: &mut Transport<T>) -> Result<Flow, EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let now = Instant::now();
        match self.phase {
            Phase::LogonSent { since }
                if now.saturating_duration_since(since) >= self.config.logon_timeout =>
            {
                self.log.on_event("Timed out waiting for logon response");
                Ok(Flow::Disconnect)
            }
            Phase::LogoutSent { since }
                if now.saturating_duration_since(since) >= self.config.logout_timeout =>
            {
                self.log.on_event("Timed out waiting for logout response");
                Ok(Flow::Disconnect)
            }
            Phase::Active => match self.heartbeat.poll(now) {
                HeartbeatAction::Idle => Ok(Flow::Continue),
                HeartbeatAction::SendHeartbeat => {
                    let heartbeat = self.admin(MsgType::Heartbeat);
                    self.send(framed, heartbeat).await?;
                    Ok(Flow::Continue)
                }
                HeartbeatAction::SendTestRequest(id) => {
                    let mut request = self.admin(MsgType::TestRequest);
                    request.set_field(tags::TEST_REQ_ID, id);
                    self.send(framed, request).await?;
                    Ok(Flow::Continue)
                }
                HeartbeatAction::Disconnect => {
                    self.log.on_event("Timed out waiting for heartbeat");
                    Ok(Flow::Disconnect)
                }
            },
            _ => Ok(Flow::Continue),
        }
    }

    async fn on_frame<T>(
        &mut self,
        framed: &mut Transport<T>,
        frame: &BytesMut,
    ) -> Result<Flow, EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        self.log.on_incoming(&printable(frame));
        self.heartbeat.on_received(Instant::now());

        let message = match self.message_factory.parse(frame) {
            Ok(message) => message,
            Err(err) => {
                warn!(session = %self.session_id(), error = %err, "dropping garbled message");
                self.log.on_event(&format!("Garbled message dropped: {err}"));
                return Ok(Flow::Continue);
            }
        };

        if message.msg_type() == &MsgType::SequenceReset
            && message.get_field_str(tags::GAP_FILL_FLAG) != Some("Y")
        {
            return self.on_sequence_reset(&message).await;
        }

        let Some(received) = message.seq_num() else {
            self.log.on_event("Message without MsgSeqNum dropped");
            return Ok(Flow::Continue);
        };
        let expected = self.store.next_target_seq();

        if received < expected {
            if message.get_field_str(tags::POSS_DUP_FLAG) == Some("Y") {
                debug!(session = %self.session_id(), received, expected, "ignoring possible duplicate");
                return Ok(Flow::Continue);
            }
            let text = format!("MsgSeqNum too low, expecting {expected} but received {received}");
            self.log.on_event(&text);
            self.send_logout(framed, Some(text)).await?;
            return Ok(Flow::Disconnect);
        }
        if received > expected {
            warn!(session = %self.session_id(), received, expected, "sequence gap, continuing without resend");
            self.log.on_event(&format!(
                "MsgSeqNum too high, expecting {expected} but received {received}; gap not recovered"
            ));
        }
        self.store
            .set_next_target_seq(received.saturating_add(1))
            .await?;

        self.dispatch(framed, message).await
    }

    async fn dispatch<T>(
        &mut self,
        framed: &mut Transport<T>,
        message: Message,
    ) -> Result<Flow, EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let session_id = self.config.session_id.clone();
        match message.msg_type() {
            MsgType::Logon => {
                self.application.from_admin(&message, &session_id).await;
                if let Phase::LogonSent { .. } = self.phase {
                    self.phase = Phase::Active;
                    self.logged_on = true;
                    self.heartbeat =
                        HeartbeatMonitor::new(self.config.heartbeat_interval, Instant::now());
                    self.log.on_event("Received logon response");
                    info!(session = %session_id, "logon complete");
                    self.application.on_logon(&session_id).await;
                }
            }
            MsgType::Heartbeat | MsgType::Reject => {
                self.application.from_admin(&message, &session_id).await;
            }
            MsgType::TestRequest => {
                self.application.from_admin(&message, &session_id).await;
                let mut heartbeat = self.admin(MsgType::Heartbeat);
                if let Some(id) = message.get_field_str(tags::TEST_REQ_ID) {
                    heartbeat.set_field(tags::TEST_REQ_ID, id);
                }
                self.send(framed, heartbeat).await?;
            }
            MsgType::ResendRequest => {
                self.application.from_admin(&message, &session_id).await;
                self.gap_fill(framed, &message).await?;
            }
            MsgType::SequenceReset => {
                self.application.from_admin(&message, &session_id).await;
                if let Some(new_seq) = message.get_field_as::<u64>(tags::NEW_SEQ_NO)
                    && new_seq > self.store.next_target_seq()
                {
                    self.store.set_next_target_seq(new_seq).await?;
                }
            }
            MsgType::Logout => {
                self.application.from_admin(&message, &session_id).await;
                if let Phase::LogoutSent { .. } = self.phase {
                    self.log.on_event("Received logout response");
                } else {
                    self.log.on_event("Received logout request");
                    self.send_logout(framed, None).await?;
                }
                return Ok(Flow::Disconnect);
            }
            _ if self.phase == Phase::Active => {
                self.application.from_app(&message, &session_id).await;
            }
            other => {
                self.log
                    .on_event(&format!("{} received before logon, ignored", other.name()));
            }
        }
        Ok(Flow::Continue)
    }

    async fn on_sequence_reset(&mut self, message: &Message) -> Result<Flow, EngineError> {
        self.application.from_admin(message, self.session_id()).await;
        match message.get_field_as::<u64>(tags::NEW_SEQ_NO) {
            Some(new_seq) => {
                self.log.on_event(&format!(
                    "Received SequenceReset from {} to {new_seq}",
                    self.store.next_target_seq()
                ));
                self.store.set_next_target_seq(new_seq).await?;
            }
            None => self.log.on_event("SequenceReset without NewSeqNo ignored"),
        }
        Ok(Flow::Continue)
    }

    /// Answers a ResendRequest by gap-filling the whole range: stored
    /// messages are never replayed.
    async fn gap_fill<T>(
        &mut self,
        framed: &mut Transport<T>,
        request: &Message,
    ) -> Result<(), EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let begin = request.get_field_as::<u64>(tags::BEGIN_SEQ_NO).unwrap_or(1);
        let next = self.store.next_sender_seq();
        self.log.on_event(&format!(
            "Received ResendRequest from {begin}, gap filling to {next}"
        ));

        let mut fill = self.admin(MsgType::SequenceReset);
        fill.set_field(tags::GAP_FILL_FLAG, "Y");
        fill.set_field(tags::NEW_SEQ_NO, next.to_string());
        fill.set_field(tags::POSS_DUP_FLAG, "Y");
        let encoded = self.prepare(fill, begin).await;
        self.write(framed, encoded).await
    }

    async fn send_logon<T>(&mut self, framed: &mut Transport<T>) -> Result<(), EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let mut logon = self.admin(MsgType::Logon);
        logon.set_field(tags::ENCRYPT_METHOD, "0");
        logon.set_field(
            tags::HEART_BT_INT,
            self.config.heartbeat_interval.as_secs().to_string(),
        );
        if self.config.reset_on_logon {
            logon.set_field(tags::RESET_SEQ_NUM_FLAG, "Y");
        }
        if let Some(version) = &self.config.default_appl_ver_id {
            logon.set_field(tags::DEFAULT_APPL_VER_ID, version.as_str());
        }
        self.send(framed, logon).await?;
        self.phase = Phase::LogonSent {
            since: Instant::now(),
        };
        self.log.on_event("Initiated logon request");
        Ok(())
    }

    async fn send_logout<T>(
        &mut self,
        framed: &mut Transport<T>,
        text: Option<String>,
    ) -> Result<(), EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let mut logout = self.admin(MsgType::Logout);
        if let Some(text) = text {
            logout.set_field(tags::TEXT, text);
        }
        self.send(framed, logout).await?;
        self.phase = Phase::LogoutSent {
            since: Instant::now(),
        };
        self.log.on_event("Initiated logout request");
        Ok(())
    }

    fn admin(&self, msg_type: MsgType) -> Message {
        self.message_factory
            .create(&self.config.session_id.begin_string, msg_type)
    }

    /// Sequences, persists and writes one message.
    async fn send<T>(&mut self, framed: &mut Transport<T>, message: Message) -> Result<(), EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let seq = self.store.next_sender_seq();
        let encoded = self.prepare(message, seq).await;
        self.store.store(seq, &encoded).await?;
        self.store.set_next_sender_seq(seq.saturating_add(1)).await?;
        self.write(framed, encoded).await
    }

    /// Stamps the standard header, runs the outbound callback and encodes.
    async fn prepare(&self, mut message: Message, seq: u64) -> BytesMut {
        let session_id = &self.config.session_id;
        message.set_field(tags::SENDER_COMP_ID, session_id.sender_comp_id.as_str());
        message.set_field(tags::TARGET_COMP_ID, session_id.target_comp_id.as_str());
        message.set_field(tags::MSG_SEQ_NUM, seq.to_string());
        message.set_field(
            tags::SENDING_TIME,
            Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string(),
        );
        if message.is_admin() {
            self.application.to_admin(&mut message, session_id).await;
        } else {
            self.application.to_app(&mut message, session_id).await;
        }
        message.encode()
    }

    async fn write<T>(&mut self, framed: &mut Transport<T>, encoded: BytesMut) -> Result<(), EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        self.log.on_outgoing(&printable(&encoded));
        framed.send(encoded).await?;
        self.heartbeat.on_sent(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::DefaultMessageFactory;
    use crate::log::{LogFactory, ScreenLogFactory};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::io::DuplexStream;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().push(event);
        }
    }

    #[async_trait]
    impl Application for Recorder {
        async fn on_create(&self, _session_id: &SessionId) {
            self.push("create".to_string());
        }

        async fn on_logon(&self, _session_id: &SessionId) {
            self.push("logon".to_string());
        }

        async fn on_logout(&self, _session_id: &SessionId) {
            self.push("logout".to_string());
        }

        async fn to_admin(&self, _message: &mut Message, _session_id: &SessionId) {}

        async fn from_admin(&self, message: &Message, _session_id: &SessionId) {
            self.push(format!("admin:{}", message.msg_type()));
        }

        async fn to_app(&self, _message: &mut Message, _session_id: &SessionId) {}

        async fn from_app(&self, message: &Message, _session_id: &SessionId) {
            self.push(format!("app:{}", message.msg_type()));
        }
    }

    struct Harness {
        recorder: Arc<Recorder>,
        store: Arc<MemoryStore>,
        peer: Framed<DuplexStream, FixCodec>,
        shutdown: CancellationToken,
        outbound: mpsc::UnboundedSender<Message>,
        task: tokio::task::JoinHandle<Result<(), EngineError>>,
    }

    fn start(config: SessionConfig) -> Harness {
        let recorder = Arc::new(Recorder::default());
        let store = Arc::new(MemoryStore::new());
        let log = ScreenLogFactory.create(&config.session_id).unwrap();
        let mut session = Session::new(
            Arc::new(config),
            recorder.clone(),
            store.clone(),
            log,
            Arc::new(DefaultMessageFactory::new()),
        );
        let (client, server) = tokio::io::duplex(64 * 1024);
        let shutdown = CancellationToken::new();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel();
        let token = shutdown.clone();
        let task =
            tokio::spawn(async move { session.run(client, &mut outbound_rx, &token).await });
        Harness {
            recorder,
            store,
            peer: Framed::new(server, FixCodec::new()),
            shutdown,
            outbound,
            task,
        }
    }

    fn config() -> SessionConfig {
        SessionConfig::new(SessionId::new("FIX.4.4", "CLIENT", "BROKER"), "localhost", 0)
    }

    fn from_peer(msg_type: MsgType, seq: u64, fields: &[(u32, &str)]) -> BytesMut {
        let mut message = Message::new("FIX.4.4", msg_type);
        message.set_field(tags::SENDER_COMP_ID, "BROKER");
        message.set_field(tags::TARGET_COMP_ID, "CLIENT");
        message.set_field(tags::MSG_SEQ_NUM, seq.to_string());
        message.set_field(tags::SENDING_TIME, "20260127-10:00:00.000");
        for (tag, value) in fields {
            message.set_field(*tag, *value);
        }
        message.encode()
    }

    async fn receive(peer: &mut Framed<DuplexStream, FixCodec>) -> Message {
        let frame = peer.next().await.unwrap().unwrap();
        Message::decode(&frame).unwrap()
    }

    async fn logon(harness: &mut Harness) {
        let logon = receive(&mut harness.peer).await;
        assert_eq!(logon.msg_type(), &MsgType::Logon);
        harness
            .peer
            .send(from_peer(MsgType::Logon, 1, &[(98, "0"), (108, "30")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_logon_fields() {
        let mut harness = start(config().with_reset_on_logon(true));
        let logon = receive(&mut harness.peer).await;

        assert_eq!(logon.msg_type(), &MsgType::Logon);
        assert_eq!(logon.get_field_str(tags::SENDER_COMP_ID), Some("CLIENT"));
        assert_eq!(logon.get_field_str(tags::TARGET_COMP_ID), Some("BROKER"));
        assert_eq!(logon.seq_num(), Some(1));
        assert_eq!(logon.get_field_str(tags::ENCRYPT_METHOD), Some("0"));
        assert_eq!(logon.get_field_str(tags::HEART_BT_INT), Some("30"));
        assert_eq!(logon.get_field_str(tags::RESET_SEQ_NUM_FLAG), Some("Y"));
        assert!(logon.has_field(tags::SENDING_TIME));

        harness.shutdown.cancel();
        harness.task.await.unwrap().unwrap();
        assert!(harness.recorder.events().is_empty());
    }

    #[tokio::test]
    async fn test_callback_order_through_peer_logout() {
        let mut harness = start(config());
        logon(&mut harness).await;

        harness
            .peer
            .send(from_peer(MsgType::ExecutionReport, 2, &[(11, "A1"), (150, "0")]))
            .await
            .unwrap();
        harness
            .peer
            .send(from_peer(MsgType::Logout, 3, &[]))
            .await
            .unwrap();

        let reply = receive(&mut harness.peer).await;
        assert_eq!(reply.msg_type(), &MsgType::Logout);
        assert_eq!(reply.seq_num(), Some(2));

        harness.task.await.unwrap().unwrap();
        assert_eq!(
            harness.recorder.events(),
            vec!["admin:A", "logon", "app:8", "admin:5", "logout"]
        );
        assert_eq!(harness.store.next_target_seq(), 4);
        assert_eq!(harness.store.next_sender_seq(), 3);
    }

    #[tokio::test]
    async fn test_test_request_answered() {
        let mut harness = start(config());
        logon(&mut harness).await;

        harness
            .peer
            .send(from_peer(MsgType::TestRequest, 2, &[(112, "PING")]))
            .await
            .unwrap();
        let heartbeat = receive(&mut harness.peer).await;
        assert_eq!(heartbeat.msg_type(), &MsgType::Heartbeat);
        assert_eq!(heartbeat.get_field_str(tags::TEST_REQ_ID), Some("PING"));

        harness.shutdown.cancel();
        let logout = receive(&mut harness.peer).await;
        assert_eq!(logout.msg_type(), &MsgType::Logout);
        harness
            .peer
            .send(from_peer(MsgType::Logout, 3, &[]))
            .await
            .unwrap();
        harness.task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_seq_too_low_logs_out() {
        let mut harness = start(config());
        logon(&mut harness).await;

        harness
            .peer
            .send(from_peer(MsgType::Heartbeat, 1, &[]))
            .await
            .unwrap();
        let logout = receive(&mut harness.peer).await;
        assert_eq!(logout.msg_type(), &MsgType::Logout);
        assert_eq!(
            logout.get_field_str(tags::TEXT),
            Some("MsgSeqNum too low, expecting 2 but received 1")
        );
        harness.task.await.unwrap().unwrap();
        assert_eq!(harness.recorder.events().last().map(String::as_str), Some("logout"));
    }

    #[tokio::test]
    async fn test_gap_is_accepted_and_reset_applied() {
        let mut harness = start(config());
        logon(&mut harness).await;

        harness
            .peer
            .send(from_peer(MsgType::News, 5, &[(58, "hello")]))
            .await
            .unwrap();
        harness
            .peer
            .send(from_peer(MsgType::SequenceReset, 99, &[(36, "20")]))
            .await
            .unwrap();
        harness
            .peer
            .send(from_peer(MsgType::Logout, 20, &[]))
            .await
            .unwrap();
        let _ = receive(&mut harness.peer).await;
        harness.task.await.unwrap().unwrap();

        assert_eq!(
            harness.recorder.events(),
            vec!["admin:A", "logon", "app:B", "admin:4", "admin:5", "logout"]
        );
        assert_eq!(harness.store.next_target_seq(), 21);
    }

    #[tokio::test]
    async fn test_max_seq_num_does_not_kill_session() {
        let mut harness = start(config());
        logon(&mut harness).await;

        let max = u64::MAX;
        harness
            .peer
            .send(from_peer(MsgType::News, max, &[(58, "edge")]))
            .await
            .unwrap();
        harness
            .peer
            .send(from_peer(MsgType::Logout, max, &[]))
            .await
            .unwrap();
        let reply = receive(&mut harness.peer).await;
        assert_eq!(reply.msg_type(), &MsgType::Logout);

        harness.task.await.unwrap().unwrap();
        assert_eq!(harness.store.next_target_seq(), u64::MAX);
        assert_eq!(
            harness.recorder.events(),
            vec!["admin:A", "logon", "app:B", "admin:5", "logout"]
        );
    }

    #[tokio::test]
    async fn test_queued_message_sent_after_logon() {
        let mut harness = start(config());
        let mut order = Message::new("FIX.4.4", MsgType::NewOrderSingle);
        order.set_field(tags::CL_ORD_ID, "ORD-1");
        harness.outbound.send(order).unwrap();

        logon(&mut harness).await;
        let sent = receive(&mut harness.peer).await;
        assert_eq!(sent.msg_type(), &MsgType::NewOrderSingle);
        assert_eq!(sent.seq_num(), Some(2));
        assert_eq!(sent.get_field_str(tags::CL_ORD_ID), Some("ORD-1"));
        assert!(harness.store.get(2).is_some());

        drop(harness.peer);
        harness.task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_resend_request_is_gap_filled() {
        let mut harness = start(config());
        logon(&mut harness).await;

        harness
            .peer
            .send(from_peer(MsgType::ResendRequest, 2, &[(7, "1"), (16, "0")]))
            .await
            .unwrap();
        let fill = receive(&mut harness.peer).await;
        assert_eq!(fill.msg_type(), &MsgType::SequenceReset);
        assert_eq!(fill.seq_num(), Some(1));
        assert_eq!(fill.get_field_str(tags::GAP_FILL_FLAG), Some("Y"));
        assert_eq!(fill.get_field_str(tags::NEW_SEQ_NO), Some("2"));
        assert_eq!(harness.store.next_sender_seq(), 2);

        drop(harness.peer);
        harness.task.await.unwrap().unwrap();
    }
}
