/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message cracking.
//!
//! Inbound application messages are classified into [`InboundMessage`]
//! variants and routed by an explicit match to the matching
//! [`MessageHandler`] method. Types without a variant are dropped, never
//! treated as errors.

use std::fmt;

use fixgate_core::tags;
use fixgate_core::{Message, MsgType, SessionId};
use tracing::{debug, info};

/// Read-only view of an ExecutionReport (35=8).
///
/// Accessors return the raw field text; nothing is parsed or validated.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionReport<'a> {
    message: &'a Message,
}

impl<'a> ExecutionReport<'a> {
    /// ClOrdID (11).
    #[must_use]
    pub fn cl_ord_id(&self) -> Option<&'a str> {
        self.message.get_field_str(tags::CL_ORD_ID)
    }

    /// ExecType (150).
    #[must_use]
    pub fn exec_type(&self) -> Option<&'a str> {
        self.message.get_field_str(tags::EXEC_TYPE)
    }

    /// OrdStatus (39).
    #[must_use]
    pub fn ord_status(&self) -> Option<&'a str> {
        self.message.get_field_str(tags::ORD_STATUS)
    }

    /// LastPx (31).
    #[must_use]
    pub fn last_px(&self) -> Option<&'a str> {
        self.message.get_field_str(tags::LAST_PX)
    }

    /// LastQty (32).
    #[must_use]
    pub fn last_qty(&self) -> Option<&'a str> {
        self.message.get_field_str(tags::LAST_QTY)
    }

    /// The underlying message.
    #[must_use]
    pub const fn message(&self) -> &'a Message {
        self.message
    }

    /// The five reported fields, with missing ones as empty strings.
    #[must_use]
    pub fn summary(&self) -> ExecutionReportSummary<'a> {
        ExecutionReportSummary {
            cl_ord_id: self.cl_ord_id().unwrap_or_default(),
            exec_type: self.exec_type().unwrap_or_default(),
            ord_status: self.ord_status().unwrap_or_default(),
            last_px: self.last_px().unwrap_or_default(),
            last_qty: self.last_qty().unwrap_or_default(),
        }
    }
}

/// Renders as `ClOrdID=.. ExecType=.. OrdStatus=.. LastPx=.. LastQty=..`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionReportSummary<'a> {
    /// ClOrdID (11).
    pub cl_ord_id: &'a str,
    /// ExecType (150).
    pub exec_type: &'a str,
    /// OrdStatus (39).
    pub ord_status: &'a str,
    /// LastPx (31).
    pub last_px: &'a str,
    /// LastQty (32).
    pub last_qty: &'a str,
}

impl fmt::Display for ExecutionReportSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClOrdID={} ExecType={} OrdStatus={} LastPx={} LastQty={}",
            self.cl_ord_id, self.exec_type, self.ord_status, self.last_px, self.last_qty
        )
    }
}

/// An inbound message classified by type.
#[derive(Debug, Clone, Copy)]
pub enum InboundMessage<'a> {
    /// 35=8.
    ExecutionReport(ExecutionReport<'a>),
    /// Any type without a handler method.
    Unknown(&'a Message),
}

impl<'a> InboundMessage<'a> {
    /// Classifies `message` by its MsgType.
    #[must_use]
    pub fn classify(message: &'a Message) -> Self {
        match message.msg_type() {
            MsgType::ExecutionReport => Self::ExecutionReport(ExecutionReport { message }),
            _ => Self::Unknown(message),
        }
    }
}

/// Business handlers for cracked messages.
pub trait MessageHandler: Send + Sync {
    /// Handles an ExecutionReport.
    fn on_execution_report(&self, report: &ExecutionReport<'_>, session_id: &SessionId);
}

/// Outcome of [`crack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cracked {
    /// A handler method ran.
    Handled(MsgType),
    /// No handler exists for this type; the message was dropped.
    Ignored(MsgType),
}

/// Routes `message` to the handler method for its type.
pub fn crack<H>(handler: &H, message: &Message, session_id: &SessionId) -> Cracked
where
    H: MessageHandler + ?Sized,
{
    match InboundMessage::classify(message) {
        InboundMessage::ExecutionReport(report) => {
            handler.on_execution_report(&report, session_id);
            Cracked::Handled(MsgType::ExecutionReport)
        }
        InboundMessage::Unknown(message) => {
            debug!(session = %session_id, msg_type = %message.msg_type(), "no handler, message dropped");
            Cracked::Ignored(message.msg_type().clone())
        }
    }
}

/// Logs one line per execution report.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutionReportLogger;

impl MessageHandler for ExecutionReportLogger {
    fn on_execution_report(&self, report: &ExecutionReport<'_>, session_id: &SessionId) {
        info!(session = %session_id, "[ExecutionReport] {}", report.summary());
    }
}
