/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # fixgate Core
//!
//! Message model shared by the fixgate engine and initiator crates.
//!
//! This crate provides:
//! - **Message types**: [`MsgType`] and the owned [`Message`] with header/body fields
//! - **Tag=value codec**: [`Message::encode`] and [`Message::decode`] with checksum handling
//! - **Session identity**: [`SessionId`] shared by every engine callback
//! - **Tags**: well-known FIX tag numbers used by the session layer and the handlers
//! - **Error types**: [`DecodeError`] built on `thiserror`

pub mod checksum;
pub mod error;
pub mod message;
pub mod session_id;
pub mod tags;

pub use error::DecodeError;
pub use message::{Field, Message, MsgType, SOH, printable};
pub use session_id::SessionId;
