//! Samsung modem IPC: supplementary-services USSD wire contract
//!
//! This crate provides the byte-level types the USSD transaction layer exchanges
//! with the modem firmware over the IPC FMT channel. It knows nothing about
//! sessions or pending requests; it only builds and parses frames.
//!
//! # Protocol Overview
//!
//! Every USSD frame starts with a 3-byte header:
//!
//! ```text
//! +-------+-----+--------+---------------------+
//! | state | dcs | length | payload[0..length]  |
//! +-------+-----+--------+---------------------+
//! ```
//!
//! - **Send** frames (host → modem) are always [`USSD_FRAME_SIZE`] bytes, zero padded.
//! - **Cancel** frames (host → modem) are the bare header.
//! - **Notifications** (modem → host) carry whatever the modem pushed; the payload
//!   encoding is picked from the DCS byte.
//! - **Generic responses** (modem → host) acknowledge a command by sequence number.
//!
//! # Example
//!
//! ```rust,ignore
//! use ril_ss_protocol::{UssdDialect, UssdState, UssdRequestFrame, UssdNotificationFrame};
//!
//! // Build a fresh request
//! let dialect = UssdDialect::for_session(UssdState::Idle);
//! let frame = UssdRequestFrame::build(dialect, b"*100#")?;
//!
//! // Parse a push from the modem
//! let notification = UssdNotificationFrame::parse(&received_data)?;
//! let text = notification.decode_text();
//! ```

mod charset;
mod constants;
mod error;
mod frame;
mod types;

pub use charset::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use types::*;
