//! USSD supplementary-services transaction layer.
//!
//! Translates "send USSD" and "cancel USSD" requests from the telephony stack
//! into Samsung IPC frames, correlates the modem's generic acknowledgments back
//! to those requests, and turns USSD notifications pushed by the modem into
//! "on USSD" events with decoded text.
//!
//! # Example
//!
//! ```ignore
//! use ril_ss::{UssdConfig, UssdLayer, RequestToken, REQUEST_SEND_USSD};
//!
//! let mut layer = UssdLayer::new(UssdConfig::default());
//! layer.handle_request(&mut ctx, REQUEST_SEND_USSD, b"*100#", RequestToken(1));
//!
//! // Later, from the transport's receive path
//! layer.handle_message(&mut ctx, &message);
//! ```

pub mod config;
pub mod error;
pub mod pending;
pub mod ril;
pub mod session;
pub mod ussd;

pub use config::UssdConfig;
pub use error::{SsError, SsResult};
pub use pending::{AckAction, AckCallback, PendingRequest, PendingRequests};
pub use ril::*;
pub use session::SessionState;
pub use ussd::{AckOutcome, InboundUssd, UssdLayer};
