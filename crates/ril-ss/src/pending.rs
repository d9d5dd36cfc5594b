//! Pending request correlation.
//!
//! Every command sent to the modem is remembered by its sequence number until
//! the generic acknowledgment for that sequence number arrives. There is no
//! timeout here; records left behind by a lost acknowledgment are dropped with
//! [`PendingRequests::discard_all`] when the transport recovers its connection.

use std::collections::HashMap;

use crate::error::{SsError, SsResult};
use crate::ril::RequestToken;

/// Acknowledgment handlers a record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckCallback {
    /// Finalize a "send USSD" request and reset the session on success.
    UssdSent,
}

/// What to do when the acknowledgment arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckAction {
    /// Hand the acknowledgment to a callback.
    Callback(AckCallback),
    /// Complete the request from the acknowledgment status alone.
    Complete,
}

/// A request waiting for its acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// The caller's request.
    pub token: RequestToken,
    /// Command the acknowledgment must refer to.
    pub command: u16,
    /// Handling on arrival.
    pub action: AckAction,
}

/// Pending requests keyed by sequence number.
#[derive(Debug, Default)]
pub struct PendingRequests {
    entries: HashMap<u8, PendingRequest>,
}

impl PendingRequests {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, seq: u8, request: PendingRequest) -> SsResult<()> {
        if self.entries.contains_key(&seq) {
            return Err(SsError::DuplicatePending { seq });
        }
        self.entries.insert(seq, request);
        Ok(())
    }

    /// Expect an acknowledgment for `seq` and pass it to `callback`.
    pub fn expect_callback(
        &mut self,
        seq: u8,
        command: u16,
        token: RequestToken,
        callback: AckCallback,
    ) -> SsResult<()> {
        self.insert(
            seq,
            PendingRequest {
                token,
                command,
                action: AckAction::Callback(callback),
            },
        )
    }

    /// Expect a bare acknowledgment for `seq` that completes the request directly.
    pub fn expect_complete(&mut self, seq: u8, command: u16, token: RequestToken) -> SsResult<()> {
        self.insert(
            seq,
            PendingRequest {
                token,
                command,
                action: AckAction::Complete,
            },
        )
    }

    /// Consume the record for `seq`.
    pub fn take(&mut self, seq: u8) -> Option<PendingRequest> {
        self.entries.remove(&seq)
    }

    /// Look at the record for `seq` without consuming it.
    pub fn get(&self, seq: u8) -> Option<&PendingRequest> {
        self.entries.get(&seq)
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every record, returning the tokens that were waiting.
    pub fn discard_all(&mut self) -> Vec<RequestToken> {
        self.entries.drain().map(|(_, request)| request.token).collect()
    }
}
