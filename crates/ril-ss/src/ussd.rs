//! The USSD transaction layer.
//!
//! [`UssdLayer`] owns the session state and the pending request table. Each
//! entry point runs to completion on the caller's thread and talks to the rest
//! of the RIL only through the [`RilContext`] it is handed.
//!
//! Inbound notifications overwrite the session state with the frame's state
//! byte *before* the payload is looked at. A malformed or undecodable payload
//! never keeps the modem-reported state from being recorded.

use ril_ss_metrics::{metric_defs, MetricLabels};
use ril_ss_protocol::{
    encode_cancel_frame, CodingScheme, DecodeOutcome, GenericResponse, IpcMessage, IpcType,
    UssdDialect, UssdNotificationFrame, UssdRequestFrame, UssdState, IPC_GEN_PHONE_RES,
    IPC_SS_USSD, IPC_TYPE_INDI, IPC_TYPE_NOTI,
};

use crate::config::UssdConfig;
use crate::pending::{AckAction, AckCallback, PendingRequests};
use crate::ril::{
    RadioState, RequestOutcome, RequestStatus, RequestToken, RilContext, UnsolicitedEvent,
    UssdNotification, REQUEST_CANCEL_USSD, REQUEST_SEND_USSD,
};
use crate::session::SessionState;

/// Result of handling a generic acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// No request was pending on the acknowledged sequence number.
    Ignored,
    /// The pending request was completed with this status.
    Completed(RequestStatus),
}

/// An inbound notification as it was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUssd {
    /// The emitted notification.
    pub notification: UssdNotification,
    /// Coding scheme picked from the DCS byte.
    pub scheme: CodingScheme,
    /// Whether the text is exact or best-effort.
    pub outcome: DecodeOutcome,
}

/// USSD transaction layer.
#[derive(Debug)]
pub struct UssdLayer {
    session: SessionState,
    pending: PendingRequests,
    config: UssdConfig,
    labels: MetricLabels,
}

impl Default for UssdLayer {
    fn default() -> Self {
        Self::new(UssdConfig::default())
    }
}

impl UssdLayer {
    /// Create a layer with an idle session and nothing pending.
    pub fn new(config: UssdConfig) -> Self {
        let labels = MetricLabels::new(config.modem.clone());
        UssdLayer {
            session: SessionState::new(),
            pending: PendingRequests::new(),
            config,
            labels,
        }
    }

    /// The current session state.
    pub fn session_state(&self) -> UssdState {
        self.session.current()
    }

    /// The pending request table.
    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    /// The layer configuration.
    pub fn config(&self) -> &UssdConfig {
        &self.config
    }

    /// Drop all pending requests without completing them.
    ///
    /// Called by the transport when it recovers its connection; the returned
    /// tokens are the requests that will never see an acknowledgment.
    pub fn discard_pending(&mut self) -> Vec<RequestToken> {
        let tokens = self.pending.discard_all();
        if !tokens.is_empty() {
            tracing::warn!(count = tokens.len(), "Discarding pending USSD requests");
        }
        self.record_pending();
        tokens
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Route a caller request by request code.
    pub fn handle_request<C: RilContext>(
        &mut self,
        ctx: &mut C,
        request: u32,
        data: &[u8],
        token: RequestToken,
    ) -> RequestOutcome {
        match request {
            REQUEST_SEND_USSD => self.send_ussd(ctx, data, token),
            REQUEST_CANCEL_USSD => self.cancel_ussd(ctx, token),
            _ => RequestOutcome::Unhandled,
        }
    }

    /// Route a message from the transport. Returns whether the layer consumed it.
    pub fn handle_message<C: RilContext>(&mut self, ctx: &mut C, msg: &IpcMessage) -> bool {
        match (msg.command, msg.kind) {
            (IPC_SS_USSD, IPC_TYPE_INDI | IPC_TYPE_NOTI) => {
                self.handle_ussd_notification(ctx, msg);
                true
            }
            (IPC_GEN_PHONE_RES, _) => self.handle_generic_response(ctx, msg) != AckOutcome::Ignored,
            _ => false,
        }
    }

    // ========================================================================
    // Outbound
    // ========================================================================

    /// Send a USSD string.
    ///
    /// The session state picks the dialect: an open dialogue gets the bytes
    /// as-is, anything else starts a fresh GSM 7-bit request.
    pub fn send_ussd<C: RilContext>(
        &mut self,
        ctx: &mut C,
        data: &[u8],
        token: RequestToken,
    ) -> RequestOutcome {
        if data.first().map_or(true, |&b| b == 0) {
            tracing::warn!(%token, "Rejecting empty USSD request");
            return self.reject(ctx, token, "malformed");
        }

        if !ctx.is_at_least(RadioState::SimNotReady) {
            tracing::debug!(%token, state = ?ctx.radio_state(), "Radio not ready for USSD");
            return RequestOutcome::Unhandled;
        }

        let state = self.session.current();
        let dialect = UssdDialect::for_session(state);
        tracing::debug!(session = %state, %dialect, "USSD Tx encoding");

        let frame = match UssdRequestFrame::build(dialect, data) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%token, %err, "USSD message is too long, aborting");
                return self.reject(ctx, token, "too_long");
            }
        };

        let seq = ctx.request_seq(token);
        let registered = self
            .pending
            .expect_callback(seq, IPC_SS_USSD, token, AckCallback::UssdSent);
        if let Err(err) = registered {
            tracing::error!(%token, %err, "Cannot register USSD request");
            return self.reject(ctx, token, "duplicate");
        }

        if let Err(err) = ctx.send(seq, IPC_SS_USSD, IpcType::Exec, frame.as_bytes()) {
            self.pending.take(seq);
            tracing::warn!(%token, seq, %err, "Sending USSD request failed");
            return self.reject(ctx, token, "transport");
        }

        let labels = self.labels.with("dialect", dialect.as_str());
        metrics::counter!(metric_defs::USSD_TX_REQUESTS.name, labels.as_slice()).increment(1);
        metrics::histogram!(metric_defs::USSD_TX_PAYLOAD_SIZE.name, labels.as_slice())
            .record(frame.payload_len() as f64);
        self.record_pending();

        RequestOutcome::Handled
    }

    /// Cancel the USSD dialogue.
    ///
    /// The session is marked terminated as soon as the cancel is issued, ahead
    /// of the modem's acknowledgment, and stays so if sending fails.
    pub fn cancel_ussd<C: RilContext>(&mut self, ctx: &mut C, token: RequestToken) -> RequestOutcome {
        if !ctx.is_at_least(RadioState::SimReady) {
            tracing::debug!(%token, state = ?ctx.radio_state(), "SIM not ready for USSD cancel");
            return RequestOutcome::Unhandled;
        }

        let frame = encode_cancel_frame();
        self.session.set(UssdState::TerminatedByNetwork);

        let seq = ctx.request_seq(token);
        if let Err(err) = self.pending.expect_complete(seq, IPC_SS_USSD, token) {
            tracing::error!(%token, %err, "Cannot register USSD cancel");
            return self.reject(ctx, token, "duplicate");
        }

        if let Err(err) = ctx.send(seq, IPC_SS_USSD, IpcType::Exec, &frame) {
            self.pending.take(seq);
            tracing::warn!(%token, seq, %err, "Sending USSD cancel failed");
            return self.reject(ctx, token, "transport");
        }

        metrics::counter!(
            metric_defs::USSD_CANCEL_REQUESTS.name,
            self.labels.base().as_slice()
        )
        .increment(1);
        self.record_pending();

        RequestOutcome::Handled
    }

    fn reject<C: RilContext>(
        &self,
        ctx: &mut C,
        token: RequestToken,
        reason: &'static str,
    ) -> RequestOutcome {
        ctx.complete(token, RequestStatus::GenericFailure, &[]);
        let labels = self.labels.with("reason", reason);
        metrics::counter!(metric_defs::USSD_TX_REJECTED.name, labels.as_slice()).increment(1);
        RequestOutcome::Completed
    }

    // ========================================================================
    // Inbound
    // ========================================================================

    /// Handle a USSD notification pushed by the modem.
    ///
    /// Exactly one "on USSD" event is emitted per frame that carries a header,
    /// even when the text had to be decoded best-effort. A frame shorter than
    /// the header fails the request named by its envelope and emits nothing.
    pub fn handle_ussd_notification<C: RilContext>(
        &mut self,
        ctx: &mut C,
        msg: &IpcMessage,
    ) -> Option<InboundUssd> {
        let frame = match UssdNotificationFrame::parse(&msg.data) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(aseq = msg.aseq, %err, "Malformed USSD notification");
                if let Some(token) = ctx.request_token(msg.aseq) {
                    ctx.complete(token, RequestStatus::GenericFailure, &[]);
                }
                metrics::counter!(
                    metric_defs::USSD_RX_MALFORMED.name,
                    self.labels.base().as_slice()
                )
                .increment(1);
                return None;
            }
        };

        let state = frame.header.state;
        let state_code = state.code().map(|code| code.to_string()).unwrap_or_default();
        self.session.set(state);

        let scheme = frame.coding_scheme();
        let decoded = frame.decode_text();
        match scheme {
            CodingScheme::Unknown => tracing::debug!(
                dcs = frame.header.dcs,
                "USSD Rx encoding is unknown, assuming ASCII"
            ),
            _ => tracing::debug!(dcs = frame.header.dcs, %scheme, "USSD Rx encoding"),
        }
        if decoded.outcome == DecodeOutcome::Fallback {
            if scheme != CodingScheme::Unknown {
                tracing::warn!(
                    dcs = frame.header.dcs,
                    %scheme,
                    truncated = frame.truncated,
                    "USSD text decoded best-effort"
                );
            }
            let labels = self.labels.with("coding_scheme", scheme.as_str());
            metrics::counter!(metric_defs::USSD_RX_FALLBACK_DECODES.name, labels.as_slice())
                .increment(1);
        }
        if self.config.log_payloads {
            tracing::debug!(state = %state, text = %decoded.text, "USSD notification");
        }

        let notification = UssdNotification {
            state: state_code,
            text: decoded.text,
        };
        ctx.unsolicited(UnsolicitedEvent::OnUssd(notification.clone()));

        let labels = self.labels.with("state", notification.state.clone());
        metrics::counter!(metric_defs::USSD_RX_NOTIFICATIONS.name, labels.as_slice()).increment(1);

        Some(InboundUssd {
            notification,
            scheme,
            outcome: decoded.outcome,
        })
    }

    // ========================================================================
    // Acknowledgments
    // ========================================================================

    /// Handle a generic acknowledgment from the modem.
    pub fn handle_generic_response<C: RilContext>(
        &mut self,
        ctx: &mut C,
        msg: &IpcMessage,
    ) -> AckOutcome {
        let Some(request) = self.pending.take(msg.aseq) else {
            tracing::debug!(aseq = msg.aseq, "Ignoring generic response without pending request");
            return AckOutcome::Ignored;
        };
        self.record_pending();

        let response = match GenericResponse::decode(&msg.data) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(token = %request.token, %err, "Malformed generic response");
                return self.finish(ctx, request.token, RequestStatus::GenericFailure);
            }
        };

        if response.command() != request.command {
            tracing::error!(
                token = %request.token,
                expected = request.command,
                actual = response.command(),
                "Generic response command mismatch"
            );
            return self.finish(ctx, request.token, RequestStatus::GenericFailure);
        }

        match request.action {
            AckAction::Callback(AckCallback::UssdSent) => {
                self.on_ussd_sent(ctx, request.token, &response)
            }
            AckAction::Complete => {
                let status = if response.is_success() {
                    RequestStatus::Success
                } else {
                    RequestStatus::GenericFailure
                };
                self.finish(ctx, request.token, status)
            }
        }
    }

    /// Completion callback for "send USSD".
    ///
    /// Success resets the session to idle. Failure leaves the session as the
    /// modem last reported it.
    fn on_ussd_sent<C: RilContext>(
        &mut self,
        ctx: &mut C,
        token: RequestToken,
        response: &GenericResponse,
    ) -> AckOutcome {
        if !response.is_success() {
            tracing::error!(%token, code = response.code, "There was an error, aborting USSD request");
            return self.finish(ctx, token, RequestStatus::GenericFailure);
        }

        let outcome = self.finish(ctx, token, RequestStatus::Success);
        self.session.reset();
        outcome
    }

    fn finish<C: RilContext>(
        &self,
        ctx: &mut C,
        token: RequestToken,
        status: RequestStatus,
    ) -> AckOutcome {
        ctx.complete(token, status, &[]);
        let labels = self.labels.with("status", status.as_str());
        metrics::counter!(metric_defs::USSD_ACK_RESULTS.name, labels.as_slice()).increment(1);
        AckOutcome::Completed(status)
    }

    fn record_pending(&self) {
        metrics::gauge!(
            metric_defs::USSD_PENDING_REQUESTS.name,
            self.labels.base().as_slice()
        )
        .set(self.pending.len() as f64);
    }
}
