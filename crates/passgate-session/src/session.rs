use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use passgate_core::{
    CoreError, DisclosureSpec, RawResultPayload, SessionEvent, SessionState, SessionStateMachine,
    VerificationKind, VerifierConfig,
};
use passgate_disclosure::{CapabilityEvent, ProofCapability, RequestBuilder};
use passgate_eligibility::{EligibilityEvaluator, ResultExtractor};

use crate::error::SessionError;
use crate::outcome::VerificationOutcome;
use crate::render::{QrOptions, QrRenderer};
use crate::status::{progress_status, SessionUpdate, Severity, StatusUpdate, PAUSED_MESSAGE};
use crate::validation::validate_name;

/// Buffered updates per subscriber before slow subscribers start lagging.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

const UNVERIFIED_PROOF_MESSAGE: &str = "Verification failed - proof was not valid";

/// One verification attempt at a time, from the requester's choice of kind
/// to a terminal verdict.
///
/// The session owns its kind and expected name. Methods that talk to the
/// capability take `&mut self`, so at most one such call is in flight.
pub struct VerificationSession {
    id: Uuid,
    capability: Arc<dyn ProofCapability>,
    builder: RequestBuilder,
    evaluator: EligibilityEvaluator,
    extractor: Option<ResultExtractor>,
    renderer: Option<Arc<dyn QrRenderer>>,
    qr_options: QrOptions,
    state: SessionState,
    kind: Option<VerificationKind>,
    expected_name: Option<String>,
    spec: Option<DisclosureSpec>,
    url: Option<String>,
    events: Option<mpsc::Receiver<CapabilityEvent>>,
    outcome: Option<VerificationOutcome>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl VerificationSession {
    pub fn new(capability: Arc<dyn ProofCapability>, config: &VerifierConfig) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            id: Uuid::now_v7(),
            capability,
            builder: RequestBuilder::new(config.request.clone()),
            evaluator: EligibilityEvaluator::new(config.policy.minimum_age),
            extractor: None,
            renderer: None,
            qr_options: QrOptions::from(&config.qr),
            state: SessionState::Idle,
            kind: None,
            expected_name: None,
            spec: None,
            url: None,
            events: None,
            outcome: None,
            updates,
        }
    }

    /// Draw each request URL with `renderer` before waiting for a scan.
    pub fn with_renderer(mut self, renderer: Arc<dyn QrRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Read results with a fixed extractor instead of one dated at result time.
    pub fn with_extractor(mut self, extractor: ResultExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn kind(&self) -> Option<VerificationKind> {
        self.kind
    }

    /// Trimmed expected first name, once accepted.
    pub fn expected_name(&self) -> Option<&str> {
        self.expected_name.as_deref()
    }

    /// Keys and purpose of the request in flight.
    pub fn disclosure_spec(&self) -> Option<&DisclosureSpec> {
        self.spec.as_ref()
    }

    /// URL of the request in flight, for display when no renderer is set.
    pub fn request_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Outcome of the last finished attempt.
    pub fn outcome(&self) -> Option<&VerificationOutcome> {
        self.outcome.as_ref()
    }

    /// Receive status updates and outcomes published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    /// Begin a verification of `kind`.
    ///
    /// Kinds that need an expected name stop in `AwaitingInput`; the others go
    /// straight to building the request. Calling this while an attempt is in
    /// flight changes nothing. A finished attempt is reset first.
    pub async fn start(&mut self, kind: VerificationKind) -> Result<SessionState, SessionError> {
        if self.state.is_active() {
            tracing::debug!(session_id = %self.id, state = %self.state, "start ignored, attempt in flight");
            return Ok(self.state);
        }
        if self.state.is_terminal() {
            self.reset();
        }

        self.kind = Some(kind);
        self.apply(SessionEvent::Start {
            requires_name: kind.requires_name(),
        })?;
        tracing::info!(session_id = %self.id, %kind, "verification started");

        if !kind.requires_name() {
            self.build_request().await?;
        }
        Ok(self.state)
    }

    /// Submit the expected first name and build the request.
    ///
    /// Invalid input leaves the session in `AwaitingInput` and publishes an
    /// error status.
    pub async fn submit_name(&mut self, input: &str) -> Result<SessionState, SessionError> {
        if self.state != SessionState::AwaitingInput {
            return Err(CoreError::InvalidStateTransition {
                from: self.state,
                to: SessionState::BuildingRequest,
            }
            .into());
        }

        let name = match validate_name(input) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "expected name rejected");
                if let SessionError::Validation(message) = &e {
                    self.publish_status(message.clone(), Severity::Error);
                }
                return Err(e);
            }
        };

        self.expected_name = Some(name);
        self.apply(SessionEvent::NameAccepted)?;
        self.build_request().await?;
        Ok(self.state)
    }

    /// Wait for the next capability event and apply it.
    ///
    /// A stream that ends before a terminal event errors the attempt.
    pub async fn next_event(&mut self) -> Result<SessionState, SessionError> {
        let events = self.events.as_mut().ok_or(SessionError::NotStarted)?;
        match events.recv().await {
            Some(event) => {
                tracing::debug!(
                    session_id = %self.id,
                    event = event.label(),
                    terminal = event.is_terminal(),
                    "capability event received"
                );
                Ok(self.handle_event(event))
            }
            None => {
                self.events = None;
                self.fail_with_error("event stream closed");
                Ok(self.state)
            }
        }
    }

    /// Apply events until the attempt finishes and return its outcome.
    pub async fn run_to_completion(&mut self) -> Result<VerificationOutcome, SessionError> {
        while self.state.is_active() {
            self.next_event().await?;
        }
        self.outcome.clone().ok_or(SessionError::NotStarted)
    }

    /// Apply one capability event. Events that arrive while idle, after the
    /// attempt finished, or out of order are ignored.
    pub fn handle_event(&mut self, event: CapabilityEvent) -> SessionState {
        if !self.state.is_active() {
            tracing::debug!(
                session_id = %self.id,
                state = %self.state,
                event = event.label(),
                "event ignored, no attempt in flight"
            );
            return self.state;
        }

        match event {
            CapabilityEvent::RequestReceived => {
                self.advance(SessionEvent::RequestReceived);
            }
            CapabilityEvent::GeneratingProof => {
                self.advance(SessionEvent::GeneratingProof);
            }
            CapabilityEvent::ProofGenerated { name } => {
                tracing::debug!(session_id = %self.id, proof = %name, "proof generated");
                if self.advance(SessionEvent::ProofGenerated) {
                    self.advance(SessionEvent::AwaitResult);
                }
            }
            CapabilityEvent::Result { verified, result } => self.conclude(verified, &result),
            CapabilityEvent::Reject => {
                if let Some(kind) = self.kind {
                    let (message, _) = progress_status(SessionState::Rejected);
                    let outcome =
                        VerificationOutcome::unevaluated(kind, SessionState::Rejected, message);
                    self.finish(SessionEvent::Reject, outcome);
                }
            }
            CapabilityEvent::Error { detail } => {
                tracing::error!(session_id = %self.id, %detail, "capability reported an error");
                self.fail_with_error(&detail);
            }
        }
        self.state
    }

    /// Discard the current attempt and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = match SessionStateMachine::transition(self.state, SessionEvent::Reset) {
            Ok(state) => state,
            Err(_) => SessionState::Idle,
        };
        self.kind = None;
        self.expected_name = None;
        self.spec = None;
        self.url = None;
        self.events = None;
        self.outcome = None;
        self.publish_progress();
    }

    /// Tell the session whether its page is visible. Hiding it mid-attempt
    /// publishes a paused notice; showing it again republishes the current status.
    pub fn set_foreground(&mut self, foreground: bool) {
        if !self.state.is_active() {
            return;
        }
        if foreground {
            self.publish_progress();
        } else {
            tracing::warn!(session_id = %self.id, state = %self.state, "verification paused");
            self.publish_status(PAUSED_MESSAGE.into(), Severity::Warning);
        }
    }

    async fn build_request(&mut self) -> Result<(), SessionError> {
        match self.try_build().await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "failed to build verification request");
                self.fail_with_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn try_build(&mut self) -> Result<(), SessionError> {
        let kind = self.kind.ok_or(SessionError::NotStarted)?;
        self.capability.initialize().await?;
        let built = self.builder.build(kind, self.capability.as_ref()).await?;
        if let Some(renderer) = &self.renderer {
            renderer.render(&built.url, &self.qr_options)?;
        }

        tracing::info!(
            session_id = %self.id,
            %kind,
            url = %built.url,
            purpose = built.spec.purpose(),
            "verification request ready"
        );
        self.spec = Some(built.spec);
        self.url = Some(built.url);
        self.events = Some(built.events);
        self.apply(SessionEvent::RequestReady)?;
        Ok(())
    }

    fn conclude(&mut self, verified: bool, payload: &RawResultPayload) {
        let Some(kind) = self.kind else {
            return;
        };
        if !SessionStateMachine::can_transition(self.state, SessionEvent::Fail) {
            tracing::debug!(session_id = %self.id, state = %self.state, "result ignored");
            return;
        }

        if !verified {
            tracing::info!(session_id = %self.id, "proof did not verify");
            let outcome = VerificationOutcome::unevaluated(
                kind,
                SessionState::Failed,
                UNVERIFIED_PROOF_MESSAGE,
            );
            self.finish(SessionEvent::Fail, outcome);
            return;
        }

        if payload.is_empty() {
            tracing::warn!(session_id = %self.id, "verified result carries no attributes");
        }
        let extractor = self.extractor.unwrap_or_default();
        let normalized = extractor.extract(payload);
        let verdict = self
            .evaluator
            .evaluate(&normalized, self.expected_name.as_deref(), kind);
        for check in &verdict.checks {
            tracing::debug!(
                session_id = %self.id,
                check = %check.name,
                passed = check.passed,
                detail = ?check.detail,
                "eligibility check"
            );
        }

        let label = verdict.label();
        let (event, state) = if label.is_success() {
            (SessionEvent::Succeed, SessionState::Succeeded)
        } else if label.is_partial() {
            (SessionEvent::PartiallyVerify, SessionState::PartiallyVerified)
        } else {
            (SessionEvent::Fail, SessionState::Failed)
        };

        let message = label.message(
            self.expected_name.as_deref(),
            normalized.disclosed_name.as_deref(),
            self.evaluator.minimum_age(),
        );
        let outcome = VerificationOutcome {
            kind,
            state,
            success: label.is_success(),
            partial: label.is_partial(),
            age_verified: kind.includes_age() && verdict.age_verified,
            name_verified: kind.requires_name() && verdict.name_verified,
            age_years: normalized.age_years,
            name: normalized.disclosed_name,
            label: Some(label),
            message,
            completed_at: Utc::now(),
        };
        self.finish(event, outcome);
    }

    /// Move to `Errored` if an attempt is in flight.
    fn fail_with_error(&mut self, detail: &str) {
        let Some(kind) = self.kind else {
            return;
        };
        if !self.state.is_active() {
            return;
        }
        let outcome = VerificationOutcome::unevaluated(
            kind,
            SessionState::Errored,
            format!("Verification error: {detail}"),
        );
        self.finish(SessionEvent::Error, outcome);
    }

    /// Enter a terminal state, then publish its status and the outcome.
    fn finish(&mut self, event: SessionEvent, outcome: VerificationOutcome) {
        match SessionStateMachine::transition(self.state, event) {
            Ok(state) => self.state = state,
            Err(e) => {
                tracing::debug!(session_id = %self.id, error = %e, "terminal event ignored");
                return;
            }
        }

        tracing::info!(
            session_id = %self.id,
            kind = %outcome.kind,
            state = %self.state,
            success = outcome.success,
            partial = outcome.partial,
            "verification finished"
        );

        let (_, severity) = progress_status(self.state);
        self.publish_status(outcome.message.clone(), severity);
        self.publish(SessionUpdate::Outcome(outcome.clone()));
        self.outcome = Some(outcome);
    }

    /// Transition for a lifecycle step and publish its status.
    fn apply(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        self.state = SessionStateMachine::transition(self.state, event)?;
        self.publish_progress();
        Ok(())
    }

    /// Like [`apply`](Self::apply) for device events, which may be stale.
    fn advance(&mut self, event: SessionEvent) -> bool {
        match SessionStateMachine::transition(self.state, event) {
            Ok(state) => {
                self.state = state;
                self.publish_progress();
                true
            }
            Err(_) => {
                tracing::debug!(
                    session_id = %self.id,
                    state = %self.state,
                    event = ?event,
                    "out-of-order device event ignored"
                );
                false
            }
        }
    }

    fn publish_progress(&self) {
        let (message, severity) = progress_status(self.state);
        self.publish_status(message.into(), severity);
    }

    fn publish_status(&self, message: String, severity: Severity) {
        self.publish(SessionUpdate::Status(StatusUpdate {
            state: self.state,
            message,
            severity,
        }));
    }

    fn publish(&self, update: SessionUpdate) {
        // No subscribers is fine.
        let _ = self.updates.send(update);
    }
}
