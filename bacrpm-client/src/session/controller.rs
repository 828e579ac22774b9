//! Session controller
//!
//! Drives one ReadPropertyMultiple exchange: bind the device, send the
//! batch once, then watch the transaction until it is released, fails or
//! a fault arrives. Time only enters through [`SessionController::tick`],
//! in whole seconds.

use crate::binding::AddressResolver;
use crate::config::SessionConfig;
use crate::session::state::{FailureReason, SessionState};
use crate::stack::{ProtocolStack, TransactionStatus};
use bacrpm_application::{CrossReferenceTable, InboundEvent, RequestBatch, ResponseTranscoder, ResultDocument};
use bacrpm_core::BacnetAddress;
use std::time::Duration;
use tokio::time::Instant;

/// State machine for a single batched read
pub struct SessionController<S: ProtocolStack> {
    stack: S,
    config: SessionConfig,
    device_id: u32,
    /// Read-only once the batch is built
    table: CrossReferenceTable,
    batch: RequestBatch,
    resolver: AddressResolver,
    state: SessionState,
    destination: Option<BacnetAddress>,
    invoke_id: Option<u8>,
    /// Fault received for our transaction, acted on at the next tick
    pending_fault: Option<FailureReason>,
    binding_elapsed: u64,
    document: Option<ResultDocument>,
}

impl<S: ProtocolStack> SessionController<S> {
    pub fn new(
        stack: S,
        config: SessionConfig,
        device_id: u32,
        table: CrossReferenceTable,
        batch: RequestBatch,
    ) -> Self {
        let resolver = AddressResolver::new(config.bind_request_lifetime());
        Self {
            stack,
            config,
            device_id,
            table,
            batch,
            resolver,
            state: SessionState::Idle,
            destination: None,
            invoke_id: None,
            pending_fault: None,
            binding_elapsed: 0,
            document: None,
        }
    }

    /// Use a known address for the device instead of discovery
    pub fn with_static_binding(mut self, address: BacnetAddress) -> Self {
        self.resolver.add_static(self.device_id, address, self.config.max_apdu);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn document(&self) -> Option<&ResultDocument> {
        self.document.as_ref()
    }

    /// Take the result document; `None` if no acknowledgement was decoded
    pub fn into_document(self) -> Option<ResultDocument> {
        self.document
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    /// Leave `Idle`: send the request at once if the device is bound,
    /// otherwise start discovery
    pub async fn start(&mut self) {
        if self.state != SessionState::Idle {
            return;
        }
        self.transition(SessionState::BindingDevice);
        if !self.try_submit().await {
            self.request_binding().await;
        }
    }

    /// Run until the session ends
    pub async fn run(&mut self) -> &SessionState {
        self.start().await;
        let mut last = Instant::now();
        while !self.state.is_terminal() {
            let elapsed = last.elapsed().as_secs();
            if elapsed > 0 {
                last += Duration::from_secs(elapsed);
            }
            self.tick(elapsed).await;
        }
        &self.state
    }

    /// Advance the session by `elapsed_seconds` and handle at most one
    /// inbound event
    pub async fn tick(&mut self, elapsed_seconds: u64) {
        if self.state == SessionState::Idle {
            self.start().await;
        }
        if self.state.is_terminal() {
            return;
        }

        if let Err(e) = self.stack.advance_timers(Duration::from_secs(elapsed_seconds)).await {
            self.fail(FailureReason::Transport(e.to_string()));
            return;
        }

        // faults win over a release seen in the same tick
        if let Some(reason) = self.pending_fault.take() {
            self.fail(reason);
            return;
        }

        match self.state {
            SessionState::BindingDevice => {
                self.resolver.age(elapsed_seconds);
                if !self.try_submit().await {
                    self.binding_elapsed += elapsed_seconds;
                    if self.binding_elapsed > self.config.binding_timeout_seconds() {
                        self.fail(FailureReason::AddressResolutionTimeout);
                        return;
                    }
                    self.request_binding().await;
                }
            }
            SessionState::AwaitingAck => {
                if let Some(invoke_id) = self.invoke_id {
                    match self.stack.transaction_status(invoke_id) {
                        TransactionStatus::Released => self.transition(SessionState::Succeeded),
                        TransactionStatus::Failed => self.fail(FailureReason::TransactionTimeout),
                        TransactionStatus::Pending => {}
                    }
                }
            }
            _ => {}
        }
        if self.state.is_terminal() {
            return;
        }

        match self.stack.receive(self.config.receive_poll).await {
            Ok(Some(event)) => self.dispatch(event),
            Ok(None) => {}
            Err(e) => log::warn!("Receive failed: {}", e),
        }
    }

    /// Submit the batch if the device is bound
    ///
    /// Returns `false` while the device is still unbound.
    async fn try_submit(&mut self) -> bool {
        let Some(binding) = self.resolver.resolve(self.device_id).cloned() else {
            return false;
        };
        let max_apdu = binding.max_apdu.min(self.config.max_apdu);
        match self
            .stack
            .send_read_property_multiple(&binding.address, max_apdu, &self.batch)
            .await
        {
            Ok(invoke_id) => {
                self.invoke_id = Some(invoke_id);
                self.destination = Some(binding.address);
                self.transition(SessionState::AwaitingAck);
            }
            Err(e) => self.fail(FailureReason::Transport(e.to_string())),
        }
        true
    }

    async fn request_binding(&mut self) {
        if !self.resolver.request(self.device_id) {
            return;
        }
        if let Err(e) = self.stack.send_who_is(self.device_id).await {
            self.fail(FailureReason::Transport(e.to_string()));
        }
    }

    fn dispatch(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::IAm {
                source,
                device_id,
                max_apdu,
            } => {
                if device_id == self.device_id && self.state == SessionState::BindingDevice {
                    let max_apdu = u16::try_from(max_apdu).unwrap_or(u16::MAX);
                    self.resolver.on_i_am(device_id, source, max_apdu);
                }
            }
            other => self.dispatch_reply(other),
        }
    }

    fn dispatch_reply(&mut self, event: InboundEvent) {
        let own_reply = match (&self.destination, self.invoke_id) {
            (Some(destination), Some(invoke_id)) => {
                self.state == SessionState::AwaitingAck && event.belongs_to(destination, invoke_id)
            }
            _ => false,
        };
        if !own_reply {
            log::trace!("Ignoring {}", event.description());
            return;
        }
        log::debug!("{}", event.description());

        match event {
            InboundEvent::ComplexAck { decoded: Ok(results), .. } => {
                let transcoder = ResponseTranscoder::new(&self.table);
                let document = self.document.get_or_insert_with(ResultDocument::new);
                transcoder.transcode_into(results, document);
            }
            InboundEvent::ComplexAck { decoded: Err(e), .. } => {
                self.pending_fault = Some(FailureReason::MalformedResponse(e.to_string()));
            }
            InboundEvent::Error { error, .. } => self.pending_fault = Some(FailureReason::Error(error)),
            InboundEvent::Abort { reason, .. } => self.pending_fault = Some(FailureReason::Abort(reason)),
            InboundEvent::Reject { reason, .. } => self.pending_fault = Some(FailureReason::Reject(reason)),
            InboundEvent::Malformed { detail, .. } => {
                self.pending_fault = Some(FailureReason::MalformedResponse(detail));
            }
            InboundEvent::IAm { .. } | InboundEvent::Unrelated => {}
        }
    }

    fn fail(&mut self, reason: FailureReason) {
        if let Some(invoke_id) = self.invoke_id {
            self.stack.release_transaction(invoke_id);
        }
        self.transition(SessionState::Failed(reason));
    }

    fn transition(&mut self, next: SessionState) {
        if !self.state.can_transition_to(&next) {
            log::warn!("Ignoring session transition {} -> {}", self.state, next);
            return;
        }
        log::debug!("Session {} -> {}", self.state, next);
        self.state = next;
    }
}
