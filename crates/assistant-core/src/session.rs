//! Session state machine
//!
//! `SessionState` owns the prompt, the latest reply or image, the loading
//! flag and the conversation log. Requests follow a begin/settle protocol:
//! `begin_*` moves the session into `Pending` and hands back a [`Ticket`];
//! whoever runs the dispatcher future passes that ticket to `settle_*`.
//!
//! Only one request may be in flight. A second `begin_*` while pending is
//! rejected with [`SessionError::Busy`] and leaves the state untouched, which
//! keeps `loading` true exactly while a request is outstanding.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::conversation::{ChatTurn, ConversationLog};
use crate::dispatch::{ChatOutput, DispatchError, Dispatcher, ImageOutput, ImagePayload};

/// Shown when an image request comes back without a payload
pub const NO_IMAGE: &str = "❌ No image returned.";
pub const CHAT_ERROR_PREFIX: &str = "❌ Error fetching chat: ";
pub const IMAGE_ERROR_PREFIX: &str = "❌ Error generating image: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Chat,
    Image,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Chat => write!(f, "chat"),
            RequestKind::Image => write!(f, "image"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Pending(RequestKind),
    Settled(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a {0} request is already in progress")]
    Busy(RequestKind),

    #[error("request #{0} is not the one in progress")]
    StaleTicket(u64),
}

/// Handle for one issued request
///
/// Carries the prompt as it was when the request was issued; that text is
/// what gets sent and what the user turn records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    kind: RequestKind,
    prompt: String,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Read-only view of the session for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSnapshot<'a> {
    pub prompt: &'a str,
    pub response_text: &'a str,
    pub image: Option<&'a ImagePayload>,
    pub loading: bool,
    pub phase: Phase,
    pub conversation: &'a ConversationLog,
}

#[derive(Debug, Default)]
pub struct SessionState {
    prompt: String,
    response_text: String,
    image: Option<ImagePayload>,
    phase: Phase,
    conversation: ConversationLog,
    in_flight: Option<u64>,
    next_seq: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn loading(&self) -> bool {
        matches!(self.phase, Phase::Pending(_))
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            prompt: &self.prompt,
            response_text: &self.response_text,
            image: self.image.as_ref(),
            loading: self.loading(),
            phase: self.phase,
            conversation: &self.conversation,
        }
    }

    /// Issue a chat request: clears the image and enters `Pending(Chat)`
    pub fn begin_chat(&mut self) -> Result<Ticket, SessionError> {
        self.begin(RequestKind::Chat)
    }

    /// Issue an image request: clears the reply text and enters `Pending(Image)`
    pub fn begin_image(&mut self) -> Result<Ticket, SessionError> {
        self.begin(RequestKind::Image)
    }

    fn begin(&mut self, kind: RequestKind) -> Result<Ticket, SessionError> {
        if let Phase::Pending(current) = self.phase {
            tracing::debug!(requested = %kind, %current, "rejecting request while busy");
            return Err(SessionError::Busy(current));
        }

        self.next_seq += 1;
        let ticket = Ticket {
            seq: self.next_seq,
            kind,
            prompt: self.prompt.clone(),
        };

        match kind {
            RequestKind::Chat => self.image = None,
            RequestKind::Image => self.response_text.clear(),
        }
        self.phase = Phase::Pending(kind);
        self.in_flight = Some(ticket.seq);

        tracing::debug!(seq = ticket.seq, %kind, "request issued");
        Ok(ticket)
    }

    fn accept(&mut self, ticket: &Ticket, kind: RequestKind) -> Result<(), SessionError> {
        if self.in_flight != Some(ticket.seq) || ticket.kind != kind {
            tracing::warn!(seq = ticket.seq, %kind, "discarding settlement for stale request");
            return Err(SessionError::StaleTicket(ticket.seq));
        }
        self.in_flight = None;
        Ok(())
    }

    pub fn settle_chat(
        &mut self,
        ticket: Ticket,
        result: Result<ChatOutput, DispatchError>,
    ) -> Result<Outcome, SessionError> {
        self.accept(&ticket, RequestKind::Chat)?;

        let outcome = match result {
            Ok(output) => {
                self.response_text = output.text.clone();
                self.conversation.append(ChatTurn::user(ticket.prompt));
                self.conversation.append(ChatTurn::assistant(output.text));
                Outcome::Success
            }
            Err(err) => {
                self.response_text = format!("{}{}", CHAT_ERROR_PREFIX, err);
                Outcome::Error
            }
        };

        self.phase = Phase::Settled(outcome);
        tracing::info!(seq = ticket.seq, ?outcome, turns = self.conversation.len(), "chat settled");
        Ok(outcome)
    }

    pub fn settle_image(
        &mut self,
        ticket: Ticket,
        result: Result<ImageOutput, DispatchError>,
    ) -> Result<Outcome, SessionError> {
        self.accept(&ticket, RequestKind::Image)?;

        let outcome = match result {
            Ok(ImageOutput::Image(payload)) => {
                self.image = Some(payload);
                Outcome::Success
            }
            Ok(ImageOutput::Empty) => {
                self.response_text = NO_IMAGE.to_string();
                Outcome::Error
            }
            Err(err) => {
                self.response_text = format!("{}{}", IMAGE_ERROR_PREFIX, err);
                Outcome::Error
            }
        };

        self.phase = Phase::Settled(outcome);
        tracing::info!(seq = ticket.seq, ?outcome, "image settled");
        Ok(outcome)
    }
}

/// Session state bundled with the dispatcher that serves it.
///
/// `chat` and `image` run a whole request in place. Front ends that keep
/// handling input while a request is out use [`SessionState`] directly and
/// spawn the dispatcher call themselves.
pub struct Session {
    state: SessionState,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Session {
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            state: SessionState::new(),
            dispatcher,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn dispatcher(&self) -> Arc<dyn Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.set_prompt(prompt);
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        self.state.snapshot()
    }

    pub async fn chat(&mut self) -> Result<Outcome, SessionError> {
        let ticket = self.state.begin_chat()?;
        let result = self.dispatcher.send_chat(ticket.prompt()).await;
        self.state.settle_chat(ticket, result)
    }

    pub async fn image(&mut self) -> Result<Outcome, SessionError> {
        let ticket = self.state.begin_image()?;
        let result = self.dispatcher.send_image(ticket.prompt()).await;
        self.state.settle_image(ticket, result)
    }
}
