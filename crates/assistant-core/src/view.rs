//! Pure projections from a session snapshot to what a screen shows
//!
//! Nothing here holds state; every function is derived from the
//! [`SessionSnapshot`] it is given, so any UI can re-render at will.

use crate::conversation::{ChatRole, ChatTurn, ConversationLog};
use crate::dispatch::ImagePayload;
use crate::session::{Phase, RequestKind, SessionSnapshot};

/// One rendered transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptLine<'a> {
    pub speaker: &'static str,
    pub role: ChatRole,
    pub content: &'a str,
}

pub fn speaker_label(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "You",
        ChatRole::Assistant => "AI",
    }
}

fn line(turn: &ChatTurn) -> TranscriptLine<'_> {
    TranscriptLine {
        speaker: speaker_label(turn.role()),
        role: turn.role(),
        content: turn.content(),
    }
}

pub fn transcript(log: &ConversationLog) -> impl Iterator<Item = TranscriptLine<'_>> + Clone {
    log.render().map(line)
}

/// Reply or error text, when there is any to show
pub fn response_panel<'a>(snapshot: &SessionSnapshot<'a>) -> Option<&'a str> {
    Some(snapshot.response_text).filter(|text| !text.is_empty())
}

pub fn image_preview<'a>(snapshot: &SessionSnapshot<'a>) -> Option<&'a ImagePayload> {
    snapshot.image
}

pub fn can_save(snapshot: &SessionSnapshot<'_>) -> bool {
    snapshot.image.is_some()
}

/// Request controls are disabled while a request is outstanding
pub fn controls_enabled(snapshot: &SessionSnapshot<'_>) -> bool {
    !snapshot.loading
}

pub fn status_line(snapshot: &SessionSnapshot<'_>) -> &'static str {
    match snapshot.phase {
        Phase::Pending(RequestKind::Chat) => "Waiting for reply...",
        Phase::Pending(RequestKind::Image) => "Generating image...",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{ChatOutput, ImageOutput, ReplySource};
    use crate::session::SessionState;

    fn chatted(prompt: &str, reply: &str) -> SessionState {
        let mut state = SessionState::new();
        state.set_prompt(prompt);
        let ticket = state.begin_chat().unwrap();
        state
            .settle_chat(
                ticket,
                Ok(ChatOutput {
                    text: reply.to_string(),
                    source: ReplySource::Output,
                }),
            )
            .unwrap();
        state
    }

    #[test]
    fn test_transcript_labels_speakers() {
        let state = chatted("hi", "hello!");
        let lines: Vec<TranscriptLine> = transcript(state.conversation()).collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].speaker, "You");
        assert_eq!(lines[0].content, "hi");
        assert_eq!(lines[1].speaker, "AI");
        assert_eq!(lines[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_transcript_is_repeatable() {
        let state = chatted("a", "b");
        let lines = transcript(state.conversation());
        let again = lines.clone();
        assert!(lines.eq(again));
    }

    #[test]
    fn test_response_panel_hidden_when_empty() {
        let state = SessionState::new();
        assert_eq!(response_panel(&state.snapshot()), None);

        let state = chatted("q", "answer");
        assert_eq!(response_panel(&state.snapshot()), Some("answer"));
    }

    #[test]
    fn test_controls_and_status_follow_loading() {
        let mut state = SessionState::new();
        assert!(controls_enabled(&state.snapshot()));
        assert_eq!(status_line(&state.snapshot()), "");

        let ticket = state.begin_image().unwrap();
        assert!(!controls_enabled(&state.snapshot()));
        assert_eq!(status_line(&state.snapshot()), "Generating image...");

        state
            .settle_image(ticket, Ok(ImageOutput::Image(ImagePayload::new("abc"))))
            .unwrap();
        let snapshot = state.snapshot();
        assert!(controls_enabled(&snapshot));
        assert!(can_save(&snapshot));
        assert_eq!(image_preview(&snapshot).map(|p| p.as_str()), Some("abc"));
    }
}
