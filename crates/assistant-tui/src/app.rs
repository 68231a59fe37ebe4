use std::sync::Arc;

use assistant_core::persistence::{SAVED_MESSAGE, PERMISSION_DENIED_MESSAGE};
use assistant_core::{
    view, CommandSpeech, Config, Dispatcher, FsMediaLibrary, HttpDispatcher, ImagePersistence,
    PersistenceError, SaveOutcome, SessionState, VoicePrompt,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Short-lived message shown in the footer (the mobile app used alerts)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub body: String,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: SessionState,

    // Prompt editing
    pub prompt_cursor: usize, // cursor position in the prompt, in chars

    // Transcript view
    pub transcript_scroll: u16,
    pub follow_transcript: bool,

    // Alerts and background save
    pub notice: Option<Notice>,
    pub saving: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Collaborators
    pub dispatcher: Arc<dyn Dispatcher>,
    pub persistence: Arc<ImagePersistence<FsMediaLibrary>>,
    pub voice: VoicePrompt<CommandSpeech>,
    pub events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, events: UnboundedSender<AppEvent>) -> Self {
        let base_url = config.resolved_base_url();
        tracing::info!(%base_url, "using assistant backend");

        let dispatcher: Arc<dyn Dispatcher> = Arc::new(HttpDispatcher::new(&base_url));
        let media = FsMediaLibrary::new(config.resolved_media_dir());
        let speech = config
            .speech_command
            .as_deref()
            .map(CommandSpeech::new)
            .unwrap_or_else(CommandSpeech::system_default);

        Self::with_collaborators(
            dispatcher,
            ImagePersistence::new(media, config.collection.clone()),
            VoicePrompt::new(speech),
            events,
        )
    }

    pub fn with_collaborators(
        dispatcher: Arc<dyn Dispatcher>,
        persistence: ImagePersistence<FsMediaLibrary>,
        voice: VoicePrompt<CommandSpeech>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session: SessionState::new(),

            prompt_cursor: 0,

            transcript_scroll: 0,
            follow_transcript: true,

            notice: None,
            saving: false,

            animation_frame: 0,

            dispatcher,
            persistence: Arc::new(persistence),
            voice,
            events,
        }
    }

    fn notify(&mut self, title: &'static str, body: impl Into<String>) {
        self.notice = Some(Notice {
            title,
            body: body.into(),
        });
    }

    /// Issue a chat request and run it in the background
    pub fn issue_chat(&mut self) {
        let ticket = match self.session.begin_chat() {
            Ok(ticket) => ticket,
            Err(e) => return self.notify("Busy", e.to_string()),
        };
        self.notice = None;
        self.follow_transcript = true;

        let dispatcher = Arc::clone(&self.dispatcher);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = dispatcher.send_chat(ticket.prompt()).await;
            let _ = events.send(AppEvent::Chat(ticket, result));
        });
    }

    /// Issue an image request and run it in the background
    pub fn issue_image(&mut self) {
        let ticket = match self.session.begin_image() {
            Ok(ticket) => ticket,
            Err(e) => return self.notify("Busy", e.to_string()),
        };
        self.notice = None;

        let dispatcher = Arc::clone(&self.dispatcher);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = dispatcher.send_image(ticket.prompt()).await;
            let _ = events.send(AppEvent::Image(ticket, result));
        });
    }

    pub fn speak_cue(&mut self) {
        if !view::controls_enabled(&self.session.snapshot()) {
            return self.notify("Busy", "Wait for the current request to finish");
        }
        self.voice.speak();
    }

    pub fn save_image(&mut self) {
        if self.saving {
            return;
        }
        let Some(payload) = self.session.image().cloned() else {
            return self.notify("Nothing to save", "Generate an image first");
        };

        self.saving = true;
        let persistence = Arc::clone(&self.persistence);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = persistence.save(Some(&payload)).await;
            let _ = events.send(AppEvent::Saved(result));
        });
    }

    pub fn on_saved(&mut self, result: Result<SaveOutcome, PersistenceError>) {
        self.saving = false;
        match result {
            Ok(SaveOutcome::Saved { .. }) => self.notify("✅ Saved", SAVED_MESSAGE),
            Ok(SaveOutcome::Skipped) => {}
            Err(PersistenceError::PermissionDenied) => {
                self.notify("Permission denied", PERMISSION_DENIED_MESSAGE)
            }
            Err(e) => self.notify("Save failed", e.to_string()),
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_transcript_up(&mut self) {
        self.follow_transcript = false;
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    pub fn scroll_transcript_down(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(1);
    }
}
