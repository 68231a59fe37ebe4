pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod view;
pub mod voice;

// Re-export main types for convenience
pub use config::Config;
pub use conversation::{ChatRole, ChatTurn, ConversationLog};
pub use dispatch::{
    ChatOutput, DispatchError, Dispatcher, HttpDispatcher, ImageOutput, ImagePayload, ReplySource,
};
pub use persistence::{
    Asset, DecodedImage, ImagePersistence, MediaError, MediaLibrary, PermissionStatus,
    PersistenceError, SaveOutcome,
};
pub use platform::{CommandSpeech, FsMediaLibrary};
pub use session::{
    Outcome, Phase, RequestKind, Session, SessionError, SessionSnapshot, SessionState, Ticket,
};
pub use voice::{SpeechEngine, VoicePrompt, PROMPT_CUE};
