//! Desktop implementations of the platform collaborators
//!
//! On a phone these would be the OS media library and speech engine. Here
//! the "gallery" is a directory tree and speech is an external TTS program.

pub mod fs_media;
pub mod speech;

pub use fs_media::FsMediaLibrary;
pub use speech::CommandSpeech;
