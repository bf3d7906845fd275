//! UI layer for the desktop GUI: app shell, landing and chat views, widgets, and theme.

pub mod app;
pub mod chat;
pub mod landing;
pub mod theme;
pub mod widgets;

pub use app::{ResumeChatApp, StartupConfig};
