#[cfg(feature = "cli")]
pub mod commands;
pub mod session;

pub use session::EditorSession;
