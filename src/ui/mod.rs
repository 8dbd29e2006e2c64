//! Editing session state and its screen projection.

mod controller;
mod view;

pub use controller::{
    EditorSession, GenerationTicket, PendingEdit, SessionError, SessionState, NOT_READY_MESSAGE,
};
pub use view::{EditorView, ResultPane, Screen};
