//! Session state machine behind the editing screen.

use crate::image::{EditResult, ImageFile};

/// Shown when generation is requested before an image and prompt exist.
pub const NOT_READY_MESSAGE: &str = "Please upload an image and enter a prompt.";

/// Identifies one generation request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationTicket(u64);

/// Where a session is in the upload → edit → display flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No image uploaded.
    Idle,
    /// Image present, nothing generated yet.
    Ready {
        /// The uploaded image.
        image: ImageFile,
    },
    /// A request is in flight.
    Loading {
        /// The uploaded image.
        image: ImageFile,
        /// The request whose result will be accepted.
        ticket: GenerationTicket,
    },
    /// The last request produced an image.
    Success {
        /// The uploaded image.
        image: ImageFile,
        /// What the model returned.
        edited: ImageFile,
    },
    /// The last request failed.
    Error {
        /// The uploaded image.
        image: ImageFile,
        /// Shown in place of the result.
        message: String,
    },
}

impl SessionState {
    /// Returns the uploaded image in any state that has one.
    pub fn image(&self) -> Option<&ImageFile> {
        match self {
            Self::Idle => None,
            Self::Ready { image }
            | Self::Loading { image, .. }
            | Self::Success { image, .. }
            | Self::Error { image, .. } => Some(image),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready { .. } => "ready",
            Self::Loading { .. } => "loading",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }
}

/// Why a session refused an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A request is in flight; inputs are locked.
    #[error("a generation is already in progress")]
    Busy,
    /// Generation needs both an image and a prompt.
    #[error("{}", NOT_READY_MESSAGE)]
    NotReady,
}

/// Everything a generation needs, captured when it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// Hand back to [`EditorSession::complete`] with the result.
    pub ticket: GenerationTicket,
    /// The image to edit.
    pub image: ImageFile,
    /// The edit instruction.
    pub prompt: String,
}

/// One user's editing session.
#[derive(Debug, Clone)]
pub struct EditorSession {
    state: SessionState,
    prompt: String,
    next_ticket: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    /// Creates an idle session with an empty prompt.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            prompt: String::new(),
            next_ticket: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// True while a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading { .. })
    }

    /// Replaces the image and drops any previous result or error.
    pub fn upload(&mut self, image: ImageFile) -> Result<(), SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        self.state = SessionState::Ready { image };
        Ok(())
    }

    /// Replaces the prompt. Refused while loading.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<(), SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        self.prompt = prompt.into();
        Ok(())
    }

    /// True when an image is present, the prompt is non-empty and nothing is
    /// in flight.
    pub fn can_generate(&self) -> bool {
        !self.is_loading() && self.state.image().is_some() && !self.prompt.is_empty()
    }

    /// Moves to `Loading` and hands out what the request needs.
    pub fn begin_generation(&mut self) -> Result<PendingEdit, SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        let image = match self.state.image() {
            Some(image) if !self.prompt.is_empty() => image.clone(),
            _ => return Err(SessionError::NotReady),
        };

        let ticket = GenerationTicket(self.next_ticket);
        self.next_ticket += 1;
        self.state = SessionState::Loading {
            image: image.clone(),
            ticket,
        };

        Ok(PendingEdit {
            ticket,
            image,
            prompt: self.prompt.clone(),
        })
    }

    /// Applies a finished request. Returns false and leaves the state alone
    /// when `ticket` is not the request currently loading.
    pub fn complete(&mut self, ticket: GenerationTicket, result: EditResult) -> bool {
        let image = match &self.state {
            SessionState::Loading { image, ticket: current } if *current == ticket => {
                image.clone()
            }
            other => {
                tracing::warn!(
                    ticket = ticket.0,
                    state = other.name(),
                    "discarding result of superseded generation"
                );
                return false;
            }
        };

        self.state = match result {
            EditResult::ImageData(edited) => SessionState::Success { image, edited },
            EditResult::Error(message) => SessionState::Error { image, message },
        };
        true
    }

    /// Starts over from any state. An in-flight request's result will be
    /// discarded when it arrives.
    pub fn clear(&mut self) {
        self.state = SessionState::Idle;
        self.prompt.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn original() -> ImageFile {
        ImageFile::new("iVBORw0KGgo=", "image/png")
    }

    fn edited() -> ImageFile {
        ImageFile::new("/9j/4AAQ", "image/jpeg")
    }

    fn ready(prompt: &str) -> EditorSession {
        let mut session = EditorSession::new();
        session.upload(original()).unwrap();
        session.set_prompt(prompt).unwrap();
        session
    }

    #[test]
    fn test_upload_moves_to_ready() {
        let mut session = EditorSession::new();
        assert_eq!(session.state(), &SessionState::Idle);

        session.upload(original()).unwrap();
        assert_eq!(
            session.state(),
            &SessionState::Ready { image: original() }
        );
    }

    #[test]
    fn test_generate_requires_prompt_and_image() {
        let mut session = EditorSession::new();
        session.set_prompt("make it grayscale").unwrap();
        assert!(!session.can_generate());
        assert_eq!(session.begin_generation(), Err(SessionError::NotReady));

        let mut session = ready("");
        assert!(!session.can_generate());
        assert_eq!(session.begin_generation(), Err(SessionError::NotReady));
        assert_eq!(session.state().name(), "ready");

        session.set_prompt("make it grayscale").unwrap();
        assert!(session.can_generate());
    }

    #[test]
    fn test_success_flow() {
        let mut session = ready("make it grayscale");
        let pending = session.begin_generation().unwrap();
        assert_eq!(pending.image, original());
        assert_eq!(pending.prompt, "make it grayscale");
        assert!(session.is_loading());
        assert!(!session.can_generate());

        assert!(session.complete(pending.ticket, EditResult::ImageData(edited())));
        assert_eq!(
            session.state(),
            &SessionState::Success {
                image: original(),
                edited: edited()
            }
        );
    }

    #[test]
    fn test_inputs_locked_while_loading() {
        let mut session = ready("blur");
        session.begin_generation().unwrap();

        assert_eq!(session.upload(edited()), Err(SessionError::Busy));
        assert_eq!(session.set_prompt("sharpen"), Err(SessionError::Busy));
        assert_eq!(session.begin_generation(), Err(SessionError::Busy));
        assert_eq!(session.prompt(), "blur");
    }

    #[test]
    fn test_error_keeps_image_and_prompt_for_retry() {
        let mut session = ready("blur");
        let first = session.begin_generation().unwrap();
        session.complete(first.ticket, EditResult::error("quota exceeded"));

        assert_eq!(
            session.state(),
            &SessionState::Error {
                image: original(),
                message: "quota exceeded".into()
            }
        );
        assert_eq!(session.prompt(), "blur");
        assert!(session.can_generate());

        let retry = session.begin_generation().unwrap();
        assert_ne!(retry.ticket, first.ticket);
        assert_eq!(retry.image, original());
    }

    #[test]
    fn test_upload_after_result_clears_it() {
        let mut session = ready("blur");
        let pending = session.begin_generation().unwrap();
        session.complete(pending.ticket, EditResult::ImageData(edited()));

        session.upload(edited()).unwrap();
        assert_eq!(session.state(), &SessionState::Ready { image: edited() });
        assert_eq!(session.prompt(), "blur");
    }

    #[test]
    fn test_clear_discards_in_flight_result() {
        let mut session = ready("blur");
        let pending = session.begin_generation().unwrap();

        session.clear();
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.prompt(), "");

        assert!(!session.complete(pending.ticket, EditResult::ImageData(edited())));
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_stale_ticket_does_not_overwrite_newer_request() {
        let mut session = ready("blur");
        let stale = session.begin_generation().unwrap();
        session.clear();

        session.upload(original()).unwrap();
        session.set_prompt("sharpen").unwrap();
        let current = session.begin_generation().unwrap();

        assert!(!session.complete(stale.ticket, EditResult::error("late")));
        assert!(session.is_loading());
        assert!(session.complete(current.ticket, EditResult::ImageData(edited())));
    }
}
