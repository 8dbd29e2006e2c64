//! What the page shows for a given session.

use super::controller::{EditorSession, SessionState};

/// Right-hand pane of the editor screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPane {
    /// A request is in flight.
    Spinner,
    /// The last request failed.
    Error(String),
    /// The edited image, as a data URL.
    Image(String),
    /// Nothing generated yet.
    Placeholder,
}

/// Controls and images of the editor screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    /// The uploaded image as a data URL.
    pub original_url: String,
    /// Prompt text to prefill.
    pub prompt: String,
    /// Whether the prompt can be edited.
    pub prompt_enabled: bool,
    /// Whether the generate button is active.
    pub generate_enabled: bool,
    /// Generate button caption.
    pub generate_label: &'static str,
    /// Whether "Start Over" is active.
    pub start_over_enabled: bool,
    /// Right-hand pane.
    pub result: ResultPane,
}

/// The screen to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// No image yet: show the upload control.
    Upload,
    /// Original, prompt controls and result side by side.
    Editor(EditorView),
}

impl Screen {
    /// True while the page should poll for a result.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::Editor(EditorView {
                result: ResultPane::Spinner,
                ..
            })
        )
    }
}

impl EditorSession {
    /// Projects the session onto a screen.
    pub fn view(&self) -> Screen {
        let Some(image) = self.state().image() else {
            return Screen::Upload;
        };

        let loading = self.is_loading();
        let result = match self.state() {
            SessionState::Loading { .. } => ResultPane::Spinner,
            SessionState::Error { message, .. } => ResultPane::Error(message.clone()),
            SessionState::Success { edited, .. } => ResultPane::Image(edited.to_data_url()),
            SessionState::Idle | SessionState::Ready { .. } => ResultPane::Placeholder,
        };

        Screen::Editor(EditorView {
            original_url: image.to_data_url(),
            prompt: self.prompt().to_string(),
            prompt_enabled: !loading,
            generate_enabled: self.can_generate(),
            generate_label: if loading { "Generating..." } else { "Generate" },
            start_over_enabled: !loading,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{EditResult, ImageFile};

    fn editor_view(session: &EditorSession) -> EditorView {
        match session.view() {
            Screen::Editor(view) => view,
            Screen::Upload => panic!("expected editor screen"),
        }
    }

    #[test]
    fn test_grayscale_scenario() {
        let original = ImageFile::new("iVBORw0KGgo=", "image/png");
        let edited = ImageFile::new("UklGRgAAAABXRUJQ", "image/webp");
        let mut session = EditorSession::new();
        assert_eq!(session.view(), Screen::Upload);

        session.upload(original.clone()).unwrap();
        session.set_prompt("make it grayscale").unwrap();
        let view = editor_view(&session);
        assert_eq!(view.original_url, "data:image/png;base64,iVBORw0KGgo=");
        assert!(view.generate_enabled);
        assert_eq!(view.result, ResultPane::Placeholder);

        let pending = session.begin_generation().unwrap();
        let view = editor_view(&session);
        assert_eq!(view.result, ResultPane::Spinner);
        assert_eq!(view.generate_label, "Generating...");
        assert!(!view.generate_enabled);
        assert!(!view.prompt_enabled);
        assert!(!view.start_over_enabled);
        assert!(session.view().is_loading());

        session.complete(pending.ticket, EditResult::ImageData(edited));
        let view = editor_view(&session);
        assert_eq!(
            view.result,
            ResultPane::Image("data:image/webp;base64,UklGRgAAAABXRUJQ".into())
        );
        assert_eq!(view.generate_label, "Generate");

        session.clear();
        assert_eq!(session.view(), Screen::Upload);
        assert_eq!(session.prompt(), "");
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_generate_disabled_for_empty_prompt() {
        let mut session = EditorSession::new();
        session.upload(ImageFile::new("AAAA", "image/png")).unwrap();
        assert!(!editor_view(&session).generate_enabled);

        session.set_prompt("x").unwrap();
        assert!(editor_view(&session).generate_enabled);

        session.set_prompt("").unwrap();
        assert!(!editor_view(&session).generate_enabled);
    }

    #[test]
    fn test_error_pane() {
        let mut session = EditorSession::new();
        session.upload(ImageFile::new("AAAA", "image/png")).unwrap();
        session.set_prompt("blur").unwrap();
        let pending = session.begin_generation().unwrap();
        session.complete(pending.ticket, EditResult::error("quota exceeded"));

        let view = editor_view(&session);
        assert_eq!(view.result, ResultPane::Error("quota exceeded".into()));
        assert!(view.generate_enabled);
        assert!(view.start_over_enabled);
    }
}
