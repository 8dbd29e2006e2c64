//! The edit request handler.
//!
//! Validates input, asks an [`ImageEditor`] for one edit and folds every
//! outcome into an [`EditResult`]. Callers never see an [`EditorError`].

use crate::error::EditorError;
use crate::image::{EditRequest, EditResult, ImageEditor, ImageFile};

/// Returned when the image, MIME type or prompt is empty.
pub const MISSING_INPUT_MESSAGE: &str = "Missing image, mime type, or prompt.";

/// Returned when the model answered without an image.
pub const NO_IMAGE_DATA_MESSAGE: &str =
    "Failed to generate image. The model did not return image data.";

/// Edits `base64_image` according to `prompt`.
///
/// Empty inputs are rejected without contacting `editor`.
pub async fn edit_image_with_prompt(
    editor: &dyn ImageEditor,
    base64_image: &str,
    mime_type: &str,
    prompt: &str,
) -> EditResult {
    if base64_image.is_empty() || mime_type.is_empty() || prompt.is_empty() {
        return EditResult::error(MISSING_INPUT_MESSAGE);
    }

    let request = EditRequest::new(ImageFile::new(base64_image, mime_type), prompt);
    tracing::debug!(
        model = editor.model(),
        mime_type,
        prompt_chars = prompt.chars().count(),
        "sending edit request"
    );

    match editor.edit(&request).await {
        Ok(image) => EditResult::ImageData(image),
        Err(EditorError::NoImageData) => {
            tracing::warn!(model = editor.model(), "model returned no image data");
            EditResult::error(NO_IMAGE_DATA_MESSAGE)
        }
        Err(e) => {
            tracing::error!(model = editor.model(), error = %e, "error calling Gemini API");
            EditResult::error(format!("Failed to communicate with the Gemini API: {e}"))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::error::{EditorError, Result};
    use crate::image::{EditRequest, ImageEditor, ImageFile};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// What the mock answers with.
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Image(ImageFile),
        NoImage,
        Fault(String),
    }

    /// Editor that replays a fixed reply and records what it was asked.
    pub struct MockEditor {
        reply: MockReply,
        delay: Option<Duration>,
        calls: AtomicUsize,
        last_request: Mutex<Option<EditRequest>>,
    }

    impl MockEditor {
        pub fn new(reply: MockReply) -> Self {
            Self {
                reply,
                delay: None,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<EditRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageEditor for MockEditor {
        async fn edit(&self, request: &EditRequest) -> Result<ImageFile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                MockReply::Image(image) => Ok(image.clone()),
                MockReply::NoImage => Err(EditorError::NoImageData),
                MockReply::Fault(message) => Err(EditorError::Api {
                    status: 429,
                    message: message.clone(),
                }),
            }
        }

        fn model(&self) -> &str {
            "mock-image-model"
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{MockEditor, MockReply};
    use super::*;

    fn edited() -> ImageFile {
        ImageFile::new("R0lGODlhAQABAAAAACw=", "image/gif")
    }

    #[tokio::test]
    async fn test_missing_inputs_skip_external_call() {
        let editor = MockEditor::new(MockReply::Image(edited()));

        for (image, mime, prompt) in [
            ("", "image/png", "make it grayscale"),
            ("iVBORw0KGgo=", "", "make it grayscale"),
            ("iVBORw0KGgo=", "image/png", ""),
        ] {
            let result = edit_image_with_prompt(&editor, image, mime, prompt).await;
            assert_eq!(result, EditResult::error(MISSING_INPUT_MESSAGE));
        }

        assert_eq!(editor.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_passes_image_through_unchanged() {
        let editor = MockEditor::new(MockReply::Image(edited()));

        let result =
            edit_image_with_prompt(&editor, "iVBORw0KGgo=", "image/png", "make it grayscale")
                .await;

        assert_eq!(result, EditResult::ImageData(edited()));
        assert_eq!(editor.calls(), 1);

        let sent = editor.last_request().unwrap();
        assert_eq!(sent.image, ImageFile::new("iVBORw0KGgo=", "image/png"));
        assert_eq!(sent.prompt, "make it grayscale");
    }

    #[tokio::test]
    async fn test_no_image_data() {
        let editor = MockEditor::new(MockReply::NoImage);
        let result = edit_image_with_prompt(&editor, "AAAA", "image/png", "blur").await;
        assert_eq!(result, EditResult::error(NO_IMAGE_DATA_MESSAGE));
    }

    #[tokio::test]
    async fn test_fault_message_is_forwarded() {
        let editor = MockEditor::new(MockReply::Fault("quota exceeded".into()));
        let result = edit_image_with_prompt(&editor, "AAAA", "image/png", "blur").await;

        let message = result.error_message().unwrap();
        assert!(message.starts_with("Failed to communicate with the Gemini API"));
        assert!(message.contains("quota exceeded"));
    }
}
