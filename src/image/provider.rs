//! Image editor trait.

use crate::error::Result;
use crate::image::types::{EditRequest, ImageFile};
use async_trait::async_trait;

/// Trait for services that edit an image according to a prompt.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Sends one edit request and returns the first image the model produced.
    ///
    /// Returns [`EditorError::NoImageData`](crate::EditorError::NoImageData)
    /// when the response carries no inline image.
    async fn edit(&self, request: &EditRequest) -> Result<ImageFile>;

    /// Returns the model identifier used for requests.
    fn model(&self) -> &str;

    /// Returns the name of this editor for display.
    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
