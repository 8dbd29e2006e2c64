#![warn(missing_docs)]
//! imagedit - prompt-driven image editing with Gemini.
//!
//! Upload an image, describe the change, get the edited image back. The crate
//! provides the edit request handler, the editing-session state machine and
//! (with the `server` feature) a small web front end around both.
//!
//! # Quick Start
//!
//! ```no_run
//! use imagedit::{edit_image_with_prompt, EditResult, GeminiProvider, ImageFile};
//!
//! #[tokio::main]
//! async fn main() -> imagedit::Result<()> {
//!     let provider = GeminiProvider::builder().build()?;
//!     let image = ImageFile::from_bytes(&std::fs::read("cat.png")?, None)?;
//!
//!     match edit_image_with_prompt(&provider, &image.base64, &image.mime_type, "make it grayscale").await {
//!         EditResult::ImageData(edited) => std::fs::write("cat-gray.png", edited.decode()?)?,
//!         EditResult::Error(message) => eprintln!("{message}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `server`: axum web front end (`imagedit::server`)
//! - `cli`: the `imagedit` binary

pub mod config;
mod error;
pub mod handler;
pub mod image;
pub mod ui;

#[cfg(feature = "server")]
pub mod server;

// Re-export error types at crate root
pub use error::{EditorError, Result};

pub use handler::edit_image_with_prompt;
pub use image::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use image::{EditRequest, EditResult, ImageEditor, ImageFile, ImageFormat};
pub use ui::{EditorSession, Screen, SessionState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{EditorError, Result};
    pub use crate::handler::edit_image_with_prompt;
    pub use crate::image::providers::GeminiProvider;
    pub use crate::image::{EditResult, ImageEditor, ImageFile};
    pub use crate::ui::EditorSession;
}
