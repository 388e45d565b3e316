//! Barcode generation pipeline
//!
//! The rasterizing collaborator owns pixel-level rendering; this module owns
//! everything in front of it: input validation and the request shape.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::{validate, BarcodeFormat, GenerationError};

/// Styling knobs forwarded to the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Width of a single module bar, in pixels
    pub module_width: f64,
    /// Bar height in pixels
    pub height: u32,
    /// Whether to print the encoded text under the bars
    pub display_value: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_width: 2.0,
            height: 100,
            display_value: true,
        }
    }
}

/// One generation request
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub text: String,
    pub format: BarcodeFormat,
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(text: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            text: text.into(),
            format,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Vector artifact produced by the renderer
#[derive(Debug, Clone)]
pub struct VectorImage {
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

/// Rendering collaborator boundary
pub trait BarcodeRenderer: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<VectorImage, GenerationError>;
}

/// Validate and render. Invalid input never reaches the collaborator.
pub fn generate(
    renderer: &dyn BarcodeRenderer,
    request: &RenderRequest,
) -> Result<VectorImage, GenerationError> {
    validate(request.format, &request.text)?;
    debug!(format = %request.format, len = request.text.len(), "Rendering barcode");
    renderer.render(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubRenderer {
        calls: AtomicUsize,
    }

    impl StubRenderer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl BarcodeRenderer for StubRenderer {
        fn render(&self, request: &RenderRequest) -> Result<VectorImage, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(VectorImage {
                svg: format!("<svg data-text=\"{}\"/>", request.text),
                width: 200,
                height: request.options.height,
            })
        }
    }

    #[test]
    fn test_valid_request_reaches_renderer() {
        let renderer = StubRenderer::new();
        let request = RenderRequest::new("5901234123457", BarcodeFormat::Ean13);
        let image = generate(&renderer, &request).unwrap();
        assert!(image.svg.contains("5901234123457"));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_input_never_reaches_renderer() {
        let renderer = StubRenderer::new();
        let request = RenderRequest::new("12345", BarcodeFormat::Ean13);
        let err = generate(&renderer, &request).unwrap_err();
        assert!(matches!(err, GenerationError::DigitCount { actual: 5, .. }));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_renderer_rejection_surfaces_once() {
        struct Rejecting;
        impl BarcodeRenderer for Rejecting {
            fn render(&self, _: &RenderRequest) -> Result<VectorImage, GenerationError> {
                Err(GenerationError::Rejected {
                    message: "unsupported density".to_string(),
                })
            }
        }

        let request = RenderRequest::new("hello", BarcodeFormat::QrCode);
        let err = generate(&Rejecting, &request).unwrap_err();
        assert_eq!(
            err,
            GenerationError::Rejected {
                message: "unsupported density".to_string()
            }
        );
    }

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert_eq!(options.height, 100);
        assert!(options.display_value);
    }
}
