//! ScanBridge Barcode Core
//!
//! The toolkit half that backs the generate/scan UI: format validation in
//! front of the rendering collaborator, and the scan session that filters
//! decoder noise and keeps the recent-decode history. Shares no runtime
//! state with the request dispatcher.

mod format;
mod generate;
mod scan;

pub use format::{check_digit, validate, BarcodeFormat, GenerationError};
pub use generate::{generate, BarcodeRenderer, RenderOptions, RenderRequest, VectorImage};
pub use scan::{
    DecodeEvent, FrameDecoder, ScanError, ScanRecord, ScanSession, HISTORY_LIMIT,
};
