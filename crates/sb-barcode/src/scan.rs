//! Scan session
//!
//! Consumes decode events from the camera collaborator. Per-frame
//! "nothing recognized" noise is dropped here and never surfaces; only hard
//! failures (permission denial, camera loss) reach the caller. Successful
//! decodes land in a bounded most-recent-first history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::format::BarcodeFormat;

/// Decoded results retained per session
pub const HISTORY_LIMIT: usize = 5;

/// Hard scanning failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {message}")]
    CameraUnavailable { message: String },

    #[error("decoder error: {message}")]
    Collaborator { message: String },
}

/// One event from the decoding collaborator
#[derive(Debug, Clone)]
pub enum DecodeEvent {
    /// A barcode was recognized in the current frame
    Decoded {
        text: String,
        format: Option<BarcodeFormat>,
    },
    /// Nothing recognizable in this frame; emitted on nearly every frame
    NotFound,
    /// Hard failure; the camera pipeline is dead
    Failed(ScanError),
}

/// Decoding collaborator boundary: a live camera pipeline yielding events
/// until the stream ends.
#[async_trait]
pub trait FrameDecoder: Send {
    async fn next_event(&mut self) -> Option<DecodeEvent>;
}

/// One retained decode
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScanRecord {
    pub text: String,
    pub format: Option<BarcodeFormat>,
    pub decoded_at: DateTime<Utc>,
}

/// In-memory scan session. History only; nothing persists beyond the session.
#[derive(Debug)]
pub struct ScanSession {
    id: Uuid,
    history: VecDeque<ScanRecord>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Retained decodes, most recent first
    pub fn history(&self) -> impl Iterator<Item = &ScanRecord> {
        self.history.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Apply one decoder event. Noise frames return `Ok(None)` and leave the
    /// session untouched; decodes return the new record; hard failures are
    /// propagated once.
    pub fn apply(&mut self, event: DecodeEvent) -> Result<Option<&ScanRecord>, ScanError> {
        match event {
            DecodeEvent::NotFound => Ok(None),
            DecodeEvent::Decoded { text, format } => {
                debug!(session = %self.id, text = %text, "Decoded barcode");
                self.history.push_front(ScanRecord {
                    text,
                    format,
                    decoded_at: Utc::now(),
                });
                self.history.truncate(HISTORY_LIMIT);
                Ok(self.history.front())
            }
            DecodeEvent::Failed(error) => Err(error),
        }
    }

    /// Drain a decoder until its stream ends or hard-fails
    pub async fn run<D: FrameDecoder>(&mut self, decoder: &mut D) -> Result<(), ScanError> {
        while let Some(event) = decoder.next_event().await {
            self.apply(event)?;
        }
        Ok(())
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(text: &str) -> DecodeEvent {
        DecodeEvent::Decoded {
            text: text.to_string(),
            format: Some(BarcodeFormat::QrCode),
        }
    }

    #[test]
    fn test_history_keeps_five_most_recent_first() {
        let mut session = ScanSession::new();
        for i in 1..=6 {
            session.apply(decoded(&format!("code-{i}"))).unwrap();
        }

        let texts: Vec<&str> = session.history().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["code-6", "code-5", "code-4", "code-3", "code-2"]);
    }

    #[test]
    fn test_noise_is_filtered() {
        let mut session = ScanSession::new();
        assert_eq!(session.apply(DecodeEvent::NotFound).unwrap(), None);
        assert!(session.is_empty());

        session.apply(decoded("code-1")).unwrap();
        session.apply(DecodeEvent::NotFound).unwrap();
        assert_eq!(session.history().count(), 1);
    }

    #[test]
    fn test_hard_failure_surfaces() {
        let mut session = ScanSession::new();
        let err = session
            .apply(DecodeEvent::Failed(ScanError::PermissionDenied))
            .unwrap_err();
        assert_eq!(err, ScanError::PermissionDenied);
    }

    #[test]
    fn test_decode_returns_new_record() {
        let mut session = ScanSession::new();
        let record = session.apply(decoded("code-1")).unwrap().unwrap();
        assert_eq!(record.text, "code-1");
        assert_eq!(record.format, Some(BarcodeFormat::QrCode));
    }

    struct ScriptedDecoder {
        events: VecDeque<DecodeEvent>,
    }

    #[async_trait]
    impl FrameDecoder for ScriptedDecoder {
        async fn next_event(&mut self) -> Option<DecodeEvent> {
            self.events.pop_front()
        }
    }

    #[tokio::test]
    async fn test_run_drains_until_failure() {
        let mut decoder = ScriptedDecoder {
            events: VecDeque::from(vec![
                DecodeEvent::NotFound,
                decoded("code-1"),
                DecodeEvent::NotFound,
                decoded("code-2"),
                DecodeEvent::Failed(ScanError::CameraUnavailable {
                    message: "device detached".to_string(),
                }),
                decoded("never-seen"),
            ]),
        };

        let mut session = ScanSession::new();
        let err = session.run(&mut decoder).await.unwrap_err();
        assert!(matches!(err, ScanError::CameraUnavailable { .. }));

        let texts: Vec<&str> = session.history().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["code-2", "code-1"]);
    }

    #[tokio::test]
    async fn test_run_completes_when_stream_ends() {
        let mut decoder = ScriptedDecoder {
            events: VecDeque::from(vec![decoded("code-1"), DecodeEvent::NotFound]),
        };

        let mut session = ScanSession::new();
        session.run(&mut decoder).await.unwrap();
        assert_eq!(session.history().count(), 1);
    }
}
