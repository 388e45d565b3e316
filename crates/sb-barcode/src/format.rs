//! Barcode symbologies and input validation
//!
//! Validation runs before any rendering collaborator is consulted, so a bad
//! text/format combination never leaves the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported symbologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarcodeFormat {
    QrCode,
    Code128,
    Ean13,
    Ean8,
    UpcA,
}

impl BarcodeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "qrcode",
            BarcodeFormat::Code128 => "code128",
            BarcodeFormat::Ean13 => "ean13",
            BarcodeFormat::Ean8 => "ean8",
            BarcodeFormat::UpcA => "upca",
        }
    }

    /// Payload digit count for numeric-only formats; the wire text may also
    /// carry one extra check digit.
    fn payload_digits(&self) -> Option<usize> {
        match self {
            BarcodeFormat::Ean13 => Some(12),
            BarcodeFormat::Ean8 => Some(7),
            BarcodeFormat::UpcA => Some(11),
            BarcodeFormat::QrCode | BarcodeFormat::Code128 => None,
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarcodeFormat {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qrcode" | "qr" => Ok(BarcodeFormat::QrCode),
            "code128" => Ok(BarcodeFormat::Code128),
            "ean13" => Ok(BarcodeFormat::Ean13),
            "ean8" => Ok(BarcodeFormat::Ean8),
            "upca" | "upc" => Ok(BarcodeFormat::UpcA),
            other => Err(GenerationError::UnknownFormat {
                name: other.to_string(),
            }),
        }
    }
}

/// Rendering rejection. Surfaced once to the caller, never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("empty input")]
    Empty,

    #[error("unknown barcode format: {name}")]
    UnknownFormat { name: String },

    #[error("{format} requires {min} or {max} digits, got {actual}")]
    DigitCount {
        format: BarcodeFormat,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("{format} accepts digits only")]
    NonNumeric { format: BarcodeFormat },

    #[error("{format} accepts printable ASCII only")]
    NonAscii { format: BarcodeFormat },

    #[error("{format} check digit mismatch: expected {expected}, got {actual}")]
    Checksum {
        format: BarcodeFormat,
        expected: u8,
        actual: u8,
    },

    #[error("renderer rejected input: {message}")]
    Rejected { message: String },
}

/// Validate `text` against the format's input rules
pub fn validate(format: BarcodeFormat, text: &str) -> Result<(), GenerationError> {
    if text.is_empty() {
        return Err(GenerationError::Empty);
    }

    match format {
        BarcodeFormat::QrCode => Ok(()),
        BarcodeFormat::Code128 => {
            if text.bytes().all(|b| (b' '..=b'~').contains(&b)) {
                Ok(())
            } else {
                Err(GenerationError::NonAscii { format })
            }
        }
        BarcodeFormat::Ean13 | BarcodeFormat::Ean8 | BarcodeFormat::UpcA => {
            // payload_digits is Some for every numeric format
            let payload = format.payload_digits().unwrap_or_default();
            validate_numeric(format, text, payload)
        }
    }
}

fn validate_numeric(
    format: BarcodeFormat,
    text: &str,
    payload: usize,
) -> Result<(), GenerationError> {
    let mut digits = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c.to_digit(10) {
            Some(d) => digits.push(d as u8),
            None => return Err(GenerationError::NonNumeric { format }),
        }
    }

    if digits.len() == payload {
        return Ok(());
    }
    if digits.len() == payload + 1 {
        let expected = check_digit(&digits[..payload]);
        let actual = digits[payload];
        if expected == actual {
            return Ok(());
        }
        return Err(GenerationError::Checksum {
            format,
            expected,
            actual,
        });
    }
    Err(GenerationError::DigitCount {
        format,
        min: payload,
        max: payload + 1,
        actual: digits.len(),
    })
}

/// Standard mod-10 check digit: weights 3 and 1 alternate starting from the
/// rightmost payload digit.
pub fn check_digit(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ean13_accepts_12_or_13_digits() {
        assert!(validate(BarcodeFormat::Ean13, "590123412345").is_ok());
        assert!(validate(BarcodeFormat::Ean13, "5901234123457").is_ok());
    }

    #[test]
    fn test_ean13_wrong_digit_count() {
        let err = validate(BarcodeFormat::Ean13, "12345").unwrap_err();
        assert_eq!(
            err,
            GenerationError::DigitCount {
                format: BarcodeFormat::Ean13,
                min: 12,
                max: 13,
                actual: 5,
            }
        );
    }

    #[test]
    fn test_ean13_check_digit_mismatch() {
        let err = validate(BarcodeFormat::Ean13, "5901234123450").unwrap_err();
        assert_eq!(
            err,
            GenerationError::Checksum {
                format: BarcodeFormat::Ean13,
                expected: 7,
                actual: 0,
            }
        );
    }

    #[test]
    fn test_ean13_rejects_letters() {
        let err = validate(BarcodeFormat::Ean13, "59012341234a").unwrap_err();
        assert_eq!(err, GenerationError::NonNumeric { format: BarcodeFormat::Ean13 });
    }

    #[test]
    fn test_ean8_and_upca_counts() {
        assert!(validate(BarcodeFormat::Ean8, "9638507").is_ok());
        assert!(validate(BarcodeFormat::UpcA, "03600029145").is_ok());
        assert!(matches!(
            validate(BarcodeFormat::Ean8, "12345"),
            Err(GenerationError::DigitCount { .. })
        ));
    }

    #[test]
    fn test_code128_printable_ascii_only() {
        assert!(validate(BarcodeFormat::Code128, "ABC-123 x").is_ok());
        assert_eq!(
            validate(BarcodeFormat::Code128, "caf\u{e9}").unwrap_err(),
            GenerationError::NonAscii { format: BarcodeFormat::Code128 }
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(validate(BarcodeFormat::QrCode, "").unwrap_err(), GenerationError::Empty);
    }

    #[test]
    fn test_check_digit_known_values() {
        // EAN 5901234123457, UPC-A 036000291452
        let ean: Vec<u8> = vec![5, 9, 0, 1, 2, 3, 4, 1, 2, 3, 4, 5];
        assert_eq!(check_digit(&ean), 7);
        let upc: Vec<u8> = vec![0, 3, 6, 0, 0, 0, 2, 9, 1, 4, 5];
        assert_eq!(check_digit(&upc), 2);
    }

    #[test]
    fn test_format_round_trip() {
        for format in [
            BarcodeFormat::QrCode,
            BarcodeFormat::Code128,
            BarcodeFormat::Ean13,
            BarcodeFormat::Ean8,
            BarcodeFormat::UpcA,
        ] {
            assert_eq!(format.as_str().parse::<BarcodeFormat>().unwrap(), format);
        }
        assert!(matches!(
            "datamatrix".parse::<BarcodeFormat>(),
            Err(GenerationError::UnknownFormat { .. })
        ));
    }
}
