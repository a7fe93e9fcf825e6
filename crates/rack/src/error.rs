// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the RACK messaging core.

use crate::message::BodyKind;
use thiserror::Error;

/// Result type for RACK operations
pub type Result<T> = core::result::Result<T, Error>;

/// Address field that failed range validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    System,
    Class,
    Instance,
    Local,
}

impl core::fmt::Display for AddressField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            AddressField::System => "system id",
            AddressField::Class => "class id",
            AddressField::Instance => "instance id",
            AddressField::Local => "local id",
        };
        f.write_str(name)
    }
}

/// Error type for the RACK messaging core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Address field does not fit in its 8-bit slot
    #[error("{field} {value} out of range (must be < 256)")]
    OutOfRange { field: AddressField, value: u32 },

    /// Fewer bytes available than a read requires
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    /// Header/body length or count mismatch, unexpected or unknown type
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Delivery failure reported by the transport
    #[error("transport fault: {0}")]
    TransportFault(String),

    /// No reply within the timeout
    #[error("no reply within timeout")]
    Timeout,

    /// Proxy bound to a payload that DATA replies never carry
    #[error("{0:?} is not a data payload")]
    NotDataPayload(BodyKind),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedMessage(reason.into())
    }

    /// True for errors raised while decoding wire input.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::TruncatedInput { .. } | Error::MalformedMessage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::OutOfRange {
            field: AddressField::Class,
            value: 256,
        };
        assert_eq!(err.to_string(), "class id 256 out of range (must be < 256)");

        let err = Error::TruncatedInput {
            needed: 4,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "truncated input: needed 4 bytes, 2 available"
        );
        assert_eq!(Error::Timeout.to_string(), "no reply within timeout");
        assert_eq!(
            Error::NotDataPayload(BodyKind::GetData).to_string(),
            "GetData is not a data payload"
        );
    }

    #[test]
    fn test_decode_error_classification() {
        assert!(Error::malformed("count mismatch").is_decode_error());
        assert!(Error::TruncatedInput {
            needed: 1,
            available: 0
        }
        .is_decode_error());
        assert!(!Error::Timeout.is_decode_error());
        assert!(!Error::TransportFault("mailbox closed".into()).is_decode_error());
    }
}
