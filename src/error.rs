//! Error taxonomy shared by the droplet sizing and swath uniformity pipelines.
//!
//! Every variant except [`DepositionError::Configuration`] describes a data
//! condition the caller is expected to absorb by falling back to a "no data"
//! display state.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, DepositionError>;

#[derive(Error, Debug)]
pub enum DepositionError {
    /// Missing or invalid threshold / spread-factor / processing parameters.
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    /// The card image could not be read or decoded.
    #[error("failed to decode card image: {message}")]
    ImageDecode {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    /// Horizontal trim leaves no interior samples.
    #[error("trim leaves an empty interior (length {length}, left {trim_left}, right {trim_right})")]
    EmptyInterior {
        length: usize,
        trim_left: usize,
        trim_right: usize,
    },

    /// Rebase requested on an interior spanning zero distance.
    #[error("cannot rebase a trimmed profile spanning {span}")]
    DegenerateTrim { span: f64 },

    /// Statistics or simulation requested without any usable data.
    #[error("insufficient data: {what}")]
    InsufficientData { what: String },
}

impl DepositionError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn image_decode(message: impl Into<String>, source: image::ImageError) -> Self {
        Self::ImageDecode {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn insufficient(what: impl Into<String>) -> Self {
        Self::InsufficientData { what: what.into() }
    }

    /// Whether the caller should degrade to a "no data" state instead of
    /// treating the failure as a caller bug.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DepositionError::Configuration { .. })
    }
}
