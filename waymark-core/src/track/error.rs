use thiserror::Error;

/// Errors from [`parse_track`](crate::parse_track).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackParseError {
    /// The document is not well-formed XML.
    #[error("malformed track document: {message}")]
    Malformed {
        /// Description of the XML failure.
        message: String,
    },
    /// The document holds no track segment with at least one point.
    #[error("track document contains no track segments")]
    NoTrackSegments,
    /// A track point lacked a required coordinate attribute.
    #[error("track point is missing the `{attribute}` attribute")]
    MissingAttribute {
        /// Name of the missing attribute.
        attribute: &'static str,
    },
    /// A coordinate attribute could not be parsed or is out of range.
    #[error("invalid value {value:?} for track point attribute `{attribute}`")]
    InvalidAttribute {
        /// Name of the attribute.
        attribute: &'static str,
        /// Raw value found in the document.
        value: String,
    },
}

impl TrackParseError {
    pub(crate) fn malformed(err: &impl std::fmt::Display) -> Self {
        Self::Malformed {
            message: err.to_string(),
        }
    }

    pub(crate) fn unexpected_eof(element: &str) -> Self {
        Self::Malformed {
            message: format!("unexpected end of document inside <{element}>"),
        }
    }
}

/// Errors from [`track_to_gpx`](crate::track_to_gpx) and
/// [`line_to_gpx`](crate::line_to_gpx).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpxWriteError {
    /// The XML writer rejected an event.
    #[error("failed to write GPX document: {message}")]
    Xml {
        /// Writer failure description.
        message: String,
    },
    /// A line with fewer than one coordinate cannot be exported.
    #[error("cannot export an empty line as GPX")]
    EmptyGeometry,
}
