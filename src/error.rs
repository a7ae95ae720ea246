use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::analysis::RouteOverview;

/// Failure while turning GPX text into a [`crate::route::RouteDocument`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid GPX file format: missing <gpx> root element")]
    InvalidRoot,

    #[error("Unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    MalformedNumeric {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(e.into())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplerError {
    #[error("sample count must be at least 2, got {0}")]
    InvalidSampleCount(i32),

    #[error("sample count must be at most {max}, got {requested}")]
    SampleCountTooLarge { requested: i32, max: i32 },
}

/// Error surfaced to callers of the whole pipeline.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("failed to process route: {0}")]
    Parse(#[from] ParseError),

    /// Sampling failed after parsing and statistics succeeded; those are kept in `partial`.
    #[error("failed to process route: {source}")]
    Sample {
        source: SamplerError,
        partial: Box<RouteOverview>,
    },

    #[error("failed to process route: invalid options: {0}")]
    Options(String),

    #[error("failed to process route: {0}")]
    Serialize(String),
}

impl RouteError {
    /// Document and statistics computed before the failure, if any.
    pub fn partial(&self) -> Option<&RouteOverview> {
        match self {
            Self::Sample { partial, .. } => Some(&**partial),
            _ => None,
        }
    }
}

impl From<RouteError> for JsValue {
    fn from(e: RouteError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
