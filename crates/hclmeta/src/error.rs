//! conversion errors
//!
//! None of these abort a conversion. They are collected in [ConversionErrors] while the walk continues with a
//! placeholder (or without the offending block).

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConversionError {
    #[error("{what} has no source span")]
    MissingSpan { what: &'static str },
    #[error("span {start}..{end} lies outside of the source ({len} bytes)")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
    #[error("number {0} cannot be represented")]
    UnrepresentableNumber(String),
    #[error("attribute {attribute} of {address}")]
    Attribute {
        address: String,
        attribute: String,
        #[source]
        source: Box<ConversionError>,
    },
    #[error("block {address}")]
    Block {
        address: String,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    pub(crate) fn in_attribute(self, address: &str, attribute: &str) -> Self {
        ConversionError::Attribute {
            address: address.to_string(),
            attribute: attribute.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_block(self, address: &str) -> Self {
        ConversionError::Block {
            address: address.to_string(),
            source: Box::new(self),
        }
    }
}

#[derive(derive_new::new, Debug, Default)]
pub struct ConversionErrors {
    #[new(default)]
    issues: Vec<ConversionError>,
}

impl ConversionErrors {
    pub fn log(&mut self, issue: ConversionError) {
        tracing::warn!(%issue, "conversion error");
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[ConversionError] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl std::error::Error for ConversionErrors {}

impl std::fmt::Display for ConversionErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.issues.as_slice() {
            [] => f.write_str("no conversion errors"),
            [issue] => write!(f, "{issue}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}
