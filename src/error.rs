//! Error types for api-rendr

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unexpected value for key \"{expression}\" in endpoint settings (found {found})")]
    UnexpectedValue {
        expression: String,
        found: &'static str,
    },

    #[error("Invalid route path: \"{0}\" (routes must start with '/')")]
    InvalidRoute(String),

    #[error("Route conflict: {0}")]
    RouteConflict(String),

    #[error("Unsupported router option: {0}")]
    UnsupportedOption(&'static str),

    #[error("Invalid endpoint document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A route expression that could not be turned into a method and a path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unable to interpret \"{expression}\" as a valid expression{kind}")]
pub struct ParseError {
    pub expression: String,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// None of the `METHOD /path`, `/path` or `METHOD` forms matched
    NoMatch,
    /// A bare `METHOD` with nothing mounted above it
    MissingMountPath,
    /// The method token is not a recognized HTTP verb
    UnknownMethod(String),
}

impl ParseError {
    pub(crate) fn new(expression: &str, kind: ParseErrorKind) -> Self {
        Self {
            expression: expression.to_string(),
            kind,
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::NoMatch => Ok(()),
            ParseErrorKind::MissingMountPath => f.write_str(" (a bare method needs a mount path)"),
            ParseErrorKind::UnknownMethod(token) => write!(f, " (unknown HTTP method \"{}\")", token),
        }
    }
}
