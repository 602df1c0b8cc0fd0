//! Core types for api-rendr

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};

/// HTTP verbs a route expression may name
///
/// `All` is the wildcard verb: a route registered under it answers every
/// request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    All,
    Checkout,
    Copy,
    Delete,
    Get,
    Head,
    Lock,
    Merge,
    Mkactivity,
    Mkcol,
    Move,
    #[serde(rename = "m-search")]
    MSearch,
    Notify,
    Options,
    Patch,
    Post,
    Purge,
    Put,
    Report,
    Search,
    Subscribe,
    Trace,
    Unlock,
    Unsubscribe,
}

impl HttpMethod {
    pub const VARIANTS: [HttpMethod; 24] = [
        HttpMethod::All,
        HttpMethod::Checkout,
        HttpMethod::Copy,
        HttpMethod::Delete,
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Lock,
        HttpMethod::Merge,
        HttpMethod::Mkactivity,
        HttpMethod::Mkcol,
        HttpMethod::Move,
        HttpMethod::MSearch,
        HttpMethod::Notify,
        HttpMethod::Options,
        HttpMethod::Patch,
        HttpMethod::Post,
        HttpMethod::Purge,
        HttpMethod::Put,
        HttpMethod::Report,
        HttpMethod::Search,
        HttpMethod::Subscribe,
        HttpMethod::Trace,
        HttpMethod::Unlock,
        HttpMethod::Unsubscribe,
    ];

    /// Lowercase name, as written in route expressions
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::All => "all",
            HttpMethod::Checkout => "checkout",
            HttpMethod::Copy => "copy",
            HttpMethod::Delete => "delete",
            HttpMethod::Get => "get",
            HttpMethod::Head => "head",
            HttpMethod::Lock => "lock",
            HttpMethod::Merge => "merge",
            HttpMethod::Mkactivity => "mkactivity",
            HttpMethod::Mkcol => "mkcol",
            HttpMethod::Move => "move",
            HttpMethod::MSearch => "m-search",
            HttpMethod::Notify => "notify",
            HttpMethod::Options => "options",
            HttpMethod::Patch => "patch",
            HttpMethod::Post => "post",
            HttpMethod::Purge => "purge",
            HttpMethod::Put => "put",
            HttpMethod::Report => "report",
            HttpMethod::Search => "search",
            HttpMethod::Subscribe => "subscribe",
            HttpMethod::Trace => "trace",
            HttpMethod::Unlock => "unlock",
            HttpMethod::Unsubscribe => "unsubscribe",
        }
    }

    /// Whether a route registered under this verb answers `method`.
    ///
    /// `all` answers everything and `get` also answers `HEAD`.
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            HttpMethod::All => true,
            HttpMethod::Get if *method == Method::HEAD => true,
            _ => method.as_str().eq_ignore_ascii_case(self.as_str()),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a token is not one of the recognized verbs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown HTTP method \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Case-insensitive lookup
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        HttpMethod::VARIANTS
            .iter()
            .copied()
            .find(|m| m.as_str() == lower)
            .ok_or(UnknownMethod(lower))
    }
}

/// Method and absolute route resolved from a route expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    /// `None` when the expression only named a path
    pub method: Option<HttpMethod>,
    pub route: String,
}

impl ResolvedEndpoint {
    /// The resolved method, or the wildcard verb when the expression named none
    pub fn method_or_all(&self) -> HttpMethod {
        self.method.unwrap_or(HttpMethod::All)
    }
}
