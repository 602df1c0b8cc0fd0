//! Route expression parser
//!
//! A route expression is the key of an endpoint definition entry. Three
//! forms are recognized, tried in this order:
//!
//! 1. `METHOD /path` - explicit verb and path
//! 2. `/path` - path only, the verb comes from context
//! 3. `METHOD` - verb only, the route is the current mount path
//!
//! Method tokens are matched case-insensitively and always come back
//! lowercase. Paths are appended to the mount path as-is.

use crate::error::{ParseError, ParseErrorKind};
use crate::types::{HttpMethod, ResolvedEndpoint};

/// Resolve `expression` against `mount_path` into a method and an absolute route.
///
/// The mount path is trimmed of surrounding whitespace; an empty mount path
/// means no prefix at all (not `/`).
pub fn parse_expression(expression: &str, mount_path: &str) -> Result<ResolvedEndpoint, ParseError> {
    let mount = mount_path.trim();

    if let Some((token, path)) = method_and_path(expression) {
        return Ok(ResolvedEndpoint {
            method: Some(resolve_method(expression, token)?),
            route: format!("{}{}", mount, path),
        });
    }

    if let Some(path) = path_only(expression) {
        return Ok(ResolvedEndpoint {
            method: None,
            route: format!("{}{}", mount, path),
        });
    }

    if let Some(token) = method_only(expression) {
        if mount.is_empty() {
            return Err(ParseError::new(expression, ParseErrorKind::MissingMountPath));
        }
        return Ok(ResolvedEndpoint {
            method: Some(resolve_method(expression, token)?),
            route: mount.to_string(),
        });
    }

    Err(ParseError::new(expression, ParseErrorKind::NoMatch))
}

fn resolve_method(expression: &str, token: &str) -> Result<HttpMethod, ParseError> {
    token
        .parse::<HttpMethod>()
        .map_err(|e| ParseError::new(expression, ParseErrorKind::UnknownMethod(e.0)))
}

/// `METHOD /path`
fn method_and_path(input: &str) -> Option<(&str, &str)> {
    let mut cursor = Cursor::new(input);
    cursor.skip_whitespace();
    let token = cursor.method_token()?;
    if !cursor.skip_whitespace() {
        return None;
    }
    let path = cursor.path()?;
    cursor.skip_whitespace();
    cursor.at_end().then_some((token, path))
}

/// `/path`
fn path_only(input: &str) -> Option<&str> {
    let mut cursor = Cursor::new(input);
    cursor.skip_whitespace();
    let path = cursor.path()?;
    cursor.skip_whitespace();
    cursor.at_end().then_some(path)
}

/// `METHOD`
fn method_only(input: &str) -> Option<&str> {
    let mut cursor = Cursor::new(input);
    cursor.skip_whitespace();
    let token = cursor.method_token()?;
    cursor.skip_whitespace();
    cursor.at_end().then_some(token)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    /// Consume the longest prefix whose chars satisfy `pred`
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Returns whether any whitespace was consumed
    fn skip_whitespace(&mut self) -> bool {
        !self.take_while(char::is_whitespace).is_empty()
    }

    /// Letters and hyphens, at least one
    fn method_token(&mut self) -> Option<&'a str> {
        let token = self.take_while(|c| c.is_ascii_alphabetic() || c == '-');
        (!token.is_empty()).then_some(token)
    }

    /// A `/` followed by any run of non-whitespace
    fn path(&mut self) -> Option<&'a str> {
        if !self.rest().starts_with('/') {
            return None;
        }
        let start = self.pos;
        self.take_while(|c| !c.is_whitespace());
        Some(&self.input[start..self.pos])
    }
}
