use std::collections::HashMap;
use std::fmt::{self, Display};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    MalformedRequestLine,
    InvalidUtf8,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedRequestLine => write!(f, "Malformed request line"),
            ParseError::InvalidUtf8 => write!(f, "Invalid UTF-8 in request head"),
        }
    }
}

impl std::error::Error for ParseError {}

/// One parsed request. Headers keep their wire spelling; `header()` falls
/// back to the lowercase spelling so handlers see what curl and browsers
/// alike send.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: String,
    pub uri: String,
    pub version: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub root: String,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Structures a request buffer the assembler has declared complete.
    pub fn parse(buffer: &[u8], root: &str) -> Result<HttpRequest, ParseError> {
        let term = find_subsequence(buffer, HEADER_TERMINATOR, 0)
            .ok_or(ParseError::MalformedRequestLine)?;

        let head =
            std::str::from_utf8(&buffer[..term]).map_err(|_| ParseError::InvalidUtf8)?;
        let mut lines = head.split("\r\n");

        let request_line = lines.next().ok_or(ParseError::MalformedRequestLine)?;
        let mut parts = request_line.split_whitespace();
        let (method, uri, version) = match (parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(u), Some(v)) => (m.to_string(), u.to_string(), v.to_string()),
            _ => return Err(ParseError::MalformedRequestLine),
        };

        let mut headers = HashMap::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                // duplicate keys: last write wins
                headers.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        let query_params = match uri.split_once('?') {
            Some((_, query)) => parse_query(query),
            None => HashMap::new(),
        };

        Ok(HttpRequest {
            method,
            uri,
            version,
            headers,
            query_params,
            root: root.to_string(),
            body: buffer[term + HEADER_TERMINATOR.len()..].to_vec(),
        })
    }

    /// Exact-case lookup first, lowercase fallback second.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| self.headers.get(&name.to_ascii_lowercase()))
            .map(|v| v.as_str())
    }

    /// Request target with the query string stripped.
    pub fn path(&self) -> &str {
        match self.uri.split_once('?') {
            Some((path, _)) => path,
            None => &self.uri,
        }
    }

    /// Raw query string, empty when the target has none.
    pub fn query_string(&self) -> &str {
        match self.uri.split_once('?') {
            Some((_, query)) => query,
            None => "",
        }
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("", _)) => {} // missing key is skipped
            Some((key, value)) => {
                params.insert(key.to_string(), value.to_string());
            }
            None => {
                if !pair.is_empty() {
                    params.insert(pair.to_string(), String::new());
                }
            }
        }
    }
    params
}

pub fn find_subsequence(buffer: &[u8], needle: &[u8], start_offset: usize) -> Option<usize> {
    if needle.is_empty() || start_offset > buffer.len() {
        return None;
    }
    buffer[start_offset..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| start_offset + pos)
}
