pub use crate::config::{AppConfig, LocationConfig, ServerConfig};
pub use crate::error::{Result, WebservError};
pub use crate::http::connection::{Connection, ReadOutcome, request_complete};
pub use crate::http::request::{HttpRequest, ParseError, find_subsequence};
pub use crate::http::response::{
    HttpResponse, content_type_for_path, error_response, generate_autoindex, reason_phrase,
};
pub use crate::router::{allow_header, is_method_allowed, match_location};

pub use mio::{
    Events, Interest, Poll, Token,
    event::Event,
    net::{TcpListener, TcpStream},
};
pub use weblog::{debug, error, info, trace, warn};

pub use std::collections::HashMap;
pub use std::fs::{self, File, OpenOptions};
pub use std::io::{ErrorKind, Read, Write};
pub use std::net::SocketAddr;
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;
pub use std::sync::atomic::{AtomicBool, Ordering};
pub use std::time::{Duration, Instant};

pub const READ_BUF_SIZE: usize = 4096;
// Per-readiness-event read cap, keeps one chatty client from starving the rest
pub const MAX_EVENT_READ: usize = 32 * 1024;
// Headroom on top of client_max_body_size for the request head
pub const HEADERS_MAX: usize = 16 * 1024;
pub const MAX_CLIENTS: usize = 1024;

pub const HTTP_OK: u16 = 200;
pub const HTTP_CREATED: u16 = 201;
pub const HTTP_MOVED_PERMANENTLY: u16 = 301;
pub const HTTP_FOUND: u16 = 302;

// 4xx Client Errors
pub const HTTP_BAD_REQUEST: u16 = 400;
pub const HTTP_FORBIDDEN: u16 = 403;
pub const HTTP_NOT_FOUND: u16 = 404;
pub const HTTP_METHOD_NOT_ALLOWED: u16 = 405;
pub const HTTP_LENGTH_REQUIRED: u16 = 411;
pub const HTTP_PAYLOAD_TOO_LARGE: u16 = 413;

// 5xx Server Errors
pub const HTTP_INTERNAL_SERVER_ERROR: u16 = 500;
pub const HTTP_BAD_GATEWAY: u16 = 502;
pub const HTTP_GATEWAY_TIMEOUT: u16 = 504;
