use core::fmt;
use std::{
    error::Error,
    fmt::{Debug, Display, Formatter},
};

use parser::ConfigError;

pub struct WebservError(pub Box<dyn Error>);

impl Debug for WebservError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "\r\x1b[K{}", self)
    }
}

impl Display for WebservError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\x1b[31mERROR\x1b[0m: {}", self.0)
    }
}

impl Error for WebservError {}

impl From<ConfigError> for WebservError {
    fn from(e: ConfigError) -> Self {
        WebservError(Box::new(e))
    }
}

impl From<std::io::Error> for WebservError {
    fn from(e: std::io::Error) -> Self {
        WebservError(Box::new(e))
    }
}

impl From<std::net::AddrParseError> for WebservError {
    fn from(e: std::net::AddrParseError) -> Self {
        WebservError(Box::new(e))
    }
}

impl From<ctrlc::Error> for WebservError {
    fn from(e: ctrlc::Error) -> Self {
        WebservError(Box::new(e))
    }
}

impl From<String> for WebservError {
    fn from(s: String) -> Self {
        WebservError(Box::new(ConfigError::Generic(s)))
    }
}

impl From<&str> for WebservError {
    fn from(s: &str) -> Self {
        WebservError(Box::new(ConfigError::Generic(s.to_string())))
    }
}

pub type Result<T> = std::result::Result<T, WebservError>;
