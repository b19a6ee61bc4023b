//! Application errors
use std::{fmt, io, string::FromUtf8Error};

use jack::prelude::JackError;

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
}

impl AppError {
    pub fn failed(count: usize) -> Self {
        Self {
            kind: ErrorKind::Failed { count },
        }
    }
}

impl std::error::Error for AppError {}

#[derive(Debug)]
pub enum ErrorKind {
    Jack(JackError),
    Io(io::Error),
    Utf8(FromUtf8Error),
    Config(serde_yaml::Error),
    /// Some compilation units did not compile.
    Failed { count: usize },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "application error: {}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jack(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Utf8(err) => write!(f, "source is not valid UTF-8: {err}"),
            Self::Config(err) => write!(f, "configuration: {err}"),
            Self::Failed { count: 1 } => write!(f, "1 file failed to compile"),
            Self::Failed { count } => write!(f, "{count} files failed to compile"),
        }
    }
}

impl From<JackError> for AppError {
    fn from(err: JackError) -> Self {
        Self {
            kind: ErrorKind::Jack(err),
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}

impl From<FromUtf8Error> for AppError {
    fn from(err: FromUtf8Error) -> Self {
        Self {
            kind: ErrorKind::Utf8(err),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            kind: ErrorKind::Config(err),
        }
    }
}
