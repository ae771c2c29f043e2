use thiserror::Error;

/// Malformed RESP input. The connection cannot be resynchronised after one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("expected '{expected}', found byte {found:#04x}")]
    UnexpectedByte { expected: char, found: u8 },
    #[error("invalid length {0:?}")]
    InvalidLength(String),
    #[error("bulk string of {0} bytes exceeds the limit")]
    TooLarge(usize),
    #[error("bulk string is not terminated by CRLF")]
    MissingTerminator,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
    #[error("missing value for '{0}'")]
    MissingValue(String),
    #[error("invalid value '{value}' for '{flag}'")]
    InvalidValue { flag: String, value: String },
}
