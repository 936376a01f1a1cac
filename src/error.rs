//! Error types for the IRC client engine.
//!
//! This module defines error types for protocol-level errors, message
//! parsing failures, transport failures and the client run loop.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing and decoding the line stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// A line grew past the framing limit without a terminator.
    #[error("message too long: {0} bytes")]
    MessageTooLong(usize),

    /// The configured text encoding label is not known.
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// An outbound line carries CR or LF and would smuggle a second command.
    #[error("line contains a line terminator")]
    EmbeddedLineBreak,

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Command was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,
}

/// Errors raised while opening a connection to the server.
#[cfg(feature = "tokio")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Socket-level failure (resolve, connect, handshake I/O).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured server is not a valid TLS server name.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// The TLS client configuration could not be built.
    #[error("tls configuration error: {0}")]
    TlsConfig(#[from] tokio_rustls::rustls::Error),

    /// The certificate verifier could not be built from the root store.
    #[error("tls verifier error: {0}")]
    TlsVerifier(#[from] tokio_rustls::rustls::client::VerifierBuilderError),

    /// The line codec could not be created.
    #[error("codec error: {0}")]
    Codec(#[from] ProtocolError),

    /// The server certificate failed validation and no tolerance flag covers it.
    #[error("untrusted server certificate: {0:?}")]
    UntrustedCertificate(tokio_rustls::rustls::CertificateError),
}

/// Terminal errors of a client run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// `connect` was called while a run is still active.
    #[error("client is already connected")]
    AlreadyConnected,

    /// A received line could not be parsed.
    #[error("failed to parse line {line:?}")]
    Parse {
        /// The offending line.
        line: String,
        /// The underlying parse error.
        #[source]
        source: MessageParseError,
    },

    /// The connection could not be established and will not be retried.
    #[cfg(feature = "tokio")]
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}
