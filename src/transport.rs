//! Socket setup: TCP with keep-alive, optional TLS, and line framing.
//!
//! TLS trust follows the configured policy: a chain that validates is always
//! accepted; `self_signed` additionally tolerates an unknown issuer (a
//! self-signed leaf, or a chain ending in an untrusted self-signed root);
//! `cert_expired` tolerates expiry. Every other failure aborts the handshake.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{
    self,
    client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    client::WebPkiServerVerifier,
    pki_types::{CertificateDer, ServerName, UnixTime},
    CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use tokio_rustls::TlsConnector;
use tokio_util::codec::Framed;
use tracing::{info, warn};

use crate::config::ClientOptions;
use crate::error::{ProtocolError, TransportError};
use crate::line::LineCodec;

/// Which certificate problems the caller chose to tolerate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrustPolicy {
    pub self_signed: bool,
    pub cert_expired: bool,
}

impl TrustPolicy {
    pub fn from_options(options: &ClientOptions) -> Self {
        TrustPolicy {
            self_signed: options.self_signed,
            cert_expired: options.cert_expired,
        }
    }

    /// Whether a validation failure is covered by this policy.
    pub fn tolerates(&self, err: &CertificateError) -> bool {
        match err {
            CertificateError::UnknownIssuer => self.self_signed,
            CertificateError::Expired | CertificateError::ExpiredContext { .. } => {
                self.cert_expired
            }
            _ => false,
        }
    }
}

/// Web PKI verification with [`TrustPolicy`] exceptions.
#[derive(Debug)]
struct TrustPolicyVerifier {
    inner: Arc<WebPkiServerVerifier>,
    policy: TrustPolicy,
}

impl ServerCertVerifier for TrustPolicyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        match self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Err(rustls::Error::InvalidCertificate(err)) if self.policy.tolerates(&err) => {
                warn!(error = ?err, "accepting server certificate despite validation failure");
                Ok(ServerCertVerified::assertion())
            }
            other => other,
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

fn tls_config(policy: TrustPolicy) -> Result<rustls::ClientConfig, TransportError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let roots = Arc::new(RootCertStore::from_iter(
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
    ));
    let inner = WebPkiServerVerifier::builder_with_provider(roots, provider.clone()).build()?;

    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(TrustPolicyVerifier { inner, policy }))
        .with_no_client_auth();
    Ok(config)
}

/// Pull a certificate failure out of a handshake I/O error.
fn certificate_error(err: &std::io::Error) -> Option<CertificateError> {
    match err.get_ref()?.downcast_ref::<rustls::Error>()? {
        rustls::Error::InvalidCertificate(cert_err) => Some(cert_err.clone()),
        _ => None,
    }
}

/// A framed connection to the server.
#[allow(clippy::large_enum_variant)]
#[derive(Debug)]
pub enum Transport {
    Tcp {
        framed: Framed<TcpStream, LineCodec>,
    },
    Tls {
        framed: Framed<TlsStream<TcpStream>, LineCodec>,
    },
}

impl Transport {
    /// Open the socket described by `options` and wrap it in a line codec.
    pub async fn connect(options: &ClientOptions) -> Result<Self, TransportError> {
        let codec = LineCodec::new(&options.encoding)?;
        let stream = TcpStream::connect((options.server.as_str(), options.port)).await?;
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        if !options.secure {
            info!(server = %options.server, port = options.port, "connected");
            return Ok(Self::Tcp {
                framed: Framed::new(stream, codec),
            });
        }

        let config = tls_config(TrustPolicy::from_options(options))?;
        let connector = TlsConnector::from(Arc::new(config));
        let server_name = ServerName::try_from(options.server.clone())
            .map_err(|_| TransportError::InvalidServerName(options.server.clone()))?;

        let tls = connector
            .connect(server_name, stream)
            .await
            .map_err(|e| match certificate_error(&e) {
                Some(cert_err) => TransportError::UntrustedCertificate(cert_err),
                None => TransportError::Io(e),
            })?;

        info!(server = %options.server, port = options.port, "connected with TLS");
        Ok(Self::Tls {
            framed: Framed::new(tls, codec),
        })
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls { .. })
    }

    /// Next framed line. `None` once the peer closed the stream.
    pub async fn read_line(&mut self) -> Option<Result<String, ProtocolError>> {
        match self {
            Transport::Tcp { framed } => framed.next().await,
            Transport::Tls { framed } => framed.next().await,
        }
    }

    /// Write one line; the codec appends CRLF.
    pub async fn write_line(&mut self, line: String) -> Result<(), ProtocolError> {
        match self {
            Transport::Tcp { framed } => framed.send(line).await,
            Transport::Tls { framed } => framed.send(line).await,
        }
    }

    /// Flush and shut down the write half.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        match self {
            Transport::Tcp { framed } => SinkExt::<String>::close(framed).await,
            Transport::Tls { framed } => SinkExt::<String>::close(framed).await,
        }
    }
}
