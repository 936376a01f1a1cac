//! SASL PLAIN helpers for IRC.
//!
//! The client negotiates `CAP REQ :sasl`, answers the server's `+`
//! continuation with base64 credentials, and ends negotiation on 903/904.
//!
//! # Reference
//! - IRCv3 SASL: <https://ircv3.net/specs/extensions/sasl-3.2>
//! - RFC 4616 (PLAIN): <https://tools.ietf.org/html/rfc4616>
//!
//! # Example
//!
//! ```
//! use slirc_client::sasl::{authenticate_payloads, encode_plain};
//!
//! let encoded = encode_plain("nick", "user", "hunter2");
//! let payloads = authenticate_payloads(&encoded);
//! assert_eq!(payloads, vec![encoded.clone()]);
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Maximum length of a single SASL message chunk (400 bytes).
///
/// SASL responses that exceed this length must be split into multiple
/// AUTHENTICATE commands.
pub const SASL_CHUNK_SIZE: usize = 400;

/// Mechanism name sent in `AUTHENTICATE`.
pub const MECHANISM_PLAIN: &str = "PLAIN";

/// Encode credentials for the PLAIN mechanism.
///
/// Format: `authzid NUL authcid NUL password`, base64-encoded. The client
/// sends its nick as the authorization identity and its username as the
/// authentication identity.
pub fn encode_plain(authzid: &str, authcid: &str, password: &str) -> String {
    let payload = format!("{}\0{}\0{}", authzid, authcid, password);
    BASE64.encode(payload.as_bytes())
}

/// Split an encoded SASL response into chunks for transmission.
pub fn chunk_response(encoded: &str) -> impl Iterator<Item = &str> {
    // base64 output is ASCII, so every byte offset is a char boundary
    (0..encoded.len())
        .step_by(SASL_CHUNK_SIZE)
        .map(move |start| &encoded[start..(start + SASL_CHUNK_SIZE).min(encoded.len())])
}

/// The `AUTHENTICATE` arguments to send for an encoded response.
///
/// A response whose length is an exact multiple of the chunk size (including
/// an empty one) is terminated with a lone `+`.
pub fn authenticate_payloads(encoded: &str) -> Vec<String> {
    let mut out: Vec<String> = chunk_response(encoded).map(str::to_owned).collect();
    if encoded.len() % SASL_CHUNK_SIZE == 0 {
        out.push("+".to_owned());
    }
    out
}
