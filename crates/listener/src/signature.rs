//! `X-Hub-Signature-256` verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// Shared secret configured on the GitHub App's webhook, keyed once.
#[derive(Clone)]
pub struct WebhookSecret(HmacSha256);

impl WebhookSecret {
    /// Keys the verifier with `secret`, returning `None` if it is empty.
    ///
    /// An empty secret would make every signature trivially forgeable.
    pub fn new(secret: impl AsRef<[u8]>) -> Option<Self> {
        let key = secret.as_ref();
        if key.is_empty() {
            return None;
        }
        <HmacSha256 as Mac>::new_from_slice(key).ok().map(Self)
    }

    fn mac(&self) -> HmacSha256 {
        self.0.clone()
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(..)")
    }
}

/// Why a delivery failed authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// No signature header.
    #[error("missing X-Hub-Signature-256 header")]
    Missing,
    /// The header is not `sha256=<hex>`.
    #[error("malformed X-Hub-Signature-256 header")]
    Malformed,
    /// Well-formed but not produced with our secret over this body.
    #[error("payload signature does not match")]
    Mismatch,
}

/// Checks `header` against the HMAC-SHA256 of `body`, in constant time.
pub fn verify(
    secret: &WebhookSecret,
    header: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let digest = header
        .strip_prefix(PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(digest).map_err(|_| SignatureError::Malformed)?;
    let mut mac = secret.mac();
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Produces the `X-Hub-Signature-256` value GitHub would send for `body`.
pub fn sign(secret: &WebhookSecret, body: &[u8]) -> String {
    let mut mac = secret.mac();
    mac.update(body);
    format!("{PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}
