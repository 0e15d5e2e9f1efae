//! GDAX signing
//!
//! The prehash string is `timestamp || METHOD || path[?query] || body`, where
//! the timestamp is the nonce (milliseconds) rendered as decimal seconds.

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::signer::{HashAlgo, SignatureArtifacts, Signer, SigningRequest, b64, decode_base64_secret, hmac_digest};
use common::{Error, ExchangeId, Params, Result};

/// GDAX authenticated endpoint signer
#[derive(Debug, Clone, Copy, Default)]
pub struct GdaxSigner;

/// Millisecond nonce as `seconds.millis`
fn access_timestamp(nonce: Nonce) -> String {
    let millis = nonce.value();
    format!("{}.{:03}", millis / 1000, millis % 1000)
}

impl Signer for GdaxSigner {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Gdax
    }

    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        nonce: Nonce,
    ) -> Result<SignatureArtifacts> {
        let passphrase = credentials
            .extra(0)
            .ok_or_else(|| Error::signature(self.exchange(), "passphrase is missing"))?;

        let payload = Params::signed_payload(&Params::new(), request.params);
        let body = payload.body(request.encoding).unwrap_or_default();
        let timestamp = access_timestamp(nonce);
        let prehash = format!(
            "{timestamp}{}{}{body}",
            request.method,
            request.target(&payload)
        );

        let secret = decode_base64_secret(self.exchange(), credentials.secret().expose())?;
        let signature = hmac_digest(self.exchange(), HashAlgo::Sha256, &secret, prehash.as_bytes())?;

        Ok(SignatureArtifacts {
            headers: vec![
                ("CB-ACCESS-KEY".to_string(), credentials.key().to_string()),
                ("CB-ACCESS-SIGN".to_string(), b64(&signature)),
                ("CB-ACCESS-TIMESTAMP".to_string(), timestamp),
                ("CB-ACCESS-PASSPHRASE".to_string(), passphrase.to_string()),
            ],
            body_additions: Params::new(),
        })
    }
}
