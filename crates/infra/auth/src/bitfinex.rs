//! Bitfinex v1 signing
//!
//! The JSON payload (request path, nonce, then parameters) is sent both as the
//! body and base64 encoded in `X-BFX-PAYLOAD`, which is what gets signed.

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::signer::{HashAlgo, SignatureArtifacts, Signer, SigningRequest, b64, hmac_digest};
use common::{ExchangeId, Params, Result};

/// Bitfinex authenticated endpoint signer
#[derive(Debug, Clone, Copy, Default)]
pub struct BitfinexSigner;

impl Signer for BitfinexSigner {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Bitfinex
    }

    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        nonce: Nonce,
    ) -> Result<SignatureArtifacts> {
        let additions = Params::new()
            .with("request", request.path)
            .with("nonce", nonce.to_string());
        let payload = b64(Params::signed_payload(&additions, request.params).to_json().as_bytes());
        let signature = hmac_digest(
            self.exchange(),
            HashAlgo::Sha384,
            credentials.secret().expose().as_bytes(),
            payload.as_bytes(),
        )?;

        Ok(SignatureArtifacts {
            headers: vec![
                ("X-BFX-APIKEY".to_string(), credentials.key().to_string()),
                ("X-BFX-PAYLOAD".to_string(), payload),
                ("X-BFX-SIGNATURE".to_string(), hex::encode(signature)),
            ],
            body_additions: additions,
        })
    }
}
