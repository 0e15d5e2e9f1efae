//! Bitstamp signing
//!
//! The signature covers `nonce || customer_id || key` only; it travels in the
//! form body next to the key and nonce.

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::signer::{HashAlgo, SignatureArtifacts, Signer, SigningRequest, hmac_digest};
use common::{Error, ExchangeId, Params, Result};

/// Bitstamp private endpoint signer
#[derive(Debug, Clone, Copy, Default)]
pub struct BitstampSigner;

impl Signer for BitstampSigner {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Bitstamp
    }

    fn sign(
        &self,
        _request: &SigningRequest<'_>,
        credentials: &Credentials,
        nonce: Nonce,
    ) -> Result<SignatureArtifacts> {
        let customer_id = credentials
            .extra(0)
            .ok_or_else(|| Error::signature(self.exchange(), "customer id is missing"))?;

        let message = format!("{nonce}{customer_id}{}", credentials.key());
        let digest = hmac_digest(
            self.exchange(),
            HashAlgo::Sha256,
            credentials.secret().expose().as_bytes(),
            message.as_bytes(),
        )?;

        Ok(SignatureArtifacts {
            headers: Vec::new(),
            body_additions: Params::new()
                .with("key", credentials.key())
                .with("signature", hex::encode_upper(digest))
                .with("nonce", nonce.to_string()),
        })
    }
}
