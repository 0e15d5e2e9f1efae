//! Bittrex v1.1 signing
//!
//! The full request URI, query string included, is signed and the result
//! sent in the `apisign` header.

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::signer::{HashAlgo, SignatureArtifacts, Signer, SigningRequest, hmac_digest};
use common::{ExchangeId, Params, Result};

/// Bittrex authenticated endpoint signer
#[derive(Debug, Clone, Copy, Default)]
pub struct BittrexSigner;

impl Signer for BittrexSigner {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Bittrex
    }

    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        nonce: Nonce,
    ) -> Result<SignatureArtifacts> {
        let additions = Params::new()
            .with("apikey", credentials.key())
            .with("nonce", nonce.to_string());
        let query = Params::signed_payload(&additions, request.params).to_form();
        let uri = format!("{}?{query}", request.url);
        let signature = hmac_digest(
            self.exchange(),
            HashAlgo::Sha512,
            credentials.secret().expose().as_bytes(),
            uri.as_bytes(),
        )?;

        Ok(SignatureArtifacts {
            headers: vec![("apisign".to_string(), hex::encode(signature))],
            body_additions: additions,
        })
    }
}
