//! Poloniex trading API signing

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::signer::{HashAlgo, SignatureArtifacts, Signer, SigningRequest, hmac_digest};
use common::{ExchangeId, Params, Result};

/// Poloniex `tradingApi` signer: hex HMAC-SHA512 of the form body
#[derive(Debug, Clone, Copy, Default)]
pub struct PoloniexSigner;

impl Signer for PoloniexSigner {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Poloniex
    }

    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        nonce: Nonce,
    ) -> Result<SignatureArtifacts> {
        let additions = Params::new().with("nonce", nonce.to_string());
        let body = Params::signed_payload(&additions, request.params).to_form();
        let signature = hmac_digest(
            self.exchange(),
            HashAlgo::Sha512,
            credentials.secret().expose().as_bytes(),
            body.as_bytes(),
        )?;

        Ok(SignatureArtifacts {
            headers: vec![
                ("Key".to_string(), credentials.key().to_string()),
                ("Sign".to_string(), hex::encode(signature)),
            ],
            body_additions: additions,
        })
    }
}
