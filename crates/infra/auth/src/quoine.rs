//! Quoine signing: an HS256 JSON web token over path, nonce and key id

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::signer::{SignatureArtifacts, Signer, SigningRequest};
use common::{Error, ExchangeId, Params, Result};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

/// API version requested on every call
pub const API_VERSION: &str = "2";

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoineClaims {
    /// Request path, with query string for GET requests
    pub path: String,
    /// Request nonce
    pub nonce: u64,
    /// API token id
    pub token_id: String,
}

/// Quoine authenticated endpoint signer
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoineSigner;

impl Signer for QuoineSigner {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Quoine
    }

    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        nonce: Nonce,
    ) -> Result<SignatureArtifacts> {
        let payload = Params::signed_payload(&Params::new(), request.params);
        let claims = QuoineClaims {
            path: request.target(&payload),
            nonce: nonce.value(),
            token_id: credentials.key().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(credentials.secret().expose().as_bytes()),
        )
        .map_err(|e| Error::signature(self.exchange(), format!("JWT encoding failed: {e}")))?;

        Ok(SignatureArtifacts {
            headers: vec![
                ("X-Quoine-API-Version".to_string(), API_VERSION.to_string()),
                ("X-Quoine-Auth".to_string(), token),
            ],
            body_additions: Params::new(),
        })
    }
}
