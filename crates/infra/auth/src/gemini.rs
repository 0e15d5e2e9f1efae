//! Gemini signing
//!
//! Private requests carry no body. The JSON payload travels base64 encoded in
//! `X-GEMINI-PAYLOAD` and the signature is the hex HMAC-SHA384 of that header.

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::signer::{HashAlgo, SignatureArtifacts, Signer, SigningRequest, b64, hmac_digest};
use common::{ExchangeId, Params, Result};

/// Gemini private endpoint signer
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiSigner;

impl Signer for GeminiSigner {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Gemini
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
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("X-GEMINI-APIKEY".to_string(), credentials.key().to_string()),
                ("X-GEMINI-PAYLOAD".to_string(), payload),
                ("X-GEMINI-SIGNATURE".to_string(), hex::encode(signature)),
                ("Cache-Control".to_string(), "no-cache".to_string()),
            ],
            body_additions: additions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Encoding, Method};

    fn sign(nonce: u64) -> Result<SignatureArtifacts> {
        let credentials = Credentials::new("AK1", "deadbeef", vec![])?;
        let params = Params::new();
        let request = SigningRequest {
            method: Method::Post,
            url: "https://api.gemini.com/v1/balances",
            path: "/v1/balances",
            params: &params,
            encoding: Encoding::HeaderOnly,
        };
        GeminiSigner.sign(&request, &credentials, Nonce::from_raw(nonce))
    }

    #[test]
    fn test_known_signature() -> Result<()> {
        let artifacts = sign(100)?;
        assert_eq!(
            artifacts.header("X-GEMINI-PAYLOAD"),
            Some("eyJyZXF1ZXN0IjoiL3YxL2JhbGFuY2VzIiwibm9uY2UiOiIxMDAifQ==")
        );
        assert_eq!(
            artifacts.header("X-GEMINI-SIGNATURE"),
            Some("d9ddbb938991a026dab68548d9b73d9daedf1e58a59cdec120204389f809b4351f5ae5e03c7c50bb3052293d192c50ca")
        );
        assert_eq!(artifacts.header("Content-Type"), Some("text/plain"));
        Ok(())
    }

    #[test]
    fn test_nonce_changes_signature() -> Result<()> {
        assert_eq!(sign(100)?, sign(100)?);
        assert_ne!(
            sign(100)?.header("X-GEMINI-SIGNATURE"),
            sign(101)?.header("X-GEMINI-SIGNATURE")
        );
        Ok(())
    }
}
