//! Kraken signing
//!
//! `API-Sign = base64(HMAC-SHA512(base64decode(secret), path || SHA256(nonce || postdata)))`

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::signer::{HashAlgo, SignatureArtifacts, Signer, SigningRequest, b64, decode_base64_secret, hmac_digest};
use common::{ExchangeId, Params, Result};
use sha2::{Digest, Sha256};

/// Kraken private endpoint signer
#[derive(Debug, Clone, Copy, Default)]
pub struct KrakenSigner;

impl Signer for KrakenSigner {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Kraken
    }

    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        nonce: Nonce,
    ) -> Result<SignatureArtifacts> {
        let additions = Params::new().with("nonce", nonce.to_string());
        let postdata = Params::signed_payload(&additions, request.params).encode(request.encoding);

        let mut inner = Sha256::new();
        inner.update(nonce.to_string().as_bytes());
        inner.update(postdata.as_bytes());

        let mut message = request.path.as_bytes().to_vec();
        message.extend_from_slice(&inner.finalize());

        let secret = decode_base64_secret(self.exchange(), credentials.secret().expose())?;
        let signature = hmac_digest(self.exchange(), HashAlgo::Sha512, &secret, &message)?;

        Ok(SignatureArtifacts {
            headers: vec![
                ("API-Key".to_string(), credentials.key().to_string()),
                ("API-Sign".to_string(), b64(&signature)),
            ],
            body_additions: additions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Encoding, Method};
    use pretty_assertions::assert_eq;

    fn sign(path: &str, params: &Params, nonce: u64) -> Result<SignatureArtifacts> {
        let credentials = Credentials::new("AK1", "deadbeef", vec![])?;
        let url = format!("https://api.kraken.com{path}");
        let request = SigningRequest {
            method: Method::Post,
            url: &url,
            path,
            params,
            encoding: Encoding::Form,
        };
        KrakenSigner.sign(&request, &credentials, Nonce::from_raw(nonce))
    }

    #[test]
    fn test_known_signature() -> Result<()> {
        let artifacts = sign("/0/private/Balance", &Params::new(), 100)?;
        assert_eq!(artifacts.header("API-Key"), Some("AK1"));
        assert_eq!(
            artifacts.header("API-Sign"),
            Some("j76ohbhnbl2hwyczhHDrqSBQdWQ9DICWB2m42iirR6jn465hcKnufmMnrTlLRJHnF69QM5AfP2JSU1APy3y9sQ==")
        );
        assert_eq!(artifacts.body_additions.to_form(), "nonce=100");
        Ok(())
    }

    #[test]
    fn test_params_are_signed_after_nonce() -> Result<()> {
        let params = Params::from([("pair", "XBTEUR"), ("type", "buy")]);
        let artifacts = sign("/0/private/AddOrder", &params, 100)?;
        assert_eq!(
            artifacts.header("API-Sign"),
            Some("u6oQLLPc+qs/fGXZGDF1tesxhOYqbPUwO1G1bHhHd8ry7axeGzZ+7vquZwsRxvqs92emnNS/z10cWrC+Y9QWXw==")
        );
        Ok(())
    }

    #[test]
    fn test_deterministic_and_nonce_sensitive() -> Result<()> {
        let params = Params::new();
        let first = sign("/0/private/Balance", &params, 100)?;
        let again = sign("/0/private/Balance", &params, 100)?;
        let next = sign("/0/private/Balance", &params, 101)?;
        assert_eq!(first, again);
        assert_ne!(first.header("API-Sign"), next.header("API-Sign"));
        Ok(())
    }

    #[test]
    fn test_secret_must_be_base64() -> Result<()> {
        let credentials = Credentials::new("AK1", "not base64!", vec![])?;
        let params = Params::new();
        let request = SigningRequest {
            method: Method::Post,
            url: "https://api.kraken.com/0/private/Balance",
            path: "/0/private/Balance",
            params: &params,
            encoding: Encoding::Form,
        };
        let err = KrakenSigner
            .sign(&request, &credentials, Nonce::from_raw(1))
            .expect_err("secret is not base64");
        assert!(matches!(err, common::Error::SignatureComputation { .. }));
        Ok(())
    }
}
