use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::Mac;
use serde::{Deserialize, Serialize};

use crate::modules::error::Error;
use crate::modules::utils::time::get_current_timestamp;
use crate::{HmacSha256, SESSION_TOKEN_TTL, VERIFICATION_TOKEN_TTL};

/// The signed intent a token speaks for. A verification token can never
/// satisfy a session check, and vice versa.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Verification,
    Session,
}

impl TokenPurpose {
    /// Validity window from issuance, in seconds
    pub fn validity_secs(self) -> u64 {
        match self {
            TokenPurpose::Verification => VERIFICATION_TOKEN_TTL,
            TokenPurpose::Session => SESSION_TOKEN_TTL,
        }
    }
}

/// Claims payload carried inside each token
#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    purpose: TokenPurpose,
    iat: u64,
    exp: u64,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Issues and validates HS256-signed, time-bounded tokens.
///
/// Tokens are stateless: validity is entirely signature plus expiry.
/// Rotating the signing key invalidates everything outstanding, which
/// is acceptable for windows this short.
pub struct TokenService {
    signing_key: Vec<u8>,
}

impl TokenService {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            signing_key: signing_key.to_vec(),
        }
    }

    /// Issue a token for `subject` with the validity window of `purpose`.
    pub fn issue(&self, subject: &str, purpose: TokenPurpose) -> Result<String, Error> {
        self.issue_at(subject, purpose, get_current_timestamp())
    }

    /// Issue with an explicit issuance time. Expiry is `now + validity`.
    pub fn issue_at(
        &self,
        subject: &str,
        purpose: TokenPurpose,
        now: u64,
    ) -> Result<String, Error> {
        let header = Header {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            sub: subject.to_string(),
            purpose,
            iat: now,
            exp: now + purpose.validity_secs(),
        };

        let header_json = serde_json::to_vec(&header).map_err(|_| Error::InternalCryptoFailure)?;
        let claims_json = serde_json::to_vec(&claims).map_err(|_| Error::InternalCryptoFailure)?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );

        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|_| Error::InternalCryptoFailure)?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Validate signature, expiry and purpose; return the subject.
    ///
    /// Never returns a subject on any failure path: structural or
    /// signature problems are `TokenInvalid`, a good signature past its
    /// expiry is `TokenExpired`, a purpose mismatch is `TokenInvalid`.
    pub fn validate(&self, token: &str, expected: TokenPurpose) -> Result<String, Error> {
        self.validate_at(token, expected, get_current_timestamp())
    }

    /// Validate against an explicit clock reading.
    pub fn validate_at(
        &self,
        token: &str,
        expected: TokenPurpose,
        now: u64,
    ) -> Result<String, Error> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(Error::TokenInvalid);
        }

        let header_raw = URL_SAFE_NO_PAD
            .decode(parts[0])
            .map_err(|_| Error::TokenInvalid)?;
        let header: Header =
            serde_json::from_slice(&header_raw).map_err(|_| Error::TokenInvalid)?;
        if header.alg != "HS256" || header.typ != "JWT" {
            return Err(Error::TokenInvalid);
        }

        // Signature first: nothing in the payload is trusted before this
        let signing_input = format!("{}.{}", parts[0], parts[1]);
        let signature = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| Error::TokenInvalid)?;

        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|_| Error::InternalCryptoFailure)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Error::TokenInvalid)?;

        let claims_raw = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| Error::TokenInvalid)?;
        let claims: Claims =
            serde_json::from_slice(&claims_raw).map_err(|_| Error::TokenInvalid)?;

        if now > claims.exp {
            return Err(Error::TokenExpired);
        }
        if claims.purpose != expected {
            return Err(Error::TokenInvalid);
        }

        Ok(claims.sub)
    }
}
