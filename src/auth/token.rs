//! Signed session tokens (HS256 JWT).
//!
//! Layout: `base64url(header).base64url(claims).base64url(hmac)`, no
//! padding. The header's `kid` carries the key rotation epoch, so bumping
//! `JWT_KEY_EPOCH` retires every token issued under the previous key even
//! when the secret itself is unchanged.
//!
//! Tokens are stateless: validity is signature + epoch + expiry, nothing is
//! recorded server-side.

use crate::config::Config;
use crate::models::{now_secs, StoredUser, UserInfo};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Issued-at, UNIX seconds.
    pub iat: u64,
    /// Expiry, UNIX seconds. The token is dead at `now >= exp`.
    pub exp: u64,
}

impl Claims {
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.exp
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_secs())
    }

    pub fn user(&self) -> UserInfo {
        UserInfo {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
    kid: String,
}

/// A freshly issued token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Token signed with a retired key")]
    RetiredKey,

    #[error("Token expired")]
    Expired,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies tokens under one signing key and epoch.
pub struct TokenSigner {
    key: Zeroizing<Vec<u8>>,
    epoch: u32,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"[REDACTED]")
            .field("epoch", &self.epoch)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8], epoch: u32, ttl_secs: u64) -> Self {
        Self {
            key: Zeroizing::new(secret.to_vec()),
            epoch,
            ttl_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.jwt_key_epoch,
            config.token_ttl_secs,
        )
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a token for `user`, valid for the configured TTL from now.
    pub fn issue(&self, user: &StoredUser) -> Result<SessionToken, TokenError> {
        self.issue_at(user, now_secs())
    }

    pub fn issue_at(&self, user: &StoredUser, iat: u64) -> Result<SessionToken, TokenError> {
        let claims = Claims {
            user_id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        let token = self.sign(&claims)?;
        Ok(SessionToken { token, claims })
    }

    /// Sign arbitrary claims. Callers normally go through [`issue`](Self::issue).
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
            kid: self.epoch.to_string(),
        };
        let header_json =
            serde_json::to_vec(&header).map_err(|e| TokenError::Signing(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(claims).map_err(|e| TokenError::Signing(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify signature, epoch and expiry; return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, now_secs())
    }

    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let (header_b64, claims_b64, signature_b64) = split_token(token)?;

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed(format!(
                "unsupported algorithm {}",
                header.alg
            )));
        }
        if header.kid != self.epoch.to_string() {
            return Err(TokenError::RetiredKey);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::BadSignature)?;

        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_segment(claims_b64)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| TokenError::Signing(e.to_string()))
    }
}

/// Read the claims out of a token without checking its signature.
///
/// Used by the client, which trusts the token it stored. Expiry is not
/// checked here either; see [`Claims::is_expired`].
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let (_, claims_b64, _) = split_token(token)?;
    decode_segment(claims_b64)
}

fn split_token(token: &str) -> Result<(&str, &str, &str), TokenError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(claims), Some(signature), None)
            if !header.is_empty() && !claims.is_empty() && !signature.is_empty() =>
        {
            Ok((header, claims, signature))
        }
        _ => Err(TokenError::Malformed("expected three segments".to_string())),
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("invalid base64: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(format!("invalid JSON: {}", e)))
}
