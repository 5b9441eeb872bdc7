use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Claims the service reads from an identity-provider access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Space separated OAuth scopes
    #[serde(default)]
    pub scope: String,
    pub exp: i64,
}

impl Claims {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == scope)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Token is missing required scope '{0}'")]
    MissingScope(String),

    #[error("Unable to load signing keys: {0}")]
    KeySet(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}

enum SigningKeys {
    /// HS256 shared secret, for local runs without the identity provider
    Shared(DecodingKey),
    /// RS256 public keys by key id
    KeySet(HashMap<String, DecodingKey>),
}

/// Verifies bearer tokens and enforces the required scope
pub struct TokenVerifier {
    keys: SigningKeys,
    validation: Validation,
    required_scope: String,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = match &self.keys {
            SigningKeys::Shared(_) => "shared",
            SigningKeys::KeySet(_) => "jwks",
        };
        f.debug_struct("TokenVerifier")
            .field("keys", &keys)
            .field("required_scope", &self.required_scope)
            .finish()
    }
}

impl TokenVerifier {
    pub fn with_secret(secret: &str, required_scope: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            keys: SigningKeys::Shared(DecodingKey::from_secret(secret.as_bytes())),
            validation,
            required_scope: required_scope.into(),
        }
    }

    /// Build from a published key set; tokens must come from `issuer`
    pub fn with_key_set(
        jwks: &JwkSet,
        issuer: &str,
        required_scope: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            let key = DecodingKey::from_jwk(jwk).map_err(|e| AuthError::KeySet(e.to_string()))?;
            keys.insert(kid, key);
        }

        if keys.is_empty() {
            return Err(AuthError::KeySet("key set contains no usable keys".to_string()));
        }

        // Access tokens from the user pool carry no audience claim
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_aud = false;
        validation.set_issuer(&[issuer]);

        Ok(Self {
            keys: SigningKeys::KeySet(keys),
            validation,
            required_scope: required_scope.into(),
        })
    }

    /// Download the key set once at startup
    pub async fn fetch(
        jwks_url: &str,
        issuer: &str,
        required_scope: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let jwks: JwkSet = reqwest::get(jwks_url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeySet(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeySet(e.to_string()))?;

        Self::with_key_set(&jwks, issuer, required_scope)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let key = match &self.keys {
            SigningKeys::Shared(key) => key,
            SigningKeys::KeySet(keys) => {
                let kid = decode_header(token)?
                    .kid
                    .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;
                keys.get(&kid)
                    .ok_or_else(|| AuthError::InvalidToken(format!("unknown key id {}", kid)))?
            }
        };

        let claims = decode::<Claims>(token, key, &self.validation)?.claims;

        if !claims.has_scope(&self.required_scope) {
            return Err(AuthError::MissingScope(self.required_scope.clone()));
        }

        Ok(claims)
    }
}
