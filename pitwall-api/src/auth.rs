use crate::id::UserId;
use crate::{Client, Error, Result};

use ::http::StatusCode;
use serde::{Deserialize, Serialize};

pub struct AuthClient<'a> {
    client: &'a Client,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Signs in with the password grant using the given credentials. On
    /// success the client stores the token pair and the owner id from
    /// the token claims.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] when the request fails. Returns
    /// [`Error::Unauthorized`] when the credentials are incorrect.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let body = PasswordGrant { email, password };

        let req = self
            .client
            .request()
            .post()
            .uri("/auth/v1/token?grant_type=password")
            .body(&body)
            .build();

        let resp = match self.client.send(req).await {
            Ok(resp) => resp,
            // The auth endpoint reports bad credentials as 400.
            Err(Error::BadStatusCode(status)) if status == StatusCode::BAD_REQUEST => {
                return Err(Error::Unauthorized)
            }
            Err(err) => return Err(err),
        };

        let tokens = resp.json().await?;
        self.client.authorize(tokens)
    }

    /// Exchanges the stored refresh token for a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] when the request fails. Returns
    /// [`Error::Unauthorized`] if no refresh token is stored.
    pub async fn refresh(&self) -> Result<()> {
        let refresh_token = match self.client.refresh_token() {
            Some(token) => token,
            None => return Err(Error::Unauthorized),
        };

        let body = RefreshGrant { refresh_token };

        let req = self
            .client
            .request()
            .post()
            .uri("/auth/v1/token?grant_type=refresh_token")
            .body(&body)
            .build();

        let tokens = self.client.send(req).await?.json().await?;
        self.client.authorize(tokens)
    }
}

#[derive(Clone, Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Clone, Debug, Serialize)]
struct RefreshGrant {
    refresh_token: String,
}

/// The token pair returned by the gateway's auth endpoint. The
/// `access_token` authorizes requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// The tracked authorization state: the current token pair plus the
/// claims decoded from the access token.
#[derive(Clone, Debug, Default)]
pub struct Authorization {
    tokens: Option<TokenPair>,
    claims: Option<Claims>,
}

impl Authorization {
    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access_token.as_str())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.refresh_token.as_str())
    }

    /// The owner id (`sub` claim) of the signed in user.
    pub fn owner(&self) -> Option<&UserId> {
        self.claims.as_ref().map(|c| &c.sub)
    }

    pub(crate) fn update(&mut self, tokens: TokenPair) -> std::result::Result<(), JwtError> {
        self.claims = Some(Claims::decode(&tokens.access_token)?);
        self.tokens = Some(tokens);

        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.tokens = None;
        self.claims = None;
    }
}

/// The claims carried by the gateway's access token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the owner id.
    pub sub: UserId,
    /// Expiration time.
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub role: String,
}

impl Claims {
    /// Decodes the claims from the payload segment of a JWT. The
    /// signature is not verified; the gateway does that on every
    /// request, the client only needs the subject.
    pub fn decode(token: &str) -> std::result::Result<Self, JwtError> {
        let claims = token.split('.').nth(1).ok_or(JwtError::InvalidToken)?;
        let claims = base64::decode_config(claims, base64::URL_SAFE_NO_PAD)?;

        Ok(serde_json::from_slice(&claims)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("invalid token")]
    InvalidToken,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::Claims;

    #[test]
    fn test_claims_decode() {
        // Header and signature segments are ignored.
        let payload = base64::encode_config(
            br#"{"sub":"4f2c","exp":1700000000,"role":"authenticated"}"#,
            base64::URL_SAFE_NO_PAD,
        );
        let token = format!("eyJh.{}.sig", payload);

        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.sub.as_ref(), "4f2c");
        assert_eq!(claims.role, "authenticated");

        assert!(Claims::decode("notatoken").is_err());
    }
}
