use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated account
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: impl Into<String>, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: username.into(),
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidEmailClaim,
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidEmailClaim => write!(f, "Token carries an invalid email address"),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Whether `raw` is usable as an account email: RFC 5322 syntax with a
/// dotted domain.
pub fn is_valid_email(raw: &str) -> bool {
    let dotted_domain = raw.rsplit_once('@').is_some_and(|(_, domain)| domain.contains('.'));
    dotted_domain && email_address::EmailAddress::is_valid(raw)
}

/// Identity proven by a verified bearer token
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub username: String,
    pub email: Option<String>,
}

/// Who is making the current request. Inserted into request extensions by
/// the authentication middleware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(AuthUser),
}

impl Caller {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Caller::User(user) => Some(user),
            Caller::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::User(_))
    }

    /// Email to attribute created records to; none for anonymous callers.
    pub fn email(&self) -> Option<&str> {
        self.user().and_then(|u| u.email.as_deref())
    }
}

/// HS256 token verifier (and development issuer) over a shared secret.
#[derive(Clone)]
pub struct Authenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
    secret_configured: bool,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
            secret_configured: !secret.is_empty(),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    pub fn issue(&self, username: &str, email: Option<&str>) -> Result<String, JwtError> {
        if !self.secret_configured {
            return Err(JwtError::InvalidSecret);
        }

        let claims = Claims::new(username, email.map(str::to_string), self.expiry_hours);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Validate signature and expiry, then turn the claims into an identity.
    /// A blank email claim means the account has no email.
    pub fn verify(&self, token: &str) -> Result<AuthUser, JwtError> {
        if !self.secret_configured {
            return Err(JwtError::InvalidSecret);
        }

        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        let email = match data.claims.email {
            Some(email) if email.trim().is_empty() => None,
            Some(email) if is_valid_email(&email) => Some(email),
            Some(_) => return Err(JwtError::InvalidEmailClaim),
            None => None,
        };

        Ok(AuthUser { username: data.claims.sub, email })
    }
}
