use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

/// Minimum time between two fetches of the key set.
pub const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Authorization header must be 'Bearer <token>'")]
    MalformedHeader,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid audience")]
    InvalidAudience,
    #[error("Invalid issuer")]
    InvalidIssuer,
    #[error("Token signed with an unknown key")]
    UnknownKey,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Could not fetch signing keys: {0}")]
    KeyFetch(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            _ => AuthError::Invalid(e.to_string()),
        }
    }
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Verifies tokens against the JSON Web Key Set of an OpenID provider.
///
/// Keys are cached and the set is fetched again when a token names a `kid`
/// the cache does not know, which covers key rotation. Refetches happen at
/// most once per [`JWKS_REFRESH_INTERVAL`]; until then unknown keys are
/// rejected from the cache.
pub struct JwksVerifier {
    client: reqwest::Client,
    jwks_url: String,
    validation: Validation,
    keys: RwLock<KeyCache>,
}

#[derive(Default)]
struct KeyCache {
    set: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn key(&self, kid: &str) -> Option<Result<DecodingKey, AuthError>> {
        self.set
            .as_ref()
            .and_then(|set| set.find(kid))
            .map(|jwk| DecodingKey::from_jwk(jwk).map_err(AuthError::from))
    }

    fn may_refresh(&self) -> bool {
        self.fetched_at
            .map_or(true, |at| at.elapsed() >= JWKS_REFRESH_INTERVAL)
    }
}

impl JwksVerifier {
    pub fn new(
        jwks_url: impl Into<String>,
        issuer: &str,
        audience: &str,
        algorithms: Vec<Algorithm>,
    ) -> Self {
        let first = algorithms.first().copied().unwrap_or(Algorithm::RS256);
        let mut validation = Validation::new(first);
        if !algorithms.is_empty() {
            validation.algorithms = algorithms;
        }
        validation.set_audience(&[audience]);
        validation.set_issuer(&[issuer]);

        Self {
            client: reqwest::Client::new(),
            jwks_url: jwks_url.into(),
            validation,
            keys: RwLock::new(KeyCache::default()),
        }
    }

    pub fn for_auth0(domain: &str, audience: &str, algorithms: Vec<Algorithm>) -> Self {
        Self::new(
            format!("https://{}/.well-known/jwks.json", domain),
            &format!("https://{}/", domain),
            audience,
            algorithms,
        )
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;
        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.keys.read().await.key(kid) {
            return key;
        }

        let mut cache = self.keys.write().await;
        // another request may have refreshed while we waited for the lock
        if let Some(key) = cache.key(kid) {
            return key;
        }
        if !cache.may_refresh() {
            return Err(AuthError::UnknownKey);
        }

        // failed attempts count towards the interval too
        cache.fetched_at = Some(Instant::now());
        let set = self.fetch_keys().await?;
        tracing::debug!("Fetched {} signing keys from {}", set.keys.len(), self.jwks_url);
        cache.set = Some(set);

        cache.key(kid).unwrap_or(Err(AuthError::UnknownKey))
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(AuthError::UnknownKey)?;
        let key = self.decoding_key(&kid).await?;
        Ok(decode::<Claims>(token, &key, &self.validation)?.claims)
    }
}

/// HS256 tokens signed with a shared secret.
pub struct SecretVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SecretVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for SecretVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.key, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-signing-secret";

    fn token(claims: serde_json::Value, kid: Option<&str>) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(str::to_string);
        encode(&header, &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn test_secret_verifier() {
        let verifier = SecretVerifier::new(SECRET, Some("inventory"));

        let good = token(
            json!({"sub": "user-1", "exp": future_exp(), "aud": "inventory", "permissions": ["write:products"]}),
            None,
        );
        let claims = verifier.verify(&good).await.unwrap();
        assert_eq!(claims.sub, "user-1");

        let wrong_aud = token(json!({"sub": "u", "exp": future_exp(), "aud": "other"}), None);
        assert!(matches!(
            verifier.verify(&wrong_aud).await,
            Err(AuthError::InvalidAudience)
        ));

        let expired = token(json!({"sub": "u", "exp": 1_000_000, "aud": "inventory"}), None);
        assert!(matches!(
            verifier.verify(&expired).await,
            Err(AuthError::Expired)
        ));

        assert!(matches!(
            verifier.verify("not-a-jwt").await,
            Err(AuthError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_jwks_verifier_fetches_and_caches_keys() {
        let mut server = mockito::Server::new_async().await;
        let jwks = json!({
            "keys": [{
                "kty": "oct",
                "kid": "key-1",
                "alg": "HS256",
                "k": URL_SAFE_NO_PAD.encode(SECRET)
            }]
        });
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(jwks.to_string())
            .expect(1)
            .create_async()
            .await;

        let issuer = "https://tenant.example.com/";
        let verifier = JwksVerifier::new(
            format!("{}/.well-known/jwks.json", server.url()),
            issuer,
            "inventory",
            vec![Algorithm::HS256],
        );

        let claims = json!({"sub": "user-2", "exp": future_exp(), "aud": "inventory", "iss": issuer});
        let good = token(claims.clone(), Some("key-1"));
        assert_eq!(verifier.verify(&good).await.unwrap().sub, "user-2");
        // cached
        assert_eq!(verifier.verify(&good).await.unwrap().sub, "user-2");
        mock.assert_async().await;

        let wrong_issuer = token(
            json!({"sub": "u", "exp": future_exp(), "aud": "inventory", "iss": "https://evil/"}),
            Some("key-1"),
        );
        assert!(matches!(
            verifier.verify(&wrong_issuer).await,
            Err(AuthError::InvalidIssuer)
        ));

        let no_kid = token(claims, None);
        assert!(matches!(
            verifier.verify(&no_kid).await,
            Err(AuthError::UnknownKey)
        ));
    }

    #[tokio::test]
    async fn test_unknown_kids_do_not_refetch_within_interval() {
        let mut server = mockito::Server::new_async().await;
        let jwks = json!({
            "keys": [{
                "kty": "oct",
                "kid": "key-1",
                "alg": "HS256",
                "k": URL_SAFE_NO_PAD.encode(SECRET)
            }]
        });
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_header("content-type", "application/json")
            .with_body(jwks.to_string())
            .expect(1)
            .create_async()
            .await;

        let issuer = "https://tenant.example.com/";
        let verifier = JwksVerifier::new(
            format!("{}/.well-known/jwks.json", server.url()),
            issuer,
            "inventory",
            vec![Algorithm::HS256],
        );

        let claims = json!({"sub": "user-3", "exp": future_exp(), "aud": "inventory", "iss": issuer});
        for i in 0..20 {
            let forged = token(claims.clone(), Some(&format!("bogus-{}", i)));
            assert!(matches!(
                verifier.verify(&forged).await,
                Err(AuthError::UnknownKey)
            ));
        }

        // the single fetch still populated the cache
        let good = token(claims, Some("key-1"));
        assert_eq!(verifier.verify(&good).await.unwrap().sub, "user-3");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_fetch_is_throttled() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/.well-known/jwks.json")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let verifier = JwksVerifier::new(
            format!("{}/.well-known/jwks.json", server.url()),
            "https://tenant.example.com/",
            "inventory",
            vec![Algorithm::HS256],
        );
        let claims = json!({"sub": "u", "exp": future_exp(), "aud": "inventory"});

        let first = token(claims.clone(), Some("key-1"));
        assert!(matches!(
            verifier.verify(&first).await,
            Err(AuthError::KeyFetch(_))
        ));
        let second = token(claims, Some("key-2"));
        assert!(matches!(
            verifier.verify(&second).await,
            Err(AuthError::UnknownKey)
        ));
        mock.assert_async().await;
    }
}
