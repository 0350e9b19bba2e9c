//! # pitwall-api
//!
//! The client for the hosted persistence gateway: a managed relational
//! store fronted by a REST layer with row level authentication. The
//! crate exposes one [`Client`] and scoped accessors per table, plus the
//! [`sync`] module that round-trips a whole
//! [`BracketEngine`](pitwall_core::BracketEngine) through the gateway.
//!
//! Authentication is delegated entirely to the gateway; this crate only
//! tracks the current access token and the owner id recovered from it.

pub mod auth;
pub mod http;
pub mod id;
pub mod setups;
pub mod tournaments;

pub use tournaments::sync;

use auth::{AuthClient, Authorization, TokenPair};
use crate::http::{Request, RequestBuilder, Response};
use id::UserId;
use setups::{CarsClient, SetupsClient};
use tournaments::TournamentsClient;

use std::result;
use std::sync::{Arc, RwLock};

use ::http::StatusCode;
use thiserror::Error;

/// A `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] http::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Jwt(#[from] auth::JwtError),
    #[error(transparent)]
    Engine(#[from] pitwall_core::Error),
    #[error("bad status code: {0}")]
    BadStatusCode(StatusCode),
    /// The gateway rejected the credentials or the token expired.
    #[error("unauthorized")]
    Unauthorized,
    /// An operation that requires an owner was attempted with nobody
    /// signed in. Raised locally, before any network call.
    #[error("not signed in")]
    Unauthenticated,
    #[error("not found")]
    NotFound,
}

/// A client for the persistence gateway.
///
/// The client is cheap to clone; clones share the authorization state.
#[derive(Clone, Debug)]
pub struct Client {
    http: http::Client,
    base_url: String,
    api_key: String,
    inner: Arc<RwLock<ClientInner>>,
}

#[derive(Debug, Default)]
struct ClientInner {
    authorization: Authorization,
}

impl Client {
    /// Creates a new `Client` against `base_url` using the project's
    /// publishable `api_key`.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: http::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            inner: Arc::new(RwLock::new(ClientInner::default())),
        }
    }

    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(self)
    }

    pub fn tournaments(&self) -> TournamentsClient<'_> {
        TournamentsClient::new(self)
    }

    pub fn setups(&self) -> SetupsClient<'_> {
        SetupsClient::new(self)
    }

    pub fn cars(&self) -> CarsClient<'_> {
        CarsClient::new(self)
    }

    /// The id of the currently authenticated owner, or `None`.
    pub fn owner(&self) -> Option<UserId> {
        self.inner.read().unwrap().authorization.owner().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.owner().is_some()
    }

    pub(crate) fn request(&self) -> RequestBuilder {
        let inner = self.inner.read().unwrap();

        RequestBuilder::new(
            self.base_url.clone(),
            &self.api_key,
            inner.authorization.access_token(),
        )
    }

    /// Sends the request and maps non-success status codes onto
    /// [`enum@Error`].
    pub(crate) async fn send(&self, request: Request) -> Result<Response> {
        let resp = self.http.send(request).await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(Error::Unauthorized)
        } else {
            log::debug!("Gateway returned {}", status);
            Err(Error::BadStatusCode(status))
        }
    }

    pub(crate) fn authorize(&self, tokens: TokenPair) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.authorization.update(tokens)?;

        Ok(())
    }

    pub(crate) fn refresh_token(&self) -> Option<String> {
        let inner = self.inner.read().unwrap();
        inner.authorization.refresh_token().map(ToOwned::to_owned)
    }

    /// Drops the stored tokens, returning the client to the anonymous
    /// state.
    pub fn sign_out(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.authorization.clear();
    }
}
