//! The single HTTP gateway to the TaskForge API.
//!
//! Every call made by the services goes through [`ApiClient::request`], which
//! reads the current token from the [`SessionStore`] while the request is
//! being built and attaches it as a bearer credential. Responses are observed
//! in one place: successes pass through untouched, failures are logged and
//! handed back as [`AppError::Remote`] or [`AppError::Transport`]. Nothing is
//! retried and a 401 does not end the session.

use crate::config::Config;
use crate::error::{AppError, RemoteError, RemotePayload, Result};
use crate::session::SessionStore;
use log::{debug, error};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Builds the client from configuration, applying the optional timeout.
    pub fn from_config(config: &Config, session: SessionStore) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts a request with the current session token already attached.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        self.authorize(builder, path)
    }

    fn authorize(&self, builder: RequestBuilder, path: &str) -> RequestBuilder {
        match self.session.read_token() {
            Some(token) => {
                debug!("Attaching bearer credential to request for {}", path);
                builder.bearer_auth(token)
            }
            None => {
                debug!("No session token, sending request for {} unauthenticated", path);
                builder
            }
        }
    }

    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Response> {
        let url = self.url(path);
        match builder.send().await {
            Ok(response) if response.status().is_success() => {
                debug!("{} {} -> {}", method, url, response.status());
                Ok(response)
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                let remote = RemoteError::new(status, RemotePayload::from_body(&body));
                error!("{} {} failed: {}", method, url, remote);
                Err(AppError::Remote(remote))
            }
            Err(e) => {
                error!("{} {} failed without a response: {}", method, url, e);
                Err(AppError::Transport(e.to_string()))
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path);
        let response = self.send(Method::GET, path, builder).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).json(body);
        let response = self.send(Method::POST, path, builder).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path).json(body);
        let response = self.send(Method::PUT, path, builder).await?;
        Ok(response.json::<T>().await?)
    }

    /// Sends a DELETE; the response body, if any, is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder).await?;
        Ok(())
    }
}
