use super::error::{self, Error};
use super::register;
use crate::csrf;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Client for the registration API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Client {
    /// The server to connect to, e.g. `https://accounts.your-domain.com`. Any
    /// path (like `https://your-domain.com/accounts`) is kept as a prefix for
    /// every endpoint.
    pub server: String,
}

impl Client {
    /// Construct a new client
    pub fn new(server: String) -> Self {
        Self { server }
    }

    /// Build the full URL for a path on the server, underneath whatever path
    /// the server URL already has.
    ///
    /// ## Errors
    ///
    /// Fails if the server isn't an absolute URL.
    pub fn url(&self, path: &str) -> error::Result<Url> {
        let mut base = Url::parse(&self.server)?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }

        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// Submit the registration form. The submission is sent as a multipart
    /// body, with its CSRF token copied into the `X-CSRFToken` header.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn register(
        &self,
        client: &reqwest::Client,
        req: &register::Req,
    ) -> error::Result<register::Resp> {
        let url = self.url(register::PATH)?;

        tracing::debug!(%url, fields = req.fields().count(), "submitting registration");

        Self::handle_response(
            client
                .post(url)
                .header(register::CSRF_HEADER, req.csrf_token())
                .multipart(req.to_multipart()),
        )
        .await
    }

    /// Fetch the registration page and pull the CSRF token out of it. Use a
    /// client with a cookie store so the session the token belongs to sticks
    /// around for `register`.
    ///
    /// ## Errors
    ///
    /// - `Error::Status` if the server didn't return the page successfully
    /// - `Error::Http` if the server couldn't be reached
    pub async fn csrf_token(&self, client: &reqwest::Client) -> error::Result<Option<String>> {
        let url = self.url(register::PATH)?;

        let resp = client.get(url).send().await?;
        let status = resp.status();

        if status.is_success() {
            let page = resp.text().await?;
            Ok(csrf::extract_token(&page))
        } else {
            Err(Error::Status(status))
        }
    }

    /// Convert an HTTP response into a result.
    ///
    /// ## Errors
    ///
    /// - `Ok(..)` if the server returned a success (2xx) with a body we could
    ///   decode
    /// - `Error::Status` if the server returned anything else
    /// - `Error::Http` if the request didn't complete or the body didn't decode
    async fn handle_response<T>(resp: reqwest::RequestBuilder) -> error::Result<T>
    where
        T: DeserializeOwned,
    {
        let resp = resp.send().await?;

        let status = resp.status();

        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            Err(Error::Status(status))
        }
    }
}
