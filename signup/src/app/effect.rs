use super::Action;
use signup_core::{api, page, Submission, TimerId};
use std::time::Duration;

/// Connections to external services that effects use. We keep these around to
/// share connections (and the session cookie the CSRF token belongs to) across
/// the app as a whole.
pub struct EffectContext {
    /// an HTTP client with reqwest
    http: reqwest::Client,
}

impl EffectContext {
    /// Get a new `EffectContext`
    ///
    /// ## Errors
    ///
    /// Fails if the HTTP client can't be set up (e.g. no TLS backend.)
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().cookie_store(true).build()?,
        })
    }
}

/// Things that can happen as a result of user input. Side effects!
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    /// Read the CSRF token off the registration page
    FetchCsrfToken(api::Client),

    /// Send the registration form to the server
    Register(api::Client, Submission),

    /// Tell the page about this timer after a while
    StartTimer(TimerId, Duration),

    /// Never mind about that timer
    CancelTimer(TimerId),
}

impl Effect {
    /// Perform the side-effectful portions of this effect, returning the next
    /// `Action` the application needs to handle. Timers are the event loop's
    /// business, so they don't produce anything here.
    pub async fn run(self, conn: &EffectContext) -> Option<Action> {
        match self.run_inner(conn).await {
            Ok(action) => action,
            Err(problem) => {
                tracing::error!(?problem, "problem running effect");
                Some(Action::Problem(problem.to_string()))
            }
        }
    }

    /// The actual implementation of `run`, but with a `Result` wrapper to make
    /// it more ergonomic to write.
    async fn run_inner(self, conn: &EffectContext) -> Result<Option<Action>, Problem> {
        match self {
            Self::FetchCsrfToken(client) => {
                tracing::info!(server = %client.server, "fetching CSRF token");

                let token = client.csrf_token(&conn.http).await?;

                Ok(Some(Action::GotCsrfToken(token)))
            }

            Self::Register(client, req) => {
                tracing::info!(server = %client.server, "registering");

                // Failures here belong to the page, which decides what (if
                // anything) the user sees.
                let resp = client.register(&conn.http, &req).await;

                Ok(Some(Action::Page(page::Action::Responded(resp))))
            }

            Self::StartTimer(..) | Self::CancelTimer(_) => Ok(None),
        }
    }
}

/// Problems that can happen while running an `Effect`.
#[derive(Debug, thiserror::Error)]
pub enum Problem {
    /// We had a problem communicating with the server, for example due to a bad
    /// URL or the server being down.
    #[error("Problem communicating with the server: {0}")]
    Server(#[from] api::Error),
}
