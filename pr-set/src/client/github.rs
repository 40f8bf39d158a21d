//! GitHub implementation of the repository client.

use super::{
    pull_request_url, NewPullRequest, RemoteError, RemotePullRequest, RepositoryClient,
};
use crate::change_set::RepositoryKey;
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, info};
use url::Url;

/// Repository client backed by an authenticated [`Octocrab`] session.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Builds a client authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(token: &str) -> Result<Self, octocrab::Error> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;
        Ok(Self::from_octocrab(octocrab))
    }

    /// Wraps an existing session, e.g. one pointed at a GitHub Enterprise host.
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Checks the credentials, returning the authenticated login.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected.
    pub async fn login(&self) -> Result<String, RemoteError> {
        let user = self.octocrab.current().user().await?;
        info!(login = %user.login, "Authenticated with GitHub");
        Ok(user.login)
    }
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    async fn create_pull_request(
        &self,
        request: NewPullRequest<'_>,
    ) -> Result<RemotePullRequest, RemoteError> {
        let repository = request.repository;
        debug!(repo = %repository, head = request.head, base = request.base, "Creating pull request");

        let pr = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .create(request.title, request.head, request.base)
            .body(request.body)
            .draft(request.draft)
            .send()
            .await?;

        Ok(RemotePullRequest {
            number: pr.number,
            url: html_url(repository, pr.number, pr.html_url.as_ref()),
        })
    }

    async fn update_pull_request(
        &self,
        repository: &RepositoryKey,
        number: u64,
        body: &str,
    ) -> Result<String, RemoteError> {
        debug!(repo = %repository, number, "Updating pull request body");

        let pr = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .update(number)
            .body(body)
            .send()
            .await?;

        Ok(html_url(repository, pr.number, pr.html_url.as_ref()))
    }

    async fn request_reviewers(
        &self,
        repository: &RepositoryKey,
        number: u64,
        reviewers: &[String],
    ) -> Result<String, RemoteError> {
        debug!(repo = %repository, number, ?reviewers, "Requesting reviewers");

        let pr = self
            .octocrab
            .pulls(&repository.owner, &repository.name)
            .request_reviews(number, reviewers.to_vec(), Vec::<String>::new())
            .await?;

        Ok(html_url(repository, number, Some(&pr.html_url)))
    }
}

/// Prefers the URL GitHub reports, which carries the host of the session.
fn html_url(repository: &RepositoryKey, number: u64, reported: Option<&Url>) -> String {
    reported
        .map(Url::to_string)
        .unwrap_or_else(|| pull_request_url(repository, number))
}
