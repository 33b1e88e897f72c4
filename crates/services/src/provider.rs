use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use quiz_core::model::RawQuestion;

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://opentdb.com/api.php";
pub const DEFAULT_QUESTION_COUNT: u8 = 10;

/// Where question batches come from.
///
/// The runtime only ever talks to this trait; tests substitute scripted
/// sources for the real HTTP client.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch one batch of raw questions.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when no usable batch can be produced. The
    /// caller treats any error as "no questions available yet" and retries.
    async fn fetch(&self) -> Result<Vec<RawQuestion>, ProviderError>;
}

#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub base_url: String,
    pub amount: u8,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            amount: DEFAULT_QUESTION_COUNT,
        }
    }
}

impl ProviderConfig {
    /// Read overrides from the environment: `QUIZ_PROVIDER_BASE_URL` and
    /// `QUIZ_QUESTION_COUNT`. A count that does not parse to a positive
    /// number falls back to the default.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::BaseUrl` if an override URL does not parse.
    pub fn from_env() -> Result<Self, ProviderError> {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("QUIZ_PROVIDER_BASE_URL") {
            if !base_url.trim().is_empty() {
                Url::parse(&base_url)?;
                config.base_url = base_url;
            }
        }

        if let Ok(amount) = env::var("QUIZ_QUESTION_COUNT") {
            if let Ok(parsed) = amount.parse::<u8>() {
                if parsed > 0 {
                    config.amount = parsed;
                }
            }
        }

        Ok(config)
    }
}

/// Client for the Open Trivia Database.
#[derive(Clone)]
pub struct OpenTdbClient {
    client: Client,
    config: ProviderConfig,
}

impl OpenTdbClient {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build a client configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::BaseUrl` if the environment carries an
    /// unparseable base URL override.
    pub fn from_env() -> Result<Self, ProviderError> {
        Ok(Self::new(ProviderConfig::from_env()?))
    }
}

#[async_trait]
impl QuestionSource for OpenTdbClient {
    async fn fetch(&self) -> Result<Vec<RawQuestion>, ProviderError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("amount", u32::from(self.config.amount))])
            .query(&[("type", "multiple")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status()));
        }

        let body: TriviaResponse = response.json().await?;
        validate_batch(body)
    }
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: u8,
    results: Vec<RawQuestion>,
}

/// Check the Open Trivia DB envelope before handing the batch on.
///
/// A non-zero `response_code` means the API had nothing for us (rate limit,
/// empty category, bad token); an empty result list under code 0 is treated
/// the same way so the quiz never starts with zero questions.
fn validate_batch(body: TriviaResponse) -> Result<Vec<RawQuestion>, ProviderError> {
    if body.response_code != 0 {
        return Err(ProviderError::Api {
            code: body.response_code,
        });
    }
    if body.results.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(body.results)
}
