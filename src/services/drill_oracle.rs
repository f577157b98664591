use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;

/// A single generated practice question for one vocabulary word. The shape is
/// owned by the generation side; it passes through the cache verbatim but is
/// validated before storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrillProblem {
    #[serde(rename = "type")]
    pub kind: DrillKind,
    /// Full passage with the [underlined portion] marked.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlined_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_no_change: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DrillKind {
    Cloned,
    Pressure,
    #[serde(rename = "Edge Case")]
    EdgeCase,
}

impl DrillProblem {
    /// Shape check applied at the cache boundary before a drill is stored.
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("content is empty".to_string());
        }
        if self.options.is_empty() {
            return Err("options are empty".to_string());
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(format!(
                "correct answer {:?} is not among the options",
                self.correct_answer
            ));
        }
        if self.explanation.trim().is_empty() {
            return Err("explanation is empty".to_string());
        }
        Ok(())
    }

    /// Deterministic placeholder used by mock mode and tests.
    pub fn mock_for_word(word: &str) -> Self {
        Self {
            kind: DrillKind::Cloned,
            content: format!("The student approached the exam with [{}].", word),
            passage: None,
            underlined_text: Some(word.to_string()),
            question_text: Some(format!("Which word best replaces [{}]?", word)),
            options: vec![
                word.to_string(),
                "reluctance".to_string(),
                "confusion".to_string(),
                "indifference".to_string(),
            ],
            correct_answer: word.to_string(),
            explanation: format!("\"{}\" fits the sentence's positive framing.", word),
            explanation_summary: None,
            has_no_change: None,
            answer_labels: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("drill oracle is disabled")]
    Disabled,
    #[error("drill oracle request timed out")]
    Timeout,
    #[error("drill oracle network error: {0}")]
    Network(String),
    #[error("drill oracle api error: status={status}, message={message}")]
    Api { status: u16, message: String },
    #[error("drill oracle returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Narrow boundary to the drill-generation side. One batch call per missing
/// word set; retry and model-fallback policy live with the caller.
pub trait DrillOracle {
    fn generate_batch(
        &self,
        words: &[String],
    ) -> impl Future<Output = Result<HashMap<String, DrillProblem>, OracleError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpDrillOracle {
    config: OracleConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    words: &'a [String],
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    drills: HashMap<String, DrillProblem>,
}

impl HttpDrillOracle {
    pub fn new(config: &OracleConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config: config.clone(),
            client,
        }
    }

    fn mock_batch(words: &[String]) -> HashMap<String, DrillProblem> {
        words
            .iter()
            .map(|w| (w.to_lowercase(), DrillProblem::mock_for_word(w)))
            .collect()
    }
}

impl DrillOracle for HttpDrillOracle {
    async fn generate_batch(
        &self,
        words: &[String],
    ) -> Result<HashMap<String, DrillProblem>, OracleError> {
        if !self.config.enabled {
            return Err(OracleError::Disabled);
        }
        if self.config.mock {
            return Ok(Self::mock_batch(words));
        }

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&BatchRequest { words })
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Network(error.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: BatchResponse = response
            .json()
            .await
            .map_err(|error| OracleError::InvalidResponse(error.to_string()))?;

        Ok(parsed
            .drills
            .into_iter()
            .map(|(word, drill)| (word.to_lowercase(), drill))
            .collect())
    }
}
