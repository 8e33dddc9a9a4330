use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::GeminiConfig;
use crate::transcript::{MessageRecord, SentimentScores};

/// Scores message bodies by asking a Gemini model for VADER-style polarity.
pub struct GeminiScorer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PolarityResponse {
    pos: f64,
    neg: f64,
    neu: f64,
    compound: f64,
}

impl From<PolarityResponse> for SentimentScores {
    fn from(p: PolarityResponse) -> Self {
        SentimentScores::new(p.pos, p.neg, p.neu, p.compound)
    }
}

const SYSTEM_PROMPT: &str = r#"You are a sentiment scorer for chat messages, behaving like the VADER lexicon analyzer.

For the message you receive, return four scores:
- pos: proportion of the text that is positive, 0.0-1.0
- neg: proportion of the text that is negative, 0.0-1.0
- neu: proportion of the text that is neutral, 0.0-1.0
- compound: normalized overall polarity, -1.0 (most negative) to 1.0 (most positive)

pos + neg + neu should sum to approximately 1.0. Messages may mix English and Hindi written in Latin script; emoji carry sentiment. A message with no sentiment-bearing words is {"pos": 0.0, "neg": 0.0, "neu": 1.0, "compound": 0.0}.

Respond ONLY with JSON:
{"pos": <0.0-1.0>, "neg": <0.0-1.0>, "neu": <0.0-1.0>, "compound": <-1.0-1.0>}"#;

/// Pulls the polarity JSON out of a model reply, tolerating surrounding prose.
fn parse_polarity(text: &str) -> Result<SentimentScores> {
    let start = text.find('{').context("No JSON object in Gemini reply")?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .context("No JSON object in Gemini reply")?;
    let parsed: PolarityResponse = serde_json::from_str(&text[start..=end])
        .context("Failed to parse polarity JSON from Gemini")?;
    Ok(SentimentScores::from(parsed).clamped())
}

impl GeminiScorer {
    pub fn new(config: &GeminiConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        }
    }

    /// Scores every record and attaches the result. Failed requests leave that
    /// record unscored. Returns how many records were scored.
    pub async fn score_all(self: Arc<Self>, records: &mut [MessageRecord]) -> Result<usize> {
        info!(
            "Scoring {} messages (max_concurrent: {})",
            records.len(),
            self.semaphore.available_permits()
        );

        let mut tasks = JoinSet::new();
        for (index, record) in records.iter().enumerate() {
            let permit = self.semaphore.clone().acquire_owned().await?;
            let scorer = self.clone();
            let body = record.body.clone();

            tasks.spawn(async move {
                let scored = scorer.score(&body).await;
                drop(permit);
                (index, scored)
            });
        }

        let mut scored = 0;
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.context("Scoring task panicked")?;
            match result {
                Ok(scores) => {
                    records[index].attach_scores(scores);
                    scored += 1;
                }
                Err(e) => error!("Failed to score message {}: {:#}", index, e),
            }
        }

        if scored < records.len() {
            warn!("{} of {} messages left unscored", records.len() - scored, records.len());
        }
        Ok(scored)
    }

    pub async fn score(&self, body: &str) -> Result<SentimentScores> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let prompt = format!("{}\n\nMessage:\n\"{}\"", SYSTEM_PROMPT, body);

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: 100,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Gemini API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API returned {}: {}", status, body);
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text = gemini_resp
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.as_ref())
            .and_then(|p| p.first())
            .and_then(|p| p.text.as_ref())
            .context("Empty Gemini response")?;

        parse_polarity(text)
    }
}
