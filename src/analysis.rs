//! AI lens: document OCR and classification through the Gemini
//! `generateContent` endpoint.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{Error, Result};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const OCR_PROMPT: &str = "Extract all text from this image and format it into a professional \
Word-style document layout in Markdown. Only return the text content.";

const ANALYZE_PROMPT: &str = "Analyze this document image. Identify if it is an M-PESA receipt, \
an ID card, a business invoice, or general text. Provide a brief summary and extract key \
entities like 'Transaction ID', 'Amount', 'Date', or 'Name' if applicable.";

pub const NO_TEXT: &str = "No text could be extracted.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub value: String,
}

/// Structured answer of the classification call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub category: String,
    pub summary: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

pub trait DocumentAnalyzer: Send + Sync {
    /// OCR the image into markdown text.
    fn extract_text(&self, image: &[u8]) -> Result<String>;

    /// Classify the document and pull out key entities.
    fn analyze(&self, image: &[u8]) -> Result<DocumentAnalysis>;
}

pub fn image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/png"
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenated text of the first candidate, if any.
pub fn response_text(body: &str) -> Result<Option<String>> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| Error::AnalysisFailed(format!("unexpected response: {e}")))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    Ok(if text.trim().is_empty() { None } else { Some(text) })
}

/// Parse the JSON document the model was asked to produce.
pub fn parse_analysis(text: &str) -> Result<DocumentAnalysis> {
    serde_json::from_str(text.trim())
        .map_err(|_| Error::AnalysisFailed("Failed to parse AI response".to_string()))
}

pub struct GeminiAnalyzer {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl GeminiAnalyzer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| Error::Config("no Gemini API key set (GEMINI_API_KEY)".to_string()))?;
        // Analysis uploads an image and waits for generation; give it more room.
        Self::new(key, config.gemini_model.clone(), config.http_timeout * 6)
    }

    fn generate(&self, image: &[u8], prompt: &str, generation_config: serde_json::Value) -> Result<Option<String>> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": image_mime(image), "data": B64.encode(image) } },
                    { "text": prompt }
                ]
            }],
            "generationConfig": generation_config,
        });

        let url = format!("{BASE_URL}/{}:generateContent", self.model);
        debug!(model = %self.model, bytes = image.len(), "calling generateContent");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::AnalysisFailed(e.to_string()))?;
        let text = response
            .text()
            .map_err(|e| Error::AnalysisFailed(e.to_string()))?;
        response_text(&text)
    }
}

impl DocumentAnalyzer for GeminiAnalyzer {
    fn extract_text(&self, image: &[u8]) -> Result<String> {
        let text = self.generate(image, OCR_PROMPT, json!({ "temperature": 0.1 }))?;
        info!("ocr finished");
        Ok(text.unwrap_or_else(|| NO_TEXT.to_string()))
    }

    fn analyze(&self, image: &[u8]) -> Result<DocumentAnalysis> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "category": { "type": "STRING", "description": "Type of document detected" },
                "summary": { "type": "STRING", "description": "A one-sentence summary of the document content" },
                "entities": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "label": { "type": "STRING" },
                            "value": { "type": "STRING" }
                        },
                        "required": ["label", "value"]
                    }
                }
            },
            "required": ["category", "summary", "entities"]
        });
        let text = self
            .generate(
                image,
                ANALYZE_PROMPT,
                json!({ "responseMimeType": "application/json", "responseSchema": schema }),
            )?
            .ok_or_else(|| Error::AnalysisFailed("empty response".to_string()))?;
        let analysis = parse_analysis(&text)?;
        info!(category = %analysis.category, entities = analysis.entities.len(), "analysis finished");
        Ok(analysis)
    }
}
