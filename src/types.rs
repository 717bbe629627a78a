use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Real,
    Fake,
    InsufficientText,
    AnalysisError,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "REAL",
            Verdict::Fake => "FAKE",
            Verdict::InsufficientText => "INSUFFICIENT_TEXT",
            Verdict::AnalysisError => "ANALYSIS_ERROR",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the core pipeline for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub verdict: Verdict,
    pub confidence: String,
    pub analyzed_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub verdict: Verdict,
    pub confidence: String,
    pub analyzed_text: String,
    pub model_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub request_id: Uuid,
    pub verdict: Verdict,
    pub confidence: String,
    pub analyzed_text: String,
    pub url: String,
    pub markup: String,
    pub model_version: String,
}

/// Accepts any JSON value; anything that is not a string reads as "".
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_wire_names() {
        assert_eq!(serde_json::to_string(&Verdict::InsufficientText).unwrap(), "\"INSUFFICIENT_TEXT\"");
        assert_eq!(serde_json::to_string(&Verdict::AnalysisError).unwrap(), "\"ANALYSIS_ERROR\"");
        assert_eq!(Verdict::Real.to_string(), "REAL");
    }

    #[test]
    fn test_predict_request_tolerates_non_strings() {
        let req: PredictRequest = serde_json::from_str(r#"{"title": null, "body": 42}"#).unwrap();
        assert_eq!(req.title, "");
        assert_eq!(req.body, "");

        let req: PredictRequest = serde_json::from_str(r#"{"body": "texto"}"#).unwrap();
        assert_eq!(req.title, "");
        assert_eq!(req.body, "texto");
    }
}
