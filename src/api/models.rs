use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub text: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Similarity {
    pub best: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatchedArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
}

/// Verdict returned by the backend. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisResult {
    pub result: Option<String>,
    pub final_label: Option<String>,
    pub prediction: Option<String>,
    pub confidence: Option<f64>,
    pub source_domain: Option<String>,
    pub similarity: Option<Similarity>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    pub matched_article: Option<MatchedArticle>,
    pub verification_method: Option<String>,
    pub reasoning: Option<String>,
    pub decision_path: Option<String>,
    pub official_articles_checked: Option<u32>,
}

impl AnalysisResult {
    /// Label shown as the final decision, falling back to the raw model prediction.
    pub fn decision_label(&self) -> Option<&str> {
        self.final_label
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.prediction.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub news_summary: String,
    pub source_url: Option<String>,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub method: String,
}

/// Response of `GET /history`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub items: Vec<HistoryRecord>,
    pub page: Option<u32>,
}

/// Query of `GET /history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    pub limit: u32,
    pub result: Option<ResultCategory>,
}

impl HistoryQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(result) = self.result {
            params.push(("result", result.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCategory {
    Real,
    Fake,
    Unverified,
}

impl ResultCategory {
    pub const ALL: [ResultCategory; 3] = [ResultCategory::Real, ResultCategory::Fake, ResultCategory::Unverified];

    pub fn as_str(self) -> &'static str {
        match self {
            ResultCategory::Real => "Real",
            ResultCategory::Fake => "Fake",
            ResultCategory::Unverified => "Unverified",
        }
    }

    /// Parses a filter select value; the empty string means "no filter".
    pub fn parse_filter(value: &str) -> Result<Option<Self>, UnknownCategory> {
        match value.trim() {
            "" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown result category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ResultCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Real" => Ok(ResultCategory::Real),
            "Fake" => Ok(ResultCategory::Fake),
            "Unverified" => Ok(ResultCategory::Unverified),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body the backend sends with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct BackendErrorBody {
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_analysis_response() {
        let json = r#"{
            "result": "Fake",
            "verification_method": "Machine Learning",
            "final_label": "Fake News (ML)",
            "prediction": "Fake",
            "reasoning": "No official match.",
            "decision_path": "ml_only",
            "confidence": 0.91,
            "source_domain": "example.com",
            "keywords": ["vaccine", "ban"],
            "entities": ["WHO"],
            "similarity": {"tfidf": 0.12, "embedding": 0.2, "best": 0.2},
            "matched_article": null,
            "official_articles_checked": 14
        }"#;
        let parsed: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.result.as_deref(), Some("Fake"));
        assert_eq!(parsed.similarity.unwrap().best, Some(0.2));
        assert_eq!(parsed.keywords, vec!["vaccine", "ban"]);
        assert!(parsed.matched_article.is_none());
        assert_eq!(parsed.official_articles_checked, Some(14));
    }

    #[test]
    fn decision_label_falls_back_to_prediction() {
        let result = AnalysisResult {
            final_label: Some(String::new()),
            prediction: Some("Real".into()),
            ..Default::default()
        };
        assert_eq!(result.decision_label(), Some("Real"));
    }

    #[test]
    fn history_page_defaults_missing_items() {
        let page: HistoryPage = serde_json::from_str(r#"{"page": 2}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page, Some(2));
    }

    #[test]
    fn query_params_include_filter_only_when_set() {
        let query = HistoryQuery { page: 3, limit: 10, result: None };
        assert_eq!(query.to_params(), vec![("page", "3".to_string()), ("limit", "10".to_string())]);

        let query = HistoryQuery { result: Some(ResultCategory::Unverified), ..query };
        assert_eq!(query.to_params().last(), Some(&("result", "Unverified".to_string())));
    }

    #[test]
    fn filter_values_parse() {
        assert_eq!(ResultCategory::parse_filter(""), Ok(None));
        assert_eq!(ResultCategory::parse_filter("Fake"), Ok(Some(ResultCategory::Fake)));
        assert!(ResultCategory::parse_filter("fake").is_err());
    }
}
