use crate::api::models::{AnalysisResult, MatchedArticle};
use crate::view::{Element, Node};

pub const IDLE_MESSAGE: &str = "Paste a news article above and press Check.";
pub const CHECKING_MESSAGE: &str = "Checking...";

/// What the result panel currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultPanel {
    #[default]
    Idle,
    Checking,
    Success(Box<AnalysisResult>),
    Error(String),
}

/// CSS class for a result category badge. Matching is exact.
pub fn result_class(value: &str) -> &'static str {
    match value {
        "Real" => "result-real",
        "Fake" => "result-fake",
        _ => "result-unverified",
    }
}

/// Panel variant for a verdict; case-insensitive on `result`.
pub fn panel_variant(result: Option<&str>) -> &'static str {
    let result = result.unwrap_or_default();
    if result.eq_ignore_ascii_case("real") {
        "verified"
    } else if result.eq_ignore_ascii_case("fake") {
        "fake"
    } else {
        "suspicious"
    }
}

pub fn result_panel(panel: &ResultPanel) -> Element {
    let (variant, body): (&str, Vec<Node>) = match panel {
        ResultPanel::Idle => ("idle", vec![IDLE_MESSAGE.into()]),
        ResultPanel::Checking => ("checking", vec![CHECKING_MESSAGE.into()]),
        ResultPanel::Error(message) => ("error", vec![message.as_str().into()]),
        ResultPanel::Success(result) => (panel_variant(result.result.as_deref()), success_rows(result)),
    };

    Element::new("div")
        .id("result")
        .class(format!("result {}", variant))
        .children(body)
}

fn success_rows(data: &AnalysisResult) -> Vec<Node> {
    let category = data.result.as_deref().unwrap_or("Unverified");
    let confidence = data
        .confidence
        .map(|c| format!("{:.2}%", c * 100.0))
        .unwrap_or_else(|| "N/A".to_string());
    let similarity = data
        .similarity
        .as_ref()
        .and_then(|s| s.best)
        .map(|best| format!("{:.4}", best))
        .unwrap_or_else(|| "N/A".to_string());
    let articles_checked = data
        .official_articles_checked
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    vec![
        row("Final Decision", data.decision_label().unwrap_or_default()),
        row(
            "Result Category",
            Element::new("span").class(result_class(category)).text(category),
        ),
        row("Verification Method", or_na(data.verification_method.as_deref())),
        row("Reasoning", or_na(data.reasoning.as_deref())),
        row("ML Confidence", confidence),
        row(
            "Source Domain",
            data.source_domain
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("Not provided"),
        ),
        row("Best Similarity Score", similarity),
        row("Decision Path", or_na(data.decision_path.as_deref())),
        row("Official Articles Checked", articles_checked),
        matched_article(data.matched_article.as_ref()),
        row("Keywords", joined_or_na(&data.keywords)),
        row("Entities", joined_or_na(&data.entities)),
    ]
}

fn row(label: &str, value: impl Into<Node>) -> Node {
    Element::new("div")
        .child(Element::new("strong").text(format!("{}:", label)))
        .text(" ")
        .child(value)
        .into()
}

fn matched_article(article: Option<&MatchedArticle>) -> Node {
    match article {
        Some(article) if is_web_link(&article.link) => row(
            "Matched Article",
            Element::new("a")
                .attr("href", article.link.as_str())
                .attr("target", "_blank")
                .attr("rel", "noopener noreferrer")
                .text(article.title.as_str()),
        ),
        Some(article) => row("Matched Article", article.title.as_str()),
        None => row("Matched Article", "Not found"),
    }
}

/// Only http(s) links become anchors; anything else (`javascript:` etc.) renders as text.
fn is_web_link(link: &str) -> bool {
    let lower = link.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|s| !s.is_empty()).unwrap_or("N/A")
}

fn joined_or_na(values: &[String]) -> String {
    if values.is_empty() {
        "N/A".to_string()
    } else {
        values.join(", ")
    }
}
