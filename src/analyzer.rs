use serde::{Deserialize, Serialize};

use crate::error::FraudLensError;
use crate::llm::LlmProvider;
use crate::text::strip_code_fences;

/// Fixed instructions for the anti-fraud analyst persona. The model is told
/// to answer with pure JSON matching [`Analysis`]; `response_format` on the
/// chat call reinforces this, and [`parse_analysis`] cleans up stray fences
/// anyway.
pub const SYSTEM_PROMPT: &str = r#"你是一名反电信诈骗专家。分析用户提供的通话文本。
请务必只返回纯 JSON 格式，不要包含 Markdown 标记（如 ```json）。
JSON 字段要求：
{
    "score": (0-100之间的整数，表示诈骗概率),
    "risk_level": ("低风险" | "中风险" | "极高风险"),
    "reasons": ["疑点1", "疑点2", "疑点3"],
    "advice": "给用户的简短建议"
}"#;

/// Categorical fraud-likelihood label, serialized with the labels the model
/// is instructed to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "低风险")]
    Low,
    #[serde(rename = "中风险")]
    Medium,
    #[serde(rename = "极高风险")]
    Critical,
}

/// The model's verdict, minus the transcript (which the handler injects).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Analysis {
    pub score: u8,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub advice: String,
}

/// Wire shape of a successful `/analyze` response.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub transcript: String,
}

/// Parse the assistant's raw reply into an [`Analysis`], tolerating Markdown
/// fences around the JSON.
pub fn parse_analysis(raw: &str) -> Result<Analysis, FraudLensError> {
    let clean = strip_code_fences(raw);
    serde_json::from_str(&clean)
        .map_err(|e| FraudLensError::LlmApi(format!("model returned malformed JSON: {e}")))
}

/// Run the working text through the chat model and parse its verdict.
pub async fn analyze_text(
    llm: &dyn LlmProvider,
    text: &str,
) -> Result<Analysis, FraudLensError> {
    let raw = llm.complete(SYSTEM_PROMPT, text).await?;
    parse_analysis(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_REPLY: &str = r#"{
        "score": 85,
        "risk_level": "极高风险",
        "reasons": ["冒充公检法", "要求转账到安全账户"],
        "advice": "立即挂断并拨打96110核实"
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let analysis = parse_analysis(VALID_REPLY).unwrap();
        assert_eq!(analysis.score, 85);
        assert_eq!(analysis.risk_level, RiskLevel::Critical);
        assert_eq!(analysis.reasons.len(), 2);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{VALID_REPLY}\n```");
        let analysis = parse_analysis(&fenced).unwrap();
        assert_eq!(analysis.score, 85);
    }

    #[test]
    fn test_parse_malformed_json_fails() {
        let err = parse_analysis("I think this call is a scam.").unwrap_err();
        assert!(err.to_string().contains("malformed JSON"));
    }

    #[test]
    fn test_parse_unknown_risk_level_fails() {
        let reply = r#"{"score": 1, "risk_level": "unknown", "reasons": [], "advice": ""}"#;
        assert!(parse_analysis(reply).is_err());
    }

    #[test]
    fn test_response_flattens_analysis_and_appends_transcript() {
        let analysis = parse_analysis(VALID_REPLY).unwrap();
        let response = AnalysisResponse {
            analysis,
            transcript: "你好，我是公安局的".into(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["score"], 85);
        assert_eq!(value["risk_level"], "极高风险");
        assert_eq!(value["transcript"], "你好，我是公安局的");
    }

    #[test]
    fn test_risk_level_labels_round_trip() {
        for (level, label) in [
            (RiskLevel::Low, "低风险"),
            (RiskLevel::Medium, "中风险"),
            (RiskLevel::Critical, "极高风险"),
        ] {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{label}\""));
            let back: RiskLevel = serde_json::from_str(&json).unwrap();
            assert_eq!(back, level);
        }
    }
}
