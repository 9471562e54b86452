use reqwest::multipart;

use crate::config::Config;
use crate::error::FraudLensError;

/// Submit a whole recording to the speech-to-text endpoint and return the
/// transcript text.
pub async fn transcribe_audio(
    http: &reqwest::Client,
    config: &Config,
    audio_bytes: Vec<u8>,
) -> Result<String, FraudLensError> {
    let part = multipart::Part::bytes(audio_bytes)
        .file_name("recording.mp3")
        .mime_str("audio/mpeg")
        .map_err(|e| FraudLensError::Transcription(e.to_string()))?;

    let form = multipart::Form::new()
        .text("model", config.audio_model.clone())
        .part("file", part);

    let mut req = http.post(config.transcription_url()).multipart(form);
    if !config.api_key.trim().is_empty() {
        req = req.header("Authorization", format!("Bearer {}", config.api_key));
    }
    let resp = req.send().await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(FraudLensError::Transcription(format!(
            "HTTP {status}: {body}"
        )));
    }

    let body: serde_json::Value = resp.json().await.map_err(|e| {
        FraudLensError::Transcription(format!("failed to parse transcription response: {e}"))
    })?;

    body.get("text")
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            FraudLensError::Transcription("transcription response missing 'text' field".into())
        })
}
