use crate::error::FraudLensError;

fn default_base_url() -> String {
    "https://api.siliconflow.cn/v1".into()
}
fn default_chat_model() -> String {
    "Qwen/Qwen2.5-72B-Instruct".into()
}
fn default_audio_model() -> String {
    "FunAudioLLM/SenseVoiceSmall".into()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}
fn default_max_upload_mb() -> u64 {
    25
}

/// Runtime configuration, resolved from the environment at startup.
///
/// Only `SILICON_API_KEY` matters for production use; everything else has a
/// working default pointing at the SiliconFlow OpenAI-compatible endpoint.
#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the remote provider. May be empty; startup only warns.
    pub api_key: String,
    /// Base URL shared by the chat and transcription endpoints.
    pub base_url: String,
    pub chat_model: String,
    pub audio_model: String,
    pub temperature: f64,
    pub host: String,
    pub port: u16,
    /// Request body limit for the multipart upload route.
    pub max_upload_mb: u64,
}

fn env_string(key: &str, default: impl FnOnce() -> String) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default(),
    }
}

fn env_parse<T: std::str::FromStr>(
    key: &str,
    default: impl FnOnce() -> T,
) -> Result<T, FraudLensError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map_err(|_| FraudLensError::Config(format!("{key} has invalid value: {}", v.trim()))),
        _ => Ok(default()),
    }
}

impl Config {
    /// Load config from environment variables.
    pub fn load() -> Result<Self, FraudLensError> {
        let mut config = Config {
            api_key: std::env::var("SILICON_API_KEY").unwrap_or_default(),
            base_url: env_string("FRAUDLENS_BASE_URL", default_base_url),
            chat_model: env_string("FRAUDLENS_CHAT_MODEL", default_chat_model),
            audio_model: env_string("FRAUDLENS_AUDIO_MODEL", default_audio_model),
            temperature: env_parse("FRAUDLENS_TEMPERATURE", default_temperature)?,
            host: env_string("FRAUDLENS_HOST", default_host),
            port: env_parse("FRAUDLENS_PORT", default_port)?,
            max_upload_mb: env_parse("FRAUDLENS_MAX_UPLOAD_MB", default_max_upload_mb)?,
        };
        config.post_load()?;
        Ok(config)
    }

    /// Apply post-load normalization and validation.
    pub(crate) fn post_load(&mut self) -> Result<(), FraudLensError> {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            self.base_url = default_base_url();
        }
        if !(self.temperature.is_finite() && (0.0..=2.0).contains(&self.temperature)) {
            return Err(FraudLensError::Config(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.max_upload_mb == 0 {
            self.max_upload_mb = default_max_upload_mb();
        }
        Ok(())
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn transcription_url(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::env_lock;

    const ALL_VARS: &[&str] = &[
        "SILICON_API_KEY",
        "FRAUDLENS_BASE_URL",
        "FRAUDLENS_CHAT_MODEL",
        "FRAUDLENS_AUDIO_MODEL",
        "FRAUDLENS_TEMPERATURE",
        "FRAUDLENS_HOST",
        "FRAUDLENS_PORT",
        "FRAUDLENS_MAX_UPLOAD_MB",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let _guard = env_lock();
        clear_env();

        let config = Config::load().unwrap();
        assert_eq!(config.api_key, "");
        assert_eq!(config.base_url, "https://api.siliconflow.cn/v1");
        assert_eq!(config.chat_model, "Qwen/Qwen2.5-72B-Instruct");
        assert_eq!(config.audio_model, "FunAudioLLM/SenseVoiceSmall");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_upload_mb, 25);
    }

    #[test]
    fn test_env_overrides_and_url_normalization() {
        let _guard = env_lock();
        clear_env();
        std::env::set_var("SILICON_API_KEY", "sk-test");
        std::env::set_var("FRAUDLENS_BASE_URL", "http://localhost:9000/v1/");
        std::env::set_var("FRAUDLENS_PORT", "8080");

        let config = Config::load().unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(
            config.chat_url(),
            "http://localhost:9000/v1/chat/completions"
        );
        assert_eq!(
            config.transcription_url(),
            "http://localhost:9000/v1/audio/transcriptions"
        );
        assert_eq!(config.port, 8080);

        clear_env();
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let _guard = env_lock();
        clear_env();
        std::env::set_var("FRAUDLENS_TEMPERATURE", "9.5");
        let err = Config::load().unwrap_err();
        assert!(err.to_string().contains("temperature"));

        std::env::set_var("FRAUDLENS_TEMPERATURE", "warm");
        let err = Config::load().unwrap_err();
        assert!(err.to_string().contains("FRAUDLENS_TEMPERATURE"));

        clear_env();
    }

    #[test]
    fn test_zero_upload_limit_falls_back() {
        let _guard = env_lock();
        clear_env();
        std::env::set_var("FRAUDLENS_MAX_UPLOAD_MB", "0");
        let config = Config::load().unwrap();
        assert_eq!(config.max_upload_mb, 25);
        clear_env();
    }
}
