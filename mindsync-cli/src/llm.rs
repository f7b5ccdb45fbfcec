use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::config::LlmSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    fn default_base_url(self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com",
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAI),
            other => bail!("unknown llm provider: {other} (expected openai or anthropic)"),
        }
    }
}

/// Blocking chat-completion client with a hard per-request timeout.
#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: Provider,
    model: String,
    base_url: String,
    api_key: String,
    temperature: f32,
    http: reqwest::Client,
}

impl LlmClient {
    /// `None` when the section is disabled.
    pub fn from_config(section: &LlmSection) -> Result<Option<Self>> {
        if !section.enabled {
            return Ok(None);
        }
        let provider: Provider = section.provider.parse()?;
        let api_key = section
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .context("llm is enabled but no api_key is configured (set [llm].api_key or MINDSYNC_API_KEY)")?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs.max(1)))
            .build()
            .context("build http client")?;
        let base_url = section
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());

        Ok(Some(Self {
            provider,
            model: section.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature: section.temperature,
            http,
        }))
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// One system prompt, one user message, text back.
    pub fn complete(&self, system: &str, user: &str) -> Result<String> {
        // Already inside the CLI's runtime: block_in_place + Handle::block_on.
        // Otherwise spin up a runtime for the call.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.complete_async(system, user)))
        } else {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(self.complete_async(system, user))
        }
    }

    async fn complete_async(&self, system: &str, user: &str) -> Result<String> {
        match self.provider {
            Provider::Anthropic => self.anthropic_complete(system, user).await,
            Provider::OpenAI => self.openai_complete(system, user).await,
        }
    }

    async fn anthropic_complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: i32,
            temperature: f32,
            system: &'a str,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &self.model,
            max_tokens: 600,
            temperature: self.temperature,
            system,
            messages: vec![Msg {
                role: "user",
                content: user,
            }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }

    async fn openai_complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
        };

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_section_builds_no_client() {
        assert!(LlmClient::from_config(&LlmSection::default()).unwrap().is_none());
    }

    #[test]
    fn test_enabled_without_key_is_an_error() {
        let section = LlmSection {
            enabled: true,
            ..LlmSection::default()
        };
        let err = LlmClient::from_config(&section).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_provider_and_base_url() {
        let section = LlmSection {
            enabled: true,
            provider: "Anthropic".into(),
            api_key: Some("k".into()),
            base_url: Some("http://localhost:8080/".into()),
            ..LlmSection::default()
        };
        let client = LlmClient::from_config(&section).unwrap().unwrap();
        assert_eq!(client.provider(), Provider::Anthropic);
        assert_eq!(client.base_url, "http://localhost:8080");

        assert!("mistral".parse::<Provider>().is_err());
    }
}
