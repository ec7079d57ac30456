//! Boundary to the text/vision generation backend.
//!
//! The core only needs "prompt in, text out". [`TextGenerator`] is that seam.
//! [`HttpGenerator`] POSTs a Messages-API style request body to a hosted
//! model endpoint. [`CommandGenerator`] hands the same body to an external
//! program instead. Failures surface as [`Error::Generation`] without retries.

use crate::config::GenerationConfig;
use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

/// An image sent along with a prompt
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAttachment {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    /// Read a jpg/jpeg/png file
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let media_type = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            _ => {
                return Err(Error::Validation(format!(
                    "unsupported image type {:?} (expected jpg, jpeg or png)",
                    path
                )))
            }
        };
        Ok(Self {
            media_type: media_type.into(),
            data: std::fs::read(path)?,
        })
    }
}

/// A fully formed prompt, optionally with images
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub images: Vec<ImageAttachment>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(prompt: impl Into<String>, images: Vec<ImageAttachment>) -> Self {
        Self {
            prompt: prompt.into(),
            images,
        }
    }
}

/// Anything that turns a prompt into free text
pub trait TextGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub top_k: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub stop_sequences: Vec<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

impl MessagesRequest {
    pub fn build(config: &GenerationConfig, request: &GenerationRequest) -> Self {
        let mut content: Vec<ContentBlock> = request
            .images
            .iter()
            .map(|image| ContentBlock::Image {
                source: ImageSource {
                    kind: "base64".into(),
                    media_type: image.media_type.clone(),
                    data: STANDARD.encode(&image.data),
                },
            })
            .collect();
        content.push(ContentBlock::Text {
            text: request.prompt.clone(),
        });

        Self {
            anthropic_version: config.anthropic_version.clone(),
            max_tokens: config.max_tokens,
            top_k: config.top_k,
            temperature: config.temperature,
            top_p: config.top_p,
            stop_sequences: Vec::new(),
            messages: vec![Message {
                role: "user".into(),
                content,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Extract the first text block from a response body
pub fn parse_response(body: &str) -> Result<String> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| Error::Generation(format!("unparseable response: {}", e)))?;

    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| Error::Generation("response contained no text".into()))
}

// ============================================================================
// HTTP backend
// ============================================================================

/// Calls a hosted model over HTTP
#[derive(Clone, Debug)]
pub struct HttpGenerator {
    config: GenerationConfig,
    url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpGenerator {
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let url = config.endpoint_url().ok_or_else(|| {
            Error::Generation("no generation endpoint configured ([generation] endpoint)".into())
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Generation(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config: config.clone(),
            url,
            api_key: config.api_key(),
            client,
        })
    }
}

impl TextGenerator for HttpGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = MessagesRequest::build(&self.config, request);

        tracing::debug!(
            model = %self.config.model_id,
            url = %self.url,
            "Sending generation request"
        );

        let mut http = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().map_err(|e| {
            tracing::error!("Generation request failed: {}", e);
            Error::Generation(format!("request to generation endpoint failed: {}", e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::Generation(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!("Generation endpoint returned {}: {}", status, text);
            return Err(Error::Generation(format!(
                "generation endpoint returned {}: {}",
                status,
                text.trim()
            )));
        }

        let generated = parse_response(&text)?;
        tracing::info!("Generated {} characters", generated.len());
        Ok(generated)
    }
}

/// Pick the backend from config: the HTTP endpoint when set, otherwise the
/// external command.
pub fn generator_from_config(config: &GenerationConfig) -> Result<Box<dyn TextGenerator>> {
    if config.endpoint_url().is_some() {
        return Ok(Box::new(HttpGenerator::from_config(config)?));
    }
    if config.command.as_deref().is_some_and(|c| !c.trim().is_empty()) {
        return Ok(Box::new(CommandGenerator::from_config(config)?));
    }
    Err(Error::Generation(
        "no generation backend configured (set [generation] endpoint or command)".into(),
    ))
}

// ============================================================================
// External command backend
// ============================================================================

/// Runs a configured program per request
#[derive(Clone, Debug)]
pub struct CommandGenerator {
    config: GenerationConfig,
    program: String,
}

impl CommandGenerator {
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let program = config
            .command
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                Error::Generation("no generation command configured ([generation] command)".into())
            })?;
        Ok(Self {
            config: config.clone(),
            program,
        })
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = serde_json::to_vec(&MessagesRequest::build(&self.config, request))?;

        tracing::debug!(
            model = %self.config.model_id,
            program = %self.program,
            "Sending generation request ({} bytes)",
            body.len()
        );

        let mut child = Command::new(&self.program)
            .args(&self.config.args)
            .env("WELLNESS_MODEL_ID", &self.config.model_id)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Generation(format!("failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&body)
                .map_err(|e| Error::Generation(format!("failed to send request: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Generation(format!("generation command failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Generation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = parse_response(&String::from_utf8_lossy(&output.stdout))?;
        tracing::info!("Generated {} characters", text.len());
        Ok(text)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let config = GenerationConfig::default();
        let image = ImageAttachment {
            media_type: "image/png".into(),
            data: vec![1, 2, 3],
        };
        let request = GenerationRequest::with_images("what is this?", vec![image]);
        let body = serde_json::to_value(MessagesRequest::build(&config, &request)).unwrap();

        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(body["max_tokens"], 400);
        assert_eq!(body["top_k"], 250);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["type"], "image");
        assert_eq!(body["messages"][0]["content"][0]["source"]["data"], "AQID");
        assert_eq!(body["messages"][0]["content"][1]["type"], "text");
        assert_eq!(body["messages"][0]["content"][1]["text"], "what is this?");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"content":[{"type":"text","text":"Eat more greens"}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Eat more greens");

        let err = parse_response(r#"{"content":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));

        let err = parse_response("not json").unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn test_missing_command_is_generation_error() {
        let err = CommandGenerator::from_config(&GenerationConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn test_no_backend_configured() {
        let err = generator_from_config(&GenerationConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Generation(ref msg) if msg.contains("endpoint or command")));
    }

    fn http_config(server: &mockito::Server) -> GenerationConfig {
        GenerationConfig {
            model_id: "test-model".into(),
            endpoint: Some(format!("{}/model/{{model_id}}/invoke", server.url())),
            api_key: Some("secret".into()),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_http_generator_posts_messages_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/model/test-model/invoke")
            .match_header("authorization", "Bearer secret")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": 400,
                "messages": [{
                    "role": "user",
                    "content": [{ "type": "text", "text": "plan my day" }]
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[{"type":"text","text":"Breakfast: eggs"}]}"#)
            .create();

        let config = http_config(&server);
        let generator = generator_from_config(&config).unwrap();
        let text = generator
            .generate(&GenerationRequest::text("plan my day"))
            .unwrap();

        assert_eq!(text, "Breakfast: eggs");
        mock.assert();
    }

    #[test]
    fn test_http_generator_error_status() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/model/test-model/invoke")
            .with_status(429)
            .with_body("Too many requests")
            .create();

        let generator = HttpGenerator::from_config(&http_config(&server)).unwrap();
        let err = generator
            .generate(&GenerationRequest::text("hi"))
            .unwrap_err();

        assert!(matches!(err, Error::Generation(ref msg) if msg.contains("429")));
        mock.assert();
    }

    #[test]
    fn test_http_generator_unreachable() {
        let config = GenerationConfig {
            endpoint: Some("http://127.0.0.1:9/invoke".into()),
            timeout_secs: 2,
            ..GenerationConfig::default()
        };
        let generator = HttpGenerator::from_config(&config).unwrap();
        let err = generator
            .generate(&GenerationRequest::text("hi"))
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn test_unsupported_image_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("meal.gif");
        std::fs::write(&path, b"GIF89a").unwrap();
        assert!(matches!(
            ImageAttachment::from_path(&path),
            Err(Error::Validation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_generator_roundtrip() {
        let config = GenerationConfig {
            command: Some("sh".into()),
            args: vec![
                "-c".into(),
                r#"cat > /dev/null; printf '%s' '{"content":[{"type":"text","text":"plan ready"}]}'"#
                    .into(),
            ],
            ..GenerationConfig::default()
        };
        let generator = CommandGenerator::from_config(&config).unwrap();
        let text = generator.generate(&GenerationRequest::text("hi")).unwrap();
        assert_eq!(text, "plan ready");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_generator_failure() {
        let config = GenerationConfig {
            command: Some("sh".into()),
            args: vec!["-c".into(), "cat > /dev/null; echo boom >&2; exit 3".into()],
            ..GenerationConfig::default()
        };
        let generator = CommandGenerator::from_config(&config).unwrap();
        let err = generator.generate(&GenerationRequest::text("hi")).unwrap_err();
        assert!(matches!(err, Error::Generation(ref msg) if msg.contains("boom")));
    }
}
