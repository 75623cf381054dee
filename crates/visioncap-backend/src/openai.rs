//! Chat-completion shapes shared by the OpenAI and OpenRouter backends
//!
//! Both speak the same chat API; OpenRouter additionally accepts the
//! extended sampling knobs (top_k, repetition_penalty, min_p, top_a).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use visioncap_types::{AnalysisRequest, BackendKind, Payload};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_a: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    pub data: Vec<ModelData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelData {
    pub id: String,
}

/// Build the chat-completions body. Images ride as a data URL content
/// part next to the text prompt.
pub fn build_request(model: &str, kind: BackendKind, request: &AnalysisRequest) -> ChatRequest {
    let user_content = match &request.payload {
        Payload::Image { data, mime } => MessageContent::Parts(vec![
            ContentPart::Text {
                text: request.prompt.clone(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:{};base64,{}", mime, STANDARD.encode(data)),
                },
            },
        ]),
        Payload::Text(_) => MessageContent::Text(request.prompt.clone()),
    };

    let mut messages = Vec::new();
    if let Some(system) = &request.system_prompt {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: MessageContent::Text(system.clone()),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: user_content,
    });

    let params = &request.params;
    let extended = kind == BackendKind::OpenRouter;

    ChatRequest {
        model: model.to_string(),
        messages,
        max_tokens: params.max_tokens,
        temperature: params.temperature,
        top_p: params.top_p,
        frequency_penalty: params.frequency_penalty,
        presence_penalty: params.presence_penalty,
        seed: params.seed,
        stream: Some(false),
        top_k: extended.then_some(params.top_k),
        repetition_penalty: extended.then_some(params.repeat_penalty),
        min_p: extended.then_some(params.min_p),
        top_a: extended.then_some(params.top_a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visioncap_types::GenerationParams;

    #[test]
    fn image_request_round_trips_prompt_and_params() {
        let params = GenerationParams {
            temperature: 0.5,
            max_tokens: 256,
            ..Default::default()
        };
        let req = AnalysisRequest::for_image(vec![9, 9], "image/jpeg", "what is this")
            .with_params(params.clone());
        let body = build_request("gpt-4o", BackendKind::OpenAi, &req);

        let json = serde_json::to_string(&body).unwrap();
        let decoded: ChatRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.model, "gpt-4o");
        assert_eq!(decoded.temperature, params.temperature);
        assert_eq!(decoded.max_tokens, params.max_tokens);

        let MessageContent::Parts(parts) = &decoded.messages[0].content else {
            panic!("expected content parts");
        };
        let ContentPart::Text { text } = &parts[0] else {
            panic!("expected text part first");
        };
        assert_eq!(text, "what is this");
        let ContentPart::ImageUrl { image_url } = &parts[1] else {
            panic!("expected image part second");
        };
        assert!(image_url.url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn openai_omits_extended_sampling_knobs() {
        let req = AnalysisRequest::for_text("hello");
        let json = serde_json::to_value(build_request("gpt-4o", BackendKind::OpenAi, &req)).unwrap();

        assert!(json.get("top_k").is_none());
        assert!(json.get("repetition_penalty").is_none());
        assert!(json.get("min_p").is_none());
        assert!(json.get("top_a").is_none());
    }

    #[test]
    fn openrouter_sends_extended_sampling_knobs() {
        let req = AnalysisRequest::for_text("hello");
        let json =
            serde_json::to_value(build_request("meta/llama", BackendKind::OpenRouter, &req)).unwrap();

        assert_eq!(json["top_k"], 40);
        assert_eq!(json["min_p"], 0.0);
        assert!((json["repetition_penalty"].as_f64().unwrap() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn system_prompt_becomes_first_message() {
        let req = AnalysisRequest::for_text("prompt").with_system_prompt("be brief");
        let body = build_request("m", BackendKind::OpenAi, &req);

        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].role, "user");
    }
}
