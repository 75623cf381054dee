//! Request and response shapes for the Ollama generate API

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use visioncap_types::{AnalysisRequest, GenerationParams, Payload};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Sampling options in the shape Ollama's `options` map expects.
/// `num_predict` is Ollama's name for the max-token budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub num_predict: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl From<&GenerationParams> for GenerateOptions {
    fn from(params: &GenerationParams) -> Self {
        Self {
            temperature: params.temperature,
            num_predict: params.max_tokens,
            top_p: params.top_p,
            top_k: params.top_k,
            repeat_penalty: params.repeat_penalty,
            seed: params.seed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// Build the `/api/generate` body. Image bytes are inlined base64.
pub fn build_request(model: &str, request: &AnalysisRequest) -> GenerateRequest {
    let images = match &request.payload {
        Payload::Image { data, .. } => Some(vec![STANDARD.encode(data)]),
        Payload::Text(_) => None,
    };

    GenerateRequest {
        model: model.to_string(),
        prompt: request.prompt.clone(),
        images,
        system: request.system_prompt.clone(),
        stream: false,
        options: GenerateOptions::from(&request.params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_request_round_trips_prompt_and_params() {
        let req = AnalysisRequest::for_image(vec![1, 2, 3], "image/png", "describe it");
        let body = build_request("llava", &req);

        let json = serde_json::to_string(&body).unwrap();
        let decoded: GenerateRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.model, "llava");
        assert_eq!(decoded.prompt, "describe it");
        assert_eq!(decoded.options, GenerateOptions::from(&req.params));
        assert!(!decoded.stream);

        let images = decoded.images.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(STANDARD.decode(&images[0]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn text_request_has_no_images_field() {
        let req = AnalysisRequest::for_text("make it better");
        let body = build_request("llama3", &req);

        assert!(body.images.is_none());
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("images").is_none());
        assert!(json.get("system").is_none());
    }

    #[test]
    fn unset_seed_is_omitted() {
        let req = AnalysisRequest::for_text("hi");
        let json = serde_json::to_value(build_request("m", &req)).unwrap();
        assert!(json["options"].get("seed").is_none());
    }
}
