//! Completion shapes for a local text-generation-webui server
//!
//! TextGen serves the text-enhancement feature only; it takes no API
//! key and no images. A system prompt is folded into the prompt text
//! since the plain completions endpoint has no message roles.

use serde::{Deserialize, Serialize};
use visioncap_types::{AnalysisRequest, GenerationParams};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

pub fn build_request(request: &AnalysisRequest) -> CompletionRequest {
    let prompt = match &request.system_prompt {
        Some(system) => format!("{}\n\n{}", system, request.prompt),
        None => request.prompt.clone(),
    };

    let GenerationParams {
        temperature,
        max_tokens,
        top_p,
        top_k,
        repeat_penalty,
        seed,
        ..
    } = request.params;

    CompletionRequest {
        prompt,
        max_tokens,
        temperature,
        top_p,
        top_k,
        repetition_penalty: repeat_penalty,
        seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_prompt_and_params() {
        let req = AnalysisRequest::for_text("polish this");
        let body = build_request(&req);

        let json = serde_json::to_string(&body).unwrap();
        let decoded: CompletionRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.prompt, "polish this");
        assert_eq!(decoded.max_tokens, req.params.max_tokens);
        assert_eq!(decoded.top_k, req.params.top_k);
    }

    #[test]
    fn system_prompt_is_folded_into_prompt() {
        let req = AnalysisRequest::for_text("polish this").with_system_prompt("You are an editor.");
        let body = build_request(&req);
        assert_eq!(body.prompt, "You are an editor.\n\npolish this");
    }
}
