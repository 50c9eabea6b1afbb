use super::*;

fn completion(content: &serde_json::Value) -> String {
    serde_json::json!({
        "id": "chatcmpl-1",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = completion(&serde_json::json!("Hello!"));
    assert_eq!(parse_chat_completions_response(ProviderKind::OpenAi, &json).unwrap(), "Hello!");
}

#[test]
fn parse_perplexity_with_citations() {
    let json = serde_json::json!({
        "model": "sonar-pro",
        "citations": ["https://arxiv.org/abs/2103.00020"],
        "choices": [{ "message": { "role": "assistant", "content": "Cited answer" } }]
    })
    .to_string();
    assert_eq!(parse_chat_completions_response(ProviderKind::Perplexity, &json).unwrap(), "Cited answer");
}

#[test]
fn parse_content_parts() {
    let json = completion(&serde_json::json!([
        { "type": "text", "text": "Part one. " },
        { "type": "text", "text": "Part two." }
    ]));
    assert_eq!(parse_chat_completions_response(ProviderKind::Local, &json).unwrap(), "Part one. Part two.");
}

#[test]
fn parse_missing_choices_entry_is_empty_error() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    let err = parse_chat_completions_response(ProviderKind::OpenAi, &json).unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse { provider: ProviderKind::OpenAi }));
}

#[test]
fn parse_null_content_is_empty_error() {
    let json = completion(&serde_json::Value::Null);
    assert!(matches!(
        parse_chat_completions_response(ProviderKind::OpenAi, &json).unwrap_err(),
        LlmError::EmptyResponse { .. }
    ));
}

#[test]
fn parse_error_object_envelope() {
    let json = serde_json::json!({
        "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
    })
    .to_string();
    let err = parse_chat_completions_response(ProviderKind::OpenAi, &json).unwrap_err();
    assert!(matches!(&err, LlmError::Provider { message, .. } if message == "Incorrect API key provided"));
    assert!(err.to_string().contains("Incorrect API key provided"));
}

#[test]
fn parse_error_string_envelope_from_local_server() {
    let json = serde_json::json!({ "error": "model \"llama9\" not found" }).to_string();
    let err = parse_chat_completions_response(ProviderKind::Local, &json).unwrap_err();
    assert_eq!(err.to_string(), "local model error: model \"llama9\" not found");
}

#[test]
fn parse_without_choices_or_error_is_parse_error() {
    let json = serde_json::json!({ "model": "gpt-4o" }).to_string();
    assert!(matches!(
        parse_chat_completions_response(ProviderKind::OpenAi, &json).unwrap_err(),
        LlmError::ApiParse { .. }
    ));
}

#[test]
fn status_error_prefers_envelope_message() {
    let err = status_error(ProviderKind::Perplexity, 401, r#"{"error":{"message":"bad key"}}"#.into());
    assert!(matches!(err, LlmError::Provider { message, .. } if message == "bad key"));

    let err = status_error(ProviderKind::Perplexity, 502, "<html>bad gateway</html>".into());
    assert!(matches!(err, LlmError::ApiResponse { status: 502, .. }));
}

#[test]
fn request_body_has_system_and_user_roles() {
    let body = CcRequest {
        model: "sonar-pro",
        messages: [CcMessage { role: "system", content: "sys" }, CcMessage { role: "user", content: "usr" }],
        temperature: 0.8,
        max_tokens: MAX_OUTPUT_TOKENS,
    };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][1]["content"], "usr");
    assert_eq!(value["max_tokens"], 4000);
}
