//! Gemini wire format tests.

use std::time::Duration;

use serde_json::{json, Value};
use secret_friend::insights::gemini::{
    build_request, insight_schema, parse_response, GeminiInsightGenerator, DEFAULT_GEMINI_MODEL,
    DEFAULT_GEMINI_URL,
};
use secret_friend::insights::{summarize, InsightError, InsightGenerator};
use secret_friend::participant::Participant;

use crate::fake_http::serve_sequence;

fn group() -> Vec<Participant> {
    vec![
        Participant::new(1, "Ana"),
        Participant::drawn(2, "Bob", "Ana"),
    ]
}

fn gemini_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn generator(url: &str) -> GeminiInsightGenerator {
    GeminiInsightGenerator::new(
        "test-model".to_owned(),
        url,
        "AIza-test-key".to_owned(),
        Duration::from_secs(5),
    )
    .expect("client should build")
}

#[test]
fn defaults() {
    assert_eq!(DEFAULT_GEMINI_URL, "https://generativelanguage.googleapis.com");
    assert_eq!(DEFAULT_GEMINI_MODEL, "gemini-3-flash-preview");
}

#[test]
fn schema_requires_exactly_three_strings() {
    let schema = insight_schema();
    assert_eq!(
        schema["required"],
        json!(["summary", "funnyFact", "recommendation"])
    );
    let properties = schema["properties"].as_object().expect("properties object");
    assert_eq!(properties.len(), 3);
    assert!(properties.values().all(|p| p["type"] == "STRING"));
}

#[test]
fn request_carries_structured_output_config_and_roster() {
    let request = build_request(&group()).expect("request should build");
    let value = serde_json::to_value(&request).expect("request should serialize");

    assert_eq!(
        value["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(value["generationConfig"]["responseSchema"], insight_schema());

    let prompt = value["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt text");
    assert!(prompt.contains(r#""name":"Bob""#));
    assert!(prompt.contains(r#""assignedRecipientName":"Ana""#));
    assert!(prompt.contains(r#""hasDrawn":true"#));
}

#[test]
fn parse_response_reads_structured_text() {
    let body = gemini_body(
        "\n {\"summary\":\"Half done\",\"funnyFact\":\"Ana is popular\",\"recommendation\":\"Hurry\"} \n",
    );
    let insight = parse_response(&body).expect("should parse");
    assert_eq!(insight.summary, "Half done");
    assert_eq!(insight.funny_fact, "Ana is popular");
    assert_eq!(insight.recommendation, "Hurry");
}

#[test]
fn parse_response_rejects_missing_field() {
    let body = gemini_body(r#"{"summary":"s","recommendation":"r"}"#);
    assert!(matches!(parse_response(&body), Err(InsightError::Parse(_))));
}

#[test]
fn parse_response_rejects_free_text() {
    let body = gemini_body("Here is a lovely summary of your group!");
    assert!(matches!(parse_response(&body), Err(InsightError::Parse(_))));
}

#[test]
fn parse_response_rejects_no_candidates() {
    assert!(matches!(
        parse_response(r#"{"candidates":[]}"#),
        Err(InsightError::Parse(_))
    ));
    assert!(matches!(parse_response("not json"), Err(InsightError::Parse(_))));
}

#[test]
fn debug_redacts_api_key() {
    let rendered = format!("{:?}", generator("http://127.0.0.1:1"));
    assert!(!rendered.contains("AIza-test-key"));
}

#[tokio::test]
async fn generate_posts_to_model_endpoint() {
    let body = gemini_body(r#"{"summary":"s","funnyFact":"f","recommendation":"r"}"#);
    let server = serve_sequence(vec![("200 OK", body.as_str())]).await;

    let insight = generator(&server.url)
        .generate(&group())
        .await
        .expect("generation should succeed");
    assert_eq!(insight.funny_fact, "f");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].target,
        "/v1beta/models/test-model:generateContent"
    );
    assert_eq!(requests[0].header("x-goog-api-key"), Some("AIza-test-key"));

    let sent: Value = serde_json::from_str(&requests[0].body).expect("JSON body");
    assert!(sent["generationConfig"]["responseSchema"].is_object());
}

#[tokio::test]
async fn error_status_is_reported_and_summarize_swallows_it() {
    let server = serve_sequence(vec![
        ("429 Too Many Requests", r#"{"error":{"message":"quota"}}"#),
        ("429 Too Many Requests", r#"{"error":{"message":"quota"}}"#),
    ])
    .await;
    let generator = generator(&server.url);

    let result = generator.generate(&group()).await;
    assert!(matches!(
        result,
        Err(InsightError::HttpStatus { status: 429, .. })
    ));
    assert!(summarize(&generator, &group()).await.is_none());
}
