use std::sync::Arc;

use llm_judge::dispatcher::{DispatchConfig, SkipReason};
use llm_judge::lookup::{HttpPromptLookup, PromptLookup};
use llm_judge::{Batch, Dispatcher, EvaluationRequest, JudgeError, JudgeProvider, JudgeReply};

#[tokio::test]
async fn fetches_instructions_by_conversation_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/conv-1")
        .with_status(200)
        .with_body(r#"{"system": [{"text": "Never promise refunds."}]}"#)
        .create_async()
        .await;

    let lookup = HttpPromptLookup::new(&server.url(), Some(5)).unwrap();
    let instructions = lookup.fetch("conv-1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(instructions, "Never promise refunds.");
}

#[tokio::test]
async fn missing_prompt_is_a_precondition_failure() {
    let mut server = mockito::Server::new_async().await;
    let _missing = server
        .mock("GET", "/gone")
        .with_status(404)
        .create_async()
        .await;
    let _shapeless = server
        .mock("GET", "/odd")
        .with_status(200)
        .with_body(r#"{"prompt": "x"}"#)
        .create_async()
        .await;

    let lookup = HttpPromptLookup::new(&server.url(), Some(5)).unwrap();

    assert!(matches!(
        lookup.fetch("gone").await,
        Err(JudgeError::PreconditionMissing(_))
    ));
    assert!(matches!(
        lookup.fetch("odd").await,
        Err(JudgeError::PreconditionMissing(_))
    ));
}

struct EchoJudge;

#[async_trait::async_trait]
impl JudgeProvider for EchoJudge {
    async fn submit(&self, system: &str, _user: &str, _max: u32) -> Result<JudgeReply, JudgeError> {
        Ok(JudgeReply::new(Some(system.to_string()), None))
    }

    fn base_budget(&self) -> u32 {
        100
    }

    fn name(&self) -> &str {
        "echo"
    }
}

#[tokio::test]
async fn dispatcher_fills_placeholder_and_skips_missing_prompts() {
    let mut server = mockito::Server::new_async().await;
    let _found = server
        .mock("GET", "/a")
        .with_status(200)
        .with_body(r#"{"systemInstruction": {"parts": [{"text": "Be brief."}]}}"#)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/b")
        .with_status(404)
        .create_async()
        .await;

    let lookup = HttpPromptLookup::new(&server.url(), Some(5)).unwrap();
    let dispatcher =
        Dispatcher::new(Arc::new(EchoJudge), DispatchConfig::default()).with_lookup(Arc::new(lookup));
    let batch = Batch::new(
        "Rules:\n@Prompt@",
        vec![EvaluationRequest::new("a", "x"), EvaluationRequest::new("b", "y")],
    );

    let report = dispatcher.evaluate(&batch, 2).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome.output(), "Rules:\nBe brief.");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].conversation_id, "b");
    assert_eq!(report.skipped[0].reason, SkipReason::NoSystemPrompt);
}

#[tokio::test]
async fn non_json_body_means_no_system_prompt() {
    let mut server = mockito::Server::new_async().await;
    let _html = server
        .mock("GET", "/html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>not found</html>")
        .create_async()
        .await;

    let lookup = HttpPromptLookup::new(&server.url(), Some(5)).unwrap();
    assert!(matches!(
        lookup.fetch("html").await,
        Err(JudgeError::PreconditionMissing(_))
    ));

    let dispatcher =
        Dispatcher::new(Arc::new(EchoJudge), DispatchConfig::default()).with_lookup(Arc::new(lookup));
    let batch = Batch::new("@Prompt@", vec![EvaluationRequest::new("html", "x")]);

    let report = dispatcher.evaluate(&batch, 1).await.unwrap();

    assert!(report.results.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::NoSystemPrompt);
}
