use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use campusrag_chat::{run_chat_loop, AnswerPipeline};
use campusrag_core::traits::{CompletionProvider, Retriever};
use campusrag_core::types::{Completion, SearchResult};

/// Counts calls; optionally fails on one specific call number.
struct ScriptedRetriever {
    calls: Arc<AtomicUsize>,
    fail_on_call: Option<usize>,
}

impl Retriever for ScriptedRetriever {
    fn retrieve(&self, query: &str, _k: usize) -> anyhow::Result<Vec<SearchResult>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            anyhow::bail!("retrieval backend exploded");
        }
        Ok(vec![SearchResult {
            score: 1.0,
            id: "doc:0".to_string(),
            doc_id: "doc".to_string(),
            path: "/tmp/doc.txt".to_string(),
            content: format!("context for {query}"),
        }])
    }
}

struct ScriptedProvider {
    calls: Arc<AtomicUsize>,
    degraded: bool,
}

#[async_trait::async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> anyhow::Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.degraded {
            return Ok(Completion::Degraded("{\"candidates\":[]}".to_string()));
        }
        // Echo enough of the prompt back to prove it flowed through.
        let first_line = prompt.lines().next().unwrap_or_default().to_string();
        Ok(Completion::Text(format!("answered ({first_line})")))
    }
}

fn pipeline_with(
    fail_on_call: Option<usize>,
    degraded: bool,
) -> (AnswerPipeline<ScriptedRetriever, ScriptedProvider>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let retriever_calls = Arc::new(AtomicUsize::new(0));
    let provider_calls = Arc::new(AtomicUsize::new(0));
    let pipeline = AnswerPipeline::new(
        ScriptedRetriever { calls: retriever_calls.clone(), fail_on_call },
        ScriptedProvider { calls: provider_calls.clone(), degraded },
        5,
    );
    (pipeline, retriever_calls, provider_calls)
}

async fn drive(
    pipeline: &AnswerPipeline<ScriptedRetriever, ScriptedProvider>,
    script: &str,
) -> String {
    let mut output = Vec::new();
    run_chat_loop(pipeline, script.as_bytes(), &mut output).await.expect("loop");
    String::from_utf8(output).expect("utf8 output")
}

#[tokio::test]
async fn exit_terminates_without_touching_the_pipeline() {
    let (pipeline, retriever_calls, provider_calls) = pipeline_with(None, false);
    let out = drive(&pipeline, "EXIT\n").await;

    assert!(out.contains("Goodbye"));
    assert_eq!(retriever_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn quit_is_case_insensitive_too() {
    let (pipeline, retriever_calls, _) = pipeline_with(None, false);
    let out = drive(&pipeline, "qUiT\n").await;
    assert!(out.contains("Goodbye"));
    assert_eq!(retriever_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn one_failing_question_does_not_end_the_session() {
    let (pipeline, retriever_calls, provider_calls) = pipeline_with(Some(2), false);
    let out = drive(&pipeline, "first question\nsecond question\nthird question\n").await;

    // All three questions reached retrieval; the failed one skipped completion.
    assert_eq!(retriever_calls.load(Ordering::SeqCst), 3);
    assert_eq!(provider_calls.load(Ordering::SeqCst), 2);
    assert!(out.contains("❌"), "the failure is reported");
    assert!(out.contains("retrieval backend exploded"));
    assert_eq!(out.matches("answered").count(), 2, "first and third answered");
}

#[tokio::test]
async fn degraded_completions_are_printed_distinctly() {
    let (pipeline, _, _) = pipeline_with(None, true);
    let out = drive(&pipeline, "anything\nexit\n").await;
    assert!(out.contains("Raw response"));
    assert!(out.contains("{\"candidates\":[]}"));
    assert!(!out.contains("❌"), "a degraded completion is not an error");
}

#[tokio::test]
async fn blank_lines_are_ignored() {
    let (pipeline, retriever_calls, _) = pipeline_with(None, false);
    let out = drive(&pipeline, "\n   \nexit\n").await;
    assert!(out.contains("Goodbye"));
    assert_eq!(retriever_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn eof_ends_the_loop_cleanly() {
    let (pipeline, retriever_calls, _) = pipeline_with(None, false);
    let out = drive(&pipeline, "only question\n").await;
    assert_eq!(retriever_calls.load(Ordering::SeqCst), 1);
    assert!(out.contains("answered"));
}
