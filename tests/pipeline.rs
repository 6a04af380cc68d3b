use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use llm_judge::checkpoint::CheckpointKey;
use llm_judge::config::JudgeConfig;
use llm_judge::{JudgeError, JudgeProvider, JudgeReply, Pipeline, RunOutcome, Usage};
use tempfile::TempDir;

const EXPORT: &str = "\
Conversation ID,Customer Name,Message Sent Time,Sent By,TEXT,Skill,Message Type,Tools,Tool Creation Date,Tools Json Output
c-1,Mona,2025-08-01 10:00:00,Consumer,I need a refill,,Normal Message,,,
c-1,Mona,2025-08-01 10:00:05,Bot,Checking your plan,RESOLVERS_BOT,Normal Message,get_plan,2025-08-01 10:00:04,\"{\"\"plan\"\": \"\"gold\"\"}\"
c-1,Mona,2025-08-01 10:00:09,Bot,Checking your plan,RESOLVERS_BOT,Normal Message,get_plan,2025-08-01 10:00:04,\"{\"\"plan\"\": \"\"gold\"\"}\"
c-2,Omar,2025-08-01 11:00:00,Consumer,hello?,,Normal Message,,,
c-2,Omar,2025-08-01 11:00:30,Agent_1,Hi Omar,,Normal Message,,,
c-3,Lina,2025-08-01 12:00:00,Consumer,Cancel please,,Normal Message,,,
c-3,Lina,2025-08-01 12:00:02,Bot,Done,RESOLVERS_BOT,Normal Message,,,
";

struct CountingJudge {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl JudgeProvider for CountingJudge {
    async fn submit(&self, _system: &str, user: &str, _max: u32) -> Result<JudgeReply, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let verdict = if user.contains("refill") { r#"{"verdict":"pass"}"# } else { "" };
        Ok(JudgeReply::new(
            Some(verdict.to_string()),
            Some(Usage::new(40, 4, 44)),
        ))
    }

    fn base_budget(&self) -> u32 {
        1_000
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn setup() -> (TempDir, Pipeline, Arc<CountingJudge>) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("export.csv"), EXPORT).unwrap();

    let mut cfg = JudgeConfig::default();
    cfg.checkpoint.root = dir.path().join("llm_outputs");
    cfg.checkpoint.pretty_json = true;
    let judge = Arc::new(CountingJudge {
        calls: AtomicUsize::new(0),
    });
    let pipeline = Pipeline::with_provider(&cfg, judge.clone()).unwrap();
    (dir, pipeline, judge)
}

fn key() -> CheckpointKey {
    CheckpointKey::new("Resolvers", "rule_breaking", NaiveDate::from_ymd_opt(2025, 8, 1).unwrap())
}

#[tokio::test]
async fn judges_eligible_conversations_and_writes_artifact() {
    let (dir, pipeline, judge) = setup();

    let outcome = pipeline
        .run_csv(&key(), "Judge.", dir.path().join("export.csv"))
        .await
        .unwrap();

    let RunOutcome::Completed {
        path,
        normalize,
        conversations,
        report,
    } = outcome
    else {
        panic!("expected a fresh run");
    };
    assert_eq!(conversations, 2);
    assert_eq!(judge.calls.load(Ordering::SeqCst), 2);
    assert_eq!(normalize.conversations_without_bot, 1);
    assert_eq!(normalize.message_duplicates_removed, 0);
    assert_eq!(normalize.tool_duplicates_cleared, 1);
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.empty, 1);
    assert_eq!(
        path,
        dir.path()
            .join("llm_outputs/2025-08-01/rule_breaking_resolvers_08_01.csv")
    );

    let rows = pipeline.cache().load(&key()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].conversation_id, "c-1");
    assert_eq!(rows[0].llm_output, "{\n  \"verdict\": \"pass\"\n}");
    assert!(rows[0].conversation.contains("<n>get_plan</n>"));
    assert_eq!(rows[1].conversation_id, "c-3");
    assert_eq!(rows[1].llm_output, "(empty)");
    assert_eq!(rows[1].status, "empty");
}

#[tokio::test]
async fn second_run_for_the_same_key_issues_no_requests() {
    let (dir, pipeline, judge) = setup();
    let export = dir.path().join("export.csv");

    let first = pipeline.run_csv(&key(), "Judge.", &export).await.unwrap();
    assert!(!first.is_cached());
    let calls_after_first = judge.calls.load(Ordering::SeqCst);

    let second = pipeline.run_csv(&key(), "Judge.", &export).await.unwrap();

    assert!(second.is_cached());
    assert_eq!(second.path(), first.path());
    assert_eq!(judge.calls.load(Ordering::SeqCst), calls_after_first);
}
