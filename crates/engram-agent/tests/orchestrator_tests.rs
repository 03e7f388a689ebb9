// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end turn cycle tests over an in-memory store and mock providers.

use std::sync::Arc;

use engram_agent::{MemoryBackend, Orchestrator, OrchestratorConfig, Summarizer};
use engram_core::{CompletionProvider, ConversationEntry, Role};
use engram_memory::{HashEmbedder, SemanticStore};
use engram_test_utils::{FailingProvider, MockProvider};

fn config(max_conversation_length: usize) -> OrchestratorConfig {
    OrchestratorConfig {
        chunk_size: 4,
        max_conversation_length,
        recall_top_k: 3,
        importance_threshold: 0.0,
    }
}

async fn memory_backend() -> (Arc<SemanticStore>, MemoryBackend) {
    let store = Arc::new(
        SemanticStore::open_in_memory(Arc::new(HashEmbedder::new()))
            .await
            .unwrap(),
    );
    // Summaries come from the deterministic fallback path.
    let summarizer = Summarizer::new(Arc::new(FailingProvider), "local".into());
    (store.clone(), MemoryBackend::new(store, summarizer))
}

/// Orchestrator with memory, a scripted main provider, and `extra`
/// pre-seeded user/assistant entries after the system prompt.
async fn orchestrator_with(
    provider: Arc<dyn CompletionProvider>,
    max_conversation_length: usize,
    extra: usize,
) -> (Orchestrator, Arc<SemanticStore>) {
    let (store, backend) = memory_backend().await;
    let mut orchestrator = Orchestrator::new(
        "You are a helpful assistant.",
        provider,
        "local",
        0.7,
        config(max_conversation_length),
        Some(backend),
    );
    seed_exchanges(&mut orchestrator, extra).await;
    (orchestrator, store)
}

/// Seeds `n` entries by running scripted turns two entries at a time.
async fn seed_exchanges(orchestrator: &mut Orchestrator, n: usize) {
    assert!(n % 2 == 0, "entries are seeded in user/assistant pairs");
    for i in 0..n / 2 {
        orchestrator
            .process_prompt(&format!("seed message {i}"))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn turn_commits_user_and_assistant_entries() {
    let provider = Arc::new(MockProvider::with_responses(vec!["Hi Ada!".into()]));
    let (mut orchestrator, _store) = orchestrator_with(provider, 50, 0).await;

    let reply = orchestrator.process_prompt("hello").await.unwrap();
    assert_eq!(reply, "Hi Ada!");

    let conversation = orchestrator.conversation();
    assert_eq!(conversation.len(), 3);
    assert_eq!(conversation[0].role, Role::System);
    assert_eq!(conversation[1], ConversationEntry::user("hello"));
    assert_eq!(conversation[2], ConversationEntry::assistant("Hi Ada!"));
}

#[tokio::test]
async fn outgoing_request_carries_composed_system_and_new_input() {
    let provider = Arc::new(MockProvider::new());
    let (store, backend) = memory_backend().await;
    store
        .add("User prefers terse answers", &[ConversationEntry::user("be terse")], "style", Some(0.9))
        .await
        .unwrap();

    let mut orchestrator = Orchestrator::new(
        "Base prompt.",
        provider.clone(),
        "local",
        0.7,
        config(50),
        Some(backend),
    );
    orchestrator.process_prompt("terse answers please").await.unwrap();

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 1);
    let messages = &requests[0].messages;

    // Composed system: base prompt + memory block + timestamp line.
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.starts_with("Base prompt."));
    assert!(messages[0].content.contains("[Recalled memories]"));
    assert!(messages[0].content.contains("1. ["));
    assert!(messages[0].content.contains("User prefers terse answers"));
    assert!(messages[0].content.contains("[/Recalled memories]"));
    assert!(messages[0].content.contains("Current time:"));

    // New user input rides the outgoing call.
    assert_eq!(
        messages.last().unwrap(),
        &ConversationEntry::user("terse answers please")
    );

    // The stored system prompt itself is never mutated by composition.
    assert_eq!(orchestrator.conversation()[0].content, "Base prompt.");
}

#[tokio::test]
async fn empty_recall_omits_memory_block_but_keeps_timestamp() {
    let provider = Arc::new(MockProvider::new());
    let (mut orchestrator, _store) = orchestrator_with(provider.clone(), 50, 0).await;

    orchestrator.process_prompt("first ever message").await.unwrap();

    let system = &provider.requests().await[0].messages[0];
    assert!(!system.content.contains("[Recalled memories]"));
    assert!(system.content.contains("Current time:"));
}

// Scenario: window under the bound leaves archival a no-op.
#[tokio::test]
async fn archival_noop_when_under_bound() {
    let provider = Arc::new(MockProvider::new());
    // system + 14 seeded entries, bound 50.
    let (mut orchestrator, store) = orchestrator_with(provider, 50, 14).await;
    assert_eq!(orchestrator.conversation_len(), 15);

    orchestrator.process_prompt("one more").await.unwrap();
    assert_eq!(orchestrator.conversation_len(), 17);
    assert_eq!(store.stats().await.unwrap().count, 0);
}

// Scenario: window over the bound archives chunk-size entries from index 1.
#[tokio::test]
async fn archival_removes_one_chunk_when_over_bound() {
    let provider = Arc::new(MockProvider::new());
    let (store, backend) = memory_backend().await;
    let mut orchestrator = Orchestrator::new(
        "sys",
        provider,
        "local",
        0.7,
        config(10),
        Some(backend),
    );
    // Each committed turn adds 2 entries: after 5 turns the window is 11.
    for i in 0..5 {
        orchestrator
            .process_prompt(&format!("message {i}"))
            .await
            .unwrap();
    }
    let before: Vec<String> = orchestrator
        .conversation()
        .iter()
        .map(|e| e.content.clone())
        .collect();
    assert_eq!(before.len(), 11);
    assert_eq!(store.stats().await.unwrap().count, 0);

    // 11 > 10: the next turn archives exactly one 4-entry chunk starting
    // at index 1, then commits its own exchange.
    orchestrator.process_prompt("tip me over").await.unwrap();

    assert_eq!(orchestrator.conversation_len(), 9);
    assert_eq!(orchestrator.conversation()[0].content, "sys");
    assert_eq!(store.stats().await.unwrap().count, 1);

    let recent = store.recent(1).await.unwrap();
    assert_eq!(recent[0].message_count, 4);

    // The chunk came from the oldest end; the tail survives in order.
    let after: Vec<String> = orchestrator
        .conversation()
        .iter()
        .map(|e| e.content.clone())
        .collect();
    assert_eq!(after[1..7], before[5..11]);
}

// With a one-entry chunk the archival loop must run more than once in a
// single turn to bring the window back under the bound.
#[tokio::test]
async fn archival_loops_until_window_is_under_bound() {
    let provider = Arc::new(MockProvider::new());
    let (store, backend) = memory_backend().await;
    let mut orchestrator = Orchestrator::new(
        "sys",
        provider,
        "local",
        0.7,
        OrchestratorConfig {
            chunk_size: 1,
            max_conversation_length: 4,
            recall_top_k: 0,
            importance_threshold: 0.0,
        },
        Some(backend),
    );

    // Turns 1-2 stay under the bound; turn 3 enters at 5 and archives
    // one entry.
    for i in 0..3 {
        orchestrator
            .process_prompt(&format!("message {i}"))
            .await
            .unwrap();
    }
    assert_eq!(orchestrator.conversation_len(), 6);
    assert_eq!(store.stats().await.unwrap().count, 1);

    // Turn 4 enters at 6: two single-entry chunks must go before the
    // window drops to 4, each as its own record.
    orchestrator.process_prompt("over again").await.unwrap();

    assert_eq!(orchestrator.conversation_len(), 6);
    assert_eq!(store.stats().await.unwrap().count, 3);
    for record in store.recent(3).await.unwrap() {
        assert_eq!(record.message_count, 1);
    }

    // The in-progress exchange from this turn always survives.
    let conversation = orchestrator.conversation();
    assert_eq!(conversation[4].content, "over again");
}

#[tokio::test]
async fn archival_never_touches_final_exchange() {
    let provider = Arc::new(MockProvider::new());
    let (store, backend) = memory_backend().await;
    // Tiny bound forces archival every turn; chunk_end is capped two
    // short of the window so the last exchange always survives.
    let mut orchestrator = Orchestrator::new(
        "sys",
        provider,
        "local",
        0.7,
        OrchestratorConfig {
            chunk_size: 4,
            max_conversation_length: 3,
            recall_top_k: 0,
            importance_threshold: 0.0,
        },
        Some(backend),
    );

    for i in 0..5 {
        orchestrator
            .process_prompt(&format!("message {i}"))
            .await
            .unwrap();
        let conversation = orchestrator.conversation();
        // The exchange just committed is always present.
        let tail = &conversation[conversation.len() - 2..];
        assert_eq!(tail[0], ConversationEntry::user(format!("message {i}")));
        assert_eq!(tail[1].role, Role::Assistant);
        assert_eq!(conversation[0].content, "sys");
    }
    assert!(store.stats().await.unwrap().count > 0);
}

// Scenario: manual archival bundles everything but the tail as one record.
#[tokio::test]
async fn force_archive_archives_single_chunk() {
    let provider = Arc::new(MockProvider::new());
    // system + 14 entries (seeding 15 odd entries isn't possible in pairs;
    // the arithmetic below only needs "well over keep_last").
    let (mut orchestrator, store) = orchestrator_with(provider, 50, 14).await;
    let before_count = store.stats().await.unwrap().count;

    let archived = orchestrator.force_archive(5).await.unwrap();

    assert_eq!(archived, 9);
    assert_eq!(orchestrator.conversation_len(), 6);
    assert_eq!(orchestrator.conversation()[0].role, Role::System);
    assert_eq!(store.stats().await.unwrap().count, before_count + 1);

    let recent = store.recent(1).await.unwrap();
    assert_eq!(recent[0].message_count, 9);
}

#[tokio::test]
async fn force_archive_on_minimal_window_is_a_noop() {
    let provider = Arc::new(MockProvider::new());
    let (mut orchestrator, store) = orchestrator_with(provider, 50, 2).await;

    let archived = orchestrator.force_archive(5).await.unwrap();
    assert_eq!(archived, 0);
    assert_eq!(orchestrator.conversation_len(), 3);
    assert_eq!(store.stats().await.unwrap().count, 0);
}

// Scenario: a failed completion surfaces the error and commits nothing.
#[tokio::test]
async fn failed_completion_leaves_conversation_unchanged() {
    let (_store, backend) = memory_backend().await;
    let mut orchestrator = Orchestrator::new(
        "sys",
        Arc::new(FailingProvider),
        "local",
        0.7,
        config(50),
        Some(backend),
    );

    let err = orchestrator.process_prompt("hello").await.unwrap_err();
    assert!(err.to_string().contains("mock provider failure"));
    assert_eq!(orchestrator.conversation_len(), 1);
}

#[tokio::test]
async fn failed_completion_preserves_archival_effects() {
    let (store, backend) = memory_backend().await;
    // Main provider succeeds three times, then fails.
    let provider = Arc::new(FlakyProvider::fail_after(3));
    let mut orchestrator = Orchestrator::new(
        "sys",
        provider,
        "local",
        0.7,
        config(5),
        Some(backend),
    );
    for i in 0..3 {
        orchestrator
            .process_prompt(&format!("message {i}"))
            .await
            .unwrap();
    }
    // Window is now 7 entries, over the bound of 5.
    assert_eq!(orchestrator.conversation_len(), 7);
    assert_eq!(store.stats().await.unwrap().count, 0);

    let err = orchestrator.process_prompt("will fail").await;
    assert!(err.is_err());

    // Archival ran (window shrank, a record was stored) even though the
    // completion itself failed and nothing was committed.
    assert_eq!(orchestrator.conversation_len(), 3);
    assert_eq!(store.stats().await.unwrap().count, 1);
    assert!(orchestrator
        .conversation()
        .iter()
        .all(|e| e.content != "will fail"));
}

/// Succeeds for the first `fail_after` calls, then errors.
struct FlakyProvider {
    fail_after: usize,
    calls: std::sync::atomic::AtomicUsize,
}

impl FlakyProvider {
    fn fail_after(n: usize) -> Self {
        Self {
            fail_after: n,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky-provider"
    }

    async fn complete(
        &self,
        _request: engram_core::CompletionRequest,
    ) -> Result<engram_core::CompletionResponse, engram_core::EngramError> {
        let n = self
            .calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if n < self.fail_after {
            Ok(engram_core::CompletionResponse {
                content: format!("reply {n}"),
            })
        } else {
            Err(engram_core::EngramError::Provider {
                message: "scripted failure".into(),
                source: None,
            })
        }
    }
}

#[tokio::test]
async fn degraded_mode_truncates_without_archival() {
    let provider = Arc::new(MockProvider::new());
    let mut orchestrator = Orchestrator::new(
        "sys",
        provider,
        "local",
        0.7,
        config(5),
        None,
    );
    for i in 0..4 {
        orchestrator
            .process_prompt(&format!("message {i}"))
            .await
            .unwrap();
    }
    // 9 entries with bound 5: the next turn truncates to 5 before committing.
    orchestrator.process_prompt("another").await.unwrap();
    assert_eq!(orchestrator.conversation_len(), 7);
    assert_eq!(orchestrator.conversation()[0].content, "sys");
    assert!(!orchestrator.memory_enabled());
}

#[tokio::test]
async fn admin_operations_error_when_memory_disabled() {
    let mut orchestrator = Orchestrator::new(
        "sys",
        Arc::new(MockProvider::new()),
        "local",
        0.7,
        config(50),
        None,
    );

    assert!(orchestrator.get_stats().await.is_err());
    assert!(orchestrator.search_memories("x", 5).await.is_err());
    assert!(orchestrator.clear_memories().await.is_err());
    assert!(orchestrator.preview_recall("x").await.is_err());
    assert!(orchestrator.force_archive(5).await.is_err());
}

#[tokio::test]
async fn recall_top_k_zero_skips_the_store() {
    let provider = Arc::new(MockProvider::new());
    let (store, backend) = memory_backend().await;
    store
        .add("Should never be recalled", &[ConversationEntry::user("x")], "", Some(0.9))
        .await
        .unwrap();

    let mut orchestrator = Orchestrator::new(
        "sys",
        provider.clone(),
        "local",
        0.7,
        OrchestratorConfig {
            chunk_size: 4,
            max_conversation_length: 50,
            recall_top_k: 0,
            importance_threshold: 0.0,
        },
        Some(backend),
    );
    orchestrator.process_prompt("Should never be recalled").await.unwrap();

    let system = &provider.requests().await[0].messages[0];
    assert!(!system.content.contains("[Recalled memories]"));
}

#[tokio::test]
async fn set_system_prompt_replaces_entry_zero_in_place() {
    let provider = Arc::new(MockProvider::new());
    let (mut orchestrator, _store) = orchestrator_with(provider, 50, 2).await;

    orchestrator.set_system_prompt("New persona.");
    assert_eq!(orchestrator.conversation()[0].content, "New persona.");
    assert_eq!(orchestrator.conversation()[0].role, Role::System);
    // The rest of the window is untouched.
    assert_eq!(orchestrator.conversation_len(), 3);
}

#[tokio::test]
async fn clear_conversation_keeps_system_prompt_and_archive() {
    let provider = Arc::new(MockProvider::new());
    let (mut orchestrator, store) = orchestrator_with(provider, 50, 4).await;
    store
        .add("Archived fact", &[ConversationEntry::user("x")], "", None)
        .await
        .unwrap();

    orchestrator.clear_conversation();
    assert_eq!(orchestrator.conversation_len(), 1);
    assert_eq!(orchestrator.conversation()[0].role, Role::System);
    assert_eq!(store.stats().await.unwrap().count, 1);
}

#[tokio::test]
async fn archived_content_reachable_through_recall() {
    let provider = Arc::new(MockProvider::with_responses(vec![
        "Noted, you are allergic to peanuts.".into(),
        "ok".into(),
        "ok".into(),
        "ok".into(),
        "Your allergy is to peanuts.".into(),
    ]));
    let (store, backend) = memory_backend().await;
    let mut orchestrator = Orchestrator::new(
        "sys",
        provider.clone(),
        "local",
        0.7,
        OrchestratorConfig {
            chunk_size: 2,
            max_conversation_length: 4,
            recall_top_k: 3,
            importance_threshold: 0.0,
        },
        Some(backend),
    );

    orchestrator
        .process_prompt("remember that I am allergic to peanuts")
        .await
        .unwrap();
    for topic in ["weather", "music", "sports"] {
        orchestrator
            .process_prompt(&format!("tell me about {topic}"))
            .await
            .unwrap();
    }
    assert!(store.stats().await.unwrap().count > 0);

    orchestrator
        .process_prompt("what food am I allergic to?")
        .await
        .unwrap();
    let last_request = provider.requests().await.pop().unwrap();
    assert!(last_request.messages[0].content.contains("[Recalled memories]"));
}
