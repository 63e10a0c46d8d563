#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use ragchat_core::{EmptyInputPolicy, FailurePolicy, Role, Settings};

use crate::test_support::{Call, ScriptedBackend, settings};
use crate::{ChatService, Outcome, Phase, ServiceError};

fn service(backend: Arc<ScriptedBackend>, settings: &Settings) -> ChatService {
    ChatService::new(backend, settings)
}

#[tokio::test]
async fn successful_exchange_appends_two_turns() {
    let backend = ScriptedBackend::replying(&["Hello!", "Fine, thanks."]);
    let chat = service(backend.clone(), &settings());
    let mut conv = chat.new_conversation();

    let first = chat.submit(&mut conv, "hi").await.unwrap();
    assert_eq!(first, Outcome::Answered("Hello!".to_owned()));
    assert_eq!(first.phase(), Phase::Rendered);
    assert_eq!(conv.len(), 2);

    chat.submit(&mut conv, "how are you?").await.unwrap();
    assert_eq!(conv.len(), 4);
    assert_eq!(conv.history()[3].content(), "Fine, thanks.");
}

#[tokio::test]
async fn request_carries_system_history_and_new_message() {
    let backend = ScriptedBackend::replying(&["one", "two"]);
    let chat = service(backend.clone(), &settings());
    let mut conv = chat.new_conversation();

    chat.submit(&mut conv, "first").await.unwrap();
    chat.submit(&mut conv, "second").await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    let Call::Chat { messages, params } = &calls[1] else {
        panic!("expected chat call");
    };
    let roles: Vec<Role> = messages.iter().map(|t| t.role()).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
    assert_eq!(messages[3].content(), "second");
    assert_eq!(params.model, "test-model");
    assert_eq!(params.max_tokens, None);
}

#[tokio::test]
async fn blank_input_warns_and_leaves_store_unchanged() {
    let backend = ScriptedBackend::replying(&["unused"]);
    let chat = service(backend.clone(), &settings());
    let mut conv = chat.new_conversation();

    for input in ["", "   ", "\n\t"] {
        let outcome = chat.submit(&mut conv, input).await.unwrap();
        assert!(matches!(outcome, Outcome::Warned(_)));
        assert_eq!(outcome.phase(), Phase::Idle);
    }
    assert!(conv.is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn blank_input_is_silent_under_ignore_policy() {
    let backend = ScriptedBackend::replying(&[]);
    let settings = Settings { empty_input: EmptyInputPolicy::Ignore, ..settings() };
    let chat = service(backend, &settings);
    let mut conv = chat.new_conversation();

    assert_eq!(chat.submit(&mut conv, "  ").await.unwrap(), Outcome::Ignored);
    assert!(conv.is_empty());
}

#[tokio::test]
async fn failure_is_reported_inline_without_new_turns() {
    let backend = ScriptedBackend::failing();
    let chat = service(backend, &settings());
    let mut conv = chat.new_conversation();

    let outcome = chat.submit(&mut conv, "hello?").await.unwrap();
    let Outcome::Failed(message) = &outcome else {
        panic!("expected failure outcome, got {outcome:?}");
    };
    assert!(message.contains("502"));
    assert_eq!(outcome.phase(), Phase::Rendered);
    assert!(conv.is_empty());
}

#[tokio::test]
async fn failure_propagates_under_propagate_policy() {
    let backend = ScriptedBackend::failing();
    let settings = Settings { failure: FailurePolicy::Propagate, ..settings() };
    let chat = service(backend, &settings);
    let mut conv = chat.new_conversation();

    let err = chat.submit(&mut conv, "hello?").await.unwrap_err();
    assert!(matches!(err, ServiceError::Llm(_)));
    assert!(err.is_completion_failure());
    assert!(conv.is_empty());
}

#[tokio::test]
async fn configured_generation_params_are_sent() {
    let backend = ScriptedBackend::replying(&["ok"]);
    let settings = Settings {
        chat_max_tokens: Some(256),
        chat_temperature: Some(0.7),
        system_prompt: "terse".to_owned(),
        ..settings()
    };
    let chat = service(backend.clone(), &settings);
    let mut conv = chat.new_conversation();
    chat.submit(&mut conv, "x").await.unwrap();

    let Call::Chat { messages, params } = &backend.calls()[0] else {
        panic!("expected chat call");
    };
    assert_eq!(messages[0].content(), "terse");
    assert_eq!(params.max_tokens, Some(256));
    assert_eq!(params.temperature, Some(0.7));
}
