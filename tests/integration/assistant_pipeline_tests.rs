/*!
 * Integration tests for the response pipeline
 *
 * Each test drives `Assistant::respond` with mock backends and checks which
 * stage answered and what ended up in the conversation.
 */

use std::sync::Arc;
use std::time::Duration;

use tixobot::assistant::{Assistant, ChatBackend, ReplySource, Role};
use tixobot::language::Language;
use tixobot::{FaqCatalog, FaqEntry};

use crate::common::{self, mock_backends::{MockChatBackend, RecordingNotifier}};

fn assistant_with(catalog: FaqCatalog) -> Assistant {
    common::init_test_logging();
    Assistant::new(&common::offline_config(), catalog).unwrap()
}

#[tokio::test]
async fn test_respond_handoffRequest_shouldNotifyAndReplyWithHandoffMessage() {
    let notifier = RecordingNotifier::new();
    let assistant = assistant_with(common::sample_catalog()).with_notifier(notifier.clone());

    let reply = assistant
        .respond("Quiero hablar con un agente humano", Some(Language::Es))
        .await;

    let config = common::offline_config();
    assert_eq!(reply.source, ReplySource::Handoff);
    assert_eq!(reply.text, config.messages.handoff.es);

    let requests = notifier.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].language, Language::Es);
    assert_eq!(requests[0].conversation_id, assistant.conversation().id());
}

#[tokio::test]
async fn test_respond_handoffBeatsFaq() {
    // "customer service" is both a handoff phrase and an FAQ question
    let notifier = RecordingNotifier::new();
    let assistant = assistant_with(FaqCatalog::builtin()).with_notifier(notifier.clone());

    let reply = assistant
        .respond("How can I contact customer service?", Some(Language::En))
        .await;
    assert_eq!(reply.source, ReplySource::Handoff);
    assert_eq!(notifier.requests().len(), 1);
}

#[tokio::test]
async fn test_respond_failingNotifier_shouldStillHandOff() {
    let assistant = assistant_with(common::sample_catalog()).with_notifier(RecordingNotifier::failing());
    let reply = assistant.respond("I want a real person", Some(Language::En)).await;
    assert_eq!(reply.source, ReplySource::Handoff);
}

#[tokio::test]
async fn test_respond_trustedFaq_shouldAnswerFromCatalog() {
    let assistant = assistant_with(common::sample_catalog());

    let reply = assistant.respond("¿Cómo compro entradas?", Some(Language::Es)).await;
    assert_eq!(reply.text, "ES-COMPRA");
    assert_eq!(reply.source, ReplySource::Faq { confidence: 1.0 });

    let reply = assistant.respond("como compro entradas", Some(Language::Es)).await;
    assert_eq!(reply.text, "ES-COMPRA");
    match reply.source {
        ReplySource::Faq { confidence } => assert!(confidence > 0.7 && confidence < 1.0),
        other => panic!("expected an FAQ reply, got {:?}", other),
    }
}

#[tokio::test]
async fn test_respond_admittedButUntrustedFaq_shouldFallThroughToKeywords() {
    let assistant = assistant_with(FaqCatalog::new(vec![FaqEntry::new("hola", "FAQ-HOLA", Language::Es)]));

    // 0.5 clears admission but not the strict trust threshold
    let faq = assistant.find_faq("hola a todos", Some(Language::Es));
    assert_eq!(faq.answer.as_deref(), Some("FAQ-HOLA"));
    assert_eq!(faq.confidence, 0.5);

    let reply = assistant.respond("hola a todos", Some(Language::Es)).await;
    assert_eq!(reply.source, ReplySource::Keyword);
    assert!(reply.text.contains("Tix.do"));
}

#[tokio::test]
async fn test_respond_noFaqNoKeyword_shouldAskLlmWithPersonaAndHistory() {
    let llm = MockChatBackend::replying("Respuesta del modelo");
    let assistant = assistant_with(common::sample_catalog())
        .with_llm(Some(llm.clone() as Arc<dyn ChatBackend>));

    let reply = assistant.respond("xyz qwerty", Some(Language::Es)).await;
    assert_eq!(reply.source, ReplySource::Llm);
    assert_eq!(reply.text, "Respuesta del modelo");

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].system_prompt, common::offline_config().persona.es);
    assert_eq!(calls[0].history.len(), 1);
    assert_eq!(calls[0].history[0].role, Role::User);
    assert_eq!(calls[0].history[0].content, "xyz qwerty");
}

#[tokio::test]
async fn test_respond_llmHistory_shouldBeLimitedToWindow() {
    let mut config = common::offline_config();
    config.llm.common.history_window = 3;
    let llm = MockChatBackend::replying("ok");
    let assistant = Assistant::new(&config, common::sample_catalog())
        .unwrap()
        .with_llm(Some(llm.clone() as Arc<dyn ChatBackend>));

    for message in ["xyz 1", "xyz 2", "xyz 3"] {
        assistant.respond(message, Some(Language::En)).await;
    }

    let calls = llm.calls();
    assert_eq!(calls.len(), 3);
    let last: Vec<&str> = calls[2].history.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(last, vec!["xyz 2", "ok", "xyz 3"]);
    assert_eq!(calls[2].system_prompt, config.persona.en);
}

#[tokio::test]
async fn test_respond_failingLlm_shouldUseFallbackRotator() {
    let assistant = assistant_with(common::sample_catalog())
        .with_llm(Some(MockChatBackend::failing() as Arc<dyn ChatBackend>));

    // 10 characters, two messages: index 0
    let reply = assistant.respond("xyz qwerty", Some(Language::Es)).await;
    assert_eq!(reply.source, ReplySource::Fallback);
    assert_eq!(reply.text, common::offline_config().messages.fallback.es[0]);

    // 11 characters: index 1
    let reply = assistant.respond("xyz qwertyu", Some(Language::Es)).await;
    assert_eq!(reply.text, common::offline_config().messages.fallback.es[1]);
}

#[tokio::test]
async fn test_respond_withoutLlm_shouldUseFallbackRotator() {
    let assistant = assistant_with(common::sample_catalog());
    assert!(!assistant.has_llm());

    let reply = assistant.respond("xyz qwerty", Some(Language::En)).await;
    assert_eq!(reply.source, ReplySource::Fallback);
    assert_eq!(reply.language, Language::En);
}

#[tokio::test]
async fn test_respond_shouldRecordEveryExchange() {
    let assistant = assistant_with(common::sample_catalog());

    assistant.respond("¿Cómo compro entradas?", None).await;
    assistant.respond("gracias", None).await;

    let conversation = assistant.conversation();
    let roles: Vec<Role> = conversation.turns().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(conversation.turns()[1].content, "ES-COMPRA");

    assistant.reset();
    assert!(assistant.conversation().is_empty());
    assert_ne!(assistant.conversation().id(), conversation.id());
}

#[tokio::test]
async fn test_respond_withoutLanguage_shouldUseDefault() {
    let assistant = assistant_with(common::sample_catalog());
    let reply = assistant.respond("gracias", None).await;
    assert_eq!(reply.language, Language::Es);
    assert_eq!(reply.source, ReplySource::Keyword);
    assert!(assistant.welcome_message(None).starts_with("Hola, soy Camile"));
}

#[tokio::test]
async fn test_respond_concurrentCalls_shouldAllBeRecorded() {
    let assistant = Arc::new(assistant_with(common::sample_catalog()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let assistant = assistant.clone();
            tokio::spawn(async move { assistant.respond(&format!("xyz {}", i), Some(Language::En)).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().source, ReplySource::Fallback);
    }
    assert_eq!(assistant.conversation().len(), 16);
}

#[tokio::test]
async fn test_respond_overlappingCallsWithSlowLlm_shouldKeepExchangesTogether() {
    let llm = MockChatBackend::replying_after("ok", Duration::from_millis(20));
    let assistant = Arc::new(
        assistant_with(common::sample_catalog()).with_llm(Some(llm.clone() as Arc<dyn ChatBackend>)),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let assistant = assistant.clone();
            tokio::spawn(async move { assistant.respond(&format!("xyz {}", i), Some(Language::En)).await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().source, ReplySource::Llm);
    }

    let conversation = assistant.conversation();
    assert_eq!(conversation.len(), 8);
    for pair in conversation.turns().chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }

    // every LLM call saw its own message last, after a completed exchange
    for call in llm.calls() {
        let roles: Vec<Role> = call.history.iter().map(|t| t.role).collect();
        assert_eq!(roles.last(), Some(&Role::User));
        assert!(roles.windows(2).all(|w| w[0] != w[1]), "interleaved history: {:?}", roles);
    }
}
