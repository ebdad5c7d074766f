//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary conversations.

use super::state::*;
use super::transition::*;
use super::*;
use crate::catalog::{Catalog, TopicItem, TOPICS};
use chrono::NaiveDate;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// Builtin content plus topics with several questions and interleaved info
fn test_catalog() -> Catalog {
    Catalog::builtin()
        .with_item("impacto", TopicItem::info("Más sobre impacto."))
        .with_item("impacto", TopicItem::question("2. ¿Segunda?\na) uno\nb) dos", "a"))
        .with_item("impacto", TopicItem::question("3. ¿Tercera?;a) x;b) y;c) z", "c"))
}

fn registered_session() -> Session {
    let mut session = Session::new("prop-user");
    session.name = Some("Prop".to_string());
    session.document_id = Some("1".to_string());
    session.conversation_date = NaiveDate::from_ymd_opt(2025, 1, 1);
    session.state = SessionState::Registered;
    session
}

/// Whether answering `text` on this session resolves a question
fn resolves_question(session: &Session, catalog: &Catalog, text: &str) -> bool {
    if session.state != SessionState::InTopic {
        return false;
    }
    let folded = text.trim().to_lowercase();
    if folded == LIST_TOPICS_COMMAND || crate::catalog::known_topic(&folded).is_some() {
        return false;
    }
    let Some(topic) = session.current_topic.as_deref() else {
        return false;
    };
    match catalog
        .items(topic)
        .and_then(|items| items.get(session.item_index))
    {
        Some(item) if item.is_question() => {
            item.accepts(&folded) || session.retry_count + 1 >= MAX_ATTEMPTS
        }
        _ => false,
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_valid_date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default())
}

fn arb_invalid_date() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zñ ]{0,12}",
        (1u32..=28, 1u32..=12, 1970u32..2100).prop_map(|(d, m, y)| format!("{d:02}/{m:02}/{y}")),
        (1970u32..2100, 13u32..99).prop_map(|(y, m)| format!("{y}-{m}-01")),
        (1970u32..2100, 1u32..=12, 32u32..99).prop_map(|(y, m, d)| format!("{y}-{m:02}-{d}")),
    ]
}

fn arb_input() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec!["a", "b", "c", "d", " B ", "A"]).prop_map(String::from),
        2 => prop::sample::select(TOPICS.to_vec()).prop_map(String::from),
        2 => prop::sample::select(vec!["si", "sí", "s", "no", "n", "SI"]).prop_map(String::from),
        1 => Just("tema".to_string()),
        1 => "[a-z ]{0,10}",
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_valid_dates_register(date in arb_valid_date()) {
        let mut session = Session::new("u");
        session.state = SessionState::AwaitingDate;
        let text = date.format("%Y-%m-%d").to_string();

        let result = transition(&session, &test_catalog(), &UserInput::new(&text)).unwrap();
        prop_assert_eq!(result.session.state, SessionState::Registered);
        prop_assert_eq!(result.session.conversation_date, Some(date));
    }

    #[test]
    fn prop_invalid_dates_keep_awaiting(text in arb_invalid_date()) {
        let mut session = Session::new("u");
        session.state = SessionState::AwaitingDate;

        let result = transition(&session, &test_catalog(), &UserInput::new(&text));
        prop_assert_eq!(result.unwrap_err(), Rejection::InvalidDate);
    }

    #[test]
    fn prop_conversation_invariants(inputs in proptest::collection::vec(arb_input(), 0..80)) {
        let catalog = test_catalog();
        let mut session = registered_session();
        let mut resolved = 0u32;

        for text in inputs {
            let resolves = resolves_question(&session, &catalog, &text);
            let before = session.clone();

            match transition(&session, &catalog, &UserInput::new(&text)) {
                Ok(result) => {
                    // Persisted fields fully describe the new session
                    let mut replayed = before.clone();
                    for field in result.persisted_fields() {
                        replayed.apply(field);
                    }
                    prop_assert_eq!(&replayed, &result.session);

                    // Selecting a topic shows its description, never a question
                    if before.state == SessionState::Registered
                        && result.session.state == SessionState::AwaitingTopicConfirmation
                    {
                        prop_assert!(result.reply.options.is_none());
                        prop_assert_eq!(result.session.item_index, 0);
                    }

                    session = result.session;
                }
                Err(_) => {
                    // Rejections never touch the session
                }
            }

            if resolves {
                resolved += 1;
            }

            prop_assert!(session.retry_count < MAX_ATTEMPTS);
            prop_assert!(session.correct_count >= before.correct_count);
            prop_assert!(session.incorrect_count >= before.incorrect_count);
            prop_assert!(session.answered_count() - before.answered_count() <= 1);
            prop_assert_eq!(session.answered_count(), resolved);
            prop_assert_eq!(session.current_topic.is_some(), session.state.has_topic());
            if let Some(topic) = &session.current_topic {
                prop_assert!(!session.is_completed(topic));
            }
            if session.state.has_topic() {
                prop_assert!(session.completed_topics.len() < TOPICS.len());
            }
        }
    }

    #[test]
    fn prop_completed_topic_never_reselected(topic in prop::sample::select(TOPICS.to_vec())) {
        let mut session = registered_session();
        session.completed_topics.insert(topic.to_string());

        let result = transition(&session, &test_catalog(), &UserInput::new(topic));
        prop_assert_eq!(result.unwrap_err(), Rejection::TopicAlreadyCompleted(topic.to_string()));
    }

    #[test]
    fn prop_score_in_range(correct in 0u32..500, incorrect in 0u32..500) {
        let mut session = registered_session();
        session.correct_count = correct;
        session.incorrect_count = incorrect;
        let score = session.score();
        prop_assert!((0.0..=5.0).contains(&score));
        if correct + incorrect == 0 {
            prop_assert!(score.abs() < f64::EPSILON);
        }
    }
}
