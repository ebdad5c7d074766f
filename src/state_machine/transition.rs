//! Pure state transition function
//!
//! Given a session, the catalog and one line of user input, computes the next
//! session, the reply and the effects the runtime has to carry out. No I/O
//! happens here.

use super::input::UserInput;
use super::reply::Reply;
use super::state::{Session, SessionField, SessionState, MAX_ATTEMPTS};
use super::Effect;
use crate::catalog::{known_topic, Catalog, QuestionView, TopicItem, TOPICS};
use chrono::NaiveDate;
use thiserror::Error;

/// Command that lists the pending topics
pub const LIST_TOPICS_COMMAND: &str = "tema";

const AFFIRMATIVE: [&str; 3] = ["si", "sí", "s"];
const NEGATIVE: [&str; 2] = ["no", "n"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Name stored when the first message is blank
pub const DEFAULT_NAME: &str = "Usuario";

pub const COMPANY_INTRO: &str = "🌱 Quiénes somos\n\n\
Ambipar ofrece servicios y productos para la gestión ambiental, \
cumpliendo con la ética y la responsabilidad socioambiental. \
Apoyamos a nuestros clientes con soluciones inteligentes frente a los \
desafíos de sostenibilidad, y la sostenibilidad es nuestro día a día.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub session: Session,
    pub reply: Reply,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    /// Fields written by this transition, empty when the session is unchanged
    pub fn persisted_fields(&self) -> &[SessionField] {
        self.effects
            .iter()
            .find_map(|effect| match effect {
                Effect::PersistFields { fields } => Some(fields.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Inputs the engine refuses. The message is shown to the user and the
/// session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("⚠️ Formato de fecha inválido. Usa AAAA-MM-DD (ejemplo: 2025-08-22).")]
    InvalidDate,
    #[error("⚠️ No encontré contenido para el tema {0}.")]
    TopicNotFound(String),
    #[error("✅ El tema {0} ya fue completado. Escribe 'tema' para ver los que faltan.")]
    TopicAlreadyCompleted(String),
    #[error("⚠️ Ya estás trabajando en el tema {active}. Debes terminarlo antes de iniciar otro.")]
    TopicInProgress { active: String },
    #[error("⚠️ Debes terminar el tema {0} antes de elegir otro.")]
    FinishCurrentTopic(String),
    #[error("✍️ Por favor responde 'sí' o 'no'.")]
    ConfirmationExpected,
    #[error("⚠️ No entendí tu mensaje. Escribe 'tema' para continuar.")]
    Unrecognized,
}

/// Pure transition function
pub fn transition(
    session: &Session,
    catalog: &Catalog,
    input: &UserInput,
) -> Result<TransitionResult, Rejection> {
    match session.state {
        SessionState::AwaitingName => record_name(session, input),
        SessionState::AwaitingDocument => record_document(session, input),
        SessionState::AwaitingDate => record_date(session, input),
        SessionState::Registered => {
            topic_command(session, catalog, input).unwrap_or(Err(Rejection::Unrecognized))
        }
        SessionState::AwaitingTopicConfirmation => topic_command(session, catalog, input)
            .unwrap_or_else(|| confirm_topic(session, catalog, input)),
        SessionState::InTopic => topic_command(session, catalog, input)
            .unwrap_or_else(|| answer_item(session, catalog, input)),
    }
}

/// Accumulates the field updates and effects of one transition
struct Turn {
    session: Session,
    fields: Vec<SessionField>,
    effects: Vec<Effect>,
}

impl Turn {
    fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            fields: Vec::new(),
            effects: Vec::new(),
        }
    }

    fn set(&mut self, field: SessionField) {
        self.session.apply(&field);
        self.fields.push(field);
    }

    fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    fn finish(self, reply: Reply) -> TransitionResult {
        let mut effects = Vec::with_capacity(self.effects.len() + 1);
        if !self.fields.is_empty() {
            effects.push(Effect::persist_fields(self.fields));
        }
        effects.extend(self.effects);
        TransitionResult {
            session: self.session,
            reply,
            effects,
        }
    }
}

// ============================================================
// Registration
// ============================================================

fn record_name(session: &Session, input: &UserInput) -> Result<TransitionResult, Rejection> {
    let name = if input.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        title_case(input.raw())
    };
    let reply = Reply::new(format!(
        "📄 Perfecto {name}. Ahora, por favor, ingresa tu número de documento."
    ));

    let mut turn = Turn::new(session);
    turn.set(SessionField::Name(name));
    turn.set(SessionField::State(SessionState::AwaitingDocument));
    Ok(turn.finish(reply))
}

fn record_document(session: &Session, input: &UserInput) -> Result<TransitionResult, Rejection> {
    let mut turn = Turn::new(session);
    turn.set(SessionField::DocumentId(input.raw().to_string()));
    turn.set(SessionField::State(SessionState::AwaitingDate));
    Ok(turn.finish(Reply::new(
        "📅 Perfecto. Ingresa la fecha de esta conversación (AAAA-MM-DD).",
    )))
}

fn record_date(session: &Session, input: &UserInput) -> Result<TransitionResult, Rejection> {
    let date =
        NaiveDate::parse_from_str(input.raw(), DATE_FORMAT).map_err(|_| Rejection::InvalidDate)?;

    let mut turn = Turn::new(session);
    turn.set(SessionField::ConversationDate(date));
    turn.set(SessionField::State(SessionState::Registered));

    let name = turn.session.name.clone().unwrap_or_default();
    let summary = format!(
        "✅ Registro completado.\n👤 Nombre: {}\n🆔 Documento: {}\n📅 Fecha: {}\n\n\
         ✍️ Escribe 'tema' para ver los temas disponibles.",
        name,
        turn.session
            .document_id
            .as_deref()
            .filter(|doc| !doc.is_empty())
            .unwrap_or("N/A"),
        date.format(DATE_FORMAT),
    );
    turn.effect(Effect::RegistrationCompleted { name });
    Ok(turn.finish(Reply::new(summary).with_secondary(COMPANY_INTRO)))
}

/// Capitalize the first letter of every word and lowercase the rest
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================
// Topic selection ("tema" and topic names)
// ============================================================

/// The topic being worked on, if the state says one is selected
fn active_topic(session: &Session) -> Option<&str> {
    if session.state.has_topic() {
        session.current_topic.as_deref()
    } else {
        None
    }
}

/// Handles the commands valid in every post-registration state. Returns
/// `None` when the input is neither "tema" nor a topic name.
fn topic_command(
    session: &Session,
    catalog: &Catalog,
    input: &UserInput,
) -> Option<Result<TransitionResult, Rejection>> {
    if input.folded() == LIST_TOPICS_COMMAND {
        return Some(list_topics(session));
    }
    let topic = known_topic(input.folded())?;
    Some(select_topic(session, catalog, topic))
}

fn list_topics(session: &Session) -> Result<TransitionResult, Rejection> {
    if let Some(active) = active_topic(session) {
        return Err(Rejection::FinishCurrentTopic(active.to_string()));
    }

    let pending = session.pending_topics(&TOPICS);
    let reply = if pending.is_empty() {
        Reply::new(format!(
            "🎓 Has finalizado la inducción.\n✅ Correctas: {}\n❌ Incorrectas: {}\n📊 Nota final: {}/5",
            session.correct_count,
            session.incorrect_count,
            session.score_label(),
        ))
    } else {
        Reply::new("📚 Temas disponibles. ✍️ Escribe el nombre del tema que quieras iniciar:")
            .with_pending_topics(pending)
    };
    Ok(Turn::new(session).finish(reply))
}

fn select_topic(
    session: &Session,
    catalog: &Catalog,
    topic: &str,
) -> Result<TransitionResult, Rejection> {
    if let Some(active) = active_topic(session) {
        return if active == topic {
            Ok(resume_topic(session, catalog, topic))
        } else {
            Err(Rejection::TopicInProgress {
                active: active.to_string(),
            })
        };
    }

    if session.is_completed(topic) {
        return Err(Rejection::TopicAlreadyCompleted(topic.to_string()));
    }
    let items = catalog
        .items(topic)
        .ok_or_else(|| Rejection::TopicNotFound(topic.to_string()))?;

    let description = match items.first() {
        Some(item) if !item.is_question() => format!("💡 {}", item.content),
        _ => format!("💡 Tema {topic}"),
    };

    let mut turn = Turn::new(session);
    turn.set(SessionField::CurrentTopic(Some(topic.to_string())));
    turn.set(SessionField::ItemIndex(0));
    turn.set(SessionField::RetryCount(0));
    turn.set(SessionField::State(SessionState::AwaitingTopicConfirmation));
    turn.effect(Effect::TopicStarted {
        topic: topic.to_string(),
    });
    Ok(turn.finish(Reply::new(description).with_secondary(confirmation_prompt(topic))))
}

/// Re-typing the active topic shows the pending prompt again
fn resume_topic(session: &Session, catalog: &Catalog, topic: &str) -> TransitionResult {
    let turn = Turn::new(session);
    let reply = match session.state {
        SessionState::InTopic => {
            let current = catalog
                .items(topic)
                .and_then(|items| items.get(session.item_index))
                .filter(|item| item.is_question());
            match current {
                Some(item) => {
                    let view = item.question_view();
                    Reply::new(format!("▶️ Ya estás en el tema {topic}. Continuemos:"))
                        .with_secondary(view.prompt)
                        .with_options(view.options)
                }
                None => Reply::new(format!(
                    "▶️ Ya estás en el tema {topic}. Escribe cualquier mensaje para continuar."
                )),
            }
        }
        _ => Reply::new(format!("▶️ El tema {topic} ya está seleccionado."))
            .with_secondary(confirmation_prompt(topic)),
    };
    turn.finish(reply)
}

fn confirmation_prompt(topic: &str) -> String {
    format!("❓ ¿Quieres responder las preguntas del tema {topic}? (sí / no)")
}

// ============================================================
// Confirmation
// ============================================================

fn confirm_topic(
    session: &Session,
    catalog: &Catalog,
    input: &UserInput,
) -> Result<TransitionResult, Rejection> {
    let answer = input.folded();
    let Some(topic) = active_topic(session).map(str::to_string) else {
        return Ok(abandon_topic(session));
    };

    if AFFIRMATIVE.contains(&answer) {
        let mut turn = Turn::new(session);
        let Some(items) = catalog.items(&topic) else {
            turn.set(SessionField::CurrentTopic(None));
            turn.set(SessionField::State(SessionState::Registered));
            return Ok(turn.finish(Reply::new(format!(
                "⚠️ No hay contenido para el tema {topic}."
            ))));
        };

        // Item 0 was shown when the topic was selected
        let start = usize::from(items.first().is_some_and(|item| !item.is_question()));
        let step = advance(&mut turn, &topic, items, start);
        let reply = match step {
            Step::Question { notes, view } => {
                let message = join_notes(&notes, &view.prompt);
                Reply::new(message).with_options(view.options)
            }
            Step::Completed { notes } => Reply::new(join_notes(
                &notes,
                &format!("✅ El tema {topic} no contiene preguntas. Marcado como completado."),
            )),
        };
        return Ok(turn.finish(reply));
    }

    if NEGATIVE.contains(&answer) {
        let mut turn = Turn::new(session);
        turn.set(SessionField::CurrentTopic(None));
        turn.set(SessionField::ItemIndex(0));
        turn.set(SessionField::State(SessionState::Registered));
        let pending = turn.session.pending_topics(&TOPICS);
        return Ok(turn.finish(
            Reply::new("👍 Perfecto. Aquí están los temas disponibles otra vez:")
                .with_pending_topics(pending),
        ));
    }

    Err(Rejection::ConfirmationExpected)
}

/// Recover a session whose state claims a topic but has none recorded
fn abandon_topic(session: &Session) -> TransitionResult {
    let mut turn = Turn::new(session);
    turn.set(SessionField::CurrentTopic(None));
    turn.set(SessionField::ItemIndex(0));
    turn.set(SessionField::RetryCount(0));
    turn.set(SessionField::State(SessionState::Registered));
    turn.finish(Reply::new(Rejection::Unrecognized.to_string()))
}

// ============================================================
// Questions
// ============================================================

fn answer_item(
    session: &Session,
    catalog: &Catalog,
    input: &UserInput,
) -> Result<TransitionResult, Rejection> {
    let Some(topic) = active_topic(session).map(str::to_string) else {
        return Ok(abandon_topic(session));
    };
    let items = catalog.items(&topic).unwrap_or_default();
    let index = session.item_index;
    let mut turn = Turn::new(session);

    let Some(item) = items.get(index) else {
        complete_topic(&mut turn, &topic);
        return Ok(turn.finish(Reply::new(completion_message(&topic))));
    };

    if !item.is_question() {
        turn.set(SessionField::ItemIndex(index + 1));
        let next = match items.get(index + 1) {
            Some(next) if next.is_question() => {
                let view = next.question_view();
                Reply::new(format!("💡 {}", item.content))
                    .with_secondary(view.prompt)
                    .with_options(view.options)
            }
            Some(_) => Reply::new(format!("💡 {}", item.content))
                .with_secondary("✍️ Escribe cualquier mensaje para continuar."),
            None => Reply::new(format!("💡 {}", item.content))
                .with_secondary("📌 Fin del tema. Escribe cualquier mensaje para cerrarlo."),
        };
        return Ok(turn.finish(next));
    }

    let answer = item.correct_answer.as_deref().unwrap_or_default().trim();

    if item.accepts(input.folded()) {
        turn.set(SessionField::CorrectCount(session.correct_count.saturating_add(1)));
        let step = advance(&mut turn, &topic, items, index + 1);
        return Ok(turn.finish(step.into_reply(format!("🎉 ¡Correcto! {answer}"), &topic)));
    }

    let attempt = session.retry_count + 1;
    if attempt < MAX_ATTEMPTS {
        turn.set(SessionField::RetryCount(attempt));
        let view = item.question_view();
        return Ok(turn.finish(
            Reply::new(format!("⚠️ Incorrecto. Intento {attempt}/{MAX_ATTEMPTS}"))
                .with_secondary(view.prompt)
                .with_options(view.options),
        ));
    }

    turn.set(SessionField::IncorrectCount(session.incorrect_count.saturating_add(1)));
    turn.effect(Effect::AnswerRevealed {
        topic: topic.clone(),
        item_index: index,
    });
    let step = advance(&mut turn, &topic, items, index + 1);
    Ok(turn.finish(step.into_reply(
        format!("❌ Incorrecto. La respuesta era: {answer}"),
        &topic,
    )))
}

/// Where the topic stands after moving past a resolved item
enum Step {
    /// Positioned on a question; `notes` are the info items passed on the way
    Question { notes: Vec<String>, view: QuestionView },
    /// No questions left; the topic was completed
    Completed { notes: Vec<String> },
}

impl Step {
    fn into_reply(self, message: String, topic: &str) -> Reply {
        match self {
            Step::Question { notes, view } => Reply::new(message)
                .with_secondary(join_notes(&notes, &view.prompt))
                .with_options(view.options),
            Step::Completed { notes } => {
                Reply::new(message).with_secondary(join_notes(&notes, &completion_message(topic)))
            }
        }
    }
}

/// Move to the first question at or after `from`. Info items on the way are
/// collected for display. When no question remains the topic is completed.
fn advance(turn: &mut Turn, topic: &str, items: &[TopicItem], from: usize) -> Step {
    let mut notes = Vec::new();
    for (index, item) in items.iter().enumerate().skip(from) {
        if item.is_question() {
            turn.set(SessionField::ItemIndex(index));
            turn.set(SessionField::RetryCount(0));
            turn.set(SessionField::State(SessionState::InTopic));
            return Step::Question {
                notes,
                view: item.question_view(),
            };
        }
        notes.push(format!("💡 {}", item.content));
    }

    complete_topic(turn, topic);
    Step::Completed { notes }
}

/// Mark `topic` completed and return to topic selection in one update
fn complete_topic(turn: &mut Turn, topic: &str) {
    if !turn.session.is_completed(topic) {
        let mut completed = turn.session.completed_topics.clone();
        completed.insert(topic.to_string());
        turn.set(SessionField::CompletedTopics(completed));
    }
    turn.set(SessionField::CurrentTopic(None));
    turn.set(SessionField::ItemIndex(0));
    turn.set(SessionField::RetryCount(0));
    turn.set(SessionField::State(SessionState::Registered));
    turn.effect(Effect::topic_completed(topic));
}

fn completion_message(topic: &str) -> String {
    format!(
        "✅ Has completado el tema {topic}.\n\n✍️ Escribe 'tema' para continuar con otro tema."
    )
}

fn join_notes(notes: &[String], last: &str) -> String {
    if notes.is_empty() {
        return last.to_string();
    }
    let mut text = notes.join("\n\n");
    text.push_str("\n\n");
    text.push_str(last);
    text
}
