use tracing::{debug, warn};

use concierge_core::config::TypingConfig;
use concierge_core::domain::request::CollectedRecord;
use concierge_core::domain::schema::FieldType;
use concierge_core::messages;
use concierge_core::policy;
use concierge_core::registry::{RequestStore, SchemaRegistry};
use concierge_core::{QuickReply, Request, RequestSchema};

use crate::transcript::{Transcript, TranscriptEntry};

/// Where the intake conversation currently is. Transitions only move forward
/// through a category, except for restart and cancel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatStep {
    Idle,
    SelectCategory,
    Collecting,
    Confirming,
    Completed,
}

/// The three answers accepted at the confirmation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmDecision {
    Submit,
    Reset,
    Cancel,
}

impl ConfirmDecision {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            messages::SUBMIT_VALUE => Some(Self::Submit),
            messages::RESET_VALUE => Some(Self::Reset),
            messages::CANCEL_VALUE => Some(Self::Cancel),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Submit => "제출하기",
            Self::Reset => "처음부터 다시",
            Self::Cancel => "취소하기",
        }
    }
}

/// The schema-driven intake conversation.
///
/// Walks the selected schema's required fields in order, collecting one
/// answer per turn, then freezes the record into a pending [`Request`] for
/// confirmation. The schema is snapshotted at selection time; registry edits
/// made mid-conversation do not affect it.
pub struct ChatEngine<S, R> {
    schemas: S,
    store: R,
    delays: TypingConfig,
    step: ChatStep,
    schema: Option<RequestSchema>,
    field_index: usize,
    collected: CollectedRecord,
    pending_request: Option<Request>,
    transcript: Transcript,
}

impl<S: SchemaRegistry, R: RequestStore> ChatEngine<S, R> {
    pub fn new(schemas: S, store: R, delays: TypingConfig) -> Self {
        Self {
            schemas,
            store,
            delays,
            step: ChatStep::Idle,
            schema: None,
            field_index: 0,
            collected: CollectedRecord::new(),
            pending_request: None,
            transcript: Transcript::new(),
        }
    }

    pub fn step(&self) -> ChatStep {
        self.step
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Opens (or reopens) the conversation with the category greeting.
    /// Always honored, even while a reply is still being typed out.
    pub fn start(&mut self) {
        self.transcript.reset();
        self.schema = None;
        self.field_index = 0;
        self.collected.clear();
        self.pending_request = None;

        let options = self.category_options();
        self.transcript.schedule(
            TranscriptEntry::bot(messages::intake_greeting()).with_options(options),
            self.delays.greeting_delay_ms,
        );
        self.step = ChatStep::SelectCategory;
        debug!("intake conversation started");
    }

    /// Routes one user input according to the current step. Inputs other
    /// than restart are rejected while a reply is pending.
    pub fn send(&mut self, value: &str) {
        if value == messages::RESTART_VALUE {
            self.transcript.push_user(messages::restart_option().label);
            self.start();
            return;
        }
        if self.transcript.busy() {
            warn!(step = ?self.step, "input rejected while a reply is pending");
            return;
        }

        match self.step {
            ChatStep::Idle => {
                self.transcript.push_user(value);
                self.fallback(vec![messages::restart_option()]);
            }
            ChatStep::SelectCategory => match self.schemas.get(value).filter(|s| s.active) {
                Some(schema) => {
                    self.transcript.push_user(schema.label.clone());
                    self.select_category(&schema.id);
                }
                None => {
                    self.transcript.push_user(value);
                    let options = self.category_options();
                    self.fallback(options);
                }
            },
            ChatStep::Collecting => {
                self.transcript.push_user(value);
                self.answer(value);
            }
            ChatStep::Confirming => match ConfirmDecision::parse(value) {
                Some(decision) => {
                    self.transcript.push_user(decision.label());
                    self.confirm(decision);
                }
                None => {
                    self.transcript.push_user(value);
                    self.fallback(messages::confirm_options());
                }
            },
            ChatStep::Completed => {
                self.transcript.push_user(value);
                self.fallback(vec![messages::restart_option(), messages::dashboard_option()]);
            }
        }
    }

    /// Starts collecting for the given schema id. Unknown or inactive ids
    /// are ignored without a transition.
    pub fn select_category(&mut self, id: &str) {
        let Some(schema) = self.schemas.get(id).filter(|schema| schema.active) else {
            debug!(schema = %id, "ignoring unknown category");
            return;
        };
        debug!(schema = %schema.id, "category selected");

        self.field_index = 0;
        self.collected.clear();
        self.pending_request = None;

        if schema.required_fields().is_empty() {
            self.schema = Some(schema);
            self.enter_confirming(self.delays.reply_delay_ms);
            return;
        }

        self.transcript.schedule(
            TranscriptEntry::bot(messages::category_greeting(&schema)),
            self.delays.greeting_delay_ms,
        );
        let first = schema.required_fields()[0];
        self.transcript.schedule(
            TranscriptEntry::bot(messages::field_question(first, None))
                .with_options(messages::field_options(first)),
            self.delays.reply_delay_ms,
        );
        self.schema = Some(schema);
        self.step = ChatStep::Collecting;
    }

    /// Records the answer for the current field and advances, or re-asks the
    /// same field when a number answer fails to parse or falls out of bounds.
    pub fn answer(&mut self, raw: &str) {
        let Some(schema) = self.schema.clone() else {
            return;
        };
        let required = schema.required_fields();
        let Some(field) = required.get(self.field_index).copied() else {
            return;
        };

        if field.field_type == FieldType::Number {
            let in_bounds = raw
                .trim()
                .parse::<i64>()
                .map(|value| field.number_in_bounds(value))
                .unwrap_or(false);
            if !in_bounds {
                debug!(field = %field.key, "number answer rejected, re-asking");
                self.transcript.schedule(
                    TranscriptEntry::bot(messages::number_retry_question(field)),
                    self.delays.reply_delay_ms,
                );
                return;
            }
        }

        let value = field.field_type.coerce(raw);
        self.collected.insert(field.key.clone(), value);
        self.field_index += 1;

        match required.get(self.field_index).copied() {
            Some(next) => {
                self.transcript.schedule(
                    TranscriptEntry::bot(messages::field_question(next, Some(raw)))
                        .with_options(messages::field_options(next)),
                    self.delays.reply_delay_ms,
                );
            }
            None => self.enter_confirming(self.delays.reply_delay_ms),
        }
    }

    pub fn confirm(&mut self, decision: ConfirmDecision) {
        match decision {
            ConfirmDecision::Submit => {
                let Some(request) = self.pending_request.take() else {
                    return;
                };
                let request_id = request.id.clone();
                debug!(request = %request_id, "request submitted");
                self.store.append(request);
                self.transcript.schedule(
                    TranscriptEntry::bot(messages::submitted_message(&request_id)).with_options(
                        vec![messages::restart_option(), messages::dashboard_option()],
                    ),
                    self.delays.submit_delay_ms,
                );
                self.step = ChatStep::Completed;
            }
            ConfirmDecision::Reset => self.start(),
            ConfirmDecision::Cancel => {
                self.schema = None;
                self.collected.clear();
                self.pending_request = None;
                self.transcript.schedule(
                    TranscriptEntry::bot(messages::cancelled_message())
                        .with_options(vec![messages::restart_option()]),
                    self.delays.reply_delay_ms,
                );
                self.step = ChatStep::Idle;
            }
        }
    }

    fn enter_confirming(&mut self, delay_ms: u64) {
        let Some(schema) = &self.schema else {
            return;
        };
        let request = policy::build_request(schema, &self.collected);
        self.transcript.schedule(
            TranscriptEntry::bot(messages::confirm_message(schema))
                .with_record(request.clone())
                .with_options(messages::confirm_options()),
            delay_ms,
        );
        self.pending_request = Some(request);
        self.step = ChatStep::Confirming;
        debug!("collection complete, awaiting confirmation");
    }

    fn category_options(&self) -> Vec<QuickReply> {
        self.schemas
            .list_active()
            .into_iter()
            .map(|schema| QuickReply::new(schema.label, schema.id))
            .collect()
    }

    fn fallback(&mut self, options: Vec<QuickReply>) {
        self.transcript.schedule(
            TranscriptEntry::bot(messages::fallback_message(&options)).with_options(options),
            self.delays.reply_delay_ms,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use concierge_core::config::TypingConfig;
    use concierge_core::registry::{InMemoryRecordStore, InMemorySchemaRegistry};

    use super::{ChatEngine, ChatStep};
    use crate::transcript::Sender;

    fn engine() -> ChatEngine<Arc<InMemorySchemaRegistry>, Arc<InMemoryRecordStore>> {
        ChatEngine::new(
            Arc::new(InMemorySchemaRegistry::with_defaults()),
            Arc::new(InMemoryRecordStore::new()),
            TypingConfig::instant(),
        )
    }

    #[test]
    fn start_offers_the_active_categories() {
        let mut engine = engine();
        engine.start();
        engine.transcript_mut().deliver_all();

        let greeting = engine.transcript().last_entry().expect("greeting");
        assert_eq!(greeting.sender, Sender::Bot);
        let values: Vec<&str> =
            greeting.options.iter().map(|option| option.value.as_str()).collect();
        assert_eq!(values, vec!["general", "it_asset", "mro"]);
        assert_eq!(engine.step(), ChatStep::SelectCategory);
    }

    #[test]
    fn input_is_rejected_while_typing() {
        let mut engine = engine();
        engine.start();
        assert!(engine.transcript().busy());

        engine.send("general");
        assert_eq!(engine.step(), ChatStep::SelectCategory);
        assert!(engine.transcript().entries().is_empty());
    }

    #[test]
    fn restart_is_honored_while_typing() {
        let mut engine = engine();
        engine.start();
        let stale = engine.transcript().next_ticket().expect("queued greeting");

        engine.send(concierge_core::messages::RESTART_VALUE);

        assert!(!engine.transcript_mut().deliver(stale));
        engine.transcript_mut().deliver_all();
        assert_eq!(engine.step(), ChatStep::SelectCategory);
    }

    #[test]
    fn unknown_category_reiterates_options_without_transition() {
        let mut engine = engine();
        engine.start();
        engine.transcript_mut().deliver_all();

        engine.send("furniture");
        engine.transcript_mut().deliver_all();

        assert_eq!(engine.step(), ChatStep::SelectCategory);
        let fallback = engine.transcript().last_entry().expect("fallback");
        assert!(fallback.text.contains("이해하지 못했습니다"));
        assert_eq!(fallback.options.len(), 3);
    }

    #[test]
    fn out_of_bounds_number_is_re_asked() {
        let mut engine = engine();
        engine.start();
        engine.transcript_mut().deliver_all();
        engine.send("general");
        engine.transcript_mut().deliver_all();
        engine.send("A4용지");
        engine.transcript_mut().deliver_all();

        engine.send("0");
        engine.transcript_mut().deliver_all();
        let retry = engine.transcript().last_entry().expect("retry");
        assert!(retry.text.contains("숫자로 입력해주세요"));
        assert!(retry.text.contains("1 이상"));

        engine.send("열개");
        engine.transcript_mut().deliver_all();
        assert_eq!(engine.step(), ChatStep::Collecting);

        // The acknowledgement repeats the submitted text untouched even
        // though the stored value is the parsed number.
        engine.send(" 10 ");
        engine.transcript_mut().deliver_all();
        let next = engine.transcript().last_entry().expect("next question");
        assert!(next.text.starts_with("' 10 ' 확인했습니다."));
    }

    #[test]
    fn schema_without_required_fields_skips_straight_to_confirmation() {
        use concierge_core::{FieldSchema, FieldType, RequestSchema};

        let schemas = Arc::new(InMemorySchemaRegistry::new());
        schemas
            .upsert(RequestSchema {
                id: "misc".to_string(),
                label: "기타 구매".to_string(),
                description: "자유 양식 요청".to_string(),
                icon: None,
                color: None,
                fields: vec![FieldSchema::new("note", "메모", FieldType::Text, false)],
                active: true,
            })
            .expect("valid schema");
        let mut engine =
            ChatEngine::new(schemas, Arc::new(InMemoryRecordStore::new()), TypingConfig::instant());
        engine.start();
        engine.transcript_mut().deliver_all();

        engine.send("misc");
        engine.transcript_mut().deliver_all();

        assert_eq!(engine.step(), ChatStep::Confirming);
        let confirm = engine.transcript().last_entry().expect("confirm card");
        let record = confirm.record.as_ref().expect("pending request");
        assert!(record.fields.is_empty());
        // No field question was ever asked: greeting, category, confirm card.
        assert_eq!(engine.transcript().entries().len(), 3);
    }

    #[test]
    fn cancel_returns_to_idle_with_a_restart_option() {
        let mut engine = engine();
        engine.start();
        engine.transcript_mut().deliver_all();
        engine.send("mro");
        engine.transcript_mut().deliver_all();
        for answer in ["복합기 토너", "8", "high", "본사 3층"] {
            engine.send(answer);
            engine.transcript_mut().deliver_all();
        }
        assert_eq!(engine.step(), ChatStep::Confirming);

        engine.send(concierge_core::messages::CANCEL_VALUE);
        engine.transcript_mut().deliver_all();

        assert_eq!(engine.step(), ChatStep::Idle);
        let cancelled = engine.transcript().last_entry().expect("cancel message");
        assert!(cancelled.text.contains("취소되었습니다"));
        assert_eq!(cancelled.options.len(), 1);
    }
}
