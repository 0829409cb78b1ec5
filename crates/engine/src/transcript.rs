use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use concierge_core::{QuickReply, Request, Task};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// One message in the conversation log. Bot entries may carry quick-reply
/// options, a request summary card, or a task list alongside their text.
#[derive(Clone, Debug, Serialize)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuickReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Request>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    pub sent_at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self::message(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::message(Sender::Bot, text)
    }

    fn message(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            options: Vec::new(),
            record: None,
            tasks: Vec::new(),
            sent_at: Utc::now(),
        }
    }

    pub fn with_options(mut self, options: Vec<QuickReply>) -> Self {
        self.options = options;
        self
    }

    pub fn with_record(mut self, record: Request) -> Self {
        self.record = Some(record);
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }
}

#[derive(Debug)]
struct ScheduledMessage {
    entry: TranscriptEntry,
    delay_ms: u64,
}

/// Permission to deliver the front of the queue, valid only while the
/// transcript generation it was issued under is still current.
#[derive(Clone, Copy, Debug)]
pub struct DeliveryTicket {
    generation: u64,
    pub delay_ms: u64,
}

/// Conversation log plus the pending "typing" queue.
///
/// Scheduled messages deliver strictly in schedule order. A reset clears the
/// queue and bumps the generation, so tickets issued before the reset become
/// inert instead of delivering into the new conversation.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    queue: VecDeque<ScheduledMessage>,
    generation: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// User messages appear immediately; only bot replies are typed out.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::user(text));
    }

    pub fn schedule(&mut self, entry: TranscriptEntry, delay_ms: u64) {
        self.queue.push_back(ScheduledMessage { entry, delay_ms });
    }

    /// Ticket for the next undelivered message, if any.
    pub fn next_ticket(&self) -> Option<DeliveryTicket> {
        self.queue
            .front()
            .map(|message| DeliveryTicket { generation: self.generation, delay_ms: message.delay_ms })
    }

    /// Moves the front of the queue into the log. Returns false and delivers
    /// nothing when the ticket predates the current generation.
    pub fn deliver(&mut self, ticket: DeliveryTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        match self.queue.pop_front() {
            Some(message) => {
                self.entries.push(message.entry);
                true
            }
            None => false,
        }
    }

    /// Drains the queue without waiting. Used by tests and non-interactive
    /// drivers.
    pub fn deliver_all(&mut self) {
        while let Some(ticket) = self.next_ticket() {
            self.deliver(ticket);
        }
    }

    /// Typing indicator: true while any scheduled message is undelivered.
    pub fn busy(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Drops queued messages and invalidates outstanding tickets, keeping the
    /// log.
    pub fn invalidate_pending(&mut self) {
        self.queue.clear();
        self.generation += 1;
    }

    /// Clears the log and the queue and invalidates outstanding tickets.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.invalidate_pending();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last_entry(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::{Sender, Transcript, TranscriptEntry};

    #[test]
    fn scheduled_messages_deliver_in_order() {
        let mut transcript = Transcript::new();
        transcript.schedule(TranscriptEntry::bot("first"), 300);
        transcript.schedule(TranscriptEntry::bot("second"), 700);
        assert!(transcript.busy());

        let ticket = transcript.next_ticket().expect("queued message");
        assert_eq!(ticket.delay_ms, 300);
        assert!(transcript.deliver(ticket));

        transcript.deliver_all();
        assert!(!transcript.busy());
        let texts: Vec<&str> =
            transcript.entries().iter().map(|entry| entry.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn reset_discards_stale_tickets() {
        let mut transcript = Transcript::new();
        transcript.schedule(TranscriptEntry::bot("from the old conversation"), 500);
        let stale = transcript.next_ticket().expect("queued message");

        transcript.reset();
        transcript.schedule(TranscriptEntry::bot("fresh greeting"), 300);

        assert!(!transcript.deliver(stale));
        assert_eq!(transcript.entries().len(), 0);

        let fresh = transcript.next_ticket().expect("queued message");
        assert!(transcript.deliver(fresh));
        assert_eq!(transcript.last_entry().map(|entry| entry.text.as_str()), Some("fresh greeting"));
    }

    #[test]
    fn user_messages_bypass_the_queue() {
        let mut transcript = Transcript::new();
        transcript.schedule(TranscriptEntry::bot("typing..."), 700);
        transcript.push_user("hello");

        assert_eq!(transcript.entries().len(), 1);
        assert_eq!(transcript.last_entry().map(|entry| entry.sender), Some(Sender::User));
    }

    #[test]
    fn invalidate_keeps_the_log() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello");
        transcript.schedule(TranscriptEntry::bot("reply"), 100);
        let stale = transcript.next_ticket().expect("queued message");

        transcript.invalidate_pending();

        assert!(!transcript.busy());
        assert!(!transcript.deliver(stale));
        assert_eq!(transcript.entries().len(), 1);
    }
}
