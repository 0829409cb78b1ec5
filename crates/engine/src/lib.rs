//! Interactive engines for the concierge assistant.
//!
//! Both engines push into a [`transcript::Transcript`]: an append-only log of
//! entries plus a queue of scheduled, not-yet-delivered bot messages. While
//! the queue is non-empty the engine is "typing" and rejects input; delivery
//! tickets carry a generation counter so a restart mid-typing silently
//! discards whatever was still queued.
//!
//! The driver (CLI or test) owns time: it pulls tickets, waits out the delay
//! if it wants realism, and hands the ticket back for delivery.

pub mod briefing;
pub mod chat;
pub mod transcript;

pub use briefing::{BriefingEngine, BriefingStep};
pub use chat::{ChatEngine, ChatStep, ConfirmDecision};
pub use transcript::{DeliveryTicket, Sender, Transcript, TranscriptEntry};
