//! Core domain for the concierge assistant.
//!
//! Two concerns live here, both free of any presentation logic:
//!
//! - the runtime-defined purchase-request schema model that the conversation
//!   engine interprets field by field, and
//! - the briefing configuration, preference, and aggregation pipeline that
//!   turns task templates plus live requests into one ordered task list with
//!   narrative text.
//!
//! Everything is synchronous and in-memory. External collaborators (schema
//! registry, briefing config, preferences, record store) are injected through
//! the traits in [`registry`].

pub mod briefing;
pub mod config;
pub mod domain;
pub mod errors;
pub mod messages;
pub mod policy;
pub mod registry;

pub use briefing::narrative;
pub use briefing::pipeline::{assemble_tasks, PR_APPROVAL_ITEM_ID};
pub use domain::briefing::{BriefingItem, BriefingRole, Task, TaskSource, TaskTemplate, Urgency};
pub use domain::prefs::{Density, ItemPref, UrgencyFilter, UserBriefingPrefs};
pub use domain::request::{CollectedRecord, Request, RequestStatus};
pub use domain::schema::{
    CatalogConfig, FieldSchema, FieldType, FieldValidation, FieldValue, RequestSchema,
};
pub use errors::SchemaValidationError;
pub use messages::QuickReply;
pub use registry::{
    BriefingConfigRegistry, InMemoryBriefingConfig, InMemoryPreferences, InMemoryRecordStore,
    InMemorySchemaRegistry, LiveRecordSource, PreferencesStore, RequestStore, SchemaRegistry,
};
