pub mod briefing;
pub mod prefs;
pub mod request;
pub mod schema;
