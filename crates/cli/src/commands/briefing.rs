use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use concierge_core::config::{AppConfig, TypingConfig};
use concierge_core::messages;
use concierge_core::registry::{
    InMemoryBriefingConfig, InMemoryPreferences, InMemoryRecordStore, LiveRecordSource,
};
use concierge_engine::BriefingEngine;

use super::{print_dashboard, print_new_entries, read_line, resolve_input};

type Engine = BriefingEngine<
    Arc<InMemoryBriefingConfig>,
    Arc<InMemoryPreferences>,
    Arc<InMemoryRecordStore>,
>;

/// Like the shared pump, but delivers through the engine so its step keeps
/// pace with what has actually been said.
fn pump_engine(engine: &mut Engine, printed: &mut usize) {
    print_new_entries(engine.transcript(), printed);
    while let Some(ticket) = engine.transcript().next_ticket() {
        if ticket.delay_ms > 0 {
            thread::sleep(Duration::from_millis(ticket.delay_ms));
        }
        engine.deliver(ticket);
        print_new_entries(engine.transcript(), printed);
    }
}

pub fn run(config: &AppConfig, typing: TypingConfig) -> Result<()> {
    let briefing_config = Arc::new(InMemoryBriefingConfig::with_defaults());
    let prefs = Arc::new(InMemoryPreferences::with_defaults());
    let greeting_name = config.briefing.greeting_name.clone();
    prefs.update(move |prefs| prefs.greeting_name = greeting_name);
    let store = Arc::new(InMemoryRecordStore::with_defaults());

    let mut engine =
        BriefingEngine::new(briefing_config, prefs, Arc::clone(&store), typing);
    let mut printed = 0;

    engine.start();
    pump_engine(&mut engine, &mut printed);

    loop {
        let options = engine
            .transcript()
            .last_entry()
            .map(|entry| entry.options.clone())
            .unwrap_or_default();

        let Some(line) = read_line("입력> ")? else {
            break;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "/q" || trimmed == "/quit" {
            break;
        }

        let value = resolve_input(trimmed, &options);
        if value == messages::DASHBOARD_VALUE {
            print_dashboard(&store.list());
            continue;
        }

        engine.send(&value);
        pump_engine(&mut engine, &mut printed);
    }

    Ok(())
}
