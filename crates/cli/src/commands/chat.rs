use std::sync::Arc;

use anyhow::Result;

use concierge_core::config::TypingConfig;
use concierge_core::messages;
use concierge_core::registry::{InMemoryRecordStore, InMemorySchemaRegistry, LiveRecordSource};
use concierge_engine::ChatEngine;

use super::{print_dashboard, pump, read_line, resolve_input};

pub fn run(typing: TypingConfig) -> Result<()> {
    let schemas = Arc::new(InMemorySchemaRegistry::with_defaults());
    let store = Arc::new(InMemoryRecordStore::with_defaults());
    let mut engine = ChatEngine::new(schemas, Arc::clone(&store), typing);
    let mut printed = 0;

    engine.start();
    pump(engine.transcript_mut(), &mut printed);

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
        pump(engine.transcript_mut(), &mut printed);
    }

    Ok(())
}
