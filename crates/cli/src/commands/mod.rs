pub mod briefing;
pub mod chat;
pub mod config;

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use concierge_core::{narrative, QuickReply, Request};
use concierge_engine::{Sender, Transcript, TranscriptEntry};

/// Delivers every queued reply, sleeping out each ticket's typing delay, and
/// prints entries as they land.
pub(crate) fn pump(transcript: &mut Transcript, printed: &mut usize) {
    print_new_entries(transcript, printed);
    while let Some(ticket) = transcript.next_ticket() {
        if ticket.delay_ms > 0 {
            thread::sleep(Duration::from_millis(ticket.delay_ms));
        }
        transcript.deliver(ticket);
        print_new_entries(transcript, printed);
    }
}

pub(crate) fn print_new_entries(transcript: &Transcript, printed: &mut usize) {
    for entry in &transcript.entries()[*printed..] {
        print_entry(entry);
    }
    *printed = transcript.entries().len();
}

fn print_entry(entry: &TranscriptEntry) {
    match entry.sender {
        Sender::User => println!("> {}", entry.text),
        Sender::Bot => {
            println!();
            println!("{}", entry.text);
            if let Some(record) = &entry.record {
                print_record(record);
            }
            if !entry.options.is_empty() {
                println!();
                for (index, option) in entry.options.iter().enumerate() {
                    println!("  {}. {}", index + 1, option.label);
                }
            }
            println!();
        }
    }
}

fn print_record(record: &Request) {
    println!();
    println!("  ┌─ 구매요청 요약 ─────────────");
    println!("  │ 요청번호: {}", record.id);
    println!("  │ 제목: {}", record.title);
    println!("  │ 분류: {}", record.category);
    println!("  │ 금액: {}", narrative::format_krw(record.amount));
    println!("  │ 요청자: {} ({})", record.requester, record.department);
    for (key, value) in &record.fields {
        println!("  │ {key}: {value}");
    }
    println!("  └──────────────────────────────");
}

/// Maps typed input onto the current quick replies: a 1-based number or an
/// exact label picks that option's value; anything else passes through.
pub(crate) fn resolve_input(line: &str, options: &[QuickReply]) -> String {
    let trimmed = line.trim();
    if let Ok(index) = trimmed.parse::<usize>() {
        if (1..=options.len()).contains(&index) {
            return options[index - 1].value.clone();
        }
    }
    if let Some(option) = options.iter().find(|option| option.label == trimmed) {
        return option.value.clone();
    }
    trimmed.to_string()
}

/// One line from stdin, `None` on end of input.
pub(crate) fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

pub(crate) fn print_dashboard(records: &[Request]) {
    println!();
    println!("대시보드 — 구매요청 {}건", records.len());
    for record in records {
        println!(
            "  {}  [{}]  {}  {}",
            record.id,
            record.status.label(),
            record.title,
            narrative::format_krw(record.amount)
        );
    }
    println!();
}
