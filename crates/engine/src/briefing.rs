use chrono::Timelike;
use tracing::{debug, warn};

use concierge_core::config::TypingConfig;
use concierge_core::messages;
use concierge_core::registry::{BriefingConfigRegistry, LiveRecordSource, PreferencesStore};
use concierge_core::{
    assemble_tasks, narrative, BriefingItem, QuickReply, Request, Task, UserBriefingPrefs,
    PR_APPROVAL_ITEM_ID,
};

use crate::transcript::{DeliveryTicket, Transcript, TranscriptEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BriefingStep {
    Idle,
    Greeting,
    TaskList,
    TaskDetail,
}

/// The guided morning-briefing conversation.
///
/// The task list, live records, items, and preferences are snapshotted once
/// per `start`; the session walks that frozen list. Approving a task only
/// narrates the approval; the task stays in the list and the record store is
/// never written to.
pub struct BriefingEngine<C, P, L> {
    config: C,
    prefs_store: P,
    records: L,
    delays: TypingConfig,
    step: BriefingStep,
    prefs: Option<UserBriefingPrefs>,
    tasks: Vec<Task>,
    items: Vec<BriefingItem>,
    live_records: Vec<Request>,
    selected_task_id: Option<String>,
    transcript: Transcript,
}

impl<C, P, L> BriefingEngine<C, P, L>
where
    C: BriefingConfigRegistry,
    P: PreferencesStore,
    L: LiveRecordSource,
{
    pub fn new(config: C, prefs_store: P, records: L, delays: TypingConfig) -> Self {
        Self {
            config,
            prefs_store,
            records,
            delays,
            step: BriefingStep::Idle,
            prefs: None,
            tasks: Vec::new(),
            items: Vec::new(),
            live_records: Vec::new(),
            selected_task_id: None,
            transcript: Transcript::new(),
        }
    }

    pub fn step(&self) -> BriefingStep {
        self.step
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.selected_task_id.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Opens the briefing using the local wall-clock hour for the greeting.
    pub fn start(&mut self) {
        let hour = chrono::Local::now().hour();
        self.start_at(hour);
    }

    /// Opens the briefing: snapshots config, preferences, and live records,
    /// assembles the task list, and greets. Always honored, even while a
    /// reply is still being typed out.
    pub fn start_at(&mut self, hour: u32) {
        let prefs = self.prefs_store.get();
        self.items = self.config.enabled_items_for_role(&prefs.active_role_id);
        let templates = self.config.enabled_templates_for_role(&prefs.active_role_id);
        self.live_records = self.records.list();
        self.tasks = assemble_tasks(&self.live_records, &self.items, &templates, &prefs);
        self.selected_task_id = None;
        self.transcript.reset();
        debug!(role = %prefs.active_role_id, tasks = self.tasks.len(), "briefing started");

        if self.tasks.is_empty() {
            self.transcript.schedule(
                TranscriptEntry::bot(narrative::empty_briefing())
                    .with_options(vec![messages::dashboard_option()]),
                self.delays.greeting_delay_ms,
            );
        } else {
            self.transcript.schedule(
                TranscriptEntry::bot(narrative::briefing_greeting(
                    &prefs,
                    &self.tasks,
                    &self.items,
                    hour,
                )),
                self.delays.greeting_delay_ms,
            );
            self.transcript.schedule(
                TranscriptEntry::bot(narrative::task_list_intro(&self.tasks))
                    .with_tasks(self.tasks.clone())
                    .with_options(self.task_options()),
                self.delays.reply_delay_ms,
            );
        }
        self.prefs = Some(prefs);
        self.step = BriefingStep::Greeting;
    }

    /// Delivers one scheduled message through the transcript. Once the
    /// opening greeting and list intro have all landed, the session moves on
    /// to the task list.
    pub fn deliver(&mut self, ticket: DeliveryTicket) -> bool {
        let delivered = self.transcript.deliver(ticket);
        if delivered && self.step == BriefingStep::Greeting && !self.transcript.busy() {
            self.step = BriefingStep::TaskList;
        }
        delivered
    }

    /// Drains the queue without waiting. Used by tests and non-interactive
    /// drivers.
    pub fn deliver_all(&mut self) {
        while let Some(ticket) = self.transcript.next_ticket() {
            self.deliver(ticket);
        }
    }

    /// Routes one user input. Inputs other than restart are rejected while a
    /// reply is pending.
    pub fn send(&mut self, value: &str) {
        if value == messages::RESTART_VALUE {
            self.transcript.push_user("브리핑 다시 듣기");
            self.start();
            return;
        }
        if self.transcript.busy() {
            warn!(step = ?self.step, "input rejected while a reply is pending");
            return;
        }

        if value == messages::BACK_TO_LIST_VALUE {
            self.transcript.push_user("다른 업무 보기");
            self.back_to_list();
            return;
        }
        if let Some(pr_id) = value.strip_prefix(messages::APPROVE_PREFIX) {
            let pr_id = pr_id.to_string();
            self.transcript.push_user("승인 처리");
            self.approve(&pr_id);
            return;
        }
        if self.step == BriefingStep::TaskList {
            if let Some(task) = self.tasks.iter().find(|task| task.id == value) {
                let title = task.title.clone();
                self.transcript.push_user(title);
                self.select_task(value);
                return;
            }
        }

        // Free text is out of scope for the briefing mode.
        self.transcript.push_user(value);
        self.transcript.schedule(
            TranscriptEntry::bot(narrative::briefing_fallback())
                .with_options(vec![QuickReply::new("업무 목록 보기", messages::BACK_TO_LIST_VALUE)]),
            self.delays.reply_delay_ms,
        );
    }

    /// Shows the detail narrative for one task. Unknown ids are ignored
    /// without a transition.
    pub fn select_task(&mut self, task_id: &str) {
        let Some(task) = self.tasks.iter().find(|task| task.id == task_id) else {
            debug!(task = %task_id, "ignoring unknown task selection");
            return;
        };
        let (show_amounts, show_due_dates) = self
            .prefs
            .as_ref()
            .map_or((true, true), |prefs| (prefs.show_amounts, prefs.show_due_dates));

        let detail = narrative::task_detail(
            task,
            &self.live_records,
            &self.items,
            show_amounts,
            show_due_dates,
        );
        let mut options = Vec::new();
        if let Some(pr_id) = self.approvable_pr_id(task) {
            options.push(QuickReply::new(
                "승인 처리",
                format!("{}{pr_id}", messages::APPROVE_PREFIX),
            ));
        }
        options.push(QuickReply::new("다른 업무 보기", messages::BACK_TO_LIST_VALUE));
        options.push(messages::dashboard_option());

        self.selected_task_id = Some(task.id.clone());
        self.transcript.schedule(
            TranscriptEntry::bot(detail).with_options(options),
            self.delays.reply_delay_ms,
        );
        self.step = BriefingStep::TaskDetail;
    }

    /// Narrates the approval of a pending request's task. The task list and
    /// the record store are left untouched; the store owns the authoritative
    /// status change.
    pub fn approve(&mut self, pr_id: &str) {
        let task = self
            .tasks
            .iter()
            .find(|task| task.related_pr_id.as_deref() == Some(pr_id));
        let Some(task) = task else {
            debug!(pr = %pr_id, "ignoring approval for unknown request");
            return;
        };
        debug!(pr = %pr_id, "request approval narrated in briefing");

        self.selected_task_id = Some(task.id.clone());
        self.transcript.schedule(
            TranscriptEntry::bot(narrative::approval_confirmation(pr_id, Some(task), &self.tasks))
                .with_options(vec![
                    QuickReply::new("업무 목록 보기", messages::BACK_TO_LIST_VALUE),
                    messages::dashboard_option(),
                ]),
            self.delays.submit_delay_ms,
        );
        self.step = BriefingStep::TaskDetail;
    }

    /// Returns to the remaining-task list view.
    pub fn back_to_list(&mut self) {
        self.selected_task_id = None;
        self.transcript.schedule(
            TranscriptEntry::bot(narrative::back_to_list(&self.tasks))
                .with_tasks(self.tasks.clone())
                .with_options(self.task_options()),
            self.delays.reply_delay_ms,
        );
        self.step = BriefingStep::TaskList;
    }

    /// A live-record approval task is approvable while its request is still
    /// pending.
    fn approvable_pr_id(&self, task: &Task) -> Option<String> {
        if task.item_id != PR_APPROVAL_ITEM_ID {
            return None;
        }
        let pr_id = task.related_pr_id.as_deref()?;
        self.live_records
            .iter()
            .find(|record| record.id == pr_id && record.is_approval_eligible())
            .map(|record| record.id.clone())
    }

    fn task_options(&self) -> Vec<QuickReply> {
        let mut options: Vec<QuickReply> = self
            .tasks
            .iter()
            .map(|task| QuickReply::new(task.title.clone(), task.id.clone()))
            .collect();
        options.push(messages::dashboard_option());
        options
    }
}
