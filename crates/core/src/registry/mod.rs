//! Trait seams the engines depend on, plus in-memory implementations.
//!
//! The engines never own configuration or records; they read snapshots
//! through these traits at turn boundaries. The in-memory stores are the
//! only implementations shipped and are safe to share behind [`Arc`].

pub mod seed;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::briefing::{BriefingItem, BriefingRole, TaskTemplate};
use crate::domain::prefs::UserBriefingPrefs;
use crate::domain::request::Request;
use crate::domain::schema::RequestSchema;
use crate::errors::SchemaValidationError;

/// Read access to the runtime-defined request schemas.
pub trait SchemaRegistry {
    /// Active schemas in registry order. These become the category options.
    fn list_active(&self) -> Vec<RequestSchema>;
    fn get(&self, id: &str) -> Option<RequestSchema>;
}

/// Read access to briefing roles, items, and task templates.
pub trait BriefingConfigRegistry {
    fn items_for_role(&self, role_id: &str) -> Vec<BriefingItem>;
    fn enabled_items_for_role(&self, role_id: &str) -> Vec<BriefingItem>;
    fn enabled_templates_for_role(&self, role_id: &str) -> Vec<TaskTemplate>;
}

/// Read access to the user's briefing preferences.
pub trait PreferencesStore {
    fn get(&self) -> UserBriefingPrefs;
}

/// Read access to live request records for briefing aggregation.
pub trait LiveRecordSource {
    fn list(&self) -> Vec<Request>;
}

/// Write access for completed conversations.
pub trait RequestStore {
    fn append(&self, request: Request);
}

impl<T: SchemaRegistry + ?Sized> SchemaRegistry for Arc<T> {
    fn list_active(&self) -> Vec<RequestSchema> {
        (**self).list_active()
    }

    fn get(&self, id: &str) -> Option<RequestSchema> {
        (**self).get(id)
    }
}

impl<T: BriefingConfigRegistry + ?Sized> BriefingConfigRegistry for Arc<T> {
    fn items_for_role(&self, role_id: &str) -> Vec<BriefingItem> {
        (**self).items_for_role(role_id)
    }

    fn enabled_items_for_role(&self, role_id: &str) -> Vec<BriefingItem> {
        (**self).enabled_items_for_role(role_id)
    }

    fn enabled_templates_for_role(&self, role_id: &str) -> Vec<TaskTemplate> {
        (**self).enabled_templates_for_role(role_id)
    }
}

impl<T: PreferencesStore + ?Sized> PreferencesStore for Arc<T> {
    fn get(&self) -> UserBriefingPrefs {
        (**self).get()
    }
}

impl<T: LiveRecordSource + ?Sized> LiveRecordSource for Arc<T> {
    fn list(&self) -> Vec<Request> {
        (**self).list()
    }
}

impl<T: RequestStore + ?Sized> RequestStore for Arc<T> {
    fn append(&self, request: Request) {
        (**self).append(request)
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(inner) => inner,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Mutable schema registry backed by a vector, seeded or empty.
#[derive(Debug, Default)]
pub struct InMemorySchemaRegistry {
    schemas: Mutex<Vec<RequestSchema>>,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        Self { schemas: Mutex::new(seed::default_schemas()) }
    }

    /// Adds a schema after structural validation. Replaces any schema with
    /// the same id.
    pub fn upsert(&self, schema: RequestSchema) -> Result<(), SchemaValidationError> {
        schema.validate()?;
        let mut schemas = guard(&self.schemas);
        match schemas.iter_mut().find(|existing| existing.id == schema.id) {
            Some(existing) => *existing = schema,
            None => schemas.push(schema),
        }
        Ok(())
    }

    pub fn set_active(&self, id: &str, active: bool) {
        let mut schemas = guard(&self.schemas);
        if let Some(schema) = schemas.iter_mut().find(|schema| schema.id == id) {
            schema.active = active;
        }
    }

    /// Moves a field within a schema. Out-of-range indexes are ignored.
    pub fn reorder_fields(&self, schema_id: &str, from: usize, to: usize) {
        let mut schemas = guard(&self.schemas);
        let Some(schema) = schemas.iter_mut().find(|schema| schema.id == schema_id) else {
            return;
        };
        if from >= schema.fields.len() || to >= schema.fields.len() {
            return;
        }
        let field = schema.fields.remove(from);
        schema.fields.insert(to, field);
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn list_active(&self) -> Vec<RequestSchema> {
        guard(&self.schemas).iter().filter(|schema| schema.active).cloned().collect()
    }

    fn get(&self, id: &str) -> Option<RequestSchema> {
        guard(&self.schemas).iter().find(|schema| schema.id == id).cloned()
    }
}

struct BriefingConfigState {
    roles: Vec<BriefingRole>,
    items: Vec<BriefingItem>,
    templates: Vec<TaskTemplate>,
}

/// Mutable briefing configuration: roles, items per role, task templates.
pub struct InMemoryBriefingConfig {
    state: Mutex<BriefingConfigState>,
}

impl InMemoryBriefingConfig {
    pub fn new(
        roles: Vec<BriefingRole>,
        items: Vec<BriefingItem>,
        templates: Vec<TaskTemplate>,
    ) -> Self {
        Self { state: Mutex::new(BriefingConfigState { roles, items, templates }) }
    }

    pub fn with_defaults() -> Self {
        Self::new(seed::default_roles(), seed::default_items(), seed::default_templates())
    }

    /// Roles ordered by their configured sort order.
    pub fn roles(&self) -> Vec<BriefingRole> {
        let state = guard(&self.state);
        let mut roles = state.roles.clone();
        roles.sort_by_key(|role| role.sort_order);
        roles
    }

    pub fn set_item_enabled(&self, item_id: &str, enabled: bool) {
        let mut state = guard(&self.state);
        if let Some(item) = state.items.iter_mut().find(|item| item.id == item_id) {
            item.enabled = enabled;
        }
    }

    /// Moves one item within a role's ordering, then renumbers that role's
    /// items densely from zero. Other roles keep their orders.
    pub fn reorder_items(&self, role_id: &str, from: usize, to: usize) {
        let mut state = guard(&self.state);
        let mut role_ids: Vec<String> = state
            .items
            .iter()
            .filter(|item| item.role_id == role_id)
            .map(|item| item.id.clone())
            .collect();
        role_ids.sort_by_key(|id| {
            state
                .items
                .iter()
                .find(|item| &item.id == id)
                .map_or(u32::MAX, |item| item.sort_order)
        });
        if from >= role_ids.len() || to >= role_ids.len() {
            return;
        }
        let moved = role_ids.remove(from);
        role_ids.insert(to, moved);

        for (order, id) in role_ids.iter().enumerate() {
            if let Some(item) = state.items.iter_mut().find(|item| &item.id == id) {
                item.sort_order = order as u32;
            }
        }
    }

    pub fn add_template(&self, template: TaskTemplate) {
        guard(&self.state).templates.push(template);
    }

    pub fn set_template_enabled(&self, template_id: &str, enabled: bool) {
        let mut state = guard(&self.state);
        if let Some(template) =
            state.templates.iter_mut().find(|template| template.id == template_id)
        {
            template.enabled = enabled;
        }
    }

    pub fn remove_template(&self, template_id: &str) {
        guard(&self.state).templates.retain(|template| template.id != template_id);
    }
}

impl BriefingConfigRegistry for InMemoryBriefingConfig {
    fn items_for_role(&self, role_id: &str) -> Vec<BriefingItem> {
        let state = guard(&self.state);
        let mut items: Vec<BriefingItem> =
            state.items.iter().filter(|item| item.role_id == role_id).cloned().collect();
        items.sort_by_key(|item| item.sort_order);
        items
    }

    fn enabled_items_for_role(&self, role_id: &str) -> Vec<BriefingItem> {
        self.items_for_role(role_id).into_iter().filter(|item| item.enabled).collect()
    }

    fn enabled_templates_for_role(&self, role_id: &str) -> Vec<TaskTemplate> {
        let enabled_item_ids: Vec<String> =
            self.enabled_items_for_role(role_id).into_iter().map(|item| item.id).collect();
        let state = guard(&self.state);
        state
            .templates
            .iter()
            .filter(|template| {
                template.enabled && enabled_item_ids.iter().any(|id| *id == template.item_id)
            })
            .cloned()
            .collect()
    }
}

/// Mutable briefing preferences for the single local user.
pub struct InMemoryPreferences {
    prefs: Mutex<UserBriefingPrefs>,
}

impl InMemoryPreferences {
    pub fn new(prefs: UserBriefingPrefs) -> Self {
        Self { prefs: Mutex::new(prefs) }
    }

    pub fn with_defaults() -> Self {
        Self::new(seed::default_prefs())
    }

    pub fn update(&self, apply: impl FnOnce(&mut UserBriefingPrefs)) {
        apply(&mut guard(&self.prefs));
    }

    pub fn set_item_visible(&self, item_id: &str, visible: bool) {
        let mut prefs = guard(&self.prefs);
        if let Some(pref) = prefs.item_prefs.iter_mut().find(|pref| pref.item_id == item_id) {
            pref.visible = visible;
        }
    }

    /// Moves one item preference within the sorted order, then renumbers the
    /// whole list densely from zero.
    pub fn reorder_items(&self, from: usize, to: usize) {
        let mut prefs = guard(&self.prefs);
        let mut sorted = prefs.item_prefs.clone();
        sorted.sort_by_key(|pref| pref.sort_order);
        if from >= sorted.len() || to >= sorted.len() {
            return;
        }
        let moved = sorted.remove(from);
        sorted.insert(to, moved);
        for (order, pref) in sorted.iter_mut().enumerate() {
            pref.sort_order = order as u32;
        }
        prefs.item_prefs = sorted;
    }

    pub fn reset(&self) {
        *guard(&self.prefs) = seed::default_prefs();
    }
}

impl PreferencesStore for InMemoryPreferences {
    fn get(&self) -> UserBriefingPrefs {
        guard(&self.prefs).clone()
    }
}

/// Request record store. Newest records first, matching dashboard order.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<Request>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        Self { records: Mutex::new(seed::sample_requests()) }
    }
}

impl LiveRecordSource for InMemoryRecordStore {
    fn list(&self) -> Vec<Request> {
        guard(&self.records).clone()
    }
}

impl RequestStore for InMemoryRecordStore {
    fn append(&self, request: Request) {
        guard(&self.records).insert(0, request);
    }
}
