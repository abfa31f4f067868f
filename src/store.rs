//! # Selection Store Module
//!
//! State container for the user's model picks and the fetched catalog
//!
//! ## Key Components
//! - [`SelectionState`] - Slots, column count, catalog, and fetch status
//! - [`SelectionStore`] - Action surface mediating every mutation
//! - [`SelectionStore::subscribe`] - Observer registration for state changes

use log::{debug, warn};

use crate::catalog::{CatalogClient, ModelDescriptor};

/// Slot capacity is fixed and independent of the active column count.
pub const MAX_SLOTS: usize = 4;

pub const MIN_COLUMNS: usize = 2;
pub const MAX_COLUMNS: usize = 4;
pub const DEFAULT_COLUMNS: usize = 3;

#[derive(Debug, Clone)]
pub struct SelectionState {
    pub selected_models: [Option<ModelDescriptor>; MAX_SLOTS],
    pub active_columns: usize,
    pub search_term: String,
    pub catalog: Vec<ModelDescriptor>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected_models: [None, None, None, None],
            active_columns: DEFAULT_COLUMNS,
            search_term: String::new(),
            catalog: Vec::new(),
            is_loading: false,
            last_error: None,
        }
    }
}

type Subscriber = Box<dyn Fn(&SelectionState)>;

/// Explicitly constructed state container: callers own the store and pass it
/// by reference, so all mutation goes through this action surface. Mutations
/// are synchronous and applied in call order; only the catalog calls await.
pub struct SelectionStore {
    state: SelectionState,
    client: CatalogClient,
    subscribers: Vec<(usize, Subscriber)>,
    next_subscriber_id: usize,
}

impl SelectionStore {
    pub fn new(client: CatalogClient) -> Self {
        Self {
            state: SelectionState::default(),
            client,
            subscribers: Vec::new(),
            next_subscriber_id: 0,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Register a callback invoked after every state change. Returns an id
    /// for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<F>(&mut self, callback: F) -> usize
    where
        F: Fn(&SelectionState) + 'static,
    {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: usize) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    fn notify(&self) {
        for (_, callback) in &self.subscribers {
            callback(&self.state);
        }
    }

    /// Overwrite a slot. Out-of-range slots are ignored with a warning.
    /// Duplicate selection is not validated here; pickers are expected to
    /// exclude already-selected ids.
    pub fn select_model(&mut self, slot: usize, model: ModelDescriptor) {
        if slot >= MAX_SLOTS {
            warn!("select_model: slot {slot} out of range, ignoring");
            return;
        }
        debug!("Selecting {} into slot {slot}", model.id);
        self.state.selected_models[slot] = Some(model);
        self.notify();
    }

    /// Place a model into the first empty active slot, if any.
    pub fn add_model(&mut self, model: ModelDescriptor) {
        let empty_slot = self.state.selected_models[..self.state.active_columns]
            .iter()
            .position(|slot| slot.is_none());
        if let Some(slot) = empty_slot {
            self.select_model(slot, model);
        }
    }

    /// Idempotent: clearing an empty slot is a no-op state-wise.
    pub fn remove_model(&mut self, slot: usize) {
        if slot >= MAX_SLOTS {
            warn!("remove_model: slot {slot} out of range, ignoring");
            return;
        }
        self.state.selected_models[slot] = None;
        self.notify();
    }

    /// Clamp into [2,4]. Shrinking empties every slot past the new count
    /// immediately; there is no undo.
    pub fn set_active_columns(&mut self, columns: usize) {
        let clamped = columns.clamp(MIN_COLUMNS, MAX_COLUMNS);
        if clamped < self.state.active_columns {
            for slot in &mut self.state.selected_models[clamped..] {
                *slot = None;
            }
        }
        self.state.active_columns = clamped;
        self.notify();
    }

    /// Empties all slots and the search term; column count is untouched.
    pub fn clear_all(&mut self) {
        self.state.selected_models = [None, None, None, None];
        self.state.search_term.clear();
        self.notify();
    }

    pub fn reset_to_defaults(&mut self) {
        let catalog = std::mem::take(&mut self.state.catalog);
        self.state = SelectionState {
            catalog,
            ..SelectionState::default()
        };
        self.notify();
    }

    /// The models feeding a comparison: non-empty slots among the active
    /// columns, in slot order.
    pub fn active_models(&self) -> Vec<ModelDescriptor> {
        self.state.selected_models[..self.state.active_columns]
            .iter()
            .filter_map(|slot| slot.clone())
            .collect()
    }

    pub fn available_slots(&self) -> usize {
        self.state.selected_models[..self.state.active_columns]
            .iter()
            .filter(|slot| slot.is_none())
            .count()
    }

    pub fn can_add_model(&self) -> bool {
        self.available_slots() > 0
    }

    /// Fetch the catalog. Failures land in `last_error` instead of
    /// propagating; a retry is just another call. Concurrent fetches are not
    /// deduplicated: the last response to resolve wins.
    pub async fn fetch_catalog(&mut self) {
        self.state.is_loading = true;
        self.state.last_error = None;
        self.notify();

        match self.client.list_models().await {
            Ok(models) => {
                debug!("Catalog fetch succeeded with {} models", models.len());
                self.state.catalog = models;
                self.state.is_loading = false;
            }
            Err(err) => {
                self.state.last_error = Some(format!("Failed to fetch models: {err}"));
                self.state.is_loading = false;
            }
        }
        self.notify();
    }

    /// Empty or whitespace queries reload the unfiltered list.
    pub async fn search_catalog(&mut self, query: &str) {
        self.state.is_loading = true;
        self.state.last_error = None;
        self.state.search_term = query.to_string();
        self.notify();

        let result = if query.trim().is_empty() {
            self.client.list_models().await
        } else {
            self.client.search_models(query).await
        };

        match result {
            Ok(models) => {
                self.state.catalog = models;
                self.state.is_loading = false;
            }
            Err(err) => {
                self.state.last_error = Some(format!("Failed to search models: {err}"));
                self.state.is_loading = false;
            }
        }
        self.notify();
    }
}
