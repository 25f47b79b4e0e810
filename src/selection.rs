//! Selected synteny blocks, keyed by value on their identity tuple, plus the
//! cursor the detail view follows and the per-block mutation types.

use std::collections::BTreeMap;
use synteny_protocol::{BlockKey, MutationType};

#[derive(Clone, Debug, PartialEq)]
pub enum SelectionChange {
    Selected(BlockKey),
    Deselected(BlockKey),
    Cleared,
    MutationType(BlockKey, Option<MutationType>),
}

type SelectionListener = Box<dyn FnMut(&SelectionChange, &[BlockKey])>;

#[derive(Default)]
pub struct SelectionSet {
    keys: Vec<BlockKey>,
    current: usize,
    mutation_types: BTreeMap<BlockKey, MutationType>,
    listeners: Vec<SelectionListener>,
}

impl std::fmt::Debug for SelectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionSet")
            .field("keys", &self.keys)
            .field("current", &self.current)
            .field("mutation_types", &self.mutation_types)
            .finish()
    }
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after every change with the change and the resulting selection.
    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionChange, &[BlockKey]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, change: SelectionChange) {
        for listener in &mut self.listeners {
            listener(&change, &self.keys);
        }
    }

    pub fn keys(&self) -> &[BlockKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_selected(&self, key: &BlockKey) -> bool {
        self.keys.contains(key)
    }

    /// Adds `key` if absent. Returns whether anything changed.
    pub fn select(&mut self, key: BlockKey) -> bool {
        if self.is_selected(&key) {
            return false;
        }
        self.keys.push(key.clone());
        self.notify(SelectionChange::Selected(key));
        true
    }

    /// Removes `key` if present. Returns whether anything changed.
    pub fn deselect(&mut self, key: &BlockKey) -> bool {
        let Some(pos) = self.keys.iter().position(|k| k == key) else {
            return false;
        };
        self.keys.remove(pos);
        if pos < self.current || self.current >= self.keys.len() {
            self.current = self.current.saturating_sub(1);
        }
        self.notify(SelectionChange::Deselected(key.clone()));
        true
    }

    /// Flips membership and returns the new state.
    pub fn toggle(&mut self, key: BlockKey) -> bool {
        if self.deselect(&key) {
            false
        } else {
            self.select(key)
        }
    }

    pub fn clear(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        self.keys.clear();
        self.current = 0;
        self.notify(SelectionChange::Cleared);
    }

    /// Replaces the whole selection without notifying, used on restore.
    pub fn replace(&mut self, keys: Vec<BlockKey>) {
        self.keys.clear();
        for key in keys {
            if !self.keys.contains(&key) {
                self.keys.push(key);
            }
        }
        self.current = 0;
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.keys.is_empty()).then_some(self.current)
    }

    pub fn current(&self) -> Option<&BlockKey> {
        self.keys.get(self.current)
    }

    pub fn set_current(&mut self, index: usize) {
        if !self.keys.is_empty() {
            self.current = index.min(self.keys.len() - 1);
        }
    }

    /// Advances the detail cursor, wrapping at the end.
    pub fn next(&mut self) -> Option<&BlockKey> {
        if self.keys.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.keys.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<&BlockKey> {
        if self.keys.is_empty() {
            return None;
        }
        self.current = (self.current + self.keys.len() - 1) % self.keys.len();
        self.current()
    }

    pub fn mutation_type(&self, key: &BlockKey) -> Option<MutationType> {
        self.mutation_types.get(key).copied()
    }

    /// `None` removes the assignment.
    pub fn set_mutation_type(&mut self, key: BlockKey, value: Option<MutationType>) {
        let changed = match value {
            Some(t) => self.mutation_types.insert(key.clone(), t) != Some(t),
            None => self.mutation_types.remove(&key).is_some(),
        };
        if changed {
            self.notify(SelectionChange::MutationType(key, value));
        }
    }

    pub fn replace_mutation_types(&mut self, types: BTreeMap<BlockKey, MutationType>) {
        self.mutation_types = types;
    }

    pub fn mutation_types(&self) -> &BTreeMap<BlockKey, MutationType> {
        &self.mutation_types
    }

    /// Mutation types keyed by the serialized identity key.
    pub fn mutation_types_by_key_str(&self) -> BTreeMap<String, MutationType> {
        self.mutation_types
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }
}
