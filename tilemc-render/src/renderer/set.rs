use std::collections::HashMap;

use thiserror::Error;

use super::Renderer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetError {
    #[error("duplicate renderer key '{0}'")]
    DuplicateKey(String),
}

/// Renderer instances of one task, in execution order.
///
/// Order comes from the entry list; the index only serves lookups by key.
#[derive(Default)]
pub struct RendererSet {
    entries: Vec<(String, Box<dyn Renderer>)>,
    index: HashMap<String, usize>,
}

impl RendererSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Append a renderer under its own key. Never overwrites.
    pub fn insert(&mut self, renderer: Box<dyn Renderer>) -> Result<(), SetError> {
        let key = renderer.key().to_string();
        if self.index.contains_key(&key) {
            return Err(SetError::DuplicateKey(key));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, renderer));
        Ok(())
    }

    /// Insert or overwrite in place, returning the previous instance.
    pub fn replace(&mut self, renderer: Box<dyn Renderer>) -> Option<Box<dyn Renderer>> {
        let key = renderer.key().to_string();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, renderer)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, renderer));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&dyn Renderer> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Box<dyn Renderer>)> {
        self.entries.iter_mut().map(|(key, renderer)| (key.as_str(), renderer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every renderer and its buffers.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
