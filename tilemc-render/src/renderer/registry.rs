use std::collections::HashMap;

use thiserror::Error;

use super::{RenderContext, Renderer, RendererBuilder};

/// Key of the auxiliary renderer that feeds the block info panel.
pub const BLOCKINFO: &str = "blockinfo";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("renderer '{0}' is already registered")]
    Duplicate(String),
}

/// All renderer kinds known to the application, in registration order.
#[derive(Debug, Default)]
pub struct RendererRegistry {
    builders: Vec<RendererBuilder>,
    index: HashMap<String, usize>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, builder: RendererBuilder) -> Result<(), RegistryError> {
        if self.index.contains_key(builder.key()) {
            return Err(RegistryError::Duplicate(builder.key().to_string()));
        }
        self.index.insert(builder.key().to_string(), self.builders.len());
        self.builders.push(builder);
        Ok(())
    }

    /// Register or overwrite, returning the builder that was replaced.
    pub fn replace(&mut self, builder: RendererBuilder) -> Option<RendererBuilder> {
        match self.index.get(builder.key()) {
            Some(&pos) => Some(std::mem::replace(&mut self.builders[pos], builder)),
            None => {
                self.index.insert(builder.key().to_string(), self.builders.len());
                self.builders.push(builder);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&RendererBuilder> {
        self.index.get(key).map(|&pos| &self.builders[pos])
    }

    pub fn name(&self, key: &str) -> Option<&str> {
        self.get(key).map(RendererBuilder::name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.builders.iter().map(RendererBuilder::key)
    }

    pub fn create_renderer(&self, context: &RenderContext, builder: &RendererBuilder) -> Box<dyn Renderer> {
        builder.build(context)
    }
}
