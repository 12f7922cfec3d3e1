//! Server builder
//!
//! Handlers and filters are registered on the builder; [`ServerBuilder::build`]
//! seals them into an immutable [`Server`].

use std::collections::HashMap;
use std::sync::Arc;

use barrister_idl::Schema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::filter::{Filter, FilterChain};
use crate::handler::{BoundInterface, InterfaceHandler};
use crate::server::Server;
use crate::validate::validate_handler;

/// Server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Escape every non-ASCII character in encoded responses
    #[serde(default)]
    pub force_ascii: bool,
}

/// Builder for servers
pub struct ServerBuilder {
    schema: Schema,
    config: ServerConfig,
    handlers: HashMap<String, BoundInterface>,
    filters: FilterChain,
}

impl ServerBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            config: ServerConfig::default(),
            handlers: HashMap::new(),
            filters: FilterChain::new(),
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn force_ascii(mut self, force_ascii: bool) -> Self {
        self.config.force_ascii = force_ascii;
        self
    }

    /// Validate and register a handler for one interface
    ///
    /// Validation failures are fatal configuration errors and are reported
    /// here rather than on the first call.
    pub fn handler<H: Send + Sync + 'static>(
        mut self,
        handler: InterfaceHandler<H>,
    ) -> Result<Self, ConfigError> {
        let interface = handler.interface().to_string();
        if self.handlers.contains_key(&interface) {
            return Err(ConfigError::DuplicateInterface(interface));
        }

        let bound = handler.into_bound();
        validate_handler(&self.schema, &interface, &bound)?;

        info!(
            "Registered handler for interface {} (cloneable: {})",
            interface,
            bound.is_cloneable()
        );
        self.handlers.insert(interface, bound);
        Ok(self)
    }

    /// Append a filter; pre-invoke hooks run in registration order
    pub fn filter<F: Filter + 'static>(self, filter: F) -> Self {
        self.filter_arc(Arc::new(filter))
    }

    pub fn filter_arc(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        info!("Registered filter #{}", self.filters.len());
        self
    }

    /// Seal the registries
    pub fn build(self) -> Server {
        info!(
            "Server ready: {} handlers, {} filters",
            self.handlers.len(),
            self.filters.len()
        );
        for name in self.schema.interfaces() {
            if !self.handlers.contains_key(name) {
                tracing::debug!("No handler registered for interface {}", name);
            }
        }
        Server::new(self.schema, self.config, self.handlers, self.filters)
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.len())
            .finish()
    }
}
