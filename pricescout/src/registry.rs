use crate::ports::Connector;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connector name cannot be empty")]
    EmptyName,
    #[error("connector '{0}' is already registered")]
    Duplicate(String),
}

/// Ordered set of marketplace connectors.
///
/// Registration order is the canonical grouping order of every response.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: Vec<Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connector: Arc<dyn Connector>) -> Result<(), RegistryError> {
        let name = connector.name();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.connectors.iter().any(|c| c.name() == name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.connectors.push(connector);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, connector: impl Connector) -> Result<Self, RegistryError> {
        self.register(Arc::new(connector))?;
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Connector>> {
        self.connectors.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.connectors.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.connectors.iter().position(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("connectors", &self.names())
            .finish()
    }
}
