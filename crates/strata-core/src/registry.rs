//! Service registry for command-line resolution.
//!
//! A name-indexed table of services that also remembers declaration order,
//! which usage listings rely on. Populated once during startup through
//! `&mut self`; shared immutably afterwards.

use std::collections::HashMap;

use strata_types::error::{DispatchError, RegistryError};
use tracing::debug;

use crate::service::Service;

/// Every service the CLI knows about, in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    services: Vec<Service>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a fixed list of declarations, stopping at the
    /// first invalid one.
    pub fn from_services<I>(services: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Service>,
    {
        let mut registry = Self::new();
        for service in services {
            registry.register(service)?;
        }
        Ok(registry)
    }

    /// Add a service.
    ///
    /// Fails without modifying the registry when the name is taken or the
    /// declaration is invalid (no commands, bad names, duplicate commands).
    pub fn register(&mut self, service: Service) -> Result<(), RegistryError> {
        if self.index.contains_key(service.name()) {
            return Err(RegistryError::DuplicateService(service.name().to_string()));
        }
        service.validate()?;

        debug!(
            service = service.name(),
            commands = service.commands().len(),
            "Registered service"
        );
        self.index
            .insert(service.name().to_string(), self.services.len());
        self.services.push(service);
        Ok(())
    }

    /// Look up a service by exact name.
    pub fn lookup(&self, name: &str) -> Result<&Service, DispatchError> {
        self.index
            .get(name)
            .map(|&i| &self.services[i])
            .ok_or_else(|| DispatchError::UnknownService(name.to_string()))
    }

    /// Iterate services in registration order. Each call starts over.
    pub fn list_all(&self) -> impl Iterator<Item = &Service> + '_ {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
