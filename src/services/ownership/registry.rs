use std::{collections::HashMap, fmt, sync::Arc};

use crate::services::ownership::oracle::OwnershipOracle;

/// Why no oracle could be resolved for a resource kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleLookupError {
    #[error("no ownership oracle registered for resource '{0}'")]
    Unregistered(String),
}

impl OracleLookupError {
    pub fn reason(&self) -> &'static str {
        match self {
            OracleLookupError::Unregistered(_) => "oracle_unregistered",
        }
    }
}

/// Static map: resource kind → ownership oracle.
///
/// Built once at startup and read-only afterwards; resolved by table lookup.
#[derive(Clone, Default)]
pub struct OwnershipRegistry {
    oracles: HashMap<String, Arc<dyn OwnershipOracle>>,
}

impl fmt::Debug for OwnershipRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipRegistry")
            .field("resources", &self.oracles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, resource: &str, oracle: Arc<dyn OwnershipOracle>) -> Self {
        self.oracles.insert(resource.to_string(), oracle);
        self
    }

    pub fn resolve(&self, resource: &str) -> Result<&dyn OwnershipOracle, OracleLookupError> {
        self.oracles
            .get(resource)
            .map(|oracle| oracle.as_ref())
            .ok_or_else(|| OracleLookupError::Unregistered(resource.to_string()))
    }

    /// Every name in `resources` must have an oracle. Used at startup against
    /// the route table so a misconfiguration fails the boot, not a request.
    pub fn ensure_covers<'a>(
        &self,
        resources: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), OracleLookupError> {
        for resource in resources {
            self.resolve(resource)?;
        }
        Ok(())
    }
}
