use crate::error::RegistryError;
use gateway_identity_core::{CredentialVerifier, FederatedAdapter};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named authentication method.
#[derive(Clone)]
pub enum Strategy {
    Local(Arc<dyn CredentialVerifier>),
    Federated(Arc<dyn FederatedAdapter>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Local,
    Federated,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Local => f.write_str("local"),
            StrategyKind::Federated => f.write_str("federated"),
        }
    }
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Local(_) => StrategyKind::Local,
            Strategy::Federated(_) => StrategyKind::Federated,
        }
    }
}

#[derive(Clone)]
pub struct StrategyDescriptor {
    pub name: String,
    pub strategy: Strategy,
}

impl StrategyDescriptor {
    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }
}

impl fmt::Debug for StrategyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Strategies by name. Built at startup, then shared behind an `Arc` and only read.
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, StrategyDescriptor>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        strategy: Strategy,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.strategies.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        self.strategies
            .insert(name.clone(), StrategyDescriptor { name, strategy });
        Ok(())
    }

    /// Exact-match lookup; never falls back to another strategy.
    pub fn resolve(&self, name: &str) -> Result<&StrategyDescriptor, RegistryError> {
        self.strategies
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gateway_identity_core::{Credential, IdentityError, IdentityResult, VerifiedIdentity};

    struct RejectAll;

    #[async_trait]
    impl CredentialVerifier for RejectAll {
        async fn verify(&self, _: &Credential) -> IdentityResult<VerifiedIdentity> {
            Err(IdentityError::InvalidCredentials)
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = StrategyRegistry::new();
        assert!(registry.is_empty());

        registry
            .register("basic", Strategy::Local(Arc::new(RejectAll)))
            .unwrap();

        let descriptor = registry.resolve("basic").unwrap();
        assert_eq!(descriptor.name, "basic");
        assert_eq!(descriptor.kind(), StrategyKind::Local);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_is_exact_match() {
        let mut registry = StrategyRegistry::new();
        registry
            .register("basic", Strategy::Local(Arc::new(RejectAll)))
            .unwrap();

        assert_eq!(
            registry.resolve("Basic").unwrap_err(),
            RegistryError::NotFound("Basic".to_string())
        );
        assert!(registry.resolve("").is_err());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = StrategyRegistry::new();
        registry
            .register("basic", Strategy::Local(Arc::new(RejectAll)))
            .unwrap();

        let result = registry.register("basic", Strategy::Local(Arc::new(RejectAll)));
        assert_eq!(result, Err(RegistryError::Duplicate("basic".to_string())));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads() {
        let mut registry = StrategyRegistry::new();
        registry
            .register("basic", Strategy::Local(Arc::new(RejectAll)))
            .unwrap();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.resolve("basic").map(|d| d.kind()) })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(StrategyKind::Local));
        }
    }
}
