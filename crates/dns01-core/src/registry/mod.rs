//! Name-keyed solver registry
//!
//! One webhook serves every registered solver under a single API group and
//! uses [`Solver::name()`] to route each challenge to the right one.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dns01_core::{Reconciler, SolverRegistry};
//! use std::sync::Arc;
//!
//! let registry = SolverRegistry::new("acme.example.com");
//! registry.register(Arc::new(Reconciler::new(Arc::new(PorkbunFactory::default()))))?;
//! registry.initialize_all(secret_store)?;
//!
//! let solver = registry.get("porkbun").expect("registered");
//! solver.present(&request).await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::error::{Error, Result};
use crate::traits::{SecretStore, Solver};

/// Registry of solvers served under one API group
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// lookups and exclusive registration.
pub struct SolverRegistry {
    /// API group the solvers are served under
    group_name: String,

    /// Registered solvers by name
    solvers: RwLock<HashMap<String, Arc<dyn Solver>>>,
}

impl SolverRegistry {
    /// Create a new empty registry for an API group
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            solvers: RwLock::new(HashMap::new()),
        }
    }

    /// API group the solvers are served under
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// Register a solver under its name
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Registered
    /// - `Err(Error::Config)`: A solver with the same name is already registered
    pub fn register(&self, solver: Arc<dyn Solver>) -> Result<()> {
        let name = solver.name().to_string();
        let mut solvers = self.solvers.write().unwrap_or_else(PoisonError::into_inner);

        if solvers.contains_key(&name) {
            return Err(Error::config(format!(
                "solver {name:?} is already registered in group {:?}",
                self.group_name
            )));
        }

        info!(group = %self.group_name, solver = %name, "Registered solver");
        solvers.insert(name, solver);
        Ok(())
    }

    /// Look up a solver by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Solver>> {
        let solvers = self.solvers.read().unwrap_or_else(PoisonError::into_inner);
        solvers.get(name).cloned()
    }

    /// Initialize every registered solver with one secret store handle
    ///
    /// Stops at the first solver that fails to initialize.
    pub fn initialize_all(&self, secrets: Arc<dyn SecretStore>) -> Result<()> {
        let solvers = self.solvers.read().unwrap_or_else(PoisonError::into_inner);

        for solver in solvers.values() {
            solver.initialize(Arc::clone(&secrets))?;
        }

        Ok(())
    }

    /// List all registered solver names, sorted
    pub fn list_solvers(&self) -> Vec<String> {
        let solvers = self.solvers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = solvers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a solver is registered
    pub fn has_solver(&self, name: &str) -> bool {
        let solvers = self.solvers.read().unwrap_or_else(PoisonError::into_inner);
        solvers.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeRequest;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSolver {
        name: &'static str,
        initialized: AtomicUsize,
    }

    #[async_trait]
    impl Solver for MockSolver {
        fn name(&self) -> &str {
            self.name
        }

        fn initialize(&self, _secrets: Arc<dyn SecretStore>) -> Result<()> {
            self.initialized.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn present(&self, _request: &ChallengeRequest) -> Result<()> {
            Ok(())
        }

        async fn clean_up(&self, _request: &ChallengeRequest) -> Result<()> {
            Ok(())
        }
    }

    struct EmptyStore;

    #[async_trait]
    impl SecretStore for EmptyStore {
        async fn get_secret(&self, namespace: &str, name: &str) -> Result<BTreeMap<String, Vec<u8>>> {
            Err(Error::secret_lookup(namespace, name, "not found"))
        }

        fn store_name(&self) -> &'static str {
            "empty"
        }
    }

    fn mock(name: &'static str) -> Arc<MockSolver> {
        Arc::new(MockSolver {
            name,
            initialized: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_registry_registration() {
        let registry = SolverRegistry::new("acme.example.com");

        // Initially empty
        assert!(!registry.has_solver("mock"));

        registry.register(mock("mock")).unwrap();

        assert!(registry.has_solver("mock"));
        assert_eq!(registry.list_solvers(), vec!["mock".to_string()]);
        assert_eq!(registry.get("mock").unwrap().name(), "mock");
        assert!(registry.get("other").is_none());
        assert_eq!(registry.group_name(), "acme.example.com");
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let registry = SolverRegistry::new("acme.example.com");
        registry.register(mock("mock")).unwrap();

        let err = registry.register(mock("mock")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn initialize_all_reaches_every_solver() {
        let registry = SolverRegistry::new("acme.example.com");
        let first = mock("first");
        let second = mock("second");
        registry.register(first.clone()).unwrap();
        registry.register(second.clone()).unwrap();

        registry.initialize_all(Arc::new(EmptyStore)).unwrap();

        assert_eq!(first.initialized.load(Ordering::SeqCst), 1);
        assert_eq!(second.initialized.load(Ordering::SeqCst), 1);
    }
}
