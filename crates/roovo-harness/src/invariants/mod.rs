//! Invariant checking for simulation tests.
//!
//! Invariants are properties that must always hold while the client runs.
//! Unlike example-based tests that check specific scenarios, invariants
//! verify behavioral properties across every execution path a test drives.
//!
//! # Architecture
//!
//! [`crate::SimDriver`] extracts observable state from the App and the
//! simulated backend into a [`SystemSnapshot`], then runs registered
//! [`Invariant`] checks against it on every render.
//!
//! # Usage
//!
//! ```ignore
//! let driver = SimDriver::new(1, backend).with_invariants(InvariantRegistry::standard());
//! let snapshot = driver.snapshot_from_app(&app);
//! InvariantRegistry::standard().check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

pub use checks::{RouteMatchesLocation, SubscriptionScopedToView, UniqueRenderedIds};
pub use snapshot::{ClientSnapshot, SystemSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against system state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InvariantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.invariants.iter().map(|i| i.name())).finish()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard client invariants.
    ///
    /// Includes:
    /// - [`UniqueRenderedIds`]: no message id is shown twice
    /// - [`RouteMatchesLocation`]: mounted route follows the navigator
    /// - [`SubscriptionScopedToView`]: subscriptions follow the mounted view
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(UniqueRenderedIds);
        registry.add(RouteMatchesLocation);
        registry.add(SubscriptionScopedToView);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation found.
    ///
    /// Use this in tests where you want immediate failure with context.
    #[allow(clippy::panic, reason = "test assertion helper")]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            format!("{registry:?}"),
            r#"["unique_rendered_ids", "route_matches_location", "subscription_scoped_to_view"]"#
        );
    }

    #[test]
    fn empty_snapshot_passes_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&SystemSnapshot::empty()).is_ok());
    }

    #[test]
    fn all_violations_are_collected() {
        let client = ClientSnapshot::new(3).with_location("/", None, Some(roovo_app::Route::Home));
        let mut snapshot = SystemSnapshot::single(client.clone());
        snapshot.add_client(client);

        let violations = InvariantRegistry::standard().check_all(&snapshot).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().starts_with("route_matches_location: client 3"));
    }
}
