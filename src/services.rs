//! Service registry and context builders.
//!
//! Core collaborators (ancestor tracker, slot discoverer, buckets, change
//! tracker) are explicit fields so stages borrow exactly what they need. A
//! type-keyed extension map carries host-specific collaborators.

use crate::bucket::Classification;
use crate::changes::ChangeTracker;
use crate::error::PipelineError;
use crate::policy::PolicyRegistry;
use crate::slot::{SlotDiscoverer, SlotFactory};
use crate::tree::AncestorTracker;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Services shared by every stage of a run
#[derive(Default)]
pub struct ServiceRegistry {
    pub ancestors: Option<AncestorTracker>,
    pub discoverer: Option<Box<dyn SlotDiscoverer>>,
    pub buckets: Option<Classification>,
    pub changes: Option<ChangeTracker>,
    extensions: HashMap<TypeId, Box<dyn Any>>,
}

impl ServiceRegistry {
    /// Registry with no services at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every core service populated
    pub fn standard(discoverer: Box<dyn SlotDiscoverer>) -> Self {
        Self {
            ancestors: Some(AncestorTracker::new()),
            discoverer: Some(discoverer),
            buckets: Some(Classification::new()),
            changes: Some(ChangeTracker::new()),
            extensions: HashMap::new(),
        }
    }

    /// Store a host collaborator, returning the previous one of the same type
    pub fn insert<T: Any>(&mut self, service: T) -> Option<T> {
        self.extensions
            .insert(TypeId::of::<T>(), Box::new(service))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|service| service.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|service| service.downcast_mut::<T>())
    }

    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|service| service.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Number of unresolved slots, zero when the buckets are missing
    pub fn unresolved_count(&self) -> usize {
        self.buckets.as_ref().map_or(0, |b| b.unresolved.len())
    }
}

/// Borrow a required service or report it missing
pub fn require<'a, T: ?Sized>(
    service: Option<&'a T>,
    name: &'static str,
) -> Result<&'a T, PipelineError> {
    service.ok_or(PipelineError::MissingService(name))
}

/// Mutable counterpart of [`require`]
pub fn require_mut<'a, T: ?Sized>(
    service: Option<&'a mut T>,
    name: &'static str,
) -> Result<&'a mut T, PipelineError> {
    service.ok_or(PipelineError::MissingService(name))
}

/// Options passed to context builders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextOptions {
    /// Discover fields declared on base types too
    pub include_inherited: bool,
}

/// Produces a populated service registry for one resolution run
pub trait ContextBuilder: Send + Sync {
    fn name(&self) -> &'static str;

    fn build(&self, options: &ContextOptions) -> ServiceRegistry;
}

/// Core services backed by [`SlotFactory`] and a policy registry
#[derive(Clone)]
pub struct StandardContextBuilder {
    policies: Arc<PolicyRegistry>,
}

impl StandardContextBuilder {
    pub fn new(policies: Arc<PolicyRegistry>) -> Self {
        Self { policies }
    }

    pub fn policies(&self) -> &Arc<PolicyRegistry> {
        &self.policies
    }
}

impl Default for StandardContextBuilder {
    fn default() -> Self {
        Self::new(Arc::new(PolicyRegistry::builtin()))
    }
}

impl ContextBuilder for StandardContextBuilder {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn build(&self, options: &ContextOptions) -> ServiceRegistry {
        let factory =
            SlotFactory::new(self.policies.clone()).with_inherited(options.include_inherited);
        ServiceRegistry::standard(Box::new(factory))
    }
}
