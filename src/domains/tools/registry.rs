//! Tool Registry - maps every exposed tool name to its owning backend.
//!
//! The registry is filled once during discovery and is read-only afterwards.
//! Live re-discovery builds a fresh registry and swaps it in through
//! [`RegistryHandle`], so a lookup never observes a half-merged mapping.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::descriptor::ToolDescriptor;
use crate::domains::backends::BackendBinding;

/// What to do when a second backend exports an already registered name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The later registration replaces the earlier one (historical behavior).
    #[default]
    Replace,

    /// The first registration is kept; later ones are dropped.
    Reject,

    /// The later registration is exposed as `<backend>__<tool>`. If that name
    /// is taken as well, the later registration is dropped.
    Prefix,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "reject" => Ok(Self::Reject),
            "prefix" => Ok(Self::Prefix),
            other => Err(format!("unknown collision policy: {}", other)),
        }
    }
}

/// One exposed tool: its public name, owning backend and descriptor.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Name callers use. Differs from the descriptor's name only under
    /// [`CollisionPolicy::Prefix`].
    pub tool_name: String,
    pub backend: BackendBinding,
    pub descriptor: ToolDescriptor,
}

/// The merged tool namespace.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
    policy: CollisionPolicy,
}

impl ToolRegistry {
    /// Create an empty registry with the default (replace) policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Register `descriptor` as provided by `backend`.
    pub fn register(&mut self, backend: &BackendBinding, descriptor: ToolDescriptor) {
        self.merge(RegistryEntry {
            tool_name: descriptor.name().to_string(),
            backend: backend.clone(),
            descriptor,
        });
    }

    /// The single place where name collisions are resolved.
    fn merge(&mut self, mut entry: RegistryEntry) {
        let Some(&slot) = self.index.get(&entry.tool_name) else {
            self.insert(entry);
            return;
        };

        let previous = self.entries[slot].backend.name().to_string();
        match self.policy {
            CollisionPolicy::Replace => {
                debug!(
                    "Tool '{}' from '{}' replaces the one from '{}'",
                    entry.tool_name,
                    entry.backend.name(),
                    previous
                );
                // Keeps the position of the first registration.
                self.entries[slot] = entry;
            }
            CollisionPolicy::Reject => {
                warn!(
                    "Tool '{}' from '{}' ignored: already provided by '{}'",
                    entry.tool_name,
                    entry.backend.name(),
                    previous
                );
            }
            CollisionPolicy::Prefix => {
                let prefixed = format!("{}__{}", entry.backend.name(), entry.tool_name);
                if let Some(&taken) = self.index.get(&prefixed) {
                    warn!(
                        "Tool '{}' from '{}' ignored: '{}' already provided by '{}'",
                        entry.tool_name,
                        entry.backend.name(),
                        prefixed,
                        self.entries[taken].backend.name()
                    );
                    return;
                }
                entry.tool_name = prefixed;
                self.insert(entry);
            }
        }
    }

    fn insert(&mut self, entry: RegistryEntry) {
        self.index.insert(entry.tool_name.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Find the entry for an exposed tool name.
    pub fn lookup(&self, tool_name: &str) -> Option<&RegistryEntry> {
        self.index.get(tool_name).map(|&slot| &self.entries[slot])
    }

    /// All entries in registration order.
    pub fn list_all(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Exposed tool names in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.tool_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared, swappable view of the current registry.
#[derive(Debug, Default)]
pub struct RegistryHandle {
    current: RwLock<Arc<ToolRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// The registry as of now. Holding the snapshot keeps it alive across a swap.
    pub async fn snapshot(&self) -> Arc<ToolRegistry> {
        self.current.read().await.clone()
    }

    /// Replace the whole registry at once.
    pub async fn replace(&self, registry: ToolRegistry) {
        *self.current.write().await = Arc::new(registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::backends::testing::{FakeBackend, tool};

    fn binding(name: &str) -> BackendBinding {
        BackendBinding::connected(name, Arc::new(FakeBackend::with_tools(&[])))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(&binding("files"), tool("read_file", &[("path", "string")]));

        let entry = registry.lookup("read_file").unwrap();
        assert_eq!(entry.backend.name(), "files");
        assert_eq!(entry.descriptor.params().len(), 1);
        assert!(registry.lookup("write_file").is_none());
    }

    #[test]
    fn test_collision_last_write_wins() {
        let mut registry = ToolRegistry::new();
        registry.register(&binding("alpha"), tool("x", &[]));
        registry.register(&binding("alpha"), tool("y", &[]));
        registry.register(&binding("beta"), tool("x", &[]));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("x").unwrap().backend.name(), "beta");
        // The replaced entry keeps its original position.
        assert_eq!(registry.tool_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_collision_reject_keeps_first() {
        let mut registry = ToolRegistry::with_policy(CollisionPolicy::Reject);
        registry.register(&binding("alpha"), tool("x", &[]));
        registry.register(&binding("beta"), tool("x", &[]));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("x").unwrap().backend.name(), "alpha");
    }

    #[test]
    fn test_collision_prefix_exposes_both() {
        let mut registry = ToolRegistry::with_policy(CollisionPolicy::Prefix);
        registry.register(&binding("alpha"), tool("x", &[]));
        registry.register(&binding("beta"), tool("x", &[]));

        assert_eq!(registry.tool_names(), vec!["x", "beta__x"]);
        let prefixed = registry.lookup("beta__x").unwrap();
        assert_eq!(prefixed.backend.name(), "beta");
        assert_eq!(prefixed.descriptor.name(), "x");
    }

    #[test]
    fn test_collision_prefix_never_overwrites() {
        let mut registry = ToolRegistry::with_policy(CollisionPolicy::Prefix);
        registry.register(&binding("alpha"), tool("beta__x", &[]));
        registry.register(&binding("alpha"), tool("x", &[]));
        registry.register(&binding("beta"), tool("x", &[]));
        registry.register(&binding("beta"), tool("x", &[]));

        assert_eq!(registry.tool_names(), vec!["beta__x", "x"]);
        assert_eq!(registry.lookup("beta__x").unwrap().backend.name(), "alpha");
        assert_eq!(registry.lookup("beta__x").unwrap().descriptor.name(), "beta__x");
    }

    #[test]
    fn test_collision_policy_from_str() {
        assert_eq!("replace".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Replace));
        assert_eq!("REJECT".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Reject));
        assert_eq!("prefix".parse::<CollisionPolicy>(), Ok(CollisionPolicy::Prefix));
        assert!("merge".parse::<CollisionPolicy>().is_err());
    }

    #[tokio::test]
    async fn test_handle_swap_keeps_old_snapshot() {
        let mut first = ToolRegistry::new();
        first.register(&binding("alpha"), tool("old", &[]));
        let handle = RegistryHandle::new(first);

        let before = handle.snapshot().await;

        let mut second = ToolRegistry::new();
        second.register(&binding("alpha"), tool("new", &[]));
        handle.replace(second).await;

        assert_eq!(before.tool_names(), vec!["old"]);
        assert_eq!(handle.snapshot().await.tool_names(), vec!["new"]);
    }
}
