//! Lookup table from mode name to its candidate methods.

use crate::error::{KeepAwakeError, KeepAwakeResult};
use crate::method::MethodDescriptor;
use std::collections::BTreeMap;

/// Methods registered per mode, in registration order.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    modes: BTreeMap<String, Vec<MethodDescriptor>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method to the mode named in its info. Names are unique per mode.
    pub fn register(&mut self, descriptor: MethodDescriptor) -> KeepAwakeResult<()> {
        let mode = descriptor.info().mode_name.clone();
        let methods = self.modes.entry(mode.clone()).or_default();

        if methods.iter().any(|m| m.name() == descriptor.name()) {
            return Err(KeepAwakeError::DuplicateMethodName {
                mode,
                name: descriptor.name().to_string(),
            });
        }

        tracing::trace!(mode = %mode, method = %descriptor.name(), "registered method");
        methods.push(descriptor);
        Ok(())
    }

    /// Candidate methods of `mode_name`; empty for unknown modes.
    pub fn methods_for_mode(&self, mode_name: &str) -> Vec<MethodDescriptor> {
        self.modes.get(mode_name).cloned().unwrap_or_default()
    }

    pub fn get(&self, mode_name: &str, method_name: &str) -> Option<&MethodDescriptor> {
        self.modes
            .get(mode_name)?
            .iter()
            .find(|m| m.name() == method_name)
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scripted;

    #[test]
    fn test_register_keeps_order() {
        let mut registry = MethodRegistry::new();
        registry.register(scripted("B").descriptor()).unwrap();
        registry.register(scripted("A").descriptor()).unwrap();

        let names: Vec<String> = registry
            .methods_for_mode("foo")
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(registry.get("foo", "A").is_some());
        assert_eq!(registry.mode_names().collect::<Vec<_>>(), vec!["foo"]);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = MethodRegistry::new();
        registry.register(scripted("A").descriptor()).unwrap();
        let err = registry.register(scripted("A").descriptor()).unwrap_err();
        assert!(matches!(err, KeepAwakeError::DuplicateMethodName { .. }));
    }

    #[test]
    fn test_unknown_mode_is_empty() {
        let registry = MethodRegistry::new();
        assert!(registry.methods_for_mode("nope").is_empty());
        assert!(registry.get("nope", "A").is_none());
    }
}
