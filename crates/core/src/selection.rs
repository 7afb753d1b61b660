//! User selection of methods: whitelist or blacklist.

use crate::error::{KeepAwakeError, KeepAwakeResult};
use crate::method::MethodDescriptor;
use std::collections::BTreeSet;

/// Which of a mode's methods the caller wants to use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Use every method of the mode.
    #[default]
    All,
    /// Use only these methods. Unknown names are an error.
    UseOnly(Vec<String>),
    /// Use every method except these. Unknown names are ignored.
    Omit(Vec<String>),
}

impl Selection {
    pub fn use_only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::UseOnly(names.into_iter().map(Into::into).collect())
    }

    pub fn omit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Omit(names.into_iter().map(Into::into).collect())
    }
}

/// Apply `selection` to the methods of `mode_name`, keeping their order.
pub fn select_methods(
    mode_name: &str,
    methods: &[MethodDescriptor],
    selection: &Selection,
) -> KeepAwakeResult<Vec<MethodDescriptor>> {
    let selected: Vec<MethodDescriptor> = match selection {
        Selection::All => methods.to_vec(),
        Selection::Omit(omit) => methods
            .iter()
            .filter(|m| !omit.iter().any(|name| name == m.name()))
            .cloned()
            .collect(),
        Selection::UseOnly(use_only) => {
            let selected: Vec<MethodDescriptor> = methods
                .iter()
                .filter(|m| use_only.iter().any(|name| name == m.name()))
                .cloned()
                .collect();

            let missing: BTreeSet<&String> = use_only
                .iter()
                .filter(|name| !selected.iter().any(|m| m.name() == name.as_str()))
                .collect();
            if !missing.is_empty() {
                return Err(KeepAwakeError::UnrecognizedMethodNames {
                    mode: mode_name.to_string(),
                    missing: missing.into_iter().cloned().collect(),
                });
            }
            selected
        }
    };

    tracing::debug!(
        mode = %mode_name,
        selected = ?selected.iter().map(MethodDescriptor::name).collect::<Vec<_>>(),
        "selected methods"
    );

    if !methods.is_empty() && selected.is_empty() {
        tracing::warn!(
            mode = %mode_name,
            available = ?methods.iter().map(MethodDescriptor::name).collect::<Vec<_>>(),
            "no methods selected; activating this mode will fail"
        );
    }

    Ok(selected)
}
