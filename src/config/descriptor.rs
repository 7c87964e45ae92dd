// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::errors::{MalformedMetadataError, MetadataIssue};

/// Where the executable body of a unit lives.
///
/// The engine never looks inside the body; the location only tells the
/// backends how to start it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitLocation {
    /// A script file found by scanning, run through the configured interpreter
    Script { path: PathBuf },
    /// An explicit command declared in the engine configuration
    Command { program: String, args: Vec<String> },
    /// A body registered from Rust code
    InProcess,
}

/// The declared interface of one unit: what it needs and what it makes.
///
/// Descriptors are immutable once built. Use [`UnitDescriptor::new`] to get
/// one whose names have been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitDescriptor {
    pub name: String,
    pub requires: BTreeSet<String>,
    pub produces: BTreeSet<String>,
    pub location: UnitLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UnitDescriptor {
    /// Build a descriptor, rejecting invalid names and conflicting declarations.
    pub fn new<R, P>(
        name: impl Into<String>,
        requires: R,
        produces: P,
        location: UnitLocation,
    ) -> Result<Self, MalformedMetadataError>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let name = name.into();
        validate_unit_name(&name)?;

        let requires = collect_names(&name, "REQUIRES", requires)?;
        let produces = collect_names(&name, "PRODUCE", produces)?;

        if let Some(variable) = requires.intersection(&produces).next() {
            return Err(MalformedMetadataError::new(
                &name,
                MetadataIssue::ConflictingDeclaration {
                    variable: variable.clone(),
                },
            ));
        }

        Ok(Self {
            name,
            requires,
            produces,
            location,
            description: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }
}

/// True for `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Unit names double as file stems and CLI arguments, so they are kept to
/// ASCII letters, digits, `_`, `-` and `.`.
pub fn validate_unit_name(name: &str) -> Result<(), MalformedMetadataError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(MalformedMetadataError::new(
            name,
            MetadataIssue::InvalidUnitName {
                name: name.to_string(),
            },
        ))
    }
}

fn collect_names<I>(
    unit: &str,
    marker: &str,
    names: I,
) -> Result<BTreeSet<String>, MalformedMetadataError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut collected = BTreeSet::new();
    for name in names {
        let name: String = name.into();
        if name.is_empty() {
            return Err(MalformedMetadataError::new(
                unit,
                MetadataIssue::EmptyVariableName {
                    marker: marker.to_string(),
                },
            ));
        }
        if !is_valid_variable_name(&name) {
            return Err(MalformedMetadataError::new(
                unit,
                MetadataIssue::InvalidVariableName {
                    marker: marker.to_string(),
                    name,
                },
            ));
        }
        collected.insert(name);
    }
    Ok(collected)
}
