// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation of unit descriptors before a graph is built.
//!
//! The checks run in a fixed order, and the first failure ends the build:
//!
//! 1. **Uniqueness**: every unit name appears once
//! 2. **Single producer**: every variable has at most one producing unit
//! 3. **Acyclicity**: DFS over the producer → consumer edges
//!
//! Producer resolution has to succeed before edges exist, which is why cycle
//! detection runs last.
//!
//! # Cycle Detection Algorithm
//! Uses **depth-first search with a recursion stack**:
//! - **Time Complexity**: O(V + E) where V = units, E = variable edges
//! - **Space Complexity**: O(V) for the visited set, stack and path
//! - Roots and neighbours are visited in declaration order, so the reported
//!   cycle is deterministic for a given registration order.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::UnitDescriptor;
use crate::errors::GraphError;
use crate::observability::messages::validation::{
    AmbiguousProducerDetected, CyclicDependencyDetected, DuplicateUnitDetected,
};
use crate::observability::messages::StructuredLog;

/// Fail with `DuplicateUnit` for the first name that appears twice.
pub fn validate_unique_units(descriptors: &[UnitDescriptor]) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    for descriptor in descriptors {
        if !seen.insert(descriptor.name.as_str()) {
            DuplicateUnitDetected {
                unit: &descriptor.name,
            }
            .log();
            return Err(GraphError::DuplicateUnit {
                unit: descriptor.name.clone(),
            });
        }
    }
    Ok(())
}

/// Map every produced variable to the index of its one producer.
///
/// Fails with `AmbiguousProducer` when several units claim the same variable;
/// when there are several such variables the alphabetically first is reported.
pub fn resolve_producers(
    descriptors: &[UnitDescriptor],
) -> Result<HashMap<String, usize>, GraphError> {
    let mut claims: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, descriptor) in descriptors.iter().enumerate() {
        for variable in &descriptor.produces {
            claims.entry(variable.as_str()).or_default().push(index);
        }
    }

    if let Some((&variable, producers)) = claims.iter().find(|(_, units)| units.len() > 1) {
        let units: Vec<String> = producers
            .iter()
            .map(|&i| descriptors[i].name.clone())
            .collect();
        AmbiguousProducerDetected {
            variable,
            units: &units,
        }
        .log();
        return Err(GraphError::AmbiguousProducer {
            variable: variable.to_string(),
            units,
        });
    }

    Ok(claims
        .into_iter()
        .map(|(variable, units)| (variable.to_string(), units[0]))
        .collect())
}

/// Fail with `CycleDetected` if the producer → consumer edges contain a cycle.
///
/// `downstream[i]` holds the indices of the units consuming something unit `i`
/// produces. The reported cycle is closed: it starts and ends with the same unit.
pub fn validate_acyclic(
    descriptors: &[UnitDescriptor],
    downstream: &[BTreeSet<usize>],
) -> Result<(), GraphError> {
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for root in 0..descriptors.len() {
        if visited.contains(&root) {
            continue;
        }
        if let Some(cycle) =
            dfs_cycle_detection(root, downstream, &mut visited, &mut rec_stack, &mut path)
        {
            let cycle: Vec<String> = cycle
                .into_iter()
                .map(|i| descriptors[i].name.clone())
                .collect();
            CyclicDependencyDetected { cycle: &cycle }.log();
            return Err(GraphError::CycleDetected { cycle });
        }
    }

    Ok(())
}

/// Depth-first search that returns the cycle path when it meets a node that is
/// still on the recursion stack.
///
/// For A → B → C → A starting at A the path grows to `[A, B, C]`, the edge back
/// to A finds A on the stack at position 0, and the result is `[A, B, C, A]`.
fn dfs_cycle_detection(
    node: usize,
    downstream: &[BTreeSet<usize>],
    visited: &mut HashSet<usize>,
    rec_stack: &mut HashSet<usize>,
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    for &neighbor in &downstream[node] {
        if !visited.contains(&neighbor) {
            if let Some(cycle) = dfs_cycle_detection(neighbor, downstream, visited, rec_stack, path)
            {
                return Some(cycle);
            }
        } else if rec_stack.contains(&neighbor) {
            let cycle_start = path.iter().position(|&x| x == neighbor).unwrap_or(0);
            let mut cycle = path[cycle_start..].to_vec();
            cycle.push(neighbor);
            return Some(cycle);
        }
    }

    rec_stack.remove(&node);
    path.pop();
    None
}
