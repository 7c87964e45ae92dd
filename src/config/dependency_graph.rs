// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::config::validation::{resolve_producers, validate_acyclic, validate_unique_units};
use crate::config::UnitDescriptor;
use crate::errors::GraphError;
use crate::observability::messages::validation::GraphBuilt;
use crate::observability::messages::StructuredLog;

/// A producer → consumer edge labelled with the variable that links them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub variable: String,
}

/// Validated, immutable dependency graph over a set of unit descriptors.
///
/// Nodes are units; there is an edge A → B for every variable A produces that
/// B requires. A graph only exists if it passed validation, so it is always
/// acyclic and every variable has at most one producer. Any change to the
/// registered units means building a new graph.
///
/// Units keep the order in which they were declared, and every query that
/// returns several units uses that order to break ties.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    descriptors: Vec<UnitDescriptor>,
    index: HashMap<String, usize>,
    producers: HashMap<String, usize>,
    upstream: Vec<BTreeSet<usize>>,
    downstream: Vec<BTreeSet<usize>>,
    edges: Vec<Edge>,
}

impl DependencyGraph {
    /// Validate `descriptors` and build the graph.
    ///
    /// # Errors
    /// `DuplicateUnit`, `AmbiguousProducer` or `CycleDetected`, checked in that
    /// order.
    pub fn build(descriptors: &[UnitDescriptor]) -> Result<Self, GraphError> {
        validate_unique_units(descriptors)?;
        let producers = resolve_producers(descriptors)?;

        let mut upstream = vec![BTreeSet::new(); descriptors.len()];
        let mut downstream = vec![BTreeSet::new(); descriptors.len()];
        let mut edges = Vec::new();

        for (consumer, descriptor) in descriptors.iter().enumerate() {
            for variable in &descriptor.requires {
                if let Some(&producer) = producers.get(variable) {
                    upstream[consumer].insert(producer);
                    downstream[producer].insert(consumer);
                    edges.push(Edge {
                        from: descriptors[producer].name.clone(),
                        to: descriptor.name.clone(),
                        variable: variable.clone(),
                    });
                }
            }
        }

        validate_acyclic(descriptors, &downstream)?;

        GraphBuilt {
            unit_count: descriptors.len(),
            edge_count: edges.len(),
        }
        .log();

        Ok(Self {
            descriptors: descriptors.to_vec(),
            index: descriptors
                .iter()
                .enumerate()
                .map(|(i, d)| (d.name.clone(), i))
                .collect(),
            producers,
            upstream,
            downstream,
            edges,
        })
    }

    /// Units that directly produce something `unit` requires.
    pub fn dependencies_of(&self, unit: &str) -> Result<Vec<&str>, GraphError> {
        let index = self.index_of(unit)?;
        Ok(self.names(&self.upstream[index]))
    }

    /// Units that directly consume something `unit` produces.
    pub fn dependents_of(&self, unit: &str) -> Result<Vec<&str>, GraphError> {
        let index = self.index_of(unit)?;
        Ok(self.names(&self.downstream[index]))
    }

    /// Every unit `unit` transitively depends on, in an order that can be
    /// executed front to back, with `unit` itself last.
    ///
    /// Kahn's algorithm over the dependency closure; when several units are
    /// ready at once, the one declared first goes first.
    pub fn transitive_dependency_order(&self, unit: &str) -> Result<Vec<&str>, GraphError> {
        let target = self.index_of(unit)?;

        let mut closure = BTreeSet::from([target]);
        let mut pending = vec![target];
        while let Some(current) = pending.pop() {
            for &producer in &self.upstream[current] {
                if closure.insert(producer) {
                    pending.push(producer);
                }
            }
        }

        let mut in_degree: HashMap<usize, usize> = closure
            .iter()
            .map(|&i| (i, self.upstream[i].len()))
            .collect();
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(closure.len());
        while let Some(current) = ready.pop_first() {
            order.push(self.descriptors[current].name.as_str());
            for consumer in self.downstream[current].intersection(&closure) {
                if let Some(degree) = in_degree.get_mut(consumer) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*consumer);
                    }
                }
            }
        }

        Ok(order)
    }

    /// The unit that produces `variable`, if any.
    pub fn producer_of(&self, variable: &str) -> Option<&str> {
        self.producers
            .get(variable)
            .map(|&i| self.descriptors[i].name.as_str())
    }

    pub fn descriptor(&self, unit: &str) -> Result<&UnitDescriptor, GraphError> {
        Ok(&self.descriptors[self.index_of(unit)?])
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.index.contains_key(unit)
    }

    /// Unit names in declaration order.
    pub fn nodes(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn descriptors(&self) -> &[UnitDescriptor] {
        &self.descriptors
    }

    /// All edges, grouped by consumer in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Variables some unit requires but no unit produces.
    ///
    /// These have to be in the store already for their consumers to run.
    pub fn root_inputs(&self) -> BTreeSet<&str> {
        self.descriptors
            .iter()
            .flat_map(|d| d.requires.iter())
            .filter(|variable| !self.producers.contains_key(*variable))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn index_of(&self, unit: &str) -> Result<usize, GraphError> {
        self.index
            .get(unit)
            .copied()
            .ok_or_else(|| GraphError::UnknownUnit {
                unit: unit.to_string(),
            })
    }

    fn names(&self, indices: &BTreeSet<usize>) -> Vec<&str> {
        indices
            .iter()
            .map(|&i| self.descriptors[i].name.as_str())
            .collect()
    }
}
