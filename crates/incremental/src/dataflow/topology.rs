//! Evaluation order.

use crate::schema::Schema;
use alloc::vec::Vec;
use colflow_core::ElementId;
use hashbrown::HashSet;

/// Layered evaluation order of the whole schema.
///
/// Every element of a layer depends only on elements of earlier layers.
/// Elements carrying a definition error never enter a layer, and neither does
/// anything downstream of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    layers: Vec<Vec<ElementId>>,
    built_at: u64,
}

impl Topology {
    /// Builds the schema-wide layering.
    pub(crate) fn build(schema: &Schema) -> Self {
        let elements: Vec<(ElementId, Vec<ElementId>)> = schema
            .element_ids()
            .into_iter()
            .filter(|&e| schema.state(e).definition_errors.is_empty())
            .map(|e| (e, schema.element_dependencies(e)))
            .collect();

        let mut done: HashSet<ElementId> = HashSet::with_capacity(elements.len());
        let mut layers = Vec::new();
        loop {
            let layer: Vec<ElementId> = elements
                .iter()
                .filter(|(e, deps)| !done.contains(e) && deps.iter().all(|d| done.contains(d)))
                .map(|(e, _)| *e)
                .collect();
            if layer.is_empty() {
                break;
            }
            done.extend(layer.iter().copied());
            layers.push(layer);
        }

        Self {
            layers,
            built_at: schema.clock(),
        }
    }

    /// Backward closure of `target`: layer 0 is the target, each further layer
    /// holds the dependencies of the previous one.
    pub(crate) fn closure(schema: &Schema, target: ElementId) -> Vec<Vec<ElementId>> {
        let mut layers = Vec::new();
        let mut current = alloc::vec![target];
        while !current.is_empty() {
            let mut next = Vec::new();
            for &element in &current {
                for dep in schema.element_dependencies(element) {
                    if !next.contains(&dep) {
                        next.push(dep);
                    }
                }
            }
            layers.push(current);
            current = next;
        }
        layers
    }

    /// Flattens a closure into evaluation order: deepest first, each element at
    /// its deepest occurrence only.
    pub(crate) fn closure_order(layers: &[Vec<ElementId>]) -> Vec<ElementId> {
        let mut seen = HashSet::new();
        layers
            .iter()
            .rev()
            .flatten()
            .copied()
            .filter(|e| seen.insert(*e))
            .collect()
    }

    pub fn layers(&self) -> &[Vec<ElementId>] {
        &self.layers
    }

    /// Clock value at which the layering was computed.
    #[inline]
    pub fn built_at(&self) -> u64 {
        self.built_at
    }

    /// Number of scheduled elements.
    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.layers.iter().any(|layer| layer.contains(&element))
    }
}

impl Schema {
    /// Returns the current schema-wide topology, rebuilding it if any definition
    /// changed since it was last built.
    pub fn topology(&mut self) -> &Topology {
        self.refresh_topology();
        self.topology.get_or_insert_with(Topology::default)
    }

    pub(crate) fn refresh_topology(&mut self) {
        let stale = match &self.topology {
            Some(topology) => self.newest_definition_change() > topology.built_at,
            None => true,
        };
        if stale {
            let topology = Topology::build(self);
            log::debug!(
                "rebuilt topology: {} layers, {} elements",
                topology.layers.len(),
                topology.len()
            );
            self.topology = Some(topology);
        }
    }
}
