//! Dependency graph over schema elements.
//!
//! Dependencies are not stored; they are derived from the current definitions
//! whenever they are needed. Acyclicity is enforced when definitions are attached.

use crate::definition::{ColumnDefinition, Population};
use crate::schema::Schema;
use alloc::vec::Vec;
use colflow_core::{ColumnId, ElementId, Result, TableId};
use hashbrown::{HashMap, HashSet};

/// Appends `element` unless it is already present.
fn push_unique(deps: &mut Vec<ElementId>, element: ElementId) {
    if !deps.contains(&element) {
        deps.push(element);
    }
}

fn push_path(deps: &mut Vec<ElementId>, path: &[ColumnId]) {
    for &column in path {
        push_unique(deps, ElementId::Column(column));
    }
}

impl Schema {
    /// Returns the immediate dependencies of `element`.
    pub fn dependencies(&self, element: ElementId) -> Result<Vec<ElementId>> {
        self.ensure_element(element)?;
        Ok(self.element_dependencies(element))
    }

    /// Returns true if `element` may be stale relative to its definition or its dependencies.
    pub fn is_dirty(&self, element: ElementId) -> Result<bool> {
        self.ensure_element(element)?;
        let mut memo = HashMap::new();
        Ok(self.dirty(element, &mut memo))
    }

    pub(crate) fn element_dependencies(&self, element: ElementId) -> Vec<ElementId> {
        match element {
            ElementId::Table(id) => {
                self.table_dependencies_of(id, self.tables[id].population.as_ref())
            }
            ElementId::Column(id) => {
                self.column_dependencies_of(id, self.columns[id].definition.as_ref())
            }
        }
    }

    /// Dependencies `column` would have under `definition`.
    pub(crate) fn column_dependencies_of(
        &self,
        column: ColumnId,
        definition: Option<&ColumnDefinition>,
    ) -> Vec<ElementId> {
        let col = &self.columns[column];
        let mut deps = alloc::vec![ElementId::Table(col.input)];
        match definition {
            None => {}
            Some(ColumnDefinition::Calculate(calc)) => {
                for path in &calc.params {
                    push_path(&mut deps, path);
                }
            }
            Some(ColumnDefinition::Link(link)) => {
                if let Some(output) = col.output.table() {
                    push_unique(&mut deps, ElementId::Table(output));
                }
                for &key in &link.keys {
                    push_unique(&mut deps, ElementId::Column(key));
                }
                for path in link.source_paths() {
                    push_path(&mut deps, path);
                }
            }
            Some(ColumnDefinition::Project(link)) => {
                // key columns are written by the target table's own evaluation
                if let Some(output) = col.output.table() {
                    push_unique(&mut deps, ElementId::Table(output));
                }
                for path in link.source_paths() {
                    push_path(&mut deps, path);
                }
            }
            Some(ColumnDefinition::Accumulate(acc)) => {
                if let Some(&first) = acc.group.first() {
                    if let Some(fact) = self.columns.get(first) {
                        push_unique(&mut deps, ElementId::Table(fact.input));
                    }
                }
                push_path(&mut deps, &acc.group);
                for path in &acc.params {
                    push_path(&mut deps, path);
                }
            }
            Some(ColumnDefinition::Roll(roll)) => {
                if let crate::definition::RollDistance::Path(path) = &roll.distance {
                    push_path(&mut deps, path);
                }
                for path in &roll.params {
                    push_path(&mut deps, path);
                }
            }
        }
        deps
    }

    /// Dependencies `table` would have under `population`, including those of its
    /// incoming project columns.
    pub(crate) fn table_dependencies_of(
        &self,
        table: TableId,
        population: Option<&Population>,
    ) -> Vec<ElementId> {
        let mut deps = Vec::new();
        if let Some(Population::Product(product)) = population {
            for &key in &product.keys {
                if let Some(domain) = self.columns.get(key).and_then(|k| k.output.table()) {
                    push_unique(&mut deps, ElementId::Table(domain));
                }
            }
            if let Some(predicate) = &product.predicate {
                for path in &predicate.params {
                    // the leading key column is written by this table
                    push_path(&mut deps, path.get(1..).unwrap_or(&[]));
                }
            }
        }
        for project in self.incoming_projects(table) {
            self.push_project_sources(&mut deps, project);
        }
        deps
    }

    fn push_project_sources(&self, deps: &mut Vec<ElementId>, project: ColumnId) {
        let col = &self.columns[project];
        push_unique(deps, ElementId::Table(col.input));
        if let Some(ColumnDefinition::Project(link)) = &col.definition {
            for path in link.source_paths() {
                push_path(deps, path);
            }
        }
    }

    /// Project columns whose output is `table` and whose definition is in effect.
    pub(crate) fn incoming_projects(&self, table: TableId) -> Vec<ColumnId> {
        self.columns
            .iter()
            .filter(|c| {
                matches!(c.definition, Some(ColumnDefinition::Project(_)))
                    && c.output.table() == Some(table)
                    && c.state.definition_errors.is_empty()
            })
            .map(|c| c.id)
            .collect()
    }

    /// Returns true if `target` is reachable from `start` through dependency edges.
    ///
    /// `extra` adds edges that a pending definition would introduce.
    pub(crate) fn reaches(
        &self,
        start: &[ElementId],
        target: ElementId,
        extra: Option<(ElementId, &[ElementId])>,
    ) -> bool {
        let mut visited: HashSet<ElementId> = HashSet::new();
        let mut frontier: Vec<ElementId> = start.to_vec();
        while let Some(element) = frontier.pop() {
            if element == target {
                return true;
            }
            if !visited.insert(element) {
                continue;
            }
            frontier.extend(self.element_dependencies(element));
            if let Some((from, edges)) = extra {
                if from == element {
                    frontier.extend_from_slice(edges);
                }
            }
        }
        false
    }

    /// Direct staleness: a newer definition than data, or a dependency whose data
    /// changed after this element's.
    pub(crate) fn is_stale(&self, element: ElementId) -> bool {
        let state = self.state(element);
        let own = state.data_changed_at;
        if state.definition_changed_at > own {
            return true;
        }
        if let ElementId::Table(table) = element {
            let projects = self.incoming_projects(table);
            if projects
                .iter()
                .any(|&p| self.columns[p].state.definition_changed_at > own)
            {
                return true;
            }
        }
        self.element_dependencies(element)
            .into_iter()
            .any(|dep| self.state(dep).data_changed_at > own)
    }

    pub(crate) fn dirty(&self, element: ElementId, memo: &mut HashMap<ElementId, bool>) -> bool {
        if let Some(&dirty) = memo.get(&element) {
            return dirty;
        }
        let dirty = self.is_stale(element)
            || self
                .element_dependencies(element)
                .into_iter()
                .any(|dep| self.dirty(dep, memo));
        memo.insert(element, dirty);
        dirty
    }
}
