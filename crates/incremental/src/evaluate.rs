//! Evaluation driver.
//!
//! A pass walks the topology layer by layer. Each element is evaluated only if
//! it is stale, and never if it, or anything it depends on, carries an error.
//! A failed element blocks everything downstream of it for the rest of the pass.

use crate::dataflow::Topology;
use crate::definition::{ColumnDefinition, Population};
use crate::operators::{
    accumulate, calculate, link, product, project, range, roll, EvalOutcome, Written,
};
use crate::schema::Schema;
use alloc::vec::Vec;
use colflow_core::{ColumnId, ElementId, EvalError, Result, TableId};
use hashbrown::HashSet;
use log::{debug, trace, warn};

/// What a pass did with each element it visited.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationReport {
    /// Elements whose data was recomputed.
    pub evaluated: Vec<ElementId>,
    /// Elements left as they were: up to date, or blocked by an error.
    pub skipped: Vec<ElementId>,
    /// Elements whose evaluation reported an error.
    pub failed: Vec<(ElementId, EvalError)>,
}

impl EvaluationReport {
    /// Returns true if no element failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Schema {
    /// Brings every dirty element up to date, then makes the current id ranges
    /// the baseline for the next pass.
    ///
    /// Failures are recorded on the failing element and in the report; they
    /// never abort the pass for unrelated elements.
    pub fn evaluate(&mut self) -> EvaluationReport {
        self.refresh_topology();
        let layers: Vec<Vec<ElementId>> = self
            .topology
            .as_ref()
            .map(|t| t.layers().to_vec())
            .unwrap_or_default();

        let mut report = EvaluationReport::default();
        let mut blocked = HashSet::new();
        let mut scheduled = HashSet::new();
        for layer in &layers {
            for &element in layer {
                scheduled.insert(element);
                self.process(element, &mut blocked, &mut report);
            }
        }
        for element in self.element_ids() {
            if !scheduled.contains(&element) {
                report.skipped.push(element);
            }
        }

        self.commit();
        self.settle();
        debug!(
            "evaluation pass: {} evaluated, {} skipped, {} failed",
            report.evaluated.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    /// Brings `target` and everything it transitively depends on up to date.
    ///
    /// Unlike [`evaluate`](Self::evaluate) it does not advance the delta
    /// baseline, so a later full pass still sees every change.
    pub fn evaluate_element(&mut self, target: ElementId) -> Result<EvaluationReport> {
        self.ensure_element(target)?;
        let order = Topology::closure_order(&Topology::closure(self, target));

        let mut report = EvaluationReport::default();
        let mut blocked = HashSet::new();
        for element in order {
            self.process(element, &mut blocked, &mut report);
        }
        self.settle();
        debug!(
            "evaluated {}: {} evaluated, {} failed",
            target,
            report.evaluated.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn process(
        &mut self,
        element: ElementId,
        blocked: &mut HashSet<ElementId>,
        report: &mut EvaluationReport,
    ) {
        self.state_mut(element).evaluation_errors.clear();
        let upstream_failed = !self.state(element).definition_errors.is_empty()
            || self
                .element_dependencies(element)
                .into_iter()
                .any(|dep| blocked.contains(&dep) || self.state(dep).has_errors());
        if upstream_failed {
            blocked.insert(element);
            report.skipped.push(element);
            return;
        }
        if !self.is_stale(element) {
            report.skipped.push(element);
            return;
        }

        match self.evaluate_one(element) {
            Ok(written) => {
                let now = self.tick();
                self.state_mut(element).data_changed_at = now;
                if let (ElementId::Column(column), Written::Rewritten) = (element, written) {
                    self.columns[column].rewritten_at = now;
                }
                trace!("evaluated {} ({:?})", element, written);
                report.evaluated.push(element);
            }
            Err(err) => {
                warn!("evaluation of {} failed: {}", element, err);
                self.state_mut(element).evaluation_errors.push(err.clone());
                blocked.insert(element);
                report.failed.push((element, err));
            }
        }
    }

    fn evaluate_one(&mut self, element: ElementId) -> EvalOutcome {
        match element {
            ElementId::Table(table) => self.evaluate_table(table),
            ElementId::Column(column) => self.evaluate_column(column),
        }
    }

    fn evaluate_column(&mut self, column: ColumnId) -> EvalOutcome {
        let Some(definition) = self.columns[column].definition.take() else {
            return Ok(Written::Appended);
        };
        let outcome = match &definition {
            ColumnDefinition::Calculate(calc) => calculate::evaluate(self, column, calc),
            ColumnDefinition::Link(def) => link::evaluate(self, column, def),
            // written while its target table is evaluated
            ColumnDefinition::Project(_) => Ok(Written::Rewritten),
            ColumnDefinition::Accumulate(acc) => accumulate::evaluate(self, column, acc),
            ColumnDefinition::Roll(def) => roll::evaluate(self, column, def),
        };
        self.columns[column].definition = Some(definition);
        outcome
    }

    fn evaluate_table(&mut self, table: TableId) -> EvalOutcome {
        let projects = self.incoming_projects(table);
        let population = self.tables[table].population.take();
        let outcome = self.populate_table(table, population.as_ref(), &projects);
        self.tables[table].population = population;
        outcome
    }

    fn populate_table(
        &mut self,
        table: TableId,
        population: Option<&Population>,
        projects: &[ColumnId],
    ) -> EvalOutcome {
        let written = match population {
            Some(Population::Range(intervals)) => range::populate(self, table, intervals)?,
            Some(Population::Product(rule)) if projects.is_empty() => {
                product::populate(self, table, rule)?
            }
            None if projects.is_empty() => return Ok(Written::Appended),
            _ => {
                self.remove_all_rows(table);
                Written::Rewritten
            }
        };

        for &column in projects {
            let Some(definition) = self.columns[column].definition.take() else {
                continue;
            };
            let outcome = match &definition {
                ColumnDefinition::Project(def) => {
                    project::evaluate(self, column, table, def, population)
                }
                _ => Ok(()),
            };
            self.columns[column].definition = Some(definition);
            outcome?;
        }
        Ok(written)
    }
}
