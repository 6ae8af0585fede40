//! Definition surface.
//!
//! Attaching a definition validates its paths and keys and rejects it if the
//! element would (transitively) read itself. A rejected definition leaves the
//! previous one in place and records exactly one definition error.

use super::Schema;
use crate::definition::{
    Accumulate, Calculate, ColumnDefinition, KeySource, Link, Population, Product, RangePopulation,
    Roll, RollDistance,
};
use alloc::format;
use alloc::vec;
use colflow_core::{
    ColumnId, ColumnType, DataType, DefinitionError, ElementId, Error, Result, TableId, Value,
};

impl Schema {
    /// Attaches `definition` to `column`, making it derived.
    pub fn define_column(&mut self, column: ColumnId, definition: ColumnDefinition) -> Result<()> {
        self.column(column)?;
        let element = ElementId::Column(column);
        if let Err(err) = self
            .validate_column_definition(column, &definition)
            .and_then(|()| self.check_column_cycle(column, &definition))
        {
            return Err(self.reject(element, err));
        }

        let now = self.tick();
        let col = &mut self.columns[column];
        log::debug!("column {} defined as {:?}", col.name, definition.kind());
        col.definition = Some(definition);
        col.cursor = None;
        col.state.definition_changed_at = now;
        col.state.definition_errors.clear();
        col.state.evaluation_errors.clear();
        Ok(())
    }

    /// Removes the definition of `column`; its values become externally set again.
    pub fn clear_column_definition(&mut self, column: ColumnId) -> Result<()> {
        self.column(column)?;
        let now = self.tick();
        let col = &mut self.columns[column];
        col.definition = None;
        col.cursor = None;
        col.state.definition_changed_at = now;
        col.state.definition_errors.clear();
        col.state.evaluation_errors.clear();
        Ok(())
    }

    /// Attaches a population rule to `table`, making its rows derived.
    pub fn define_table(&mut self, table: TableId, population: Population) -> Result<()> {
        self.table(table)?;
        let element = ElementId::Table(table);
        let validated = match &population {
            Population::Product(product) => self.validate_product(table, product),
            Population::Range(range) => self.validate_range(table, range),
        };
        if let Err(err) = validated.and_then(|()| {
            let deps = self.table_dependencies_of(table, Some(&population));
            self.check_cycle(element, &deps, None)
        }) {
            return Err(self.reject(element, err));
        }

        let now = self.tick();
        let t = &mut self.tables[table];
        log::debug!("table {} populated by {:?}", t.name, population.kind());
        t.population = Some(population);
        t.state.definition_changed_at = now;
        t.state.definition_errors.clear();
        t.state.evaluation_errors.clear();
        Ok(())
    }

    /// Removes the population rule of `table`. Existing rows are kept.
    pub fn clear_table_definition(&mut self, table: TableId) -> Result<()> {
        self.table(table)?;
        let now = self.tick();
        let t = &mut self.tables[table];
        t.population = None;
        t.state.definition_changed_at = now;
        t.state.definition_errors.clear();
        t.state.evaluation_errors.clear();
        Ok(())
    }

    /// Records `err` as the only definition error of `element`.
    fn reject(&mut self, element: ElementId, err: DefinitionError) -> Error {
        log::warn!("definition of {} rejected: {}", element, err);
        let now = self.tick();
        let state = self.state_mut(element);
        state.definition_errors = vec![err.clone()];
        state.definition_changed_at = now;
        Error::Definition(err)
    }

    fn check_cycle(
        &self,
        element: ElementId,
        deps: &[ElementId],
        extra: Option<(ElementId, &[ElementId])>,
    ) -> core::result::Result<(), DefinitionError> {
        if self.reaches(deps, element, extra) {
            return Err(DefinitionError::CyclicDependency { element });
        }
        Ok(())
    }

    fn check_column_cycle(
        &self,
        column: ColumnId,
        definition: &ColumnDefinition,
    ) -> core::result::Result<(), DefinitionError> {
        let element = ElementId::Column(column);
        let deps = self.column_dependencies_of(column, Some(definition));
        let ColumnDefinition::Project(link) = definition else {
            return self.check_cycle(element, &deps, None);
        };

        // the target table will also depend on this projection's sources
        let col = &self.columns[column];
        let target = match col.output.table() {
            Some(t) => ElementId::Table(t),
            None => return self.check_cycle(element, &deps, None),
        };
        let mut sources = vec![ElementId::Table(col.input)];
        for path in link.source_paths() {
            sources.extend(path.iter().map(|&c| ElementId::Column(c)));
        }
        self.check_cycle(element, &deps, Some((target, &sources)))?;
        if self.reaches(&sources, target, Some((target, &sources))) {
            return Err(DefinitionError::CyclicDependency { element: target });
        }
        Ok(())
    }

    fn validate_column_definition(
        &self,
        column: ColumnId,
        definition: &ColumnDefinition,
    ) -> core::result::Result<(), DefinitionError> {
        match definition {
            ColumnDefinition::Calculate(calc) => self.validate_calculate(column, calc),
            ColumnDefinition::Link(link) => self.validate_link(column, link, false),
            ColumnDefinition::Project(link) => self.validate_link(column, link, true),
            ColumnDefinition::Accumulate(acc) => self.validate_accumulate(column, acc),
            ColumnDefinition::Roll(roll) => self.validate_roll(column, roll),
        }
    }

    fn validate_calculate(
        &self,
        column: ColumnId,
        calc: &Calculate,
    ) -> core::result::Result<(), DefinitionError> {
        let input = self.columns[column].input;
        for path in &calc.params {
            self.validate_value_path(input, path)?;
        }
        Ok(())
    }

    fn validate_link(
        &self,
        column: ColumnId,
        link: &Link,
        project: bool,
    ) -> core::result::Result<(), DefinitionError> {
        let col = &self.columns[column];
        let Some(target) = col.output.table() else {
            return Err(if project {
                DefinitionError::NotPopulationCapable { column }
            } else {
                DefinitionError::invalid(format!("link column {} does not output a table", col.name))
            });
        };
        if project && target == col.input {
            return Err(DefinitionError::NotPopulationCapable { column });
        }
        if link.keys.len() != link.values.len() {
            return Err(DefinitionError::KeyArity {
                keys: link.keys.len(),
                values: link.values.len(),
            });
        }
        if link.keys.is_empty() {
            return Err(DefinitionError::invalid("link without key columns"));
        }

        let range = match &self.tables[target].population {
            Some(Population::Range(range)) => Some(range),
            _ => None,
        };
        if let Some(range) = range {
            if link.keys.as_slice() != [range.value_column] {
                return Err(DefinitionError::NotKeyColumn {
                    table: target,
                    column: link.keys[0],
                });
            }
        }

        for (&key, source) in link.keys.iter().zip(&link.values) {
            let Some(key_col) = self.columns.get(key).filter(|k| k.input == target) else {
                return Err(DefinitionError::NotKeyColumn { table: target, column: key });
            };
            if project && range.is_none() && (!key_col.key || key_col.is_derived()) {
                return Err(DefinitionError::NotKeyColumn { table: target, column: key });
            }
            match source {
                KeySource::Path(path) => {
                    let output = self.validate_path(col.input, path)?;
                    let compatible = match (key_col.output, output) {
                        (ColumnType::Table(a), ColumnType::Table(b)) => a == b,
                        (ColumnType::Primitive(_), ColumnType::Primitive(_)) => true,
                        _ => false,
                    };
                    if !compatible {
                        return Err(DefinitionError::invalid_path(format!(
                            "path {:?} does not produce values of key column {}",
                            path, key_col.name
                        )));
                    }
                }
                KeySource::Expr { params, .. } => {
                    for path in params {
                        self.validate_path(col.input, path)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_accumulate(
        &self,
        column: ColumnId,
        acc: &Accumulate,
    ) -> core::result::Result<(), DefinitionError> {
        let group_table = self.columns[column].input;
        let first = acc
            .group
            .first()
            .and_then(|&c| self.columns.get(c))
            .ok_or_else(|| DefinitionError::invalid_path("empty or unknown group path"))?;
        let fact_table = first.input;
        if self.validate_path(fact_table, &acc.group)? != ColumnType::Table(group_table) {
            return Err(DefinitionError::invalid_path(format!(
                "group path {:?} does not end in table {}",
                acc.group, group_table
            )));
        }
        for path in &acc.params {
            self.validate_path(fact_table, path)?;
        }
        Ok(())
    }

    fn validate_roll(&self, column: ColumnId, roll: &Roll) -> core::result::Result<(), DefinitionError> {
        let input = self.columns[column].input;
        let size = 0.0..=f64::INFINITY;
        if !size.contains(&roll.size_past) || !size.contains(&roll.size_future) {
            return Err(DefinitionError::invalid("roll window sizes must be non-negative"));
        }
        if let RollDistance::Path(path) = &roll.distance {
            match self.validate_path(input, path)? {
                ColumnType::Primitive(dt) if dt.is_numeric() => {}
                _ => {
                    return Err(DefinitionError::invalid_path(format!(
                        "distance path {:?} is not numeric",
                        path
                    )))
                }
            }
        }
        for path in &roll.params {
            self.validate_path(input, path)?;
        }
        Ok(())
    }

    fn validate_product(
        &self,
        table: TableId,
        product: &Product,
    ) -> core::result::Result<(), DefinitionError> {
        if product.keys.is_empty() {
            return Err(DefinitionError::invalid("product without key columns"));
        }
        for &key in &product.keys {
            let Some(col) = self.columns.get(key).filter(|c| c.input == table && c.key) else {
                return Err(DefinitionError::NotKeyColumn { table, column: key });
            };
            if col.output.table().is_none() || col.is_derived() {
                return Err(DefinitionError::invalid(format!(
                    "product key {} must be a non-derived column of table ids",
                    col.name
                )));
            }
        }
        if let Some(predicate) = &product.predicate {
            for path in &predicate.params {
                let Some((&key, rest)) = path.split_first() else {
                    return Err(DefinitionError::invalid_path("empty predicate path"));
                };
                if !product.keys.contains(&key) {
                    return Err(DefinitionError::invalid_path(format!(
                        "predicate path {:?} does not start with a product key",
                        path
                    )));
                }
                if rest.is_empty() {
                    continue;
                }
                if let Some(domain) = self.columns[key].output.table() {
                    self.validate_path(domain, rest)?;
                }
            }
        }
        Ok(())
    }

    fn validate_range(
        &self,
        table: TableId,
        range: &RangePopulation,
    ) -> core::result::Result<(), DefinitionError> {
        let owned_primitive = |column: ColumnId| {
            self.columns
                .get(column)
                .filter(|c| c.input == table && !c.is_derived())
                .and_then(|c| match c.output {
                    ColumnType::Primitive(dt) => Some(dt),
                    ColumnType::Table(_) => None,
                })
        };
        let value_type = owned_primitive(range.value_column).ok_or_else(|| {
            DefinitionError::invalid("range value column must be a primitive, non-derived column of the table")
        })?;
        if let Some(number) = range.number_column {
            if owned_primitive(number) != Some(DataType::Int64) {
                return Err(DefinitionError::invalid(
                    "range number column must be a non-derived Int64 column of the table",
                ));
            }
        }

        let consistent = match (&range.origin, &range.period) {
            (Value::Int64(_), Value::Int64(p)) => value_type == DataType::Int64 && *p > 0,
            (Value::Float64(o), Value::Float64(p)) => {
                value_type == DataType::Float64 && o.is_finite() && p.is_finite() && *p > 0.0
            }
            (Value::Float64(o), Value::Int64(p)) => {
                value_type == DataType::Float64 && o.is_finite() && *p > 0
            }
            (Value::DateTime(_), Value::Duration(p)) => value_type == DataType::DateTime && *p > 0,
            _ => false,
        };
        if !consistent {
            return Err(DefinitionError::invalid(format!(
                "range origin {:?} and period {:?} do not fit a {:?} value column",
                range.origin, range.period, value_type
            )));
        }
        Ok(())
    }
}
