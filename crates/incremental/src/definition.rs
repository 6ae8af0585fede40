//! Column and table definitions.
//!
//! A definition names a computation kind together with the already-resolved
//! callables and column paths it consumes. Columns carry at most one
//! [`ColumnDefinition`]; tables carry at most one [`Population`].

use alloc::vec::Vec;
use colflow_core::{ColumnId, Evaluator, Folder, RollFn, Value};

/// A chain of columns: each step's output table is the next step's input table.
pub type ColumnPath = Vec<ColumnId>;

/// Computation kind of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Externally set values, never overwritten by the engine.
    Noop,
    Calculate,
    Link,
    Project,
    Accumulate,
    Roll,
}

/// Population kind of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PopulationKind {
    /// Rows are added and removed by the caller (or by incoming projections).
    None,
    Product,
    Range,
}

/// Row-wise calculation `f(params)`.
pub struct Calculate {
    /// Without an evaluator every row is reset to the column default.
    pub evaluator: Option<Evaluator>,
    pub params: Vec<ColumnPath>,
}

impl Calculate {
    pub fn new(evaluator: Evaluator, params: Vec<ColumnPath>) -> Self {
        Self {
            evaluator: Some(evaluator),
            params,
        }
    }

    /// A calculation that resets every row to the column default.
    pub fn reset() -> Self {
        Self {
            evaluator: None,
            params: Vec::new(),
        }
    }
}

/// Where one key value of a link or project tuple comes from.
pub enum KeySource {
    /// The value at the end of a column path on the input table.
    Path(ColumnPath),
    /// An inline evaluator over column paths on the input table.
    Expr {
        evaluator: Evaluator,
        params: Vec<ColumnPath>,
    },
}

impl KeySource {
    /// All paths this key value reads.
    pub fn paths(&self) -> Vec<&ColumnPath> {
        match self {
            KeySource::Path(path) => alloc::vec![path],
            KeySource::Expr { params, .. } => params.iter().collect(),
        }
    }
}

/// Key search into the output table. Used by both link and project columns.
pub struct Link {
    /// Key columns of the output table, in tuple order.
    pub keys: Vec<ColumnId>,
    /// One value source per key column.
    pub values: Vec<KeySource>,
}

impl Link {
    pub fn new(keys: Vec<ColumnId>, values: Vec<KeySource>) -> Self {
        Self { keys, values }
    }

    /// Keys whose values are read directly from input-table paths.
    pub fn from_paths(keys: Vec<ColumnId>, paths: Vec<ColumnPath>) -> Self {
        Self {
            keys,
            values: paths.into_iter().map(KeySource::Path).collect(),
        }
    }

    /// All paths read by the value sources.
    pub fn source_paths(&self) -> Vec<&ColumnPath> {
        self.values.iter().flat_map(KeySource::paths).collect()
    }
}

/// Grouped aggregation of a fact table into the column's (group) table.
pub struct Accumulate {
    /// Path from the fact table to the group table. Its first column fixes the fact table.
    pub group: ColumnPath,
    pub adder: Folder,
    /// Inverse of `adder`, applied to removed facts. Without it removed facts
    /// stay folded until the next full re-fold.
    pub remover: Option<Folder>,
    /// Parameter paths anchored at the fact table.
    pub params: Vec<ColumnPath>,
}

impl Accumulate {
    pub fn new(group: ColumnPath, adder: Folder) -> Self {
        Self {
            group,
            adder,
            remover: None,
            params: Vec::new(),
        }
    }

    pub fn with_remover(mut self, remover: Folder) -> Self {
        self.remover = Some(remover);
        self
    }

    pub fn with_params(mut self, params: Vec<ColumnPath>) -> Self {
        self.params = params;
        self
    }
}

/// How the distance between two rows of a roll window is measured.
pub enum RollDistance {
    /// Difference of row ids.
    Ids,
    /// Numeric difference of the values at the end of a path.
    Path(ColumnPath),
}

/// Windowed aggregation over the column's own table.
pub struct Roll {
    /// Rows with past distance `< size_past` belong to the window.
    pub size_past: f64,
    /// Rows with future distance `<= size_future` belong to the window.
    pub size_future: f64,
    pub distance: RollDistance,
    pub roll: RollFn,
    pub params: Vec<ColumnPath>,
}

impl Roll {
    pub fn new(size_past: f64, size_future: f64, roll: RollFn) -> Self {
        Self {
            size_past,
            size_future,
            distance: RollDistance::Ids,
            roll,
            params: Vec::new(),
        }
    }

    pub fn with_distance(mut self, path: ColumnPath) -> Self {
        self.distance = RollDistance::Path(path);
        self
    }

    pub fn with_params(mut self, params: Vec<ColumnPath>) -> Self {
        self.params = params;
        self
    }
}

/// Definition attached to a derived column.
pub enum ColumnDefinition {
    Calculate(Calculate),
    Link(Link),
    Project(Link),
    Accumulate(Accumulate),
    Roll(Roll),
}

impl ColumnDefinition {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnDefinition::Calculate(_) => ColumnKind::Calculate,
            ColumnDefinition::Link(_) => ColumnKind::Link,
            ColumnDefinition::Project(_) => ColumnKind::Project,
            ColumnDefinition::Accumulate(_) => ColumnKind::Accumulate,
            ColumnDefinition::Roll(_) => ColumnKind::Roll,
        }
    }
}

/// Filter applied to candidate product tuples.
///
/// Each parameter path starts with one of the product's key columns; the rest of
/// the path continues in that key's domain table.
pub struct Predicate {
    pub evaluator: Evaluator,
    pub params: Vec<ColumnPath>,
}

impl Predicate {
    pub fn new(evaluator: Evaluator, params: Vec<ColumnPath>) -> Self {
        Self { evaluator, params }
    }
}

/// Cartesian product of the domain tables of the key columns.
pub struct Product {
    pub keys: Vec<ColumnId>,
    pub predicate: Option<Predicate>,
}

impl Product {
    pub fn new(keys: Vec<ColumnId>) -> Self {
        Self {
            keys,
            predicate: None,
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

/// Ordered, equal-length intervals `[origin + k * period, origin + (k + 1) * period)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RangePopulation {
    /// Column receiving each interval's start value.
    pub value_column: ColumnId,
    /// Optional column receiving each interval's number `k`.
    pub number_column: Option<ColumnId>,
    pub origin: Value,
    pub period: Value,
    /// Maximum number of intervals.
    pub count: u64,
    /// Generate intervals only when a probe needs them instead of all up front.
    pub on_demand: bool,
}

impl RangePopulation {
    pub fn new(value_column: ColumnId, origin: Value, period: Value, count: u64) -> Self {
        Self {
            value_column,
            number_column: None,
            origin,
            period,
            count,
            on_demand: false,
        }
    }

    pub fn with_number_column(mut self, column: ColumnId) -> Self {
        self.number_column = Some(column);
        self
    }

    pub fn on_demand(mut self) -> Self {
        self.on_demand = true;
        self
    }
}

/// Population rule of a derived table.
pub enum Population {
    Product(Product),
    Range(RangePopulation),
}

impl Population {
    pub fn kind(&self) -> PopulationKind {
        match self {
            Population::Product(_) => PopulationKind::Product,
            Population::Range(_) => PopulationKind::Range,
        }
    }
}
