//! The spreadsheet engine: a sparse cell store plus a dependency graph,
//! kept mutually consistent under every mutation.

use std::collections::VecDeque;
use std::fmt;

use ahash::{AHashMap, AHashSet};
use cellgrid_formula::{Formula, LookupError};
use cellgrid_graph::DependencyGraph;
use lazy_regex::regex_is_match;
use log::debug;

use crate::cell::{Cell, CellContents, CellValue};
use crate::error::{Error, Result};

/// A spreadsheet: infinitely many named cells, of which only the non-empty
/// ones are stored.
///
/// Cell names match `[A-Za-z]+[0-9]+` after normalization. The normalizer
/// and validator are supplied at construction, so embedders can impose their
/// own naming discipline (uppercase-only names, a bounded grid, and so on);
/// every public operation normalizes its name argument first, so two raw
/// spellings with the same normalized form refer to the same cell.
///
/// The engine maintains one invariant across all mutations: for every cell
/// holding a formula with variable set `V`, the dependency graph contains
/// exactly the edges `{(v, cell) | v in V}`. Edges are fully replaced on each
/// content change, never patched incrementally.
///
/// # Example
///
/// ```rust
/// use cellgrid_core::{CellValue, Spreadsheet};
///
/// let mut sheet = Spreadsheet::new("demo");
/// sheet.set_contents_of_cell("A1", "2").unwrap();
/// let affected = sheet.set_contents_of_cell("B1", "=A1*3").unwrap();
/// assert_eq!(affected, ["B1"]);
/// assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(6.0));
/// ```
pub struct Spreadsheet {
    cells: AHashMap<String, Cell>,
    graph: DependencyGraph,
    normalize: Box<dyn Fn(&str) -> String>,
    is_valid: Box<dyn Fn(&str) -> bool>,
    version: String,
    changed: bool,
}

impl Spreadsheet {
    /// Create an empty spreadsheet with the identity normalizer and an
    /// always-true validator.
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_rules(version, |s| s.to_string(), |_| true)
    }

    /// Create an empty spreadsheet with a caller-supplied name normalizer
    /// and validator.
    ///
    /// `normalize` must be idempotent, and its output still has to match the
    /// name pattern and pass `is_valid`, or the operation that introduced the
    /// name is rejected with [`Error::InvalidName`].
    pub fn with_rules<N, V>(version: impl Into<String>, normalize: N, is_valid: V) -> Self
    where
        N: Fn(&str) -> String + 'static,
        V: Fn(&str) -> bool + 'static,
    {
        Self {
            cells: AHashMap::new(),
            graph: DependencyGraph::new(),
            normalize: Box::new(normalize),
            is_valid: Box::new(is_valid),
            version: version.into(),
            changed: false,
        }
    }

    /// The version string this spreadsheet was created with (and will be
    /// saved under).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// True if the spreadsheet has been mutated since creation or since the
    /// last [`mark_saved`](Self::mark_saved).
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Clears the changed flag; called by persistence layers after a
    /// successful save.
    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    /// The names of all non-empty cells, in no particular order.
    pub fn nonempty_cell_names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// The raw contents of the named cell. An empty cell reports empty text.
    pub fn contents(&self, name: &str) -> Result<CellContents> {
        let name = self.validate_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.contents().clone())
            .unwrap_or_else(|| CellContents::Text(String::new())))
    }

    /// The derived value of the named cell. An empty cell reports empty text.
    pub fn value(&self, name: &str) -> Result<CellValue> {
        let name = self.validate_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.value().clone())
            .unwrap_or_else(|| CellValue::Text(String::new())))
    }

    /// Set the named cell from a raw content string and recompute everything
    /// it affects.
    ///
    /// Classification: content that parses as a double becomes a number
    /// (surrounding whitespace ignored), content starting with `=` is parsed
    /// as a formula, anything else is text. Empty text removes the cell.
    ///
    /// On success, the value of every cell that depends directly or
    /// transitively on `name` has been recomputed, and the returned list
    /// holds the affected names in recomputation order, `name` first.
    ///
    /// The call is atomic. A formula that fails to parse, an invalid name,
    /// or a change that would introduce a circular dependency leaves the
    /// spreadsheet exactly as it was and returns the corresponding error.
    pub fn set_contents_of_cell(&mut self, name: &str, content: &str) -> Result<Vec<String>> {
        let name = self.validate_name(name)?;
        let contents = self.classify(content)?;
        self.apply(&name, contents)
    }

    /// Normalize `name` and check it against the pattern and the validator.
    fn validate_name(&self, name: &str) -> Result<String> {
        let normalized = (self.normalize)(name);
        if !regex_is_match!(r"^[A-Za-z]+[0-9]+$", &normalized) || !(self.is_valid)(&normalized) {
            return Err(Error::InvalidName(normalized));
        }
        Ok(normalized)
    }

    /// Classify a raw content string as a number, a formula, or text.
    fn classify(&self, content: &str) -> Result<CellContents> {
        if let Ok(n) = content.trim().parse::<f64>() {
            return Ok(CellContents::Number(n));
        }
        if let Some(expression) = content.strip_prefix('=') {
            let formula = Formula::parse_with(
                expression,
                |s| (self.normalize)(s),
                |s| regex_is_match!(r"^[A-Za-z]+[0-9]+$", s) && (self.is_valid)(s),
            )?;
            return Ok(CellContents::Formula(formula));
        }
        Ok(CellContents::Text(content.to_string()))
    }

    /// Apply already-classified contents to a cell, with full rollback if
    /// the change would introduce a cycle.
    fn apply(&mut self, name: &str, contents: CellContents) -> Result<Vec<String>> {
        let prev_cell = self.cells.get(name).cloned();
        let prev_dependees: Vec<String> = self.graph.dependees(name).map(str::to_string).collect();

        let new_dependees: Vec<String> = match &contents {
            CellContents::Formula(formula) => formula.variables().map(str::to_string).collect(),
            _ => Vec::new(),
        };

        if contents.is_empty() {
            self.cells.remove(name);
        } else {
            let cell = Cell::new(contents, |var| Self::lookup(&self.cells, var));
            self.cells.insert(name.to_string(), cell);
        }
        self.graph.replace_dependees(name, &new_dependees);

        let order = match self.recalculation_order(name) {
            Ok(order) => order,
            Err(err) => {
                debug!("rolling back mutation of {name}: {err}");
                match prev_cell {
                    Some(cell) => {
                        self.cells.insert(name.to_string(), cell);
                    }
                    None => {
                        self.cells.remove(name);
                    }
                }
                self.graph.replace_dependees(name, &prev_dependees);
                return Err(err);
            }
        };

        for affected in &order {
            if let Some(mut cell) = self.cells.remove(affected) {
                cell.recalculate(|var| Self::lookup(&self.cells, var));
                self.cells.insert(affected.clone(), cell);
            }
        }

        debug!("set {name}, recomputed {} cell(s)", order.len());
        self.changed = true;
        Ok(order)
    }

    /// The order in which `start` and everything depending on it must be
    /// recomputed, `start` first, or a circular-dependency error if `start`
    /// transitively depends on itself.
    fn recalculation_order(&self, start: &str) -> Result<Vec<String>> {
        let mut visited = AHashSet::new();
        let mut order = VecDeque::new();
        self.visit(start, start, &mut visited, &mut order)?;
        Ok(order.into())
    }

    /// Depth-first traversal over direct dependents, prepending each node
    /// after all of its dependents, so the final list is safe to recompute
    /// left to right. Reaching `start` from one of its descendants is a
    /// cycle; reaching any other node twice (a diamond) is not.
    fn visit(
        &self,
        start: &str,
        name: &str,
        visited: &mut AHashSet<String>,
        order: &mut VecDeque<String>,
    ) -> Result<()> {
        visited.insert(name.to_string());
        for dependent in self.graph.dependents(name) {
            if dependent == start {
                return Err(Error::CircularDependency(start.to_string()));
            }
            if !visited.contains(dependent) {
                self.visit(start, dependent, visited, order)?;
            }
        }
        order.push_front(name.to_string());
        Ok(())
    }

    /// The lookup closure handed to formula evaluation: a cell's current
    /// numeric value, or a typed failure for absent, text, and error cells.
    fn lookup(cells: &AHashMap<String, Cell>, name: &str) -> std::result::Result<f64, LookupError> {
        match cells.get(name).map(Cell::value) {
            Some(CellValue::Number(n)) => Ok(*n),
            Some(_) => Err(LookupError::NotNumeric),
            None => Err(LookupError::Undefined),
        }
    }
}

// The normalize/validate closures are opaque, so Debug shows everything else.
impl fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("cells", &self.cells)
            .field("graph", &self.graph)
            .field("version", &self.version)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}
