//! Signal propagation through a mapped circuit.
//!
//! The same traversal runs under two interpretations of a node:
//!
//! - [`Boolean`] - the ideal logic the wiring implies (NOT, two-input OR,
//!   pass-through wires).
//! - [`Response`] - steady-state transcription-factor levels. Sources sum
//!   into a gate, repressor gates apply their Hill curve, OR gates and wires
//!   pass the sum through.
//!
//! Traversal is a depth-first walk on an explicit stack. Each node is
//! resolved at most once per input row; the memo is cleared between rows.
//! A node met again while it is still on the walk is a wiring cycle.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::circuit::{CircuitGraph, Node, NodeId, NodeKind};
use crate::error::{CircuitError, Result};
use crate::gate::LogicType;
use crate::library::{GateLibrary, ResponseBounds};

/// Per-row values of a set of named circuit nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTable<V> {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<V>>,
}

impl<V: Copy> SignalTable<V> {
    /// Values of column `col` down every row.
    pub fn column(&self, col: usize) -> impl Iterator<Item = V> + '_ {
        self.rows.iter().map(move |row| row[col])
    }
}

/// Ideal output bits, one row per input row.
pub type TruthTable = SignalTable<bool>;

/// Continuous output levels, one row per input row.
pub type ResponseTable = SignalTable<f64>;

/// How a node turns its resolved sources into a value.
pub trait Semantics {
    type Value: Copy;

    /// Value of a primary input carrying `bit`.
    fn input(&self, bit: bool) -> Self::Value;

    /// Value of a non-input node given its sources' values, in wiring order.
    fn node(&self, node: &Node, sources: &[Self::Value]) -> Result<Self::Value>;
}

/// Discrete logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

impl Semantics for Boolean {
    type Value = bool;

    fn input(&self, bit: bool) -> bool {
        bit
    }

    fn node(&self, node: &Node, sources: &[bool]) -> Result<bool> {
        match &node.kind {
            NodeKind::Gate(binding) => match (&binding.logic, sources) {
                (LogicType::Not, [x]) => Ok(!x),
                (LogicType::Or, [a, b]) => Ok(*a || *b),
                (LogicType::Not, _) => Err(arity(node, 1, sources.len())),
                (LogicType::Or, _) => Err(arity(node, 2, sources.len())),
                (LogicType::Other(name), _) => Err(CircuitError::UnsupportedGateType {
                    node: node.name.clone(),
                    logic: name.clone(),
                }),
            },
            NodeKind::PassThrough => match sources {
                [x] => Ok(*x),
                _ => Err(arity(node, 1, sources.len())),
            },
            NodeKind::Input => Err(unassigned_input(node)),
        }
    }
}

/// Continuous dose-response.
#[derive(Debug, Clone, Copy)]
pub struct Response<'a> {
    library: &'a GateLibrary,
    low: f64,
    high: f64,
}

impl<'a> Response<'a> {
    /// Inputs at 0 take `bounds.min`, inputs at 1 take `bounds.max`.
    pub fn new(library: &'a GateLibrary, bounds: ResponseBounds) -> Self {
        Self {
            library,
            low: bounds.min,
            high: bounds.max,
        }
    }
}

impl Semantics for Response<'_> {
    type Value = f64;

    fn input(&self, bit: bool) -> f64 {
        if bit {
            self.high
        } else {
            self.low
        }
    }

    fn node(&self, node: &Node, sources: &[f64]) -> Result<f64> {
        let x: f64 = sources.iter().sum();
        match &node.kind {
            NodeKind::PassThrough => Ok(x),
            NodeKind::Gate(binding) if binding.logic == LogicType::Or => Ok(x),
            NodeKind::Gate(binding) => {
                let invalid = |reason: String| CircuitError::InvalidTransferFunction {
                    node: node.name.clone(),
                    reason,
                };
                let library_id = binding
                    .library_id
                    .as_deref()
                    .ok_or_else(|| invalid("gate has no library part".into()))?;
                let gate = self
                    .library
                    .gate(library_id)
                    .ok_or_else(|| invalid(format!("library has no gate {library_id}")))?;
                let y = gate
                    .params()
                    .response(x)
                    .ok_or_else(|| invalid(format!("{library_id} lacks a usable ymin/ymax/k/n")))?;
                if y.is_finite() {
                    Ok(y)
                } else {
                    Err(invalid(format!("response to {x} is {y}")))
                }
            }
            NodeKind::Input => Err(unassigned_input(node)),
        }
    }
}

fn arity(node: &Node, expected: usize, found: usize) -> CircuitError {
    CircuitError::InvalidArity {
        node: node.name.clone(),
        expected,
        found,
    }
}

fn unassigned_input(node: &Node) -> CircuitError {
    CircuitError::MalformedMapping(format!("input {} has no value in this row", node.name))
}

// ═══════════════════════════════════════════════════════════════════════════
// Traversal
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum Slot<V> {
    Unvisited,
    Visiting,
    Done(V),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    next_source: usize,
}

/// Memoised evaluator of one circuit under one semantics.
pub struct Evaluator<'g, S: Semantics> {
    graph: &'g CircuitGraph,
    semantics: S,
    slots: Vec<Slot<S::Value>>,
    stack: Vec<Frame>,
    scratch: Vec<S::Value>,
}

impl<'g, S: Semantics> Evaluator<'g, S> {
    pub fn new(graph: &'g CircuitGraph, semantics: S) -> Self {
        Self {
            graph,
            semantics,
            slots: vec![Slot::Unvisited; graph.nodes().len()],
            stack: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Values of every circuit output under one assignment of the inputs.
    pub fn evaluate_row(&mut self, row: &[bool]) -> Result<Vec<S::Value>> {
        let graph = self.graph;
        self.slots.fill(Slot::Unvisited);
        for (&node, &bit) in graph.input_nodes().iter().zip(row) {
            self.slots[node] = Slot::Done(self.semantics.input(bit));
        }
        graph
            .outputs()
            .iter()
            .map(|&output| self.resolve(output))
            .collect()
    }

    /// Evaluate every row of the circuit's input table.
    pub fn evaluate_all(&mut self) -> Result<SignalTable<S::Value>> {
        let graph = self.graph;
        let rows = graph
            .inputs()
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                trace!(row = i, "evaluating input row");
                self.evaluate_row(row)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SignalTable {
            columns: graph.output_names().map(str::to_string).collect(),
            rows,
        })
    }

    fn resolve(&mut self, target: NodeId) -> Result<S::Value> {
        let graph = self.graph;
        match self.slots[target] {
            Slot::Done(v) => return Ok(v),
            Slot::Visiting => return Err(cycle(graph, target)),
            Slot::Unvisited => {}
        }

        self.stack.clear();
        self.slots[target] = Slot::Visiting;
        self.stack.push(Frame {
            node: target,
            next_source: 0,
        });

        while let Some(&Frame { node, next_source }) = self.stack.last() {
            let sources = &graph.node(node).sources;
            if let Some(&source) = sources.get(next_source) {
                if let Some(frame) = self.stack.last_mut() {
                    frame.next_source += 1;
                }
                match self.slots[source] {
                    Slot::Done(_) => {}
                    Slot::Visiting => return Err(cycle(graph, source)),
                    Slot::Unvisited => {
                        self.slots[source] = Slot::Visiting;
                        self.stack.push(Frame {
                            node: source,
                            next_source: 0,
                        });
                    }
                }
                continue;
            }

            self.scratch.clear();
            for &source in sources {
                if let Slot::Done(v) = self.slots[source] {
                    self.scratch.push(v);
                }
            }
            let value = self.semantics.node(graph.node(node), &self.scratch)?;
            self.slots[node] = Slot::Done(value);
            self.stack.pop();
        }

        match self.slots[target] {
            Slot::Done(v) => Ok(v),
            _ => Err(cycle(graph, target)),
        }
    }
}

fn cycle(graph: &CircuitGraph, node: NodeId) -> CircuitError {
    CircuitError::CircuitCycleDetected(graph.node(node).name.clone())
}

/// Ideal truth table of the circuit's outputs.
pub fn truth_table(graph: &CircuitGraph) -> Result<TruthTable> {
    Evaluator::new(graph, Boolean).evaluate_all()
}

/// Continuous output levels with inputs driven at `bounds`.
pub fn responses(
    graph: &CircuitGraph,
    library: &GateLibrary,
    bounds: ResponseBounds,
) -> Result<ResponseTable> {
    Evaluator::new(graph, Response::new(library, bounds)).evaluate_all()
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
