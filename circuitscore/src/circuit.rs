//! Mapped circuit: logical gates bound to library parts, and their wiring.
//!
//! Every name the mapping mentions (input, gate, wire, output) becomes a
//! [`Node`] in an arena addressed by [`NodeId`]. Sources are stored on the
//! sink in declaration order, so asymmetric gates see their inputs in the
//! order the mapping lists them.
//!
//! Construction validates the mapping against the library and derives the
//! ideal truth table, so a graph that exists is always scoreable in the
//! Boolean sense. Gate constants are not copied: a [`Binding`] names the
//! library part and evaluation looks it up, which keeps tuning visible.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::data::{InputTable, MappingData};
use crate::error::{CircuitError, Result};
use crate::eval::{self, TruthTable};
use crate::gate::LogicType;
use crate::library::GateLibrary;

pub type NodeId = usize;

/// Logical gate of the circuit and the library part implementing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub logic: LogicType,
    /// `None` for an OR realised purely by wiring promoters together.
    pub library_id: Option<String>,
}

impl Binding {
    pub fn is_mapped(&self) -> bool {
        self.library_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Primary input; its value comes from the input table.
    Input,
    Gate(Binding),
    /// Wire or output terminal; forwards its source.
    PassThrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub sources: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct CircuitGraph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    inputs: InputTable,
    input_nodes: Vec<NodeId>,
    outputs: Vec<NodeId>,
    truth_table: TruthTable,
}

impl CircuitGraph {
    /// Bind, wire and validate a mapping, then derive its truth table.
    pub fn build(data: &MappingData, library: &GateLibrary) -> Result<Self> {
        let mut graph = CircuitGraph {
            nodes: Vec::new(),
            index: HashMap::new(),
            inputs: data.inputs.clone(),
            input_nodes: Vec::new(),
            outputs: Vec::new(),
            truth_table: TruthTable {
                columns: Vec::new(),
                rows: Vec::new(),
            },
        };

        for name in data.inputs.names() {
            let id = graph.add_node(name, NodeKind::Input)?;
            graph.input_nodes.push(id);
        }
        graph.bind_gates(data, library)?;
        graph.wire(data)?;
        graph.check_arity()?;
        graph.resolve_outputs(data)?;

        graph.truth_table = eval::truth_table(&graph)?;
        debug!(
            nodes = graph.nodes.len(),
            rows = graph.inputs.len(),
            outputs = graph.outputs.len(),
            "built circuit graph"
        );
        Ok(graph)
    }

    fn add_node(&mut self, name: &str, kind: NodeKind) -> Result<NodeId> {
        if self.index.contains_key(name) {
            return Err(CircuitError::MalformedMapping(format!(
                "node {name} is declared twice"
            )));
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
            sources: Vec::new(),
        });
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Bind each declared gate, enforcing type agreement and factor exclusivity.
    fn bind_gates(&mut self, data: &MappingData, library: &GateLibrary) -> Result<()> {
        let mut claimed: HashSet<&str> = HashSet::new();

        for gate_data in &data.gates {
            let binding = match &gate_data.mapping {
                Some(library_id) => {
                    let part = library.gate(library_id).ok_or_else(|| {
                        CircuitError::MalformedMapping(format!(
                            "gate {} maps to unknown library gate {}",
                            gate_data.id, library_id
                        ))
                    })?;
                    if part.logic() != &gate_data.logic {
                        return Err(CircuitError::GateLogicIncorrect(gate_data.id.clone()));
                    }
                    for factor in part.factors() {
                        if !claimed.insert(factor.as_str()) {
                            return Err(CircuitError::CrossTalkDetected(factor.clone()));
                        }
                    }
                    debug!(node = %gate_data.id, part = %library_id, "bound gate");
                    Binding {
                        logic: gate_data.logic.clone(),
                        library_id: Some(library_id.clone()),
                    }
                }
                None if gate_data.logic == LogicType::Or => Binding {
                    logic: LogicType::Or,
                    library_id: None,
                },
                None => return Err(CircuitError::GateNotMapped(gate_data.id.clone())),
            };
            self.add_node(&gate_data.id, NodeKind::Gate(binding))?;
        }
        Ok(())
    }

    /// Attach sources to sinks. Unknown sinks become pass-through nodes;
    /// unknown sources are dangling.
    fn wire(&mut self, data: &MappingData) -> Result<()> {
        for conn in &data.connections {
            if !self.index.contains_key(&conn.sink) {
                self.add_node(&conn.sink, NodeKind::PassThrough)?;
            }
        }
        for conn in &data.connections {
            let source = self
                .find(&conn.source)
                .ok_or_else(|| CircuitError::DanglingNode(conn.source.clone()))?;
            let sink = self.index[&conn.sink];
            if self.nodes[sink].kind == NodeKind::Input {
                return Err(CircuitError::MalformedMapping(format!(
                    "input {} cannot be driven by {}",
                    conn.sink, conn.source
                )));
            }
            self.nodes[sink].sources.push(source);
        }
        Ok(())
    }

    fn check_arity(&self) -> Result<()> {
        for node in &self.nodes {
            let expected = match &node.kind {
                NodeKind::Input => continue,
                NodeKind::PassThrough => 1,
                NodeKind::Gate(binding) => match binding.logic {
                    LogicType::Not => 1,
                    LogicType::Or => 2,
                    // No Boolean semantics; truth-table derivation reports it.
                    LogicType::Other(_) => continue,
                },
            };
            if node.sources.len() != expected {
                return Err(CircuitError::InvalidArity {
                    node: node.name.clone(),
                    expected,
                    found: node.sources.len(),
                });
            }
        }
        Ok(())
    }

    fn resolve_outputs(&mut self, data: &MappingData) -> Result<()> {
        if data.outputs.is_empty() {
            return Err(CircuitError::MalformedMapping("no outputs declared".into()));
        }
        self.outputs = data
            .outputs
            .iter()
            .map(|name| {
                self.find(name)
                    .ok_or_else(|| CircuitError::DanglingNode(name.clone()))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn inputs(&self) -> &InputTable {
        &self.inputs
    }

    /// Node of each input column, in column order.
    pub fn input_nodes(&self) -> &[NodeId] {
        &self.input_nodes
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.outputs.iter().map(|&id| self.nodes[id].name.as_str())
    }

    pub fn truth_table(&self) -> &TruthTable {
        &self.truth_table
    }

    /// Binding of the gate called `name`, if it is a gate.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        match &self.nodes[self.find(name)?].kind {
            NodeKind::Gate(binding) => Some(binding),
            _ => None,
        }
    }

    /// Every gate node with its binding, in declaration order.
    pub fn gates(&self) -> impl Iterator<Item = (&str, &Binding)> + '_ {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Gate(binding) => Some((node.name.as_str(), binding)),
            _ => None,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::*;

    fn library() -> GateLibrary {
        let mut gates = vec![
            LibraryGateData::repressor("A1_AmtR", 0.06, 3.8, 0.07, 1.6, &["AmtR"]),
            LibraryGateData::repressor("B3_BM3R1", 0.005, 0.5, 0.15, 2.9, &["BM3R1"]),
            LibraryGateData::repressor("P2_PhlF", 0.02, 4.1, 0.13, 3.9, &["PhlF"]),
            LibraryGateData::repressor("P3_PhlF", 0.02, 6.8, 0.23, 4.2, &["PhlF"]),
        ];
        gates.push(LibraryGateData {
            id: "N1_NOR".into(),
            logic: LogicType::Other("NOR".into()),
            ymin: Some(0.01),
            ymax: Some(2.0),
            k: Some(0.1),
            n: Some(2.0),
            factors: vec!["LmrA".into()],
        });
        GateLibrary::build(&LibraryData { gates }).unwrap()
    }

    /// y = NOT(NOT(a))
    fn buffer_mapping() -> MappingData {
        MappingData {
            gates: vec![
                CircuitGateData::mapped("g1", LogicType::Not, "A1_AmtR"),
                CircuitGateData::mapped("g2", LogicType::Not, "B3_BM3R1"),
            ],
            connections: vec![
                ConnectionData::new("a", "g1"),
                ConnectionData::new("g1", "g2"),
                ConnectionData::new("g2", "y"),
            ],
            inputs: InputTable::exhaustive(&["a"]).unwrap(),
            outputs: vec!["y".into()],
        }
    }

    #[test]
    fn buffer_builds_with_identity_truth_table() {
        let graph = CircuitGraph::build(&buffer_mapping(), &library()).unwrap();
        assert_eq!(graph.nodes().len(), 4);
        assert_eq!(graph.node(graph.find("y").unwrap()).kind, NodeKind::PassThrough);
        assert_eq!(graph.truth_table().rows, vec![vec![false], vec![true]]);
        let names: Vec<&str> = graph.gates().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["g1", "g2"]);
        assert_eq!(
            graph.binding("g2").unwrap().library_id.as_deref(),
            Some("B3_BM3R1")
        );
        assert!(graph.binding("y").is_none());
    }

    #[test]
    fn sources_keep_declaration_order() {
        let mapping = MappingData {
            gates: vec![CircuitGateData::unmapped("or", LogicType::Or)],
            connections: vec![
                ConnectionData::new("b", "or"),
                ConnectionData::new("a", "or"),
                ConnectionData::new("or", "y"),
            ],
            inputs: InputTable::exhaustive(&["a", "b"]).unwrap(),
            outputs: vec!["y".into()],
        };
        let graph = CircuitGraph::build(&mapping, &library()).unwrap();
        let or = graph.node(graph.find("or").unwrap());
        assert_eq!(or.sources, vec![graph.find("b").unwrap(), graph.find("a").unwrap()]);
        assert!(!graph.binding("or").unwrap().is_mapped());
    }

    #[test]
    fn wrong_logic_type_is_rejected() {
        let mut mapping = buffer_mapping();
        mapping.gates[1] = CircuitGateData::mapped("g2", LogicType::Not, "N1_NOR");
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(err, CircuitError::GateLogicIncorrect("g2".into()));
    }

    #[test]
    fn shared_factor_is_cross_talk() {
        let mut mapping = buffer_mapping();
        mapping.gates[0] = CircuitGateData::mapped("g1", LogicType::Not, "P2_PhlF");
        mapping.gates[1] = CircuitGateData::mapped("g2", LogicType::Not, "P3_PhlF");
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(err, CircuitError::CrossTalkDetected("PhlF".into()));
    }

    #[test]
    fn same_part_twice_is_cross_talk() {
        let mut mapping = buffer_mapping();
        mapping.gates[1] = CircuitGateData::mapped("g2", LogicType::Not, "A1_AmtR");
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(err, CircuitError::CrossTalkDetected("AmtR".into()));
    }

    #[test]
    fn unmapped_not_is_rejected() {
        let mut mapping = buffer_mapping();
        mapping.gates[0] = CircuitGateData::unmapped("g1", LogicType::Not);
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(err, CircuitError::GateNotMapped("g1".into()));
    }

    #[test]
    fn unknown_library_part_is_malformed() {
        let mut mapping = buffer_mapping();
        mapping.gates[0] = CircuitGateData::mapped("g1", LogicType::Not, "Z9_Missing");
        assert!(matches!(
            CircuitGraph::build(&mapping, &library()),
            Err(CircuitError::MalformedMapping(_))
        ));
    }

    #[test]
    fn unknown_source_is_dangling() {
        let mut mapping = buffer_mapping();
        mapping.connections[1] = ConnectionData::new("ghost", "g2");
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(err, CircuitError::DanglingNode("ghost".into()));
    }

    #[test]
    fn unknown_output_is_dangling() {
        let mut mapping = buffer_mapping();
        mapping.outputs = vec!["z".into()];
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(err, CircuitError::DanglingNode("z".into()));
    }

    #[test]
    fn missing_outputs_are_malformed() {
        let mut mapping = buffer_mapping();
        mapping.outputs.clear();
        assert!(matches!(
            CircuitGraph::build(&mapping, &library()),
            Err(CircuitError::MalformedMapping(_))
        ));
    }

    #[test]
    fn not_with_two_sources_is_rejected() {
        let mut mapping = buffer_mapping();
        mapping.inputs = InputTable::exhaustive(&["a", "b"]).unwrap();
        mapping.connections.push(ConnectionData::new("b", "g1"));
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(
            err,
            CircuitError::InvalidArity { node: "g1".into(), expected: 1, found: 2 }
        );
    }

    #[test]
    fn or_with_one_source_is_rejected() {
        let mapping = MappingData {
            gates: vec![CircuitGateData::unmapped("or", LogicType::Or)],
            connections: vec![ConnectionData::new("a", "or"), ConnectionData::new("or", "y")],
            inputs: InputTable::exhaustive(&["a"]).unwrap(),
            outputs: vec!["y".into()],
        };
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(
            err,
            CircuitError::InvalidArity { node: "or".into(), expected: 2, found: 1 }
        );
    }

    #[test]
    fn driving_an_input_is_rejected() {
        let mut mapping = buffer_mapping();
        mapping.connections.push(ConnectionData::new("g2", "a"));
        assert!(matches!(
            CircuitGraph::build(&mapping, &library()),
            Err(CircuitError::MalformedMapping(_))
        ));
    }

    #[test]
    fn unsupported_type_fails_truth_table() {
        let mapping = MappingData {
            gates: vec![CircuitGateData::mapped(
                "nor",
                LogicType::Other("NOR".into()),
                "N1_NOR",
            )],
            connections: vec![
                ConnectionData::new("a", "nor"),
                ConnectionData::new("b", "nor"),
                ConnectionData::new("nor", "y"),
            ],
            inputs: InputTable::exhaustive(&["a", "b"]).unwrap(),
            outputs: vec!["y".into()],
        };
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(
            err,
            CircuitError::UnsupportedGateType { node: "nor".into(), logic: "NOR".into() }
        );
    }

    #[test]
    fn feedback_loop_is_a_cycle() {
        // g1 = NOT(g2), g2 = NOT(g1), y = g2; input a drives nothing.
        let mapping = MappingData {
            gates: vec![
                CircuitGateData::mapped("g1", LogicType::Not, "A1_AmtR"),
                CircuitGateData::mapped("g2", LogicType::Not, "B3_BM3R1"),
            ],
            connections: vec![
                ConnectionData::new("g2", "g1"),
                ConnectionData::new("g1", "g2"),
                ConnectionData::new("g2", "y"),
            ],
            inputs: InputTable::exhaustive(&["a"]).unwrap(),
            outputs: vec!["y".into()],
        };
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert!(matches!(err, CircuitError::CircuitCycleDetected(_)));
    }

    #[test]
    fn validation_stops_at_first_bad_gate() {
        let mut mapping = buffer_mapping();
        mapping.gates[0] = CircuitGateData::unmapped("g1", LogicType::Not);
        mapping.gates[1] = CircuitGateData::mapped("g2", LogicType::Not, "N1_NOR");
        let err = CircuitGraph::build(&mapping, &library()).unwrap_err();
        assert_eq!(err, CircuitError::GateNotMapped("g1".into()));
    }
}
