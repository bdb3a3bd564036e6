//! CircuitScore: score how well a genetic gate assignment reproduces the
//! truth table of a Boolean logic circuit.
//!
//! # Modules
//!
//! - [`data`] - serde model of library, mapping and tuning documents
//! - [`gate`] - physical gates, logic types and Hill-curve transfer functions
//! - [`library`] - the gate library and its response bounds
//! - [`circuit`] - mapped circuit graph, validation and truth-table derivation
//! - [`eval`] - Boolean and continuous signal propagation
//! - [`score`] - separation score over on/off response bands
//! - [`session`] - build → map → tune → score workflow
//!
//! # Example
//!
//! ```rust
//! use circuitscore::prelude::*;
//!
//! let library = LibraryData {
//!     gates: vec![LibraryGateData::repressor("P3_PhlF", 0.02, 6.8, 0.23, 4.2, &["PhlF"])],
//! };
//! let mapping = MappingData {
//!     gates: vec![CircuitGateData::mapped("g1", LogicType::Not, "P3_PhlF")],
//!     connections: vec![ConnectionData::new("a", "g1"), ConnectionData::new("g1", "y")],
//!     inputs: InputTable::exhaustive(&["a"]).unwrap(),
//!     outputs: vec!["y".into()],
//! };
//!
//! let mut session = ScoringSession::from_data(&library).unwrap();
//! session.map(&mapping).unwrap();
//! let score = session.score().unwrap();
//! assert!(score > 0.5 && score <= 1.0);
//! ```

pub mod circuit;
pub mod data;
pub mod error;
pub mod eval;
pub mod gate;
pub mod library;
pub mod score;
pub mod session;

pub use circuit::{Binding, CircuitGraph, Node, NodeId, NodeKind};
pub use error::{CircuitError, Result};
pub use eval::{ResponseTable, SignalTable, TruthTable};
pub use gate::{GateModel, LogicType, TransferParams};
pub use library::{GateLibrary, ResponseBounds};
pub use score::{OutputSeparation, ScoreBreakdown};
pub use session::ScoringSession;

/// Everything needed to describe and score a circuit.
pub mod prelude {
    pub use crate::data::{
        CircuitGateData, ConnectionData, GateTuningData, InputTable, LibraryData,
        LibraryGateData, MappingData, TuningData,
    };
    pub use crate::error::CircuitError;
    pub use crate::gate::LogicType;
    pub use crate::library::{GateLibrary, ResponseBounds};
    pub use crate::score::ScoreBreakdown;
    pub use crate::session::ScoringSession;
}
