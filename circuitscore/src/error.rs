//! Error type shared by every stage of the engine.
//!
//! Validation errors (logic mismatch, cross-talk, unmapped gates, arity,
//! dangling wires) are raised while a [`CircuitGraph`](crate::circuit::CircuitGraph)
//! is built. Evaluation errors (unsupported gate types, cycles, broken
//! transfer functions, undefined bounds) abort the score computation. There
//! is no partial score.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CircuitError {
    #[error("Gate {0} is mapped to a gate of the incorrect logic type")]
    GateLogicIncorrect(String),
    #[error("Gate {0} is not mapped")]
    GateNotMapped(String),
    #[error("Transcription factor {0} is used by multiple gates")]
    CrossTalkDetected(String),
    #[error("Gate {node} has unrecognized type {logic}")]
    UnsupportedGateType { node: String, logic: String },
    #[error("Malformed gate library: {0}")]
    MalformedLibrary(String),
    #[error("Malformed circuit mapping: {0}")]
    MalformedMapping(String),
    #[error("Node {0} does not resolve to an input, a gate or a wired sink")]
    DanglingNode(String),
    #[error("Node {node} expects {expected} source(s) but has {found}")]
    InvalidArity {
        node: String,
        expected: usize,
        found: usize,
    },
    #[error("Circuit wiring forms a cycle through {0}")]
    CircuitCycleDetected(String),
    #[error("Invalid transfer function at {node}: {reason}")]
    InvalidTransferFunction { node: String, reason: String },
    #[error("Tuning targets unknown circuit gate {0}")]
    UnknownTuningTarget(String),
    #[error("Gate {gate} has no {parameter} to tune")]
    MissingParameter {
        gate: String,
        parameter: &'static str,
    },
    #[error("Gate {gate} cannot be tuned by factor {factor}")]
    InvalidTuning { gate: String, factor: f64 },
    #[error("Response bounds [{min}, {max}] do not span a range")]
    UndefinedBounds { min: f64, max: f64 },
    #[error("No circuit has been mapped")]
    NotMapped,
}

pub type Result<T> = std::result::Result<T, CircuitError>;
