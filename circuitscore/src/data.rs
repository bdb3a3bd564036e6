//! Serde data model for gate libraries, circuit mappings and tuning sets.
//!
//! These are the parsed shapes of the three input documents. Reading and
//! writing them is left to the caller; the engine only consumes the typed
//! values.
//!
//! ```json
//! {
//!   "gates": [{"id": "g1", "type": "NOT", "mapping": "A1_AmtR"}],
//!   "connections": [{"source": "a", "sink": "g1"}, {"source": "g1", "sink": "y"}],
//!   "inputs": [["a"], [0], [1]],
//!   "outputs": ["y"]
//! }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CircuitError;
use crate::gate::LogicType;

// ---------------------------------------------------------------------------
// Library
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryData {
    pub gates: Vec<LibraryGateData>,
}

/// One characterised gate as it appears in a library document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryGateData {
    pub id: String,
    #[serde(rename = "type")]
    pub logic: LogicType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ymin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ymax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    #[serde(default)]
    pub factors: Vec<String>,
}

impl LibraryGateData {
    /// A NOT gate with a full set of measured constants.
    pub fn repressor(id: &str, ymin: f64, ymax: f64, k: f64, n: f64, factors: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            logic: LogicType::Not,
            ymin: Some(ymin),
            ymax: Some(ymax),
            k: Some(k),
            n: Some(n),
            factors: factors.iter().map(|f| f.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingData {
    pub gates: Vec<CircuitGateData>,
    pub connections: Vec<ConnectionData>,
    pub inputs: InputTable,
    pub outputs: Vec<String>,
}

/// A logical gate of the circuit, optionally bound to a library gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitGateData {
    pub id: String,
    #[serde(rename = "type")]
    pub logic: LogicType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<String>,
}

impl CircuitGateData {
    pub fn mapped(id: &str, logic: LogicType, library_id: &str) -> Self {
        Self {
            id: id.to_string(),
            logic,
            mapping: Some(library_id.to_string()),
        }
    }

    pub fn unmapped(id: &str, logic: LogicType) -> Self {
        Self {
            id: id.to_string(),
            logic,
            mapping: None,
        }
    }
}

/// A wire from `source` into `sink`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub source: String,
    pub sink: String,
}

impl ConnectionData {
    pub fn new(source: &str, sink: &str) -> Self {
        Self {
            source: source.to_string(),
            sink: sink.to_string(),
        }
    }
}

/// A cell of the raw `inputs` array: header names in the first row, bits after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputCell {
    Bit(u8),
    Name(String),
}

/// Input signal names and one 0/1 assignment per evaluated condition.
///
/// Always well formed: names are unique and every row has one bit per name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<InputCell>>", into = "Vec<Vec<InputCell>>")]
pub struct InputTable {
    names: Vec<String>,
    rows: Vec<Vec<bool>>,
}

impl InputTable {
    pub fn new(names: Vec<String>, rows: Vec<Vec<bool>>) -> Result<Self, CircuitError> {
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(CircuitError::MalformedMapping(format!(
                    "input {name} is declared twice"
                )));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(CircuitError::MalformedMapping(format!(
                    "input row {} has {} values for {} inputs",
                    i + 1,
                    row.len(),
                    names.len()
                )));
            }
        }
        Ok(Self { names, rows })
    }

    /// Every combination of `names`, first name most significant.
    ///
    /// Fails when the names repeat or there are too many to enumerate.
    pub fn exhaustive(names: &[&str]) -> Result<Self, CircuitError> {
        let width = names.len();
        let count = u32::try_from(width)
            .ok()
            .and_then(|w| 1usize.checked_shl(w))
            .ok_or_else(|| {
                CircuitError::MalformedMapping(format!(
                    "{width} inputs are too many to enumerate"
                ))
            })?;
        let rows = (0..count)
            .map(|bits| (0..width).map(|i| (bits >> (width - 1 - i)) & 1 == 1).collect())
            .collect();
        Self::new(names.iter().map(|n| n.to_string()).collect(), rows)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TryFrom<Vec<Vec<InputCell>>> for InputTable {
    type Error = CircuitError;

    fn try_from(raw: Vec<Vec<InputCell>>) -> Result<Self, Self::Error> {
        let mut raw = raw.into_iter();
        let header = raw
            .next()
            .ok_or_else(|| CircuitError::MalformedMapping("inputs has no header row".into()))?;
        let names = header
            .into_iter()
            .map(|cell| match cell {
                InputCell::Name(name) => Ok(name),
                InputCell::Bit(b) => Err(CircuitError::MalformedMapping(format!(
                    "input header holds value {b} instead of a name"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let rows = raw
            .enumerate()
            .map(|(i, row)| {
                row.into_iter()
                    .map(|cell| match cell {
                        InputCell::Bit(0) => Ok(false),
                        InputCell::Bit(1) => Ok(true),
                        other => Err(CircuitError::MalformedMapping(format!(
                            "input row {} holds {:?}, expected 0 or 1",
                            i + 1,
                            other
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        InputTable::new(names, rows)
    }
}

impl From<InputTable> for Vec<Vec<InputCell>> {
    fn from(table: InputTable) -> Self {
        let mut raw = Vec::with_capacity(table.rows.len() + 1);
        raw.push(table.names.into_iter().map(InputCell::Name).collect());
        raw.extend(
            table
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(|b| InputCell::Bit(b as u8)).collect()),
        );
        raw
    }
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TuningData {
    pub gates: Vec<GateTuningData>,
}

/// Part swaps for one circuit gate, addressed by circuit node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateTuningData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbs: Option<f64>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
