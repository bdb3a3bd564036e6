//! Gate library: every characterised part available for mapping.
//!
//! The library owns the [`GateModel`]s. Circuits refer to them by id, so a
//! tuning applied here is seen by every circuit scored against the library.
//! Response bounds are rescanned on each request because tuning can move
//! either plateau.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{LibraryData, LibraryGateData};
use crate::error::{CircuitError, Result};
use crate::gate::{GateModel, LogicType};

/// Lowest and highest response any gate can produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseBounds {
    pub min: f64,
    pub max: f64,
}

impl ResponseBounds {
    /// Union of two bound sets. Never narrower than either input.
    pub fn widen(self, other: ResponseBounds) -> ResponseBounds {
        ResponseBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateLibrary {
    gates: BTreeMap<String, GateModel>,
    baseline: Option<ResponseBounds>,
}

impl GateLibrary {
    pub fn build(data: &LibraryData) -> Result<Self> {
        let mut gates = BTreeMap::new();
        for entry in &data.gates {
            let gate = gate_from_entry(entry)?;
            match gates.entry(entry.id.clone()) {
                Entry::Occupied(_) => {
                    return Err(CircuitError::MalformedLibrary(format!(
                        "gate {} is declared twice",
                        entry.id
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(gate);
                }
            }
        }

        let mut library = Self { gates, baseline: None };
        library.baseline = library.bounds();
        debug!(
            gates = library.gates.len(),
            baseline = ?library.baseline,
            "built gate library"
        );
        Ok(library)
    }

    /// Bounds over the effective constants of the current tuning state.
    ///
    /// Gates without constants do not take part. `None` when no gate has any.
    pub fn bounds(&self) -> Option<ResponseBounds> {
        let min = self
            .gates
            .values()
            .filter_map(GateModel::ymin)
            .reduce(f64::min)?;
        let max = self
            .gates
            .values()
            .filter_map(GateModel::ymax)
            .reduce(f64::max)?;
        Some(ResponseBounds { min, max })
    }

    /// Bounds of the untuned library, captured when it was built.
    pub fn baseline(&self) -> Option<ResponseBounds> {
        self.baseline
    }

    pub fn gate(&self, id: &str) -> Option<&GateModel> {
        self.gates.get(id)
    }

    pub fn gate_mut(&mut self, id: &str) -> Option<&mut GateModel> {
        self.gates.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GateModel> {
        self.gates.values()
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Revert every gate to its measured constants.
    pub fn detune_all(&mut self) {
        for gate in self.gates.values_mut() {
            gate.detune();
        }
    }
}

fn gate_from_entry(entry: &LibraryGateData) -> Result<GateModel> {
    let malformed = |what: String| CircuitError::MalformedLibrary(format!("gate {}: {what}", entry.id));

    if entry.logic == LogicType::Not {
        let missing: Vec<&str> = [
            ("ymin", entry.ymin),
            ("ymax", entry.ymax),
            ("k", entry.k),
            ("n", entry.n),
        ]
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            return Err(malformed(format!("missing {}", missing.join(", "))));
        }
    }

    match (entry.ymin, entry.ymax) {
        (Some(ymin), Some(_)) if ymin < 0.0 => {
            return Err(malformed(format!("ymin {ymin} is negative")))
        }
        (Some(ymin), Some(ymax)) if ymax < ymin => {
            return Err(malformed(format!("ymax {ymax} is below ymin {ymin}")))
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(malformed("ymin and ymax must be given together".to_string()))
        }
        _ => {}
    }
    if let Some(k) = entry.k {
        if k <= 0.0 {
            return Err(malformed(format!("k must be positive, got {k}")));
        }
    }

    Ok(GateModel::new(
        entry.id.clone(),
        entry.logic.clone(),
        entry.ymin,
        entry.ymax,
        entry.k,
        entry.n,
        entry.factors.clone(),
    ))
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
