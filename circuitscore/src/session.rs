//! End-to-end scoring workflow.
//!
//! ```text
//! LibraryData ──build──▶ GateLibrary (baseline bounds captured)
//! MappingData ──map────▶ CircuitGraph (validated, truth table derived)
//! TuningData  ──tune───▶ overlays on the bound library gates
//!             ──score──▶ ScoreBreakdown
//! ```
//!
//! Tuning is session-wide: it rewrites the overlays of library gates, so
//! concurrent scoring of different tuning states needs one session (and one
//! library clone) per state.

use tracing::{debug, info};

use crate::circuit::CircuitGraph;
use crate::data::{LibraryData, MappingData, TuningData};
use crate::error::{CircuitError, Result};
use crate::eval::{self, ResponseTable};
use crate::library::{GateLibrary, ResponseBounds};
use crate::score::{self, ScoreBreakdown};

#[derive(Debug, Clone)]
pub struct ScoringSession {
    library: GateLibrary,
    circuit: Option<CircuitGraph>,
}

impl ScoringSession {
    pub fn new(library: GateLibrary) -> Self {
        Self {
            library,
            circuit: None,
        }
    }

    pub fn from_data(data: &LibraryData) -> Result<Self> {
        Ok(Self::new(GateLibrary::build(data)?))
    }

    pub fn library(&self) -> &GateLibrary {
        &self.library
    }

    pub fn circuit(&self) -> Option<&CircuitGraph> {
        self.circuit.as_ref()
    }

    /// Validate and install a circuit mapping, replacing any previous one.
    pub fn map(&mut self, mapping: &MappingData) -> Result<&CircuitGraph> {
        let graph = CircuitGraph::build(mapping, &self.library)?;
        let graph: &CircuitGraph = self.circuit.insert(graph);
        Ok(graph)
    }

    /// Replace the tuning of the mapped circuit's gates.
    ///
    /// Every bound gate is detuned first, then each entry's promoter and RBS
    /// factors are applied. Entries address circuit gate ids. Either the
    /// whole tuning set applies or none of it does.
    pub fn tune(&mut self, tuning: &TuningData) -> Result<()> {
        let circuit = self.circuit.as_ref().ok_or(CircuitError::NotMapped)?;
        let mut library = self.library.clone();

        for (_, binding) in circuit.gates() {
            if let Some(gate) = binding.library_id.as_deref().and_then(|id| library.gate_mut(id)) {
                gate.detune();
            }
        }

        for entry in &tuning.gates {
            let binding = circuit
                .binding(&entry.id)
                .ok_or_else(|| CircuitError::UnknownTuningTarget(entry.id.clone()))?;
            let Some(gate) = binding.library_id.as_deref().and_then(|id| library.gate_mut(id))
            else {
                // Unmapped OR gates have no part to swap.
                let parameter = if entry.promoter.is_some() { "ymin" } else { "k" };
                if entry.promoter.is_some() || entry.rbs.is_some() {
                    return Err(CircuitError::MissingParameter {
                        gate: entry.id.clone(),
                        parameter,
                    });
                }
                continue;
            };
            if let Some(z) = entry.promoter {
                gate.tune_promoter(z)?;
            }
            if let Some(z) = entry.rbs {
                gate.tune_rbs(z)?;
            }
            debug!(
                node = %entry.id,
                part = gate.id(),
                promoter = ?entry.promoter,
                rbs = ?entry.rbs,
                "tuned gate"
            );
        }

        self.library = library;
        Ok(())
    }

    /// Revert every library gate to its measured constants.
    pub fn detune(&mut self) {
        self.library.detune_all();
    }

    /// Normalisation bounds: current bounds widened by the untuned baseline.
    pub fn scoring_bounds(&self) -> Result<ResponseBounds> {
        let bounds = match (self.library.baseline(), self.library.bounds()) {
            (Some(baseline), Some(current)) => baseline.widen(current),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => {
                return Err(CircuitError::MalformedLibrary(
                    "no gate defines ymin/ymax, response bounds are unknown".into(),
                ))
            }
        };
        debug!(min = bounds.min, max = bounds.max, "scoring bounds");
        Ok(bounds)
    }

    /// Continuous output levels for every input row.
    pub fn responses(&self) -> Result<ResponseTable> {
        let circuit = self.circuit.as_ref().ok_or(CircuitError::NotMapped)?;
        eval::responses(circuit, &self.library, self.scoring_bounds()?)
    }

    /// Score with the per-output breakdown.
    pub fn evaluate(&self) -> Result<ScoreBreakdown> {
        let circuit = self.circuit.as_ref().ok_or(CircuitError::NotMapped)?;
        let bounds = self.scoring_bounds()?;
        let responses = eval::responses(circuit, &self.library, bounds)?;
        let breakdown = score::score(&responses, circuit.truth_table(), bounds)?;
        info!(score = breakdown.score, "scored circuit");
        Ok(breakdown)
    }

    pub fn score(&self) -> Result<f64> {
        Ok(self.evaluate()?.score)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
