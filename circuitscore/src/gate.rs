//! Physical genetic gates and their steady-state transfer functions.
//!
//! A [`GateModel`] is one characterised part from the library: its logic
//! type, the repressor Hill-curve constants measured for it, and the
//! transcription factors it consumes. Tuning never touches the measured
//! constants; it writes an overlay that [`GateModel::detune`] discards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, Result};

/// Boolean function a gate implements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicType {
    Not,
    Or,
    /// Any type the engine has no Boolean semantics for (NOR, AND, ...).
    Other(String),
}

impl LogicType {
    pub fn as_str(&self) -> &str {
        match self {
            LogicType::Not => "NOT",
            LogicType::Or => "OR",
            LogicType::Other(name) => name,
        }
    }
}

impl From<String> for LogicType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "NOT" => LogicType::Not,
            "OR" => LogicType::Or,
            _ => LogicType::Other(name),
        }
    }
}

impl From<&str> for LogicType {
    fn from(name: &str) -> Self {
        LogicType::from(name.to_string())
    }
}

impl From<LogicType> for String {
    fn from(logic: LogicType) -> Self {
        match logic {
            LogicType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LogicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuned overrides layered on top of the measured constants.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Overlay {
    ymin: Option<f64>,
    ymax: Option<f64>,
    k: Option<f64>,
}

/// Effective transfer constants of a gate at one tuning state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferParams {
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    pub k: Option<f64>,
    pub n: Option<f64>,
}

impl TransferParams {
    /// Repressor response `ymin + (ymax - ymin) / (1 + (x / k)^n)`.
    ///
    /// `None` when a constant is missing or `k` is zero. The result is not
    /// checked for finiteness; callers decide how to report that.
    pub fn response(&self, x: f64) -> Option<f64> {
        let (ymin, ymax, k, n) = (self.ymin?, self.ymax?, self.k?, self.n?);
        if k == 0.0 {
            return None;
        }
        Some(ymin + (ymax - ymin) / (1.0 + (x / k).powf(n)))
    }
}

/// One characterised gate from the library.
#[derive(Debug, Clone, PartialEq)]
pub struct GateModel {
    id: String,
    logic: LogicType,
    ymin: Option<f64>,
    ymax: Option<f64>,
    k: Option<f64>,
    n: Option<f64>,
    factors: Vec<String>,
    overlay: Overlay,
}

impl GateModel {
    pub fn new(
        id: impl Into<String>,
        logic: LogicType,
        ymin: Option<f64>,
        ymax: Option<f64>,
        k: Option<f64>,
        n: Option<f64>,
        factors: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            logic,
            ymin,
            ymax,
            k,
            n,
            factors,
            overlay: Overlay::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn logic(&self) -> &LogicType {
        &self.logic
    }

    /// Transcription factors this part uses.
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    pub fn ymin(&self) -> Option<f64> {
        self.overlay.ymin.or(self.ymin)
    }

    pub fn ymax(&self) -> Option<f64> {
        self.overlay.ymax.or(self.ymax)
    }

    pub fn k(&self) -> Option<f64> {
        self.overlay.k.or(self.k)
    }

    /// The Hill coefficient is never tuned.
    pub fn n(&self) -> Option<f64> {
        self.n
    }

    pub fn params(&self) -> TransferParams {
        TransferParams {
            ymin: self.ymin(),
            ymax: self.ymax(),
            k: self.k(),
            n: self.n(),
        }
    }

    pub fn is_tuned(&self) -> bool {
        self.overlay != Overlay::default()
    }

    /// Swap in a promoter of relative strength `z`: scales both plateaus.
    pub fn tune_promoter(&mut self, z: f64) -> Result<()> {
        self.check_factor(z)?;
        let (ymin, ymax) = match (self.ymin, self.ymax) {
            (Some(ymin), Some(ymax)) => (ymin, ymax),
            (None, _) => return Err(self.missing("ymin")),
            (_, None) => return Err(self.missing("ymax")),
        };
        self.overlay.ymin = Some(ymin * z);
        self.overlay.ymax = Some(ymax * z);
        Ok(())
    }

    /// Swap in an RBS of relative strength `z`: divides the repression threshold.
    pub fn tune_rbs(&mut self, z: f64) -> Result<()> {
        self.check_factor(z)?;
        let k = self.k.ok_or_else(|| self.missing("k"))?;
        self.overlay.k = Some(k / z);
        Ok(())
    }

    pub fn detune(&mut self) {
        self.overlay = Overlay::default();
    }

    fn check_factor(&self, z: f64) -> Result<()> {
        if z.is_finite() && z > 0.0 {
            Ok(())
        } else {
            Err(CircuitError::InvalidTuning {
                gate: self.id.clone(),
                factor: z,
            })
        }
    }

    fn missing(&self, parameter: &'static str) -> CircuitError {
        CircuitError::MissingParameter {
            gate: self.id.clone(),
            parameter,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
