//! Thread-safe project with a lazily computed result.
//!
//! A [`Project`] holds one set of raw inputs and the factors computed from
//! them. Setters invalidate the cached result; the first getter afterwards
//! converts the changed inputs and reruns the calculator.
//!
//! ## Locking
//!
//! ```text
//! getter:  read lock -> fresh? return
//!          drop read, take write -> still stale? recompute
//!          return value read under the write lock
//! setter:  write lock -> store, mark field changed, clear computed
//! ```
//!
//! Re-checking under the write lock means concurrent getters recompute at most
//! once per change, and a getter never returns factors from inputs that were
//! already overwritten when it took the lock.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};
use vc_core::{DEFAULT_PRECISION, ExactDecimal};
use vc_engine::{Calculator, CorrectionFactors, HRatio};
use vc_units::{
    DensityUnit, FlowrateUnit, HeadUnit, Parameters, Units, ViscosityUnit, to_base,
    viscosity_to_base,
};

use crate::schema::{InputsDef, ProjectFile};
use crate::{ProjectError, ProjectResult};

const FLOWRATE: usize = 0;
const TOTAL_HEAD: usize = 1;
const VISCOSITY: usize = 2;
const DENSITY: usize = 3;

#[derive(Debug, Clone)]
struct State {
    name: String,
    inputs: Parameters,
    units: Units,
    precision: usize,
    converted: Parameters,
    factors: CorrectionFactors,
    computed: bool,
    changed: [bool; 4],
    computations: u64,
}

impl State {
    fn new(name: String, inputs: Parameters, units: Units, precision: usize) -> Self {
        Self {
            name,
            inputs,
            units,
            precision,
            converted: Parameters::default(),
            factors: CorrectionFactors::default(),
            computed: false,
            changed: [true; 4],
            computations: 0,
        }
    }

    fn mark(&mut self, field: usize) {
        self.changed[field] = true;
        // viscosity conversion reads the density
        if field == DENSITY {
            self.changed[VISCOSITY] = true;
        }
        self.computed = false;
    }
}

#[derive(Debug)]
pub struct Project {
    calculator: Arc<Calculator>,
    state: RwLock<State>,
}

impl Project {
    pub fn new(calculator: Arc<Calculator>) -> Self {
        Self::with_inputs(calculator, Parameters::default(), Units::default())
    }

    pub fn with_inputs(calculator: Arc<Calculator>, inputs: Parameters, units: Units) -> Self {
        Self {
            calculator,
            state: RwLock::new(State::new(
                String::new(),
                inputs,
                units,
                DEFAULT_PRECISION,
            )),
        }
    }

    /// Build from a loaded (already validated) project file.
    pub fn from_file(calculator: Arc<Calculator>, file: &ProjectFile) -> ProjectResult<Self> {
        let parse = |what: &'static str, text: &str| {
            ExactDecimal::parse(text.trim())
                .to_result(what)
                .map_err(|e| ProjectError::Serialization(e.to_string()))
        };
        let inputs = Parameters::new(
            parse("flowrate", &file.inputs.flowrate)?,
            parse("total head", &file.inputs.total_head)?,
            parse("viscosity", &file.inputs.viscosity)?,
        )
        .with_density(parse("density", &file.inputs.density)?);
        let mut state = State::new(file.name.clone(), inputs, file.units, file.precision);
        state.precision = state.precision.clamp(1, DEFAULT_PRECISION);
        Ok(Self {
            calculator,
            state: RwLock::new(state),
        })
    }

    pub fn to_file(&self) -> ProjectFile {
        let state = self.read();
        let mut file = ProjectFile::new(
            state.name.clone(),
            InputsDef {
                flowrate: state.inputs.flowrate.to_string(),
                total_head: state.inputs.total_head.to_string(),
                viscosity: state.inputs.viscosity.to_string(),
                density: state.inputs.density.to_string(),
            },
            state.units,
        );
        file.precision = state.precision;
        file
    }

    pub fn calculator(&self) -> &Arc<Calculator> {
        &self.calculator
    }

    // ---- inputs ----

    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.write().name = name.into();
    }

    /// Raw inputs in their own units.
    pub fn inputs(&self) -> Parameters {
        self.read().inputs
    }

    pub fn units(&self) -> Units {
        self.read().units
    }

    pub fn precision(&self) -> usize {
        self.read().precision
    }

    /// Significant digits used by the `*_f64` setters, clamped to `1..=17`.
    pub fn set_precision(&self, precision: usize) {
        let mut state = self.write();
        state.precision = precision.clamp(1, DEFAULT_PRECISION);
        state.computed = false;
    }

    /// Replace every input and unit at once.
    pub fn set(&self, inputs: Parameters, units: Units) {
        let mut state = self.write();
        state.inputs = inputs;
        state.units = units;
        state.changed = [true; 4];
        state.computed = false;
    }

    pub fn set_flowrate(&self, value: ExactDecimal) {
        self.update(FLOWRATE, |s| s.inputs.flowrate = value);
    }

    pub fn set_flowrate_unit(&self, unit: FlowrateUnit) {
        self.update(FLOWRATE, |s| s.units.flowrate = unit);
    }

    pub fn set_total_head(&self, value: ExactDecimal) {
        self.update(TOTAL_HEAD, |s| s.inputs.total_head = value);
    }

    pub fn set_head_unit(&self, unit: HeadUnit) {
        self.update(TOTAL_HEAD, |s| s.units.head = unit);
    }

    pub fn set_viscosity(&self, value: ExactDecimal) {
        self.update(VISCOSITY, |s| s.inputs.viscosity = value);
    }

    pub fn set_viscosity_unit(&self, unit: ViscosityUnit) {
        self.update(VISCOSITY, |s| s.units.viscosity = unit);
    }

    pub fn set_density(&self, value: ExactDecimal) {
        self.update(DENSITY, |s| s.inputs.density = value);
    }

    pub fn set_density_unit(&self, unit: DensityUnit) {
        self.update(DENSITY, |s| s.units.density = unit);
    }

    pub fn set_flowrate_f64(&self, value: f64) {
        self.update(FLOWRATE, |s| {
            s.inputs.flowrate = ExactDecimal::from_f64_with_precision(value, s.precision)
        });
    }

    pub fn set_total_head_f64(&self, value: f64) {
        self.update(TOTAL_HEAD, |s| {
            s.inputs.total_head = ExactDecimal::from_f64_with_precision(value, s.precision)
        });
    }

    pub fn set_viscosity_f64(&self, value: f64) {
        self.update(VISCOSITY, |s| {
            s.inputs.viscosity = ExactDecimal::from_f64_with_precision(value, s.precision)
        });
    }

    pub fn set_density_f64(&self, value: f64) {
        self.update(DENSITY, |s| {
            s.inputs.density = ExactDecimal::from_f64_with_precision(value, s.precision)
        });
    }

    // ---- results ----

    /// Convert pending inputs and run the calculator now, even if the cached
    /// result is current. Getters afterwards read the new result.
    pub fn calculate(&self) -> CorrectionFactors {
        let mut state = self.write();
        self.recompute(&mut state);
        state.factors
    }

    pub fn factors(&self) -> CorrectionFactors {
        self.fresh(|s| s.factors)
    }

    pub fn q(&self) -> f64 {
        self.fresh(|s| s.factors.q)
    }

    pub fn eta(&self) -> f64 {
        self.fresh(|s| s.factors.eta)
    }

    pub fn h(&self) -> [f64; 4] {
        self.fresh(|s| s.factors.h)
    }

    pub fn h_for(&self, ratio: HRatio) -> f64 {
        self.fresh(|s| s.factors.h_for(ratio))
    }

    pub fn error_flag(&self) -> u32 {
        self.fresh(|s| s.factors.error_flag)
    }

    pub fn has_error(&self) -> bool {
        self.error_flag() != 0
    }

    /// Inputs converted to base units.
    pub fn converted(&self) -> Parameters {
        self.fresh(|s| s.converted)
    }

    /// Number of engine passes so far.
    pub fn computations(&self) -> u64 {
        self.read().computations
    }

    fn update(&self, field: usize, apply: impl FnOnce(&mut State)) {
        let mut state = self.write();
        apply(&mut state);
        state.mark(field);
    }

    fn fresh<T>(&self, get: impl Fn(&State) -> T) -> T {
        {
            let state = self.read();
            if state.computed {
                return get(&state);
            }
        }
        let mut state = self.write();
        if !state.computed {
            self.recompute(&mut state);
        }
        get(&state)
    }

    fn recompute(&self, state: &mut State) {
        let raw = state.inputs;
        let units = state.units;
        let changed = state.changed;
        let out = &mut state.converted;

        if changed[FLOWRATE] {
            out.flowrate = to_base(raw.flowrate, units.flowrate);
        }
        if changed[TOTAL_HEAD] {
            out.total_head = to_base(raw.total_head, units.head);
        }
        if changed[VISCOSITY] || changed[DENSITY] {
            out.viscosity =
                viscosity_to_base(raw.viscosity, units.viscosity, raw.density, units.density);
        }
        if changed[DENSITY] {
            out.density = to_base(raw.density, units.density);
        }
        debug!(?changed, "converted project inputs");

        state.factors = self.calculator.calculate_base(&state.converted);
        state.changed = [false; 4];
        state.computed = true;
        state.computations += 1;
        info!(
            project = %state.name,
            error_flag = state.factors.error_flag,
            "recomputed correction factors"
        );
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Snapshots inputs, units and precision; the copy recomputes on first use.
impl Clone for Project {
    fn clone(&self) -> Self {
        let state = self.read();
        let copy = State::new(state.name.clone(), state.inputs, state.units, state.precision);
        Self {
            calculator: Arc::clone(&self.calculator),
            state: RwLock::new(copy),
        }
    }
}
