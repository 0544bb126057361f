//! Conversion of raw inputs to base units.

use tracing::debug;
use vc_core::{Density, ExactDecimal, Flowrate, Head, KinematicViscosity, kgpl, m, m3ph, mm2ps};

use crate::kinds::{DensityUnit, FlowrateUnit, HeadUnit, LinearUnit, UnitKind, ViscosityUnit};

/// Multiply by the unit's fixed factor. Base units multiply by one.
pub fn to_base<U: LinearUnit>(value: ExactDecimal, unit: U) -> ExactDecimal {
    let converted = value * unit.factor();
    if value.is_valid() && !converted.is_valid() {
        debug!(%value, unit = unit.symbol(), "unit conversion overflowed");
    }
    converted
}

/// Kinematic units pass through unchanged. Dynamic units are divided by the
/// density in base units; a zero density yields zero instead of `Infinite`.
pub fn viscosity_to_base(
    value: ExactDecimal,
    unit: ViscosityUnit,
    density: ExactDecimal,
    density_unit: DensityUnit,
) -> ExactDecimal {
    if !unit.is_dynamic() {
        return value;
    }
    if density.is_zero() {
        debug!(%value, unit = unit.symbol(), "dynamic viscosity without density");
        return ExactDecimal::zero();
    }
    value / to_base(density, density_unit)
}

/// Unit tags for one set of inputs. Defaults to the base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Units {
    #[cfg_attr(feature = "serde", serde(default))]
    pub flowrate: FlowrateUnit,
    #[cfg_attr(feature = "serde", serde(default))]
    pub head: HeadUnit,
    #[cfg_attr(feature = "serde", serde(default))]
    pub viscosity: ViscosityUnit,
    #[cfg_attr(feature = "serde", serde(default))]
    pub density: DensityUnit,
}

impl Units {
    pub fn is_base(&self) -> bool {
        self.flowrate.is_base()
            && self.head.is_base()
            && self.viscosity.is_base()
            && self.density.is_base()
    }
}

/// Raw or converted engine inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Parameters {
    pub flowrate: ExactDecimal,
    pub total_head: ExactDecimal,
    pub viscosity: ExactDecimal,
    /// Only consulted for dynamic viscosity units.
    pub density: ExactDecimal,
}

impl Parameters {
    pub fn new(flowrate: ExactDecimal, total_head: ExactDecimal, viscosity: ExactDecimal) -> Self {
        Self {
            flowrate,
            total_head,
            viscosity,
            density: ExactDecimal::zero(),
        }
    }

    pub fn from_f64(flowrate: f64, total_head: f64, viscosity: f64) -> Self {
        Self::new(
            ExactDecimal::from_f64(flowrate),
            ExactDecimal::from_f64(total_head),
            ExactDecimal::from_f64(viscosity),
        )
    }

    pub fn with_density(mut self, density: ExactDecimal) -> Self {
        self.density = density;
        self
    }

    /// Convert every field. Viscosity reads the raw density, so density is
    /// converted last.
    pub fn to_base(&self, units: &Units) -> Parameters {
        Parameters {
            flowrate: to_base(self.flowrate, units.flowrate),
            total_head: to_base(self.total_head, units.head),
            viscosity: viscosity_to_base(
                self.viscosity,
                units.viscosity,
                self.density,
                units.density,
            ),
            density: to_base(self.density, units.density),
        }
    }

    /// Typed SI view; only meaningful once the values are in base units.
    pub fn quantities(&self) -> Quantities {
        Quantities {
            flowrate: m3ph(self.flowrate.to_f64()),
            total_head: m(self.total_head.to_f64()),
            viscosity: mm2ps(self.viscosity.to_f64()),
            density: kgpl(self.density.to_f64()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantities {
    pub flowrate: Flowrate,
    pub total_head: Head,
    pub viscosity: KinematicViscosity,
    pub density: Density,
}
