// vc-core/src/units.rs

use uom::si::f64::{
    DiffusionCoefficient as UomDiffusionCoefficient, Length as UomLength,
    MassDensity as UomMassDensity, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Flowrate = UomVolumeRate;
pub type Head = UomLength;
pub type KinematicViscosity = UomDiffusionCoefficient;
pub type Density = UomMassDensity;

/// Flow rate from cubic meters per hour.
#[inline]
pub fn m3ph(v: f64) -> Flowrate {
    use uom::si::volume_rate::cubic_meter_per_second;
    Flowrate::new::<cubic_meter_per_second>(v / constants::SECONDS_PER_HOUR)
}

/// Head from meters.
#[inline]
pub fn m(v: f64) -> Head {
    use uom::si::length::meter;
    Head::new::<meter>(v)
}

/// Kinematic viscosity from mm²/s (centistokes).
#[inline]
pub fn mm2ps(v: f64) -> KinematicViscosity {
    use uom::si::diffusion_coefficient::square_meter_per_second;
    KinematicViscosity::new::<square_meter_per_second>(v * constants::MM2_TO_M2)
}

/// Density from the chart's base density value.
///
/// The conversion table maps 1000 kg/m³ to 1.0, so the base value scales like kg/L.
#[inline]
pub fn kgpl(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v * constants::KG_PER_M3_PER_BASE)
}

/// Back to the chart's base units, for display.
#[inline]
pub fn to_m3ph(q: Flowrate) -> f64 {
    use uom::si::volume_rate::cubic_meter_per_second;
    q.get::<cubic_meter_per_second>() * constants::SECONDS_PER_HOUR
}

#[inline]
pub fn to_mm2ps(nu: KinematicViscosity) -> f64 {
    use uom::si::diffusion_coefficient::square_meter_per_second;
    nu.get::<square_meter_per_second>() / constants::MM2_TO_M2
}

pub mod constants {
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
    pub const MM2_TO_M2: f64 = 1.0e-6;
    pub const KG_PER_M3_PER_BASE: f64 = 1_000.0;
}
