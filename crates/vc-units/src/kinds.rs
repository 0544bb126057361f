//! Unit tags for the four chart inputs.

use std::fmt;
use std::str::FromStr;

use vc_core::ExactDecimal;

use crate::UnitError;

/// Common surface of every unit enum.
pub trait UnitKind: Copy + Eq + fmt::Debug + 'static {
    /// Quantity name used in error messages.
    const QUANTITY: &'static str;
    const ALL: &'static [Self];

    fn base() -> Self;
    fn symbol(self) -> &'static str;
    /// Lowercase spellings accepted by the text parser.
    fn aliases(self) -> &'static [&'static str];

    fn is_base(self) -> bool {
        self == Self::base()
    }
}

/// Units converted by a single multiplication.
pub trait LinearUnit: UnitKind {
    fn factor(self) -> ExactDecimal;
}

fn lookup<U: UnitKind>(text: &str) -> Result<U, UnitError> {
    let key = text.trim().to_lowercase();
    U::ALL
        .iter()
        .copied()
        .find(|unit| unit.aliases().contains(&key.as_str()))
        .ok_or_else(|| UnitError::UnknownUnit {
            unit: text.trim().to_string(),
            quantity: U::QUANTITY,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FlowrateUnit {
    #[default]
    CubicMetersPerHour,
    LitersPerMinute,
    GallonsPerMinute,
}

impl UnitKind for FlowrateUnit {
    const QUANTITY: &'static str = "flow rate";
    const ALL: &'static [Self] = &[
        Self::CubicMetersPerHour,
        Self::LitersPerMinute,
        Self::GallonsPerMinute,
    ];

    fn base() -> Self {
        Self::CubicMetersPerHour
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::CubicMetersPerHour => "m³/h",
            Self::LitersPerMinute => "l/min",
            Self::GallonsPerMinute => "gpm",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::CubicMetersPerHour => &["m³/h", "m3/h", "m^3/h", "cmh"],
            Self::LitersPerMinute => &["l/min", "lpm"],
            Self::GallonsPerMinute => &["gpm", "gal/min", "usgpm"],
        }
    }
}

impl LinearUnit for FlowrateUnit {
    fn factor(self) -> ExactDecimal {
        match self {
            Self::CubicMetersPerHour => ExactDecimal::new(1, 0, false),
            Self::LitersPerMinute => ExactDecimal::new(6, 2, false),
            Self::GallonsPerMinute => ExactDecimal::new(227_125, 6, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum HeadUnit {
    #[default]
    Meters,
    Feet,
}

impl UnitKind for HeadUnit {
    const QUANTITY: &'static str = "total head";
    const ALL: &'static [Self] = &[Self::Meters, Self::Feet];

    fn base() -> Self {
        Self::Meters
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Feet => "ft",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Meters => &["m", "meter", "meters", "metre", "metres"],
            Self::Feet => &["ft", "foot", "feet"],
        }
    }
}

impl LinearUnit for HeadUnit {
    fn factor(self) -> ExactDecimal {
        match self {
            Self::Meters => ExactDecimal::new(1, 0, false),
            Self::Feet => ExactDecimal::new(3048, 4, false),
        }
    }
}

/// Kinematic units pass through; dynamic units need a density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ViscosityUnit {
    #[default]
    SquareMillimetersPerSecond,
    Centistokes,
    Centipoise,
    MillipascalSeconds,
}

impl ViscosityUnit {
    pub fn is_dynamic(self) -> bool {
        matches!(self, Self::Centipoise | Self::MillipascalSeconds)
    }
}

impl UnitKind for ViscosityUnit {
    const QUANTITY: &'static str = "viscosity";
    const ALL: &'static [Self] = &[
        Self::SquareMillimetersPerSecond,
        Self::Centistokes,
        Self::Centipoise,
        Self::MillipascalSeconds,
    ];

    fn base() -> Self {
        Self::SquareMillimetersPerSecond
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::SquareMillimetersPerSecond => "mm²/s",
            Self::Centistokes => "cSt",
            Self::Centipoise => "cP",
            Self::MillipascalSeconds => "mPa·s",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::SquareMillimetersPerSecond => &["mm²/s", "mm2/s", "mm^2/s"],
            Self::Centistokes => &["cst", "centistokes"],
            Self::Centipoise => &["cp", "centipoise"],
            Self::MillipascalSeconds => &["mpa·s", "mpa*s", "mpa.s", "mpas"],
        }
    }

    // Centistokes is the same unit under another name.
    fn is_base(self) -> bool {
        !self.is_dynamic()
    }
}

/// The base unit is labelled g/L; the fixed table maps 1000 kg/m³ to 1.0,
/// which is what makes cP divided by density come out in mm²/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DensityUnit {
    #[default]
    GramsPerLiter,
    KilogramsPerCubicMeter,
}

impl UnitKind for DensityUnit {
    const QUANTITY: &'static str = "density";
    const ALL: &'static [Self] = &[Self::GramsPerLiter, Self::KilogramsPerCubicMeter];

    fn base() -> Self {
        Self::GramsPerLiter
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::GramsPerLiter => "g/l",
            Self::KilogramsPerCubicMeter => "kg/m³",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::GramsPerLiter => &["g/l"],
            Self::KilogramsPerCubicMeter => &["kg/m³", "kg/m3", "kg/m^3"],
        }
    }
}

impl LinearUnit for DensityUnit {
    fn factor(self) -> ExactDecimal {
        match self {
            Self::GramsPerLiter => ExactDecimal::new(1, 0, false),
            Self::KilogramsPerCubicMeter => ExactDecimal::new(1, 3, false),
        }
    }
}

macro_rules! unit_text_impls {
    ($($unit:ty),*) => {$(
        impl fmt::Display for $unit {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.symbol())
            }
        }

        impl FromStr for $unit {
            type Err = UnitError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                lookup(s)
            }
        }
    )*};
}

unit_text_impls!(FlowrateUnit, HeadUnit, ViscosityUnit, DensityUnit);

/// A unit of any of the four quantities, resolved from its spelling alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyUnit {
    Flowrate(FlowrateUnit),
    Head(HeadUnit),
    Viscosity(ViscosityUnit),
    Density(DensityUnit),
}

impl AnyUnit {
    pub fn quantity(self) -> &'static str {
        match self {
            Self::Flowrate(_) => FlowrateUnit::QUANTITY,
            Self::Head(_) => HeadUnit::QUANTITY,
            Self::Viscosity(_) => ViscosityUnit::QUANTITY,
            Self::Density(_) => DensityUnit::QUANTITY,
        }
    }

    pub fn base_symbol(self) -> &'static str {
        match self {
            Self::Flowrate(_) => FlowrateUnit::base().symbol(),
            Self::Head(_) => HeadUnit::base().symbol(),
            Self::Viscosity(_) => ViscosityUnit::base().symbol(),
            Self::Density(_) => DensityUnit::base().symbol(),
        }
    }
}

impl fmt::Display for AnyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flowrate(u) => u.fmt(f),
            Self::Head(u) => u.fmt(f),
            Self::Viscosity(u) => u.fmt(f),
            Self::Density(u) => u.fmt(f),
        }
    }
}

impl FromStr for AnyUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(u) = s.parse() {
            return Ok(Self::Flowrate(u));
        }
        if let Ok(u) = s.parse() {
            return Ok(Self::Head(u));
        }
        if let Ok(u) = s.parse() {
            return Ok(Self::Viscosity(u));
        }
        if let Ok(u) = s.parse() {
            return Ok(Self::Density(u));
        }
        Err(UnitError::UnknownUnit {
            unit: s.trim().to_string(),
            quantity: "any quantity",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!("L/min".parse::<FlowrateUnit>(), Ok(FlowrateUnit::LitersPerMinute));
        assert_eq!("GPM".parse::<FlowrateUnit>(), Ok(FlowrateUnit::GallonsPerMinute));
        assert_eq!(" ft ".parse::<HeadUnit>(), Ok(HeadUnit::Feet));
        assert_eq!("cSt".parse::<ViscosityUnit>(), Ok(ViscosityUnit::Centistokes));
        assert_eq!("mPa·s".parse::<ViscosityUnit>(), Ok(ViscosityUnit::MillipascalSeconds));
        assert_eq!("kg/m3".parse::<DensityUnit>(), Ok(DensityUnit::KilogramsPerCubicMeter));
    }

    #[test]
    fn unknown_unit_names_quantity() {
        let err = "bar".parse::<HeadUnit>().unwrap_err();
        assert_eq!(
            err,
            UnitError::UnknownUnit {
                unit: "bar".into(),
                quantity: "total head"
            }
        );
    }

    #[test]
    fn symbols_parse_back() {
        for u in FlowrateUnit::ALL {
            assert_eq!(u.symbol().parse::<FlowrateUnit>().as_ref(), Ok(u));
        }
        for u in HeadUnit::ALL {
            assert_eq!(u.to_string().parse::<HeadUnit>().as_ref(), Ok(u));
        }
        for u in ViscosityUnit::ALL {
            assert_eq!(u.to_string().parse::<ViscosityUnit>().as_ref(), Ok(u));
        }
        for u in DensityUnit::ALL {
            assert_eq!(u.to_string().parse::<DensityUnit>().as_ref(), Ok(u));
        }
    }

    #[test]
    fn base_units() {
        assert!(FlowrateUnit::CubicMetersPerHour.is_base());
        assert!(!FlowrateUnit::GallonsPerMinute.is_base());
        assert!(ViscosityUnit::Centistokes.is_base());
        assert!(!ViscosityUnit::Centipoise.is_base());
        assert_eq!(DensityUnit::default(), DensityUnit::base());
    }

    #[test]
    fn any_unit_resolves_quantity() {
        assert_eq!(
            "l/min".parse::<AnyUnit>(),
            Ok(AnyUnit::Flowrate(FlowrateUnit::LitersPerMinute))
        );
        assert_eq!("m".parse::<AnyUnit>(), Ok(AnyUnit::Head(HeadUnit::Meters)));
        assert_eq!(
            "cP".parse::<AnyUnit>().map(AnyUnit::quantity),
            Ok("viscosity")
        );
        assert!("psi".parse::<AnyUnit>().is_err());
    }
}
