use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vc_core::ExactDecimal;
use vc_engine::{
    Calculator, CorrectionFactors, HRatio, SweepDefinition, SweepSpacing, sweep_viscosity,
};
use vc_project::{Project, ProjectFile, calibration_fingerprint, load_calibration};
use vc_units::{
    AnyUnit, DensityUnit, FlowrateUnit, HeadUnit, Parameters, UnitError, UnitKind, Units,
    ViscosityUnit, parse_any, split_value_and_unit, to_base, viscosity_to_base,
};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),

    #[error("Project error: {0}")]
    Project(#[from] vc_project::ProjectError),

    #[error("Engine error: {0}")]
    Engine(#[from] vc_engine::EngineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "vc-cli")]
#[command(about = "Viscosity correction factors for centrifugal pumps", long_about = None)]
struct Cli {
    /// Log pipeline details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct OperatingPoint {
    /// Flow rate, optionally with unit (e.g. "100", "440 gpm")
    #[arg(long, allow_hyphen_values = true)]
    flowrate: String,
    /// Total head, optionally with unit (e.g. "100", "328 ft")
    #[arg(long, allow_hyphen_values = true)]
    head: String,
    /// Unit for a bare flow rate
    #[arg(long)]
    flow_unit: Option<String>,
    /// Unit for a bare head
    #[arg(long)]
    head_unit: Option<String>,
    /// Chart calibration file (csv, yaml or json)
    #[arg(long)]
    calibration: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute Q, eta and H correction factors
    Calc {
        #[command(flatten)]
        point: OperatingPoint,
        /// Viscosity, optionally with unit (e.g. "100", "90 cP")
        #[arg(long, allow_hyphen_values = true)]
        viscosity: String,
        /// Density, needed for dynamic viscosity units
        #[arg(long, allow_hyphen_values = true)]
        density: Option<String>,
        #[arg(long)]
        visc_unit: Option<String>,
        #[arg(long)]
        density_unit: Option<String>,
        /// Print a JSON report
        #[arg(long)]
        json: bool,
    },
    /// Convert a value to its base unit
    Convert {
        #[arg(allow_hyphen_values = true)]
        value: String,
        unit: String,
        /// Density for cP / mPa·s, optionally with unit
        #[arg(long)]
        density: Option<String>,
    },
    /// Tabulate the factors over a viscosity range (CSV)
    Sweep {
        #[command(flatten)]
        point: OperatingPoint,
        /// First viscosity, mm²/s
        #[arg(long)]
        from: f64,
        /// Last viscosity, mm²/s
        #[arg(long)]
        to: f64,
        #[arg(long, default_value_t = 10)]
        steps: usize,
        /// Space points logarithmically
        #[arg(long)]
        log: bool,
    },
    /// Work with project files
    #[command(subcommand)]
    Project(ProjectCommands),
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Print the inputs of a project file
    Show { path: PathBuf },
    /// Compute the factors of a project file
    Calc {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Calc {
            point,
            viscosity,
            density,
            visc_unit,
            density_unit,
            json,
        } => cmd_calc(
            &point,
            &viscosity,
            density.as_deref(),
            visc_unit.as_deref(),
            density_unit.as_deref(),
            json,
        ),
        Commands::Convert {
            value,
            unit,
            density,
        } => cmd_convert(&value, &unit, density.as_deref()),
        Commands::Sweep {
            point,
            from,
            to,
            steps,
            log,
        } => cmd_sweep(&point, from, to, steps, log),
        Commands::Project(ProjectCommands::Show { path }) => cmd_project_show(&path),
        Commands::Project(ProjectCommands::Calc { path, json }) => cmd_project_calc(&path, json),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Value text with an optional unit suffix; a bare value takes `flag`, then the base unit.
fn read_input<U>(text: &str, flag: Option<&str>) -> CliResult<(ExactDecimal, U)>
where
    U: UnitKind + FromStr<Err = UnitError>,
{
    let (value, suffix) = split_value_and_unit(text)?;
    let unit = match (suffix.is_empty(), flag) {
        (false, _) => suffix.parse()?,
        (true, Some(flag)) => flag.parse()?,
        (true, None) => U::base(),
    };
    Ok((value, unit))
}

fn calculator(calibration: Option<&Path>) -> CliResult<Calculator> {
    match calibration {
        Some(path) => Ok(Calculator::new(load_calibration(path)?)?),
        None => Ok(Calculator::default()),
    }
}

#[derive(Serialize)]
struct Report {
    name: Option<String>,
    flowrate_m3ph: String,
    total_head_m: String,
    viscosity_mm2ps: String,
    factors: CorrectionFactors,
    errors: Vec<&'static str>,
    calibration: String,
}

impl Report {
    fn new(name: Option<String>, converted: &Parameters, factors: CorrectionFactors, calc: &Calculator) -> Self {
        Self {
            name,
            flowrate_m3ph: converted.flowrate.to_string(),
            total_head_m: converted.total_head.to_string(),
            viscosity_mm2ps: converted.viscosity.to_string(),
            errors: factors.error_messages(),
            factors,
            calibration: calibration_fingerprint(calc.calibration()),
        }
    }

    fn print(&self, json: bool) -> CliResult<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        if let Some(name) = &self.name {
            println!("Project: {}", name);
        }
        println!(
            "Inputs: Q = {} m³/h, H = {} m, ν = {} mm²/s",
            self.flowrate_m3ph, self.total_head_m, self.viscosity_mm2ps
        );
        if self.factors.is_ok() {
            println!("  C_Q   = {:.4}", self.factors.q);
            println!("  C_eta = {:.4}", self.factors.eta);
            for ratio in HRatio::ALL {
                println!("  C_{:<4}= {:.4}", ratio.label(), self.factors.h_for(ratio));
            }
        } else {
            println!("✗ Inputs outside the chart (flag {}):", self.factors.error_flag);
            for message in &self.errors {
                println!("  - {}", message);
            }
        }
        Ok(())
    }
}

fn cmd_calc(
    point: &OperatingPoint,
    viscosity: &str,
    density: Option<&str>,
    visc_unit: Option<&str>,
    density_unit: Option<&str>,
    json: bool,
) -> CliResult<()> {
    let (flowrate, flow_unit) = read_input::<FlowrateUnit>(&point.flowrate, point.flow_unit.as_deref())?;
    let (head, head_unit) = read_input::<HeadUnit>(&point.head, point.head_unit.as_deref())?;
    let (viscosity, visc_unit) = read_input::<ViscosityUnit>(viscosity, visc_unit)?;
    let (density, density_unit) = match density {
        Some(text) => read_input::<DensityUnit>(text, density_unit)?,
        None => (ExactDecimal::zero(), DensityUnit::base()),
    };

    let calc = calculator(point.calibration.as_deref())?;
    let params = Parameters::new(flowrate, head, viscosity).with_density(density);
    let units = Units {
        flowrate: flow_unit,
        head: head_unit,
        viscosity: visc_unit,
        density: density_unit,
    };
    let converted = params.to_base(&units);
    let factors = calc.calculate_base(&converted);
    Report::new(None, &converted, factors, &calc).print(json)
}

fn cmd_convert(value: &str, unit: &str, density: Option<&str>) -> CliResult<()> {
    let (value, unit) = parse_any(&format!("{value} {unit}"))?;
    let converted = match unit {
        AnyUnit::Flowrate(u) => to_base(value, u),
        AnyUnit::Head(u) => to_base(value, u),
        AnyUnit::Density(u) => to_base(value, u),
        AnyUnit::Viscosity(u) => {
            let (density, density_unit) = match density {
                Some(text) => read_input::<DensityUnit>(text, None)?,
                None if u.is_dynamic() => {
                    return Err(CliError::Usage(format!(
                        "converting {} needs --density",
                        u.symbol()
                    )));
                }
                None => (ExactDecimal::zero(), DensityUnit::base()),
            };
            viscosity_to_base(value, u, density, density_unit)
        }
    };
    if !converted.is_valid() {
        return Err(CliError::Usage(format!(
            "conversion of {value} {unit} is {}",
            converted.error()
        )));
    }
    println!("{} {}", converted, unit.base_symbol());
    Ok(())
}

fn cmd_sweep(point: &OperatingPoint, from: f64, to: f64, steps: usize, log: bool) -> CliResult<()> {
    let (flowrate, flow_unit) = read_input::<FlowrateUnit>(&point.flowrate, point.flow_unit.as_deref())?;
    let (head, head_unit) = read_input::<HeadUnit>(&point.head, point.head_unit.as_deref())?;
    let spacing = if log {
        SweepSpacing::Logarithmic
    } else {
        SweepSpacing::Linear
    };
    let definition = SweepDefinition::new(from, to, steps, spacing)?;

    let calc = calculator(point.calibration.as_deref())?;
    let units = Units {
        flowrate: flow_unit,
        head: head_unit,
        ..Units::default()
    };
    let base = Parameters::new(flowrate, head, ExactDecimal::zero()).to_base(&units);
    let result = sweep_viscosity(&calc, &base, &definition);

    println!("viscosity_mm2ps,q,eta,h06,h08,h10,h12,error_flag");
    for (value, f) in result.values.iter().zip(&result.factors) {
        println!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{}",
            value, f.q, f.eta, f.h[0], f.h[1], f.h[2], f.h[3], f.error_flag
        );
    }
    info!(ok = result.num_ok, failed = result.num_failed, %spacing, "sweep written");
    Ok(())
}

fn load_project_file(path: &Path) -> CliResult<ProjectFile> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let file = if is_json {
        vc_project::load_json(path)?
    } else {
        vc_project::load_yaml(path)?
    };
    Ok(file)
}

fn cmd_project_show(path: &Path) -> CliResult<()> {
    let file = load_project_file(path)?;
    println!("Project: {} (version {})", file.name, file.version);
    println!("  flow rate:  {} {}", file.inputs.flowrate, file.units.flowrate);
    println!("  total head: {} {}", file.inputs.total_head, file.units.head);
    println!("  viscosity:  {} {}", file.inputs.viscosity, file.units.viscosity);
    println!("  density:    {} {}", file.inputs.density, file.units.density);
    println!("  precision:  {}", file.precision);
    if let Some(calibration) = &file.calibration {
        println!("  calibration: {}", calibration.display());
    }
    Ok(())
}

fn cmd_project_calc(path: &Path, json: bool) -> CliResult<()> {
    let file = load_project_file(path)?;
    let calibration = file
        .calibration
        .as_ref()
        .map(|c| path.parent().unwrap_or_else(|| Path::new(".")).join(c));
    let calc = Arc::new(calculator(calibration.as_deref())?);
    let project = Project::from_file(Arc::clone(&calc), &file)?;
    let converted = project.converted();
    let factors = project.factors();
    Report::new(Some(file.name), &converted, factors, &calc).print(json)
}
