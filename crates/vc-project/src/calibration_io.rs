//! Calibration files.
//!
//! The coefficient CSV has the header `ID,C0,C1,C2,C3,C4,C5` with one row per
//! curve: `0` is Q, `1` is eta and `2..=5` are the four H curves. Polynomial
//! rows list the highest power first; H rows use `C0..C2` as logistic
//! `(amplitude, rate, midpoint)` and ignore the rest. Scales and geometry keep
//! their compiled-in values.
//!
//! YAML and JSON files carry a whole [`Calibration`].

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use vc_engine::Calibration;

use crate::{ProjectError, ProjectResult};

const CSV_COLUMNS: [&str; 7] = ["ID", "C0", "C1", "C2", "C3", "C4", "C5"];

const ROW_NAMES: [&str; 6] = ["Q", "eta", "H0.6", "H0.8", "H1.0", "H1.2"];

pub fn parse_calibration_csv(content: &str) -> ProjectResult<Calibration> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, header) = lines.next().ok_or_else(|| csv_error(1, "missing header"))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let index_of = |name: &str| columns.iter().position(|c| c.eq_ignore_ascii_case(name));
    let indices = CSV_COLUMNS
        .iter()
        .map(|name| index_of(name).ok_or_else(|| csv_error(1, &format!("missing column {name}"))))
        .collect::<ProjectResult<Vec<usize>>>()?;

    let mut rows: [Option<[f64; 6]>; 6] = [None; 6];
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |col: usize| {
            fields
                .get(indices[col])
                .copied()
                .ok_or_else(|| csv_error(line_no, &format!("missing {}", CSV_COLUMNS[col])))
        };

        let id: usize = field(0)?
            .parse()
            .map_err(|_| csv_error(line_no, "ID is not an unsigned integer"))?;
        let mut coefficients = [0.0; 6];
        for (i, c) in coefficients.iter_mut().enumerate() {
            let text = field(i + 1)?;
            *c = text
                .parse()
                .map_err(|_| csv_error(line_no, &format!("{} = '{text}' is not a number", CSV_COLUMNS[i + 1])))?;
        }

        match rows.get_mut(id) {
            Some(slot) => *slot = Some(coefficients),
            None => warn!(line = line_no, id, "ignoring calibration row with unknown ID"),
        }
    }

    let mut complete = [[0.0; 6]; 6];
    for (id, row) in rows.iter().enumerate() {
        match row {
            Some(c) if c[0] != 0.0 => complete[id] = *c,
            Some(_) => {
                return Err(ProjectError::Calibration {
                    what: format!("{} row has a zero leading coefficient", ROW_NAMES[id]),
                });
            }
            None => {
                return Err(ProjectError::Calibration {
                    what: format!("missing {} row (ID {id})", ROW_NAMES[id]),
                });
            }
        }
    }

    let h = [2, 3, 4, 5].map(|id| [complete[id][0], complete[id][1], complete[id][2]]);
    let calibration = Calibration::from_coefficients(complete[0], complete[1], h);
    calibration.validate()?;
    Ok(calibration)
}

pub fn load_calibration_csv(path: &Path) -> ProjectResult<Calibration> {
    let content = std::fs::read_to_string(path)?;
    let calibration = parse_calibration_csv(&content)?;
    info!(path = %path.display(), "loaded calibration coefficients");
    Ok(calibration)
}

pub fn load_calibration_yaml(path: &Path) -> ProjectResult<Calibration> {
    let content = std::fs::read_to_string(path)?;
    let calibration: Calibration = serde_yaml::from_str(&content)?;
    calibration.validate()?;
    info!(path = %path.display(), "loaded calibration");
    Ok(calibration)
}

pub fn load_calibration_json(path: &Path) -> ProjectResult<Calibration> {
    let content = std::fs::read_to_string(path)?;
    let calibration: Calibration = serde_json::from_str(&content)?;
    calibration.validate()?;
    info!(path = %path.display(), "loaded calibration");
    Ok(calibration)
}

/// Pick a loader from the file extension (`csv`, `yaml`/`yml`, `json`).
pub fn load_calibration(path: &Path) -> ProjectResult<Calibration> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => load_calibration_csv(path),
        Some("yaml") | Some("yml") => load_calibration_yaml(path),
        Some("json") => load_calibration_json(path),
        _ => Err(ProjectError::Calibration {
            what: format!("unknown calibration format: {}", path.display()),
        }),
    }
}

pub fn save_calibration_yaml(path: &Path, calibration: &Calibration) -> ProjectResult<()> {
    calibration.validate()?;
    let content = serde_yaml::to_string(calibration)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// SHA-256 of the JSON form, as lowercase hex.
pub fn calibration_fingerprint(calibration: &Calibration) -> String {
    let mut hasher = Sha256::new();
    let json = serde_json::to_string(calibration).unwrap_or_default();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

fn csv_error(line: usize, what: &str) -> ProjectError {
    ProjectError::Calibration {
        what: format!("line {line}: {what}"),
    }
}
