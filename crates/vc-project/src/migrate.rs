//! Schema migration framework.
//!
//! Version 1 is the first project file format; each later version adds one
//! step here.

use vc_core::DEFAULT_PRECISION;

use crate::ProjectError;
use crate::schema::ProjectFile;

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut project: ProjectFile) -> Result<ProjectFile, ProjectError> {
    while project.version < LATEST_VERSION {
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: ProjectFile) -> Result<ProjectFile, ProjectError> {
    match project.version {
        1 => migrate_v1_to_v2(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 1 accepted any precision; 0 meant "default" and values above the
/// digits of an `f64` were silently capped.
fn migrate_v1_to_v2(mut project: ProjectFile) -> Result<ProjectFile, ProjectError> {
    project.precision = match project.precision {
        0 => DEFAULT_PRECISION,
        p => p.min(DEFAULT_PRECISION),
    };
    // v1 wrote empty strings for unset density
    if project.inputs.density.trim().is_empty() {
        project.inputs.density = "0".to_string();
    }
    project.version = 2;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InputsDef;
    use vc_units::Units;

    fn v1(precision: usize, density: &str) -> ProjectFile {
        let mut p = ProjectFile::new(
            "old",
            InputsDef {
                density: density.to_string(),
                ..InputsDef::default()
            },
            Units::default(),
        );
        p.version = 1;
        p.precision = precision;
        p
    }

    #[test]
    fn v1_precision_is_clamped() {
        assert_eq!(migrate_to_latest(v1(0, "0")).unwrap().precision, 17);
        assert_eq!(migrate_to_latest(v1(40, "0")).unwrap().precision, 17);
        assert_eq!(migrate_to_latest(v1(6, "0")).unwrap().precision, 6);
    }

    #[test]
    fn v1_empty_density_becomes_zero() {
        let p = migrate_to_latest(v1(17, " ")).unwrap();
        assert_eq!(p.inputs.density, "0");
        assert_eq!(p.version, LATEST_VERSION);
    }

    #[test]
    fn versions_before_the_first_format_are_rejected() {
        let mut p = v1(17, "0");
        p.version = 0;
        let err = migrate_to_latest(p).unwrap_err();
        assert!(matches!(err, ProjectError::Migration { .. }));
        assert!(err.to_string().contains("version 0"));
    }

    #[test]
    fn latest_is_untouched() {
        let p = ProjectFile::new("now", InputsDef::default(), Units::default());
        assert_eq!(migrate_to_latest(p.clone()).unwrap(), p);
    }
}
