//! Project file validation.

use vc_core::{DEFAULT_PRECISION, ExactDecimal};

use crate::schema::ProjectFile;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project_file(project: &ProjectFile) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let inputs = &project.inputs;
    for (field, text) in [
        ("inputs.flowrate", &inputs.flowrate),
        ("inputs.total_head", &inputs.total_head),
        ("inputs.viscosity", &inputs.viscosity),
        ("inputs.density", &inputs.density),
    ] {
        let value = ExactDecimal::parse(text.trim());
        if !value.is_valid() {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: text.clone(),
                reason: value.error().to_string(),
            });
        }
    }

    if !(1..=DEFAULT_PRECISION).contains(&project.precision) {
        return Err(ValidationError::InvalidValue {
            field: "precision".to_string(),
            value: project.precision.to_string(),
            reason: format!("must be between 1 and {}", DEFAULT_PRECISION),
        });
    }

    Ok(())
}
