//! Run configuration.
//!
//! A job file is TOML:
//!
//! ```toml
//! input = "specimen_tension.k"
//! output = "full_specimen.k"
//! axis = "y"
//! angles = [90, 180, 270]
//! initial_patches = 2
//!
//! [part]
//! id = 1
//! title = "specimen"
//! ```
//!
//! `angles` may instead be `{ copies = 24 }` for 24 evenly spaced copies.

use std::path::{Path, PathBuf};

use patchspin_keyword::PartHeader;
use patchspin_math::Axis;
use serde::{Deserialize, Serialize};

use crate::error::{PatchspinError, Result};

/// Rotation angles of the extra copies, in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AngleSpec {
    /// Explicit angles, one copy each.
    List(Vec<f64>),
    /// `copies` copies in total (original included), evenly spaced over a
    /// full turn.
    Copies {
        /// Total number of copies.
        copies: usize,
    },
}

impl Default for AngleSpec {
    fn default() -> Self {
        AngleSpec::List(Vec::new())
    }
}

impl AngleSpec {
    /// The angles in processing order.
    pub fn resolve(&self) -> Vec<f64> {
        match self {
            AngleSpec::List(angles) => angles.clone(),
            AngleSpec::Copies { copies } => (1..*copies)
                .map(|k| k as f64 * 360.0 / *copies as f64)
                .collect(),
        }
    }
}

/// The `*PART` card of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartConfig {
    /// Part id, also used as `pid` of every patch.
    pub id: u64,
    /// Part title.
    pub title: String,
}

impl Default for PartConfig {
    fn default() -> Self {
        let header = PartHeader::default();
        Self {
            id: header.id,
            title: header.title,
        }
    }
}

impl From<&PartConfig> for PartHeader {
    fn from(part: &PartConfig) -> Self {
        PartHeader {
            id: part.id,
            title: part.title.clone(),
        }
    }
}

/// Parameters of one replication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevolveConfig {
    /// Rotation axis.
    pub axis: Axis,
    /// Angles of the rotated copies.
    pub angles: AngleSpec,
    /// Patches in the input patch section.
    pub initial_patches: usize,
    /// Output part card.
    pub part: PartConfig,
}

impl Default for RevolveConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            angles: AngleSpec::default(),
            initial_patches: 1,
            part: PartConfig::default(),
        }
    }
}

impl RevolveConfig {
    /// Check values a deck cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.initial_patches == 0 {
            return Err(PatchspinError::Config(
                "initial_patches must be at least 1".into(),
            ));
        }
        if self.part.id == 0 {
            return Err(PatchspinError::Config("part id must be at least 1".into()));
        }
        if let Some(angle) = self.angles.resolve().into_iter().find(|a| !a.is_finite()) {
            return Err(PatchspinError::Config(format!("angle {angle} is not finite")));
        }
        Ok(())
    }
}

/// A replication job: where to read, where to write, and how to rotate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Input deck path.
    pub input: Option<PathBuf>,
    /// Output deck path.
    pub output: Option<PathBuf>,
    /// Rotation parameters.
    #[serde(flatten)]
    pub revolve: RevolveConfig,
}

impl JobConfig {
    /// Parse a job from TOML text.
    ///
    /// An `axis` other than x, y or z is reported as
    /// [`MathError::InvalidAxis`](patchspin_math::MathError::InvalidAxis).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(text)?;
        if let Some(axis) = table.get("axis").and_then(toml::Value::as_str) {
            axis.parse::<Axis>()?;
        }
        let job: JobConfig = toml::Value::Table(table).try_into()?;
        job.revolve.validate()?;
        Ok(job)
    }

    /// Load a job file.
    ///
    /// Relative `input`/`output` paths are resolved against the file's
    /// directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut job = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        if let Some(dir) = path.parent() {
            for p in [&mut job.input, &mut job.output].into_iter().flatten() {
                if p.is_relative() {
                    *p = dir.join(&*p);
                }
            }
        }
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_full_job() {
        let job = JobConfig::from_toml_str(
            r#"
input = "specimen_tension.k"
output = "full_specimen.k"
axis = "y"
angles = [90, 180.0, 270]
initial_patches = 2

[part]
id = 3
title = "specimen"
"#,
        )
        .unwrap();
        assert_eq!(job.input, Some(PathBuf::from("specimen_tension.k")));
        assert_eq!(job.revolve.axis, Axis::Y);
        assert_eq!(job.revolve.angles.resolve(), vec![90.0, 180.0, 270.0]);
        assert_eq!(job.revolve.initial_patches, 2);
        assert_eq!(job.revolve.part.id, 3);
        assert_eq!(job.revolve.part.title, "specimen");
    }

    #[test]
    fn test_defaults() {
        let job = JobConfig::from_toml_str("").unwrap();
        assert_eq!(job.revolve, RevolveConfig::default());
        assert!(job.input.is_none());
        assert!(job.revolve.angles.resolve().is_empty());
    }

    #[test]
    fn test_evenly_spaced_copies() {
        let job = JobConfig::from_toml_str("angles = { copies = 23 }\naxis = \"z\"").unwrap();
        let angles = job.revolve.angles.resolve();
        assert_eq!(angles.len(), 22);
        assert_relative_eq!(angles[0], 15.652173913043478);
        assert_relative_eq!(angles[21], 344.3478260869565);
        assert_eq!(AngleSpec::Copies { copies: 1 }.resolve(), Vec::<f64>::new());
    }

    #[test]
    fn test_invalid_axis_rejected() {
        let err = JobConfig::from_toml_str("axis = \"w\"").unwrap_err();
        assert!(err.is_invalid_axis(), "{err:?}");
        assert!(err.to_string().contains("invalid rotation axis 'w'"));

        let err = JobConfig::from_toml_str("axis = 3").unwrap_err();
        assert!(matches!(err, PatchspinError::Toml(_)));
    }

    #[test]
    fn test_zero_patches_rejected() {
        let err = JobConfig::from_toml_str("initial_patches = 0").unwrap_err();
        assert!(matches!(err, PatchspinError::Config(_)));
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let config = RevolveConfig {
            angles: AngleSpec::List(vec![90.0, f64::NAN]),
            ..RevolveConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
