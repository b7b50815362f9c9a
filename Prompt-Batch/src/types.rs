use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};

/// One categorical dimension that is cycled across the tasks of a batch.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Material,
    Gemstone,
    Style,
    Angle,
    Background,
    Lighting,
}

impl Axis {
    /// Every axis, in the order its value appears in an expanded prompt.
    pub const ALL: [Axis; 6] = [
        Axis::Material,
        Axis::Gemstone,
        Axis::Style,
        Axis::Angle,
        Axis::Background,
        Axis::Lighting,
    ];

    /// Plural name used for the option list (`"materials"`, `"lighting"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Material => "materials",
            Axis::Gemstone => "gemstones",
            Axis::Style => "styles",
            Axis::Angle => "angles",
            Axis::Background => "backgrounds",
            Axis::Lighting => "lighting",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Ordered option lists for every variation axis.
///
/// Each list must contain at least one value; [`validate`](Self::validate)
/// rejects an empty axis. The `Default` set carries four options per axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationAxes {
    pub materials: Vec<String>,
    pub gemstones: Vec<String>,
    pub styles: Vec<String>,
    pub angles: Vec<String>,
    pub backgrounds: Vec<String>,
    pub lighting: Vec<String>,
}

impl Default for VariationAxes {
    fn default() -> Self {
        Self {
            materials: strings(&["gold", "silver", "platinum", "rose gold"]),
            gemstones: strings(&["diamond", "sapphire", "emerald", "ruby"]),
            styles: strings(&["modern", "vintage", "minimalist", "ornate"]),
            angles: strings(&["front view", "side view", "3/4 view", "top view"]),
            backgrounds: strings(&[
                "white studio background",
                "luxury velvet background",
                "marble surface",
                "minimalist gray background",
            ]),
            lighting: strings(&[
                "studio lighting",
                "natural daylight",
                "dramatic lighting",
                "soft diffused light",
            ]),
        }
    }
}

impl VariationAxes {
    /// Option list for one axis.
    pub fn values(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Material => &self.materials,
            Axis::Gemstone => &self.gemstones,
            Axis::Style => &self.styles,
            Axis::Angle => &self.angles,
            Axis::Background => &self.backgrounds,
            Axis::Lighting => &self.lighting,
        }
    }

    /// Replace the option list for one axis.
    pub fn with_values<I, S>(mut self, axis: Axis, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match axis {
            Axis::Material => self.materials = values,
            Axis::Gemstone => self.gemstones = values,
            Axis::Style => self.styles = values,
            Axis::Angle => self.angles = values,
            Axis::Background => self.backgrounds = values,
            Axis::Lighting => self.lighting = values,
        }
        self
    }

    /// Fails with `InvalidArgument` naming the first empty axis.
    pub fn validate(&self) -> Result<()> {
        match Axis::ALL.iter().find(|&&axis| self.values(axis).is_empty()) {
            Some(axis) => Err(BatchError::invalid(format!(
                "variation axis '{}' has no options",
                axis
            ))),
            None => Ok(()),
        }
    }
}

/// The values chosen for one task, plus its 1-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetadata {
    pub material: String,
    pub gemstone: String,
    pub style: String,
    pub angle: String,
    pub background: String,
    pub lighting: String,
    pub index: usize,
}

impl TaskMetadata {
    /// Value chosen for `axis`.
    pub fn value(&self, axis: Axis) -> &str {
        match axis {
            Axis::Material => &self.material,
            Axis::Gemstone => &self.gemstone,
            Axis::Style => &self.style,
            Axis::Angle => &self.angle,
            Axis::Background => &self.background,
            Axis::Lighting => &self.lighting,
        }
    }
}

/// A single unit of work: the full prompt text and its descriptive metadata.
///
/// Tasks are built by [`expand`](crate::prompt::expand) and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTask {
    pub prompt: String,
    pub metadata: TaskMetadata,
}

/// Outcome of one task. Exactly one is produced per [`PromptTask`], with the
/// task's metadata echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum JobResult<P> {
    #[serde(rename_all = "camelCase")]
    Success {
        payload: P,
        metadata: TaskMetadata,
        /// Wall time of the submit call.
        duration_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Failure {
        error: String,
        metadata: TaskMetadata,
        duration_ms: u64,
    },
}

impl<P> JobResult<P> {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success { .. })
    }

    pub fn metadata(&self) -> &TaskMetadata {
        match self {
            JobResult::Success { metadata, .. } | JobResult::Failure { metadata, .. } => metadata,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            JobResult::Success { duration_ms, .. } | JobResult::Failure { duration_ms, .. } => {
                *duration_ms
            }
        }
    }

    pub fn payload(&self) -> Option<&P> {
        match self {
            JobResult::Success { payload, .. } => Some(payload),
            JobResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            JobResult::Success { .. } => None,
            JobResult::Failure { error, .. } => Some(error),
        }
    }

    /// Consume the result, returning the payload on success.
    pub fn into_payload(self) -> Option<P> {
        match self {
            JobResult::Success { payload, .. } => Some(payload),
            JobResult::Failure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(index: usize) -> TaskMetadata {
        TaskMetadata {
            material: "gold".into(),
            gemstone: "ruby".into(),
            style: "modern".into(),
            angle: "top view".into(),
            background: "marble surface".into(),
            lighting: "rim lighting".into(),
            index,
        }
    }

    #[test]
    fn test_default_axes_are_valid() {
        let axes = VariationAxes::default();
        assert!(axes.validate().is_ok());
        for axis in Axis::ALL {
            assert_eq!(axes.values(axis).len(), 4, "axis {}", axis);
        }
    }

    #[test]
    fn test_validate_names_empty_axis() {
        let axes = VariationAxes::default().with_values(Axis::Angle, Vec::<String>::new());
        let err = axes.validate().unwrap_err();
        assert_eq!(
            err,
            BatchError::InvalidArgument("variation axis 'angles' has no options".into())
        );
    }

    #[test]
    fn test_metadata_value_by_axis() {
        let meta = metadata(3);
        assert_eq!(meta.value(Axis::Material), "gold");
        assert_eq!(meta.value(Axis::Lighting), "rim lighting");
        assert_eq!(meta.value(Axis::Angle), "top view");
    }

    #[test]
    fn test_job_result_accessors() {
        let ok: JobResult<String> = JobResult::Success {
            payload: "https://cdn/1.png".into(),
            metadata: metadata(1),
            duration_ms: 40,
        };
        assert!(ok.is_success());
        assert_eq!(ok.payload().map(String::as_str), Some("https://cdn/1.png"));
        assert!(ok.error().is_none());
        assert_eq!(ok.duration_ms(), 40);

        let failed: JobResult<String> = JobResult::Failure {
            error: "quota exceeded".into(),
            metadata: metadata(2),
            duration_ms: 5,
        };
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some("quota exceeded"));
        assert_eq!(failed.metadata().index, 2);
        assert!(failed.into_payload().is_none());
    }

    #[test]
    fn test_job_result_serialization() {
        let failed: JobResult<String> = JobResult::Failure {
            error: "timeout".into(),
            metadata: metadata(7),
            duration_ms: 1200,
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["durationMs"], 1200);
        assert_eq!(json["metadata"]["index"], 7);
    }
}
