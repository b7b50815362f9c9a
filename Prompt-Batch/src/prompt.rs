use crate::error::{BatchError, Result};
use crate::types::{Axis, PromptTask, TaskMetadata, VariationAxes};

/// Photography descriptors appended to every expanded prompt.
pub const QUALITY_SUFFIX: &str =
    "professional product photography, high detail, 8K resolution, commercial photography";

/// Expand one base description into `count` prompt tasks.
///
/// Task `i` (0-based) takes `values[i % len]` from every axis, so the output
/// is fully determined by `base_prompt`, `count` and the axis ordering. Task
/// metadata carries the chosen values and the 1-based `index`.
///
/// Leading and trailing whitespace is stripped from `base_prompt` before it
/// is placed in each prompt. `count == 0` yields an empty list.
///
/// # Errors
///
/// `InvalidArgument` if the base prompt is blank or any axis is empty.
///
/// # Example
///
/// ```
/// use prompt_batch::{expand, Axis, VariationAxes};
///
/// let axes = VariationAxes::default().with_values(Axis::Material, ["gold", "silver"]);
/// let tasks = expand("delicate pendant necklace", 3, &axes).unwrap();
///
/// assert_eq!(tasks.len(), 3);
/// assert_eq!(tasks[2].metadata.material, "gold");
/// assert_eq!(tasks[2].metadata.index, 3);
/// ```
pub fn expand(base_prompt: &str, count: usize, axes: &VariationAxes) -> Result<Vec<PromptTask>> {
    let base = base_prompt.trim();
    if base.is_empty() {
        return Err(BatchError::invalid("base prompt must not be empty"));
    }
    axes.validate()?;

    let tasks = (0..count)
        .map(|i| {
            let pick = |axis: Axis| {
                let values = axes.values(axis);
                values[i % values.len()].clone()
            };

            let metadata = TaskMetadata {
                material: pick(Axis::Material),
                gemstone: pick(Axis::Gemstone),
                style: pick(Axis::Style),
                angle: pick(Axis::Angle),
                background: pick(Axis::Background),
                lighting: pick(Axis::Lighting),
                index: i + 1,
            };

            PromptTask {
                prompt: render(base, &metadata),
                metadata,
            }
        })
        .collect();

    Ok(tasks)
}

fn render(base: &str, meta: &TaskMetadata) -> String {
    format!(
        "{}, {} jewelry, {} stones, {} style, {}, {}, {}, {}",
        base,
        meta.material,
        meta.gemstone,
        meta.style,
        meta.angle,
        meta.background,
        meta.lighting,
        QUALITY_SUFFIX
    )
}
