use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::FalError;

/// Flux text-to-image models hosted on fal.ai.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FluxModel {
    #[default]
    Dev,
    ProV11,
    Flux2Pro,
    Schnell,
    /// Any other fal.ai application id, e.g. `"fal-ai/flux-lora"`.
    Custom(String),
}

impl FluxModel {
    pub const KNOWN: [FluxModel; 4] = [
        FluxModel::Dev,
        FluxModel::ProV11,
        FluxModel::Flux2Pro,
        FluxModel::Schnell,
    ];

    /// Application id used in the queue URL.
    pub fn id(&self) -> &str {
        match self {
            FluxModel::Dev => "fal-ai/flux/dev",
            FluxModel::ProV11 => "fal-ai/flux-pro/v1.1",
            FluxModel::Flux2Pro => "fal-ai/flux-2-pro",
            FluxModel::Schnell => "fal-ai/flux/schnell",
            FluxModel::Custom(id) => id,
        }
    }
}

impl AsRef<str> for FluxModel {
    fn as_ref(&self) -> &str {
        self.id()
    }
}

impl fmt::Display for FluxModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FluxModel {
    type Err = FalError;

    /// Accepts a full application id or one of the short names
    /// `dev`, `pro`, `flux-2-pro`, `schnell`. Unknown ids containing a
    /// `/` become [`FluxModel::Custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(model) = Self::KNOWN.iter().find(|m| m.id() == s) {
            return Ok(model.clone());
        }
        match s {
            "dev" => Ok(FluxModel::Dev),
            "pro" | "pro-v1.1" => Ok(FluxModel::ProV11),
            "flux-2-pro" => Ok(FluxModel::Flux2Pro),
            "schnell" => Ok(FluxModel::Schnell),
            other if other.contains('/') && !other.starts_with('/') && !other.ends_with('/') => {
                Ok(FluxModel::Custom(other.to_string()))
            }
            other => Err(FalError::InvalidRequest(format!(
                "unknown model '{}'",
                other
            ))),
        }
    }
}

/// Output dimensions, sent to fal.ai as `{"width": .., "height": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const SQUARE: ImageSize = ImageSize::new(1024, 1024);
    pub const LANDSCAPE_4_3: ImageSize = ImageSize::new(1024, 768);
    pub const PORTRAIT_3_4: ImageSize = ImageSize::new(768, 1024);
    pub const LANDSCAPE_16_9: ImageSize = ImageSize::new(1280, 720);
    pub const PORTRAIT_9_16: ImageSize = ImageSize::new(720, 1280);

    /// Sizes offered for product shots.
    pub const PRESETS: [ImageSize; 5] = [
        Self::SQUARE,
        Self::LANDSCAPE_4_3,
        Self::PORTRAIT_3_4,
        Self::LANDSCAPE_16_9,
        Self::PORTRAIT_9_16,
    ];

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::SQUARE
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = FalError;

    /// Parses `"WIDTHxHEIGHT"`, e.g. `"1280x720"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FalError::InvalidRequest(format!("invalid image size '{}'", s));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let width: u32 = w.trim().parse().map_err(|_| bad())?;
        let height: u32 = h.trim().parse().map_err(|_| bad())?;
        if width == 0 || height == 0 {
            return Err(bad());
        }
        Ok(Self::new(width, height))
    }
}

/// Builder for Flux text-to-image arguments.
///
/// # Example
/// ```
/// use fal_client::{FluxRequest, ImageSize};
///
/// let (args, seed) = FluxRequest::new("gold ring on white marble")
///     .image_size(ImageSize::PORTRAIT_3_4)
///     .steps(30)
///     .guidance_scale(4.0)
///     .build();
///
/// assert!(seed >= 0);
/// assert_eq!(args["num_inference_steps"], 30);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FluxRequest {
    pub prompt: String,
    pub image_size: ImageSize,
    pub steps: u32,
    pub guidance_scale: f64,
    pub num_images: u32,
    pub enable_safety_checker: bool,
    pub output_format: String,
    pub seed: i64,
}

impl FluxRequest {
    /// Create a request with the default settings (1024x1024, 28 steps,
    /// guidance 3.5, one png image, safety checker on, random seed).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_size: ImageSize::default(),
            steps: 28,
            guidance_scale: 3.5,
            num_images: 1,
            enable_safety_checker: true,
            output_format: "png".to_string(),
            seed: -1,
        }
    }

    /// Replace the prompt, keeping every other setting.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn image_size(mut self, size: ImageSize) -> Self {
        self.image_size = size;
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn guidance_scale(mut self, scale: f64) -> Self {
        self.guidance_scale = scale;
        self
    }

    pub fn num_images(mut self, n: u32) -> Self {
        self.num_images = n;
        self
    }

    pub fn safety_checker(mut self, enabled: bool) -> Self {
        self.enable_safety_checker = enabled;
        self
    }

    /// `"png"` or `"jpeg"`.
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    /// Set a specific seed. Use -1 (the default) for random.
    pub fn seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the fal.ai arguments JSON and resolve the seed.
    ///
    /// Returns `(arguments, actual_seed)`. When `seed` is -1, a random
    /// seed is generated and returned so it can be stored with the image.
    pub fn build(&self) -> (Value, i64) {
        let seed = if self.seed < 0 {
            rand::rng().random_range(0..i64::from(u32::MAX))
        } else {
            self.seed
        };

        let args = json!({
            "prompt": self.prompt,
            "image_size": self.image_size,
            "num_inference_steps": self.steps,
            "guidance_scale": self.guidance_scale,
            "num_images": self.num_images,
            "enable_safety_checker": self.enable_safety_checker,
            "output_format": self.output_format,
            "seed": seed,
        });

        (args, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> FluxRequest {
        FluxRequest::new("rose gold ring, diamond stones")
            .image_size(ImageSize::LANDSCAPE_16_9)
            .steps(20)
            .guidance_scale(5.0)
            .seed(12345)
    }

    #[test]
    fn test_defaults() {
        let req = FluxRequest::new("test prompt");
        assert_eq!(req.image_size, ImageSize::new(1024, 1024));
        assert_eq!(req.steps, 28);
        assert_eq!(req.guidance_scale, 3.5);
        assert_eq!(req.num_images, 1);
        assert!(req.enable_safety_checker);
        assert_eq!(req.output_format, "png");
        assert_eq!(req.seed, -1);
    }

    #[test]
    fn test_build_payload_shape() {
        let (args, seed) = make_request().build();
        assert_eq!(seed, 12345);
        assert_eq!(args["prompt"], "rose gold ring, diamond stones");
        assert_eq!(args["image_size"], json!({"width": 1280, "height": 720}));
        assert_eq!(args["num_inference_steps"], 20);
        assert_eq!(args["guidance_scale"], 5.0);
        assert_eq!(args["num_images"], 1);
        assert_eq!(args["enable_safety_checker"], true);
        assert_eq!(args["output_format"], "png");
        assert_eq!(args["seed"], 12345);
    }

    #[test]
    fn test_random_seed_when_negative() {
        let (args, seed) = make_request().seed(-1).build();
        assert!(seed >= 0, "Random seed should be non-negative");
        assert_eq!(args["seed"], seed);
    }

    #[test]
    fn test_prompt_replaced_settings_kept() {
        let template = make_request();
        let (args, _) = template.clone().prompt("silver pendant").build();
        assert_eq!(args["prompt"], "silver pendant");
        assert_eq!(args["num_inference_steps"], 20);
    }

    #[test]
    fn test_model_ids() {
        assert_eq!(FluxModel::default().id(), "fal-ai/flux/dev");
        assert_eq!(FluxModel::ProV11.id(), "fal-ai/flux-pro/v1.1");
        assert_eq!(FluxModel::Flux2Pro.to_string(), "fal-ai/flux-2-pro");
        assert_eq!(FluxModel::Schnell.id(), "fal-ai/flux/schnell");
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("fal-ai/flux/dev".parse::<FluxModel>().unwrap(), FluxModel::Dev);
        assert_eq!("schnell".parse::<FluxModel>().unwrap(), FluxModel::Schnell);
        assert_eq!("pro".parse::<FluxModel>().unwrap(), FluxModel::ProV11);
        assert_eq!(
            "fal-ai/flux-lora".parse::<FluxModel>().unwrap(),
            FluxModel::Custom("fal-ai/flux-lora".into())
        );
        assert!("midjourney".parse::<FluxModel>().is_err());
    }

    #[test]
    fn test_image_size_from_str() {
        assert_eq!("1024x768".parse::<ImageSize>().unwrap(), ImageSize::LANDSCAPE_4_3);
        assert_eq!(" 720X1280 ".parse::<ImageSize>().unwrap(), ImageSize::PORTRAIT_9_16);
        assert!("1024".parse::<ImageSize>().is_err());
        assert!("0x512".parse::<ImageSize>().is_err());
        assert!("axb".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_presets_display() {
        let names: Vec<String> = ImageSize::PRESETS.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec!["1024x1024", "1024x768", "768x1024", "1280x720", "720x1280"]
        );
    }
}
