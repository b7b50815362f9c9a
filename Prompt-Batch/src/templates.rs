//! Built-in base prompts and the full variation catalogue.

use serde::Serialize;

use crate::types::VariationAxes;

/// Jewelry category a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Ring,
    Necklace,
    Bracelet,
    Earrings,
}

/// A named base description that can be fed to [`expand`](crate::expand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: &'static str,
    pub prompt: &'static str,
    pub category: Category,
}

const fn template(name: &'static str, prompt: &'static str, category: Category) -> Template {
    Template {
        name,
        prompt,
        category,
    }
}

pub const TEMPLATES: &[Template] = &[
    template(
        "Engagement Ring - Classic Solitaire",
        "elegant engagement ring with classic solitaire design, round brilliant cut center stone, delicate prong setting, smooth polished band",
        Category::Ring,
    ),
    template(
        "Engagement Ring - Halo Design",
        "engagement ring with halo setting, center diamond surrounded by smaller stones, intricate band design, luxurious appearance",
        Category::Ring,
    ),
    template(
        "Engagement Ring - Three Stone",
        "three stone engagement ring, center stone with two side stones, symbolic design, elegant band",
        Category::Ring,
    ),
    template(
        "Wedding Band - Classic",
        "wedding band with classic design, smooth polished finish, comfortable fit, timeless style",
        Category::Ring,
    ),
    template(
        "Wedding Band - Diamond",
        "diamond wedding band with continuous line of stones, channel setting, brilliant sparkle",
        Category::Ring,
    ),
    template(
        "Necklace - Pendant Chain",
        "elegant pendant necklace with delicate chain, centered gemstone pendant, sophisticated clasp design",
        Category::Necklace,
    ),
    template(
        "Necklace - Statement Piece",
        "bold statement necklace with multiple gemstones, intricate design, dramatic presence",
        Category::Necklace,
    ),
    template(
        "Necklace - Choker",
        "elegant choker necklace with tight fit, decorative elements, modern design",
        Category::Necklace,
    ),
    template(
        "Bracelet - Tennis Style",
        "tennis bracelet with continuous line of gemstones, secure clasp, uniform stone setting",
        Category::Bracelet,
    ),
    template(
        "Bracelet - Bangle",
        "sleek bangle bracelet with smooth finish, minimalist design, comfortable fit",
        Category::Bracelet,
    ),
    template(
        "Bracelet - Chain",
        "chain bracelet with decorative links, secure clasp, elegant drape",
        Category::Bracelet,
    ),
    template(
        "Earrings - Stud Design",
        "classic stud earrings with secure post backing, symmetrical gemstone setting",
        Category::Earrings,
    ),
    template(
        "Earrings - Drop Style",
        "drop earrings with dangling gemstone, elegant movement, sophisticated design",
        Category::Earrings,
    ),
    template(
        "Earrings - Hoop",
        "hoop earrings with smooth finish, classic circular design, secure clasp",
        Category::Earrings,
    ),
    template(
        "Cocktail Ring - Statement Piece",
        "bold cocktail ring with large center stone, ornate setting design, dramatic presence",
        Category::Ring,
    ),
    template(
        "Eternity Band",
        "eternity band with continuous stones around entire band, symbolic design, brilliant sparkle",
        Category::Ring,
    ),
];

/// Look up a template by its exact name.
pub fn find(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// All templates in one category, in catalogue order.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static Template> {
    TEMPLATES.iter().filter(move |t| t.category == category)
}

impl VariationAxes {
    /// Every option the generator knows about, for callers that want
    /// more spread than the four-per-axis default.
    pub fn catalog() -> Self {
        let own = |values: &[&str]| -> Vec<String> { values.iter().map(|v| v.to_string()).collect() };
        Self {
            materials: own(&[
                "gold",
                "silver",
                "platinum",
                "rose gold",
                "white gold",
                "titanium",
                "brass",
                "copper",
            ]),
            gemstones: own(&[
                "diamond",
                "sapphire",
                "emerald",
                "ruby",
                "pearl",
                "amethyst",
                "topaz",
                "aquamarine",
                "garnet",
                "opal",
                "turquoise",
                "onyx",
            ]),
            styles: own(&[
                "modern",
                "vintage",
                "minimalist",
                "ornate",
                "art deco",
                "bohemian",
                "classic",
                "contemporary",
                "gothic",
                "romantic",
            ]),
            angles: own(&[
                "front view",
                "side view",
                "3/4 view",
                "top view",
                "angled view",
                "45 degree view",
            ]),
            backgrounds: own(&[
                "white studio background",
                "luxury velvet background",
                "marble surface",
                "minimalist gray background",
                "black velvet background",
                "wooden surface",
                "silk fabric background",
                "gradient background",
            ]),
            lighting: own(&[
                "studio lighting",
                "natural daylight",
                "dramatic lighting",
                "soft diffused light",
                "golden hour lighting",
                "rim lighting",
                "high key lighting",
                "low key lighting",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    #[test]
    fn test_find_template() {
        let t = find("Earrings - Hoop").unwrap();
        assert_eq!(t.category, Category::Earrings);
        assert!(t.prompt.starts_with("hoop earrings"));
        assert!(find("Tiara").is_none());
    }

    #[test]
    fn test_template_names_unique() {
        let mut names: Vec<&str> = TEMPLATES.iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TEMPLATES.len());
    }

    #[test]
    fn test_by_category() {
        assert_eq!(by_category(Category::Ring).count(), 7);
        assert_eq!(by_category(Category::Necklace).count(), 3);
        assert_eq!(by_category(Category::Bracelet).count(), 3);
        assert_eq!(by_category(Category::Earrings).count(), 3);
    }

    #[test]
    fn test_catalog_extends_defaults() {
        let catalog = VariationAxes::catalog();
        let defaults = VariationAxes::default();
        assert!(catalog.validate().is_ok());
        for axis in Axis::ALL {
            for value in defaults.values(axis) {
                assert!(catalog.values(axis).contains(value), "{} missing {}", axis, value);
            }
        }
        assert_eq!(catalog.gemstones.len(), 12);
    }
}
