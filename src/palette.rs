//! Per-cluster colors.
//!
//! Colors are HSL strings at fixed saturation and lightness; only the hue
//! varies with the cluster index. The palette is a pure function of the
//! cluster count and the hue strategy, so cluster `i` keeps its color as long
//! as the count stays the same.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub const SATURATION: &str = "70%";
pub const LIGHTNESS: &str = "50%";

/// Golden angle in degrees, used by [`HueStrategy::GoldenAngle`].
const GOLDEN_ANGLE_DEGREES: f64 = 137.5;

/// How hues are distributed across the color wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HueStrategy {
    /// `floor(i * 360 / n)`: evenly spaced, first hue always 0.
    #[default]
    Even,
    /// `floor((i * 137.5) mod 360)`: adjacent ids land far apart on the wheel.
    GoldenAngle,
}

impl HueStrategy {
    pub fn hue(self, index: usize, count: usize) -> u32 {
        match self {
            HueStrategy::Even => ((index as u64 * 360) / count as u64) as u32,
            HueStrategy::GoldenAngle => {
                ((index as f64 * GOLDEN_ANGLE_DEGREES) % 360.0).floor() as u32
            }
        }
    }
}

impl FromStr for HueStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "even" => Ok(HueStrategy::Even),
            "golden-angle" | "golden_angle" | "golden" => Ok(HueStrategy::GoldenAngle),
            other => Err(format!(
                "unknown hue strategy '{}' (expected 'even' or 'golden-angle')",
                other
            )),
        }
    }
}

impl fmt::Display for HueStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HueStrategy::Even => f.write_str("even"),
            HueStrategy::GoldenAngle => f.write_str("golden-angle"),
        }
    }
}

pub fn hsl_color(hue: u32) -> String {
    format!("hsl({}, {}, {})", hue, SATURATION, LIGHTNESS)
}

/// Ordered colors, index `i` belongs to cluster `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    pub fn generate(count: usize, strategy: HueStrategy) -> Self {
        let colors = (0..count)
            .map(|i| hsl_color(strategy.hue(i, count)))
            .collect();
        Self { colors }
    }

    /// Color for a cluster id. `None` means the id has no slot in this
    /// palette; callers must treat that as a failure rather than pick a fallback.
    pub fn color(&self, cluster_id: u32) -> Option<&str> {
        self.colors.get(cluster_id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.colors.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hue_of(color: &str) -> u32 {
        let inner = color
            .strip_prefix("hsl(")
            .and_then(|s| s.strip_suffix(", 70%, 50%)"))
            .expect("color should match hsl(<hue>, 70%, 50%)");
        inner.parse().expect("hue should be an integer")
    }

    #[test]
    fn four_clusters_are_a_quarter_turn_apart() {
        let palette = ColorPalette::generate(4, HueStrategy::Even);
        let hues: Vec<u32> = palette.iter().map(hue_of).collect();
        assert_eq!(hues, vec![0, 90, 180, 270]);
    }

    #[test]
    fn even_palette_shape_holds_for_many_sizes() {
        for n in 1..=64 {
            let palette = ColorPalette::generate(n, HueStrategy::Even);
            assert_eq!(palette.len(), n);
            let hues: Vec<u32> = palette.iter().map(hue_of).collect();
            assert_eq!(hues[0], 0);
            assert!(hues.iter().all(|h| *h < 360));
            assert!(hues.windows(2).all(|w| w[0] <= w[1]), "n={} hues={:?}", n, hues);
        }
    }

    #[test]
    fn hue_is_truncated_not_rounded() {
        // 360 / 7 = 51.43
        let palette = ColorPalette::generate(7, HueStrategy::Even);
        assert_eq!(palette.color(1), Some("hsl(51, 70%, 50%)"));
    }

    #[test]
    fn empty_palette_has_no_colors() {
        let palette = ColorPalette::generate(0, HueStrategy::Even);
        assert!(palette.is_empty());
        assert_eq!(palette.color(0), None);
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let palette = ColorPalette::generate(2, HueStrategy::Even);
        assert_eq!(palette.color(1), Some("hsl(180, 70%, 50%)"));
        assert_eq!(palette.color(2), None);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = ColorPalette::generate(13, HueStrategy::GoldenAngle);
        let b = ColorPalette::generate(13, HueStrategy::GoldenAngle);
        assert_eq!(a, b);
    }

    #[test]
    fn golden_angle_hues() {
        let palette = ColorPalette::generate(4, HueStrategy::GoldenAngle);
        let hues: Vec<u32> = palette.iter().map(hue_of).collect();
        // 0, 137.5, 275, 412.5 % 360 = 52.5
        assert_eq!(hues, vec![0, 137, 275, 52]);
    }

    #[test]
    fn strategy_parses_from_cli_text() {
        assert_eq!("even".parse::<HueStrategy>(), Ok(HueStrategy::Even));
        assert_eq!(
            "Golden-Angle".parse::<HueStrategy>(),
            Ok(HueStrategy::GoldenAngle)
        );
        assert!("rainbow".parse::<HueStrategy>().is_err());
    }
}
