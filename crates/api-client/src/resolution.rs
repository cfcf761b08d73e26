//! Resolution tiers, the fallback ladder, and aspect ratios.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output resolution tier accepted by the generation service.
///
/// Tiers are coarse labels, not exact pixel dimensions; the service decides
/// the final geometry from the tier and the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// ~1024 px on the longer side.
    #[serde(rename = "1K")]
    OneK,
    /// ~2048 px on the longer side.
    #[serde(rename = "2K")]
    TwoK,
    /// ~4096 px on the longer side.
    #[serde(rename = "4K")]
    FourK,
}

impl Resolution {
    /// Tier label used on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::OneK => "1K",
            Resolution::TwoK => "2K",
            Resolution::FourK => "4K",
        }
    }

    /// Approximate pixel size of the longer output side.
    pub fn pixel_hint(&self) -> u32 {
        match self {
            Resolution::OneK => 1024,
            Resolution::TwoK => 2048,
            Resolution::FourK => 4096,
        }
    }

    /// Fixed descending fallback ladder starting at this tier.
    ///
    /// The ladder is total: once the lowest step fails the client stops.
    pub fn ladder(&self) -> &'static [Resolution] {
        match self {
            Resolution::FourK => &[Resolution::FourK, Resolution::TwoK, Resolution::OneK],
            Resolution::TwoK => &[Resolution::TwoK, Resolution::OneK],
            Resolution::OneK => &[Resolution::OneK],
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::TwoK
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resolution {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "1K" => Ok(Resolution::OneK),
            "2K" => Ok(Resolution::TwoK),
            "4K" => Ok(Resolution::FourK),
            other => Err(ApiError::config(format!("unknown resolution tier: {other}"))),
        }
    }
}

/// Aspect ratio labels the generation service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[serde(rename = "1:1")]
    Square,
    /// 2:3
    #[serde(rename = "2:3")]
    TwoThree,
    /// 3:2
    #[serde(rename = "3:2")]
    ThreeTwo,
    /// 3:4 — the default portrait framing for garment shots.
    #[serde(rename = "3:4")]
    ThreeFour,
    /// 4:3
    #[serde(rename = "4:3")]
    FourThree,
    /// 4:5
    #[serde(rename = "4:5")]
    FourFive,
    /// 9:16
    #[serde(rename = "9:16")]
    NineSixteen,
    /// 16:9
    #[serde(rename = "16:9")]
    SixteenNine,
}

impl AspectRatio {
    /// Ratio label used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::TwoThree => "2:3",
            AspectRatio::ThreeTwo => "3:2",
            AspectRatio::ThreeFour => "3:4",
            AspectRatio::FourThree => "4:3",
            AspectRatio::FourFive => "4:5",
            AspectRatio::NineSixteen => "9:16",
            AspectRatio::SixteenNine => "16:9",
        }
    }

    /// All accepted ratios, in menu order.
    pub fn all() -> &'static [AspectRatio] {
        &[
            AspectRatio::Square,
            AspectRatio::TwoThree,
            AspectRatio::ThreeTwo,
            AspectRatio::ThreeFour,
            AspectRatio::FourThree,
            AspectRatio::FourFive,
            AspectRatio::NineSixteen,
            AspectRatio::SixteenNine,
        ]
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::ThreeFour
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::all()
            .iter()
            .find(|ratio| ratio.as_str() == s)
            .copied()
            .ok_or_else(|| ApiError::config(format!("unknown aspect ratio: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_from_4k_has_three_descending_steps() {
        assert_eq!(
            Resolution::FourK.ladder(),
            &[Resolution::FourK, Resolution::TwoK, Resolution::OneK]
        );
    }

    #[test]
    fn ladder_from_2k_has_two_steps() {
        assert_eq!(
            Resolution::TwoK.ladder(),
            &[Resolution::TwoK, Resolution::OneK]
        );
    }

    #[test]
    fn ladder_from_1k_is_a_single_step() {
        assert_eq!(Resolution::OneK.ladder(), &[Resolution::OneK]);
    }

    #[test]
    fn tier_labels_round_trip() {
        for tier in [Resolution::OneK, Resolution::TwoK, Resolution::FourK] {
            assert_eq!(tier.label().parse::<Resolution>().unwrap(), tier);
        }
        assert_eq!("2k".parse::<Resolution>().unwrap(), Resolution::TwoK);
        assert!("8K".parse::<Resolution>().is_err());
    }

    #[test]
    fn tier_serializes_to_its_label() {
        assert_eq!(
            serde_json::to_value(Resolution::FourK).unwrap(),
            serde_json::json!("4K")
        );
    }

    #[test]
    fn pixel_hints_descend_with_the_ladder() {
        let ladder = Resolution::FourK.ladder();
        assert!(ladder.windows(2).all(|w| w[0].pixel_hint() > w[1].pixel_hint()));
    }

    #[test]
    fn aspect_ratios_round_trip() {
        for ratio in AspectRatio::all() {
            assert_eq!(ratio.as_str().parse::<AspectRatio>().unwrap(), *ratio);
        }
        assert!("5:7".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn aspect_ratio_serializes_to_its_label() {
        assert_eq!(
            serde_json::to_value(AspectRatio::ThreeFour).unwrap(),
            serde_json::json!("3:4")
        );
    }
}
