//! The closed set of daily time labels.
//!
//! Every table in the crate (time points, offsets, relevance groups) is keyed
//! by [`ZmanLabel`], so adding or removing a label is a single edit here.
//! Declaration order is the canonical order used for all iteration and
//! tie-breaking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZmanLabel {
    ChatzotNight,
    Misheyakir,
    Dawn,
    Sunrise,
    SofZmanShma,
    SofZmanTfilla,
    Chatzot,
    MinchaGedola,
    MinchaKetana,
    PlagHaMincha,
    Sunset,
    BeinHaShmashos,
    Tzeit85deg,
    Tzeit72min,
}

/// A label string that is not part of [`ZmanLabel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown zman label: {0}")]
pub struct UnknownLabel(pub String);

impl ZmanLabel {
    pub const COUNT: usize = 14;

    /// All labels in canonical order.
    pub const ALL: [ZmanLabel; Self::COUNT] = [
        ZmanLabel::ChatzotNight,
        ZmanLabel::Misheyakir,
        ZmanLabel::Dawn,
        ZmanLabel::Sunrise,
        ZmanLabel::SofZmanShma,
        ZmanLabel::SofZmanTfilla,
        ZmanLabel::Chatzot,
        ZmanLabel::MinchaGedola,
        ZmanLabel::MinchaKetana,
        ZmanLabel::PlagHaMincha,
        ZmanLabel::Sunset,
        ZmanLabel::BeinHaShmashos,
        ZmanLabel::Tzeit85deg,
        ZmanLabel::Tzeit72min,
    ];

    /// Position in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire key, as used by the time-service and in state file names.
    pub fn key(self) -> &'static str {
        match self {
            ZmanLabel::ChatzotNight => "chatzotNight",
            ZmanLabel::Misheyakir => "misheyakir",
            ZmanLabel::Dawn => "dawn",
            ZmanLabel::Sunrise => "sunrise",
            ZmanLabel::SofZmanShma => "sofZmanShma",
            ZmanLabel::SofZmanTfilla => "sofZmanTfilla",
            ZmanLabel::Chatzot => "chatzot",
            ZmanLabel::MinchaGedola => "minchaGedola",
            ZmanLabel::MinchaKetana => "minchaKetana",
            ZmanLabel::PlagHaMincha => "plagHaMincha",
            ZmanLabel::Sunset => "sunset",
            ZmanLabel::BeinHaShmashos => "beinHaShmashos",
            ZmanLabel::Tzeit85deg => "tzeit85deg",
            ZmanLabel::Tzeit72min => "tzeit72min",
        }
    }

    /// Human-readable name for notifications.
    pub fn display_name(self) -> &'static str {
        match self {
            ZmanLabel::ChatzotNight => "Chatzot HaLailah",
            ZmanLabel::Misheyakir => "Misheyakir",
            ZmanLabel::Dawn => "Dawn",
            ZmanLabel::Sunrise => "Sunrise",
            ZmanLabel::SofZmanShma => "Latest Shema",
            ZmanLabel::SofZmanTfilla => "Latest Shacharit",
            ZmanLabel::Chatzot => "Chatzot",
            ZmanLabel::MinchaGedola => "Mincha Gedola",
            ZmanLabel::MinchaKetana => "Mincha Ketana",
            ZmanLabel::PlagHaMincha => "Plag HaMincha",
            ZmanLabel::Sunset => "Sunset",
            ZmanLabel::BeinHaShmashos => "Bein HaShmashos",
            ZmanLabel::Tzeit85deg => "Nightfall (8.5\u{b0})",
            ZmanLabel::Tzeit72min => "Nightfall (72 min)",
        }
    }
}

impl fmt::Display for ZmanLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ZmanLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZmanLabel::ALL
            .into_iter()
            .find(|label| label.key() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}
