//! The closed set of stat kinds a prop can be offered on, and the component algebra that relates
//! composite kinds (e.g., points+rebounds+assists) to their constituents.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, EnumString};

/// A primitive box-score component. Composite stat kinds are sums of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Points,
    Rebounds,
    Assists,
    Threes,
}
impl Component {
    const fn bit(self) -> u8 {
        match self {
            Component::Points => 0b0001,
            Component::Rebounds => 0b0010,
            Component::Assists => 0b0100,
            Component::Threes => 0b1000,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumCount,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    Points,
    Rebounds,
    Assists,
    Threes,
    PointsRebounds,
    PointsAssists,
    ReboundsAssists,
    PointsReboundsAssists,
}
impl StatKind {
    pub fn components(&self) -> &'static [Component] {
        match self {
            StatKind::Points => &[Component::Points],
            StatKind::Rebounds => &[Component::Rebounds],
            StatKind::Assists => &[Component::Assists],
            StatKind::Threes => &[Component::Threes],
            StatKind::PointsRebounds => &[Component::Points, Component::Rebounds],
            StatKind::PointsAssists => &[Component::Points, Component::Assists],
            StatKind::ReboundsAssists => &[Component::Rebounds, Component::Assists],
            StatKind::PointsReboundsAssists => {
                &[Component::Points, Component::Rebounds, Component::Assists]
            }
        }
    }

    pub fn is_composite(&self) -> bool {
        self.components().len() > 1
    }

    fn mask(&self) -> u8 {
        self.components()
            .iter()
            .fold(0, |mask, component| mask | component.bit())
    }

    /// `true` if the components of one kind are contained in the other (in either direction). Two
    /// such kinds for the same player are mutually dependent outcomes.
    pub fn nests_with(&self, other: &StatKind) -> bool {
        let (lhs, rhs) = (self.mask(), other.mask());
        lhs & rhs == lhs || lhs & rhs == rhs
    }
}
