//! Life status of an agent.

use std::fmt;

/// Why an agent died.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MortalityCause {
    /// Left the grid or reached its outermost ring of cells.
    OutOfDomain,
    /// Stranded on land.
    Beached,
    /// Exceeded the transport duration.
    TooOld,
    Starvation,
    Cold,
    Hot,
    Fresh,
    Saline,
    Unspecified,
}

impl MortalityCause {
    pub const ALL: [MortalityCause; 9] = [
        MortalityCause::OutOfDomain,
        MortalityCause::Beached,
        MortalityCause::TooOld,
        MortalityCause::Starvation,
        MortalityCause::Cold,
        MortalityCause::Hot,
        MortalityCause::Fresh,
        MortalityCause::Saline,
        MortalityCause::Unspecified,
    ];

    /// Stable numeric code used in output files (`0` is reserved for alive).
    pub fn code(self) -> u8 {
        match self {
            MortalityCause::OutOfDomain => 1,
            MortalityCause::Beached     => 2,
            MortalityCause::TooOld      => 3,
            MortalityCause::Starvation  => 4,
            MortalityCause::Cold        => 5,
            MortalityCause::Hot         => 6,
            MortalityCause::Fresh       => 7,
            MortalityCause::Saline      => 8,
            MortalityCause::Unspecified => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MortalityCause::OutOfDomain => "out_of_domain",
            MortalityCause::Beached     => "beached",
            MortalityCause::TooOld      => "too_old",
            MortalityCause::Starvation  => "starvation",
            MortalityCause::Cold        => "cold",
            MortalityCause::Hot         => "hot",
            MortalityCause::Fresh       => "fresh",
            MortalityCause::Saline      => "saline",
            MortalityCause::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for MortalityCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Alive`, or dead for a recorded cause.  Death is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MortalityState {
    #[default]
    Alive,
    Dead(MortalityCause),
}

impl MortalityState {
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, MortalityState::Alive)
    }

    #[inline]
    pub fn cause(self) -> Option<MortalityCause> {
        match self {
            MortalityState::Alive => None,
            MortalityState::Dead(c) => Some(c),
        }
    }

    /// Output code: `0` for alive, [`MortalityCause::code`] otherwise.
    pub fn code(self) -> u8 {
        self.cause().map_or(0, MortalityCause::code)
    }
}

impl fmt::Display for MortalityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MortalityState::Alive => f.write_str("alive"),
            MortalityState::Dead(c) => write!(f, "dead ({c})"),
        }
    }
}
