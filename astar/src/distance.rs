// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Hop counts to the nearest target node.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// A possibly unknown, possibly infinite distance.
///
/// Known distances are totally ordered with [`Distance::Infinite`] as the
/// maximum. Comparing an [`Distance::Unknown`] value is a bug and panics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Distance {
    /// Not computed (yet)
    Unknown,
    /// Exactly this many edges
    Finite(u32),
    /// No target is reachable
    Infinite,
}

impl Distance {
    pub const ZERO: Distance = Distance::Finite(0);

    pub fn is_known(self) -> bool {
        self != Distance::Unknown
    }

    pub fn is_finite(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    pub fn is_infinite(self) -> bool {
        self == Distance::Infinite
    }

    /// The finite value; panics otherwise.
    pub fn value(self) -> u32 {
        match self {
            Distance::Finite(n) => n,
            _ => panic!("distance {self} has no finite value"),
        }
    }

    /// One more edge.
    pub fn succ(self) -> Distance {
        self + 1
    }
}

impl Add<u32> for Distance {
    type Output = Distance;

    fn add(self, rhs: u32) -> Distance {
        match self {
            Distance::Finite(n) => Distance::Finite(n.saturating_add(rhs)),
            Distance::Infinite => Distance::Infinite,
            Distance::Unknown => panic!("cannot add to an unknown distance"),
        }
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        assert!(
            self.is_known() && other.is_known(),
            "comparing unknown distances: {self} and {other}"
        );
        match (self, other) {
            (Distance::Finite(a), Distance::Finite(b)) => a.cmp(b),
            (Distance::Finite(_), _) => Ordering::Less,
            (_, Distance::Finite(_)) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Unknown => write!(f, "?"),
            Distance::Finite(n) => write!(f, "{n}"),
            Distance::Infinite => write!(f, "inf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order() {
        assert!(Distance::ZERO < Distance::Finite(1));
        assert!(Distance::Finite(u32::MAX) < Distance::Infinite);
        assert_eq!(Distance::Infinite.max(Distance::Finite(3)), Distance::Infinite);
        assert_eq!(Distance::Infinite.min(Distance::Finite(3)), Distance::Finite(3));
        assert_eq!(
            [Distance::Finite(4), Distance::Infinite, Distance::Finite(2)]
                .into_iter()
                .min(),
            Some(Distance::Finite(2))
        );
    }

    #[test]
    fn arithmetic() {
        assert_eq!(Distance::Finite(2).succ(), Distance::Finite(3));
        assert_eq!(Distance::Infinite.succ(), Distance::Infinite);
        assert_eq!(Distance::Finite(u32::MAX).succ(), Distance::Finite(u32::MAX));
        assert_eq!(Distance::Finite(1) + 4, Distance::Finite(5));
    }

    #[test]
    #[should_panic]
    fn unknown_is_incomparable() {
        let _ = Distance::Unknown < Distance::ZERO;
    }

    #[test]
    fn display() {
        let shown = [Distance::Unknown, Distance::Finite(7), Distance::Infinite]
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        insta::assert_snapshot!(shown, @"? 7 inf");
    }
}
