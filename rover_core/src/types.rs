//! Small value types shared by the behavior states.

use rover_traits::Side;

/// Persistent rotation sign. Flipped on every scan sweep and on every retreat
/// that starts with both edges blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingSign {
    #[default]
    Positive,
    Negative,
}

impl HeadingSign {
    pub fn flip(&mut self) {
        *self = match self {
            HeadingSign::Positive => HeadingSign::Negative,
            HeadingSign::Negative => HeadingSign::Positive,
        };
    }

    pub fn is_positive(self) -> bool {
        self == HeadingSign::Positive
    }

    pub fn as_i8(self) -> i8 {
        match self {
            HeadingSign::Positive => 1,
            HeadingSign::Negative => -1,
        }
    }

    /// Motor that runs forward while rotating with this sign: the left one
    /// for a negative sign, the right one otherwise.
    pub fn forward_side(self) -> Side {
        match self {
            HeadingSign::Negative => Side::Left,
            HeadingSign::Positive => Side::Right,
        }
    }
}

/// Motor Retreat reverses on, chosen on its first loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReverseSide {
    #[default]
    Undetermined,
    Side(Side),
}

/// One reading of both ground sensors. `0` means no ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgePair {
    pub left: u8,
    pub right: u8,
}

impl EdgePair {
    pub const CLEAR: EdgePair = EdgePair { left: 1, right: 1 };

    pub fn left_blocked(self) -> bool {
        self.left == 0
    }

    pub fn right_blocked(self) -> bool {
        self.right == 0
    }

    pub fn any_blocked(self) -> bool {
        self.left_blocked() || self.right_blocked()
    }

    pub fn both_clear(self) -> bool {
        !self.any_blocked()
    }
}

/// Pick the motor to reverse on from edge evidence.
///
/// Left-only blocked backs the right motor, right-only blocked backs the left
/// one. Otherwise the heading sign decides: positive picks the left motor,
/// negative the right. The sign flips only when both edges are blocked; with
/// both edges already clear the heading is read but left alone.
pub fn choose_reverse_side(edges: EdgePair, heading: &mut HeadingSign) -> Side {
    let by_heading = if heading.is_positive() {
        Side::Left
    } else {
        Side::Right
    };
    match (edges.left_blocked(), edges.right_blocked()) {
        (true, false) => Side::Right,
        (false, true) => Side::Left,
        (true, true) => {
            heading.flip();
            by_heading
        }
        (false, false) => by_heading,
    }
}
