//! Study conditions and their counterbalanced order.

use serde::{Deserialize, Serialize};

/// One of the two AI presentation modes under study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// The AI shows its reasoning for every flag.
    Transparent,
    /// The AI shows only flags and a verdict.
    Opaque,
}

impl Condition {
    /// Both conditions, in declaration order.
    pub const ALL: [Self; 2] = [Self::Transparent, Self::Opaque];

    /// Lowercase identifier used in timestamps and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transparent => "transparent",
            Self::Opaque => "opaque",
        }
    }

    /// Participant-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transparent => "Transparent AI",
            Self::Opaque => "Opaque AI",
        }
    }

    /// The other condition.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Transparent => Self::Opaque,
            Self::Opaque => Self::Transparent,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a condition visit within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// First condition visit (index 0).
    First,
    /// Second condition visit (index 1).
    Second,
}

impl Slot {
    /// Zero-based visit index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// The slot visited after this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => None,
        }
    }
}

/// The two conditions in the order a participant sees them.
///
/// Always holds exactly one [`Condition::Transparent`] and one
/// [`Condition::Opaque`]; the type offers no way to build anything else
/// and no way to mutate it after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[Condition; 2]", into = "[Condition; 2]")]
pub struct ConditionOrder([Condition; 2]);

impl ConditionOrder {
    /// `[Transparent, Opaque]`
    pub const TRANSPARENT_FIRST: Self = Self([Condition::Transparent, Condition::Opaque]);

    /// `[Opaque, Transparent]`
    pub const OPAQUE_FIRST: Self = Self([Condition::Opaque, Condition::Transparent]);

    /// Builds the order that starts with `first`.
    #[must_use]
    pub const fn starting_with(first: Condition) -> Self {
        Self([first, first.other()])
    }

    /// Condition shown at the given visit.
    #[must_use]
    pub const fn at(&self, slot: Slot) -> Condition {
        self.0[slot.index()]
    }

    /// Visit at which `condition` is shown.
    #[must_use]
    pub fn slot_of(&self, condition: Condition) -> Slot {
        if self.0[0] == condition {
            Slot::First
        } else {
            Slot::Second
        }
    }

    /// Conditions in visit order.
    #[must_use]
    pub const fn as_array(&self) -> [Condition; 2] {
        self.0
    }
}

impl TryFrom<[Condition; 2]> for ConditionOrder {
    type Error = String;

    fn try_from(value: [Condition; 2]) -> Result<Self, Self::Error> {
        if value[0] == value[1] {
            return Err(format!(
                "condition order must contain both conditions, got [{}, {}]",
                value[0], value[1]
            ));
        }
        Ok(Self(value))
    }
}

impl From<ConditionOrder> for [Condition; 2] {
    fn from(order: ConditionOrder) -> Self {
        order.0
    }
}

impl std::fmt::Display for ConditionOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_is_involution() {
        for c in Condition::ALL {
            assert_ne!(c, c.other());
            assert_eq!(c, c.other().other());
        }
    }

    #[test]
    fn order_starting_with_holds_both() {
        let order = ConditionOrder::starting_with(Condition::Opaque);
        assert_eq!(order, ConditionOrder::OPAQUE_FIRST);
        assert_eq!(order.at(Slot::First), Condition::Opaque);
        assert_eq!(order.at(Slot::Second), Condition::Transparent);
        assert_eq!(order.slot_of(Condition::Transparent), Slot::Second);
    }

    #[test]
    fn order_serializes_as_array() {
        let json = serde_json::to_string(&ConditionOrder::TRANSPARENT_FIRST).unwrap();
        assert_eq!(json, r#"["transparent","opaque"]"#);
    }

    #[test]
    fn order_rejects_repeated_condition() {
        let result: Result<ConditionOrder, _> = serde_json::from_str(r#"["opaque","opaque"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn slot_progression() {
        assert_eq!(Slot::First.next(), Some(Slot::Second));
        assert_eq!(Slot::Second.next(), None);
        assert_eq!(Slot::Second.index(), 1);
    }
}
