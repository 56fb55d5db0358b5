//! Jump-range alert triggers ("warn me when intel lands within N jumps of X").

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LocationId, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpperBound {
    #[default]
    AtMost,
    Exactly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowerBound {
    #[default]
    AtLeast,
    MoreThan,
}

/// Where the jump range is measured from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeAnchor {
    Home,
    System { name: String },
    Character { name: String },
    AnyCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTrigger {
    pub name: String,
    pub anchor: RangeAnchor,
    pub upper: u32,
    #[serde(default)]
    pub upper_op: UpperBound,
    #[serde(default)]
    pub lower: u32,
    #[serde(default)]
    pub lower_op: LowerBound,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl RangeTrigger {
    pub fn within(name: impl Into<String>, anchor: RangeAnchor, upper: u32) -> Self {
        Self {
            name: name.into(),
            anchor,
            upper,
            upper_op: UpperBound::AtMost,
            lower: 0,
            lower_op: LowerBound::AtLeast,
            enabled: true,
        }
    }

    /// Does a route of `jumps` connections satisfy this trigger's range?
    pub fn matches(&self, jumps: u32) -> bool {
        if self.upper_op == UpperBound::Exactly {
            return jumps == self.upper;
        }
        if jumps > self.upper {
            return false;
        }
        match self.lower_op {
            LowerBound::AtLeast => jumps >= self.lower,
            LowerBound::MoreThan => jumps > self.lower,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ConfigError::InvalidTrigger {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.upper_op == UpperBound::Exactly {
            return Ok(());
        }
        if self.lower > self.upper {
            return Err(invalid("lower bound exceeds upper bound"));
        }
        if self.lower_op == LowerBound::MoreThan && self.lower == self.upper {
            return Err(invalid("range is empty"));
        }
        Ok(())
    }
}

/// Result of evaluating a trigger against a reported location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCheck {
    Fired { from: LocationId, jumps: u32 },
    NotFired,
    /// A route the trigger depends on is not cached yet; it has been queued.
    Pending,
    /// The anchor could not be resolved (no home set, character not tracked, ...).
    Unresolved,
}
