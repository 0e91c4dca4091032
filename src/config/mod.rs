#[cfg(feature = "cli")]
pub mod cli;
pub mod roster;

use crate::domain::ports::PolicyProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_at_least, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_PARTICIPANTS: usize = 2;

/// Product rules applied before a draw is generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawPolicy {
    #[serde(default = "default_min_participants")]
    pub min_participants: usize,
    /// Groups must have an even head count. The generator itself does not care.
    #[serde(default = "default_require_even_count")]
    pub require_even_count: bool,
}

fn default_min_participants() -> usize {
    DEFAULT_MIN_PARTICIPANTS
}

fn default_require_even_count() -> bool {
    true
}

impl Default for DrawPolicy {
    fn default() -> Self {
        Self {
            min_participants: default_min_participants(),
            require_even_count: default_require_even_count(),
        }
    }
}

impl DrawPolicy {
    pub fn allow_any_count() -> Self {
        Self {
            require_even_count: false,
            ..Self::default()
        }
    }
}

impl PolicyProvider for DrawPolicy {
    fn min_participants(&self) -> usize {
        self.min_participants
    }

    fn require_even_count(&self) -> bool {
        self.require_even_count
    }
}

impl Validate for DrawPolicy {
    fn validate(&self) -> Result<()> {
        validate_at_least(
            "policy.min_participants",
            self.min_participants,
            DEFAULT_MIN_PARTICIPANTS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = DrawPolicy::default();
        assert_eq!(policy.min_participants(), 2);
        assert!(policy.require_even_count());
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_min_below_two_is_rejected() {
        let policy = DrawPolicy {
            min_participants: 1,
            require_even_count: false,
        };
        assert!(policy.validate().is_err());
    }
}
