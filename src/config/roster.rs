use crate::config::DrawPolicy;
use crate::domain::model::{DrawState, Group, GroupId, Participant, ParticipantId};
use crate::utils::error::{DrawError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_unique, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Participants, groups and draw policy as read from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub policy: DrawPolicy,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEntry {
    pub id: GroupId,
    pub name: String,
    pub owner: ParticipantId,
    #[serde(default)]
    pub participants: Vec<ParticipantId>,
}

impl GroupEntry {
    /// The owner always takes part, first in line if not listed.
    pub fn to_group(&self) -> Group {
        let mut participants = self.participants.clone();
        if !participants.contains(&self.owner) {
            participants.insert(0, self.owner);
        }
        Group {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner,
            participants,
            state: DrawState::NotDrawn,
        }
    }
}

impl RosterConfig {
    /// Loads and parses a roster file. Call `validate` before use.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DrawError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DrawError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn groups(&self) -> Vec<Group> {
        self.groups.iter().map(GroupEntry::to_group).collect()
    }

    pub fn validate_config(&self) -> Result<()> {
        self.policy.validate()?;

        for participant in &self.participants {
            validate_non_empty_string("participants.name", &participant.name)?;
        }
        validate_unique("participants.id", self.participants.iter().map(|p| &p.id))?;
        validate_unique("groups.id", self.groups.iter().map(|g| &g.id))?;

        let known: HashSet<ParticipantId> = self.participants.iter().map(|p| p.id).collect();
        for entry in &self.groups {
            validate_non_empty_string("groups.name", &entry.name)?;
            validate_unique("groups.participants", &entry.participants)?;

            for member in std::iter::once(&entry.owner).chain(entry.participants.iter()) {
                if !known.contains(member) {
                    return Err(DrawError::InvalidConfigValueError {
                        field: format!("groups[{}]", entry.name),
                        value: member.to_string(),
                        reason: "Unknown participant".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Validate for RosterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ANA: &str = "6f1c2a44-0d1e-4c6b-9a57-0b6a2f0e8a01";
    const BRUNO: &str = "6f1c2a44-0d1e-4c6b-9a57-0b6a2f0e8a02";
    const GROUP: &str = "9d3b7c10-5e2f-4a1b-8c3d-1e2f3a4b5c6d";

    fn sample() -> String {
        format!(
            r#"
[policy]
require_even_count = false

[[participants]]
id = "{ANA}"
name = "Ana"
wish_list = "A scarf"

[[participants]]
id = "{BRUNO}"
name = "Bruno"

[[groups]]
id = "{GROUP}"
name = "Family"
owner = "{ANA}"
participants = ["{BRUNO}"]
"#
        )
    }

    #[test]
    fn test_parse_basic_roster() {
        let config = RosterConfig::from_toml_str(&sample()).unwrap();

        assert_eq!(config.participants.len(), 2);
        assert_eq!(config.participants[0].wish_list.as_deref(), Some("A scarf"));
        assert_eq!(config.participants[1].wish_list, None);
        assert!(!config.policy.require_even_count);
        assert_eq!(config.policy.min_participants, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_owner_is_prepended_to_members() {
        let config = RosterConfig::from_toml_str(&sample()).unwrap();
        let groups = config.groups();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].participants.len(), 2);
        assert_eq!(groups[0].participants[0].to_string(), ANA);
        assert_eq!(groups[0].state, DrawState::NotDrawn);
    }

    #[test]
    fn test_policy_defaults_when_section_missing() {
        let config = RosterConfig::from_toml_str("").unwrap();
        assert!(config.policy.require_even_count);
        assert!(config.participants.is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SANTA_TEST_WISH", "Board game");

        let toml_content = format!(
            r#"
[[participants]]
id = "{ANA}"
name = "Ana"
wish_list = "${{SANTA_TEST_WISH}}"
"#
        );

        let config = RosterConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.participants[0].wish_list.as_deref(), Some("Board game"));

        std::env::remove_var("SANTA_TEST_WISH");
    }

    #[test]
    fn test_unknown_member_fails_validation() {
        let toml_content = format!(
            r#"
[[participants]]
id = "{ANA}"
name = "Ana"

[[groups]]
id = "{GROUP}"
name = "Family"
owner = "{ANA}"
participants = ["{BRUNO}"]
"#
        );

        let config = RosterConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_member_fails_validation() {
        let toml_content = format!(
            r#"
[[participants]]
id = "{ANA}"
name = "Ana"

[[participants]]
id = "{BRUNO}"
name = "Bruno"

[[groups]]
id = "{GROUP}"
name = "Family"
owner = "{ANA}"
participants = ["{BRUNO}", "{BRUNO}"]
"#
        );

        let config = RosterConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = RosterConfig::from_toml_str("[[participants]\nid =").unwrap_err();
        assert!(matches!(err, DrawError::ConfigError { .. }));
    }

    #[test]
    fn test_roster_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(sample().as_bytes()).unwrap();

        let config = RosterConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.groups[0].name, "Family");
    }
}
