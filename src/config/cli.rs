use crate::utils::error::Result;
use crate::utils::validation::{validate_path, PathKind, Validate};
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Clone, Parser)]
#[command(name = "santa-draw")]
#[command(about = "Secret Santa draws for a roster of groups")]
pub struct CliConfig {
    #[arg(long, default_value = "./roster.toml")]
    pub roster: String,

    #[arg(long, default_value = "./state")]
    pub state_dir: String,

    #[arg(long, help = "Allow groups with an odd number of participants")]
    pub allow_odd: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the draw for a group (owner only)
    Draw {
        #[arg(long)]
        group: Uuid,
        #[arg(long = "as")]
        requester: Uuid,
    },
    /// Show who the requester gives a gift to
    Reveal {
        #[arg(long)]
        group: Uuid,
        #[arg(long = "as")]
        requester: Uuid,
    },
    /// Print every pair of a draw (administrative)
    Show {
        #[arg(long)]
        draw: Uuid,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Draw { .. } => "draw",
            Command::Reveal { .. } => "reveal",
            Command::Show { .. } => "show",
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("roster", &self.roster, PathKind::File)?;
        validate_path("state_dir", &self.state_dir, PathKind::Dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_draw_command() {
        let group = Uuid::new_v4();
        let requester = Uuid::new_v4();
        let (group_arg, requester_arg) = (group.to_string(), requester.to_string());
        let config = CliConfig::try_parse_from([
            "santa-draw",
            "--roster",
            "team.toml",
            "draw",
            "--group",
            group_arg.as_str(),
            "--as",
            requester_arg.as_str(),
        ])
        .unwrap();

        assert_eq!(config.roster, "team.toml");
        assert_eq!(config.state_dir, "./state");
        assert!(!config.allow_odd);
        match &config.command {
            Command::Draw {
                group: g,
                requester: r,
            } => {
                assert_eq!(*g, group);
                assert_eq!(*r, requester);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_show_command() {
        let draw = Uuid::new_v4();
        let draw_arg = draw.to_string();
        let config =
            CliConfig::try_parse_from(["santa-draw", "show", "--draw", draw_arg.as_str()]).unwrap();
        assert!(matches!(config.command, Command::Show { draw: d } if d == draw));
        assert_eq!(config.command.name(), "show");
    }

    #[test]
    fn test_rejects_malformed_ids() {
        let result = CliConfig::try_parse_from([
            "santa-draw",
            "reveal",
            "--group",
            "not-a-uuid",
            "--as",
            "also-not",
        ]);
        assert!(result.is_err());
    }
}
