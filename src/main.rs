use clap::Parser;
use santa_draw::config::cli::{CliConfig, Command};
use santa_draw::domain::model::{DrawId, GroupId, ParticipantId};
use santa_draw::utils::logger::{self, LogFormat};
use santa_draw::utils::validation::Validate;
use santa_draw::{DrawManager, FileStore, RosterConfig};
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_logger(LogFormat::from_flag(config.json_logs), config.verbose);

    let span = logger::command_span(config.command.name());
    let result = async {
        tracing::info!("Starting santa-draw CLI");
        tracing::debug!("CLI config: {:?}", config);
        run(&config).await
    }
    .instrument(span.clone())
    .await;

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            span.in_scope(|| {
                tracing::error!("❌ santa-draw failed: {} (kind: {:?})", e, e.kind())
            });
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(config: &CliConfig) -> santa_draw::Result<String> {
    config.validate()?;

    let roster = RosterConfig::from_file(&config.roster)?;
    roster.validate()?;

    let mut policy = roster.policy.clone();
    if config.allow_odd {
        policy.require_even_count = false;
    }

    let store = FileStore::open(&roster, &config.state_dir).await?;
    let manager = DrawManager::new(store, policy);

    let output = match &config.command {
        Command::Draw { group, requester } => {
            let summary = manager
                .create_draw(GroupId(*group), ParticipantId(*requester))
                .await?;
            // The owner is a participant too, so only the receipt is printed.
            serde_json::to_string_pretty(&serde_json::json!({
                "draw_id": summary.id,
                "group_id": summary.group_id,
                "created_at": summary.created_at,
                "participants": summary.pairs.len(),
            }))?
        }
        Command::Reveal { group, requester } => {
            let view = manager
                .my_recipient(GroupId(*group), ParticipantId(*requester))
                .await?;
            serde_json::to_string_pretty(&view)?
        }
        Command::Show { draw } => {
            let summary = manager.get_draw(DrawId(*draw)).await?;
            serde_json::to_string_pretty(&summary)?
        }
    };

    Ok(output)
}
