use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const SERVICE_NAME: &str = "santa-draw";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, one short line per event.
    Compact,
    /// One JSON object per line, event fields flattened next to the span's.
    Json,
}

impl LogFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// Directive used when `RUST_LOG` is unset. Library crates stay at `info`.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "santa_draw=debug,info"
    } else {
        "santa_draw=info"
    }
}

/// Installs the global subscriber. Logs go to stderr; stdout carries the
/// command's JSON output.
pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let compact = (format == LogFormat::Compact).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
    });
    let json = (format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(json)
        .init();
}

/// Root span for one CLI invocation; every event inside carries the service
/// and the subcommand.
pub fn command_span(command: &str) -> tracing::Span {
    tracing::info_span!("santa_draw", service = SERVICE_NAME, command)
}
