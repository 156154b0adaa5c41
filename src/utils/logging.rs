use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppSettings;

/// Directives applied when `RUST_LOG` is not set.
pub fn default_directives(debug: bool) -> &'static str {
    if debug {
        "lecture_portal=debug,tower_http=debug"
    } else {
        "lecture_portal=info,tower_http=info,mongodb=warn,reqwest=warn"
    }
}

pub fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(debug)))
}

/// Installs the global subscriber. Debug mode prints source locations;
/// otherwise lines are compact so upload progress stays readable.
pub fn init_logging(settings: &AppSettings) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(settings.debug));

    if settings.debug {
        registry
            .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
            .try_init()?;
    } else {
        registry.with(fmt::layer().compact().with_target(false)).try_init()?;
    }

    tracing::info!("{} v{} logging initialised (debug={})", settings.name, settings.version, settings.debug);
    Ok(())
}
