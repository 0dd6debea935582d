use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// JSON in production (`BLOODBANK_ENV=production`), pretty otherwise.
    pub fn for_environment(env: Option<&str>) -> Self {
        match env.map(str::trim) {
            Some(e) if e.eq_ignore_ascii_case("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Default directives: `info` globally, `debug` for the binary's own crate
/// and for HTTP request traces.
fn default_filter(service_name: &str) -> String {
    let crate_target = service_name.replace('-', "_");
    format!("info,{crate_target}=debug,bloodbank_api=debug,tower_http=debug")
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));

    let env = std::env::var("BLOODBANK_ENV").ok();
    let format = LogFormat::for_environment(env.as_deref());

    match format {
        LogFormat::Json => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .init();
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
    }

    tracing::info!(service = service_name, ?format, "tracing initialized");
}
