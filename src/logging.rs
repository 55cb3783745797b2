use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set;
/// `json` switches to one JSON object per line for log shipping.
pub fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("mada_academy={level},tower_http={level},sqlx=warn"))
    });

    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    // Tests and repeated CLI invocations may install a subscriber twice.
    if let Err(err) = result {
        eprintln!("logging already initialised: {err}");
    }
}
