use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "cms_probe=debug,info" } else { "cms_probe=info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber. `json` emits one flattened object per
/// event for CI log collectors; anything else is the compact terminal form.
pub fn init_logger(format: &str, verbose: bool) {
    let registry = tracing_subscriber::registry().with(filter(verbose));
    let layer = fmt::layer().with_target(false);

    match format {
        "json" => registry.with(layer.json().flatten_event(true)).init(),
        _ => registry.with(layer.compact()).init(),
    }
}
