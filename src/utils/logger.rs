use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins over the configured level; `-v` forces debug for this crate.
fn filter_directive(verbose: bool, level: &str) -> String {
    if verbose {
        "zipgate=debug,info".to_string()
    } else {
        format!("zipgate={}", level)
    }
}

fn env_filter(verbose: bool, level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, level)))
}

/// Human-readable output for interactive CLI use.
pub fn init_cli_logger(verbose: bool, level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

/// 結構化 JSON 日誌，給收集器使用
pub fn init_json_logger(verbose: bool, level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .json()
                .with_current_span(false),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_used_unless_verbose() {
        assert_eq!(filter_directive(false, "warn"), "zipgate=warn");
        assert_eq!(filter_directive(true, "warn"), "zipgate=debug,info");
    }
}
