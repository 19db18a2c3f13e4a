use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::common::config::Config;

/// Install the global subscriber.
///
/// Purge events always go to a daily log file under the data directory;
/// `verbose` additionally mirrors them to stderr. `RUST_LOG` overrides the
/// default filter. Keep the returned guard alive until exit or buffered
/// lines are lost.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let default_directive = if verbose {
        "nginx_cache_purger=debug"
    } else {
        "nginx_cache_purger=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr));

    let logs_dir = Config::logs_dir();
    let (file_layer, guard) = match std::fs::create_dir_all(&logs_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&logs_dir, "purge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        // Unwritable data dir: keep going with stderr only
        Err(_) => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}
