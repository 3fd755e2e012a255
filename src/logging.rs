use std::{fs::OpenOptions, io, path::Path};

use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "jsonlquill.log";
const LOG_ENV: &str = "JSONLQUILL_LOG";

/// Routes `tracing` output to `<dir>/jsonlquill.log`. The terminal belongs
/// to the UI, so nothing is written to stdout or stderr. Keep the returned
/// guard alive until exit or buffered lines are lost.
pub fn init(dir: &Path) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }
    let log_file = log_file_opts.open(dir.join(LOG_FILE))?;
    let (writer, guard) = non_blocking(log_file);

    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("jsonlquill=info"));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(guard)
}
