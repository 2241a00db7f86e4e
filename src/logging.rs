// Copyright (c) 2026 rezky_nightky

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GLYPHRAIN_LOG";

/// Routes tracing output to `path`. The terminal is in raw mode on the alternate
/// screen while the rain runs, so nothing is ever written to stderr.
pub fn init_file_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_log_file_and_refuses_second_subscriber() {
        let path = std::env::temp_dir().join(format!("glyphrain-{}.log", std::process::id()));
        init_file_logging(&path).unwrap();
        tracing::info!("hello");
        assert!(path.exists());
        assert!(init_file_logging(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
