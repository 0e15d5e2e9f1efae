//! Test helper functions and utilities

use anyhow::Result;
use auth::Clock;
use parking_lot::Mutex;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

/// Initialize test logging from `RUST_LOG`; repeated calls are ignored
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Temporary key file holding `lines`, removed on drop
///
/// # Errors
/// Fails if the temporary file cannot be written
pub fn write_key_file<S: AsRef<str>>(lines: &[S]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    for line in lines {
        writeln!(file, "{}", line.as_ref())?;
    }
    file.flush()?;
    Ok(file)
}

/// Clock replaying a scripted sequence of readings, then repeating the last
#[derive(Debug)]
pub struct ScriptedClock {
    readings: Mutex<Vec<Duration>>,
    last: Mutex<Duration>,
}

impl ScriptedClock {
    /// Clock returning `millis` in order
    #[must_use]
    pub fn from_millis(millis: &[u64]) -> Self {
        let mut readings: Vec<Duration> = millis.iter().copied().map(Duration::from_millis).collect();
        readings.reverse();
        Self {
            readings: Mutex::new(readings),
            last: Mutex::new(Duration::ZERO),
        }
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> Duration {
        let mut last = self.last.lock();
        if let Some(next) = self.readings.lock().pop() {
            *last = next;
        }
        *last
    }
}
