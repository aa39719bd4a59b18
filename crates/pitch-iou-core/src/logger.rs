//! Stderr logging for binaries and tests.
//!
//! Lines look like `[  0.125s  INFO metrics::iou] pitch: iou 0.9871`; the
//! `pitch_iou_` crate prefix is dropped from targets. The level comes from
//! the caller or from the `PITCH_IOU_LOG` environment variable. With the
//! `tracing` feature, [`init_tracing`] installs a `tracing-subscriber`
//! instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable consulted by [`init_from_env`].
pub const LOG_ENV: &str = "PITCH_IOU_LOG";

struct PitchLogger {
    max: LevelFilter,
    t0: Instant,
}

fn short_target(target: &str) -> &str {
    target.strip_prefix("pitch_iou_").unwrap_or(target)
}

impl Log for PitchLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{:8.3}s {:>5} {}] {}\n",
            self.t0.elapsed().as_secs_f64(),
            record.level(),
            short_target(record.target()),
            record.args()
        );
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static INSTALLED: OnceLock<PitchLogger> = OnceLock::new();

/// Install the stderr logger at `level`.
///
/// Only the first call installs anything; later calls keep the original
/// level and return `Ok`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut fresh = false;
    let logger = INSTALLED.get_or_init(|| {
        fresh = true;
        PitchLogger {
            max: level,
            t0: Instant::now(),
        }
    });
    if fresh {
        log::set_logger(logger)?;
        log::set_max_level(logger.max);
    }
    Ok(())
}

/// Install the stderr logger at the level named by `PITCH_IOU_LOG`, or
/// `fallback` when it is unset or unreadable.
pub fn init_from_env(fallback: LevelFilter) -> Result<(), log::SetLoggerError> {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(fallback);
    init_with_level(level)
}

/// Filter for [`init_tracing`]: an explicit `directive` wins, otherwise
/// `PITCH_IOU_LOG`, then `RUST_LOG`, then `info`.
#[cfg(feature = "tracing")]
fn tracing_filter(directive: Option<&str>) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    if let Some(filter) = directive.and_then(|d| EnvFilter::try_new(d).ok()) {
        return filter;
    }
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a `tracing` subscriber.
///
/// `directive` (e.g. `"debug"` or `"pitch_iou_metrics=trace"`) overrides the
/// environment; see [`tracing_filter`]. Spans report their duration on close;
/// `json` switches to one JSON object per event.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, directive: Option<&str>) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::util::SubscriberInitExt;

    let builder = fmt()
        .with_env_filter(tracing_filter(directive))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
