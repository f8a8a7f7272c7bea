//! Console logger for the `log` facade.
//!
//! Lines go to stderr as `LEVEL [module] message`, colored by level. The
//! level comes from the `LOG` environment variable (`ERROR`, `WARN`,
//! `INFO`, `DEBUG` or `TRACE`) and defaults to `INFO`.

use std::env;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let color = match record.level() {
                Level::Error => 31,
                Level::Warn => 93,
                Level::Info => 34,
                Level::Debug => 32,
                Level::Trace => 90,
            };
            eprintln!(
                "\u{1B}[{}m{:>5} [{}] {}\u{1B}[0m",
                color,
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

fn level(name: Option<&str>) -> LevelFilter {
    match name {
        Some("ERROR") => LevelFilter::Error,
        Some("WARN") => LevelFilter::Warn,
        Some("INFO") => LevelFilter::Info,
        Some("DEBUG") => LevelFilter::Debug,
        Some("TRACE") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

pub fn init() -> Result<(), SetLoggerError> {
    let filter = level(env::var("LOG").ok().as_deref());
    log::set_logger(&LOGGER).map(|()| log::set_max_level(filter))
}
