//! Colored stderr backend for the `log` facade.
use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One record as printed on stderr.
pub struct LogMessage {
    pub level: Level,
    pub timepoint: chrono::NaiveDateTime,
    pub message: String,
    pub module: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl LogMessage {
    pub fn from_record(record: &Record) -> Self {
        Self {
            level: record.level(),
            timepoint: chrono::Local::now().naive_local(),
            message: record.args().to_string(),
            module: record.module_path().unwrap_or("?").to_string(),
            file: record.file().map(str::to_string),
            line: record.line(),
        }
    }

    pub fn write_to(&self, out: &mut impl WriteColor) -> std::io::Result<()> {
        write!(out, "{} ", self.timepoint.format("%H:%M:%S%.3f"))?;
        out.set_color(&level_color(self.level))?;
        write!(out, "{:<5}", self.level)?;
        out.reset()?;
        write!(out, " [{}", self.module)?;
        if let (Some(file), Some(line)) = (&self.file, self.line) {
            if self.level >= Level::Debug {
                write!(out, " {}:{}", file, line)?;
            }
        }
        writeln!(out, "] {}", self.message)
    }
}

fn level_color(level: Level) -> ColorSpec {
    let color = match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Cyan,
    };
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    spec
}

pub struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let stderr = StandardStream::stderr(ColorChoice::Auto);
        let mut stderr = stderr.lock();
        let _ = LogMessage::from_record(record).write_to(&mut stderr);
    }

    fn flush(&self) {}
}

/// `0` shows warnings and errors, each `-v` one more level.
pub fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: u8) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level_filter(verbosity));
    Ok(())
}
