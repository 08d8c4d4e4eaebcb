use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use ariadne::{ColorGenerator, Config, IndexType, Label, Report, ReportKind, Source};
use bvgen::{LiteralPolicy, Target, TranslateConfig, translate};
use clap::{ArgAction, Parser as ClapParser, ValueEnum};
use log::{debug, info};
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

mod logger;

/// Translate bit-vector synthesis problems into solver inputs
#[derive(ClapParser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    /// Problem descriptions to translate
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output form
    #[arg(short, long, value_enum, default_value_t = Format::Sygus)]
    format: Format,

    /// Bits per usage counter (overrides the configuration file)
    #[arg(long)]
    tag_bits: Option<u32>,

    /// Reject literals that do not fit their width instead of truncating them
    #[arg(long, default_value_t = false)]
    strict_literals: bool,

    /// TOML file holding the translation settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write `<stem>.<ext>` files into this directory instead of stdout
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Notation,
    Sygus,
    Feasibility,
}

impl From<Format> for Target {
    fn from(format: Format) -> Self {
        match format {
            Format::Notation => Target::Notation,
            Format::Sygus => Target::Sygus,
            Format::Feasibility => Target::Feasibility,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Cannot read `{path}`: {source}")]
    Read { path: String, source: io::Error },

    #[error("Cannot write `{path}`: {source}")]
    Write { path: String, source: io::Error },

    #[error("Invalid configuration file `{path}`: {source}")]
    Config {
        path: String,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Translate(#[from] bvgen::Error),
}

impl CliError {
    fn lex_error(&self) -> Option<&bvlang::LexError> {
        match self {
            CliError::Translate(bvgen::Error::Language(bvlang::Error::Lex(error))) => Some(error),
            _ => None,
        }
    }
}

fn load_config(args: &Arguments) -> Result<TranslateConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let display = path.display().to_string();
            let text = fs::read_to_string(path).map_err(|source| CliError::Read {
                path: display.clone(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| CliError::Config {
                path: display,
                source,
            })?
        }
        None => TranslateConfig::default(),
    };

    if let Some(tag_bits) = args.tag_bits {
        config = config.with_tag_bits(tag_bits);
    }
    if args.strict_literals {
        config = config.with_literal_policy(LiteralPolicy::Strict);
    }
    config.validate()?;
    debug!("Using {:?}", config);
    Ok(config)
}

fn output_path(dir: &Path, input: &Path, target: Target) -> PathBuf {
    let stem = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_string_lossy();
    dir.join(format!("{}.{}", stem, target.extension()))
}

fn convert(
    input: &Path,
    src: &str,
    args: &Arguments,
    config: &TranslateConfig,
) -> Result<(), CliError> {
    let target = Target::from(args.format);
    let program = bvlang::parser::parse_program(src).map_err(bvgen::Error::from)?;
    let text = translate(&program, target, config)?;

    match &args.out_dir {
        Some(dir) => {
            let path = output_path(dir, input, target);
            fs::write(&path, text).map_err(|source| CliError::Write {
                path: path.display().to_string(),
                source,
            })?;
            info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            stdout
                .write_all(text.as_bytes())
                .map_err(|source| CliError::Write {
                    path: "<stdout>".to_string(),
                    source,
                })?;
        }
    }
    Ok(())
}

fn report(name: &str, src: &str, error: &CliError) -> io::Result<()> {
    if let Some(lex) = error.lex_error() {
        let mut colors = ColorGenerator::new();
        let span = (name.to_string(), lex.span.clone());
        return Report::build(ReportKind::Error, span.clone())
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_message(lex.to_string())
            .with_label(
                Label::new(span)
                    .with_message(lex.message.as_str())
                    .with_color(colors.next()),
            )
            .finish()
            .eprint((name.to_string(), Source::from(src)));
    }

    let mut error_color = ColorSpec::new();
    error_color.set_fg(Some(termcolor::Color::Red));
    error_color.set_intense(true);

    let stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut stderr = stderr.lock();
    stderr.set_color(&error_color)?;
    write!(stderr, "error")?;
    stderr.reset()?;
    writeln!(stderr, ": {}: {}", name, error)
}

/// Plain text of `error`, used when the styled report cannot be written.
fn plain_report(name: &str, error: &CliError) -> String {
    match error.lex_error() {
        Some(lex) => format!("error: {}:{}: {}", name, lex.span.start, lex),
        None => format!("error: {}: {}", name, error),
    }
}

fn report_or_print(name: &str, src: &str, error: &CliError) {
    if let Err(failure) = report(name, src, error) {
        debug!("Styled report failed: {}", failure);
        eprintln!("{}", plain_report(name, error));
    }
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    if let Err(error) = logger::init(args.verbose) {
        eprintln!("Cannot install logger: {}", error);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(error) => {
            report_or_print("configuration", "", &error);
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0usize;
    for input in &args.inputs {
        let name = input.display().to_string();
        let outcome = match fs::read_to_string(input) {
            Ok(src) => convert(input, &src, &args, &config).map_err(|error| (error, src)),
            Err(source) => Err((
                CliError::Read {
                    path: name.clone(),
                    source,
                },
                String::new(),
            )),
        };

        match outcome {
            Ok(()) => info!("Translated {}", name),
            Err((error, src)) => {
                debug!("{} failed: {:?}", name, error);
                report_or_print(&name, &src, &error);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
