//! Shared plumbing for the command line tools: terminal styles and logging.

pub use clap;

/// Verbosity flags (`-v`, `-q`) shared by all binaries.
pub mod verbose {
    pub use clap_verbosity_flag::{Level, Verbosity};
}

use clap::builder::styling::{AnsiColor, Styles};

pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Yellow.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::Red.on_default().bold())
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr, or as JSON lines to `log_file` if one is given. Calling
/// this more than once is harmless: later calls are ignored.
pub fn logging_setup(level: &tracing::Level, log_file: Option<&std::fs::File>) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(*level)
        .with_target(false)
        .without_time();

    match log_file.map(|f| f.try_clone()) {
        Some(Ok(file)) => {
            let _ = builder
                .json()
                .with_writer(std::sync::Mutex::new(file))
                .try_init();
        }
        Some(Err(err)) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
            tracing::warn!("could not open log file, logging to stderr: {err}");
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}
