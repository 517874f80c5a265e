// Copyright (c) The junit-triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging to stderr.
//!
//! Every message goes through `tracing`, printed as `level: message` with the level colorized
//! when stderr supports it.

use clap::{Args, ValueEnum};
use owo_colors::{OwoColorize, Style, style};
use std::{fmt, sync::OnceLock};
use tracing::{Event, Level, Subscriber, level_filters::LevelFilter};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Log lines emitted to this target are printed without a level heading.
pub(crate) const NO_HEADING_TARGET: &str = "junit_triage::no_heading";

/// Overrides the log filter, in `tracing_subscriber::filter::Targets` syntax.
pub(crate) const LOG_ENV: &str = "JUNIT_TRIAGE_LOG";

#[derive(Copy, Clone, Debug, Args)]
#[command(next_help_heading = "Output options")]
pub(crate) struct OutputOpts {
    /// Also print debug messages
    #[arg(long, short, env = "JUNIT_TRIAGE_VERBOSE")]
    verbose: bool,

    /// When to color output
    #[arg(long, value_enum, default_value_t, value_name = "WHEN")]
    color: Color,
}

impl OutputOpts {
    pub(crate) fn init(self) -> OutputContext {
        let styles = Styles::new(self.color);
        install_logger(self.filter(), styles);
        OutputContext { styles }
    }

    fn filter(self) -> Targets {
        let level = if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        match std::env::var(LOG_ENV) {
            Ok(spec) if !spec.is_empty() => spec.parse().unwrap_or_else(|_| {
                eprintln!("ignoring invalid {LOG_ENV} filter `{spec}`");
                Targets::new().with_default(level)
            }),
            _ => Targets::new().with_default(level),
        }
    }
}

/// How output should be written.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    styles: Styles,
}

impl OutputContext {
    /// Returns styles for messages written to stderr.
    pub fn stderr_styles(&self) -> Styles {
        self.styles
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

/// Styles for text written to stderr.
///
/// All styles are plain unless stderr is colorized.
#[derive(Copy, Clone, Debug, Default)]
pub struct Styles {
    pub(crate) bold: Style,
    error: Style,
    warning: Style,
    debug: Style,
}

impl Styles {
    fn new(color: Color) -> Self {
        let colorize = match color {
            Color::Auto => supports_color::on_cached(supports_color::Stream::Stderr).is_some(),
            Color::Always => true,
            Color::Never => false,
        };
        if !colorize {
            return Self::default();
        }
        Self {
            bold: style().bold(),
            error: style().red().bold(),
            warning: style().yellow().bold(),
            debug: style().dimmed(),
        }
    }

    fn for_level(&self, level: Level) -> (&'static str, Style) {
        match level {
            Level::ERROR => ("error", self.error),
            Level::WARN => ("warning", self.warning),
            Level::INFO => ("info", self.bold),
            Level::DEBUG => ("debug", self.debug),
            Level::TRACE => ("trace", self.debug),
        }
    }
}

static LOGGER: OnceLock<()> = OnceLock::new();

fn install_logger(filter: Targets, styles: Styles) {
    LOGGER.get_or_init(|| {
        let layer = tracing_subscriber::fmt::layer()
            .event_format(LevelPrefix { styles })
            .with_writer(std::io::stderr)
            .with_filter(filter);
        tracing_subscriber::registry().with(layer).init();
    });
}

struct LevelPrefix {
    styles: Styles,
}

impl<S, N> FormatEvent<S, N> for LevelPrefix
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        if metadata.target() != NO_HEADING_TARGET {
            let (heading, style) = self.styles.for_level(*metadata.level());
            write!(writer, "{}: ", heading.style(style))?;
        }
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
