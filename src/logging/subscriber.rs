//! Tracing subscriber: a console formatter plus a per-command log file.
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::utils::{EventKind, HEADER_TIME, LINE_TIME, log_file, strip_ansi, utc_now};

/// The formatted `message` field of an event.
fn message_of(event: &Event<'_>) -> String {
    struct Message(String);

    impl Visit for Message {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "message" {
                value.clone_into(&mut self.0);
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let mut message = Message(String::new());
    event.record(&mut message);
    message.0
}

/// Appends every event to `<cache>/dotts/<command>.log` as
/// `HH:MM:SS <tag> <message>`, with escape sequences removed.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Truncate the command's log file and write a one-line run header.
    ///
    /// `None` if the file cannot be created.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file(command)?;
        let version =
            option_env!("DOTTS_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .ok()?;
        writeln!(
            file,
            "# dotts {version} {command} started {}",
            utc_now(HEADER_TIME)
        )
        .ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let kind = EventKind::classify(*metadata.level(), metadata.target());
        let line = format!(
            "{} {:<7} {}",
            utc_now(LINE_TIME),
            kind.file_tag(),
            strip_ansi(&message_of(event))
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Console rendering: `==>` stage headers, `[DRY RUN]` notices, coloured
/// error and warning prefixes, dimmed debug lines.
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let msg = message_of(event);
        match EventKind::classify(*metadata.level(), metadata.target()) {
            EventKind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            EventKind::DryRun => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            EventKind::Error => writeln!(writer, "\x1b[31merror:\x1b[0m {msg}"),
            EventKind::Warn => writeln!(writer, "\x1b[33mwarning:\x1b[0m {msg}"),
            EventKind::Info => writeln!(writer, "  {msg}"),
            EventKind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the global subscriber. Call once, before any logging.
///
/// Console: `DOTTS_LOG` (an `EnvFilter` directive) when set, else `info`
/// and up, or `debug` with `--verbose`; warnings and errors go to stderr.
/// File: `debug` and up, always.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_filter = EnvFilter::try_from_env("DOTTS_LOG").unwrap_or_else(|_| {
        let level = if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        EnvFilter::default().add_directive(level.into())
    });

    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .event_format(ConsoleFormat)
                .with_writer(writer)
                .with_filter(console_filter),
        )
        .with(FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG)))
        .init();
}
