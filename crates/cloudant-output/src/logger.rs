//! Plugin log formatter.
//!
//! Every line the plugin emits is framed with the plugin name and level so
//! its output can be told apart from the host pipeline's own logging:
//!
//! ```text
//! cloudant_output | INFO | output plugin initialized with endpoint https://…
//! cloudant_output | WARN | skipping record that is not a mapping: "x"
//! ```
//!
//! Active spans, if any, appear between the level and the message with
//! their fields in curly braces.

use std::fmt;

use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::plugin::PLUGIN_NAME;

/// Event formatter producing `cloudant_output | LEVEL | …` lines.
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
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
        write!(&mut writer, "{PLUGIN_NAME} | {} | ", event.metadata().level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the plugin subscriber.
///
/// The level defaults to `info` and can be overridden through the
/// `LOG_LEVEL` environment variable; HTTP-stack internals stay off. If the
/// host process already installed a global subscriber this is a no-op;
/// the host owns logging then.
pub fn init() {
    let level = std::env::var("LOG_LEVEL")
        .map(|v| v.to_lowercase())
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(format!("h2=off,hyper=off,rustls=off,{level}"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .event_format(Formatter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
