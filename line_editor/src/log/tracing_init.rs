// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{DisplayPreference, TracingConfig};
use miette::{IntoDiagnostic, miette};
use std::path::Path;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, registry::LookupSpan,
                         util::SubscriberInitExt};

/// Avoid gnarly type annotations by using a macro to create the `fmt` layer.
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_thread_names(false)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
    };
}

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Builds the layers for `tracing_config` and installs them as the global default
/// subscriber. Returns `Ok(false)` when the config asks for no output.
///
/// # Errors
///
/// When the log file can't be created, or a global subscriber is already set.
pub fn try_initialize_logging_global(tracing_config: &TracingConfig) -> miette::Result<bool> {
    let Some(layers) = try_create_layers(tracing_config)? else {
        return Ok(false);
    };
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .into_diagnostic()?;
    Ok(true)
}

/// Returns the layers without installing them, or `None` when there is nothing to log
/// to.
///
/// # Errors
///
/// When the log file can't be created.
pub fn try_create_layers(
    tracing_config: &TracingConfig,
) -> miette::Result<Option<Vec<Box<DynLayer<tracing_subscriber::Registry>>>>> {
    let level_filter = tracing_config.get_level_filter();
    let mut acc: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = vec![];

    if let Some(preference) = tracing_config.display_preference() {
        acc.push(create_display_layer(level_filter, preference));
    }

    if let Some(path) = tracing_config.file_path() {
        acc.push(try_create_file_layer(level_filter, path)?);
    }

    Ok((!acc.is_empty()).then_some(acc))
}

fn create_display_layer<S>(
    level_filter: LevelFilter,
    preference: DisplayPreference,
) -> Box<DynLayer<S>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!();
    match preference {
        DisplayPreference::Stdout => Box::new(
            fmt_layer
                .with_writer(std::io::stdout)
                .with_filter(level_filter),
        ),
        DisplayPreference::Stderr => Box::new(
            fmt_layer
                .with_writer(std::io::stderr)
                .with_filter(level_filter),
        ),
    }
}

/// A plain (never rolling) file appender. Note that wrapping it in
/// `tracing_appender::non_blocking` loses lines when the process exits from a signal.
///
/// # Errors
///
/// When the path has no file name.
fn try_create_file_layer<S>(level_filter: LevelFilter, path: &Path) -> miette::Result<Box<DynLayer<S>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let file_name = path
        .file_name()
        .ok_or_else(|| miette!("Log file path {} has no file name", path.display()))?;
    let parent = match path.parent() {
        Some(it) if !it.as_os_str().is_empty() => it,
        _ => Path::new("."),
    };
    let appender = tracing_appender::rolling::never(parent, file_name);
    Ok(Box::new(
        create_fmt!()
            .with_ansi(false)
            .with_writer(appender)
            .with_filter(level_filter),
    ))
}
