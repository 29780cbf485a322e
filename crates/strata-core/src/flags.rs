//! Compile a [`FlagSchema`] into a `clap` parser.
//!
//! Each command's schema becomes a `clap::Command` built at dispatch time, so
//! flag validation and command-level help share one source of truth.

use clap::{Arg, ArgAction};
use strata_types::command::{FlagKind, FlagSchema, FlagSpec, ParsedArgs};

/// Build the parser for one command. `display_name` is the full invocation
/// prefix shown in help, e.g. `strata journal format`.
pub fn build_parser(display_name: &str, about: &str, schema: &FlagSchema) -> clap::Command {
    schema.iter().fold(
        clap::Command::new(display_name.to_string())
            .bin_name(display_name.to_string())
            .about(about.to_string())
            .no_binary_name(true)
            .disable_version_flag(true),
        |cmd, flag| cmd.arg(to_arg(flag)),
    )
}

fn to_arg(flag: &FlagSpec) -> Arg {
    let arg = Arg::new(flag.name.clone()).help(flag.help.clone());

    match &flag.kind {
        FlagKind::Switch => {
            let arg = arg.long(flag.name.clone()).action(ArgAction::SetTrue);
            with_short(arg, flag.short)
        }
        FlagKind::Value {
            value_name,
            required,
            default,
        } => {
            let mut arg = arg
                .long(flag.name.clone())
                .value_name(value_name.clone())
                .required(*required)
                .action(ArgAction::Set);
            if let Some(default) = default {
                arg = arg.default_value(default.clone());
            }
            with_short(arg, flag.short)
        }
        FlagKind::Positional { required, variadic } => {
            let arg = arg
                .value_name(flag.name.to_uppercase())
                .required(*required);
            if *variadic {
                arg.action(ArgAction::Append).num_args(1..)
            } else {
                arg.action(ArgAction::Set)
            }
        }
    }
}

fn with_short(arg: Arg, short: Option<char>) -> Arg {
    match short {
        Some(c) => arg.short(c),
        None => arg,
    }
}

/// Parse `tokens` (everything after the command name) against `schema`.
///
/// Help requests come back as a `clap::Error` of kind `DisplayHelp`.
pub fn parse(
    parser: clap::Command,
    schema: &FlagSchema,
    tokens: &[String],
) -> Result<ParsedArgs, clap::Error> {
    let matches = parser.try_get_matches_from(tokens)?;
    let mut parsed = ParsedArgs::new();

    for flag in schema.iter() {
        match flag.kind {
            FlagKind::Switch => parsed.set_switch(flag.name.clone(), matches.get_flag(&flag.name)),
            FlagKind::Value { .. } | FlagKind::Positional { .. } => {
                if let Some(values) = matches.get_many::<String>(&flag.name) {
                    for value in values {
                        parsed.push_value(flag.name.clone(), value.clone());
                    }
                }
            }
        }
    }

    Ok(parsed)
}

/// First line of a clap error without the `error: ` prefix.
///
/// A line ending in `:` introduces a list; its first item is appended.
pub fn error_reason(err: &clap::Error) -> String {
    let text = err.to_string();
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next().unwrap_or_default();
    let first = first.strip_prefix("error: ").unwrap_or(first);
    match (first.ends_with(':'), lines.next()) {
        (true, Some(item)) => format!("{first} {item}"),
        _ => first.to_string(),
    }
}
