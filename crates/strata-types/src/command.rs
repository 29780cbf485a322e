//! Command schema and invocation types.
//!
//! A command describes the arguments it accepts with a [`FlagSchema`]. The
//! dispatcher validates the command line against that schema and hands the
//! command a [`ParsedArgs`]; the command answers with a [`CommandOutput`] or a
//! [`CommandError`](crate::error::CommandError).

use std::collections::BTreeMap;

/// How a single schema entry consumes command-line tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagKind {
    /// Boolean `--name` switch; present means `true`.
    Switch,
    /// `--name <VALUE>` option.
    Value {
        value_name: String,
        required: bool,
        default: Option<String>,
    },
    /// Positional argument, matched in declaration order.
    Positional { required: bool, variadic: bool },
}

/// One recognised flag, option, or positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: String,
    pub short: Option<char>,
    pub help: String,
    pub kind: FlagKind,
}

impl FlagSpec {
    /// A boolean switch, e.g. `--force`.
    pub fn switch(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            help: help.into(),
            kind: FlagKind::Switch,
        }
    }

    /// An optional `--name <VALUE>` option.
    pub fn value(
        name: impl Into<String>,
        value_name: impl Into<String>,
        help: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short: None,
            help: help.into(),
            kind: FlagKind::Value {
                value_name: value_name.into(),
                required: false,
                default: None,
            },
        }
    }

    /// A required positional argument.
    pub fn positional(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            help: help.into(),
            kind: FlagKind::Positional {
                required: true,
                variadic: false,
            },
        }
    }

    /// Attach a single-character alias (`-f`).
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Mark an option or positional as required.
    pub fn required(mut self) -> Self {
        match &mut self.kind {
            FlagKind::Value { required, .. } | FlagKind::Positional { required, .. } => {
                *required = true;
            }
            FlagKind::Switch => {}
        }
        self
    }

    /// Mark an option or positional as optional.
    pub fn optional(mut self) -> Self {
        match &mut self.kind {
            FlagKind::Value { required, .. } | FlagKind::Positional { required, .. } => {
                *required = false;
            }
            FlagKind::Switch => {}
        }
        self
    }

    /// Default value for an option. Ignored for switches and positionals.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        if let FlagKind::Value { default, .. } = &mut self.kind {
            *default = Some(value.into());
        }
        self
    }

    /// Let a positional absorb all remaining tokens.
    pub fn variadic(mut self) -> Self {
        if let FlagKind::Positional { variadic, .. } = &mut self.kind {
            *variadic = true;
        }
        self
    }

    pub fn is_positional(&self) -> bool {
        matches!(self.kind, FlagKind::Positional { .. })
    }
}

/// Ordered set of flags a command recognises.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSchema {
    flags: Vec<FlagSpec>,
}

impl FlagSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagSpec> {
        self.flags.iter()
    }

    pub fn get(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<FlagSpec> for FlagSchema {
    fn from_iter<I: IntoIterator<Item = FlagSpec>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

/// Arguments validated against a command's [`FlagSchema`].
///
/// Switches are keyed by flag name; options and positionals share a value map
/// (positionals may hold several values when variadic).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    switches: BTreeMap<String, bool>,
    values: BTreeMap<String, Vec<String>>,
}

impl ParsedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_switch(&mut self, name: impl Into<String>, on: bool) {
        self.switches.insert(name.into(), on);
    }

    pub fn push_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// Whether a switch was given. Unknown names read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.switches.get(name).copied().unwrap_or(false)
    }

    /// First value of an option or positional, if any.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values of a variadic positional (or a repeated option).
    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Successful result of a command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Informational output printed on stdout by the dispatcher.
    pub message: Option<String>,
}

impl CommandOutput {
    /// Success with nothing to print.
    pub fn silent() -> Self {
        Self { message: None }
    }

    /// Success with a message for stdout.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}
