//! Services: named, described groups of related commands.

use strata_types::command::{FlagKind, FlagSchema};
use strata_types::error::{DispatchError, RegistryError};

use crate::command::{BoxCommand, Command};

/// Names that the dispatcher interprets itself and services may not take.
pub const RESERVED_NAMES: &[&str] = &["help"];

/// Flag names and shorts the command parser claims for `--help` / `-h`.
const RESERVED_FLAG: &str = "help";
const RESERVED_SHORT: char = 'h';

/// A named group of commands, e.g. `journal`.
///
/// Declared once at startup and immutable after registration. Commands keep
/// their declaration order for usage listings.
#[derive(Debug)]
pub struct Service {
    name: String,
    description: String,
    commands: Vec<BoxCommand>,
}

impl Service {
    /// Start a service declaration with no commands.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            commands: Vec::new(),
        }
    }

    /// Builder-style append of a command.
    pub fn command<C: Command + 'static>(mut self, command: C) -> Self {
        self.commands.push(BoxCommand::new(command));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Commands in declaration order.
    pub fn commands(&self) -> &[BoxCommand] {
        &self.commands
    }

    /// Exact, case-sensitive lookup of a command by name.
    pub fn find_command(&self, name: &str) -> Result<&BoxCommand, DispatchError> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| DispatchError::UnknownCommand {
                service: self.name.clone(),
                command: name.to_string(),
            })
    }

    /// Check the declaration invariants enforced at registration.
    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        check_name(&self.name)?;
        if RESERVED_NAMES.contains(&self.name.as_str()) {
            return Err(RegistryError::ReservedName(self.name.clone()));
        }
        if self.description.trim().is_empty() {
            return Err(RegistryError::MissingDescription(self.name.clone()));
        }
        if self.commands.is_empty() {
            return Err(RegistryError::EmptyService(self.name.clone()));
        }

        for (i, command) in self.commands.iter().enumerate() {
            check_name(command.name())?;
            if command.description().trim().is_empty() {
                return Err(RegistryError::MissingDescription(format!(
                    "{} {}",
                    self.name,
                    command.name()
                )));
            }
            if self.commands[..i].iter().any(|c| c.name() == command.name()) {
                return Err(RegistryError::DuplicateCommand {
                    service: self.name.clone(),
                    command: command.name().to_string(),
                });
            }
            check_schema(&command.flag_schema()).map_err(|(flag, reason)| {
                RegistryError::InvalidFlag {
                    service: self.name.clone(),
                    command: command.name().to_string(),
                    flag,
                    reason: reason.to_string(),
                }
            })?;
        }

        Ok(())
    }
}

/// Reject schemas the command parser cannot be built from.
///
/// Returns the offending flag name and the reason.
fn check_schema(schema: &FlagSchema) -> Result<(), (String, &'static str)> {
    let flags: Vec<_> = schema.iter().collect();
    let mut seen_optional_positional = false;
    let mut seen_variadic = false;

    for (i, flag) in flags.iter().enumerate() {
        let fail = |reason| Err((flag.name.clone(), reason));

        if !is_valid_name(&flag.name) {
            return fail("use lowercase letters, digits and '-', starting with a letter");
        }
        if flag.name == RESERVED_FLAG {
            return fail("'help' is reserved");
        }
        if flags[..i].iter().any(|f| f.name == flag.name) {
            return fail("declared more than once");
        }
        if let Some(short) = flag.short {
            if short == RESERVED_SHORT {
                return fail("short '-h' is reserved");
            }
            if !short.is_ascii_alphanumeric() {
                return fail("short must be an ASCII letter or digit");
            }
            if flags[..i].iter().any(|f| f.short == Some(short)) {
                return fail("short already used by another flag");
            }
        }

        if let FlagKind::Positional { required, variadic } = flag.kind {
            if flag.short.is_some() {
                return fail("positionals cannot have a short");
            }
            if seen_variadic {
                return fail("positional follows a variadic positional");
            }
            if required && seen_optional_positional {
                return fail("required positional follows an optional one");
            }
            seen_optional_positional |= !required;
            seen_variadic |= variadic;
        }
    }

    Ok(())
}

/// Names are `[a-z][a-z0-9-]*`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_name(name: &str) -> Result<(), RegistryError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}
