//! The built-in `help` and `version` commands.
//!
//! Both are ordinary clients of the command/flag-set contract: a tag, a
//! dedicated group at priority 1000, an escaping marker, and a flag set.
//! Only their actions differ, because they render from the live registry
//! and the dispatcher interprets them in place.

use crate::command::{Action, Command};
use crate::flag::{ErrorHandling, FlagSet};

/// Placeholder for version fields the embedding program never supplied.
pub const NOT_PROVIDED: &str = "not provided";

/// Version metadata carried by the `version` built-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub package: String,
    pub tag: String,
    pub hash: String,
    pub date: String,
}

impl VersionInfo {
    /// Builds from up to four positional setup arguments (package, tag,
    /// hash, date), padding the rest with [`NOT_PROVIDED`].
    pub fn from_args(args: &[&str]) -> Self {
        let field = |index: usize| {
            args.get(index)
                .map(|value| value.to_string())
                .unwrap_or_else(|| NOT_PROVIDED.to_string())
        };
        Self {
            package: field(0),
            tag: field(1),
            hash: field(2),
            date: field(3),
        }
    }

    fn full_line(&self) -> String {
        format!("{} {} {} {}", self.package, self.tag, self.hash, self.date)
    }

    /// Renders the parts chosen by `selection`, newline terminated.
    pub fn render(&self, selection: &VersionSelection) -> String {
        let mut out = String::new();
        if selection.package {
            out.push_str(&self.package);
            out.push(' ');
        }
        if selection.tag {
            out.push_str(&self.tag);
            out.push(' ');
        }
        if selection.hash {
            out.push_str(&self.hash);
            out.push(' ');
        }
        if selection.date {
            out.push_str(&self.date);
            out.push(' ');
        }
        if selection.full() {
            out.push_str(&self.full_line());
        }
        out.push('\n');
        out
    }
}

/// Which version parts a parsed `version` invocation asked for. Any
/// specific part suppresses the full line.
#[derive(Debug, Clone, Copy)]
pub struct VersionSelection {
    pub package: bool,
    pub tag: bool,
    pub hash: bool,
    pub date: bool,
    pub full_flag: bool,
}

impl VersionSelection {
    pub fn from_flags(flags: &FlagSet) -> Self {
        Self {
            package: flags.get_bool("package").unwrap_or(false),
            tag: flags.get_bool("tag").unwrap_or(false),
            hash: flags.get_bool("hash").unwrap_or(false),
            date: flags.get_bool("date").unwrap_or(false),
            full_flag: flags.get_bool("full").unwrap_or(true),
        }
    }

    fn full(&self) -> bool {
        if self.package || self.tag || self.hash || self.date {
            false
        } else {
            self.full_flag
        }
    }
}

/// What a parsed `help` invocation asked to display.
#[derive(Debug, Clone, Default)]
pub struct HelpRequest {
    pub selection: Vec<String>,
    pub full: bool,
}

impl HelpRequest {
    /// Reads the parsed flag set: an explicit `-commands` list wins,
    /// otherwise the positional remainder names tags or groups, otherwise
    /// full instructions.
    pub fn from_flags(flags: &FlagSet) -> Self {
        let full = flags.get_bool("full").unwrap_or(true);
        let commands = flags.get_text("commands").unwrap_or_default();
        let selection: Vec<String> = if commands.is_empty() {
            flags.args().to_vec()
        } else {
            commands
                .split(',')
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect()
        };
        let full = selection.is_empty() && full;
        Self { selection, full }
    }
}

fn help_flags() -> FlagSet {
    let mut flags = FlagSet::new("help", ErrorHandling::Continue);
    flags.bool_flag("full", true, "Print all help information.");
    flags.text_flag(
        "commands",
        "",
        "Print help information for a subset of comma delimited commands or command groups",
    );
    flags
}

/// The `help` built-in. Escapes, so every following token is a help
/// topic, never a command to run.
pub fn help_command() -> Command {
    Command::new(
        "",
        "help",
        "Print help information on demand.",
        1,
        true,
        Some(Action::Help),
        help_flags(),
    )
}

fn version_flags() -> FlagSet {
    let mut flags = FlagSet::new("version", ErrorHandling::Continue);
    flags.bool_flag("full", true, "Print full version information.");
    flags.bool_flag("package", false, "Print available package information.");
    flags.bool_flag("tag", false, "Print available tag information.");
    flags.bool_flag("hash", false, "Print available hash information.");
    flags.bool_flag("date", false, "Print available date information.");
    flags
}

/// The `version` built-in.
pub fn version_command(info: VersionInfo) -> Command {
    Command::new(
        "",
        "version",
        "Prints the package version and exits.",
        1,
        true,
        Some(Action::Version(info)),
        version_flags(),
    )
}
