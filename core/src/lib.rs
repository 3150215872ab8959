//! Typed command-line flags and a grouped, prioritized command
//! dispatcher.
//!
//! This crate provides the building blocks for multi-command CLI
//! programs:
//!
//! - [`FlagSet`] — registration and parsing for a related group of typed
//!   flags, with pluggable value storage ([`Value`], [`StoreValue`],
//!   [`PatternValue`]).
//! - [`Command`] — a named, grouped, prioritized unit pairing a flag set
//!   with an action.
//! - [`Dispatcher`] — scans an argument vector for registered command
//!   tokens, partitions the vector into per-command runs, executes them
//!   in group/command priority order, and runs status-keyed
//!   [`Cleaner`] hooks afterward.
//!
//! Flags accept the forms `-name`, `--name`, `-name=value`, and
//! `-name value`; booleans never consume a following token, and a bare
//! `--` ends flag parsing. The built-in `help` and `version` commands are
//! opt-in per dispatcher via [`Dispatcher::add_builtin`].
//!
//! # Example
//!
//! ```
//! use flagline_core::{Action, Command, Context, Dispatcher, ErrorHandling, ExitStatus, FlagSet};
//!
//! let mut flags = FlagSet::new("greet", ErrorHandling::Continue);
//! flags.text_flag("name", "world", "Who to greet.");
//!
//! let greet = Command::new(
//!     "",
//!     "greet",
//!     "Print a greeting.",
//!     1,
//!     false,
//!     Some(Action::run(|_ctx, _args| ExitStatus::Success)),
//!     flags,
//! );
//!
//! let mut dispatcher = Dispatcher::new("demo");
//! dispatcher.set_command(greet);
//!
//! let arguments: Vec<String> = ["demo", "greet", "-name", "crew"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let mut ctx = Context::new();
//! assert_eq!(dispatcher.execute(&mut ctx, &arguments), 0);
//! ```

mod builtins;
mod cleanup;
mod command;
mod context;
mod dispatch;
mod flag;
mod group;
mod instruct;
mod lexical;
mod queue;
mod registry;
mod sink;
mod style;
mod value;

pub use builtins::{
    HelpRequest, NOT_PROVIDED, VersionInfo, VersionSelection, help_command, version_command,
};
pub use cleanup::{Cleaner, Cleanup};
pub use command::{Action, ActionFn, Command, ExitStatus};
pub use context::Context;
pub use dispatch::Dispatcher;
pub use flag::{ErrorHandling, Flag, FlagError, FlagSet};
pub use group::{Group, Groups, SortPolicy};
pub use instruct::Instructer;
pub use lexical::{format_duration, parse_bool, parse_duration, parse_float, parse_int, parse_uint};
pub use queue::{QueueEntry, build_queue};
pub use registry::{CommandRef, Recognized, Registry};
pub use sink::{Sink, sink};
pub use style::{Attribute, color_enabled, paint, title, white};
pub use value::{
    BoolStore, BoolValue, DurationValue, FlagKind, FlagValue, FloatStore, FloatValue, Int64Store,
    Int64Value, IntStore, IntValue, PatternCheck, PatternValue, StoreValue, TextStore, TextValue,
    Uint64Store, Uint64Value, UintStore, UintValue, Value, ValueError, bool_store_value,
    float_store_value, int64_store_value, int_store_value, text_store_value, uint64_store_value,
    uint_store_value,
};
