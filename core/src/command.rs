//! Commands: named, grouped, prioritized units of work.

use std::io::Write;

use tracing::debug;

use crate::builtins::VersionInfo;
use crate::context::Context;
use crate::flag::FlagSet;
use crate::style;

/// Outcome of one command execution, driving dispatcher loop control and
/// cleanup selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Continue to the next queued command.
    No,
    /// Stop iterating and succeed.
    Success,
    /// Stop iterating and fail.
    Failure,
    /// Stop iterating and display full instructions.
    UsageError,
    /// Registration key meaning "run this cleanup on every outcome".
    /// Never returned by a command.
    Any,
}

impl ExitStatus {
    /// The integer code reported by `Dispatcher::execute`.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::No => 999,
            ExitStatus::Success => 0,
            ExitStatus::Failure => -1,
            ExitStatus::UsageError => -2,
            ExitStatus::Any => -666,
        }
    }
}

/// A caller-supplied command body. Receives the execution context and the
/// command's raw argument run (the command token already stripped).
pub type ActionFn = Box<dyn FnMut(&mut Context, &[String]) -> ExitStatus>;

/// What a command does when dispatched.
///
/// `Help` and `Version` are interpreted by the dispatcher because they
/// render from the live registry, which a boxed closure cannot borrow
/// while its own command is held; every caller command uses `Run`.
pub enum Action {
    Run(ActionFn),
    Help,
    Version(VersionInfo),
}

impl Action {
    /// Wraps a closure as a command action.
    pub fn run<F>(action: F) -> Self
    where
        F: FnMut(&mut Context, &[String]) -> ExitStatus + 'static,
    {
        Action::Run(Box::new(action))
    }
}

/// A named, grouped, prioritized unit pairing a [`FlagSet`] with an
/// action.
///
/// The `tag` is the token a user types to invoke the command; token
/// recognition is global, so tags are unique across the whole registry by
/// convention (the first registration wins). A command is eligible to run
/// once per dispatcher.
pub struct Command {
    group: String,
    tag: String,
    about: String,
    priority: i32,
    escapes: bool,
    has_run: bool,
    action: Option<Action>,
    flags: FlagSet,
}

impl Command {
    pub fn new(
        group: &str,
        tag: &str,
        about: &str,
        priority: i32,
        escapes: bool,
        action: Option<Action>,
        flags: FlagSet,
    ) -> Self {
        Self {
            group: group.to_string(),
            tag: tag.to_string(),
            about: about.to_string(),
            priority,
            escapes,
            has_run: false,
            action,
            flags,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn set_group(&mut self, group: &str) {
        self.group = group.to_string();
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// An escaping command claims every remaining raw token, so scanning
    /// stops at its entry.
    pub fn escapes(&self) -> bool {
        self.escapes
    }

    /// Whether this command may still run in this dispatcher.
    pub fn eligible(&self) -> bool {
        !self.has_run
    }

    /// Records an execution without going through [`Command::execute`];
    /// used by the dispatcher for the interpreted built-in actions.
    pub fn mark_run(&mut self) {
        self.has_run = true;
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    /// Runs the command's closure action. A command without an action is a
    /// caller misconfiguration and fails.
    pub fn execute(&mut self, ctx: &mut Context, args: &[String]) -> ExitStatus {
        debug!(command = %self.tag, "executing command");
        self.has_run = true;
        match self.action.as_mut() {
            Some(Action::Run(action)) => action(ctx, args),
            Some(_) => ExitStatus::No,
            None => ExitStatus::Failure,
        }
    }

    /// Writes this command's full usage block: header, description, and
    /// the flag listing, followed by a blank line.
    pub fn write_use(&self, w: &mut dyn Write) {
        style::white(w, &format!("-----\n{} [<flags>]:\n", self.tag));
        style::white(w, &format!("\t{}\n\n", self.about));
        self.flags.usage(w);
        let _ = w.write_all(b"\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::ErrorHandling;

    fn noop_flags(label: &str) -> FlagSet {
        FlagSet::new(label, ErrorHandling::Continue)
    }

    #[test]
    fn test_exit_status_codes() {
        assert_eq!(ExitStatus::No.code(), 999);
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), -1);
        assert_eq!(ExitStatus::UsageError.code(), -2);
        assert_eq!(ExitStatus::Any.code(), -666);
    }

    #[test]
    fn test_execute_marks_run() {
        let mut cmd = Command::new(
            "g",
            "work",
            "does work",
            1,
            false,
            Some(Action::run(|_, _| ExitStatus::Success)),
            noop_flags("work"),
        );
        assert!(cmd.eligible());
        let mut ctx = Context::new();
        assert_eq!(cmd.execute(&mut ctx, &[]), ExitStatus::Success);
        assert!(!cmd.eligible());
    }

    #[test]
    fn test_missing_action_fails() {
        let mut cmd = Command::new("g", "idle", "does nothing", 1, false, None, noop_flags("idle"));
        let mut ctx = Context::new();
        assert_eq!(cmd.execute(&mut ctx, &[]), ExitStatus::Failure);
    }

    #[test]
    fn test_action_sees_argument_run() {
        let mut cmd = Command::new(
            "g",
            "echo",
            "echoes",
            1,
            false,
            Some(Action::run(|ctx, args| {
                ctx.insert(args.len());
                ExitStatus::No
            })),
            noop_flags("echo"),
        );
        let mut ctx = Context::new();
        let args = vec!["-a".to_string(), "b".to_string()];
        cmd.execute(&mut ctx, &args);
        assert_eq!(ctx.get::<usize>(), Some(&2));
    }

    #[test]
    fn test_write_use_layout() {
        let mut flags = noop_flags("fmt");
        flags.bool_flag("verbose", false, "say more");
        let cmd = Command::new("g", "fmt", "formats things", 1, false, None, flags);
        let mut buf = Vec::new();
        cmd.write_use(&mut buf);
        let text = String::from_utf8_lossy(&buf).into_owned();
        assert!(text.starts_with("-----\n"));
        assert!(text.contains("fmt [<flags>]:"));
        assert!(text.contains("\tformats things"));
        assert!(text.contains("-verbose"));
        assert!(text.ends_with("\n\n"));
    }
}
