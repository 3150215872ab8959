//! The dispatcher: queue execution, outcome interpretation, cleanup.

use tracing::{debug, warn};

use crate::builtins::{HelpRequest, VersionInfo, VersionSelection, help_command, version_command};
use crate::cleanup::{Cleaner, Cleanup};
use crate::command::{Action, Command, ExitStatus};
use crate::context::Context;
use crate::group::Group;
use crate::instruct::Instructer;
use crate::queue::{QueueEntry, build_queue};
use crate::registry::{CommandRef, Registry};
use crate::sink::Sink;

/// Loop control produced by one queue entry.
enum Step {
    Continue,
    Stop(ExitStatus),
    Usage,
}

/// What an entry's action turned out to be once its flags were parsed.
enum Interpreted {
    Caller,
    Help(HelpRequest),
    Version(String),
}

/// A multi-command argument dispatcher.
///
/// Owns the command [`Registry`], the [`Instructer`], and the [`Cleaner`]
/// as explicit components; construct one in the entry point and pass it
/// wherever registration happens. State accumulated during a dispatch
/// pass (flag `actual` sets, has-run markers) persists across repeated
/// [`execute`](Dispatcher::execute) calls, so callers wanting isolation
/// build a fresh dispatcher per invocation.
pub struct Dispatcher {
    name: String,
    registry: Registry,
    instructer: Instructer,
    cleaner: Cleaner,
}

impl Dispatcher {
    /// Builds a dispatcher named `name` with the implicit default group
    /// already registered at priority 0.
    pub fn new(name: &str) -> Self {
        let mut dispatcher = Self {
            name: name.to_string(),
            registry: Registry::new(),
            instructer: Instructer::new(name),
            cleaner: Cleaner::new(),
        };
        dispatcher.registry.set_group("", 0, Vec::new());
        dispatcher
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Redirects instruction output; the default sink is stdout.
    pub fn set_out(&mut self, output: Sink) {
        self.instructer.set_out(output);
    }

    /// Registers a group and its commands. Chainable.
    pub fn set_group(&mut self, name: &str, priority: i32, commands: Vec<Command>) -> &mut Self {
        self.registry.set_group(name, priority, commands);
        self
    }

    /// Registers one command into its stamped group. Chainable.
    pub fn set_command(&mut self, command: Command) -> &mut Self {
        self.registry.set_command(command);
        self
    }

    pub fn get_group(&self, name: &str) -> Option<&Group> {
        self.registry.get_group(name)
    }

    pub fn get_commands(&self, keys: &[&str]) -> Vec<CommandRef> {
        self.registry.get_commands(keys)
    }

    /// Registers a cleanup hook for `status`.
    pub fn set_cleanup(&mut self, status: ExitStatus, hook: Cleanup) -> &mut Self {
        self.cleaner.set_cleanup(status, hook);
        self
    }

    /// Opts into a built-in command by name: `"help"`, or `"version"`
    /// with up to four setup arguments (package, tag, hash, date). Other
    /// names are ignored.
    pub fn add_builtin(&mut self, name: &str, args: &[&str]) -> &mut Self {
        match name {
            "help" => {
                self.registry.set_group("help", 1000, vec![help_command()]);
            }
            "version" => {
                self.registry.set_group(
                    "version",
                    1000,
                    vec![version_command(VersionInfo::from_args(args))],
                );
            }
            _ => {}
        }
        self
    }

    /// Writes the full instruction display.
    pub fn instruction(&self) {
        self.instructer.instruction(&self.registry);
    }

    /// Writes the instruction display for a subset of commands.
    pub fn subset_instruction(&self, targets: &[CommandRef]) {
        self.instructer.subset_instruction(&self.registry, targets);
    }

    /// Scans `arguments` for registered commands, runs each match in
    /// queue order, and returns the final status code: `0` success, `-1`
    /// failure, `-2` usage error (with full instructions written).
    ///
    /// An argument vector holding only the program name shows the full
    /// instructions without matching anything. Cleanup hooks for the
    /// terminal status, and for [`ExitStatus::Any`], run exactly once per
    /// call.
    pub fn execute(&mut self, ctx: &mut Context, arguments: &[String]) -> i32 {
        if arguments.len() <= 1 {
            self.instruction();
            return self.cleaner.run_cleanup(ExitStatus::UsageError, ctx);
        }
        let queue = build_queue(&self.registry, arguments);
        debug!(dispatcher = %self.name, queued = queue.len(), "dispatching");
        for entry in &queue {
            match self.dispatch_entry(ctx, entry, arguments) {
                Step::Continue => {}
                Step::Stop(status) => return self.cleaner.run_cleanup(status, ctx),
                Step::Usage => {
                    self.instruction();
                    return self.cleaner.run_cleanup(ExitStatus::UsageError, ctx);
                }
            }
        }
        self.instruction();
        self.cleaner.run_cleanup(ExitStatus::UsageError, ctx)
    }

    /// Parses and runs one queue entry, translating its outcome into loop
    /// control.
    fn dispatch_entry(
        &mut self,
        ctx: &mut Context,
        entry: &QueueEntry,
        arguments: &[String],
    ) -> Step {
        // the run still leads with the command token; drop it
        let run = &entry.run(arguments)[1..];
        let cmd = self.registry.command_mut(entry.target);
        if !cmd.eligible() {
            debug!(command = %cmd.tag(), "command already ran, skipping");
            return Step::Continue;
        }
        if let Err(err) = cmd.flags_mut().parse(run) {
            warn!(command = %cmd.tag(), error = %err, "command flag parse failed");
            return Step::Usage;
        }
        let interpreted = match cmd.action() {
            Some(Action::Help) => Interpreted::Help(HelpRequest::from_flags(cmd.flags())),
            Some(Action::Version(info)) => {
                Interpreted::Version(info.render(&VersionSelection::from_flags(cmd.flags())))
            }
            _ => Interpreted::Caller,
        };
        match interpreted {
            Interpreted::Caller => match cmd.execute(ctx, run) {
                status @ (ExitStatus::Success | ExitStatus::Failure) => Step::Stop(status),
                ExitStatus::UsageError => Step::Usage,
                _ => Step::Continue,
            },
            Interpreted::Help(request) => {
                cmd.mark_run();
                self.render_help(&request);
                Step::Stop(ExitStatus::Success)
            }
            Interpreted::Version(rendered) => {
                cmd.mark_run();
                self.instructer.write_text(&rendered);
                Step::Stop(ExitStatus::Success)
            }
        }
    }

    fn render_help(&self, request: &HelpRequest) {
        if request.full {
            self.instruction();
            return;
        }
        let keys: Vec<&str> = request.selection.iter().map(String::as_str).collect();
        let targets = self.registry.get_commands(&keys);
        self.instructer.subset_instruction(&self.registry, &targets);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::flag::{ErrorHandling, FlagSet};

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn fixed(tag: &str, priority: i32, status: ExitStatus) -> Command {
        Command::new(
            "",
            tag,
            "test command",
            priority,
            false,
            Some(Action::run(move |_, _| status)),
            FlagSet::new(tag, ErrorHandling::Continue),
        )
    }

    fn quiet(dispatcher: &mut Dispatcher) {
        dispatcher.set_out(Rc::new(RefCell::new(Vec::<u8>::new())));
    }

    #[test]
    fn test_bare_invocation_shows_instructions() {
        let mut dispatcher = Dispatcher::new("tool");
        let buffer = Rc::new(RefCell::new(Vec::new()));
        dispatcher.set_out(buffer.clone());
        let mut ctx = Context::new();
        assert_eq!(dispatcher.execute(&mut ctx, &argv(&["tool"])), -2);
        let text = String::from_utf8_lossy(&buffer.borrow()).into_owned();
        assert!(text.contains("tool [OPTIONS...] {COMMAND} ..."));
    }

    #[test]
    fn test_no_match_falls_through_to_usage() {
        let mut dispatcher = Dispatcher::new("tool");
        quiet(&mut dispatcher);
        let mut ctx = Context::new();
        assert_eq!(
            dispatcher.execute(&mut ctx, &argv(&["tool", "unknown"])),
            -2
        );
    }

    #[test]
    fn test_success_stops_the_loop() {
        let counted = Rc::new(RefCell::new(0));
        let later = Rc::clone(&counted);
        let mut dispatcher = Dispatcher::new("tool");
        quiet(&mut dispatcher);
        dispatcher.set_group(
            "work",
            1,
            vec![
                fixed("win", 1, ExitStatus::Success),
                Command::new(
                    "",
                    "after",
                    "never reached",
                    2,
                    false,
                    Some(Action::run(move |_, _| {
                        *later.borrow_mut() += 1;
                        ExitStatus::Success
                    })),
                    FlagSet::new("after", ErrorHandling::Continue),
                ),
            ],
        );
        let mut ctx = Context::new();
        assert_eq!(
            dispatcher.execute(&mut ctx, &argv(&["tool", "win", "after"])),
            0
        );
        assert_eq!(*counted.borrow(), 0);
    }

    #[test]
    fn test_failure_code() {
        let mut dispatcher = Dispatcher::new("tool");
        quiet(&mut dispatcher);
        dispatcher.set_group("work", 1, vec![fixed("lose", 1, ExitStatus::Failure)]);
        let mut ctx = Context::new();
        assert_eq!(dispatcher.execute(&mut ctx, &argv(&["tool", "lose"])), -1);
    }

    #[test]
    fn test_command_runs_once_per_dispatcher() {
        let counted = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&counted);
        let mut dispatcher = Dispatcher::new("tool");
        quiet(&mut dispatcher);
        dispatcher.set_group(
            "work",
            1,
            vec![Command::new(
                "",
                "tick",
                "counts invocations",
                1,
                false,
                Some(Action::run(move |_, _| {
                    *counter.borrow_mut() += 1;
                    ExitStatus::No
                })),
                FlagSet::new("tick", ErrorHandling::Continue),
            )],
        );
        let mut ctx = Context::new();
        // the token appears twice but the command is eligible only once
        assert_eq!(
            dispatcher.execute(&mut ctx, &argv(&["tool", "tick", "tick"])),
            -2
        );
        assert_eq!(*counted.borrow(), 1);
    }

    #[test]
    fn test_parse_error_becomes_usage_error() {
        let mut dispatcher = Dispatcher::new("tool");
        quiet(&mut dispatcher);
        let mut flags = FlagSet::new("strict", ErrorHandling::Continue);
        flags.int_flag("n", 0, "a number");
        flags.set_out(Rc::new(RefCell::new(Vec::<u8>::new())));
        dispatcher.set_group(
            "work",
            1,
            vec![Command::new(
                "",
                "strict",
                "wants numbers",
                1,
                false,
                Some(Action::run(|_, _| ExitStatus::Success)),
                flags,
            )],
        );
        let mut ctx = Context::new();
        assert_eq!(
            dispatcher.execute(&mut ctx, &argv(&["tool", "strict", "-n", "red"])),
            -2
        );
    }
}
