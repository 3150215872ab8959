//! Status-keyed post-execution hooks.

use std::collections::HashMap;

use tracing::debug;

use crate::command::ExitStatus;
use crate::context::Context;

/// A side-effecting hook run after the dispatch loop concludes. Hooks
/// never influence the final status.
pub type Cleanup = Box<dyn FnMut(&Context)>;

/// Registry of cleanup hooks keyed by [`ExitStatus`]. Hooks registered
/// under [`ExitStatus::Any`] run after every outcome.
#[derive(Default)]
pub struct Cleaner {
    hooks: HashMap<ExitStatus, Vec<Cleanup>>,
}

impl Cleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `hook` under `status`; repeated calls accumulate rather
    /// than replace.
    pub fn set_cleanup(&mut self, status: ExitStatus, hook: Cleanup) {
        self.hooks.entry(status).or_default().push(hook);
    }

    /// Runs the hooks registered for `status` in registration order, then
    /// every [`ExitStatus::Any`] hook, and reports the status code.
    pub fn run_cleanup(&mut self, status: ExitStatus, ctx: &Context) -> i32 {
        if let Some(hooks) = self.hooks.get_mut(&status) {
            debug!(?status, hooks = hooks.len(), "running cleanup hooks");
            for hook in hooks {
                hook(ctx);
            }
        }
        if let Some(hooks) = self.hooks.get_mut(&ExitStatus::Any) {
            for hook in hooks {
                hook(ctx);
            }
        }
        status.code()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> Cleanup {
        let log = Rc::clone(log);
        Box::new(move |_| log.borrow_mut().push(label))
    }

    #[test]
    fn test_exact_hooks_then_any_hooks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut cleaner = Cleaner::new();
        cleaner.set_cleanup(ExitStatus::Success, recorder(&log, "success-1"));
        cleaner.set_cleanup(ExitStatus::Success, recorder(&log, "success-2"));
        cleaner.set_cleanup(ExitStatus::Any, recorder(&log, "always"));
        cleaner.set_cleanup(ExitStatus::Failure, recorder(&log, "failure"));

        let code = cleaner.run_cleanup(ExitStatus::Success, &Context::new());
        assert_eq!(code, 0);
        assert_eq!(*log.borrow(), ["success-1", "success-2", "always"]);
    }

    #[test]
    fn test_any_runs_for_every_outcome() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut cleaner = Cleaner::new();
        cleaner.set_cleanup(ExitStatus::Any, recorder(&log, "always"));

        assert_eq!(cleaner.run_cleanup(ExitStatus::Success, &Context::new()), 0);
        assert_eq!(cleaner.run_cleanup(ExitStatus::Failure, &Context::new()), -1);
        assert_eq!(
            cleaner.run_cleanup(ExitStatus::UsageError, &Context::new()),
            -2
        );
        assert_eq!(*log.borrow(), ["always", "always", "always"]);
    }

    #[test]
    fn test_unregistered_status_still_reports_code() {
        let mut cleaner = Cleaner::new();
        assert_eq!(cleaner.run_cleanup(ExitStatus::Failure, &Context::new()), -1);
    }

    #[test]
    fn test_hooks_read_context() {
        struct Note(&'static str);
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&seen);
        let mut cleaner = Cleaner::new();
        cleaner.set_cleanup(
            ExitStatus::Success,
            Box::new(move |ctx| {
                if let Some(note) = ctx.get::<Note>() {
                    sink.borrow_mut().push_str(note.0);
                }
            }),
        );
        let mut ctx = Context::new();
        ctx.insert(Note("observed"));
        cleaner.run_cleanup(ExitStatus::Success, &ctx);
        assert_eq!(*seen.borrow(), "observed");
    }
}
