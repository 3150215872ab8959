//! Instruction rendering: the full and subset usage displays.

use std::io::{self, Write};

use crate::registry::{CommandRef, Registry};
use crate::sink::Sink;
use crate::style;

/// Renders usage instructions for a dispatcher. The default sink is
/// stdout; help is an answer, not an error.
pub struct Instructer {
    title: String,
    output: Option<Sink>,
}

impl Instructer {
    pub fn new(name: &str) -> Self {
        Self {
            title: format!("{name} [OPTIONS...] {{COMMAND}} ...\n\n"),
            output: None,
        }
    }

    pub fn set_out(&mut self, output: Sink) {
        self.output = Some(output);
    }

    fn write(&self, rendered: &[u8]) {
        match &self.output {
            Some(sink) => {
                let _ = sink.borrow_mut().write_all(rendered);
            }
            None => {
                let _ = io::stdout().write_all(rendered);
            }
        }
    }

    /// Writes the title line and every group's usage, groups in ascending
    /// priority order.
    pub fn instruction(&self, registry: &Registry) {
        let mut buf = Vec::new();
        style::title(&mut buf, &self.title);
        for group in registry.groups().sorted_by_priority() {
            group.write_use(&mut buf);
        }
        self.write(&buf);
    }

    /// Writes the usage blocks for just the given commands.
    pub fn subset_instruction(&self, registry: &Registry, targets: &[CommandRef]) {
        let mut buf = Vec::new();
        for target in targets {
            registry.command(*target).write_use(&mut buf);
        }
        self.write(&buf);
    }

    /// Writes preformatted text to the configured sink.
    pub fn write_text(&self, text: &str) {
        self.write(text.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::command::{Action, Command, ExitStatus};
    use crate::flag::{ErrorHandling, FlagSet};

    fn command(tag: &str, priority: i32) -> Command {
        Command::new(
            "",
            tag,
            "test command",
            priority,
            false,
            Some(Action::run(|_, _| ExitStatus::No)),
            FlagSet::new(tag, ErrorHandling::Continue),
        )
    }

    fn capture(instructer: &mut Instructer) -> Rc<RefCell<Vec<u8>>> {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        instructer.set_out(buffer.clone());
        buffer
    }

    #[test]
    fn test_instruction_renders_title_and_groups() {
        let mut registry = Registry::new();
        registry.set_group("later", 10, vec![command("second", 1)]);
        registry.set_group("sooner", 1, vec![command("first", 1)]);

        let mut instructer = Instructer::new("tool");
        let buffer = capture(&mut instructer);
        instructer.instruction(&registry);

        let text = String::from_utf8_lossy(&buffer.borrow()).into_owned();
        assert!(text.contains("tool [OPTIONS...] {COMMAND} ..."));
        let first = text.find("first [<flags>]").unwrap();
        let second = text.find("second [<flags>]").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_subset_instruction_renders_only_targets() {
        let mut registry = Registry::new();
        registry.set_group("g", 1, vec![command("shown", 1), command("hidden", 2)]);

        let mut instructer = Instructer::new("tool");
        let buffer = capture(&mut instructer);
        let targets = registry.get_commands(&["shown"]);
        instructer.subset_instruction(&registry, &targets);

        let text = String::from_utf8_lossy(&buffer.borrow()).into_owned();
        assert!(text.contains("shown [<flags>]"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("OPTIONS"));
    }
}
