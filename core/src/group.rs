//! Named priority buckets of commands.

use std::io::Write;

use crate::command::Command;

/// Ordering applied to commands inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPolicy {
    /// Ascending command priority (the default).
    #[default]
    Priority,
    /// Ascending command tag.
    Alpha,
}

/// A named, prioritized bucket of commands. The empty name is the
/// implicit group for top-level commands.
pub struct Group {
    name: String,
    priority: i32,
    sort_by: SortPolicy,
    pub(crate) commands: Vec<Command>,
}

impl Group {
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            priority,
            sort_by: SortPolicy::default(),
            commands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Reorders the group's commands in place. Both sorts are stable, so
    /// commands comparing equal keep registration order.
    pub fn sort_by(&mut self, policy: SortPolicy) {
        self.sort_by = policy;
        match policy {
            SortPolicy::Priority => self.commands.sort_by_key(Command::priority),
            SortPolicy::Alpha => self.commands.sort_by(|a, b| a.tag().cmp(b.tag())),
        }
    }

    pub fn sort_policy(&self) -> SortPolicy {
        self.sort_by
    }

    /// Writes every command's usage block, in ascending command priority,
    /// without disturbing registration order.
    pub fn write_use(&self, w: &mut dyn Write) {
        let mut ordered: Vec<&Command> = self.commands.iter().collect();
        ordered.sort_by_key(|cmd| cmd.priority());
        for cmd in ordered {
            cmd.write_use(w);
        }
    }
}

/// The ordered collection of all groups for one dispatcher.
#[derive(Default)]
pub struct Groups {
    pub(crate) buckets: Vec<Group>,
}

impl Groups {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.buckets.iter()
    }

    /// Buckets in ascending group priority; registration order breaks
    /// ties.
    pub fn sorted_by_priority(&self) -> Vec<&Group> {
        let mut ordered: Vec<&Group> = self.buckets.iter().collect();
        ordered.sort_by_key(|group| group.priority());
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Action, ExitStatus};
    use crate::flag::{ErrorHandling, FlagSet};

    fn command(tag: &str, priority: i32) -> Command {
        Command::new(
            "g",
            tag,
            "test command",
            priority,
            false,
            Some(Action::run(|_, _| ExitStatus::No)),
            FlagSet::new(tag, ErrorHandling::Continue),
        )
    }

    fn tags(group: &Group) -> Vec<&str> {
        group.commands().iter().map(Command::tag).collect()
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let mut group = Group::new("g", 0);
        group.commands.push(command("c", 2));
        group.commands.push(command("a", 1));
        group.commands.push(command("b", 1));
        group.sort_by(SortPolicy::Priority);
        // a and b share a priority and keep their registration order
        assert_eq!(tags(&group), ["a", "b", "c"]);
    }

    #[test]
    fn test_sort_by_alpha() {
        let mut group = Group::new("g", 0);
        group.commands.push(command("beta", 1));
        group.commands.push(command("alpha", 2));
        group.sort_by(SortPolicy::Alpha);
        assert_eq!(tags(&group), ["alpha", "beta"]);
        assert_eq!(group.sort_policy(), SortPolicy::Alpha);
    }

    #[test]
    fn test_write_use_orders_without_mutating() {
        let mut group = Group::new("g", 0);
        group.commands.push(command("second", 2));
        group.commands.push(command("first", 1));
        let mut buf = Vec::new();
        group.write_use(&mut buf);
        let text = String::from_utf8_lossy(&buf).into_owned();
        let first = text.find("first [<flags>]").unwrap();
        let second = text.find("second [<flags>]").unwrap();
        assert!(first < second);
        // rendering never reorders the stored commands
        assert_eq!(tags(&group), ["second", "first"]);
    }

    #[test]
    fn test_groups_sorted_by_priority() {
        let mut groups = Groups::default();
        groups.buckets.push(Group::new("late", 10));
        groups.buckets.push(Group::new("early", -1));
        groups.buckets.push(Group::new("tied", 10));
        let ordered: Vec<&str> = groups
            .sorted_by_priority()
            .into_iter()
            .map(Group::name)
            .collect();
        assert_eq!(ordered, ["early", "late", "tied"]);
        assert_eq!(groups.len(), 3);
    }
}
