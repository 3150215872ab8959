//! The command registry: groups, lookup, and token recognition.

use crate::command::Command;
use crate::group::{Group, Groups};

/// Index-pair handle to a registered command.
///
/// Queue entries carry these instead of references so the executer can
/// take one mutable borrow at a time while iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRef {
    pub(crate) group: usize,
    pub(crate) command: usize,
}

/// Result of recognizing one raw token.
#[derive(Debug, Clone, Copy)]
pub struct Recognized {
    pub target: CommandRef,
    pub escapes: bool,
}

/// Instance-scoped command registry. Mutated by `set_group`/`set_command`
/// during setup, read-only during execution.
#[derive(Default)]
pub struct Registry {
    groups: Groups,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    /// Registers a group and routes `commands` into it.
    ///
    /// A repeated name appends a second bucket rather than merging; later
    /// lookups and command routing see the first bucket. That matches the
    /// historical behavior callers may depend on.
    pub fn set_group(&mut self, name: &str, priority: i32, commands: Vec<Command>) -> &mut Self {
        self.groups.buckets.push(Group::new(name, priority));
        for mut command in commands {
            command.set_group(name);
            self.set_command(command);
        }
        self
    }

    /// Appends `command` to the first group whose name matches its group
    /// stamp.
    ///
    /// # Panics
    ///
    /// Panics when no such group exists; commands are wired statically, so
    /// a missing group is a configuration error.
    pub fn set_command(&mut self, command: Command) -> &mut Self {
        let Some(bucket) = self
            .groups
            .buckets
            .iter_mut()
            .find(|group| group.name() == command.group())
        else {
            panic!(
                "no registered group {:?} for command {:?}",
                command.group(),
                command.tag()
            );
        };
        bucket.commands.push(command);
        self
    }

    /// The first group registered under `name`.
    pub fn get_group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name() == name)
    }

    pub fn get_group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups
            .buckets
            .iter_mut()
            .find(|group| group.name() == name)
    }

    /// Resolves `keys` to commands: a key matching a group name selects
    /// the whole bucket, a key matching a tag selects that command.
    /// Results follow registration order.
    pub fn get_commands(&self, keys: &[&str]) -> Vec<CommandRef> {
        let mut found = Vec::new();
        for (group_index, group) in self.groups.iter().enumerate() {
            if keys.iter().any(|key| *key == group.name()) {
                found.extend((0..group.commands().len()).map(|command| CommandRef {
                    group: group_index,
                    command,
                }));
            }
            for (command_index, command) in group.commands().iter().enumerate() {
                if keys.iter().any(|key| *key == command.tag()) {
                    found.push(CommandRef {
                        group: group_index,
                        command: command_index,
                    });
                }
            }
        }
        found
    }

    /// Global tag scan in registration order; the first match wins.
    pub fn recognize(&self, token: &str) -> Option<Recognized> {
        for (group_index, group) in self.groups.iter().enumerate() {
            for (command_index, command) in group.commands().iter().enumerate() {
                if command.tag() == token {
                    return Some(Recognized {
                        target: CommandRef {
                            group: group_index,
                            command: command_index,
                        },
                        escapes: command.escapes(),
                    });
                }
            }
        }
        None
    }

    pub fn command(&self, target: CommandRef) -> &Command {
        &self.groups.buckets[target.group].commands[target.command]
    }

    pub fn command_mut(&mut self, target: CommandRef) -> &mut Command {
        &mut self.groups.buckets[target.group].commands[target.command]
    }

    pub fn group_name(&self, target: CommandRef) -> &str {
        self.groups.buckets[target.group].name()
    }

    pub fn group_priority(&self, target: CommandRef) -> i32 {
        self.groups.buckets[target.group].priority()
    }
}
