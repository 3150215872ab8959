//! Scanning an argument vector into an ordered command queue.

use tracing::debug;

use crate::registry::{CommandRef, Registry};

/// One recognized command token and the argument run it owns.
///
/// The run still begins with the command token itself; the executer drops
/// it before parsing.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub start: usize,
    pub stop: usize,
    pub target: CommandRef,
    group: String,
    group_priority: i32,
    priority: i32,
}

impl QueueEntry {
    /// This entry's private slice of `arguments`.
    pub fn run<'a>(&self, arguments: &'a [String]) -> &'a [String] {
        &arguments[self.start..self.stop]
    }
}

/// Scans `arguments` left to right for registered command tags and slices
/// the vector into per-command runs.
///
/// Scanning covers the whole vector, index zero included; a command whose
/// tag equals the program name is how top-level flags are dispatched. A
/// recognized command marked as escaping stops the scan, claiming every
/// remaining token, even ones matching other tags.
pub fn build_queue(registry: &Registry, arguments: &[String]) -> Vec<QueueEntry> {
    let mut entries = Vec::new();
    for (index, token) in arguments.iter().enumerate() {
        if let Some(hit) = registry.recognize(token) {
            entries.push(QueueEntry {
                start: index,
                stop: 0,
                target: hit.target,
                group: registry.group_name(hit.target).to_string(),
                group_priority: registry.group_priority(hit.target),
                priority: registry.command(hit.target).priority(),
            });
            if hit.escapes {
                debug!(token = %token, "escaping command claims remaining arguments");
                break;
            }
        }
    }
    for index in 0..entries.len() {
        let stop = match entries.get(index + 1) {
            Some(next) => next.start,
            None => arguments.len(),
        };
        entries[index].stop = stop;
    }
    order_entries(&mut entries);
    debug!(entries = entries.len(), "command queue built");
    entries
}

/// Group priority orders the whole queue; command priority reorders only
/// entries sharing a group name. Entries from different groups are never
/// compared by command priority, so a cross-group pair keeps its
/// group-priority order even when their command priorities disagree.
fn order_entries(entries: &mut [QueueEntry]) {
    entries.sort_by_key(|entry| entry.group_priority);

    let mut names: Vec<String> = Vec::new();
    for entry in entries.iter() {
        if !names.contains(&entry.group) {
            names.push(entry.group.clone());
        }
    }
    for name in names {
        let slots: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.group == name)
            .map(|(slot, _)| slot)
            .collect();
        if slots.len() < 2 {
            continue;
        }
        let mut picked: Vec<QueueEntry> = slots.iter().map(|&slot| entries[slot].clone()).collect();
        picked.sort_by_key(|entry| entry.priority);
        for (slot, entry) in slots.into_iter().zip(picked) {
            entries[slot] = entry;
        }
    }
}
