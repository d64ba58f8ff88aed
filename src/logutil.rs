//! Keeps creature names and status dumps on a single log line.

use std::fmt::Write;

use crate::sim::creature::Creature;

/// Longest preview kept by [`escape_log`]. Names are capped at 50 characters, so
/// only hostile input from a hand-edited save is ever cut.
pub const MAX_PREVIEW: usize = 80;

/// Escape control characters (`\n`, `\r`, `\t`, backslash, other controls as `\xNN`)
/// and cut after [`MAX_PREVIEW`] characters with an ellipsis.
pub fn escape_log(s: &str) -> String {
    escape_log_limited(s, MAX_PREVIEW)
}

pub fn escape_log_limited(s: &str, limit: usize) -> String {
    let mut out = String::with_capacity(s.len().min(limit) + 8);
    let mut chars = s.chars();
    for ch in chars.by_ref().take(limit) {
        push_escaped(&mut out, ch);
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if c.is_control() => {
            let _ = write!(out, "\\x{:02X}", c as u32);
        }
        c => out.push(c),
    }
}

/// Compact one-line vitals summary, e.g. `Kaede L3 W:80 H:100 E:95 Hu:32 C:99 M:75 Growing`.
pub fn vitals_line(creature: &Creature) -> String {
    format!(
        "{} L{} W:{} H:{} E:{} Hu:{} C:{} M:{} {:?}",
        escape_log(creature.name()),
        creature.level(),
        creature.water(),
        creature.health(),
        creature.energy(),
        creature.hunger(),
        creature.cleanliness(),
        creature.mood(),
        creature.current_state()
    )
}
