use mention_protocol::{parse, MentionToken};
use tracing::debug;

use super::picker::LeadPicker;
use crate::models::CandidateLead;

/// When typing after `@` keeps the picker open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerTrigger {
    /// Open on a fresh `@`, close as soon as anything follows it
    #[default]
    BareAt,
    /// Keep open and filter with the text typed after `@`
    FilterAsYouType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Consumed by the composer; the host must not act on it
    Handled,
    Submit(String),
    Ignored,
}

/// Single-line chat input that turns `@` into lead mentions
#[derive(Debug, Default)]
pub struct MentionComposer {
    text: String,
    /// Byte offset, always on a char boundary
    cursor: usize,
    picker: LeadPicker,
    trigger: PickerTrigger,
    disabled: bool,
    /// `@` position and query the user dismissed with Escape
    dismissed: Option<(usize, String)>,
}

impl MentionComposer {
    pub fn new(trigger: PickerTrigger) -> Self {
        Self {
            trigger,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn picker(&self) -> &LeadPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut LeadPicker {
        &mut self.picker
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.picker.close();
        }
    }

    /// Host input changed (typing, paste, cursor move)
    pub fn on_change(&mut self, text: impl Into<String>, cursor: usize) {
        self.text = text.into();
        self.cursor = clamp_to_char_boundary(&self.text, cursor);
        self.sync_picker();
    }

    fn sync_picker(&mut self) {
        if self.disabled {
            self.picker.close();
            return;
        }

        let Some(at) = find_trigger(&self.text, self.cursor) else {
            self.dismissed = None;
            self.picker.close();
            return;
        };
        let query = self.text[at + 1..self.cursor].to_string();

        if self
            .dismissed
            .as_ref()
            .is_some_and(|(pos, q)| *pos == at && *q == query)
        {
            return;
        }
        self.dismissed = None;

        match self.trigger {
            _ if query.is_empty() => self.picker.open(""),
            PickerTrigger::BareAt => self.picker.close(),
            PickerTrigger::FilterAsYouType if self.picker.is_open() => {
                self.picker.set_query(&query)
            }
            PickerTrigger::FilterAsYouType => self.picker.open(&query),
        }
    }

    /// Replace the armed `@query` with the lead's token and a trailing space.
    ///
    /// Returns false and leaves everything untouched when no `@` is armed.
    pub fn select_lead(&mut self, lead: &CandidateLead) -> bool {
        if self.disabled {
            return false;
        }
        let Some(at) = find_trigger(&self.text, self.cursor) else {
            return false;
        };

        let inserted = format!("{} ", MentionToken::sanitized(lead.id, &lead.name));
        self.text.replace_range(at..self.cursor, &inserted);
        self.cursor = at + inserted.len();
        self.picker.close();
        self.dismissed = None;

        debug!("Inserted mention of lead {}", lead.id);
        true
    }

    pub fn handle_key(&mut self, press: KeyPress) -> KeyOutcome {
        if self.picker.is_open() {
            return self.handle_key_with_picker(press);
        }

        match press {
            KeyPress {
                key: Key::Enter,
                shift: false,
            } if !self.disabled && !self.text.trim().is_empty() => {
                KeyOutcome::Submit(self.text.clone())
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn handle_key_with_picker(&mut self, press: KeyPress) -> KeyOutcome {
        match press.key {
            Key::ArrowUp => self.picker.move_up(),
            Key::ArrowDown => self.picker.move_down(),
            Key::Enter => match self.picker.selected().cloned() {
                Some(lead) => {
                    self.select_lead(&lead);
                }
                None => self.picker.close(),
            },
            Key::Escape => {
                // remember what was dismissed so the next keystroke does not reopen it
                if let Some(at) = find_trigger(&self.text, self.cursor) {
                    self.dismissed = Some((at, self.text[at + 1..self.cursor].to_string()));
                }
                self.picker.close();
            }
            Key::Other => return KeyOutcome::Ignored,
        }
        KeyOutcome::Handled
    }

    /// Reset after a successful send
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.dismissed = None;
        self.picker.close();
    }
}

fn clamp_to_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Byte index of the `@` arming the picker at `cursor`, if any.
///
/// Scans back to the nearest unconsumed `@` without crossing whitespace. An
/// `@` that opens a complete mention token is consumed and skipped.
fn find_trigger(text: &str, cursor: usize) -> Option<usize> {
    let mut consumed = Vec::new();
    let mut offset = 0;
    for segment in parse(text) {
        let len = segment.as_str().len();
        if offset >= cursor {
            break;
        }
        if segment.is_mention() {
            consumed.push(offset..offset + len);
        }
        offset += len;
    }

    text[..cursor]
        .char_indices()
        .rev()
        .take_while(|(_, c)| !c.is_whitespace())
        .find(|(i, c)| *c == '@' && !consumed.iter().any(|span| span.contains(i)))
        .map(|(i, _)| i)
}
