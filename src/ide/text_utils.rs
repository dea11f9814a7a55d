//! Text manipulation utilities for working with source code.
//!
//! Offsets are byte offsets into the document text, as everywhere else in
//! the crate. Functions clamp out-of-range offsets instead of panicking.

use text_size::{TextRange, TextSize};

/// Check if a character is considered part of a word (identifier).
///
/// Uses Unicode Standard Annex #31 rules for identifier characters.
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// A valid identifier: a letter or `_` first, then letters, digits or `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || unicode_ident::is_xid_start(first)) && chars.all(is_word_character)
}

fn clamp(text: &str, offset: TextSize) -> usize {
    let mut offset = usize::from(offset).min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Range of the identifier touching `offset`.
///
/// A cursor right after the last character still counts, so `foo|` finds
/// `foo`. Numbers are not identifiers.
pub fn word_range_at(text: &str, offset: TextSize) -> Option<TextRange> {
    let offset = clamp(text, offset);

    let mut start = offset;
    for (idx, ch) in text[..offset].char_indices().rev() {
        if !is_word_character(ch) {
            break;
        }
        start = idx;
    }
    let end = text[offset..]
        .char_indices()
        .find(|(_, ch)| !is_word_character(*ch))
        .map_or(text.len(), |(idx, _)| offset + idx);

    let word = &text[start..end];
    if word.is_empty() || word.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(TextRange::new(
        TextSize::new(start as u32),
        TextSize::new(end as u32),
    ))
}

/// The identifier touching `offset`, with its range.
pub fn word_at(text: &str, offset: TextSize) -> Option<(TextRange, &str)> {
    let range = word_range_at(text, offset)?;
    Some((range, &text[range]))
}

/// The partial identifier typed right before `offset` and where it starts.
///
/// `"items.Co|"` yields `(6, "Co")`; an empty prefix is returned as `""`.
pub fn prefix_before(text: &str, offset: TextSize) -> (TextSize, &str) {
    let end = clamp(text, offset);
    let mut start = end;
    for (idx, ch) in text[..end].char_indices().rev() {
        if !is_word_character(ch) {
            break;
        }
        start = idx;
    }
    (TextSize::new(start as u32), &text[start..end])
}

/// If the character before `offset` (ignoring spaces) is a `.`, its position.
pub fn dot_before(text: &str, offset: TextSize) -> Option<TextSize> {
    let end = clamp(text, offset);
    let trimmed = text[..end].trim_end_matches([' ', '\t']);
    trimmed
        .ends_with('.')
        .then(|| TextSize::new(trimmed.len() as u32 - 1))
}

/// The receiver expression ending right before the `.` at `dot`.
///
/// Scans backwards over identifiers, dots and balanced `()`, `[]`, `<>`
/// groups, so `people[0].name.` yields `people[0].name` and
/// `new Person().` yields `Person()`. Stops at whitespace or an operator
/// outside any group.
pub fn receiver_before_dot(text: &str, dot: TextSize) -> Option<&str> {
    let end = clamp(text, dot);
    let bytes = text.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut start = end;

    for (idx, ch) in text[..end].char_indices().rev() {
        if let Some(&open) = stack.last() {
            match ch {
                ')' | ']' => stack.push(opener(ch)),
                '>' if open == b'<' => stack.push(b'<'),
                c if c == char::from(open) => {
                    stack.pop();
                }
                _ => {}
            }
            start = idx;
            continue;
        }
        match ch {
            ')' | ']' => stack.push(opener(ch)),
            // Only a generic argument list when glued to what follows.
            '>' if idx + 1 == start => stack.push(b'<'),
            '.' => {}
            c if is_word_character(c) => {}
            _ => break,
        }
        start = idx;
    }

    if !stack.is_empty() {
        return None;
    }
    let receiver = text[start..end].trim_start_matches('.');
    if receiver.is_empty() || bytes.get(end) != Some(&b'.') {
        return None;
    }
    Some(receiver)
}

fn opener(close: char) -> u8 {
    if close == ')' { b'(' } else { b'[' }
}
