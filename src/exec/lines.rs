// src/exec/lines.rs

/// Split one drained chunk of child output into log lines.
///
/// - Interior empty lines are kept (`"a\n\nb"` gives three lines).
/// - Trailing empty segments are dropped, so `"a\n"` is one line and a chunk
///   made only of newlines yields nothing.
/// - A chunk that does not end in `\n` still emits its last fragment. It is
///   not held back for the next read, so a line written in several pieces
///   can show up as several log events.
///
/// Bytes are decoded as UTF-8, replacing invalid sequences.
pub fn split_lines(chunk: &[u8]) -> Vec<String> {
    let mut lines: Vec<String> = chunk
        .split(|b| *b == b'\n')
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect();

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    lines
}
