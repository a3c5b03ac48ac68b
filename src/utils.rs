/// Line boundaries: LF, CR, VT, FF, FS, GS, RS, NEL, LS and PS. `\r\n`
/// counts as a single terminator.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Splits `text` into lines without their terminators.
/// A trailing terminator does not produce an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !LINE_BREAKS.contains(&c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(_, '\n')) = chars.peek() {
                chars.next();
                start += 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Returns the first `count` lines of `text`, each prefixed with a tab and
/// terminated with a newline.
pub fn first_lines(text: &str, count: usize) -> String {
    split_lines(text)
        .into_iter()
        .take(count)
        .fold(String::new(), |mut acc, line| {
            acc.push('\t');
            acc.push_str(line);
            acc.push('\n');
            acc
        })
}
