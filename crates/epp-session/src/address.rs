//! Street-address reflow for registries that cap postal lines.
//!
//! Registries such as nic.at accept at most three `<street>` lines of at
//! most 35 characters each. Input that already fits is passed through
//! untouched; anything else is re-packed word by word.

/// Maximum number of street lines.
pub const MAX_LINES: usize = 3;

/// Maximum line length in Unicode code points.
pub const MAX_LINE_CHARS: usize = 35;

/// Reflow street lines into at most [`MAX_LINES`] lines of at most
/// [`MAX_LINE_CHARS`] code points.
///
/// Words longer than a line are cut to [`MAX_LINE_CHARS`]. When packing
/// yields more than three lines, everything from the third line on is
/// joined and cut to fit the last line.
pub fn normalize_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    if fits(lines) {
        return lines.iter().map(|l| l.as_ref().to_string()).collect();
    }

    let mut packed: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in lines.iter().flat_map(|l| l.as_ref().split_whitespace()) {
        let word = truncate_chars(word, MAX_LINE_CHARS);
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= MAX_LINE_CHARS {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            packed.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        packed.push(current);
    }

    if packed.len() > MAX_LINES {
        let overflow = packed.split_off(MAX_LINES - 1).join(" ");
        packed.push(truncate_chars(&overflow, MAX_LINE_CHARS).to_string());
    }
    packed
}

/// [`normalize_lines`] over an optional street list. Absent stays absent.
pub fn normalize_street(street: Option<&[String]>) -> Option<Vec<String>> {
    street.map(normalize_lines)
}

fn fits<S: AsRef<str>>(lines: &[S]) -> bool {
    lines.len() <= MAX_LINES
        && lines
            .iter()
            .all(|l| l.as_ref().chars().count() <= MAX_LINE_CHARS)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
