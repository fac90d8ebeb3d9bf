use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Spinner glyph for the given animation frame
#[must_use]
pub fn spinner(frame: u8) -> &'static str {
    SPINNER_FRAMES
        .get(usize::from(frame) % SPINNER_FRAMES.len())
        .copied()
        .unwrap_or("*")
}

/// Wraps text to `max_width` terminal columns.
///
/// CJK text has no spaces, so lines break at the column limit; Latin text
/// breaks at the last space when there is one. Runs of blank lines collapse
/// to one and leading/trailing blank lines are dropped.
#[must_use]
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if max_width == 0 {
        return lines;
    }

    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            if lines.last().is_some_and(|line: &String| !line.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }
        wrap_line(raw_line.trim_end(), max_width, &mut lines);
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

fn wrap_line(line: &str, max_width: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut width = 0usize;
    // byte offset in `current` just after the last space
    let mut last_space: Option<usize> = None;

    for character in line.chars() {
        let char_width = UnicodeWidthChar::width(character).unwrap_or(0);
        if width + char_width > max_width && width > 0 {
            if character == ' ' {
                out.push(std::mem::take(&mut current));
                width = 0;
                last_space = None;
                continue;
            }
            match last_space.filter(|offset| *offset < current.len()) {
                Some(offset) => {
                    let rest = current.split_off(offset);
                    out.push(current.trim_end().to_string());
                    current = rest;
                }
                None => out.push(std::mem::take(&mut current)),
            }
            width = UnicodeWidthStr::width(current.as_str());
            last_space = None;
        }
        current.push(character);
        width += char_width;
        if character == ' ' {
            last_space = Some(current.len());
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_cjk_by_columns() {
        // each character is two columns wide
        let lines = wrap_text("命運並非不可更改", 8);
        assert_eq!(lines, vec!["命運並非", "不可更改"]);
    }

    #[test]
    fn test_wraps_latin_at_spaces() {
        let lines = wrap_text("lucky color blue", 11);
        assert_eq!(lines, vec!["lucky color", "blue"]);
    }

    #[test]
    fn test_collapses_blank_runs() {
        let lines = wrap_text("\n\nfirst\n\n\n\nsecond\n\n", 20);
        assert_eq!(lines, vec!["first", "", "second"]);
    }
}
