//! Boxed text cards for `help`, `tutorial` and `tips`, plus the banner.

const MAX_WIDTH: usize = 44;
const MIN_WIDTH: usize = 18;
/// Break at a space only if it leaves at least this many characters.
const MIN_BREAK: usize = 16;

/// Word-wrap to `width` characters, breaking on the last space when one is
/// far enough in, mid-word otherwise.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut remaining: Vec<char> = line.trim().chars().collect();
    let mut segments = Vec::new();
    while remaining.len() > width {
        let cutoff = match remaining[..width].iter().rposition(|c| *c == ' ') {
            Some(space) if space > MIN_BREAK => space,
            _ => width,
        };
        let head: String = remaining[..cutoff].iter().collect();
        segments.push(head.trim_end().to_string());
        let tail: String = remaining[cutoff..].iter().collect();
        remaining = tail.trim_start().chars().collect();
    }
    segments.push(remaining.into_iter().collect());
    segments
}

/// Render a title and bullet items inside a rounded box.
pub fn card<I, S>(title: &str, items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = wrap_line(title, MAX_WIDTH - 4);
    for item in items {
        lines.extend(wrap_line(&format!("• {}", item.as_ref()), MAX_WIDTH - 4));
    }

    let width = lines
        .iter()
        .map(|l| l.chars().count() + 4)
        .max()
        .unwrap_or(0)
        .clamp(MIN_WIDTH, MAX_WIDTH);
    let rule = "─".repeat(width - 2);

    let mut boxed = Vec::with_capacity(lines.len() + 2);
    boxed.push(format!("╭{rule}╮"));
    for line in lines {
        boxed.push(format!("│ {line:<pad$} │", pad = width - 4));
    }
    boxed.push(format!("╰{rule}╯"));
    boxed
}

pub fn banner() -> Vec<String> {
    [
        "╔══════════════════════╗",
        "║  SHELLQUEST AWAKENS  ║",
        "╚══════════════════════╝",
        "⚡ Learn commands. Earn loot. ⚡",
    ]
    .map(String::from)
    .to_vec()
}
