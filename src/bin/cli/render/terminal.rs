use studyhub_lib::flashcards::ReviewSnapshot;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in a color code when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Print a validation notice (nothing was changed)
pub fn notice(message: &str, use_color: bool) {
    eprintln!("{}", paint(message, Color::YELLOW, use_color));
}

/// Shorten to `width` characters, ending in "..." when cut
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render the head card of a review session
pub fn render_card(snapshot: &ReviewSnapshot, use_color: bool) -> String {
    let mut lines = Vec::new();

    let shuffle = if snapshot.shuffle { "on" } else { "off" };
    lines.push(paint(
        &format!(
            "{} | {} cards | correct {} wrong {} | shuffle {}",
            snapshot.deck_title, snapshot.deck_size, snapshot.stats.correct, snapshot.stats.wrong, shuffle
        ),
        Color::DIM,
        use_color,
    ));
    lines.push(String::new());

    let Some(card) = &snapshot.current else {
        lines.push("No cards in this deck.".to_string());
        return lines.join("\n");
    };

    lines.push(paint("Q", Color::CYAN, use_color));
    lines.extend(wrap_lines(&card.question, "  ", 80));

    if snapshot.flipped {
        lines.push(String::new());
        lines.push(paint("A", Color::GREEN, use_color));
        lines.extend(wrap_lines(&card.answer, "  ", 80));
        if !card.explanation.is_empty() {
            lines.push(String::new());
            lines.push(paint("Why", Color::GRAY, use_color));
            lines.extend(wrap_lines(&card.explanation, "  ", 80));
        }
    } else {
        lines.push(String::new());
        lines.push(paint("(flip to see answer)", Color::DIM, use_color));
    }

    lines.join("\n")
}

fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.len());

    for line in text.lines() {
        if line.chars().count() <= effective_width {
            lines.push(format!("{}{}", prefix, line));
        } else {
            let mut current_line = String::new();
            for word in line.split_whitespace() {
                if current_line.is_empty() {
                    current_line = word.to_string();
                } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                    current_line.push(' ');
                    current_line.push_str(word);
                } else {
                    lines.push(format!("{}{}", prefix, current_line));
                    current_line = word.to_string();
                }
            }
            if !current_line.is_empty() {
                lines.push(format!("{}{}", prefix, current_line));
            }
        }
    }

    if lines.is_empty() && !text.is_empty() {
        lines.push(format!("{}{}", prefix, text));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyhub_lib::flashcards::{Card, ReviewStats};

    fn snapshot(flipped: bool) -> ReviewSnapshot {
        ReviewSnapshot {
            deck_id: "d".to_string(),
            deck_title: "Ports".to_string(),
            deck_size: 1,
            stats: ReviewStats { correct: 2, wrong: 1 },
            shuffle: false,
            flipped,
            current: Some(Card {
                id: "c1".to_string(),
                question: "SSH port?".to_string(),
                answer: "22".to_string(),
                explanation: "TCP".to_string(),
            }),
        }
    }

    #[test]
    fn test_render_card_hides_answer_until_flipped() {
        let front = render_card(&snapshot(false), false);
        assert!(front.contains("SSH port?"));
        assert!(!front.contains("22"));
        assert!(front.contains("correct 2 wrong 1"));

        let back = render_card(&snapshot(true), false);
        assert!(back.contains("  22"));
        assert!(back.contains("  TCP"));
    }

    #[test]
    fn test_wrap_lines() {
        let wrapped = wrap_lines("one two three four", "", 9);
        assert_eq!(wrapped, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 8), "a lon...");
    }
}
