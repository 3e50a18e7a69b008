//! Greedy word wrapping and vertical centering for the text block.
//!
//! Wrapping is a pure function over a measuring closure, so it works the same
//! against a real font stack or a fixed-width fake in tests. The measure
//! callback receives whole candidate lines, not single words, because
//! proportional fonts and shaping make line width more than the sum of its
//! parts.

/// Split `text` into lines no wider than `max_width`.
///
/// Words are taken in order and greedily packed: a word that would push the
/// current line past `max_width` starts a new line instead. A single word
/// wider than `max_width` still gets its own line rather than being split
/// mid-word. Whitespace runs collapse to single spaces and empty input
/// yields no lines.
///
/// `measure` returns the advance width in pixels of a candidate line.
pub fn wrap_text<M>(text: &str, max_width: f32, mut measure: M) -> Vec<String>
where
    M: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let trial = format!("{line} {word}");
        if measure(&trial) > max_width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        } else {
            line = trial;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// The y coordinate of the first line of a vertically centered block.
///
/// Lines are drawn with a middle baseline, so the block spans
/// `line_height * (line_count - 1)` between the first and last line anchors
/// and the whole span is centered on the viewport midline. A single line
/// lands exactly at `viewport_height / 2`.
pub fn block_top(line_count: usize, line_height: f32, viewport_height: f32) -> f32 {
    let block_height = line_height * line_count.saturating_sub(1) as f32;
    viewport_height / 2.0 - block_height / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed 10px per character, spaces included.
    fn char_width(line: &str) -> f32 {
        line.chars().count() as f32 * 10.0
    }

    #[test]
    fn test_wrap_packs_words_greedily() {
        let lines = wrap_text("AAAA BBBB CCCC", 95.0, char_width);
        assert_eq!(lines, vec!["AAAA BBBB", "CCCC"]);
    }

    #[test]
    fn test_wrap_keeps_short_text_on_one_line() {
        let lines = wrap_text("HI THERE", 200.0, char_width);
        assert_eq!(lines, vec!["HI THERE"]);
    }

    #[test]
    fn test_wrap_gives_overlong_word_its_own_line() {
        let lines = wrap_text("SUPERCALIFRAGILISTIC", 50.0, char_width);
        assert_eq!(lines, vec!["SUPERCALIFRAGILISTIC"]);
    }

    #[test]
    fn test_wrap_overlong_word_between_others() {
        let lines = wrap_text("A SUPERCALIFRAGILISTIC B", 50.0, char_width);
        assert_eq!(lines, vec!["A", "SUPERCALIFRAGILISTIC", "B"]);
    }

    #[test]
    fn test_wrap_empty_and_whitespace_input() {
        assert!(wrap_text("", 100.0, char_width).is_empty());
        assert!(wrap_text("   ", 100.0, char_width).is_empty());
    }

    #[test]
    fn test_wrap_collapses_whitespace_runs() {
        let lines = wrap_text("A    B", 200.0, char_width);
        assert_eq!(lines, vec!["A B"]);
    }

    #[test]
    fn test_wrap_every_line_fits_unless_single_word() {
        let text = "the quick brown fox jumps over the lazy dog";
        let lines = wrap_text(text, 110.0, char_width);
        for line in &lines {
            assert!(
                char_width(line) <= 110.0,
                "line '{line}' exceeds the wrap width"
            );
        }
        // No words lost or reordered.
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_block_top_single_line_sits_on_midline() {
        assert_eq!(block_top(1, 117.0, 600.0), 300.0);
    }

    #[test]
    fn test_block_top_centers_multi_line_block() {
        // Three lines span two line heights; the middle line sits on the midline.
        let top = block_top(3, 100.0, 600.0);
        assert_eq!(top, 200.0);
        assert_eq!(top + 100.0, 300.0);
    }

    #[test]
    fn test_block_top_of_empty_block() {
        assert_eq!(block_top(0, 100.0, 600.0), 300.0);
    }
}
