//! Label text normalisation and reflow.

/// Width of a run of text in the label font.
pub trait Measure {
    fn width(&self, text: &str) -> f32;
}

/// Normalises label text given on the command line.
///
/// Tabs become spaces and runs of spaces collapse to one. The two-character
/// escape `\n` becomes a line break and swallows a real newline that follows
/// it (spaces in between are dropped as well). Other real newlines are kept
/// with `cr_wrap` and turned into a space otherwise. The input is first cut to
/// `max_len` bytes.
pub fn trim_string(text: &str, cr_wrap: bool, max_len: usize) -> String {
    let text = truncate(text, max_len);
    let chars: Vec<char> = text.chars().map(|c| if c == '\t' { ' ' } else { c }).collect();
    let mut out = String::with_capacity(text.len());

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && chars.get(i + 1) == Some(&'n') {
            out.push('\n');
            i += 2;
            let mut j = i;
            while chars.get(j) == Some(&' ') {
                j += 1;
            }
            if chars.get(j) == Some(&'\n') {
                i = j + 1;
            }
            continue;
        }

        match c {
            '\n' if cr_wrap => out.push('\n'),
            ' ' | '\n' => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
        i += 1;
    }
    out
}

/// Replaces every `\n` escape with a line break and leaves everything else
/// alone.
pub fn backslash_n_to_linefeed(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Greedy word wrapping against a pixel budget.
///
/// When the current line reaches `max_width` the most recent space becomes a
/// line break and scanning resumes after it. A line without any space
/// overflows until a space shows up. Only spaces are ever replaced.
pub fn wrap_text(text: &str, max_width: f32, measure: &impl Measure) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let mut line = String::new();
    let mut last_space: Option<usize> = None;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line.clear();
            last_space = None;
        } else {
            line.push(c);
            if measure.width(&line) < max_width {
                if c == ' ' {
                    last_space = Some(i);
                }
            } else if let Some(at) = last_space.take() {
                chars[at] = '\n';
                line.clear();
                i = at;
            } else if c == ' ' {
                last_space = Some(i);
            }
        }
        i += 1;
    }
    chars.into_iter().collect()
}

fn truncate(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mono;

    impl Measure for Mono {
        fn width(&self, text: &str) -> f32 {
            text.chars().count() as f32
        }
    }

    #[test]
    fn escape_and_space_runs() {
        assert_eq!(trim_string("a\\nb  c", false, 2048), "a\nb c");
    }

    #[test]
    fn tabs_become_spaces() {
        assert_eq!(trim_string("a\t\tb", false, 2048), "a b");
    }

    #[test]
    fn real_newlines_depend_on_cr_wrap() {
        assert_eq!(trim_string("a\nb", true, 2048), "a\nb");
        assert_eq!(trim_string("a\nb", false, 2048), "a b");
        assert_eq!(trim_string("a \n b", false, 2048), "a b");
    }

    #[test]
    fn escape_swallows_following_newline() {
        assert_eq!(trim_string("one\\n\ntwo", true, 2048), "one\ntwo");
        assert_eq!(trim_string("one\\n  \ntwo", false, 2048), "one\ntwo");
    }

    #[test]
    fn input_is_truncated_on_char_boundary() {
        assert_eq!(trim_string("abcdef", false, 3), "abc");
        assert_eq!(trim_string("aé", false, 2), "a");
    }

    #[test]
    fn linefeed_conversion_only() {
        assert_eq!(backslash_n_to_linefeed("a\\nb  c\t"), "a\nb  c\t");
    }

    #[test]
    fn wraps_at_last_space() {
        assert_eq!(wrap_text("the quick brown fox", 10.0, &Mono), "the\nquick\nbrown fox");
    }

    #[test]
    fn existing_newlines_reset_the_line() {
        assert_eq!(wrap_text("abcdefgh\nij kl", 10.0, &Mono), "abcdefgh\nij kl");
    }

    #[test]
    fn long_word_overflows() {
        assert_eq!(wrap_text("abcdefghijkl mn", 5.0, &Mono), "abcdefghijkl\nmn");
    }

    #[test]
    fn wrapping_only_replaces_spaces() {
        let input = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do \
                     eiusmod tempor incididunt\nut labore et dolore magna aliqua.";
        for budget in [3.0, 8.0, 15.0, 40.0, 200.0] {
            let wrapped = wrap_text(input, budget, &Mono);
            assert_eq!(wrapped.chars().count(), input.chars().count());
            let restored: String = wrapped
                .chars()
                .zip(input.chars())
                .map(|(w, o)| if w == '\n' && o == ' ' { ' ' } else { w })
                .collect();
            assert_eq!(restored, input, "budget {budget}");
        }
    }

    #[test]
    fn wide_budget_keeps_text() {
        assert_eq!(wrap_text("short text", 100.0, &Mono), "short text");
    }
}
