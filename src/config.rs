//! Base configuration rewriting
//!
//! The base config is a YAML key/value document, but it is never parsed into
//! a structured object: each grid cell gets a fresh line-by-line copy with
//! the swept keys substituted and every other line passed through verbatim.
//! A swept key may sit at the top level or one level deep inside a nested
//! block; the nested form is rewritten with a canonical two-space indent.

/// Breakout ATR buffer key in the base config.
pub const BREAKOUT_BUF_KEY: &str = "breakout_atr_buf";

/// Trailing-stop ATR multiplier key.
pub const TRAIL_MULT_KEY: &str = "trail_atr_mult";

/// ATR percentage cap, settable via the one-off `render` command.
pub const ATR_PCT_KEY: &str = "atr_pct_max";

/// Result of rendering a set of overrides against the base document
#[derive(Debug)]
pub struct Rendered {
    pub text: String,
    /// Keys that matched no line; the caller is expected to surface these.
    pub missing: Vec<String>,
}

/// Produce a copy of `base` with each `(key, value)` override applied to
/// every line that assigns the key. The input is left untouched; lines that
/// match no override pass through byte for byte, CR/LF included.
pub fn render_overrides(base: &str, overrides: &[(&str, f64)]) -> Rendered {
    let mut hits = vec![0usize; overrides.len()];
    let mut out_lines: Vec<String> = Vec::new();

    for segment in base.split('\n') {
        let (line, cr) = match segment.strip_suffix('\r') {
            Some(stripped) => (stripped, "\r"),
            None => (segment, ""),
        };

        let mut replaced = None;
        for (idx, (key, value)) in overrides.iter().enumerate() {
            if let Some(new_line) = override_line(line, key, *value) {
                hits[idx] += 1;
                replaced = Some(new_line);
                break;
            }
        }

        match replaced {
            Some(new_line) => out_lines.push(format!("{}{}", new_line, cr)),
            None => out_lines.push(segment.to_string()),
        }
    }

    let missing = overrides
        .iter()
        .zip(&hits)
        .filter(|(_, &count)| count == 0)
        .map(|((key, _), _)| (*key).to_string())
        .collect();

    Rendered {
        text: out_lines.join("\n"),
        missing,
    }
}

/// True when some line in `base` assigns `key`, top level or nested
pub fn has_key(base: &str, key: &str) -> bool {
    base.lines().any(|line| {
        let trimmed = line.trim_start();
        trimmed
            .strip_prefix(key)
            .map_or(false, |rest| rest.starts_with(':'))
    })
}

/// Rewrite a single line if it assigns `key`. Top-level assignments stay at
/// column zero; indented ones come back with the canonical two-space indent.
fn override_line(line: &str, key: &str, value: f64) -> Option<String> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(key)?;
    if !rest.starts_with(':') {
        return None;
    }
    let indent = if trimmed.len() < line.len() { "  " } else { "" };
    Some(format!("{}{}: {}", indent, key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "\
start: 2023-01-01
breakout_atr_buf: 0.20
strategycfg:
  trail_atr_mult: 1.00
  atr_pct_max: 0.10
max_positions: 3
";

    #[test]
    fn test_top_level_key_replaced() {
        let rendered = render_overrides("breakout_atr_buf: 0.20\n", &[(BREAKOUT_BUF_KEY, 0.25)]);
        assert_eq!(rendered.text, "breakout_atr_buf: 0.25\n");
        assert!(rendered.missing.is_empty());
    }

    #[test]
    fn test_indented_key_keeps_two_space_indent() {
        let rendered = render_overrides("  trail_atr_mult: 1.00\n", &[(TRAIL_MULT_KEY, 1.30)]);
        assert_eq!(rendered.text, "  trail_atr_mult: 1.3\n");
    }

    #[test]
    fn test_other_lines_pass_through_verbatim() {
        let rendered = render_overrides(
            BASE,
            &[(BREAKOUT_BUF_KEY, 0.25), (TRAIL_MULT_KEY, 1.30)],
        );
        let lines: Vec<&str> = rendered.text.lines().collect();

        assert_eq!(lines[0], "start: 2023-01-01");
        assert_eq!(lines[1], "breakout_atr_buf: 0.25");
        assert_eq!(lines[2], "strategycfg:");
        assert_eq!(lines[3], "  trail_atr_mult: 1.3");
        assert_eq!(lines[4], "  atr_pct_max: 0.10");
        assert_eq!(lines[5], "max_positions: 3");
        assert!(rendered.text.ends_with('\n'));
    }

    #[test]
    fn test_missing_key_reported() {
        let rendered = render_overrides("start: 2023-01-01\n", &[(BREAKOUT_BUF_KEY, 0.25)]);
        assert_eq!(rendered.text, "start: 2023-01-01\n");
        assert_eq!(rendered.missing, vec![BREAKOUT_BUF_KEY.to_string()]);
    }

    #[test]
    fn test_prefix_key_not_matched() {
        let base = "breakout_atr_buffer: 0.20\n";
        let rendered = render_overrides(base, &[(BREAKOUT_BUF_KEY, 0.25)]);
        assert_eq!(rendered.text, base);
        assert_eq!(rendered.missing.len(), 1);
    }

    #[test]
    fn test_trailing_comment_consumed_with_value() {
        let rendered = render_overrides(
            "breakout_atr_buf: 0.20   # tuned by hand\n",
            &[(BREAKOUT_BUF_KEY, 0.25)],
        );
        assert_eq!(rendered.text, "breakout_atr_buf: 0.25\n");
    }

    #[test]
    fn test_crlf_lines_preserved() {
        let base = "start: 2023-01-01\r\nbreakout_atr_buf: 0.20\r\n";
        let rendered = render_overrides(base, &[(BREAKOUT_BUF_KEY, 0.25)]);
        assert_eq!(rendered.text, "start: 2023-01-01\r\nbreakout_atr_buf: 0.25\r\n");
    }

    #[test]
    fn test_no_trailing_newline_preserved() {
        let rendered = render_overrides("breakout_atr_buf: 0.20", &[(BREAKOUT_BUF_KEY, 0.25)]);
        assert_eq!(rendered.text, "breakout_atr_buf: 0.25");
    }

    #[test]
    fn test_has_key() {
        assert!(has_key(BASE, BREAKOUT_BUF_KEY));
        assert!(has_key(BASE, TRAIL_MULT_KEY));
        assert!(!has_key(BASE, "no_such_key"));
        assert!(!has_key("breakout_atr_buffer: 1\n", BREAKOUT_BUF_KEY));
    }
}
