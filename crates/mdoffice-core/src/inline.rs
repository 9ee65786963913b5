//! Inline emphasis for single lines of Markdown text
//!
//! Outline content lines and fallback table cells are plain strings, so
//! their emphasis is parsed here rather than by the structural parser.
//! Supported: `**bold**`, `__bold__`, `*italic*`, `_italic_`,
//! `***both***`, `` `code` `` and backslash escapes. Unmatched delimiters
//! stay literal.

use mdoffice_model::Run;

/// Split a line into styled runs
pub fn parse_runs(text: &str) -> Vec<Run> {
    let chars: Vec<char> = text.chars().collect();
    let mut parser = RunParser {
        chars: &chars,
        runs: Vec::new(),
        buf: String::new(),
        bold: false,
        italic: false,
    };
    parser.run();
    parser.runs
}

/// Concatenated text of runs, markup removed
pub fn strip_markup(text: &str) -> String {
    parse_runs(text).into_iter().map(|r| r.text).collect()
}

struct RunParser<'a> {
    chars: &'a [char],
    runs: Vec<Run>,
    buf: String,
    bold: bool,
    italic: bool,
}

impl RunParser<'_> {
    fn run(&mut self) {
        let mut i = 0;
        while i < self.chars.len() {
            let c = self.chars[i];
            match c {
                '\\' if self.chars.get(i + 1).is_some_and(|n| n.is_ascii_punctuation()) => {
                    self.buf.push(self.chars[i + 1]);
                    i += 2;
                }
                '`' => match self.find('`', i + 1) {
                    Some(close) if close > i + 1 => {
                        self.flush();
                        let code: String = self.chars[i + 1..close].iter().collect();
                        self.runs.push(Run {
                            text: code,
                            bold: self.bold,
                            italic: self.italic,
                            code: true,
                        });
                        i = close + 1;
                    }
                    _ => {
                        self.buf.push(c);
                        i += 1;
                    }
                },
                '*' | '_' => {
                    let count = self.count(c, i);
                    if c == '_' && self.intraword(i, count) {
                        self.push_literal(c, count);
                    } else {
                        self.delimiter(c, i, count);
                    }
                    i += count;
                }
                _ => {
                    self.buf.push(c);
                    i += 1;
                }
            }
        }
        self.flush();
    }

    fn delimiter(&mut self, c: char, at: usize, count: usize) {
        let width = count.min(3);
        let after = at + count;
        let toggled = match width {
            3 if self.bold && self.italic => {
                self.flush();
                self.bold = false;
                self.italic = false;
                true
            }
            3 if !self.bold && !self.italic && self.has_closing(c, 3, after) => {
                self.flush();
                self.bold = true;
                self.italic = true;
                true
            }
            2 if self.bold || self.has_closing(c, 2, after) => {
                self.flush();
                self.bold = !self.bold;
                true
            }
            1 if self.italic || self.has_closing(c, 1, after) => {
                self.flush();
                self.italic = !self.italic;
                true
            }
            _ => false,
        };

        if toggled {
            // Delimiter runs longer than three keep the surplus as text
            if count > 3 {
                self.push_literal(c, count - 3);
            }
        } else {
            self.push_literal(c, count);
        }
    }

    fn has_closing(&self, c: char, width: usize, from: usize) -> bool {
        let mut i = from;
        while i < self.chars.len() {
            if self.chars[i] == c {
                let n = self.count(c, i);
                if n >= width && i > from {
                    return true;
                }
                i += n;
            } else {
                i += 1;
            }
        }
        false
    }

    fn count(&self, c: char, from: usize) -> usize {
        self.chars[from..].iter().take_while(|&&x| x == c).count()
    }

    fn intraword(&self, at: usize, count: usize) -> bool {
        let before = at
            .checked_sub(1)
            .and_then(|p| self.chars.get(p))
            .is_some_and(|p| p.is_alphanumeric());
        let after = self
            .chars
            .get(at + count)
            .is_some_and(|n| n.is_alphanumeric());
        before && after
    }

    fn find(&self, c: char, from: usize) -> Option<usize> {
        self.chars[from.min(self.chars.len())..]
            .iter()
            .position(|&x| x == c)
            .map(|p| p + from)
    }

    fn push_literal(&mut self, c: char, count: usize) {
        for _ in 0..count {
            self.buf.push(c);
        }
    }

    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        self.runs.push(Run {
            text: std::mem::take(&mut self.buf),
            bold: self.bold,
            italic: self.italic,
            code: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(parse_runs("just text"), vec![Run::plain("just text")]);
        assert!(parse_runs("").is_empty());
    }

    #[test]
    fn test_bold_and_italic() {
        let runs = parse_runs("a **b** and *c*");
        assert_eq!(
            runs,
            vec![
                Run::plain("a "),
                Run::bold("b"),
                Run::plain(" and "),
                Run::italic("c"),
            ]
        );
    }

    #[test]
    fn test_triple_delimiter() {
        let runs = parse_runs("***both***");
        assert_eq!(runs.len(), 1);
        assert!(runs[0].bold && runs[0].italic);
    }

    #[test]
    fn test_code_span() {
        let runs = parse_runs("use `*ptr` here");
        assert_eq!(runs[1].text, "*ptr");
        assert!(runs[1].code);
        assert_eq!(runs[2].text, " here");
    }

    #[test]
    fn test_unmatched_delimiters_are_literal() {
        assert_eq!(parse_runs("2 * 3 = 6"), vec![Run::plain("2 * 3 = 6")]);
        assert_eq!(parse_runs("**open"), vec![Run::plain("**open")]);
    }

    #[test]
    fn test_intraword_underscore() {
        assert_eq!(parse_runs("snake_case_name"), vec![Run::plain("snake_case_name")]);
        assert_eq!(parse_runs("_it_"), vec![Run::italic("it")]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(parse_runs(r"\*not\*"), vec![Run::plain("*not*")]);
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("**Key** point"), "Key point");
    }
}
