use colored::*;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};
use terminal_size::{terminal_size, Width};

const THEME_NAME: &str = "Solarized (dark)";
const DEFAULT_BOX_WIDTH: usize = 60;
const MAX_BOX_WIDTH: usize = 100;

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Width of the box drawn around fenced blocks, clamped to the terminal.
pub fn box_width() -> usize {
    match terminal_size() {
        Some((Width(w), _)) => (w as usize).clamp(20, MAX_BOX_WIDTH),
        None => DEFAULT_BOX_WIDTH,
    }
}

/// Syntax used for a fence label. Tool results are JSON; other labels name a language.
fn syntax_for(label: Option<&str>) -> &'static SyntaxReference {
    let set = syntax_set();
    let token = match label {
        Some(l) if l.starts_with("TOOL ERROR") || l.starts_with("REASONING") => None,
        Some(l) if l.starts_with("TOOL") => Some("json"),
        Some(l) => l.split_whitespace().next(),
        None => None,
    };
    token
        .and_then(|t| set.find_syntax_by_token(t).or_else(|| set.find_syntax_by_extension(t)))
        .unwrap_or_else(|| set.find_syntax_plain_text())
}

/// Incrementally renders markdown text, boxing and highlighting fenced code blocks.
pub struct CodeBuffer {
    buffer: String,
    in_code_block: bool,
    code_block_content: String,
    code_block_lang: Option<String>,
    displayed_lines: usize,
    width: usize,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::with_width(box_width())
    }

    pub fn with_width(width: usize) -> Self {
        Self {
            buffer: String::new(),
            in_code_block: false,
            code_block_content: String::new(),
            code_block_lang: None,
            displayed_lines: 0,
            width,
        }
    }

    fn highlight_code(&self, code: &str) -> String {
        let theme = match theme_set().themes.get(THEME_NAME) {
            Some(theme) => theme,
            None => return code.to_string(),
        };
        let mut highlighter = HighlightLines::new(syntax_for(self.code_block_lang.as_deref()), theme);
        let mut output = String::new();

        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, syntax_set()) {
                Ok(ranges) => {
                    let ranges: Vec<(Style, &str)> = ranges;
                    output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
                }
                Err(_) => output.push_str(line),
            }
        }
        output.push_str("\x1b[0m");

        output
    }

    fn header(&self) -> String {
        let label = self.code_block_lang.as_deref().unwrap_or("code");
        let used = label.chars().count() + 4;
        format!(
            "{}[{}]{}\n",
            "┌─".dimmed(),
            label.cyan(),
            "─".repeat(self.width.saturating_sub(used)).dimmed()
        )
    }

    fn footer(&self) -> String {
        format!("{}{}\n", "└".dimmed(), "─".repeat(self.width.saturating_sub(1)).dimmed())
    }

    fn render_pending_lines(&mut self, include_last: bool) -> String {
        let all_lines: Vec<&str> = self.code_block_content.lines().collect();
        let end = if include_last {
            all_lines.len()
        } else {
            all_lines.len().saturating_sub(1)
        };
        if self.displayed_lines >= end {
            return String::new();
        }
        let content = all_lines[self.displayed_lines..end].join("\n") + "\n";
        self.displayed_lines = end;
        self.highlight_code(&content)
    }

    fn reset_block(&mut self) {
        self.in_code_block = false;
        self.code_block_content.clear();
        self.code_block_lang = None;
        self.displayed_lines = 0;
    }

    pub fn append(&mut self, content: &str) -> String {
        self.buffer.push_str(content);
        let mut output = String::new();

        while !self.buffer.is_empty() {
            if !self.in_code_block {
                let Some(code_start) = self.buffer.find("```") else {
                    // Hold back trailing backticks that may start a fence.
                    let keep = self.buffer.len() - self.buffer.trim_end_matches('`').len();
                    let split = self.buffer.len() - keep.min(2);
                    output.push_str(&self.buffer[..split]);
                    self.buffer = self.buffer[split..].to_string();
                    break;
                };
                output.push_str(&self.buffer[..code_start]);
                let rest = self.buffer[code_start + 3..].to_string();

                // Wait for the whole fence line before opening the box.
                let Some(newline_pos) = rest.find('\n') else {
                    self.buffer = format!("```{}", rest);
                    break;
                };
                let lang_line = rest[..newline_pos].trim();
                self.code_block_lang = (!lang_line.is_empty()).then(|| lang_line.to_string());
                self.buffer = rest[newline_pos + 1..].to_string();
                self.in_code_block = true;
                self.code_block_content.clear();
                self.displayed_lines = 0;
                output.push_str(&self.header());
            } else if let Some(code_end) = self.buffer.find("```") {
                self.code_block_content.push_str(&self.buffer[..code_end]);
                output.push_str(&self.render_pending_lines(true));
                output.push_str(&self.footer());
                self.buffer = self.buffer[code_end + 3..].to_string();
                self.reset_block();
            } else {
                self.code_block_content.push_str(&self.buffer);
                self.buffer.clear();
                // The last line may still be growing.
                output.push_str(&self.render_pending_lines(false));
                break;
            }
        }

        output
    }

    pub fn flush(&mut self) -> String {
        let mut output = String::new();

        if self.in_code_block {
            if !self.code_block_content.is_empty() {
                output.push_str(&self.render_pending_lines(true));
                output.push_str(&self.footer());
            }
        } else if !self.buffer.is_empty() {
            output.push_str(&self.buffer);
        }

        self.buffer.clear();
        self.reset_block();

        output
    }
}

impl Default for CodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}
