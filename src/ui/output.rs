use crate::tools::Tool;
use crate::ui::highlight::CodeBuffer;
use colored::*;

/// Print `body` inside a fenced block labelled `label`.
fn display_block(label: &str, body: &str) {
    let sep = if body.ends_with('\n') { "" } else { "\n" };
    let block = format!("```{}\n{}{}```", label, body, sep);
    display_content(&block);
}

/// Display a tool result in a boxed, JSON-highlighted block
pub fn display_tool_result(name: &str, result: &str) {
    display_block(&format!("TOOL: {}", name), result);
}

pub fn display_tool_error(name: &str, error: &str) {
    display_block(&format!("TOOL ERROR: {}", name), error);
}

/// Display reasoning content in a boxed format
pub fn display_reasoning(reasoning: &str) {
    let cleaned = reasoning.replace("**", "");
    println!();
    display_block("REASONING", cleaned.trim());
}

/// Display content with syntax highlighting
pub fn display_content(content: &str) {
    let mut code_buffer = CodeBuffer::new();
    let formatted = code_buffer.append(content);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
    let remaining = code_buffer.flush();
    if !remaining.is_empty() {
        print!("{}", remaining.trim_end());
    }
    println!();
}

/// `--list-tools` output: name, then the first line of the description.
pub fn display_tool_list(tools: &[&Tool]) {
    if tools.is_empty() {
        println!("{}", "No tools are enabled.".yellow());
        return;
    }
    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for tool in tools {
        let summary = tool.description.lines().next().unwrap_or_default();
        println!("{}  {}", format!("{:width$}", tool.name, width = width).cyan(), summary.dimmed());
    }
}
