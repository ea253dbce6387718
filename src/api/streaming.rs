use crate::api::models::StreamResponse;
use crate::error::{Result, SdAgentError};
use crate::ui::highlight::CodeBuffer;
use colored::*;
use futures::StreamExt;
use std::io::{self, Write};
use std::time::Instant;
use tokio::time::{timeout, Duration};

pub struct StreamingResult {
    pub content: String,
    pub reasoning: String,
}

/// A parsed server-sent-events line.
#[derive(Debug, PartialEq, Eq)]
pub enum SseLine<'a> {
    Data(&'a str),
    Done,
    Other { field: &'a str, value: &'a str },
    Ignored,
}

pub fn parse_sse_line(line: &str) -> SseLine<'_> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() || line.starts_with(':') {
        return SseLine::Ignored;
    }
    let Some(colon_pos) = line.find(':') else {
        return SseLine::Ignored;
    };
    let field = line[..colon_pos].trim();
    let value = line[colon_pos + 1..].trim_start();
    match field {
        "data" if value == "[DONE]" => SseLine::Done,
        "data" => SseLine::Data(value),
        _ => SseLine::Other { field, value },
    }
}

/// Renders the streamed reasoning and content as they arrive.
struct StreamRenderer {
    code_buffer: CodeBuffer,
    reasoning_code_buffer: CodeBuffer,
    reasoning_exclude: bool,
    reasoning_open: bool,
    reasoning_tail: String,
    last_flush: Instant,
}

impl StreamRenderer {
    const FLUSH_INTERVAL: Duration = Duration::from_millis(50);

    fn new(reasoning_exclude: bool) -> Self {
        Self {
            code_buffer: CodeBuffer::new(),
            reasoning_code_buffer: CodeBuffer::new(),
            reasoning_exclude,
            reasoning_open: false,
            reasoning_tail: String::new(),
            last_flush: Instant::now(),
        }
    }

    fn maybe_flush(&mut self) -> io::Result<()> {
        if self.last_flush.elapsed() > Self::FLUSH_INTERVAL {
            io::stdout().flush()?;
            self.last_flush = Instant::now();
        }
        Ok(())
    }

    fn reasoning(&mut self, text: &str) -> io::Result<()> {
        if self.reasoning_exclude {
            return Ok(());
        }
        if !self.reasoning_open {
            println!();
            print!("{}", self.reasoning_code_buffer.append("```REASONING\n"));
            self.reasoning_open = true;
        }
        let cleaned = text.replace("**", "");
        self.reasoning_tail = cleaned.clone();
        print!("{}", self.reasoning_code_buffer.append(&cleaned));
        self.maybe_flush()
    }

    fn close_reasoning(&mut self) {
        if !self.reasoning_open {
            return;
        }
        let sep = if self.reasoning_tail.ends_with('\n') { "" } else { "\n" };
        print!("{}", self.reasoning_code_buffer.append(&format!("{}```", sep)));
        let remaining = self.reasoning_code_buffer.flush();
        if !remaining.is_empty() {
            print!("{}", remaining.trim_end());
        }
        println!();
        self.reasoning_open = false;
        self.reasoning_tail.clear();
    }

    fn content(&mut self, text: &str) -> io::Result<()> {
        if !text.trim().is_empty() {
            self.close_reasoning();
        }
        let formatted = self.code_buffer.append(text);
        if !formatted.is_empty() {
            print!("{}", formatted);
            self.maybe_flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.close_reasoning();
        let remaining = self.code_buffer.flush();
        if !remaining.is_empty() {
            print!("{}", remaining.trim_end());
        }
        println!();
        io::stdout().flush()
    }
}

pub async fn process_streaming_response(
    response: reqwest::Response,
    timeout_secs: u64,
    reasoning_exclude: bool,
    verbose: bool,
) -> Result<StreamingResult> {
    let mut stream = response.bytes_stream();
    let mut renderer = StreamRenderer::new(reasoning_exclude);
    let mut pending = String::new();
    let mut assistant_response = String::new();
    let mut reasoning_response = String::new();
    let chunk_timeout = Duration::from_secs(timeout_secs);

    'stream: loop {
        match timeout(chunk_timeout, stream.next()).await {
            Ok(Some(chunk)) => {
                let chunk = chunk.map_err(SdAgentError::NetworkError)?;
                pending.push_str(&String::from_utf8_lossy(&chunk));
            }
            Ok(None) => break,
            Err(_) => {
                renderer.finish()?;
                eprintln!(
                    "{}",
                    format!(
                        "Error: Connection timeout - no data received for {} seconds",
                        timeout_secs
                    )
                    .red()
                );
                eprintln!(
                    "{}",
                    "The AI service may be experiencing issues or the connection was lost."
                        .dimmed()
                );
                return Err(SdAgentError::Timeout);
            }
        }

        // Only complete lines are parsed; the tail waits for the next chunk.
        while let Some(line_end) = pending.find('\n') {
            let line: String = pending.drain(..=line_end).collect();

            match parse_sse_line(line.trim_end_matches('\n')) {
                SseLine::Done => break 'stream,
                SseLine::Data(value) => match serde_json::from_str::<StreamResponse>(value) {
                    Ok(parsed) => {
                        for delta in parsed
                            .choices
                            .unwrap_or_default()
                            .into_iter()
                            .filter_map(|c| c.delta)
                        {
                            if let Some(reasoning) = delta.reasoning {
                                reasoning_response.push_str(&reasoning);
                                renderer.reasoning(&reasoning)?;
                            }
                            if let Some(content) = delta.content {
                                assistant_response.push_str(&content);
                                renderer.content(&content)?;
                            }
                        }
                    }
                    Err(e) => {
                        if verbose {
                            eprintln!("{}", format!("[AI] JSON parse error: {}", e).dimmed());
                        }
                    }
                },
                SseLine::Other { field, value } => {
                    if verbose {
                        eprintln!("{}", format!("[AI] SSE {}: {}", field, value).dimmed());
                    }
                }
                SseLine::Ignored => {}
            }
        }
    }

    renderer.finish()?;

    Ok(StreamingResult {
        content: assistant_response,
        reasoning: reasoning_response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_line() {
        assert_eq!(parse_sse_line("data: {\"a\":1}"), SseLine::Data("{\"a\":1}"));
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_sse_line(": OPENROUTER PROCESSING"), SseLine::Ignored);
        assert_eq!(parse_sse_line(""), SseLine::Ignored);
        assert_eq!(
            parse_sse_line("event: ping\r"),
            SseLine::Other {
                field: "event",
                value: "ping"
            }
        );
    }
}
