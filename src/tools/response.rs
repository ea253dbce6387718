use serde::{Deserialize, Serialize};

/// The `status` field every tool result carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    pub fn from_success(ok: bool) -> Self {
        if ok {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// Lossily decode captured output, keeping at most `max_bytes` of it.
pub fn truncate_output(bytes: &[u8], max_bytes: u64) -> String {
    let limit = usize::try_from(max_bytes).unwrap_or(usize::MAX);
    if bytes.len() <= limit {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let mut text = String::from_utf8_lossy(&bytes[..limit]).into_owned();
    text.push_str(&format!("\n... [truncated {} bytes]", bytes.len() - limit));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_output() {
        assert_eq!(truncate_output(b"hello", 10), "hello");
        assert_eq!(truncate_output(b"hello world", 5), "hello\n... [truncated 6 bytes]");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Status::Failure).unwrap(), "\"failure\"");
    }
}
