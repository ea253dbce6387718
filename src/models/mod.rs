mod reasoning;
mod session;
mod tool;

pub use reasoning::Reasoning;
pub use session::{Message, Session};
pub use tool::{FunctionCall, ToolCall};
