pub mod highlight;
pub mod output;

pub use output::{
    display_content, display_reasoning, display_tool_error, display_tool_list,
    display_tool_result,
};
