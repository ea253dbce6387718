use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "sd-agent")]
#[command(
    about = "Run system dynamics simulations through natural-language requests",
    long_about = None
)]
pub struct Args {
    #[arg(short = 'n', long = "new", help = "Start a new conversation")]
    pub new_conversation: bool,

    #[arg(
        short = 'c',
        long = "continue",
        help = "Continue previous conversation even if expired"
    )]
    pub force_continue: bool,

    #[arg(long = "clear", help = "Clear all conversation history")]
    pub clear_history: bool,

    #[arg(
        long = "agent",
        help = "Agent profile to use (system_dynamics_agent, pysd_model_expert)"
    )]
    pub agent: Option<String>,

    #[arg(short = 'm', long = "model", help = "Model identifier to send requests to")]
    pub model: Option<String>,

    #[arg(
        short = 'w',
        long = "workspace",
        help = "Directory that relative tool paths resolve against"
    )]
    pub workspace: Option<String>,

    #[arg(long = "no-tools", help = "Disable tools for this query")]
    pub no_tools: bool,

    #[arg(
        long = "max-tool-rounds",
        help = "Maximum number of tool-calling rounds before forcing an answer"
    )]
    pub max_tool_rounds: Option<usize>,

    #[arg(
        long = "list-tools",
        help = "Print the tools offered to the model and exit"
    )]
    pub list_tools: bool,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostic output")]
    pub verbose: bool,

    #[arg(
        long = "reasoning-effort",
        help = "Set reasoning effort level (high, medium, low)"
    )]
    pub reasoning_effort: Option<String>,

    #[arg(
        long = "reasoning-max-tokens",
        help = "Set maximum tokens for reasoning"
    )]
    pub reasoning_max_tokens: Option<u32>,

    #[arg(
        long = "reasoning-exclude",
        help = "Use reasoning but exclude from response"
    )]
    pub reasoning_exclude: bool,

    #[arg(
        long = "reasoning-enabled",
        help = "Enable reasoning with default parameters"
    )]
    pub reasoning_enabled: bool,

    #[arg(long = "config-init", help = "Write an example config file and exit")]
    pub config_init: bool,

    #[arg(
        long = "api-endpoint",
        help = "Custom API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(help = "Request to send to the agent")]
    pub command: Vec<String>,
}
