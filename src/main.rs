use clap::Parser;
use colored::*;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use sd_agent::agent::AgentDefinition;
use sd_agent::artifacts::FilesystemArtifactStore;
use sd_agent::cli::Args;
use sd_agent::config::{Config, JsonConfig};
use sd_agent::error::Result;
use sd_agent::models::Message;
use sd_agent::orchestrator::{self, OrchestratorContext};
use sd_agent::session::{
    create_new_session, trim_conversation_history, FilesystemSessionStore, SessionStore,
    MAX_USER_TURNS,
};
use sd_agent::tools::{ToolRegistry, ToolSettings};
use sd_agent::ui::display_tool_list;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("{} {}", "Error:".red(), e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "warn,sd_agent=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_registry(config: &Config, session_id: &str) -> ToolRegistry {
    let store = FilesystemArtifactStore::new(config.artifacts_dir.join(session_id));
    let settings = ToolSettings::from_config(config, Arc::new(store));
    ToolRegistry::new(settings, &config.tools.disabled)
}

async fn run(args: Args) -> Result<()> {
    if args.clear_history {
        FilesystemSessionStore::new()?.clear_all_sessions()?;
        println!("{}", "All conversation history cleared.".green());
        return Ok(());
    }

    if args.config_init {
        let path = JsonConfig::init_example()?;
        println!("{}", format!("Wrote example config to {}", path.display()).green());
        return Ok(());
    }

    if args.list_tools {
        // Listing tools does not need an API key.
        let config = Config::resolve(&args, JsonConfig::load()?, String::new())?;
        let registry = build_registry(&config, "list-tools");
        display_tool_list(&registry.list());
        return Ok(());
    }

    if args.command.is_empty() {
        print_usage();
        process::exit(1);
    }

    let command = args.command.join(" ");
    let config = Config::from_env_and_args(&args)?;

    let store = FilesystemSessionStore::new()?;
    let mut session = if args.new_conversation {
        create_new_session(args.agent.as_deref())
    } else if args.force_continue {
        store
            .find_latest_session()
            .unwrap_or_else(|| create_new_session(args.agent.as_deref()))
    } else {
        store
            .find_recent_session()
            .unwrap_or_else(|| create_new_session(args.agent.as_deref()))
    };

    let agent_name = args
        .agent
        .clone()
        .or_else(|| session.agent.clone())
        .or_else(|| config.agent.clone());
    let agent = AgentDefinition::named(agent_name.as_deref(), &config.model)?;
    session.agent = Some(agent.name.clone());

    if config.verbose {
        eprintln!(
            "{}",
            format!(
                "[AI] Session: {} ({} previous messages)",
                session.session_id,
                session.messages.len()
            )
            .dimmed()
        );
    }

    // The system message is rebuilt every run so the date stays current.
    let mut messages: Vec<Message> = session
        .messages
        .iter()
        .filter(|m| m.role != "system")
        .cloned()
        .collect();
    messages.insert(
        0,
        agent.system_message(&Config::get_current_date(), config.system_prompt.as_deref()),
    );
    messages.push(Message::user(command));
    trim_conversation_history(&mut messages, MAX_USER_TURNS);

    if config.verbose {
        if let Some(ref reasoning) = config.reasoning {
            eprintln!("{}", "[AI] Reasoning: enabled".dimmed());
            if let Some(ref effort) = reasoning.effort {
                eprintln!("{}", format!("[AI] Reasoning effort: {}", effort).dimmed());
            }
            if let Some(max_tokens) = reasoning.max_tokens {
                eprintln!("{}", format!("[AI] Reasoning max tokens: {}", max_tokens).dimmed());
            }
            if reasoning.exclude == Some(true) {
                eprintln!("{}", "[AI] Reasoning output: excluded".dimmed());
            }
        }
    }

    let registry = config
        .tools_enabled
        .then(|| build_registry(&config, &session.session_id));

    let reasoning_exclude = config
        .reasoning
        .as_ref()
        .and_then(|r| r.exclude)
        .unwrap_or(false);

    let context = OrchestratorContext {
        config,
        agent,
        registry,
        reasoning_exclude,
    };

    let assistant_response = orchestrator::run(&context, &mut messages).await?;

    if !assistant_response.is_empty() {
        messages.push(Message::assistant(assistant_response));
        session.messages = messages;
        session.last_updated = chrono::Local::now();

        if let Err(e) = store.save_session(&session) {
            if context.config.verbose {
                eprintln!(
                    "{}",
                    format!("[AI] Warning: Failed to save session: {}", e).dimmed()
                );
            }
            tracing::warn!(error = %e, "failed to save session");
        }
    }

    Ok(())
}

fn print_usage() {
    eprintln!("{}", "Usage: sd-agent [OPTIONS] <request>".red());
    let lines = [
        "  -n, --new                  Start a new conversation",
        "  -c, --continue             Continue previous conversation even if expired",
        "      --clear                Clear all conversation history",
        "      --agent <NAME>         Agent profile (system_dynamics_agent, pysd_model_expert)",
        "  -m, --model <ID>           Model to use",
        "  -w, --workspace <DIR>      Directory tool paths resolve against",
        "      --no-tools             Disable tools for this request",
        "      --list-tools           Print the available tools and exit",
        "      --config-init          Write an example config file and exit",
        "  -v, --verbose              Print diagnostic output",
    ];
    for line in lines {
        eprintln!("{}", line.dimmed());
    }
}
