use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use helpdesk::config::Config;
use helpdesk::logging;
use helpdesk::rest;
use helpdesk::tickets::{Ticket, TicketStore};
use helpdesk::workflow::presentation::{emoji_for, transition_message};
use helpdesk::workflow::{TicketState, TicketStateFlowValidator};

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "Helpdesk ticket workflow engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the workflow states and their allowed transitions
    States,

    /// Check whether a state change would be accepted
    Validate {
        /// Current state label (e.g. "Pendiente")
        #[arg(long)]
        from: String,

        /// Requested state label (e.g. "En Proceso")
        #[arg(long)]
        to: String,

        /// Assigned technician id, if any
        #[arg(long)]
        technician: Option<i64>,

        /// Justification for the change
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Show the default next state on the happy path
    Next {
        /// Current state label
        state: String,
    },

    /// Manage tickets
    Ticket {
        #[command(subcommand)]
        command: TicketCommand,
    },

    /// Start the REST API server
    Api {
        /// Port to listen on (default from config: 7010)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the OpenAPI document as JSON
    Openapi,

    /// Inspect or write the project configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the effective configuration to .helpdesk/config.toml
    Init {
        /// Overwrite an existing project config
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    Show,
}

#[derive(Subcommand)]
enum TicketCommand {
    /// Open a new ticket
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Client opening the ticket
        #[arg(long)]
        client: String,
    },

    /// List tickets
    List {
        /// Only tickets in this state
        #[arg(long)]
        state: Option<String>,
    },

    /// Show a ticket with its history
    Show { id: u64 },

    /// Assign a technician
    Assign {
        id: u64,

        #[arg(long)]
        technician: i64,

        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Move a ticket to another state
    Move {
        id: u64,

        /// Target state label
        #[arg(long)]
        to: String,

        #[arg(long)]
        comment: String,

        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Move a ticket to its next state on the happy path
    Advance {
        id: u64,

        #[arg(long)]
        comment: String,

        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Rate a resolved ticket (1-5)
    Rate {
        id: u64,

        #[arg(long)]
        score: u8,

        #[arg(long)]
        comment: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_server_mode = matches!(cli.command, Commands::Api { .. });

    // File-based logging for the server, stderr for one-shot commands
    let logging_handle = logging::init_logging(&config, is_server_mode, cli.debug)?;

    let validator = TicketStateFlowValidator::new();

    match cli.command {
        Commands::States => cmd_states(&validator),
        Commands::Validate {
            from,
            to,
            technician,
            comment,
        } => cmd_validate(&validator, &from, &to, technician, &comment),
        Commands::Next { state } => {
            println!("{}", validator.next_state_str(&state));
            Ok(())
        }
        Commands::Ticket { command } => cmd_ticket(&config, command),
        Commands::Api { port } => {
            let result = cmd_api(&config, port).await;
            if let Some(log_path) = logging_handle.log_file_path {
                eprintln!("Session log: {}", log_path.display());
            }
            result
        }
        Commands::Openapi => {
            println!("{}", rest::ApiDoc::json()?);
            Ok(())
        }
        Commands::Config { command } => cmd_config(&config, command),
    }
}

fn cmd_states(validator: &TicketStateFlowValidator) -> Result<()> {
    println!("Ticket States");
    println!("{}", "─".repeat(60));

    for state in validator.all_states() {
        let allowed = validator
            .allowed_states(state)
            .iter()
            .map(TicketState::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let technician = if validator.requires_technician(state) {
            " [technician required]"
        } else {
            ""
        };

        let targets = if allowed.is_empty() {
            "(terminal)"
        } else {
            allowed.as_str()
        };

        println!(
            "{} {:<12} → {}{}",
            emoji_for(state.as_str()),
            state.as_str(),
            targets,
            technician
        );
    }

    Ok(())
}

fn cmd_validate(
    validator: &TicketStateFlowValidator,
    from: &str,
    to: &str,
    technician: Option<i64>,
    comment: &str,
) -> Result<()> {
    let result = validator.validate_transition_str(from, to, technician, comment);

    if result.is_valid {
        println!("✓ {}", transition_message(from, to));
        Ok(())
    } else {
        eprintln!("✗ {}", result.error_message);
        std::process::exit(1);
    }
}

fn cmd_ticket(config: &Config, command: TicketCommand) -> Result<()> {
    let path = config.tickets_file();
    let mut store = TicketStore::open(&path)
        .with_context(|| format!("Failed to open ticket store at {}", path.display()))?;

    match command {
        TicketCommand::Create {
            title,
            description,
            client,
        } => {
            let ticket = store.create(&title, &description, &client)?;
            println!("Created ticket #{}", ticket.id);
        }
        TicketCommand::List { state } => {
            let tickets = match state {
                Some(label) => store.list_by_state(label.parse::<TicketState>()?),
                None => store.list(),
            };

            if tickets.is_empty() {
                println!("No tickets");
                return Ok(());
            }

            println!("Tickets ({})", tickets.len());
            println!("{}", "─".repeat(60));
            for ticket in tickets {
                println!(
                    "{} #{:<4} {:<12} {}",
                    emoji_for(ticket.state.as_str()),
                    ticket.id,
                    ticket.state.as_str(),
                    ticket.title
                );
            }
        }
        TicketCommand::Show { id } => print_ticket(store.get(id)?),
        TicketCommand::Assign {
            id,
            technician,
            actor,
        } => {
            store.assign_technician(id, technician, &actor)?;
            println!("Technician {} assigned to ticket #{}", technician, id);
        }
        TicketCommand::Move {
            id,
            to,
            comment,
            actor,
        } => {
            let from = store.get(id)?.state;
            let to = to.parse::<TicketState>()?;
            store.change_state(id, to, &comment, &actor)?;
            println!(
                "#{}: {}",
                id,
                transition_message(from.as_str(), to.as_str())
            );
        }
        TicketCommand::Advance {
            id,
            comment,
            actor,
        } => {
            let from = store.get(id)?.state;
            let ticket = store.advance(id, &comment, &actor)?;
            println!(
                "#{}: {}",
                id,
                transition_message(from.as_str(), ticket.state.as_str())
            );
        }
        TicketCommand::Rate { id, score, comment } => {
            store.rate(id, score, comment.as_deref())?;
            println!("Ticket #{} rated {}/5", id, score);
        }
    }

    Ok(())
}

fn print_ticket(ticket: &Ticket) {
    println!("#{} {}", ticket.id, ticket.title);
    println!("{}", "─".repeat(60));
    println!("  Client:     {}", ticket.client);
    println!(
        "  State:      {} {}",
        emoji_for(ticket.state.as_str()),
        ticket.state
    );
    if let Some(technician) = ticket.technician_id {
        println!("  Technician: {}", technician);
    }
    if let Some(ref rating) = ticket.rating {
        println!("  Rating:     {}/5", rating.score);
    }
    if !ticket.description.is_empty() {
        println!();
        println!("{}", ticket.description);
    }

    println!();
    println!("History");
    for entry in &ticket.history {
        let from = entry
            .previous_state
            .map(|s| format!("{s} → "))
            .unwrap_or_default();
        println!(
            "  {} {}{} ({}): {}",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            from,
            entry.new_state,
            entry.actor,
            entry.comment
        );
    }
}

fn cmd_config(config: &Config, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init { force } => {
            let path = Config::project_config_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            config.save()?;
            println!("Wrote {}", path.display());
        }
        ConfigCommand::Show => {
            let toml_str =
                toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
            print!("{toml_str}");
        }
    }

    Ok(())
}

async fn cmd_api(config: &Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.api.port);

    println!("Starting REST API server...");
    println!("  Port: {}", port);
    println!("  Endpoints:");
    println!("    GET  /api/v1/health                      Health check");
    println!("    GET  /api/v1/states                      Workflow states");
    println!("    POST /api/v1/transitions/validate        Dry-run a transition");
    println!("    GET  /api/v1/tickets                     List tickets");
    println!("    POST /api/v1/tickets                     Create ticket");
    println!("    POST /api/v1/tickets/:id/transitions     Change ticket state");
    println!();

    let state = rest::ApiState::new(config.clone())?;
    rest::serve(state, &config.api.host, port).await?;

    Ok(())
}
