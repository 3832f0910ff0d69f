use clap::{CommandFactory, Parser};
use malldesk_cli::cli::{Cli, Command, collect_config_overrides};
use malldesk_cli::render;
use malldesk_core::config::{self, Config, Palette};
use malldesk_core::error::AppError;
use malldesk_core::listener::CreationCounter;
use malldesk_core::model::{Priority, Ticket, TicketStatus};
use malldesk_core::storage;
use malldesk_core::ticket_api::{StatusFilter, TicketDraft, TicketStore};
use std::io::{self, BufRead};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "MALLDESK_LOG";

struct Session {
    store: TicketStore,
    requests: CreationCounter,
    config: Config,
    palette: Palette,
}

impl Session {
    fn start(cli: &Cli) -> Result<Self, AppError> {
        let loaded = config::load_config_with_fallback();
        if let Some(err) = loaded.error.as_ref() {
            tracing::warn!(error = %err, "config ignored, using defaults");
        }
        let overrides =
            collect_config_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
        let config = config::merge_overrides(&loaded.config, &overrides);

        let tickets = if cli.no_seed {
            Vec::new()
        } else if let Some(path) = storage::seed_path_from_env().or_else(|| config.seed_path.clone())
        {
            storage::load_seed(&path)?
        } else if config.seed_demo {
            storage::fetch_demo_tickets(config.fetch_delay())
        } else {
            Vec::new()
        };

        let mut store = TicketStore::with_tickets(tickets)?;
        let requests = CreationCounter::starting_at(store.len());
        store.set_listener(requests.clone());
        tracing::debug!(tickets = store.len(), "session started");

        let palette = config::palette_for_theme(config.theme.as_deref());
        Ok(Self {
            store,
            requests,
            config,
            palette,
        })
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn print_ticket_line(verb: &str, ticket: &Ticket, palette: &Palette) {
    println!(
        "{}: {} ({}) - {}",
        verb,
        palette.accentize(ticket.category.as_str()),
        ticket.id,
        render::status_badge(ticket.status).label
    );
}

fn report_error(err: &AppError) {
    match err.validation_errors() {
        Some(errors) => {
            eprintln!(
                "ERROR: {} - Please fill all required fields correctly",
                err.code()
            );
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
        }
        None => eprintln!("ERROR: {}", err),
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    let mut quoted_token = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted_token = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted_token {
                args.push(std::mem::take(&mut current));
                quoted_token = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted_token {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(session: &mut Session, command: Command, json: bool) -> Result<(), AppError> {
    match command {
        Command::Create {
            category,
            description,
            location,
            priority,
        } => {
            let priority = priority
                .as_deref()
                .map(str::parse::<Priority>)
                .transpose()?;
            let ticket = session.store.create(TicketDraft {
                category,
                description,
                location,
                priority,
            })?;
            if json {
                println!("{}", to_json(&ticket)?);
            } else {
                print_ticket_line("Created request", &ticket, &session.palette);
            }
        }
        Command::Advance { id, status } => {
            let status: TicketStatus = status.parse()?;
            let ticket = session.store.advance_status(&id, status)?;
            if json {
                println!("{}", to_json(&ticket)?);
            } else {
                println!("Request {} status updated to {}", ticket.id, ticket.status);
            }
        }
        Command::Next { id } => {
            let ticket = session.store.advance_to_next(&id)?;
            if json {
                println!("{}", to_json(&ticket)?);
            } else {
                println!("Request {} status updated to {}", ticket.id, ticket.status);
            }
        }
        Command::List { status, search } => {
            let filter: StatusFilter = status.parse()?;
            let tickets = session.store.query(filter, &search);
            if json {
                println!("{}", to_json(&tickets)?);
            } else if tickets.is_empty() {
                println!("No maintenance requests found");
                let filtered = !search.is_empty() || filter != StatusFilter::All;
                println!("{}", session.palette.mutedize(render::empty_list_hint(filtered)));
            } else {
                println!("{}", render::tickets_table(&tickets)?);
            }
        }
        Command::Show { id } => {
            let ticket = session.store.get(&id)?;
            if json {
                println!("{}", to_json(ticket)?);
            } else {
                for line in render::ticket_details(ticket, &session.palette)? {
                    println!("{line}");
                }
            }
        }
        Command::Stats => {
            let counts = session.store.counts();
            let requests = session.requests.get();
            if json {
                println!("{}", render::stats_json(&counts, requests));
            } else {
                for line in render::stats_lines(&counts, requests) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

fn run_interactive(session: &mut Session, json: bool) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line.eq_ignore_ascii_case("help") || line == "?" {
            print_help();
            continue;
        }

        let expanded = session.config.expand_alias(line);
        let args = match split_command_line(&expanded) {
            Ok(args) => args,
            Err(err) => {
                report_error(&err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("malldesk".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                report_error(&normalize_parse_error(err));
                continue;
            }
        };

        if cli.no_seed || !cli.config_override.is_empty() {
            report_error(&AppError::invalid_input(
                "session flags cannot be changed inside a session",
            ));
            continue;
        }

        let Some(command) = cli.command else {
            print_help();
            continue;
        };

        if let Err(err) = run_command(session, command, json || cli.json) {
            report_error(&err);
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn main() {
    init_logging();

    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            report_error(&normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let mut session = match Session::start(&cli) {
        Ok(session) => session,
        Err(err) => {
            report_error(&err);
            std::process::exit(1);
        }
    };

    let result = match cli.command.take() {
        Some(command) => run_command(&mut session, command, cli.json),
        None => run_interactive(&mut session, cli.json),
    };

    if let Err(err) = result {
        report_error(&err);
        std::process::exit(1);
    }
}
