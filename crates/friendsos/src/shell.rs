// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `friendsos shell` command implementation.
//!
//! An interactive REPL over a live engine. Prompts fire in the background
//! while the shell waits for input; `respond` answers them.

use std::str::FromStr;

use chrono::{TimeDelta, Utc};
use colored::Colorize;
use friendsos_checkin::CheckInEngine;
use friendsos_config::FriendsosConfig;
use friendsos_core::{CheckInId, CheckInResponse, FriendsosError, NewCheckIn, ResponseStatus};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::serve::open_engine;
use crate::status::{describe, format_remaining};

const HELP: &str = "\
commands:
  create <interval_mins> <contact[,contact...]> <message...>
         [--in <mins>] [--end <mins>] [--delay <mins>] [--max <n>] [--no-response]
  respond <id> [safe|help|emergency]
  cancel <id>
  list                 active check-ins
  history              finished check-ins
  next <id>            time until the next check
  report <id>          escalation outcome per contact
  help
  quit";

/// Options accepted by `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    pub interval_mins: u32,
    pub contacts: Vec<String>,
    pub message: String,
    pub starts_in_mins: u32,
    pub ends_after_mins: Option<u32>,
    pub escalation_delay_mins: Option<u32>,
    pub max_notifications: Option<u32>,
    pub response_required: bool,
}

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Create(CreateArgs),
    Respond { id: String, status: ResponseStatus },
    Cancel { id: String },
    List,
    History,
    Next { id: String },
    Report { id: String },
    Help,
    Quit,
}

fn parse_number(flag: &str, value: Option<&str>) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag}: '{value}' is not a whole number"))
}

fn parse_create(args: &[&str]) -> Result<CreateArgs, String> {
    let mut positional = Vec::new();
    let mut parsed = CreateArgs {
        interval_mins: 0,
        contacts: Vec::new(),
        message: String::new(),
        starts_in_mins: 0,
        ends_after_mins: None,
        escalation_delay_mins: None,
        max_notifications: None,
        response_required: true,
    };

    let mut iter = args.iter().copied();
    while let Some(arg) = iter.next() {
        match arg {
            "--in" => parsed.starts_in_mins = parse_number(arg, iter.next())?,
            "--end" => parsed.ends_after_mins = Some(parse_number(arg, iter.next())?),
            "--delay" => parsed.escalation_delay_mins = Some(parse_number(arg, iter.next())?),
            "--max" => parsed.max_notifications = Some(parse_number(arg, iter.next())?),
            "--no-response" => parsed.response_required = false,
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            word => positional.push(word),
        }
    }

    let [interval, contacts, message @ ..] = positional.as_slice() else {
        return Err("usage: create <interval_mins> <contacts> <message...>".into());
    };
    parsed.interval_mins = parse_number("interval", Some(*interval))?;
    parsed.contacts = contacts.split(',').map(str::to_string).collect();
    parsed.message = message.join(" ");
    Ok(parsed)
}

/// Parse one line of input.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, rest)) = words.split_first() else {
        return Err("empty command".into());
    };

    let id_arg = |name: &str| -> Result<String, String> {
        rest.first()
            .map(|s| s.to_string())
            .ok_or_else(|| format!("usage: {name} <id>"))
    };

    match command {
        "create" => parse_create(rest).map(ShellCommand::Create),
        "respond" => {
            let id = id_arg("respond")?;
            let status = match rest.get(1) {
                Some(s) => ResponseStatus::from_str(s)
                    .map_err(|_| format!("unknown response '{s}' (safe, help, emergency)"))?,
                None => ResponseStatus::Safe,
            };
            Ok(ShellCommand::Respond { id, status })
        }
        "cancel" => Ok(ShellCommand::Cancel {
            id: id_arg("cancel")?,
        }),
        "list" | "ls" => Ok(ShellCommand::List),
        "history" => Ok(ShellCommand::History),
        "next" => Ok(ShellCommand::Next {
            id: id_arg("next")?,
        }),
        "report" => Ok(ShellCommand::Report {
            id: id_arg("report")?,
        }),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}' (try help)")),
    }
}

/// Expand an id prefix to the single record it names.
async fn resolve_id(engine: &CheckInEngine, prefix: &str) -> Result<CheckInId, FriendsosError> {
    let mut all = engine.active_check_ins().await;
    all.extend(engine.check_in_history().await);
    let matches: Vec<CheckInId> = all
        .into_iter()
        .map(|c| c.id)
        .filter(|id| id.as_str().starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.clone()),
        [] => Err(FriendsosError::not_found(prefix)),
        _ => Err(FriendsosError::validation(
            "id",
            format!("'{prefix}' matches {} check-ins", matches.len()),
        )),
    }
}

/// Runs the `friendsos shell` interactive REPL.
pub async fn run_shell(config: FriendsosConfig) -> Result<(), FriendsosError> {
    crate::init_tracing("warn");

    let handle = open_engine(&config).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| FriendsosError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "friendsos shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "help".yellow(), "quit".yellow());

    let prompt = format!("{}> ", "friendsos".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let command = match parse_command(trimmed) {
                    Ok(command) => command,
                    Err(msg) => {
                        eprintln!("{}: {msg}", "error".red());
                        continue;
                    }
                };
                if command == ShellCommand::Quit {
                    break;
                }
                if let Err(e) = execute(&handle.engine, &config, command).await {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    handle.close().await
}

async fn execute(
    engine: &CheckInEngine,
    config: &FriendsosConfig,
    command: ShellCommand,
) -> Result<(), FriendsosError> {
    let now = Utc::now();
    match command {
        ShellCommand::Create(args) => {
            let scheduled = now + TimeDelta::minutes(i64::from(args.starts_in_mins));
            let mut params =
                NewCheckIn::new(&config.app.user_id, args.message, scheduled, args.interval_mins)
                    .with_contacts(args.contacts);
            if let Some(mins) = args.ends_after_mins {
                params = params.with_end_time(scheduled + TimeDelta::minutes(i64::from(mins)));
            }
            if let Some(mins) = args.escalation_delay_mins {
                params = params.with_escalation_delay(mins);
            }
            if let Some(max) = args.max_notifications {
                params = params.with_max_notifications(max);
            }
            params.response_required = args.response_required;

            let created = engine.create_check_in(params).await?;
            println!("created {}", created.id.to_string().bold());
        }
        ShellCommand::Respond { id, status } => {
            let id = resolve_id(engine, &id).await?;
            let updated = engine
                .respond_to_check_in(&id, CheckInResponse::new(status))
                .await?;
            println!("{}", describe(&updated, now, true));
        }
        ShellCommand::Cancel { id } => {
            let id = resolve_id(engine, &id).await?;
            let cancelled = engine.cancel_check_in(&id).await?;
            println!("{}", describe(&cancelled, now, true));
        }
        ShellCommand::List => {
            let active = engine.active_check_ins().await;
            if active.is_empty() {
                println!("{}", "no active check-ins".dimmed());
            }
            for c in &active {
                println!("{}", describe(c, now, true));
            }
        }
        ShellCommand::History => {
            let history = engine.check_in_history().await;
            if history.is_empty() {
                println!("{}", "no finished check-ins".dimmed());
            }
            for c in &history {
                println!("{}", describe(c, now, true));
            }
        }
        ShellCommand::Next { id } => {
            let id = resolve_id(engine, &id).await?;
            match engine.time_until_next_check(&id).await {
                Some(remaining) => println!("next check in {}", format_remaining(remaining.as_secs())),
                None => println!("{}", "check-in is no longer active".dimmed()),
            }
        }
        ShellCommand::Report { id } => {
            let id = resolve_id(engine, &id).await?;
            match engine.escalation_report(&id).await {
                Some(report) => {
                    println!("escalated at {}: {}", report.escalated_at.format("%H:%M:%S"), report.message);
                    for d in &report.delivered {
                        println!("  {} {} ({})", "sent".green(), d.contact_id, d.message_id.0);
                    }
                    for f in &report.failed {
                        println!("  {} {}: {}", "failed".red(), f.contact_id, f.reason);
                    }
                }
                None => println!("{}", "no escalation recorded".dimmed()),
            }
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }
    Ok(())
}
