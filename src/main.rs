use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};

mod ai;
mod cli;
mod extract;
mod incident;
mod orchestrator;
mod session;

use ai::GroqClient;
use cli::{Command, EnhanceArgs, ExtractArgs, RootArgs};
use incident::{IncidentDraft, IncidentRecord};
use orchestrator::{EnhancementRequest, Orchestrator, Outcome};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::Enhance(args) => cmd_enhance(args),
        Command::Extract(args) => cmd_extract(&args),
    }
}

fn cmd_enhance(args: EnhanceArgs) -> Result<()> {
    let api_key = args
        .api_key
        .or_else(|| std::env::var("GROQ_API_KEY").ok())
        .ok_or_else(|| anyhow!("no API key: pass --api-key or set GROQ_API_KEY"))?;

    let client = GroqClient::new(api_key)
        .with_endpoint(args.endpoint)
        .with_model(args.model);

    let mut orchestrator = Orchestrator::new(client);
    let mut outcome = orchestrator.start_enhancement(EnhancementRequest {
        description: args.description,
        date: args.date,
        time: args.time,
    })?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        match outcome {
            Outcome::NeedsInput { message } => {
                tracing::debug!(state = ?orchestrator.state(), "clarification requested");
                println!("{message}");
                let reply = read_line(&mut lines, "> ")?;
                outcome = orchestrator.submit_reply(&reply)?;
            }
            Outcome::Completed { draft } => {
                print_transcript(orchestrator.session());
                print_preview(&draft);
                let accepted = args.yes || {
                    let answer = read_line(&mut lines, "Accept enhancement? [y/N] ")?;
                    matches!(answer.trim(), "y" | "Y" | "yes")
                };
                if accepted {
                    let mut record = IncidentRecord::new();
                    orchestrator.accept(&mut record)?;
                    if args.json {
                        let rendered = serde_json::to_string_pretty(&record)
                            .context("serialize incident record")?;
                        println!("{rendered}");
                    } else {
                        print_record(&record);
                    }
                } else {
                    orchestrator.reject();
                    println!("Enhancement rejected.");
                }
                return Ok(());
            }
        }
    }
}

fn cmd_extract(args: &ExtractArgs) -> Result<()> {
    let info = extract::extract_incident_info(&args.text);
    if args.json {
        let rendered = serde_json::to_string_pretty(&serde_json::json!({
            "date": info.date,
            "time": info.time,
        }))
        .context("serialize extraction result")?;
        println!("{rendered}");
    } else {
        println!("date: {}", info.date);
        println!("time: {}", info.time);
    }
    Ok(())
}

fn read_line(
    lines: &mut std::io::Lines<std::io::StdinLock<'_>>,
    prompt: &str,
) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("flush prompt")?;
    let line = lines
        .next()
        .ok_or_else(|| anyhow!("input closed before the enhancement finished"))?
        .context("read reply")?;
    Ok(line)
}

fn print_transcript(session: &session::EnhancementSession) {
    if session.history.is_empty() {
        return;
    }
    println!();
    println!("Conversation transcript:");
    for turn in &session.history {
        let who = match turn.role {
            session::Role::Assistant => "AI",
            session::Role::User => "You",
        };
        println!("[{who}] {}", turn.content);
    }
}

fn print_preview(draft: &IncidentDraft) {
    println!();
    println!("Enhanced Title:");
    println!("  English:  {}", draft.title.en);
    println!("  Japanese: {}", draft.title.ja);
    println!("Category:");
    println!("  English:  {}", draft.category.en);
    println!("  Japanese: {}", draft.category.ja);
    println!("Enhanced Description:");
    println!("  English:  {}", draft.description.en);
    println!("  Japanese: {}", draft.description.ja);
    println!();
}

fn print_record(record: &IncidentRecord) {
    println!("id: {}", record.id);
    println!("date: {}  time: {}", record.date, record.time);
    println!("category: {}", record.category);
    println!("title: {} / {}", record.title.en, record.title.ja);
    println!("description (en): {}", record.description.en);
    println!("description (ja): {}", record.description.ja);
    for row in &record.evidence {
        let kind = row
            .kind
            .map(|kind| kind.as_str())
            .unwrap_or("unspecified");
        println!("evidence: {kind} {}", row.filename);
    }
}
