//! `bbank` - CLI for bloodbank
//!
//! This binary is the front end of the donor directory: it validates input,
//! calls the directory and renders the results.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use clap::Parser;

use bloodbank::cli::{Cli, Command, ConfigCommand, DonorsCommand, MessagesCommand, OutputFormat};
use bloodbank::storage::SqliteBackend;
use bloodbank::{init_logging, Config, Directory, Donor, Message, Stats};

type Dir = Directory<SqliteBackend>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match cli.command {
        Command::Stats(stats_cmd) => {
            let directory = open_directory(cli.config)?;
            handle_stats(&directory, stats_cmd.json).await
        }
        Command::Donors(donors_cmd) => {
            let directory = open_directory(cli.config)?;
            handle_donors(&directory, donors_cmd).await
        }
        Command::Messages(messages_cmd) => {
            let directory = open_directory(cli.config)?;
            handle_messages(&directory, messages_cmd).await
        }
        // Loads the file itself so a broken configuration can still be inspected.
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn open_directory(config_path: Option<PathBuf>) -> anyhow::Result<Dir> {
    let config = Config::load_from(config_path)?;
    Ok(Directory::from_config(&config)?)
}

async fn handle_stats(directory: &Dir, json: bool) -> anyhow::Result<()> {
    let stats = directory.get_stats().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

async fn handle_donors(directory: &Dir, cmd: DonorsCommand) -> anyhow::Result<()> {
    match cmd {
        DonorsCommand::List(args) => {
            let donors = directory.list_donors(&args.filter()).await?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&donors)?),
                OutputFormat::Table => print_donor_table(&donors),
                OutputFormat::Plain => donors.iter().for_each(print_donor),
            }
        }
        DonorsCommand::Show { id, json } => match directory.get_donor(&id).await? {
            Some(donor) if json => println!("{}", serde_json::to_string_pretty(&donor)?),
            Some(donor) => print_donor(&donor),
            None => anyhow::bail!("no donor with id {id}"),
        },
        DonorsCommand::Register(args) => {
            let donor = directory.create_donor(args.into_payload()?).await?;
            println!("Registered {} ({}) with id {}", donor.name, donor.blood_group, donor.id);
        }
        DonorsCommand::Update(args) => {
            let (id, patch) = args.into_patch()?;
            let donor = directory.update_donor(&id, &patch).await?;
            println!("Updated donor {}", donor.id);
            print_donor(&donor);
        }
    }
    Ok(())
}

async fn handle_messages(directory: &Dir, cmd: MessagesCommand) -> anyhow::Result<()> {
    match cmd {
        MessagesCommand::Send(args) => {
            let receipt = directory.send_message(args.into_payload()?).await?;
            println!("Message sent with id {}", receipt.id);
        }
        MessagesCommand::List { format } => {
            let messages = directory.list_messages().await;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&messages)?),
                OutputFormat::Table | OutputFormat::Plain if messages.is_empty() => {
                    println!("No messages.");
                }
                OutputFormat::Table | OutputFormat::Plain => messages.iter().for_each(print_message),
            }
        }
        MessagesCommand::Delete { id } => {
            directory.delete_message(&id).await?;
            println!("Deleted message {id}");
        }
        MessagesCommand::Clear { yes } => {
            if yes {
                directory.clear_all_messages().await?;
                println!("All messages deleted.");
            } else {
                println!("This will delete every stored message.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Directory]");
                println!("  Seed on empty:      {}", config.directory.seed_on_empty);
                println!();
                println!("[Latency]");
                println!("  Enabled:            {}", config.latency.enabled);
                println!("  Scale (%):          {}", config.latency.scale_percent);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn print_stats(stats: &Stats) {
    println!("Donors:     {}", stats.total);
    println!("Available:  {}", stats.available);
    if stats.groups.is_empty() {
        return;
    }
    println!();
    for (group, count) in &stats.groups {
        println!("  {group:<4} {count}");
    }
}

fn print_donor_table(donors: &[Donor]) {
    if donors.is_empty() {
        println!("No donors match.");
        return;
    }
    println!(
        "{:<32}  {:<20}  {:<4}  {:<12}  {:<10}  {}",
        "ID", "NAME", "BG", "CITY", "PHONE", "AVAILABLE"
    );
    for d in donors {
        println!(
            "{:<32}  {:<20}  {:<4}  {:<12}  {:<10}  {}",
            d.id,
            d.name,
            d.blood_group,
            d.city,
            d.phone,
            if d.available { "yes" } else { "no" }
        );
    }
}

fn print_donor(donor: &Donor) {
    println!("{} [{}]", donor.name, donor.id);
    println!("  Blood group:    {}", donor.blood_group);
    println!("  Age / gender:   {} / {}", donor.age, donor.gender);
    println!("  Phone:          {}", donor.phone);
    println!("  Email:          {}", donor.email);
    println!("  City:           {}", donor.city);
    match donor.last_donation_date {
        Some(date) => println!("  Last donation:  {date}"),
        None => println!("  Last donation:  -"),
    }
    println!("  Available:      {}", if donor.available { "yes" } else { "no" });
    if let Some(notes) = &donor.notes {
        println!("  Notes:          {notes}");
    }
}

fn print_message(message: &Message) {
    println!(
        "[{}] {} <{}> at {}",
        message.id,
        message.name,
        message.email,
        message.at.format("%Y-%m-%d %H:%M")
    );
    println!("  {}", message.message);
}
