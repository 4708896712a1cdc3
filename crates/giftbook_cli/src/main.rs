//! Terminal host for the gift book ledger.
//!
//! # Responsibility
//! - Resolve configuration, open storage and dispatch one command.
//! - Provide terminal confirmation and page selection through `inquire`.

mod config;
mod output;
mod render;

use chrono::{Local, NaiveDateTime};
use clap::Parser;
use config::{Cli, CliConfig, Command};
use giftbook_core::store::page_manager::deletable_pages;
use giftbook_core::{
    init_logging, open_db, AssumeYes, Confirmer, DbError, ExportFormat, KeyValueStore,
    LedgerService, PersistenceError, ServiceError, SqliteKeyValueStore,
};
use inquire::{Confirm, InquireError, Select, Text};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::process::ExitCode;

/// Asks on the terminal; any prompt failure counts as "no".
struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}

#[derive(Debug)]
enum CliError {
    Db(DbError),
    Persistence(PersistenceError),
    Service(ServiceError),
    Io(std::io::Error),
    Prompt(InquireError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database: {err}"),
            Self::Persistence(err) => write!(f, "storage: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Prompt(err) => write!(f, "prompt: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Prompt(err) => Some(err),
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<PersistenceError> for CliError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<InquireError> for CliError {
    fn from(value: InquireError) -> Self {
        Self::Prompt(value)
    }
}

fn main() -> ExitCode {
    let config = CliConfig::from(Cli::parse());

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CliConfig) -> Result<(), CliError> {
    let conn = open_db(&config.db_path)?;
    let kv = SqliteKeyValueStore::try_new(&conn)?;
    let mut service = LedgerService::open(kv, now())?;
    info!(
        "event=cli_command module=cli status=start command={:?} db={}",
        config.command,
        config.db_path.display()
    );

    let confirmer: &dyn Confirmer = if config.assume_yes {
        &AssumeYes
    } else {
        &TerminalConfirmer
    };

    if config.command == Command::Menu {
        return menu(&mut service, confirmer);
    }
    execute(&mut service, &config.command, confirmer)
}

fn execute<S: KeyValueStore>(
    service: &mut LedgerService<S>,
    command: &Command,
    confirmer: &dyn Confirmer,
) -> Result<(), CliError> {
    match command {
        Command::Show | Command::Print => {
            let view = service.prepare_print()?;
            print!("{}", render::render_print_view(&view, now()));
        }
        Command::Edit {
            index,
            field,
            value,
        } => {
            let outcome = service.apply_edit_raw(*index, field, value.as_str())?;
            println!(
                "record {} saved: {} | page {} subtotal ¥{} | total ¥{}",
                outcome.index,
                if outcome.record.amount_numeral.is_empty() {
                    "-"
                } else {
                    outcome.record.amount_numeral.as_str()
                },
                outcome.page,
                outcome.page_total,
                outcome.grand_total
            );
        }
        Command::AddPage => {
            let page = service.add_page()?;
            println!("added page {page}");
        }
        Command::DeletePage { page } => {
            let page = match page {
                Some(page) => *page,
                None => select_page(service)?,
            };
            let outcome = service.delete_page(page, confirmer)?;
            println!(
                "deleted page {} ({} records), {} page(s) left",
                outcome.deleted_page, outcome.removed_records, outcome.page_count
            );
        }
        Command::Title { text } => {
            service.set_event_title(text.as_str(), now())?;
            println!("event title saved");
        }
        Command::Location { text } => {
            service.set_event_location(text.as_str(), now())?;
            println!("event location saved");
        }
        Command::Save => {
            service.autosave_meta(now())?;
            println!("saved");
        }
        Command::Export { format, dir } => {
            let path = export(service, *format, dir)?;
            println!("exported {}", path.display());
        }
        Command::Clear => {
            if service.clear_all(confirmer, now())? {
                println!("all data cleared");
            } else {
                println!("cancelled");
            }
        }
        Command::Reset => {
            if service.reset(confirmer, now())? {
                println!("ledger reset to one blank page");
            } else {
                println!("cancelled");
            }
        }
        Command::Menu => {}
    }
    Ok(())
}

/// Lets the user pick a page when more than one exists. With a single page
/// the delete is attempted anyway so the core reports the rejection.
fn select_page<S: KeyValueStore>(service: &LedgerService<S>) -> Result<u32, CliError> {
    let pages = deletable_pages(service.store());
    if pages.is_empty() {
        return Ok(1);
    }
    Ok(Select::new("选择要删除的页面：", pages).prompt()?)
}

fn export<S: KeyValueStore>(
    service: &LedgerService<S>,
    format: ExportFormat,
    dir: &Path,
) -> Result<std::path::PathBuf, CliError> {
    let document = service.export(format, now())?;
    Ok(output::write_document(&document, dir)?)
}

fn menu<S: KeyValueStore>(
    service: &mut LedgerService<S>,
    confirmer: &dyn Confirmer,
) -> Result<(), CliError> {
    const ENTRIES: [&str; 10] = [
        "show", "edit", "add page", "delete page", "title", "location", "export", "clear",
        "reset", "exit",
    ];
    loop {
        let choice = Select::new("礼薄操作：", ENTRIES.to_vec()).prompt()?;
        let command = match choice {
            "show" => Command::Show,
            "edit" => {
                let index = Text::new("记录序号：").prompt()?;
                let Ok(index) = index.trim().parse() else {
                    println!("invalid index `{index}`");
                    continue;
                };
                let field = Select::new("字段：", vec!["name", "amount", "gift", "address"])
                    .prompt()?
                    .to_string();
                let value = Text::new("内容：").prompt()?;
                Command::Edit {
                    index,
                    field,
                    value,
                }
            }
            "add page" => Command::AddPage,
            "delete page" => Command::DeletePage { page: None },
            "title" => Command::Title {
                text: Text::new("礼事主题：").prompt()?,
            },
            "location" => Command::Location {
                text: Text::new("地点：").prompt()?,
            },
            "export" => {
                let format = match Select::new("格式：", vec!["word", "json"]).prompt()? {
                    "json" => ExportFormat::Json,
                    _ => ExportFormat::Word,
                };
                Command::Export {
                    format,
                    dir: ".".into(),
                }
            }
            "clear" => Command::Clear,
            "reset" => Command::Reset,
            _ => return Ok(()),
        };
        // Rejections are reported and the menu keeps running.
        match execute(service, &command, confirmer) {
            Ok(()) => {}
            Err(CliError::Service(err)) => println!("{err}"),
            Err(err) => return Err(err),
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
