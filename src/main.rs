//! ShopList Command Line
//!
//! Wires configuration, logging, the HTTP remote, the item catalog and the
//! entry list together, runs one command and prints the resulting list.

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Parser, Subcommand};

use shoplist::config::API_URL_ENV;
use shoplist::{
    Config, EntryCollection, EntryHandle, HttpRemote, ItemCatalog, ListView, RemoteClient, ShopListError,
    ShopListResult, FAILURE_NOTICE,
};

/// Shopping list client for a ShopList API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, default_value = "shoplist.json")]
    config: PathBuf,

    /// API base URL, overrides the configuration file
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the list
    List,
    /// Add an item at the end of the list
    Add { name: String, amount: u32 },
    /// Change the amount of a listed item
    Set { name: String, amount: String },
    /// Swap an item with the one below it
    Move { name: String },
    /// Take an item off the list
    Remove { name: String },
}

/// Prints notices; the list itself is printed once the command settles
struct TerminalView;

impl ListView for TerminalView {
    fn invalid_input(&self, message: &str) {
        eprintln!("Invalid input: {}", message);
    }

    fn show_failure(&self, message: &str) {
        eprintln!("{}", message);
    }
}

fn print_list(list: &EntryCollection) {
    if list.is_empty() {
        println!("(the list is empty)");
        return;
    }
    for entry in list.entries() {
        println!(
            "{:>4}  {:<24} {:>5}  {}",
            entry.position(),
            entry.item_name(),
            entry.amount(),
            entry.state().as_str()
        );
    }
}

fn find(list: &EntryCollection, view: &TerminalView, name: &str) -> ShopListResult<EntryHandle> {
    list.find_by_name(name).ok_or_else(|| {
        let error = ShopListError::Validation(format!("{} is not in the list", name));
        view.invalid_input(&error.to_string());
        error
    })
}

async fn bootstrap(config: &Config, view: Rc<TerminalView>) -> ShopListResult<EntryCollection> {
    let remote: Rc<dyn RemoteClient> = Rc::new(HttpRemote::new(config.api_url.clone()));
    let catalog = Rc::new(ItemCatalog::new(remote.clone()));
    catalog.refresh().await?;

    let list = EntryCollection::new(remote, catalog, view);
    list.load().await?;
    Ok(list)
}

async fn execute(list: &EntryCollection, view: &TerminalView, command: Command) -> ShopListResult<()> {
    match command {
        Command::List => {}
        Command::Add { name, amount } => {
            list.create(&name, amount).await?;
        }
        Command::Set { name, amount } => {
            let entry = find(list, view, &name)?;
            list.start_edit(&entry);
            if !list.commit_edit(&entry, &amount).await? {
                eprintln!("{} is busy", name);
            }
        }
        Command::Move { name } => {
            let entry = find(list, view, &name)?;
            if !list.move_down(&entry).await? {
                eprintln!("{} cannot move down", name);
            }
        }
        Command::Remove { name } => {
            let entry = find(list, view, &name)?;
            if !list.delete(&entry).await? {
                eprintln!("{} is busy", name);
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config.with_api_url(args.api_url),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = rolling_logger::init_logger(&config.log_dir, &config.app_name) {
        eprintln!("Logging disabled: {}", e);
    }
    log::info!("Using ShopList API at {}", config.api_url);

    let view = Rc::new(TerminalView);
    let list = match bootstrap(&config, view.clone()).await {
        Ok(list) => list,
        Err(e) => {
            log::error!("Startup failed: {}", e);
            eprintln!("{}", FAILURE_NOTICE);
            return ExitCode::FAILURE;
        }
    };

    let outcome = execute(&list, &view, args.command).await;
    print_list(&list);
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("Command failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
