use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;
use todostore::config::{self, Backend, Config};
use todostore::{Filter, Priority, Record, Storage, Task, TodoStore};

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - Persisted todo list with categories")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the store (default: platform data directory)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured storage backend (sqlite, file, memory)
    #[arg(short, long)]
    backend: Option<Backend>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        #[arg(required = true)]
        text: Vec<String>,

        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short = 'g', long)]
        category: Option<String>,
    },

    /// List tasks
    List {
        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,

        /// Case-insensitive text search
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Toggle a task between active and completed
    Toggle { id: String },

    /// Replace a task's text
    Edit {
        id: String,

        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Delete a task
    Rm { id: String },

    /// Change a task's priority
    Priority { id: String, priority: Priority },

    /// Move a task to another category
    Category { id: String, label: String },

    /// Complete every task, or reopen all if everything is done
    ToggleAll,

    /// Delete every completed task
    ClearCompleted,

    /// Show total, active and completed counts
    Counts,

    /// Show completion statistics for today and this week
    Stats,

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories with their active task counts
    List,

    /// Add a category
    Add {
        name: String,

        #[arg(short, long, default_value = todostore::categories::PALETTE[0])]
        color: String,
    },

    /// Rename or recolor a category
    Edit {
        id: String,
        name: String,

        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a category, moving its tasks to "Uncategorized"
    Rm { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = cli.data_dir.clone().unwrap_or_else(config::default_data_dir);
    let config_path = cli.config.clone().unwrap_or_else(|| data_dir.join("config.yaml"));

    let mut config = Config::load(&config_path)?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let storage = config.open_storage(&data_dir)?;
    let mut store = TodoStore::with_options(storage, config.store_options());

    run(&mut store, cli.command)
}

fn run<S: Storage>(store: &mut TodoStore<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            text,
            priority,
            category,
        } => match store.add_with(&text.join(" "), priority, category.as_deref()) {
            Some(id) => println!("Added {}", short_id(&id).cyan()),
            None => println!("{}", "Nothing to add: task text is blank".yellow()),
        },
        Commands::List { filter, search } => {
            store.set_filter(filter);
            store.search(search);

            let tasks = store.list();
            if tasks.is_empty() {
                println!("{}", "No tasks".dimmed());
            }
            for task in tasks {
                print_task(task);
            }
        }
        Commands::Toggle { id } => {
            let id = resolve(store.tasks(), &id)?;
            match store.toggle_complete(&id) {
                Some(true) => println!("Completed {}", short_id(&id).cyan()),
                Some(false) => println!("Reopened {}", short_id(&id).cyan()),
                None => {}
            }
        }
        Commands::Edit { id, text } => {
            let id = resolve(store.tasks(), &id)?;
            if store.edit(&id, &text.join(" ")) {
                println!("Updated {}", short_id(&id).cyan());
            } else {
                println!("{}", "Nothing changed: task text is blank".yellow());
            }
        }
        Commands::Rm { id } => {
            let id = resolve(store.tasks(), &id)?;
            store.remove(&id);
            println!("Deleted {}", short_id(&id).cyan());
        }
        Commands::Priority { id, priority } => {
            let id = resolve(store.tasks(), &id)?;
            store.set_priority(&id, priority);
            println!("{} is now {} priority", short_id(&id).cyan(), priority);
        }
        Commands::Category { id, label } => {
            let id = resolve(store.tasks(), &id)?;
            if store.set_category(&id, &label) {
                println!("Moved {} to {}", short_id(&id).cyan(), label.trim().bold());
            } else {
                println!("{}", "Nothing changed: category is blank".yellow());
            }
        }
        Commands::ToggleAll => {
            store.toggle_all();
            let counts = store.counts();
            println!("{} active, {} completed", counts.active, counts.completed);
        }
        Commands::ClearCompleted => {
            let removed = store.clear_completed();
            println!("Cleared {} completed task(s)", removed);
        }
        Commands::Counts => {
            let counts = store.counts();
            println!(
                "{} total, {} active, {} completed",
                counts.total.to_string().bold(),
                counts.active.to_string().yellow(),
                counts.completed.to_string().green()
            );
        }
        Commands::Stats => {
            let stats = store.completion_stats(&chrono::Local::now());
            println!("Completed:      {}", stats.total_completed.to_string().bold());
            println!("Today:          {}", stats.completed_today);
            println!("This week:      {}", stats.completed_this_week);
        }
        Commands::Categories { command } => run_categories(store, command)?,
    }

    Ok(())
}

fn run_categories<S: Storage>(store: &mut TodoStore<S>, command: CategoryCommands) -> Result<()> {
    match command {
        CategoryCommands::List => {
            let summaries = store.category_summaries();
            if summaries.is_empty() {
                println!("{}", "No categories".dimmed());
            }
            for summary in summaries {
                println!(
                    "{}  {} {}  {} active",
                    short_id(&summary.category.id).dimmed(),
                    "●".truecolor_hex(&summary.category.color),
                    summary.category.name.bold(),
                    summary.active_count
                );
            }
        }
        CategoryCommands::Add { name, color } => match store.add_category(&name, &color) {
            Some(id) => println!("Added category {}", short_id(&id).cyan()),
            None => println!("{}", "Nothing to add: category name is blank".yellow()),
        },
        CategoryCommands::Edit { id, name, color } => {
            let id = resolve(store.categories(), &id)?;
            let color = match color {
                Some(color) => color,
                None => store.category(&id).map(|c| c.color.clone()).unwrap_or_default(),
            };
            if store.edit_category(&id, &name, &color) {
                println!("Updated category {}", short_id(&id).cyan());
            } else {
                println!("{}", "Nothing changed: category name is blank".yellow());
            }
        }
        CategoryCommands::Rm { id } => {
            let id = resolve(store.categories(), &id)?;
            store.delete_category(&id);
            println!("Deleted category {}", short_id(&id).cyan());
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    let check = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let text = if task.completed {
        task.text.dimmed().strikethrough()
    } else {
        task.text.normal()
    };
    let priority = match task.priority {
        Priority::High => "high".red(),
        Priority::Medium => "medium".yellow(),
        Priority::Low => "low".green(),
    };

    println!(
        "{} {} {}  {} {}",
        short_id(&task.id).dimmed(),
        check,
        text,
        priority,
        format!("#{}", task.category).blue()
    );
}

/// Last eight characters of an id, enough to address it from the CLI
fn short_id(id: &str) -> &str {
    id.char_indices().rev().nth(7).map(|(i, _)| &id[i..]).unwrap_or(id)
}

/// Find the one record whose id equals or ends with `needle`
fn resolve<T: Record>(records: &[T], needle: &str) -> Result<String> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Err(eyre!("Id cannot be empty"));
    }

    if let Some(record) = records.iter().find(|r| r.id() == needle) {
        return Ok(record.id().to_string());
    }

    let matches: Vec<&T> = records.iter().filter(|r| r.id().ends_with(needle)).collect();
    match matches.as_slice() {
        [only] => Ok(only.id().to_string()),
        [] => Err(eyre!("No {} matches id {}", T::kind(), needle)),
        _ => Err(eyre!("Id {} is ambiguous ({} {}s match)", needle, matches.len(), T::kind())),
    }
}

trait HexColor {
    fn truecolor_hex(self, hex: &str) -> colored::ColoredString;
}

impl HexColor for &str {
    fn truecolor_hex(self, hex: &str) -> colored::ColoredString {
        let channel = |range: std::ops::Range<usize>| hex.get(range).and_then(|s| u8::from_str_radix(s, 16).ok());
        match (channel(1..3), channel(3..5), channel(5..7)) {
            (Some(r), Some(g), Some(b)) => self.truecolor(r, g, b),
            _ => self.normal(),
        }
    }
}
