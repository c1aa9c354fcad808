//! Command-line front-end for professor records.
//!
//! # Responsibility
//! - Act as composition root: build the repository once and inject it.
//! - Validate user input at the boundary before it reaches the store.

use clap::{Args, Parser, Subcommand, ValueEnum};
use professores_core::{
    bootstrap, default_log_level, format_iso_date, format_locale_date, init_logging,
    validate_patch, validate_professor, DateInput, InputFormat, IsoStyle, Persistence,
    ProfessorDraft, ProfessorId, ProfessorStore, StorageBackend, DEFAULT_STORAGE_KEY,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "professores", version, about = "Manage professor records")]
struct Cli {
    /// SQLite file holding the slot; in-memory when omitted.
    #[arg(long, env = "PROFESSORES_DB", global = true)]
    db: Option<PathBuf>,

    #[arg(
        long,
        env = "PROFESSORES_STORAGE_KEY",
        default_value = DEFAULT_STORAGE_KEY,
        global = true
    )]
    storage_key: String,

    /// Level for the rolling log files; needs `--log-dir`.
    #[arg(long, env = "PROFESSORES_LOG_LEVEL", global = true, requires = "log_dir")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long, env = "PROFESSORES_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every record as one JSON line.
    List,
    Show {
        id: ProfessorId,
    },
    Add(FieldArgs),
    Update {
        id: ProfessorId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Delete {
        id: ProfessorId,
    },
    /// Format a date the way list views show it.
    FormatDate {
        value: String,
        /// Explicit input layout, e.g. `dd/MM/yyyy`.
        #[arg(long)]
        format: Option<String>,
        #[arg(long, default_value = "pt-BR")]
        locale: String,
        /// Print an ISO string instead of a locale string.
        #[arg(long, value_enum)]
        iso: Option<IsoArg>,
    },
    /// Check core linkage.
    Ping,
}

#[derive(Debug, Clone, Default, Args)]
struct FieldArgs {
    #[arg(long)]
    nome: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    telefone: Option<String>,
    #[arg(long = "data-admissao")]
    data_admissao: Option<String>,
    #[arg(long)]
    salario: Option<f64>,
}

impl FieldArgs {
    fn into_draft(self) -> ProfessorDraft {
        ProfessorDraft {
            id: None,
            nome: self.nome,
            email: self.email,
            telefone: self.telefone,
            data_admissao: self.data_admissao,
            salario: self.salario,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IsoArg {
    Date,
    Datetime,
    #[value(name = "datetime-local")]
    DatetimeLocal,
}

impl From<IsoArg> for IsoStyle {
    fn from(value: IsoArg) -> Self {
        match value {
            IsoArg::Date => Self::Date,
            IsoArg::Datetime => Self::DateTime,
            IsoArg::DatetimeLocal => Self::DateTimeLocal,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let command = match cli.command {
        Command::Ping => {
            println!("professores_core ping={}", professores_core::ping());
            println!("professores_core version={}", professores_core::core_version());
            return Ok(());
        }
        Command::FormatDate {
            value,
            format,
            locale,
            iso,
        } => {
            let input_format = match format.as_deref() {
                Some(pattern) => Some(
                    InputFormat::from_pattern(pattern)
                        .ok_or_else(|| format!("unsupported input format `{pattern}`"))?,
                ),
                None => None,
            };
            let input = Some(DateInput::Text(value.as_str()));
            let rendered = match iso {
                Some(style) => format_iso_date(input, input_format, style.into()),
                None => format_locale_date(input, input_format, &locale),
            };
            println!("{rendered}");
            return Ok(());
        }
        record_command => record_command,
    };

    let backend = match cli.db {
        Some(path) => StorageBackend::Sqlite(path),
        None => StorageBackend::Memory,
    };
    let store = bootstrap(&backend, &cli.storage_key)?.professor_store()?;
    store.fetch_data().await;

    run_record_command(&store, command).await
}

async fn run_record_command(
    store: &ProfessorStore,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List => {
            for professor in store.entities() {
                println!("{}", serde_json::to_string(&professor)?);
            }
        }
        Command::Show { id } => match store.find_one(id) {
            Some(professor) => println!("{}", serde_json::to_string(&professor)?),
            None => println!("not found: {id}"),
        },
        Command::Add(fields) => {
            let valid = validate_professor(&fields.into_draft())?;
            match store.add(&valid.into_draft()).await {
                Some(mutation) => {
                    warn_if_volatile(&mutation.persistence);
                    println!("{}", serde_json::to_string(&mutation.value)?);
                }
                None => println!("not created"),
            }
        }
        Command::Update { id, fields } => {
            let patch = fields.into_draft();
            if patch.is_empty() {
                return Err("update needs at least one field".into());
            }
            validate_patch(&patch)?;
            match store.update(id, &patch).await {
                Some(mutation) => {
                    warn_if_volatile(&mutation.persistence);
                    println!("{}", serde_json::to_string(&mutation.value)?);
                }
                None => println!("not found: {id}"),
            }
        }
        Command::Delete { id } => {
            let existed = store.find_one(id).is_some();
            warn_if_volatile(&store.destroy(id).await);
            if existed {
                println!("deleted: {id}");
            } else {
                println!("not found: {id}");
            }
        }
        Command::FormatDate { .. } | Command::Ping => {}
    }
    Ok(())
}

fn warn_if_volatile(persistence: &Persistence) {
    if let Persistence::Failed { reason } = persistence {
        log::warn!("event=cli_persist module=cli status=error reason={reason}");
        eprintln!("warning: change kept in memory only: {reason}");
    }
}
