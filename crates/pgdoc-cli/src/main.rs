//! pgdoc: document the schema of a live PostgreSQL database as a
//! fixed-width text report.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pgdoc_core::{redact_connection_string, Error as CoreError};
use pgdoc_introspect::{introspect, CollectOptions};
use pgdoc_render::{ColumnWidths, RenderConfig, Report};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "pgdoc", version, about = "Document the schema of a PostgreSQL database")]
struct Cli {
    /// Database connection string (flag form).
    #[arg(long, value_name = "CONNECTION_STRING", conflicts_with = "conn_pos")]
    conn: Option<String>,
    /// Database connection string (positional form; DATABASE_URL is
    /// used when both are omitted).
    #[arg(value_name = "CONNECTION_STRING")]
    conn_pos: Option<String>,
    /// Schema name(s) to include; every non-system schema when omitted.
    #[arg(long, value_name = "SCHEMA")]
    schema: Vec<String>,
    /// Output file path; stdout when omitted.
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
    /// Column width strategy for the rendered grids.
    #[arg(long, value_enum, default_value = "auto")]
    column_widths: WidthsArg,
    /// Include system schemas such as pg_catalog.
    #[arg(long, default_value_t = false)]
    include_system_schemas: bool,
    /// Exclude views from the report.
    #[arg(long, default_value_t = false)]
    no_views: bool,
    /// Exclude materialized views from the report.
    #[arg(long, default_value_t = false)]
    no_materialized_views: bool,
    /// Exclude foreign tables from the report.
    #[arg(long, default_value_t = false)]
    no_foreign_tables: bool,
    /// Exclude table and column comments from the report.
    #[arg(long, default_value_t = false)]
    no_comments: bool,
    /// Exclude the constraint listings from the report.
    #[arg(long, default_value_t = false)]
    no_constraints: bool,
    /// Exclude the index listings from the report.
    #[arg(long, default_value_t = false)]
    no_indexes: bool,
    /// Timeout in seconds for each catalog query group.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WidthsArg {
    Auto,
    Fixed,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match run(cli, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Core(CoreError::Cancelled)) => {
            eprintln!("pgdoc: cancelled");
            ExitCode::from(130)
        }
        Err(err) => {
            eprintln!("pgdoc: error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr; stdout is reserved for the report itself.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<(), CliError> {
    let conn = resolve_connection(cli.conn.clone().or_else(|| cli.conn_pos.clone()))?;
    tracing::info!(url = %redact_connection_string(&conn), "connecting");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&conn)
        .await?;

    let options = CollectOptions {
        schemas: if cli.schema.is_empty() {
            None
        } else {
            Some(cli.schema.clone())
        },
        include_system_schemas: cli.include_system_schemas,
        include_views: !cli.no_views,
        include_materialized_views: !cli.no_materialized_views,
        include_foreign_tables: !cli.no_foreign_tables,
        include_comments: !cli.no_comments,
        query_timeout: Duration::from_secs(cli.timeout_secs),
    };

    let graph = introspect(&pool, &options, cancel).await?;
    tracing::info!(
        database = graph.database(),
        tables = graph.table_count(),
        "schema graph frozen"
    );

    let unresolved = graph.unresolved_foreign_keys().count();
    if unresolved > 0 {
        tracing::warn!(
            count = unresolved,
            "foreign keys reference tables outside the collected set"
        );
    }

    let config = RenderConfig {
        column_widths: match cli.column_widths {
            WidthsArg::Auto => ColumnWidths::Auto,
            WidthsArg::Fixed => ColumnWidths::Fixed,
        },
        include_constraints: !cli.no_constraints,
        include_indexes: !cli.no_indexes,
    };
    let report = Report::new(&graph, &config);

    match &cli.out {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            write_report(&report, BufWriter::new(file), cancel)?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            let stdout = io::stdout();
            write_report(&report, stdout.lock(), cancel)?;
        }
    }

    Ok(())
}

fn write_report<W: Write>(
    report: &Report<'_>,
    mut out: W,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    for line in report.lines() {
        // Cancellation during rendering just stops producing lines; the
        // distinct exit code tells the caller the document is partial.
        if cancel.is_cancelled() {
            return Err(CliError::Core(CoreError::Cancelled));
        }
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

fn resolve_connection(arg: Option<String>) -> Result<String, CliError> {
    let conn = match arg {
        Some(conn) => conn,
        None => std::env::var("DATABASE_URL").map_err(|_| {
            CliError::InvalidConfig(
                "connection string required: pass --conn, a positional argument, or set DATABASE_URL"
                    .to_string(),
            )
        })?,
    };

    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok(conn)
    } else {
        Err(CliError::InvalidConfig(format!(
            "unsupported connection string: {}",
            redact_connection_string(&conn)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_postgres_connection_strings() {
        let err = resolve_connection(Some("mysql://root@localhost/db".to_string())).unwrap_err();
        assert!(matches!(err, CliError::InvalidConfig(_)));
    }

    #[test]
    fn accepts_both_postgres_schemes() {
        assert!(resolve_connection(Some("postgres://app@db/prod".to_string())).is_ok());
        assert!(resolve_connection(Some("postgresql://app@db/prod".to_string())).is_ok());
    }
}
