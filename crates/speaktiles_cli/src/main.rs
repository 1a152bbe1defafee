//! Command-line entry point.
//!
//! # Responsibility
//! - Smoke-check `speaktiles_core` linkage outside the app shell.
//! - Export, import and share boards stored in a local database file.

use clap::{Parser, Subcommand};
use log::info;
use speaktiles_core::db::open_db;
use speaktiles_core::service::share_codec::share_link;
use speaktiles_core::{
    core_version, default_log_level, export_file_name, export_json, import_from_url, import_json,
    init_logging, ping, BoardStore, Commit, SqliteKvRepository,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "speaktiles", version, about = "SpeakTiles board tools")]
struct Cli {
    /// Board database file; created and migrated on first use.
    #[arg(long, global = true, default_value = "speaktiles.sqlite3")]
    db: PathBuf,
    /// Absolute directory for rolling log files; logging stays off without it.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core ping and version.
    Ping,
    /// List categories and tile counts.
    Show,
    /// Write the board as pretty JSON.
    Export {
        /// Output file or directory; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the board with a JSON file.
    Import { file: PathBuf },
    /// Print a share link for the board.
    ShareLink { page_url: String },
    /// Apply the board carried by a share link.
    OpenLink { url: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir)?;
    }

    match cli.command {
        Command::Ping => {
            println!("speaktiles_core ping={}", ping());
            println!("speaktiles_core version={}", core_version());
            Ok(())
        }
        Command::Show => with_store(&cli.db, |store| {
            let board = store.board();
            println!("board name={:?} tiles={}", board.name, board.tile_count());
            for category in &board.categories {
                println!(
                    "category id={} name={:?} tiles={}",
                    category.id,
                    category.name,
                    category.tiles.len()
                );
            }
            Ok(())
        }),
        Command::Export { out } => with_store(&cli.db, |store| {
            let board = store.board();
            let contents = export_json(board).map_err(|err| format!("export failed: {err}"))?;
            match out {
                None => println!("{contents}"),
                Some(out) => {
                    let target = if out.is_dir() {
                        out.join(export_file_name(&board.name))
                    } else {
                        out
                    };
                    std::fs::write(&target, contents)
                        .map_err(|err| format!("cannot write {}: {err}", target.display()))?;
                    println!("exported {}", target.display());
                }
            }
            Ok(())
        }),
        Command::Import { file } => {
            let contents = std::fs::read_to_string(&file)
                .map_err(|err| format!("cannot read {}: {err}", file.display()))?;
            with_store(&cli.db, |store| {
                let commit = import_json(store, &contents).map_err(|err| err.to_string())?;
                report_commit("import", commit)
            })
        }
        Command::ShareLink { page_url } => {
            let page = parse_url(&page_url)?;
            with_store(&cli.db, |store| {
                let link = share_link(&page, store.board()).map_err(|err| err.to_string())?;
                println!("{link}");
                Ok(())
            })
        }
        Command::OpenLink { url } => {
            let url = parse_url(&url)?;
            with_store(&cli.db, |store| {
                let Some(import) = import_from_url(store, &url) else {
                    return Err("url carries no #board= token".to_string());
                };
                println!("cleaned_url={}", import.cleaned_url);
                let commit = import.outcome.map_err(|err| err.to_string())?;
                report_commit("open-link", commit)
            })
        }
    }
}

fn with_store(
    db: &Path,
    f: impl FnOnce(&mut BoardStore<SqliteKvRepository<'_>>) -> Result<(), String>,
) -> Result<(), String> {
    let conn = open_db(db).map_err(|err| format!("cannot open {}: {err}", db.display()))?;
    let mut store = BoardStore::open(SqliteKvRepository::new(&conn));
    f(&mut store)
}

fn report_commit(operation: &str, commit: Commit) -> Result<(), String> {
    match commit {
        Commit::Unchanged => println!("{operation}: board unchanged"),
        Commit::Persisted => {
            info!("event=cli_command module=cli status=ok operation={operation}");
            println!("{operation}: board saved");
        }
        Commit::PersistFailed(err) => return Err(format!("{operation}: board not saved: {err}")),
    }
    Ok(())
}

fn parse_url(raw: &str) -> Result<Url, String> {
    Url::parse(raw.trim()).map_err(|err| format!("invalid url `{raw}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::{CommandFactory, Parser};
    use speaktiles_core::db::open_db;
    use speaktiles_core::{demo_board, export_json, BoardStore, SqliteKvRepository};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_db_flag_follows_subcommand() {
        let cli = Cli::try_parse_from(["speaktiles", "export", "--db", "x.db", "--out", "y.json"])
            .expect("parse");
        assert_eq!(cli.db.to_str(), Some("x.db"));
        assert!(matches!(cli.command, Command::Export { out: Some(_) }));
    }

    #[test]
    fn import_then_export_round_trips_through_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("board.db");
        let input = dir.path().join("in.json");
        let mut board = demo_board();
        board.name = "Home Board".to_string();
        std::fs::write(&input, export_json(&board).expect("json")).expect("write");

        let db_arg = db.to_str().expect("utf8 path");
        let import = Cli::try_parse_from([
            "speaktiles",
            "--db",
            db_arg,
            "import",
            input.to_str().expect("utf8"),
        ])
        .expect("parse");
        run(import).expect("import");

        let out_dir = dir.path().to_str().expect("utf8");
        let export = Cli::try_parse_from(["speaktiles", "--db", db_arg, "export", "--out", out_dir])
            .expect("parse");
        run(export).expect("export");

        let exported =
            std::fs::read_to_string(dir.path().join("home-board-board.json")).expect("exported");
        assert_eq!(
            speaktiles_core::Board::from_json(&exported).expect("board"),
            board
        );

        let conn = open_db(&db).expect("db");
        let store = BoardStore::open(SqliteKvRepository::new(&conn));
        assert_eq!(store.board().name, "Home Board");
    }

    #[test]
    fn open_link_without_token_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("board.db");
        let cli = Cli::try_parse_from([
            "speaktiles",
            "--db",
            db.to_str().expect("utf8"),
            "open-link",
            "https://tiles.example/",
        ])
        .expect("parse");
        assert!(run(cli).is_err());
    }
}
