//! Command-line embed renderer.
//!
//! Usage: `termlink <db-path> [content]`
//!
//! Opens (and migrates) the database, expands every known embed in
//! `content` (or stdin when omitted) and prints the result.
//! `TERMLINK_CONFIG` may point at a JSON config file.

use std::io::Read;
use std::process::ExitCode;
use termlink_core::db::open_db;
use termlink_core::{
    init_logging, AssociationRenderer, AssociationStore, CoreConfig, CrossTermPostQuery,
    EmbedRenderer, SqlitePostRepository, SqliteTermMetaRepository, SqliteTermRepository,
};

const USAGE: &str = "usage: termlink <db-path> [content]";

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("termlink: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<String, String> {
    let mut args = args.into_iter();
    let db_path = args.next().ok_or_else(|| USAGE.to_string())?;
    if db_path == "--version" {
        return Ok(format!("termlink {}", termlink_core::core_version()));
    }

    let config = match std::env::var("TERMLINK_CONFIG") {
        Ok(path) => CoreConfig::load(&path).map_err(|err| err.to_string())?,
        Err(_) => CoreConfig::default(),
    };
    if let Some(dir) = config.logging.dir.as_deref() {
        init_logging(&config.logging.level, dir)?;
    }

    let content = match args.next() {
        Some(content) => content,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("failed to read stdin: {err}"))?;
            buffer
        }
    };

    let conn = open_db(&db_path).map_err(|err| err.to_string())?;
    let associations = AssociationRenderer::new(
        SqliteTermRepository::with_site(&conn, config.site.clone()),
        AssociationStore::new(SqliteTermMetaRepository::new(&conn)),
    );
    let posts = CrossTermPostQuery::new(
        SqliteTermRepository::with_site(&conn, config.site.clone()),
        SqlitePostRepository::with_site(&conn, config.site.clone()),
    );
    log::debug!("event=cli_render module=cli status=start bytes={}", content.len());

    let expanded = EmbedRenderer::new(&associations, &posts).expand(&content);
    Ok(expanded)
}
