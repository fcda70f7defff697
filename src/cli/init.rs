use std::path::PathBuf;

use crate::db::{get_connection, init_db, is_initialized, DB_FILE};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, DATA_DIR_ENV};

pub fn run(data_dir: Option<String>, name: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    let from_env = std::env::var(DATA_DIR_ENV).ok().filter(|d| !d.trim().is_empty());
    if let Some(dir) = data_dir.or(from_env) {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(name) = name {
        settings.user_name = name;
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;

    let db_path = resolved.join(DB_FILE);
    let existed = is_initialized(&db_path);
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    if existed {
        println!("Database already set up at {}", db_path.display());
    } else {
        tracing::info!(path = %db_path.display(), "created database");
        println!("Initialized homefinance at {}", resolved.display());
    }
    Ok(())
}
