use crate::error::AppError;
use crate::model::Ticket;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const SEED_ENV_VAR: &str = "MALLDESK_SEED_PATH";

#[derive(Debug, Deserialize)]
struct SeedFile {
    schema_version: u32,
    #[serde(default)]
    tickets: Vec<Ticket>,
}

pub fn seed_path_from_env() -> Option<PathBuf> {
    match std::env::var(SEED_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

/// Reads the initial tickets for a session. The file is never written back.
pub fn load_seed(path: &Path) -> Result<Vec<Ticket>, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let seed: SeedFile = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    if seed.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    tracing::debug!(
        path = %path.display(),
        tickets = seed.tickets.len(),
        "seed file loaded"
    );
    Ok(seed.tickets)
}
