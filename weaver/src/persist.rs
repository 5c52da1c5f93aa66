use std::{fs, path::Path};

use log::warn;

use rpcweave_shared::Module;

use crate::error::PersistError;

/// Writes `contents` next to `path` first, then renames over it, so a
/// reader never sees a half-written module
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), PersistError> {
    let write_error = |reason: String| PersistError::Write {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| write_error(error.to_string()))?;
    }

    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or("tmp")
    ));
    fs::write(&tmp_path, contents).map_err(|error| {
        write_error(format!(
            "failed to write temp file {}: {}",
            tmp_path.display(),
            error
        ))
    })?;
    fs::rename(&tmp_path, path).map_err(|error| {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            warn!("could not remove temp file {}: {}", tmp_path.display(), cleanup);
        }
        write_error(format!(
            "failed to rename {}: {}",
            tmp_path.display(),
            error
        ))
    })
}

pub fn save_module(path: &Path, module: &Module) -> Result<(), PersistError> {
    let json = serde_json::to_vec_pretty(module).map_err(|error| PersistError::Encode {
        module: module.name.clone(),
        reason: error.to_string(),
    })?;
    atomic_write(path, &json)
}

pub fn load_module(path: &Path) -> Result<Module, PersistError> {
    let bytes = fs::read(path).map_err(|error| PersistError::Read {
        path: path.display().to_string(),
        reason: error.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|error| PersistError::Decode {
        path: path.display().to_string(),
        reason: error.to_string(),
    })
}
