// Configuration persistence module
// Writes a starter config.toml for new deployments

use std::fs;
use std::io;
use std::path::Path;

use super::types::Config;

/// Write the default configuration to `path` as TOML.
///
/// Refuses to overwrite an existing file.
pub fn write_default_config(path: &Path) -> io::Result<()> {
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }

    let rendered = toml::to_string_pretty(&Config::default())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, rendered)
}
