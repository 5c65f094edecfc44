//! Persisted pre-prompt text.
//!
//! A flat file (`preprompt.txt`) read and written wholesale, no partial
//! updates. Only administrators may change it; the permission check lives at
//! the command boundary, this module just does the I/O.

use std::io;
use std::path::Path;
use tracing::info;

/// Read the whole pre-prompt. `Ok(None)` when no pre-prompt has been set yet.
pub fn read(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replace the pre-prompt wholesale, creating the parent directory if needed.
pub fn write(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    info!("Preprompt: wrote {} chars to {:?}", text.chars().count(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preprompt.txt");
        assert_eq!(read(&path).unwrap(), None);
    }

    #[test]
    fn write_then_read_round_trips_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("preprompt.txt");

        write(&path, "You are a terse assistant.").unwrap();
        assert_eq!(
            read(&path).unwrap().as_deref(),
            Some("You are a terse assistant.")
        );

        // A second write replaces, never appends.
        write(&path, "Short.").unwrap();
        assert_eq!(read(&path).unwrap().as_deref(), Some("Short."));
    }
}
