//! Folded stack output writer.
//!
//! One line per collapsed stack, `<path> <microseconds>`, the format
//! consumed by flamegraph renderers.

use crate::aggregator::CollapsedStack;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write folded lines to any writer
///
/// **Public** - used for stdout and files alike
pub fn write_folded<W: Write>(stacks: &[CollapsedStack], writer: W) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(writer);

    for stack in stacks {
        writeln!(writer, "{}", stack)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write folded lines to a file
///
/// **Public** - main entry point for file output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
pub fn write_folded_file(
    stacks: &[CollapsedStack],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing folded stacks to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory: {}", e))
            })?;
        }
    }

    let file = File::create(output_path)?;
    write_folded(stacks, file)?;

    info!("{} stacks written", stacks.len());

    Ok(())
}

/// Validate output path
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn stacks() -> Vec<CollapsedStack> {
        vec![
            CollapsedStack::new("{main}".to_string(), 302.0),
            CollapsedStack::new("{main};a".to_string(), 189.5),
        ]
    }

    #[test]
    fn test_write_folded_to_buffer() {
        let mut out = Vec::new();
        write_folded(&stacks(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{main} 302.000000\n{main};a 189.500000\n"
        );
    }

    #[test]
    fn test_write_folded_file() {
        let temp_file = NamedTempFile::new().unwrap();
        write_folded_file(&stacks(), temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "{main} 302.000000\n{main};a 189.500000\n");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/out.folded");

        write_folded_file(&stacks(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(validate_output_path(temp_dir.path()).is_err());
    }
}
