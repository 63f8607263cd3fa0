//! Opening a log file in the user's editor.

use crate::model::EditorError;
use crate::prefs::EditorCommand;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

/// Start the editor on `file` at `line` and return without waiting.
///
/// The child's standard streams are detached so it cannot draw over the
/// terminal UI.
///
/// # Errors
///
/// Returns `EditorError::EmptyCommand` for a blank template and
/// `EditorError::Spawn` when the program cannot be started.
pub fn launch_editor(command: &EditorCommand, file: &Path, line: usize) -> Result<(), EditorError> {
    let argv = command.render(&file.to_string_lossy(), line);
    let Some((program, args)) = argv.split_first() else {
        return Err(EditorError::EmptyCommand);
    };

    info!(%program, file = %file.display(), line, "Launching editor");
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| EditorError::Spawn {
            program: program.clone(),
            source,
        })?;
    Ok(())
}
