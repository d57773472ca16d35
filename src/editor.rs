//! Composing text in the user's `$EDITOR`

use std::io::Write;

use crate::error::Result;
use crate::launch::{LaunchMode, LaunchRequest, Launcher, ProcessRunner, Suspend, split_command};

/// Editor used when `$EDITOR` is unset or empty
const FALLBACK_EDITOR: &str = "vi";

/// Edit `content` in `$EDITOR` and return the result, trimmed
pub fn open_editor<S: Suspend>(ui: &mut S, content: &str) -> Result<String> {
    let editor = std::env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
    edit_with(ui, &editor, content)
}

/// Edit `content` with the given editor command line
pub fn edit_with<S: Suspend>(ui: &mut S, editor: &str, content: &str) -> Result<String> {
    let (program, fixed) = split_command(editor)?;

    let mut file = tempfile::Builder::new()
        .prefix("tusk-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    let request = LaunchRequest::new(
        &program,
        &fixed,
        [file.path().to_string_lossy().into_owned()],
        LaunchMode::Foreground,
    );
    ProcessRunner::new(ui).run_foreground(&request)?;

    let text = std::fs::read_to_string(file.path())?;
    Ok(text.trim().to_string())
}
