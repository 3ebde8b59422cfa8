// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Line-oriented config file editing.
//!
//! Every target adapter edits config files that it does not own. Thus, the
//! only acceptable change to such a file is a rewrite of the exact lines that
//! an adapter matched. Everything else must survive byte-for-byte, including
//! line terminators, carriage returns, and a missing final newline.
//!
//! # Atomic Writes
//!
//! Edited content is written to a temporary sibling of the target file first,
//! and then renamed over the target. An interrupted run can leave a config
//! surface in a mixed-theme state, but never with a half-written file.
//!
//! Dotfiles are commonly symlinked into place from a repository. The rename
//! happens next to the file that the symlink resolves to, so the symlink
//! itself stays intact.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{self, read_to_string},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Read, edit, and write back a single config file.
#[derive(Clone, Debug)]
pub struct ConfigDrafter {
    path: PathBuf,
}

impl ConfigDrafter {
    /// Construct new drafter for target file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of target file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Read target file into a [`LineEdit`].
    ///
    /// # Errors
    ///
    /// - Return [`Error::Missing`] if target file does not exist.
    /// - Return [`Error::Read`] if target file cannot be read.
    pub fn read(&self) -> Result<LineEdit> {
        read_to_string(&self.path)
            .map(LineEdit::from)
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => Error::Missing {
                    path: self.path.clone(),
                },
                _ => Error::Read {
                    source: err,
                    path: self.path.clone(),
                },
            })
    }

    /// Edit lines of target file.
    ///
    /// Reads target file into [`LineEdit`] instance, and lets the editor
    /// rewrite lines before writing the results back. Nothing is written
    /// if the editor left every line as it was.
    ///
    /// # Errors
    ///
    /// - Return [`Error::Missing`] if target file does not exist.
    /// - Return [`Error::Read`] if target file cannot be read.
    /// - Return [`Error::Write`] if edited content cannot be written back.
    #[instrument(skip(self, editor), fields(path = %self.path.display()), level = "debug")]
    pub fn edit<E, T>(&self, editor: E) -> Result<Drafted<T>>
    where
        E: FnOnce(&mut LineEdit) -> T,
    {
        let mut lines = self.read()?;
        let value = editor(&mut lines);

        if !lines.changed {
            debug!("no change to {:?}", self.path.display());
            return Ok(Drafted {
                value,
                written: false,
            });
        }

        self.write_atomic(lines.to_string().as_bytes())?;
        info!("updated {:?}", self.path.display());

        Ok(Drafted {
            value,
            written: true,
        })
    }

    fn write_atomic(&self, contents: &[u8]) -> Result<()> {
        let write_err = |source| Error::Write {
            source,
            path: self.path.clone(),
        };

        // INVARIANT: Replace the file a symlink points to, never the symlink.
        let target = fs::canonicalize(&self.path).map_err(write_err)?;
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = target.with_file_name(format!(".{file_name}.theme-switch.tmp"));

        // INVARIANT: Keep permissions, e.g., executable window manager scripts.
        let result = fs::write(&temp, contents)
            .and_then(|_| fs::metadata(&target))
            .and_then(|metadata| fs::set_permissions(&temp, metadata.permissions()))
            .and_then(|_| fs::rename(&temp, &target))
            .map_err(write_err);

        // INVARIANT: Never leave a partially written temporary file behind.
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }

        result
    }
}

/// Result of [`ConfigDrafter::edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drafted<T> {
    /// Value returned by the editor.
    pub value: T,

    /// Whether target file was rewritten.
    pub written: bool,
}

/// Line terminator of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Lf,
    CrLf,
    None,
}

impl Ending {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    ending: Ending,
}

/// Line editor.
///
/// # Invariant
///
/// - Rendering an unedited buffer yields the exact bytes it was built from.
/// - Only lines passed to [`LineEdit::replace`] with new text can change.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineEdit {
    lines: Vec<Line>,
    changed: bool,
}

impl LineEdit {
    /// Construct new empty line editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if there are no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text of line at index without its terminator.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|line| line.text.as_str())
    }

    /// Iterate through line text without terminators.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }

    /// Replace text of line at index, keeping its terminator.
    ///
    /// Does nothing if index is out of bounds, or the text is identical.
    pub fn replace(&mut self, index: usize, text: impl Into<String>) {
        let text = text.into();
        if let Some(line) = self.lines.get_mut(index) {
            if line.text != text {
                line.text = text;
                self.changed = true;
            }
        }
    }

    /// Rewrite every line that the rewriter returns new text for.
    ///
    /// Returns the number of lines the rewriter matched, whether or not the
    /// text actually changed.
    pub fn rewrite_each<F>(&mut self, mut rewriter: F) -> usize
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut matched = 0;
        for index in 0..self.lines.len() {
            if let Some(text) = rewriter(&self.lines[index].text) {
                matched += 1;
                self.replace(index, text);
            }
        }

        matched
    }

    /// Check if any line was changed.
    pub fn changed(&self) -> bool {
        self.changed
    }
}

impl Display for LineEdit {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        for line in &self.lines {
            fmt.write_str(&line.text)?;
            fmt.write_str(line.ending.as_str())?;
        }

        Ok(())
    }
}

impl From<&str> for LineEdit {
    fn from(content: &str) -> Self {
        let lines = content
            .split_inclusive('\n')
            .map(|raw| {
                if let Some(text) = raw.strip_suffix("\r\n") {
                    Line {
                        text: text.to_string(),
                        ending: Ending::CrLf,
                    }
                } else if let Some(text) = raw.strip_suffix('\n') {
                    Line {
                        text: text.to_string(),
                        ending: Ending::Lf,
                    }
                } else {
                    Line {
                        text: raw.to_string(),
                        ending: Ending::None,
                    }
                }
            })
            .collect();

        Self {
            lines,
            changed: false,
        }
    }
}

impl From<String> for LineEdit {
    fn from(content: String) -> Self {
        Self::from(content.as_str())
    }
}

/// Config file editing error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Target file does not exist.
    #[error("target file {:?} does not exist", path.display())]
    Missing { path: PathBuf },

    /// Target file cannot be read from.
    #[error("failed to read from {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Target file cannot be written to.
    #[error("failed to write to {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_edit_preserves_bytes() {
        let content = "first\r\nsecond\n\nlast without newline";
        let lines = LineEdit::from(content);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.get(0), Some("first"));
        assert_eq!(lines.get(2), Some(""));
        assert_eq!(lines.to_string(), content);
    }

    #[test]
    fn line_edit_replace_keeps_terminator() {
        let mut lines = LineEdit::from("one\r\ntwo\r\n");
        lines.replace(0, "uno");
        assert!(lines.changed());
        assert_eq!(lines.to_string(), "uno\r\ntwo\r\n");
    }

    #[test]
    fn line_edit_identical_replace_is_not_a_change() {
        let mut lines = LineEdit::from("one\ntwo\n");
        lines.replace(1, "two");
        lines.replace(7, "out of bounds");
        assert!(!lines.changed());
    }

    #[test]
    fn line_edit_rewrite_each_counts_matches() {
        let mut lines = LineEdit::from(indoc! {r#"
            keep
            #match
            match
        "#});
        let matched = lines.rewrite_each(|text| {
            text.ends_with("match")
                .then(|| text.trim_start_matches('#').to_string())
        });
        assert_eq!(matched, 2);
        assert_eq!(lines.to_string(), "keep\nmatch\nmatch\n");
    }

    #[test]
    fn drafter_reports_missing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let drafter = ConfigDrafter::new(dir.path().join("nope.conf"));
        let result = drafter.edit(|_| ());
        assert!(matches!(result, Err(Error::Missing { .. })));
        Ok(())
    }

    #[test]
    fn drafter_only_writes_when_changed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tmux.conf");
        fs::write(&path, "set -g status-bg black\n")?;
        let drafter = ConfigDrafter::new(&path);

        let result = drafter.edit(|_| ())?;
        assert!(!result.written);

        let result = drafter.edit(|lines| lines.replace(0, "set -g status-bg white"))?;
        assert!(result.written);
        assert_eq!(fs::read_to_string(&path)?, "set -g status-bg white\n");

        // No temporary file is left behind.
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);

        Ok(())
    }

    #[test]
    fn failed_write_leaves_no_temporary_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("polybar");
        fs::create_dir(&target)?;
        fs::write(target.join("config.ini"), "[colors]\n")?;

        // Renaming a file over a non-empty directory fails after the
        // temporary file was fully written.
        let result = ConfigDrafter::new(&target).write_atomic(b"[colors]\n");

        assert!(matches!(result, Err(Error::Write { .. })));
        let names = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from("polybar")]);

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn drafter_keeps_symlink_and_permissions() -> anyhow::Result<()> {
        use std::os::unix::fs::{symlink, PermissionsExt};

        let dir = tempfile::tempdir()?;
        let real = dir.path().join("bspwmrc.real");
        let link = dir.path().join("bspwmrc");
        fs::write(&real, "feh --bg-fill old.png &\n")?;
        fs::set_permissions(&real, fs::Permissions::from_mode(0o755))?;
        symlink(&real, &link)?;

        ConfigDrafter::new(&link).edit(|lines| lines.replace(0, "feh --bg-fill new.png &"))?;

        assert!(fs::symlink_metadata(&link)?.file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real)?, "feh --bg-fill new.png &\n");
        assert_eq!(fs::metadata(&real)?.permissions().mode() & 0o777, 0o755);

        Ok(())
    }
}
