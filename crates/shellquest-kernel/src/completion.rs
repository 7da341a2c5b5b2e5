//! Tab completion over command names and filesystem paths.

use crate::interpreter::COMMAND_NAMES;
use crate::vfs::VirtualFileSystem;

/// What completion can offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionCatalog {
    pub commands: Vec<String>,
    /// Paths relative to the CWD, directories and files alike.
    pub paths: Vec<String>,
}

/// Result of completing an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Exactly one candidate: the line with the active token replaced.
    Complete { line: String, matches: Vec<String> },
    /// Several candidates; the line is unchanged.
    Suggest(Vec<String>),
    None,
}

impl CompletionCatalog {
    /// Every command name plus every path below the CWD.
    pub fn build(vfs: &VirtualFileSystem) -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
            paths: vfs.paths_below_cwd(),
        }
    }

    /// Byte offset where the active (last) token starts, and the candidates
    /// matching it. The first token completes against commands, later ones
    /// against paths.
    pub fn candidates(&self, input: &str) -> (usize, Vec<String>) {
        let lead = input.len() - input.trim_start().len();
        let trimmed = &input[lead..];
        let (start, pool) = match trimmed.rfind(char::is_whitespace) {
            None => (0, &self.commands),
            Some(idx) => {
                let width = trimmed[idx..].chars().next().map_or(1, char::len_utf8);
                (idx + width, &self.paths)
            }
        };
        let active = &trimmed[start..];
        let matches = pool
            .iter()
            .filter(|c| c.starts_with(active))
            .cloned()
            .collect();
        (lead + start, matches)
    }

    pub fn complete(&self, input: &str) -> Completion {
        let (start, matches) = self.candidates(input);
        match matches.as_slice() {
            [] => Completion::None,
            [only] => Completion::Complete {
                line: format!("{}{only}", input[..start].trim_start()),
                matches,
            },
            _ => Completion::Suggest(matches),
        }
    }
}
