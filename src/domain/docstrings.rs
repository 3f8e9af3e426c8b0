//! Program name and description from the leading comment block.
//!
//! ```text
//! # Mean reversion        <- name
//! # Buys dips below the   <- description
//! # 20 sample mean.       <- description (joined with a space)
//! neg (zscore price 20)
//! ```

const DEFAULT_NAME: &str = "Algorithm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docstrings {
    pub name: String,
    pub description: Option<String>,
}

/// Text of a comment line with its leading `#`s and whitespace removed, or
/// `None` when the line is not a comment.
fn comment_text(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .starts_with('#')
        .then(|| trimmed.trim_start_matches('#').trim())
}

pub fn get_docstrings(source: &str) -> Docstrings {
    let mut lines = source.lines().map(str::trim).peekable();

    // Blank lines and empty comments before the name are ignored.
    while lines
        .next_if(|l| l.is_empty() || comment_text(l) == Some(""))
        .is_some()
    {}

    let name = match lines.next().and_then(comment_text) {
        Some(name) => name.to_string(),
        None => {
            return Docstrings {
                name: DEFAULT_NAME.to_string(),
                description: None,
            };
        }
    };

    let description: Vec<&str> = lines
        .map_while(comment_text)
        .filter(|text| !text.is_empty())
        .collect();

    Docstrings {
        name,
        description: (!description.is_empty()).then(|| description.join(" ")),
    }
}
