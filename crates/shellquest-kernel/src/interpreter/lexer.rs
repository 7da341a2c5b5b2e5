//! Tokenizer for command lines.
//!
//! Words are runs of non-whitespace, with double-quoted sections kept as
//! part of a single word (quotes removed). `|` is its own token unless it
//! sits inside quotes. Characters that cannot start a token, such as an
//! unbalanced `"`, are dropped.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("|")]
    Pipe,

    #[regex(r#"(?:[^ \t\r\n\f"|]+|"[^"]*")+"#, |lex| lex.slice().replace('"', ""))]
    Word(String),
}

/// A token with its byte range in the source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

impl Spanned {
    /// The word text, if this is a word.
    pub fn word(&self) -> Option<&str> {
        match &self.token {
            Token::Word(word) => Some(word),
            Token::Pipe => None,
        }
    }
}

/// Tokenize a line. Never fails.
pub fn tokenize(source: &str) -> Vec<Spanned> {
    Token::lexer(source)
        .spanned()
        .filter_map(|(token, span)| match token {
            Ok(token) => Some(Spanned { token, span }),
            Err(()) => {
                tracing::trace!(?span, "skipping unlexable input");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(source: &str) -> Vec<String> {
        tokenize(source)
            .into_iter()
            .filter_map(|t| t.word().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_splits_on_whitespace() {
        assert_eq!(words("cat   forest/trail.txt"), vec!["cat", "forest/trail.txt"]);
    }

    #[test]
    fn test_quoted_word_is_one_token() {
        assert_eq!(
            words(r#"echo "gather wood" > camp/todo.txt"#),
            vec!["echo", "gather wood", ">", "camp/todo.txt"]
        );
    }

    #[test]
    fn test_quotes_inside_word() {
        assert_eq!(words(r#"export GREETING="hi there""#), vec!["export", "GREETING=hi there"]);
    }

    #[test]
    fn test_pipe_token() {
        let tokens = tokenize("ls | grep txt");
        assert_eq!(tokens[1].token, Token::Pipe);
        assert_eq!(tokens[1].span, 3..4);
    }

    #[test]
    fn test_pipe_without_spaces() {
        let tokens = tokenize("ls|grep txt");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].token, Token::Pipe);
    }

    #[test]
    fn test_pipe_inside_quotes_is_text() {
        assert_eq!(words(r#"echo "a|b" > f"#), vec!["echo", "a|b", ">", "f"]);
    }

    #[test]
    fn test_blank_line() {
        assert!(tokenize("   \t ").is_empty());
    }
}
