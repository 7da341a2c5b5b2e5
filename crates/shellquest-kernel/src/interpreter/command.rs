//! Command parsing: a raw line becomes one [`Command`] value.
//!
//! Parsing is pure and total. Anything the interpreter does not understand
//! becomes [`Command::Unknown`] so dispatch can report it.

use std::fmt;

use super::lexer::{tokenize, Spanned, Token};

/// Which simulated package manager was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Pacman,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageManager::Apt => f.write_str("apt"),
            PackageManager::Pacman => f.write_str("pacman"),
        }
    }
}

/// Every command the interpreter knows, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank input.
    Empty,

    // Session
    Help,
    Clear,
    Tutorial,
    Tips,
    Banner,
    Quests,
    Stats,
    Shop,
    Buy(Option<String>),
    Hint,

    // Filesystem
    Pwd,
    Ls(Option<String>),
    Cd(Option<String>),
    Cat(Option<String>),
    Touch(Option<String>),
    Mkdir(Option<String>),
    Rm(Option<String>),
    /// Raw text after `echo`, redirection included.
    Echo(String),
    Grep {
        pattern: Option<String>,
        path: Option<String>,
    },

    // Simulated system
    Env,
    /// Raw `KEY=value` argument text.
    Export(String),
    Ps,
    Kill(Option<String>),
    History,
    Ping(Vec<String>),
    Curl(Vec<String>),
    Package {
        manager: PackageManager,
        args: Vec<String>,
    },

    // Accounts
    Signup(Option<String>),
    Login(Option<String>),
    Logout,
    Whoami,
    Sync,

    /// `<command> | grep <pattern>`.
    Pipeline {
        left: Box<Command>,
        pattern: String,
    },

    /// Unrecognized command word, or an unsupported pipe shape (whole line).
    Unknown(String),
}

/// Names offered by `help` and tab completion.
pub const COMMAND_NAMES: &[&str] = &[
    "help", "tutorial", "tips", "banner", "clear", "quests", "stats", "shop", "buy", "hint", "pwd", "ls", "cd",
    "cat", "touch", "mkdir", "rm", "echo", "grep", "env", "export", "ps", "kill", "history",
    "ping", "curl", "apt", "pacman", "signup", "login", "logout", "whoami", "sync",
];

/// Parse a raw input line.
pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    let tokens = tokenize(trimmed);

    let pipes: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.token == Token::Pipe)
        .map(|(idx, _)| idx)
        .collect();

    match pipes.as_slice() {
        [] => parse_simple(trimmed, &tokens),
        [idx] => {
            let right = &tokens[idx + 1..];
            if right.first().and_then(Spanned::word) != Some("grep") {
                return Command::Unknown(trimmed.to_string());
            }
            let pattern = right[1..]
                .iter()
                .filter_map(Spanned::word)
                .collect::<Vec<_>>()
                .join(" ");
            let left_end = tokens[*idx].span.start;
            let left = parse_simple(&trimmed[..left_end], &tokens[..*idx]);
            Command::Pipeline {
                left: Box::new(left),
                pattern,
            }
        }
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Parse a pipe-free token run. `source` is the text the spans index into.
fn parse_simple(source: &str, tokens: &[Spanned]) -> Command {
    let Some(first) = tokens.first() else {
        return Command::Empty;
    };
    let Some(name) = first.word() else {
        return Command::Unknown(source.trim().to_string());
    };

    let args: Vec<String> = tokens[1..]
        .iter()
        .filter_map(Spanned::word)
        .map(str::to_string)
        .collect();
    let arg = |n: usize| args.get(n).cloned();

    match name {
        "help" => Command::Help,
        "clear" => Command::Clear,
        "tutorial" => Command::Tutorial,
        "tips" => Command::Tips,
        "banner" => Command::Banner,
        "quests" => Command::Quests,
        "stats" => Command::Stats,
        "shop" => Command::Shop,
        "buy" => Command::Buy(arg(0)),
        "hint" => Command::Hint,
        "pwd" => Command::Pwd,
        "ls" => Command::Ls(arg(0)),
        "cd" => Command::Cd(arg(0)),
        "cat" => Command::Cat(arg(0)),
        "touch" => Command::Touch(arg(0)),
        "mkdir" => Command::Mkdir(arg(0)),
        "rm" => Command::Rm(arg(0)),
        "echo" => Command::Echo(source[first.span.end..].trim().to_string()),
        "grep" => Command::Grep {
            pattern: arg(0),
            path: arg(1),
        },
        "env" => Command::Env,
        "export" => Command::Export(args.join(" ")),
        "ps" => Command::Ps,
        "kill" => Command::Kill(arg(0)),
        "history" => Command::History,
        "ping" => Command::Ping(args),
        "curl" => Command::Curl(args),
        "apt" => Command::Package {
            manager: PackageManager::Apt,
            args,
        },
        "pacman" => Command::Package {
            manager: PackageManager::Pacman,
            args,
        },
        "signup" => Command::Signup(arg(0)),
        "login" => Command::Login(arg(0)),
        "logout" => Command::Logout,
        "whoami" => Command::Whoami,
        "sync" => Command::Sync,
        other => Command::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pwd", Command::Pwd)]
    #[case("ls", Command::Ls(None))]
    #[case("ls forest", Command::Ls(Some("forest".into())))]
    #[case("cd ..", Command::Cd(Some("..".into())))]
    #[case("  whoami  ", Command::Whoami)]
    #[case("kill 202", Command::Kill(Some("202".into())))]
    #[case("buy xp-boost", Command::Buy(Some("xp-boost".into())))]
    #[case("tips", Command::Tips)]
    #[case("banner", Command::Banner)]
    #[case("", Command::Empty)]
    fn parses_simple_commands(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse(line), expected);
    }

    #[test]
    fn test_unknown_uses_command_word() {
        assert_eq!(parse("dance wildly"), Command::Unknown("dance".into()));
    }

    #[test]
    fn test_echo_keeps_raw_rest() {
        assert_eq!(
            parse(r#"echo "needle line" > notes.txt"#),
            Command::Echo(r#""needle line" > notes.txt"#.into())
        );
    }

    #[test]
    fn test_grep_arguments() {
        assert_eq!(
            parse("grep roots forest/trail.txt"),
            Command::Grep {
                pattern: Some("roots".into()),
                path: Some("forest/trail.txt".into()),
            }
        );
    }

    #[test]
    fn test_package_manager() {
        assert_eq!(
            parse("pacman -S htop"),
            Command::Package {
                manager: PackageManager::Pacman,
                args: vec!["-S".into(), "htop".into()],
            }
        );
    }

    #[test]
    fn test_pipeline_to_grep() {
        assert_eq!(
            parse("ls | grep txt"),
            Command::Pipeline {
                left: Box::new(Command::Ls(None)),
                pattern: "txt".into(),
            }
        );
    }

    #[test]
    fn test_pipeline_left_echo_sees_only_left_text() {
        let Command::Pipeline { left, .. } = parse(r#"echo "a" > f | grep a"#) else {
            panic!("expected pipeline");
        };
        assert_eq!(*left, Command::Echo(r#""a" > f"#.into()));
    }

    #[rstest]
    #[case("ls | wc")]
    #[case("ls | grep a | grep b")]
    #[case("ls |")]
    fn unsupported_pipes_are_unknown(#[case] line: &str) {
        assert_eq!(parse(line), Command::Unknown(line.into()));
    }
}
