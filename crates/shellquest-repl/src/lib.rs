//! shellquest REPL: the terminal front end for the ShellQuest kernel.
//!
//! - Line editing, history and tab completion via rustyline
//! - Session resume lines (offline coins, streak, cloud pull) on start
//! - Meta-commands: `/help`, `/quit`, `/online`, `/offline`

pub mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Editor, Helper};
use tokio::runtime::Runtime;

use shellquest_kernel::completion::CompletionCatalog;
use shellquest_kernel::store::{FileStore, KeyValueStore};
use shellquest_kernel::sync::StoreRemote;
use shellquest_kernel::{Collaborators, Kernel, KernelConfig};

pub use config::ReplConfig;

/// ANSI clear-screen plus cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const HELP_TEXT: &str = r#"ShellQuest: learn the command line one quest at a time.

Game commands:
  help, tutorial, quests, hint    Find out what to do next
  tips, banner                    Pointers and a splash screen
  stats, shop, buy <upgrade-id>   Progress and upgrades
  signup, login, logout, whoami   Accounts
  sync                            Push progress to the cloud

Meta commands:
  /help, /h, /?     Show this help
  /quit, /q         Save and exit
  /offline          Simulate losing the cloud connection
  /online           Reconnect and retry a pending sync"#;

/// REPL state: a kernel session and the runtime it runs on.
pub struct Repl {
    kernel: Option<Kernel>,
    runtime: Runtime,
    remote: Option<Arc<StoreRemote>>,
    quit: bool,
}

impl Repl {
    /// Open a session backed by the directories in `config`.
    pub fn new(config: &ReplConfig) -> Result<Self> {
        let data_dir = config.resolved_data_dir()?;
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_dir));

        let remote = config.remote_dir.as_ref().map(|dir| {
            let remote = Arc::new(StoreRemote::new(Arc::new(FileStore::new(dir))));
            remote.set_online(!config.offline);
            remote
        });
        let collaborators = match &remote {
            Some(remote) => Collaborators::with_remote(store, remote.clone()),
            None => Collaborators::local(store),
        };

        let kernel = Kernel::new(KernelConfig::default(), collaborators, Utc::now())
            .with_context(|| format!("Failed to open save in {}", data_dir.display()))?;
        Self::with_kernel(kernel, remote)
    }

    /// A throwaway session: nothing touches disk.
    pub fn in_memory() -> Result<Self> {
        Self::with_kernel(Kernel::in_memory(), None)
    }

    fn with_kernel(kernel: Kernel, remote: Option<Arc<StoreRemote>>) -> Result<Self> {
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        Ok(Self {
            kernel: Some(kernel),
            runtime,
            remote,
            quit: false,
        })
    }

    fn kernel(&mut self) -> Result<&mut Kernel> {
        self.kernel.as_mut().context("Session already closed")
    }

    /// Resume bookkeeping; returns the lines to greet the player with.
    pub fn start(&mut self) -> Result<Vec<String>> {
        let runtime = &self.runtime;
        let kernel = self.kernel.as_mut().context("Session already closed")?;
        Ok(runtime.block_on(kernel.resume(Utc::now())))
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();

        if trimmed.starts_with('/') {
            return self.handle_meta_command(trimmed);
        }
        if trimmed.is_empty() {
            return Ok(None);
        }

        let runtime = &self.runtime;
        let kernel = self.kernel.as_mut().context("Session already closed")?;
        let turn = runtime.block_on(kernel.execute(trimmed));

        let mut output = turn.lines().join("\n");
        if turn.result.clear {
            output.insert_str(0, CLEAR_SCREEN);
        }
        Ok(if output.is_empty() { None } else { Some(output) })
    }

    fn handle_meta_command(&mut self, cmd: &str) -> Result<Option<String>> {
        let command = cmd.split_whitespace().next().unwrap_or("");

        match command {
            "/quit" | "/q" | "/exit" => {
                self.quit = true;
                Ok(None)
            }
            "/help" | "/h" | "/?" => Ok(Some(HELP_TEXT.to_string())),
            "/offline" => {
                let Some(remote) = &self.remote else {
                    return Ok(Some("No cloud configured.".to_string()));
                };
                remote.set_online(false);
                Ok(Some("Cloud connection dropped.".to_string()))
            }
            "/online" => {
                let Some(remote) = self.remote.clone() else {
                    return Ok(Some("No cloud configured.".to_string()));
                };
                remote.set_online(true);
                let runtime = &self.runtime;
                let kernel = self.kernel.as_mut().context("Session already closed")?;
                let message = match runtime.block_on(kernel.retry_pending_sync()) {
                    Ok(true) => "Reconnected. Pending progress synced.".to_string(),
                    Ok(false) => "Reconnected.".to_string(),
                    Err(e) => format!("Reconnected, but sync is still pending: {e}"),
                };
                Ok(Some(message))
            }
            _ => Ok(Some(format!("Unknown meta command: {command}"))),
        }
    }

    /// True once `/quit` has been entered.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn completion_catalog(&mut self) -> Result<CompletionCatalog> {
        Ok(self.kernel()?.completion_catalog())
    }

    /// Save and flush any queued cloud push.
    pub fn shutdown(mut self) {
        if let Some(kernel) = self.kernel.take() {
            self.runtime.block_on(kernel.shutdown());
        }
    }
}

/// Completes command names and paths from the session's catalog.
#[derive(Default)]
struct QuestHelper {
    catalog: CompletionCatalog,
}

impl Completer for QuestHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let before = line.get(..pos).unwrap_or(line);
        Ok(self.catalog.candidates(before))
    }
}

impl Hinter for QuestHelper {
    type Hint = String;
}

impl Highlighter for QuestHelper {}

impl Validator for QuestHelper {}

impl Helper for QuestHelper {}

fn history_path(config: &ReplConfig) -> Option<PathBuf> {
    config
        .resolved_data_dir()
        .ok()
        .map(|dir| dir.join("history.txt"))
}

fn save_history(rl: &mut Editor<QuestHelper, DefaultHistory>, history_path: &Option<PathBuf>) {
    let Some(path) = history_path else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = rl.save_history(path) {
        tracing::warn!("Failed to save history: {}", e);
    }
}

/// Run the interactive REPL.
pub fn run(config: ReplConfig) -> Result<()> {
    println!("ShellQuest v{}", env!("CARGO_PKG_VERSION"));
    println!("Type `help` to begin, /help for meta commands, /quit to exit.\n");

    let editor_config = Config::builder()
        .max_history_size(config.history_size)
        .context("Invalid history size")?
        .auto_add_history(true)
        .build();
    let mut rl: Editor<QuestHelper, DefaultHistory> =
        Editor::with_config(editor_config).context("Failed to create editor")?;
    rl.set_helper(Some(QuestHelper::default()));

    let history_path = history_path(&config);
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    let mut repl = Repl::new(&config)?;
    for line in repl.start()? {
        println!("{line}");
    }

    loop {
        let catalog = repl.completion_catalog()?;
        if let Some(helper) = rl.helper_mut() {
            helper.catalog = catalog;
        }

        match rl.readline("quest> ") {
            Ok(line) => match repl.process_line(&line) {
                Ok(Some(output)) => println!("{output}"),
                Ok(None) => {}
                Err(e) => eprintln!("Error: {e}"),
            },
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }

        if repl.should_quit() {
            break;
        }
    }

    save_history(&mut rl, &history_path);
    repl.shutdown();
    Ok(())
}
