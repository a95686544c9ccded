//! The interactive control panel.
//!
//! Every user-facing operation lives here, so the one-shot subcommands and
//! the interactive loop render results the same way. Dispatch decisions
//! come from [`crate::checker`], [`crate::query`] and
//! [`crate::system_action`]; processes are started through
//! [`crate::process`].

use crate::checker::{CLEAN_MESSAGE, FileActionResolver, UNSUPPORTED_MESSAGE};
use crate::config::Config;
use crate::error::DeskError;
use crate::process;
use crate::query::classify;
use crate::scanner::{DIGEST_NAME, HashScanner};
use crate::system_action::{SystemAction, command_for};
use crate::theme as t;
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// How an operation ended, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The user declined a confirmation.
    Cancelled,
    /// Input was rejected (blank query, no action selected).
    Warning,
    /// The operation ran and found something: checker output or a threat.
    Flagged,
    /// A process could not be launched or the file could not be read.
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Done | Outcome::Cancelled => 0,
            Outcome::Warning | Outcome::Flagged | Outcome::Failed => 1,
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

pub struct Panel<R, W> {
    reader: R,
    out: W,
    resolver: FileActionResolver,
    scanner: HashScanner,
    dry_run: bool,
    assume_yes: bool,
}

impl<R: AsyncBufRead + Unpin, W: Write> Panel<R, W> {
    pub fn new(config: &Config, reader: R, out: W) -> Self {
        Self {
            reader,
            out,
            resolver: FileActionResolver::new(config.checker.clone()),
            scanner: HashScanner::new(&config.scanner),
            dry_run: false,
            assume_yes: false,
        }
    }

    /// Print what would run instead of running it.
    pub fn dry_run(mut self, on: bool) -> Self {
        self.dry_run = on;
        self
    }

    /// Skip confirmation prompts.
    pub fn assume_yes(mut self, on: bool) -> Self {
        self.assume_yes = on;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn warn(&mut self, message: &str) -> Result<Outcome> {
        writeln!(self.out, "{}", t::icon_warn(message))?;
        Ok(Outcome::Warning)
    }

    fn fail(&mut self, err: &DeskError) -> Result<Outcome> {
        tracing::error!(error = %err, "operation failed");
        writeln!(self.out, "{}", t::icon_fail(&format!("Error: {err}")))?;
        Ok(Outcome::Failed)
    }

    async fn confirm(&mut self, question: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let answer = prompt_line(
            &mut self.reader,
            &mut self.out,
            &format!("{} ", t::accent(&format!("{question} [y/N]:"))),
        )
        .await?;
        Ok(answer
            .map(|a| a.trim().eq_ignore_ascii_case("y") || a.trim().eq_ignore_ascii_case("yes"))
            .unwrap_or(false))
    }

    /// Run the checker for `path` and stream its output.
    pub async fn check(&mut self, path: &str) -> Result<Outcome> {
        let command = self.resolver.resolve(path);
        if !command.is_supported() {
            writeln!(self.out, "{}", t::muted(UNSUPPORTED_MESSAGE))?;
            return Ok(Outcome::Done);
        }

        if self.dry_run {
            writeln!(self.out, "would run: {}", t::info(&command.display()))?;
            let program = command.program().unwrap_or_default();
            if !process::program_available(program) {
                writeln!(
                    self.out,
                    "{}",
                    t::muted(&format!("note: {program} was not found on PATH"))
                )?;
            }
            return Ok(Outcome::Done);
        }

        let out = &mut self.out;
        let mut write_err = None;
        let result = process::run_check(&command, |line| {
            if let Err(e) = writeln!(out, "{line}") {
                write_err.get_or_insert(e);
            }
        })
        .await;
        if let Some(e) = write_err {
            return Err(e.into());
        }

        match result {
            Ok(report) if report.is_clean() => {
                writeln!(self.out, "{}", t::icon_ok(CLEAN_MESSAGE))?;
                Ok(Outcome::Done)
            }
            Ok(report) => {
                tracing::debug!(lines = report.lines.len(), code = ?report.exit_code, "checker reported issues");
                Ok(Outcome::Flagged)
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Classify a query and open the resulting URL.
    pub fn search(&mut self, raw: &str) -> Result<Outcome> {
        let query = match classify(raw) {
            Ok(query) => query,
            Err(e) => return self.warn(&e.to_string()),
        };

        writeln!(self.out, "{}", t::label_value(&query.kind.to_string(), &query.destination))?;
        if self.dry_run {
            writeln!(
                self.out,
                "would run: {}",
                t::info(&process::url_opener_argv(&query.destination).join(" "))
            )?;
            return Ok(Outcome::Done);
        }
        match process::open_url(&query.destination) {
            Ok(()) => Ok(Outcome::Done),
            Err(e) => self.fail(&e),
        }
    }

    /// Run a system action, asking first when the action needs it.
    pub async fn action(&mut self, action: SystemAction) -> Result<Outcome> {
        let command = match command_for(action) {
            Ok(command) => command,
            Err(e) => return self.warn(&e.to_string()),
        };

        if command.requires_confirmation && !self.confirm(&action.confirmation_prompt()).await? {
            writeln!(self.out, "{}", t::muted("Cancelled."))?;
            return Ok(Outcome::Cancelled);
        }

        if self.dry_run {
            writeln!(self.out, "would run: {}", t::info(&command.command_line))?;
            return Ok(Outcome::Done);
        }
        match process::spawn_detached(&command.command_line) {
            Ok(()) => {
                writeln!(self.out, "{}", t::icon_ok(&format!("{} started", action.label())))?;
                Ok(Outcome::Done)
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Hash a file and compare it with the known-threat list.
    pub fn scan(&mut self, path: &Path) -> Result<Outcome> {
        let verdict = match self.scanner.scan(path) {
            Ok(verdict) => verdict,
            Err(e) => return self.fail(&e),
        };
        writeln!(self.out, "{DIGEST_NAME}: {}", t::info(&verdict.digest))?;
        if verdict.threat {
            writeln!(self.out, "{}", t::icon_fail(verdict.message()))?;
            Ok(Outcome::Flagged)
        } else {
            writeln!(self.out, "{}", t::icon_ok(verdict.message()))?;
            Ok(Outcome::Done)
        }
    }

    /// Print the action menu, placeholder first.
    pub fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out, "{}", t::heading("System Control Panel"))?;
        writeln!(self.out, "  {} {}", t::muted("0)"), t::muted(&SystemAction::None.label()))?;
        for (i, action) in SystemAction::menu().enumerate() {
            writeln!(self.out, "  {} {}", t::accent(&format!("{})", i + 1)), action.label())?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "  search <text>   web search, or open a URL")?;
        writeln!(self.out, "  check <path>    check a .java or .py file")?;
        writeln!(self.out, "  scan <path>     compare a file against known hashes")?;
        writeln!(self.out, "  help            show this menu")?;
        writeln!(self.out, "  quit            leave the panel")?;
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match word.to_ascii_lowercase().as_str() {
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "help" | "menu" | "?" => self.print_menu()?,
            "search" | "s" => {
                self.search(rest)?;
            }
            "check" | "c" => {
                if rest.trim().is_empty() {
                    self.warn("Usage: check <path>")?;
                } else {
                    self.check(rest.trim()).await?;
                }
            }
            "scan" => {
                if rest.trim().is_empty() {
                    self.warn("Usage: scan <path>")?;
                } else {
                    self.scan(Path::new(rest.trim()))?;
                }
            }
            _ => {
                let action = match line.parse::<usize>() {
                    Ok(n) if n >= 1 => SystemAction::menu().nth(n - 1).unwrap_or(SystemAction::None),
                    Ok(_) => SystemAction::None,
                    Err(_) => SystemAction::from_label(line),
                };
                if action == SystemAction::None && line.parse::<usize>().is_err() {
                    self.warn(&format!("Unknown command '{word}'. Type 'help' for the menu."))?;
                } else {
                    self.action(action).await?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Read commands until `quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        self.print_menu()?;
        loop {
            let Some(line) = prompt_line(&mut self.reader, &mut self.out, &t::accent("> ")).await? else {
                break;
            };
            if let Flow::Quit = self.handle_line(&line).await? {
                break;
            }
        }
        Ok(())
    }
}

/// Print a prompt and read one line. `None` at end of input.
async fn prompt_line<R>(reader: &mut R, out: &mut impl Write, prompt: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    write!(out, "{}", prompt)?;
    out.flush()?;
    let mut buf = String::new();
    if reader.read_line(&mut buf).await? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(
        buf.trim_end_matches('\n').trim_end_matches('\r').to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::AsyncWriteExt;

    fn panel(input: &str) -> Panel<Cursor<Vec<u8>>, Vec<u8>> {
        t::disable_color();
        Panel::new(&Config::default(), Cursor::new(input.as_bytes().to_vec()), Vec::new())
            .dry_run(true)
    }

    fn output(panel: Panel<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(panel.into_output()).unwrap()
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::Done.exit_code(), 0);
        assert_eq!(Outcome::Cancelled.exit_code(), 0);
        assert_eq!(Outcome::Warning.exit_code(), 1);
        assert_eq!(Outcome::Flagged.exit_code(), 1);
        assert_eq!(Outcome::Failed.exit_code(), 1);
    }

    #[test]
    fn blank_search_warns() {
        let mut p = panel("");
        assert_eq!(p.search("   ").unwrap(), Outcome::Warning);
        assert!(output(p).contains("Please enter a search query."));
    }

    #[test]
    fn search_dry_run_shows_destination() {
        let mut p = panel("");
        assert_eq!(p.search("hello world").unwrap(), Outcome::Done);
        let out = output(p);
        assert!(out.contains("google"));
        assert!(out.contains("https://www.google.com/search?q=hello+world"));
        assert!(out.contains("would run:"));
    }

    #[tokio::test]
    async fn none_action_warns() {
        let mut p = panel("");
        assert_eq!(p.action(SystemAction::None).await.unwrap(), Outcome::Warning);
        assert!(output(p).contains("Please select a valid action."));
    }

    #[tokio::test]
    async fn declined_confirmation_runs_nothing() {
        let mut p = panel("n\n");
        assert_eq!(p.action(SystemAction::Shutdown).await.unwrap(), Outcome::Cancelled);
        let out = output(p);
        assert!(out.contains("Are you sure you want to Shutdown?"));
        assert!(!out.contains("would run"));
    }

    #[tokio::test]
    async fn end_of_input_declines() {
        let mut p = panel("");
        assert_eq!(p.action(SystemAction::Sleep).await.unwrap(), Outcome::Cancelled);
    }

    #[tokio::test]
    async fn accepted_confirmation_runs() {
        let mut p = panel("y\n");
        assert_eq!(p.action(SystemAction::LogOff).await.unwrap(), Outcome::Done);
        assert!(output(p).contains("would run: shutdown -l"));
    }

    #[tokio::test]
    async fn assume_yes_skips_prompt() {
        let mut p = panel("").assume_yes(true);
        assert_eq!(p.action(SystemAction::Shutdown).await.unwrap(), Outcome::Done);
        let out = output(p);
        assert!(!out.contains("Are you sure"));
        assert!(out.contains("would run: shutdown -s -t 0"));
    }

    #[tokio::test]
    async fn launchers_do_not_prompt() {
        let mut p = panel("");
        assert_eq!(p.action(SystemAction::OpenNotepad).await.unwrap(), Outcome::Done);
        let out = output(p);
        assert!(!out.contains("Are you sure"));
        assert!(out.contains("would run: notepad"));
    }

    #[tokio::test]
    async fn unsupported_check_is_informational() {
        let mut p = panel("");
        assert_eq!(p.check("notes.txt").await.unwrap(), Outcome::Done);
        assert!(output(p).contains(UNSUPPORTED_MESSAGE));
    }

    #[tokio::test]
    async fn check_dry_run_shows_argv() {
        let mut p = panel("");
        assert_eq!(p.check("App.java").await.unwrap(), Outcome::Done);
        assert!(output(p).contains("would run: javac App.java"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn check_streams_output_and_flags() {
        t::disable_color();
        let mut config = Config::default();
        config.checker.java_compiler = "echo".to_string();
        let mut p = Panel::new(&config, Cursor::new(Vec::new()), Vec::new());
        assert_eq!(p.check("Broken.java").await.unwrap(), Outcome::Flagged);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Broken.java"));
        assert!(!out.contains(CLEAN_MESSAGE));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_check_is_clean() {
        t::disable_color();
        let mut config = Config::default();
        config.checker.python_interpreter = "true".to_string();
        let mut p = Panel::new(&config, Cursor::new(Vec::new()), Vec::new());
        assert_eq!(p.check("ok.py").await.unwrap(), Outcome::Done);
        assert!(String::from_utf8(p.into_output()).unwrap().contains(CLEAN_MESSAGE));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn latin1_compiler_errors_are_not_clean() {
        t::disable_color();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Broken.java");
        std::fs::write(&source, "printf 'Fehler: ung\\374ltig\\n' >&2\nexit 1\n").unwrap();
        let mut config = Config::default();
        config.checker.java_compiler = "sh".to_string();
        let mut p = Panel::new(&config, Cursor::new(Vec::new()), Vec::new());
        assert_eq!(p.check(source.to_str().unwrap()).await.unwrap(), Outcome::Flagged);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Fehler: ung\u{FFFD}ltig"));
        assert!(!out.contains(CLEAN_MESSAGE));
    }

    #[tokio::test]
    async fn missing_checker_fails() {
        t::disable_color();
        let mut config = Config::default();
        config.checker.java_compiler = "deskctl-no-such-javac".to_string();
        let mut p = Panel::new(&config, Cursor::new(Vec::new()), Vec::new());
        assert_eq!(p.check("A.java").await.unwrap(), Outcome::Failed);
        assert!(String::from_utf8(p.into_output()).unwrap().contains("Error:"));
    }

    #[test]
    fn scan_flags_known_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        std::fs::write(&path, b"test").unwrap();
        let mut p = panel("");
        assert_eq!(p.scan(&path).unwrap(), Outcome::Flagged);
        assert!(output(p).contains("Threat Detected!"));
    }

    #[test]
    fn scan_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = panel("");
        assert_eq!(p.scan(&dir.path().join("absent")).unwrap(), Outcome::Failed);
    }

    #[tokio::test]
    async fn interactive_session() {
        let mut p = panel("help\n0\n5\n2\nno\nsearch youtube cats\nreboot\nquit\n4\n");
        p.run().await.unwrap();
        let out = output(p);
        assert!(out.contains("1) Shutdown"));
        assert!(out.contains("Please select a valid action."));
        assert!(out.contains("would run: calc"));
        assert!(out.contains("Are you sure you want to Log Off?"));
        assert!(out.contains("Cancelled."));
        assert!(out.contains("https://www.youtube.com/results?search_query=cats"));
        assert!(out.contains("Unknown command 'reboot'"));
        // Nothing after quit is processed.
        assert!(!out.contains("would run: notepad"));
    }

    #[tokio::test]
    async fn labels_select_actions() {
        let mut p = panel("open browser\nexit\n");
        p.run().await.unwrap();
        assert!(output(p).contains("would run: rundll32 url.dll,FileProtocolHandler http://www.google.com"));
    }

    #[tokio::test]
    async fn reads_input_as_it_arrives() {
        t::disable_color();
        let (mut input, reader) = tokio::io::duplex(64);
        let mut p = Panel::new(&Config::default(), tokio::io::BufReader::new(reader), Vec::new())
            .dry_run(true);
        let feed = async move {
            input.write_all(b"5\n").await.unwrap();
            tokio::task::yield_now().await;
            input.write_all(b"2\ny\nquit\n").await.unwrap();
        };

        let (result, ()) = tokio::join!(p.run(), feed);
        result.unwrap();

        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("would run: calc"));
        assert!(out.contains("would run: shutdown -l"));
    }

    #[tokio::test]
    async fn end_of_input_ends_session() {
        let mut p = panel("6");
        p.run().await.unwrap();
        assert!(output(p).contains("would run: rundll32"));
    }
}
