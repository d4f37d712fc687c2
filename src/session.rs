//! The triage REPL.
//!
//! One iteration pulls a random saved item, prints it with any discussions
//! and archive snapshot, then reads commands until one of them moves on.
//!
//! ```text
//! FetchItem -> DisplayAndEnrich -> Prompt -+-> archive/delete/next -> FetchItem
//!                                  ^       +-> favorite / unknown --+
//!                                  +--------------------------------+
//!                                          +-> quit / EOF / Ctrl-C -> Exit
//! ```
//!
//! Ctrl-C also ends the session while an item's lookups are in flight.
use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::command::Command;
use crate::discussion::{DiscussionResolver, Resolution};
use crate::storage::{SavedItem, SavedItemStore};
use crate::wayback::SnapshotLookup;

enum State {
    FetchItem,
    DisplayAndEnrich(SavedItem),
    Prompt(SavedItem),
    Exit,
}

/// What one prompt produced.
enum Reply {
    Command(Command),
    Blank,
    Unknown(String),
}

pub struct ReplSession<S, R, W, E> {
    store: S,
    resolver: DiscussionResolver,
    snapshots: SnapshotLookup,
    input: R,
    out: W,
    err: E,
    interrupts: Option<mpsc::Receiver<()>>,
}

impl<S, R, W, E> ReplSession<S, R, W, E>
where
    S: SavedItemStore,
    R: AsyncBufRead + Unpin,
    W: Write,
    E: Write,
{
    pub fn new(
        store: S,
        resolver: DiscussionResolver,
        snapshots: SnapshotLookup,
        input: R,
        out: W,
        err: E,
    ) -> Self {
        Self {
            store,
            resolver,
            snapshots,
            input,
            out,
            err,
            interrupts: None,
        }
    }

    /// Treat every message on `interrupts` as a request to quit.
    pub fn with_interrupts(mut self, interrupts: mpsc::Receiver<()>) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the session, returning its output and error streams.
    pub fn into_output(self) -> (W, E) {
        (self.out, self.err)
    }

    /// Run until the user quits.
    ///
    /// Lookup failures only produce warnings. Store failures and malformed
    /// discussion URLs end the session with an error.
    pub async fn run(&mut self) -> Result<()> {
        let mut interrupts = self.interrupts.take();
        let result = self.drive(&mut interrupts).await;
        self.interrupts = interrupts;
        result
    }

    async fn drive(&mut self, interrupts: &mut Option<mpsc::Receiver<()>>) -> Result<()> {
        let mut state = State::FetchItem;
        loop {
            state = match state {
                State::FetchItem => {
                    let item = self
                        .store
                        .random_item()
                        .await
                        .context("Failed to fetch a saved item")?;
                    tracing::debug!(item_id = item.id, url = %item.url, "Picked saved item");
                    State::DisplayAndEnrich(item)
                }
                State::DisplayAndEnrich(item) => {
                    self.display(&item)?;
                    let enriched = tokio::select! {
                        enriched = self.enrich(&item) => Some(enriched),
                        () = interrupted(interrupts) => None,
                    };
                    match enriched {
                        Some(enriched) => {
                            enriched?;
                            State::Prompt(item)
                        }
                        None => {
                            tracing::debug!(item_id = item.id, "Interrupted during lookup");
                            writeln!(self.out)?;
                            State::Exit
                        }
                    }
                }
                State::Prompt(item) => match self.prompt(interrupts).await? {
                    Reply::Command(cmd) => self.dispatch(cmd, item).await?,
                    Reply::Blank => State::Prompt(item),
                    Reply::Unknown(text) => {
                        writeln!(self.out, "unknown command: {text}")?;
                        State::Prompt(item)
                    }
                },
                State::Exit => return Ok(()),
            };
        }
    }

    fn display(&mut self, item: &SavedItem) -> Result<()> {
        writeln!(self.out, "{}", item.title)?;
        writeln!(self.out)?;
        if let Some(excerpt) = &item.excerpt {
            writeln!(self.out, "{excerpt}")?;
            writeln!(self.out)?;
        }
        writeln!(self.out, "{}", item.url)?;
        writeln!(self.out, "added: {}", item.time_added)?;
        Ok(())
    }

    /// Print discussions, then the snapshot if discussions resolved.
    async fn enrich(&mut self, item: &SavedItem) -> Result<()> {
        match self.resolver.resolve(&item.url).await {
            Ok(resolution) => write_resolution(&mut self.out, &resolution)?,
            Err(e) if e.is_transient() => return self.warn(&e),
            Err(e) => return Err(e).context("Failed to resolve discussions"),
        }

        match self.snapshots.lookup(&item.url, Some(item.time_added)).await {
            Ok(Some(snapshot)) => writeln!(self.out, "{snapshot} (wayback archive)")?,
            Ok(None) => {}
            Err(e) => self.warn(&e)?,
        }
        Ok(())
    }

    fn warn(&mut self, error: &dyn std::error::Error) -> Result<()> {
        tracing::warn!(error = %error, "Discussion lookup failed");
        writeln!(self.err, "warning: fetching discussions failed: {error}")?;
        Ok(())
    }

    /// Read one line. End of input and Ctrl-C both mean quit.
    async fn prompt(&mut self, interrupts: &mut Option<mpsc::Receiver<()>>) -> Result<Reply> {
        write!(self.out, "{}", Command::prompt())?;
        self.out.flush()?;

        let mut line = String::new();
        let read = tokio::select! {
            read = self.input.read_line(&mut line) => Some(read),
            () = interrupted(interrupts) => None,
        };
        let Some(read) = read else {
            tracing::debug!("Interrupted at prompt");
            writeln!(self.out)?;
            return Ok(Reply::Command(Command::Quit));
        };
        if read.context("Failed to read command")? == 0 {
            writeln!(self.out)?;
            return Ok(Reply::Command(Command::Quit));
        }

        let text = line.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            return Ok(Reply::Blank);
        }
        Ok(match Command::parse(text) {
            Some(cmd) => Reply::Command(cmd),
            None => Reply::Unknown(text.to_string()),
        })
    }

    async fn dispatch(&mut self, cmd: Command, item: SavedItem) -> Result<State> {
        tracing::debug!(command = %cmd, item_id = item.id, "Dispatching command");
        match cmd {
            Command::Archive => self
                .store
                .archive(item.id)
                .await
                .with_context(|| format!("Failed to archive item {}", item.id))?,
            Command::Delete => self
                .store
                .delete(item.id)
                .await
                .with_context(|| format!("Failed to delete item {}", item.id))?,
            Command::Favorite => self
                .store
                .favorite(item.id)
                .await
                .with_context(|| format!("Failed to favorite item {}", item.id))?,
            Command::Next => {}
            Command::Quit => return Ok(State::Exit),
        }
        Ok(if cmd.is_terminal() {
            State::FetchItem
        } else {
            State::Prompt(item)
        })
    }
}

/// Resolves on the next interrupt. Never resolves once the sender is gone
/// or when no receiver was configured.
async fn interrupted(interrupts: &mut Option<mpsc::Receiver<()>>) {
    let closed = match interrupts {
        Some(rx) => rx.recv().await.is_none(),
        None => true,
    };
    if !closed {
        return;
    }
    *interrupts = None;
    std::future::pending::<()>().await
}

/// Print the canonical article URL (if any) followed by one line per thread.
pub fn write_resolution<W: Write>(out: &mut W, resolution: &Resolution) -> std::io::Result<()> {
    if let Some(url) = &resolution.canonical_url {
        writeln!(out, "{url}")?;
    }
    for thread in &resolution.threads {
        writeln!(out, "{thread}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::DiscussionThread;
    use chrono::DateTime;

    #[test]
    fn test_write_resolution() {
        let resolution = Resolution {
            canonical_url: Some("http://example.com/a".to_string()),
            threads: vec![DiscussionThread {
                id: "5".to_string(),
                points: 2,
                created_at: DateTime::from_timestamp(0, 0).unwrap(),
            }],
        };
        let mut out = Vec::new();
        write_resolution(&mut out, &resolution).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "http://example.com/a\nhttps://news.ycombinator.com/item?id=5 | 2 points | 1970-01-01T00:00:00Z\n"
        );
    }

    #[test]
    fn test_write_empty_resolution() {
        let mut out = Vec::new();
        write_resolution(&mut out, &Resolution::default()).unwrap();
        assert!(out.is_empty());
    }
}
