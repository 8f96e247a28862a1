//! Line-oriented terminal front end over [`BrowserController`].

use std::collections::HashSet;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use uuid::Uuid;

use crate::api::FileService;
use crate::controller::BrowserController;
use crate::error::{AppError, Result};
use crate::format::{describe_entry, format_file_size, format_timestamp};
use crate::models::entry::Entry;
use crate::models::listing::{ListingSort, ListingStatus, SortField, SortOrder};
use crate::services::click_service::ClickOutcome;
use crate::services::mutation_service::DeleteConfirmation;
use crate::services::notification_service::NotificationLevel;
use crate::state::BrowserView;

const HELP: &str = "\
commands:
  ls                      show the current folder
  cd <path>               go to a path (/ for the root)
  up                      go to the parent folder
  open <name>             open a folder
  click <name>            click an entry (twice quickly to open)
  clear                   clear the selection
  sort <field> [order]    field: name|modified|size|none, order: asc|desc
  reload                  fetch the current folder again
  mkdir <name>            create a folder here
  rename <name> <new>     rename an entry
  rm <name>               delete an entry (asks first)
  pin <name>              pin a folder to quick access
  unpin <path>            remove a pin
  drag <name> / drop      drag a folder onto quick access
  pins                    list pinned folders
  go <path>               open a pinned folder
  info <name>             show details for an entry
  dismiss                 dismiss notifications
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Cd(String),
    Up,
    Open(String),
    Click(String),
    ClearSelection,
    Sort(ListingSort),
    Reload,
    Mkdir(String),
    Rename { name: String, new_name: String },
    Remove(String),
    Pin(String),
    Unpin(String),
    Drag(String),
    Drop,
    Pins,
    Go(String),
    Info(String),
    Dismiss,
    Help,
    Quit,
}

fn required(arg: &str, usage: &str) -> std::result::Result<String, String> {
    if arg.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(arg.to_string())
    }
}

impl ShellCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        let command = match word {
            "ls" => Self::List,
            "cd" => Self::Cd(if rest.is_empty() { "/" } else { rest }.to_string()),
            "up" | ".." => Self::Up,
            "open" => Self::Open(required(rest, "open <name>")?),
            "click" => Self::Click(required(rest, "click <name>")?),
            "clear" => Self::ClearSelection,
            "sort" => Self::Sort(parse_sort(rest)?),
            "reload" => Self::Reload,
            // Blank names go through so the controller can reject them.
            "mkdir" => Self::Mkdir(rest.to_string()),
            "rename" => {
                let (name, new_name) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "usage: rename <name> <new name>".to_string())?;
                Self::Rename {
                    name: name.to_string(),
                    new_name: new_name.trim().to_string(),
                }
            }
            "rm" => Self::Remove(required(rest, "rm <name>")?),
            "pin" => Self::Pin(required(rest, "pin <name>")?),
            "unpin" => Self::Unpin(required(rest, "unpin <path>")?),
            "drag" => Self::Drag(required(rest, "drag <name>")?),
            "drop" => Self::Drop,
            "pins" => Self::Pins,
            "go" => Self::Go(required(rest, "go <path>")?),
            "info" => Self::Info(required(rest, "info <name>")?),
            "dismiss" => Self::Dismiss,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

fn parse_sort(rest: &str) -> std::result::Result<ListingSort, String> {
    let mut words = rest.split_whitespace();
    let field = match words.next() {
        None | Some("none") => None,
        Some(word) => Some(
            SortField::parse(word).ok_or_else(|| format!("unknown sort field '{word}'"))?,
        ),
    };
    let order = match words.next() {
        None => SortOrder::default(),
        Some(word) => {
            SortOrder::parse(word).ok_or_else(|| format!("unknown sort order '{word}'"))?
        }
    };
    Ok(ListingSort { field, order })
}

/// What the input loop should do after a command.
#[derive(Debug)]
pub enum Flow {
    Continue,
    Confirm(DeleteConfirmation),
    Quit,
}

pub struct Shell<S> {
    controller: BrowserController<S>,
    shown: HashSet<Uuid>,
}

impl<S: FileService + 'static> Shell<S> {
    pub fn new(controller: BrowserController<S>) -> Self {
        Self {
            controller,
            shown: HashSet::new(),
        }
    }

    pub fn controller(&self) -> &BrowserController<S> {
        &self.controller
    }

    pub async fn start(&mut self, out: &mut Vec<String>) {
        self.controller.mount().await;
        render_listing(&self.controller.view(), out);
        self.flush_notifications(out);
    }

    fn entry(&self, name: &str) -> Result<Entry> {
        self.controller
            .find_entry(name)
            .ok_or_else(|| AppError::Validation(format!("No entry named '{name}' here")))
    }

    /// Appends notifications that have not been printed yet. Ids of notifications
    /// that are gone are forgotten.
    fn flush_notifications(&mut self, out: &mut Vec<String>) {
        let notifications = self.controller.notifications();
        self.shown
            .retain(|id| notifications.iter().any(|notification| notification.id == *id));
        for notification in notifications {
            if self.shown.insert(notification.id) {
                let tag = match notification.level {
                    NotificationLevel::Success => "ok",
                    NotificationLevel::Info => "info",
                    NotificationLevel::Warning => "warn",
                    NotificationLevel::Error => "error",
                };
                out.push(format!("[{tag}] {}", notification.message));
            }
        }
    }

    /// Commits a lapsed single click.
    pub fn tick(&mut self, out: &mut Vec<String>) {
        if let Some(entry) = self.controller.tick() {
            out.push(format!("selected {}", entry.name));
        }
    }

    pub async fn execute(&mut self, command: ShellCommand, out: &mut Vec<String>) -> Flow {
        let before = self.controller.last_notification_id();
        let flow = match self.run(command, out).await {
            Ok(flow) => flow,
            Err(error) => {
                // Most controller failures already produced a notification.
                if self.controller.last_notification_id() == before {
                    out.push(format!("[error] {error}"));
                }
                Flow::Continue
            }
        };
        self.flush_notifications(out);
        flow
    }

    async fn run(&mut self, command: ShellCommand, out: &mut Vec<String>) -> Result<Flow> {
        let controller = &self.controller;
        match command {
            ShellCommand::List => render_listing(&controller.view(), out),
            ShellCommand::Cd(path) => {
                controller.navigate_input(&path).await;
                render_listing(&controller.view(), out);
            }
            ShellCommand::Up => {
                if controller.navigate_up().await {
                    render_listing(&controller.view(), out);
                } else {
                    out.push("already at the root".to_string());
                }
            }
            ShellCommand::Open(name) => {
                controller.enter(&self.entry(&name)?).await?;
                render_listing(&controller.view(), out);
            }
            ShellCommand::Click(name) => {
                let entry = self.entry(&name)?;
                match controller.click(entry).await {
                    ClickOutcome::Armed { .. } => {}
                    ClickOutcome::Select(entry) => out.push(format!("selected {}", entry.name)),
                    ClickOutcome::Activate(_) => render_listing(&controller.view(), out),
                }
            }
            ShellCommand::ClearSelection => controller.clear_selection(),
            ShellCommand::Sort(sort) => {
                controller.set_sort(sort).await;
                render_listing(&controller.view(), out);
            }
            ShellCommand::Reload => {
                controller.reload().await;
                render_listing(&controller.view(), out);
            }
            ShellCommand::Mkdir(name) => {
                controller.create_folder(&name).await?;
            }
            ShellCommand::Rename { name, new_name } => {
                let entry = self.entry(&name)?;
                controller.rename(&entry, &new_name).await?;
            }
            ShellCommand::Remove(name) => {
                let confirmation = controller.request_delete(self.entry(&name)?);
                return Ok(Flow::Confirm(confirmation));
            }
            ShellCommand::Pin(name) => {
                controller.pin(&self.entry(&name)?).await?;
            }
            ShellCommand::Unpin(path) => {
                controller.unpin(&path).await?;
            }
            ShellCommand::Drag(name) => {
                let entry = self.entry(&name)?;
                if controller.begin_drag(&entry) {
                    out.push(format!("dragging {}, 'drop' to pin it", entry.name));
                } else {
                    out.push(format!("'{}' is a file and cannot be dragged", entry.name));
                }
            }
            ShellCommand::Drop => {
                controller.drop_on_quick_access().await?;
            }
            ShellCommand::Pins => {
                controller.refresh_quick_access().await;
                render_pins(&controller.view(), out);
            }
            ShellCommand::Go(path) => {
                controller.navigate_to_pin(&path).await;
                render_listing(&controller.view(), out);
            }
            ShellCommand::Info(name) => {
                let path = self.entry(&name)?.path;
                let entry = controller.inspect(&path).await?;
                render_info(&entry, out);
            }
            ShellCommand::Dismiss => {
                controller.clear_notifications();
                self.shown.clear();
            }
            ShellCommand::Help => out.push(HELP.to_string()),
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Second half of `rm`: `confirmed` is the user's answer to the prompt.
    pub async fn finish_delete(
        &mut self,
        confirmation: DeleteConfirmation,
        confirmed: bool,
        out: &mut Vec<String>,
    ) {
        if confirmed {
            // Failure is reported through a notification.
            let _ = self.controller.confirm_delete(confirmation).await;
        } else {
            out.push("delete cancelled".to_string());
        }
        self.flush_notifications(out);
    }
}

pub fn render_listing(view: &BrowserView, out: &mut Vec<String>) {
    let crumbs: Vec<&str> = view.breadcrumbs.iter().map(|c| c.label.as_str()).collect();
    out.push(crumbs.join(" > "));
    match &view.listing.status {
        ListingStatus::Loading => out.push("  loading...".to_string()),
        ListingStatus::Failed(message) => out.push(format!("  ! {message}")),
        ListingStatus::Idle | ListingStatus::Loaded => {
            if view.listing.entries.is_empty() {
                out.push("  (empty)".to_string());
            }
            for entry in &view.listing.entries {
                let marker = if view.selection.as_ref().is_some_and(|s| s.path == entry.path) {
                    '*'
                } else {
                    ' '
                };
                out.push(format!(" {marker} {}", describe_entry(entry)));
            }
        }
    }
}

pub fn render_pins(view: &BrowserView, out: &mut Vec<String>) {
    if view.quick_access.is_empty() {
        out.push("no pinned folders".to_string());
        return;
    }
    for pin in &view.quick_access {
        out.push(format!("  {}  ({})", pin.name, pin.path));
    }
}

pub fn render_info(entry: &Entry, out: &mut Vec<String>) {
    out.push(format!("name:     {}", entry.name));
    out.push(format!("path:     {}", entry.path));
    out.push(format!("type:     {}", entry.kind));
    if entry.size.is_some() {
        out.push(format!("size:     {}", format_file_size(entry.size)));
    }
    if let Some(modified) = &entry.modified_at {
        out.push(format!("modified: {}", format_timestamp(modified)));
    }
    if let Some(created) = &entry.created_at {
        out.push(format!("created:  {}", format_timestamp(created)));
    }
    if let Some(info) = &entry.session_info {
        out.push(format!("session:  {} files", info.file_count));
        if let Some(file) = &info.session_file {
            out.push(format!("          {file}"));
        }
    }
}

async fn write_lines<W: AsyncWrite + Unpin>(writer: &mut W, lines: &mut Vec<String>) -> Result<()> {
    for line in lines.drain(..) {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Reads commands from stdin until `quit` or end of input. A pending single click is
/// committed when its window lapses, even while waiting for input.
pub async fn run_shell<S: FileService + 'static>(controller: BrowserController<S>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut out = Vec::new();
    let mut shell = Shell::new(controller);

    shell.start(&mut out).await;
    write_lines(&mut stdout, &mut out).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = match shell.controller().next_click_deadline() {
            Some(deadline) => {
                tokio::select! {
                    line = lines.next_line() => line?,
                    _ = tokio::time::sleep_until(deadline.into()) => {
                        shell.tick(&mut out);
                        if !out.is_empty() {
                            out.insert(0, String::new());
                            write_lines(&mut stdout, &mut out).await?;
                        }
                        continue;
                    }
                }
            }
            None => lines.next_line().await?,
        };
        let Some(line) = line else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                out.push(message);
                write_lines(&mut stdout, &mut out).await?;
                continue;
            }
        };

        match shell.execute(command, &mut out).await {
            Flow::Continue => {}
            Flow::Quit => break,
            Flow::Confirm(confirmation) => {
                out.push(format!("{} [y/N]", confirmation.prompt()));
                write_lines(&mut stdout, &mut out).await?;
                let answer = lines.next_line().await?.unwrap_or_default();
                shell.finish_delete(confirmation, is_yes(&answer), &mut out).await;
            }
        }
        write_lines(&mut stdout, &mut out).await?;
    }

    shell.controller().unmount();
    tracing::info!("shell closed");
    Ok(())
}
