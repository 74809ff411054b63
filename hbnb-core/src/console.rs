//! Command interpreter for the object store.
//!
//! A simple line-oriented protocol: the first word of each line names the
//! command, the rest are whitespace-separated arguments. User mistakes
//! (missing class, unknown id, ...) are printed as `** ... **` messages and
//! never surface as errors; only storage and output failures do.

use crate::entity::{is_reserved, object_key, AttrValue, EntityKind};
use crate::error::ConsoleResult;
use crate::storage::FileStorage;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Prompt shown before each command in interactive mode.
pub const PROMPT: &str = "(hbnb) ";

/// Command names and their help text, in listing order.
const COMMANDS: [(&str, &str); 8] = [
    ("EOF", "Exit the console at end of input"),
    ("all", "Print all instances, or all instances of a class: all [<class>]"),
    ("create", "Create an instance, save it and print its id: create <class>"),
    ("destroy", "Delete an instance and save: destroy <class> <id>"),
    ("help", "List commands, or describe one: help [<command>]"),
    ("quit", "Quit command to exit the program"),
    ("show", "Print an instance: show <class> <id>"),
    (
        "update",
        "Set one attribute and save: update <class> <id> <attribute> \"<value>\"",
    ),
];

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The command interpreter.
///
/// Owns the storage handle and writes all user-facing output to `out`.
pub struct Console<W> {
    storage: FileStorage,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(storage: FileStorage, out: W) -> Self {
        Self { storage, out }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// The output sink.
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Run commands from `input` until `quit`, `EOF` or end of input.
    ///
    /// With `prompt` set, [`PROMPT`] is written before every command and end
    /// of input behaves like the `EOF` command.
    pub fn run<R: BufRead>(&mut self, input: R, prompt: bool) -> ConsoleResult<()> {
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(self.out, "{PROMPT}")?;
                self.out.flush()?;
            }

            let line = match lines.next() {
                Some(line) => line?,
                None => {
                    if prompt {
                        self.execute("EOF")?;
                    }
                    break;
                }
            };

            if self.execute(&line)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Execute a single command line.
    pub fn execute(&mut self, line: &str) -> ConsoleResult<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (command, args) = match line.find(char::is_whitespace) {
            Some(i) => (&line[..i], line[i..].trim()),
            None => (line, ""),
        };
        debug!(command, args, "executing command");

        match command {
            "quit" => return Ok(Flow::Exit),
            "EOF" => {
                writeln!(self.out)?;
                return Ok(Flow::Exit);
            }
            "create" => self.create(args)?,
            "show" => self.show(args)?,
            "destroy" => self.destroy(args)?,
            "all" => self.all(args)?,
            "update" => self.update(args)?,
            "help" => self.help(args)?,
            _ => writeln!(self.out, "*** Unknown syntax: {line}")?,
        }
        self.out.flush()?;
        Ok(Flow::Continue)
    }

    fn create(&mut self, class: &str) -> ConsoleResult<()> {
        if class.is_empty() {
            writeln!(self.out, "** class name missing **")?;
            return Ok(());
        }
        let Some(kind) = EntityKind::from_name(class) else {
            writeln!(self.out, "** class doesn't exist **")?;
            return Ok(());
        };

        let entity = self.storage.create(kind);
        let id = entity.id().clone();
        let key = entity.key();
        self.storage.save_entity(&key)?;
        writeln!(self.out, "{id}")?;
        Ok(())
    }

    fn show(&mut self, args: &str) -> ConsoleResult<()> {
        let fields: Vec<&str> = args.split_whitespace().collect();
        let Some(key) = self.target(&fields)? else {
            return Ok(());
        };

        match self.storage.get(&key) {
            Some(entity) => writeln!(self.out, "{entity}")?,
            None => writeln!(self.out, "** no instance found **")?,
        }
        Ok(())
    }

    fn destroy(&mut self, args: &str) -> ConsoleResult<()> {
        let fields: Vec<&str> = args.split_whitespace().collect();
        let Some(key) = self.target(&fields)? else {
            return Ok(());
        };

        if self.storage.remove(&key).is_some() {
            self.storage.save()?;
        } else {
            writeln!(self.out, "** no instance found **")?;
        }
        Ok(())
    }

    fn all(&mut self, class: &str) -> ConsoleResult<()> {
        let rendered: Vec<String> = if class.is_empty() {
            self.storage.all().values().map(ToString::to_string).collect()
        } else {
            let Some(kind) = EntityKind::from_name(class) else {
                writeln!(self.out, "** class doesn't exist **")?;
                return Ok(());
            };
            self.storage.iter_kind(kind).map(ToString::to_string).collect()
        };

        writeln!(self.out, "[{}]", rendered.join(", "))?;
        Ok(())
    }

    fn update(&mut self, args: &str) -> ConsoleResult<()> {
        let (fields, value) = split_fields(args, 3);
        let Some(key) = self.target(&fields)? else {
            return Ok(());
        };
        let Some(name) = fields.get(2).copied() else {
            writeln!(self.out, "** attribute name missing **")?;
            return Ok(());
        };
        if value.is_empty() {
            writeln!(self.out, "** value missing **")?;
            return Ok(());
        }
        if is_reserved(name) {
            warn!(attribute = name, "ignoring update of reserved attribute");
            return Ok(());
        }

        let Some(entity) = self.storage.get_mut(&key) else {
            writeln!(self.out, "** no instance found **")?;
            return Ok(());
        };

        let value = AttrValue::coerce(strip_quotes(value));
        if let Err(e) = entity.set(name, value) {
            writeln!(self.out, "Error updating attribute: {e}")?;
            return Ok(());
        }
        if let Err(e) = self.storage.save_entity(&key) {
            writeln!(self.out, "Error updating attribute: {e}")?;
        }
        Ok(())
    }

    fn help(&mut self, topic: &str) -> ConsoleResult<()> {
        if topic.is_empty() {
            let names: Vec<&str> = COMMANDS.iter().map(|(name, _)| *name).collect();
            writeln!(self.out)?;
            writeln!(self.out, "Documented commands (type help <topic>):")?;
            writeln!(self.out, "========================================")?;
            writeln!(self.out, "{}", names.join("  "))?;
            writeln!(self.out)?;
            return Ok(());
        }

        match COMMANDS.iter().find(|(name, _)| *name == topic) {
            Some((_, doc)) => writeln!(self.out, "{doc}")?,
            None => writeln!(self.out, "*** No help on {topic}")?,
        }
        Ok(())
    }

    /// Resolve `<class> <id>` into a composite key, reporting the first
    /// missing or invalid piece.
    fn target(&mut self, fields: &[&str]) -> ConsoleResult<Option<String>> {
        let Some(class) = fields.first() else {
            writeln!(self.out, "** class name missing **")?;
            return Ok(None);
        };
        let Some(kind) = EntityKind::from_name(class) else {
            writeln!(self.out, "** class doesn't exist **")?;
            return Ok(None);
        };
        let Some(id) = fields.get(1) else {
            writeln!(self.out, "** instance id missing **")?;
            return Ok(None);
        };
        Ok(Some(object_key(kind, id)))
    }
}

/// Split off up to `count` leading whitespace-separated fields and return
/// them with the trimmed remainder of the line.
fn split_fields(args: &str, count: usize) -> (Vec<&str>, &str) {
    let mut fields = Vec::with_capacity(count);
    let mut rest = args.trim_start();
    while fields.len() < count && !rest.is_empty() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    (fields, rest.trim_end())
}

/// Drop one pair of surrounding double quotes.
fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
