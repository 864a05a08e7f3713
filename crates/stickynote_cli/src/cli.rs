//! Command definitions and handlers for the `stickynote` binary.
//!
//! # Responsibility
//! - Parse arguments with clap.
//! - Drive note services over a SQLite file through the same mount path a
//!   page host uses.
//!
//! # Invariants
//! - Every mutating command persists through the service's persistence hook;
//!   handlers never write storage directly.
//! - Drags replay a full pointer gesture, so placement rejection applies.

use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use stickynote_core::host::{self, NoteServiceHandle};
use stickynote_core::{
    default_log_level, derive_text_preview, init_logging, NoteHandle, NoteId, Point,
    SharedStorage, SharedSurface, Size, SqliteStorage, VirtualSurface, WidgetConfig,
};

pub type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "stickynote")]
#[command(version, about = "Sticky notes stored per surface in a SQLite file")]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = "stickynote.db")]
    pub db: PathBuf,

    /// JSON file with note defaults (width, height, text)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(long, global = true)]
    pub log_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Width of the virtual surface used for placement checks
    #[arg(long, global = true, default_value_t = 1024)]
    pub surface_width: u32,

    /// Height of the virtual surface used for placement checks
    #[arg(long, global = true, default_value_t = 768)]
    pub surface_height: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored surface keys
    Surfaces,

    /// List notes on a surface
    List {
        /// Surface key
        surface: String,
    },

    /// Add a note at a surface position
    Add {
        surface: String,

        #[arg(long, allow_negative_numbers = true)]
        x: i32,

        #[arg(long, allow_negative_numbers = true)]
        y: i32,

        /// Initial text; the configured default is used when omitted
        #[arg(long)]
        text: Option<String>,
    },

    /// Drag a note by an offset
    Move {
        surface: String,
        id: String,

        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        dx: i32,

        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        dy: i32,
    },

    /// Resize a note by an offset
    Resize {
        surface: String,
        id: String,

        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        dw: i32,

        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        dh: i32,
    },

    /// Replace a note's text
    Edit {
        surface: String,
        id: String,
        text: String,
    },

    /// Close a single note
    Remove { surface: String, id: String },

    /// Remove every note from one or more surfaces
    Clear {
        #[arg(required = true)]
        surfaces: Vec<String>,
    },
}

/// Runs `cli`, writing human-readable output to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> CliResult<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = match cli.config.as_ref() {
        Some(path) => WidgetConfig::load(path)?,
        None => WidgetConfig::default(),
    };
    let storage = Rc::new(RefCell::new(SqliteStorage::open(&cli.db)?));
    let session = Session {
        storage,
        config,
        surface_size: Size::new(cli.surface_width, cli.surface_height),
    };

    match cli.command {
        Commands::Surfaces => session.surfaces(out),
        Commands::List { surface } => session.list(&surface, out),
        Commands::Add { surface, x, y, text } => session.add(&surface, Point::new(x, y), text, out),
        Commands::Move { surface, id, dx, dy } => {
            session.drag(&surface, &id, NoteHandle::Move, Point::new(dx, dy), out)
        }
        Commands::Resize { surface, id, dw, dh } => {
            session.drag(&surface, &id, NoteHandle::Resize, Point::new(dw, dh), out)
        }
        Commands::Edit { surface, id, text } => session.edit(&surface, &id, text, out),
        Commands::Remove { surface, id } => session.remove(&surface, &id, out),
        Commands::Clear { surfaces } => session.clear(&surfaces, out),
    }
}

struct Session {
    storage: Rc<RefCell<SqliteStorage>>,
    config: WidgetConfig,
    surface_size: Size,
}

impl Session {
    fn mount(&self, surface_key: &str) -> NoteServiceHandle {
        let surface: SharedSurface = Rc::new(RefCell::new(VirtualSurface::new(self.surface_size)));
        let storage: SharedStorage = self.storage.clone();
        let handle = host::create(surface, &self.config);
        host::mount(&handle, &storage, surface_key);
        handle
    }

    fn surfaces(&self, out: &mut impl Write) -> CliResult<()> {
        for key in self.storage.borrow().keys()? {
            writeln!(out, "{key}")?;
        }
        Ok(())
    }

    fn list(&self, surface_key: &str, out: &mut impl Write) -> CliResult<()> {
        let handle = self.mount(surface_key);
        let service = handle.borrow();
        for record in service.records() {
            let preview = derive_text_preview(&record.text).unwrap_or_default();
            writeln!(
                out,
                "{}\t{},{}\t{}x{}\t{}",
                record.identifier,
                record.position.x,
                record.position.y,
                record.width,
                record.height,
                preview
            )?;
        }
        Ok(())
    }

    fn add(
        &self,
        surface_key: &str,
        position: Point,
        text: Option<String>,
        out: &mut impl Write,
    ) -> CliResult<()> {
        let handle = self.mount(surface_key);
        let mut service = handle.borrow_mut();
        let id = service.create_note(position)?;
        if let Some(text) = text {
            service.focus_text(&id)?;
            service.key_up(&id, text)?;
            service.blur_text(&id)?;
        }
        writeln!(out, "{id}")?;
        Ok(())
    }

    fn drag(
        &self,
        surface_key: &str,
        id: &str,
        grip: NoteHandle,
        offset: Point,
        out: &mut impl Write,
    ) -> CliResult<()> {
        let handle = self.mount(surface_key);
        let mut service = handle.borrow_mut();
        let id = NoteId::from(id);

        service.pointer_down(&id, grip, Point::default())?;
        service.pointer_move(offset);
        service.pointer_up()?;

        let note = service
            .note(&id)
            .ok_or_else(|| format!("note `{id}` vanished during gesture"))?;
        match grip {
            NoteHandle::Move => {
                let position = note.position();
                writeln!(out, "{id}\t{},{}", position.x, position.y)?;
            }
            NoteHandle::Resize => {
                let size = note.size();
                writeln!(out, "{id}\t{}x{}", size.width, size.height)?;
            }
        }
        Ok(())
    }

    fn edit(&self, surface_key: &str, id: &str, text: String, out: &mut impl Write) -> CliResult<()> {
        let handle = self.mount(surface_key);
        let mut service = handle.borrow_mut();
        let id = NoteId::from(id);
        service.focus_text(&id)?;
        service.key_up(&id, text)?;
        service.blur_text(&id)?;
        writeln!(out, "{id}")?;
        Ok(())
    }

    fn remove(&self, surface_key: &str, id: &str, out: &mut impl Write) -> CliResult<()> {
        let handle = self.mount(surface_key);
        let id = NoteId::from(id);
        handle.borrow_mut().close(&id)?;
        writeln!(out, "{id}")?;
        Ok(())
    }

    fn clear(&self, surface_keys: &[String], out: &mut impl Write) -> CliResult<()> {
        let handles: Vec<NoteServiceHandle> =
            surface_keys.iter().map(|key| self.mount(key)).collect();
        host::remove_all(&handles);
        for key in surface_keys {
            writeln!(out, "{key}")?;
        }
        Ok(())
    }
}
