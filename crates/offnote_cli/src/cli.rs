//! Subcommands acting as the view layer over the notes core.

use crate::config::{AppConfig, GlobalOpts};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use offnote_core::db::open_db;
use offnote_core::{
    init_logging, read_import_file, write_export_file, NotePatch, NoteService, SettingsPatch,
    SettingsService, SortBy, SortDirection, SqliteRecordStore, Theme,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "offnote")]
#[command(about = "Offline notes with tags, search and JSON backups")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty note
    New,
    /// Change title, content or tags of a note
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Replace the whole tag set (comma separated)
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },
    /// Delete a note
    Rm { id: String },
    /// Add a tag to a note
    Tag { id: String, tag: String },
    /// Remove a tag from a note
    Untag { id: String, tag: String },
    /// List notes matching a search
    List {
        /// Case-insensitive text to look for in title or content
        #[arg(short, long, default_value = "")]
        search: String,
        /// Exact tag to filter by
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// List tags in use
    Tags,
    /// Show or change settings
    Settings {
        #[arg(long, value_parser = parse_theme)]
        theme: Option<Theme>,
        /// updatedAt|createdAt|title
        #[arg(long, value_parser = parse_sort_by)]
        sort_by: Option<SortBy>,
        /// asc|desc
        #[arg(long, value_parser = parse_direction)]
        direction: Option<SortDirection>,
    },
    /// Switch between light and dark theme
    ToggleTheme,
    /// Export all notes as JSON (stdout unless --out is given)
    Export {
        /// Directory to write notes-backup-<date>.json into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import notes from a JSON backup, overwriting by id
    Import { file: PathBuf },
}

pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(&cli.global)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())
            .map_err(anyhow::Error::msg)
            .context("failed to start logging")?;
    }

    let conn = open_db(&config.db_path).with_context(|| {
        format!(
            "failed to open note database `{}`",
            config.db_path.display()
        )
    })?;
    let store = SqliteRecordStore::new(&conn);
    let mut settings = SettingsService::bootstrap(store, config.system_theme)
        .context("failed to load settings")?;
    let mut notes = NoteService::open(store).context("failed to load notes")?;
    let current = settings.settings();
    notes.set_sort(current.sort_by, current.sort_direction)?;

    match cli.command {
        Commands::New => print_json(&notes.create_note()?),
        Commands::Edit {
            id,
            title,
            content,
            tags,
        } => {
            let patch = NotePatch {
                title,
                content,
                tags,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass --title, --content or --tags");
            }
            print_json(&notes.update_note(&id, patch)?)
        }
        Commands::Rm { id } => {
            notes.remove_note(&id)?;
            println!("Removed {id}.");
            Ok(())
        }
        Commands::Tag { id, tag } => print_json(&notes.add_tag_to_note(&id, &tag)?),
        Commands::Untag { id, tag } => match notes.remove_tag_from_note(&id, &tag)? {
            Some(note) => print_json(&note),
            None => {
                println!("No note {id}; nothing to untag.");
                Ok(())
            }
        },
        Commands::List { search, tag } => {
            notes.set_search_query(search)?;
            print_json(&notes.set_tag_filter(tag)?)
        }
        Commands::Tags => {
            for tag in notes.tags() {
                println!("{tag}");
            }
            Ok(())
        }
        Commands::Settings {
            theme,
            sort_by,
            direction,
        } => {
            let patch = SettingsPatch {
                theme,
                sort_by,
                sort_direction: direction,
            };
            if patch == SettingsPatch::default() {
                return print_json(&settings.settings());
            }
            print_json(&settings.update_settings(&patch)?)
        }
        Commands::ToggleTheme => print_json(&settings.toggle_theme()?),
        Commands::Export { out } => {
            let document = notes.export_all()?;
            match out {
                Some(dir) => {
                    let path = write_export_file(&dir, &document)?;
                    println!("Exported to {}.", path.display());
                }
                None => println!("{document}"),
            }
            Ok(())
        }
        Commands::Import { file } => {
            let document = read_import_file(&file)
                .with_context(|| format!("failed to read `{}`", file.display()))?;
            let count = notes.import_all(&document)?;
            println!("Imported {count} note(s).");
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::parse(value).ok_or_else(|| format!("expected light|dark, got `{value}`"))
}

fn parse_sort_by(value: &str) -> Result<SortBy, String> {
    SortBy::parse(value).ok_or_else(|| format!("expected updatedAt|createdAt|title, got `{value}`"))
}

fn parse_direction(value: &str) -> Result<SortDirection, String> {
    SortDirection::parse(value).ok_or_else(|| format!("expected asc|desc, got `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};
    use offnote_core::SortBy;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_splits_tags_on_commas() {
        let cli = Cli::parse_from(["offnote", "edit", "note_1", "--tags", "work,home"]);
        match cli.command {
            Commands::Edit { id, tags, .. } => {
                assert_eq!(id, "note_1");
                assert_eq!(tags, Some(vec!["work".to_string(), "home".to_string()]));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn settings_parses_wire_names() {
        let cli = Cli::parse_from(["offnote", "settings", "--sort-by", "title"]);
        match cli.command {
            Commands::Settings { sort_by, .. } => assert_eq!(sort_by, Some(SortBy::Title)),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["offnote", "settings", "--direction", "up"]).is_err());
    }
}
