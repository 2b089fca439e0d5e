use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::debug;

use dl_core::validation::{CreateDiaryEntryInput, DeleteDiaryEntryInput, UpdateDiaryEntryInput};
use dl_core::{DateValue, DiaryEntry, DiaryError, DEFAULT_PREVIEW_LENGTH};
use dl_store::{load_config, resolve_store_path, FileStore, KvDiaryRepository};
use dl_usecases::Diary;
use dl_utils::parse_iso_date;

/// Command line arguments for `dialy`.
#[derive(Parser)]
#[command(name = "dialy", version, about = "One diary entry per day")]
struct Cli {
    /// Store directory, overriding DIALY_PATH and config.yaml.
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

/// Diary commands.
#[derive(Subcommand)]
enum Command {
    /// Write the entry for a day.
    Write {
        /// Day to write for (YYYY-MM-DD), defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        content: String,
    },
    /// Replace the content of an entry.
    Edit { id: String, content: String },
    /// Delete an entry.
    Delete { id: String },
    /// Show the entry for a day.
    Show {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Entries written on the same day in previous years.
    Past {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// How many years to look back (1-50).
        #[arg(long, allow_negative_numbers = true)]
        years: Option<i64>,
    },
    /// List every entry, newest first.
    List,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_iso_date(value).map_err(|err| err.to_string())
}

/// Parse arguments, open the configured store, and run one command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config().context("failed to load config")?;
    let path = match cli.store {
        Some(path) => path,
        None => resolve_store_path(&config).context("failed to resolve store path")?,
    };
    let store = FileStore::new(path);
    debug!("using store at {}", store.path().display());

    let repository = KvDiaryRepository::new(Arc::new(store));
    let diary = Diary::new(Arc::new(repository));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to initialize runtime")?;
    let mut out = io::stdout().lock();
    runtime.block_on(execute(
        &diary,
        cli.command,
        config.lookback_years(),
        &mut out,
    ))
}

async fn execute(
    diary: &Diary,
    command: Command,
    lookback_years: u32,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Write { date, content } => {
            let date = date.unwrap_or_else(|| diary.today());
            let entry = diary
                .create_entry()
                .execute(CreateDiaryEntryInput { date, content })
                .await
                .map_err(|err| explain(err, "failed to write entry"))?;
            writeln!(out, "{}\t{}", entry.id(), entry.date_value())?;
        }
        Command::Edit { id, content } => {
            let entry = diary
                .update_entry()
                .execute(UpdateDiaryEntryInput { id, content })
                .await
                .map_err(|err| explain(err, "failed to edit entry"))?;
            writeln!(out, "{}\t{}", entry.id(), entry.date_value())?;
        }
        Command::Delete { id } => {
            diary
                .delete_entry()
                .execute(DeleteDiaryEntryInput { id })
                .await
                .map_err(|err| explain(err, "failed to delete entry"))?;
        }
        Command::Show { date } => {
            let date = date.unwrap_or_else(|| diary.today());
            let entry = diary
                .get_entry()
                .execute(date)
                .await
                .map_err(|err| explain(err, "failed to load entry"))?;
            writeln!(out, "{}", DateValue::new(date).format_with_weekday())?;
            match entry {
                Some(entry) => writeln!(out, "{}", entry.content())?,
                None => writeln!(out, "No entry yet.")?,
            }
        }
        Command::Past { date, years } => {
            let date = date.unwrap_or_else(|| diary.today());
            let years = years.unwrap_or_else(|| i64::from(lookback_years));
            let entries = diary
                .get_entries_by_same_date()
                .execute(date, Some(years))
                .await
                .map_err(|err| explain(err, "failed to load past entries"))?;
            if entries.is_empty() {
                writeln!(out, "No entries from past years.")?;
            }
            for entry in entries {
                writeln!(
                    out,
                    "{}\t{} chars\t{}",
                    entry.year(),
                    entry.character_count(),
                    preview(&entry)
                )?;
            }
        }
        Command::List => {
            let entries = diary
                .all_entries()
                .await
                .map_err(|err| explain(err, "failed to list entries"))?;
            for entry in entries {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    entry.id(),
                    entry.date_value(),
                    preview(&entry)
                )?;
            }
        }
    }
    Ok(())
}

fn preview(entry: &DiaryEntry) -> String {
    entry.preview_text(DEFAULT_PREVIEW_LENGTH).replace('\n', " ")
}

fn explain(err: DiaryError, action: &str) -> anyhow::Error {
    let hint = if err.is_user_error() {
        "fix the input and try again"
    } else {
        "retry the command"
    };
    let code = err.code();
    anyhow::Error::new(err).context(format!("{action} [{code}]: {hint}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use dl_core::FixedClock;
    use dl_store::MemoryStore;
    use tempfile::TempDir;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn diary() -> Diary {
        let clock = Arc::new(FixedClock::on(ymd(2026, 2, 8)));
        let repository =
            KvDiaryRepository::new(Arc::new(MemoryStore::new())).with_clock(clock.clone());
        Diary::with_clock(Arc::new(repository), clock)
    }

    async fn output(diary: &Diary, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("dialy").chain(args.iter().copied()))?;
        let mut buffer = Vec::new();
        execute(diary, cli.command, 5, &mut buffer).await?;
        Ok(String::from_utf8(buffer)?)
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_subcommands_snapshot() {
        let names: Vec<String> = Cli::command()
            .get_subcommands()
            .map(|command| command.get_name().to_string())
            .collect();
        insta::assert_snapshot!(names.join("\n"), @r###"
        write
        edit
        delete
        show
        past
        list
        "###);
    }

    #[test]
    fn cli_help_mentions_store_override() {
        let mut buffer = Vec::new();
        Cli::command().write_long_help(&mut buffer).expect("help output");
        let help = String::from_utf8(buffer).expect("utf8 help");
        assert!(help.contains("--store"));
        assert!(help.contains("One diary entry per day"));
    }

    #[test]
    fn rejects_malformed_date_argument() {
        assert!(Cli::try_parse_from(["dialy", "show", "--date", "2026-2-8"]).is_err());
        assert!(Cli::try_parse_from(["dialy", "show", "--date", "2026-02-08"]).is_ok());
    }

    #[test]
    fn store_override_is_global() {
        let cli = Cli::try_parse_from(["dialy", "list", "--store", "/tmp/diary"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/diary")));
    }

    #[tokio::test]
    async fn write_then_show_today() {
        let diary = diary();

        let written = output(&diary, &["write", "today's entry"]).await.unwrap();
        assert!(written.trim_end().ends_with("\t2026-02-08"));

        let shown = output(&diary, &["show"]).await.unwrap();
        insta::assert_snapshot!(shown.trim_end(), @r###"
        2月8日（日）
        today's entry
        "###);
    }

    #[tokio::test]
    async fn show_reports_missing_entry() {
        let shown = output(&diary(), &["show", "--date", "2025-02-08"]).await.unwrap();
        insta::assert_snapshot!(shown.trim_end(), @r###"
        2月8日（土）
        No entry yet.
        "###);
    }

    #[tokio::test]
    async fn past_lists_previous_years() {
        let diary = diary();
        output(&diary, &["write", "--date", "2025-02-08", "last year"]).await.unwrap();
        output(&diary, &["write", "--date", "2023-02-08", "three years ago"]).await.unwrap();
        output(&diary, &["write", "--date", "2025-02-07", "wrong day"]).await.unwrap();

        let past = output(&diary, &["past"]).await.unwrap();
        insta::assert_snapshot!(past.trim_end(), @r###"
        2025	9 chars	last year
        2023	15 chars	three years ago
        "###);

        let short = output(&diary, &["past", "--years", "1"]).await.unwrap();
        assert_eq!(short, "2025\t9 chars\tlast year\n");
    }

    #[tokio::test]
    async fn past_without_entries() {
        let past = output(&diary(), &["past"]).await.unwrap();
        assert_eq!(past, "No entries from past years.\n");
    }

    #[tokio::test]
    async fn list_edit_and_delete() {
        let diary = diary();
        output(&diary, &["write", "--date", "2025-02-08", "first"]).await.unwrap();
        output(&diary, &["write", "second"]).await.unwrap();

        let listed = output(&diary, &["list"]).await.unwrap();
        let rows: Vec<&str> = listed.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with("\t2026-02-08\tsecond"));
        let first_id = rows[1].split('\t').next().unwrap();

        output(&diary, &["edit", first_id, "first, edited"]).await.unwrap();
        assert!(output(&diary, &["show", "--date", "2025-02-08"])
            .await
            .unwrap()
            .contains("first, edited"));

        output(&diary, &["delete", first_id]).await.unwrap();
        assert_eq!(output(&diary, &["list"]).await.unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn errors_carry_a_hint() {
        let diary = diary();
        output(&diary, &["write", "once"]).await.unwrap();

        let err = output(&diary, &["write", "twice"]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to write entry [DUPLICATE_DATE_ENTRY]: fix the input and try again"
        );
        assert!(matches!(
            err.downcast_ref::<DiaryError>(),
            Some(DiaryError::DuplicateDateEntry { .. })
        ));

        let err = output(&diary, &["past", "--years", "0"]).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to load past entries [VALIDATION_ERROR]"));
    }

    #[tokio::test]
    async fn file_store_keeps_entries_between_runs() {
        let temp = TempDir::new().expect("temp dir");
        let clock = Arc::new(FixedClock::on(ymd(2026, 2, 8)));
        let open = || {
            let repository = KvDiaryRepository::new(Arc::new(FileStore::new(temp.path().into())))
                .with_clock(clock.clone());
            Diary::with_clock(Arc::new(repository), clock.clone())
        };

        output(&open(), &["write", "persisted"]).await.unwrap();

        let shown = output(&open(), &["show"]).await.unwrap();
        assert!(shown.contains("persisted"));
    }
}
