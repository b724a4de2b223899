// Command layer: each user action opens the data store, reads the saved
// credentials where needed, talks to Sonarr and prints the result. The store
// is closed again however the action ends.

use std::io::Write;
use std::path::Path;

use crate::api::{AddOptions, ApiClient, Series};
use crate::cli::Command;
use crate::config::Config;
use crate::credentials::{save_credentials, Credentials};
use crate::error::{Error, Result};
use crate::store::{KeyValueStore, Store};
use crate::ui::{with_spinner, Prompter};

/// Run one command to completion.
pub fn execute(
    command: Command,
    config: &Config,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    tracing::debug!(?command, store_dir = %config.store_dir.display(), "running command");

    match command {
        Command::Save => with_store(&config.store_dir, |store| save(store, prompter, out)),
        Command::Credentials => with_store(&config.store_dir, |store| show_credentials(&*store, out)),
        Command::Search { title } => {
            let title = title.join(" ");
            if title.trim().is_empty() {
                return Err(Error::validation("a title is required"));
            }
            with_store(&config.store_dir, |store| {
                let client = connect(&*store, config)?;
                search(&client, title.trim(), out)
            })
        }
        Command::Show { tvdb_id } => {
            let tvdb_id = parse_tvdb_id(&tvdb_id)?;
            with_store(&config.store_dir, |store| {
                let client = connect(&*store, config)?;
                show(&client, tvdb_id, out)
            })
        }
        Command::Add { tvdb_id } => {
            let tvdb_id = parse_tvdb_id(&tvdb_id)?;
            with_store(&config.store_dir, |store| {
                let client = connect(&*store, config)?;
                add(&client, tvdb_id, prompter, out).map(|_| ())
            })
        }
        Command::Unlock => unlock(&config.store_dir, out),
    }
}

/// Open the store, run `action` and close the store on every path.
pub fn with_store<T>(dir: &Path, action: impl FnOnce(&mut Store) -> Result<T>) -> Result<T> {
    let mut store = Store::open(dir)?;
    let result = action(&mut store);
    store.close();
    result
}

fn connect<S: KeyValueStore + ?Sized>(store: &S, config: &Config) -> Result<ApiClient> {
    let credentials = Credentials::load(store)?;
    ApiClient::new(&credentials, config.client_options())
}

fn parse_tvdb_id(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation("a tvdb id is required"));
    }
    raw.parse()
        .map_err(|_| Error::validation(format!("'{raw}' is not a valid tvdb id")))
}

fn output_error(err: std::io::Error) -> Error {
    Error::io("failed to write output", err)
}

/// Prompt for the url and api key and save both after confirmation.
pub fn save<S: KeyValueStore + ?Sized>(
    store: &mut S,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<()> {
    let url = prompter.input("enter the url that points to sonarr")?;
    if url.trim().is_empty() {
        return Err(Error::validation("url is required"));
    }

    let key = prompter.password("enter your api key")?;
    let credentials = Credentials::new(&url, &key)?;

    writeln!(
        out,
        "URL: {}\nAPI Key: {}",
        credentials.service_url, credentials.api_key
    )
    .map_err(output_error)?;

    if !prompter.confirm("Are you sure you want to save?")? {
        writeln!(out, "save cancelled").map_err(output_error)?;
        return Ok(());
    }

    save_credentials(store, &credentials)?;
    writeln!(out, "saved credentials").map_err(output_error)
}

/// Print the saved credentials.
pub fn show_credentials<S: KeyValueStore + ?Sized>(store: &S, out: &mut dyn Write) -> Result<()> {
    let credentials = Credentials::load(store)?;
    write!(
        out,
        "URL: {}\nAPI Key: {}\n",
        credentials.service_url, credentials.api_key
    )
    .map_err(output_error)
}

pub fn search(client: &ApiClient, title: &str, out: &mut dyn Write) -> Result<()> {
    let results = with_spinner("searching...", || client.search(title))?;

    if results.is_empty() {
        return writeln!(out, "no results").map_err(output_error);
    }
    for series in &results {
        writeln!(out, "{} ({}) - {}", series.title, series.year, series.tvdb_id)
            .map_err(output_error)?;
    }
    Ok(())
}

/// title (year) - tvdb id, then the overview on an indented line.
pub fn show(client: &ApiClient, tvdb_id: u64, out: &mut dyn Write) -> Result<()> {
    let series = with_spinner("looking up series...", || client.series_by_tvdb(tvdb_id))?;
    write!(
        out,
        "{} ({}) - {}\n\t{}\n",
        series.title, series.year, series.tvdb_id, series.overview
    )
    .map_err(output_error)
}

/// Look the series up, let the user pick a quality profile and root folder,
/// then add it monitored with a search for missing episodes.
pub fn add(
    client: &ApiClient,
    tvdb_id: u64,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<Series> {
    let mut series = with_spinner("looking up series...", || client.series_by_tvdb(tvdb_id))?;

    let profiles = with_spinner("loading quality profiles...", || client.profiles())?;
    let names: Vec<String> = profiles.iter().map(|profile| profile.name.clone()).collect();
    let profile_index = choose(prompter, "please choose a quality profile", &names, "quality profiles")?;
    let profile = &profiles[profile_index];

    let folders = with_spinner("loading root folders...", || client.root_folders())?;
    let paths: Vec<String> = folders.iter().map(|folder| folder.path.clone()).collect();
    let folder_index = choose(
        prompter,
        "choose a folder to download this series to",
        &paths,
        "root folders",
    )?;
    let folder = &folders[folder_index];

    prepare_for_add(&mut series, profile.id, &folder.path);

    let added = with_spinner("adding series...", || client.add_series(&series))?;
    writeln!(out, "added {} ({}) successfully", series.title, series.year)
        .map_err(output_error)?;
    Ok(added)
}

/// Ask for one of `items`, rejecting empty lists and out-of-range answers.
fn choose(prompter: &mut dyn Prompter, prompt: &str, items: &[String], what: &str) -> Result<usize> {
    if items.is_empty() {
        return Err(Error::NotFound(what.to_string()));
    }
    let index = prompter.select(prompt, items)?;
    if index >= items.len() {
        return Err(Error::validation(format!(
            "invalid selection {index}: expected a number from 0 to {}",
            items.len() - 1
        )));
    }
    Ok(index)
}

/// Apply the add-time settings Sonarr expects on a looked-up series.
pub fn prepare_for_add(series: &mut Series, profile_id: u64, root_folder: &str) {
    series.quality_profile_id = Some(profile_id);
    series.root_folder_path = Some(root_folder.to_string());
    series.monitored = true;
    series.add_options = Some(AddOptions {
        search_for_missing_episodes: true,
        ..AddOptions::default()
    });
}

pub fn unlock(dir: &Path, out: &mut dyn Write) -> Result<()> {
    Store::force_unlock(dir)?;
    writeln!(out, "removed LOCK file").map_err(output_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tvdb_id_must_be_numeric() {
        assert_eq!(parse_tvdb_id(" 79126 ").unwrap(), 79126);
        assert!(matches!(parse_tvdb_id(""), Err(Error::Validation(_))));
        assert!(matches!(parse_tvdb_id("the-wire"), Err(Error::Validation(_))));
        assert!(matches!(parse_tvdb_id("-1"), Err(Error::Validation(_))));
    }

    #[test]
    fn prepare_for_add_sets_monitoring_and_search() {
        let mut series = Series {
            title: "The Wire".into(),
            year: 2002,
            tvdb_id: 79126,
            ..Series::default()
        };
        prepare_for_add(&mut series, 3, "/tv/");

        assert_eq!(series.quality_profile_id, Some(3));
        assert_eq!(series.root_folder_path.as_deref(), Some("/tv/"));
        assert!(series.monitored);
        assert!(series.add_options.unwrap().search_for_missing_episodes);
    }

    #[test]
    fn with_store_releases_lock_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = with_store(dir.path(), |_| -> Result<()> {
            Err(Error::validation("boom"))
        })
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(Store::open(dir.path()).is_ok());
    }

    #[test]
    fn unlock_reports_missing_lock() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        assert!(matches!(unlock(dir.path(), &mut out), Err(Error::Io { .. })));
        assert!(out.is_empty());
    }
}
