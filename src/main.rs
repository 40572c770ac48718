use color_eyre::eyre::{Result, WrapErr};
use emotion_diary::config::Config;
use emotion_diary::diary_state::DiaryState;
use emotion_diary::routes::{self, Route};
use emotion_diary::settings_state::SettingsState;
use emotion_diary::storage::FileStore;
use emotion_diary::ui::{Action, UI};
use log::{error, info};
use std::fs::{self, OpenOptions};

fn init_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.data_dir).wrap_err_with(|| {
        format!("Failed to create data directory {}", config.data_dir.display())
    })?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file())
        .wrap_err("Failed to open log file")?;

    // The terminal belongs to the UI, so logs go to a file.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::from_env();
    init_logging(&config)?;
    info!("Using data directory {}", config.data_dir.display());

    let mut diary_state = DiaryState::load(FileStore::new(&config.data_dir));
    let mut settings_state = SettingsState::load(FileStore::new(&config.data_dir));

    // An optional start path, e.g. `/new` or `/diary/<id>`.
    let start = std::env::args()
        .nth(1)
        .map(|path| routes::resolve(&path))
        .unwrap_or(Route::Home);
    info!(
        "Loaded {} entries, starting at {}",
        diary_state.len(),
        start.path()
    );

    let mut ui = UI::new()?;
    ui.navigate(start, &diary_state);

    loop {
        ui.display(&diary_state, &settings_state)?;

        if let Some(action) = ui.handle_input(&diary_state, &settings_state)? {
            match action {
                Action::SaveEntry { id: None, draft } => match diary_state.add(draft) {
                    Ok(entry) => {
                        ui.navigate(Route::DiaryDetail { id: entry.id }, &diary_state);
                        ui.set_status("Entry saved");
                    }
                    Err(e) => report(&mut ui, "Could not save the entry", e),
                },
                Action::SaveEntry {
                    id: Some(id),
                    draft,
                } => match diary_state.update(&id, draft) {
                    Ok(Some(entry)) => {
                        ui.navigate(Route::DiaryDetail { id: entry.id }, &diary_state);
                        ui.set_status("Entry updated");
                    }
                    Ok(None) => {
                        ui.navigate(Route::Home, &diary_state);
                        ui.set_status("That entry no longer exists");
                    }
                    Err(e) => report(&mut ui, "Could not update the entry", e),
                },
                Action::DeleteEntry(id) => match diary_state.delete(&id) {
                    Ok(deleted) => {
                        ui.navigate(Route::Home, &diary_state);
                        ui.set_status(if deleted {
                            "Entry deleted"
                        } else {
                            "That entry no longer exists"
                        });
                    }
                    Err(e) => report(&mut ui, "Could not delete the entry", e),
                },
                Action::SaveApiKey(value) => match settings_state.set_api_key(Some(&value)) {
                    Ok(()) if settings_state.has_api_key() => ui.set_status("API key saved"),
                    Ok(()) => ui.set_status("API key cleared"),
                    Err(e) => report(&mut ui, "Could not save the API key", e),
                },
                Action::ClearApiKey => match settings_state.clear_api_key() {
                    Ok(()) => ui.set_status("API key cleared"),
                    Err(e) => report(&mut ui, "Could not clear the API key", e),
                },
                Action::Quit => break,
            }
        }
    }

    Ok(())
}

/// Write failures are shown to the user instead of ending the session.
fn report(ui: &mut UI, message: &str, e: color_eyre::Report) {
    error!("{message}: {e:#}");
    ui.set_status(format!("{message}: {e}"));
}
