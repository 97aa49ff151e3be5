use crate::error::Result;
use crate::settings::{load_file_settings, load_settings, save_settings, settings_path, Settings};

pub fn run(api_url: Option<String>, bind: Option<String>, data_dir: Option<String>) -> Result<()> {
    if api_url.is_none() && bind.is_none() && data_dir.is_none() {
        show(&load_settings());
        return Ok(());
    }

    let mut settings = load_file_settings();
    if let Some(url) = api_url {
        settings.api_url = url;
    }
    if let Some(bind) = bind {
        settings.bind_addr = bind;
    }
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    save_settings(&settings)?;
    println!("Saved {}", settings_path().display());
    show(&settings);
    Ok(())
}

fn show(settings: &Settings) {
    println!("Settings file: {}", settings_path().display());
    println!("  api_url:   {}", settings.api_url);
    println!("  bind_addr: {}", settings.bind_addr);
    println!("  data_dir:  {}", settings.data_dir);
    println!("  database:  {}", settings.db_path().display());
}
