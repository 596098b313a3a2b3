use crate::cli::ConfigCommands;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path};

pub fn run(command: ConfigCommands) -> Result<()> {
    let mut settings = load_settings();
    match command {
        ConfigCommands::Show => {
            let file = if settings.source_file.is_empty() {
                "(not set)"
            } else {
                &settings.source_file
            };
            println!("Settings:    {}", settings_path().display());
            println!("Source file: {file}");
            println!("Sheet:       {:?}", settings.sheet_name);
            println!("Export dir:  {}", settings.export_dir);
            return Ok(());
        }
        ConfigCommands::SetFile { path } => {
            settings.source_file = shellexpand_path(&path);
            println!("Source file set to {}", settings.source_file);
        }
        ConfigCommands::SetSheet { name } => {
            println!("Sheet set to {name:?}");
            settings.sheet_name = name;
        }
        ConfigCommands::SetExportDir { path } => {
            settings.export_dir = shellexpand_path(&path);
            println!("Export directory set to {}", settings.export_dir);
        }
    }
    save_settings(&settings)
}
