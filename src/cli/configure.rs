// src/cli/configure.rs
use std::io;

use super::SettingsArgs;
use crate::settings::io::{get_config_path, save_settings_to_file};
use crate::settings::AppSettings;

/// `settings`: apply any given flags, persist if something changed, then print.
pub fn run(args: SettingsArgs, mut settings: AppSettings) -> io::Result<()> {
    if apply(&args, &mut settings) {
        save_settings_to_file(&settings)?;
        println!("Settings updated.\n");
    }

    println!("Settings file: {}\n", get_config_path()?.display());
    println!("{:<22} {}", "model_tier", format!("{} ({})", settings.model_tier, settings.model_tier.model_name()));
    println!("{:<22} {}", "max_attempts", settings.max_attempts);
    println!("{:<22} {}", "strict_schema", settings.strict_schema);
    println!("{:<22} {}", "request_timeout_secs", settings.request_timeout_secs);
    println!("{:<22} {}", "default_sheet", settings.default_sheet.display());
    println!("{:<22} {}", "default_documents", settings.default_documents.display());
    Ok(())
}

/// Returns whether anything was changed.
fn apply(args: &SettingsArgs, settings: &mut AppSettings) -> bool {
    let before = settings.clone();
    if let Some(tier) = args.model_tier {
        settings.model_tier = tier;
    }
    if let Some(n) = args.max_attempts {
        settings.max_attempts = n.max(1);
    }
    if let Some(strict) = args.strict_schema {
        settings.strict_schema = strict;
    }
    if let Some(secs) = args.request_timeout_secs {
        settings.request_timeout_secs = secs;
    }
    if let Some(path) = &args.default_sheet {
        settings.default_sheet = path.clone();
    }
    if let Some(path) = &args.default_documents {
        settings.default_documents = path.clone();
    }
    *settings != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ModelTier;

    #[test]
    fn test_apply_reports_changes() {
        let mut settings = AppSettings::default();
        assert!(!apply(&SettingsArgs::default(), &mut settings));

        let args = SettingsArgs {
            model_tier: Some(ModelTier::Pro),
            max_attempts: Some(0),
            ..SettingsArgs::default()
        };
        assert!(apply(&args, &mut settings));
        assert_eq!(settings.model_tier, ModelTier::Pro);
        assert_eq!(settings.max_attempts, 1);
    }
}
