//! Profiles command - list registered banks or export the built-in definitions.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use cardstmt_core::profiles::builtin_specs;

use super::load_config;
use crate::output::bank_slug;

/// Arguments for the profiles command.
#[derive(Args)]
pub struct ProfilesArgs {
    /// Write the built-in profiles as JSON files into this directory
    #[arg(long)]
    export: Option<PathBuf>,
}

pub async fn run(args: ProfilesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if let Some(dir) = args.export {
        return export_builtin(&dir);
    }

    let config = load_config(config_path)?;
    let registry = config.build_registry()?;

    println!("{}", style("Bank profiles (detection order):").bold());
    for (i, profile) in registry.iter().enumerate() {
        println!(
            "  {}. {:<24} dates: {:?}, amounts: {:?}",
            i + 1,
            profile.name(),
            profile.date_order(),
            profile.sign_policy()
        );
    }

    Ok(())
}

fn export_builtin(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;

    for spec in builtin_specs() {
        let path = dir.join(format!("{}.json", bank_slug(&spec.name)));
        fs::write(&path, serde_json::to_string_pretty(&spec)?)?;
        println!("{} Exported {} to {}", style("✓").green(), spec.name, path.display());
    }

    Ok(())
}
