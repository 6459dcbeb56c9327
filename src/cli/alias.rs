//! Directory aliases (`autotag alias`)

use super::helpers::Context;
use autotag_core::error::{AutotagError, Result};
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum AliasCommand {
    /// Point an alias at a directory
    Set {
        name: String,

        path: PathBuf,

        /// Also make it the default
        #[arg(long)]
        default: bool,
    },

    Remove { name: String },

    List,

    /// Choose the alias used when commands omit one
    Default { name: String },
}

pub fn handle(ctx: &Context, command: AliasCommand) -> Result<()> {
    let mut store = ctx.alias_store();

    match command {
        AliasCommand::Set { name, path, default } => {
            if !path.is_dir() {
                return Err(AutotagError::Validation(vec![format!(
                    "'{}' is not a directory",
                    path.display()
                )]));
            }
            store.set(&name, &path, default)?;
            println!("{} -> {}", name, store.get(&name).unwrap_or(path.as_path()).display());
        }
        AliasCommand::Remove { name } => {
            if !store.remove(&name)? {
                return Err(AutotagError::UnknownAlias(name));
            }
            println!("Removed alias {}", name);
        }
        AliasCommand::List => {
            if store.list().is_empty() {
                println!("No aliases defined");
            }
            for (name, path) in store.list() {
                let marker = if store.default_alias() == Some(name.as_str()) { "*" } else { " " };
                println!("{} {:<16} {}", marker, name, path.display());
            }
        }
        AliasCommand::Default { name } => {
            store.set_default(&name)?;
            println!("Default alias: {}", name);
        }
    }

    Ok(())
}
