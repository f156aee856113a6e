//! Connections command - list registry entries.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the connections command.
#[derive(Args, Debug)]
pub struct ConnectionsArgs {}

/// Print one connection name per line; `*` marks the default.
pub fn run(_args: ConnectionsArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let names = registry.connection_names();
    if names.is_empty() {
        println!("No connections configured.");
        return Ok(());
    }

    let default = registry.default_connection.as_deref();
    for name in names {
        let marker = if Some(name) == default { "*" } else { " " };
        if ctx.verbose
            && let Some(entry) = registry.get(name)
        {
            let host = entry.host.as_deref().unwrap_or("-");
            println!("{} {} ({})", marker, name, host);
        } else {
            println!("{} {}", marker, name);
        }
    }
    Ok(())
}
