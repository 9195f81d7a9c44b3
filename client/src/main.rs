use bevy::prelude::*;
use clap::Parser;

use cli::ClientArgs;
use client_plugin::ClientPlugin;

mod cli;
mod client_plugin;
mod input;
mod screens;

fn main() -> anyhow::Result<()> {
    let args = ClientArgs::parse();

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&args.session_config())?);
        return Ok(());
    }

    App::new()
        .add_plugins(ClientPlugin::new(args))
        .run();
    Ok(())
}
