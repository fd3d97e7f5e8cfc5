#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "nifkit", about = "Legacy NetImmerse .nif inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print header fields and block type counts.
	Info(cmd::info::Args),
	/// List decoded blocks with names and links.
	Blocks(cmd::blocks::Args),
	/// Print the scene tree built from block 0.
	Scene(cmd::scene::Args),
	/// Inspect a directory of raw cache files.
	#[command(subcommand)]
	Cache(cmd::cache::Command),
}

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> nifkit::nif::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Blocks(args) => cmd::blocks::run(args),
		Commands::Scene(args) => cmd::scene::run(args),
		Commands::Cache(command) => cmd::cache::run(command),
	}
}
