mod config;
mod gearing;
mod setups;
mod tournaments;
mod utils;

use clap::{Parser, Subcommand};
use pitwall_api::{Client, Error};

use config::Config;

#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Args {
    /// Gateway base url, overriding the config file.
    #[clap(long)]
    gateway: Option<String>,
    /// Gateway publishable key, overriding the config file.
    #[clap(long)]
    key: Option<String>,
    #[clap(short, long)]
    email: Option<String>,
    #[clap(short, long)]
    password: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Tournaments {
        #[clap(subcommand)]
        command: tournaments::Command,
    },
    Setups {
        #[clap(subcommand)]
        command: setups::Command,
    },
    Gearing {
        #[clap(subcommand)]
        command: gearing::Command,
    },
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let args = Args::parse();

    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(err) => {
            log::debug!("Not using config.toml: {}", err);
            Config::default()
        }
    }
    .with_environment();

    if let Some(url) = args.gateway {
        config.gateway.url = url;
    }

    if let Some(key) = args.key {
        config.gateway.key = key;
    }

    if config.gateway.url.is_empty() {
        println!("No gateway configured; set --gateway, PITWALL_GATEWAY_URL or config.toml");
        std::process::exit(1);
    }

    let client = Client::new(config.gateway.url, config.gateway.key);

    if let Some((email, password)) = args.email.zip(args.password) {
        match client.auth().sign_in(&email, &password).await {
            Ok(_) => println!("Signed in"),
            Err(err) => {
                match err {
                    Error::Unauthorized => println!("Failed to sign in: Unauthorized"),
                    err => println!("Failed to sign in: {}", err),
                }

                std::process::exit(1);
            }
        }
    }

    let res = match args.command {
        Command::Tournaments { command } => command.run(&client).await,
        Command::Setups { command } => command.run(&client).await,
        Command::Gearing { command } => command.run(),
    };

    if let Err(err) = res {
        println!("{}", err);
    }
}
