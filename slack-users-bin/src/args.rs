use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueHint};
use slack_users::{SlackClient, User};
use tracing::debug;

use crate::config::{default_config_path, Config};

/// Look up members of a Slack workspace
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Config file location
    #[arg(short, long, default_value_os_t = default_config_path(), value_hint = ValueHint::FilePath)]
    config: PathBuf,

    /// Slack API token. Takes precedence over the token in the config file.
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log requests to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all members of the workspace.
    List {
        /// Include deactivated members.
        #[arg(long)]
        include_deleted: bool,
    },

    /// Show a single member.
    Info {
        /// Member ID, e.g. U023BECGF.
        user_id: String,
    },

    /// Show the first member matching a field.
    Find {
        #[command(flatten)]
        by: FindBy,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct FindBy {
    /// Username.
    #[arg(long)]
    name: Option<String>,

    /// Profile email, case insensitive.
    #[arg(long)]
    email: Option<String>,

    /// Member ID.
    #[arg(long)]
    id: Option<String>,
}

impl Args {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn run(&self) -> Result<()> {
        let conf = Config::read_or_default(&self.config)?;
        debug!(config = %self.config.display(), "loaded config");
        let token = resolve_token(self.token.as_deref(), &conf)?;

        let reqwest_client = reqwest::Client::builder()
            .timeout(conf.timeout())
            .build()?;
        let mut client = SlackClient::new(&reqwest_client, &token);
        if let Some(api_url) = &conf.api_url {
            client = client.with_base_url(api_url)?;
        }

        match &self.command {
            Commands::List { include_deleted } => {
                let users: Vec<User> = client
                    .users_list()
                    .await?
                    .into_iter()
                    .filter(|u| *include_deleted || !u.deleted)
                    .collect();
                print_json(&users)?;
            }
            Commands::Info { user_id } => {
                let user = client.users_info(user_id).await?;
                print_json(&user)?;
            }
            Commands::Find { by } => {
                let user = if let Some(name) = &by.name {
                    client.find_user_by_name(name).await?
                } else if let Some(email) = &by.email {
                    client.find_user_by_email(email).await?
                } else if let Some(id) = &by.id {
                    client.find_user(|u| &u.id == id).await?
                } else {
                    return Err(anyhow!("one of --name, --email or --id is required"));
                };
                print_json(&user)?;
            }
        }

        Ok(())
    }
}

fn resolve_token(flag: Option<&str>, conf: &Config) -> Result<String> {
    flag.or(conf.token.as_deref())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Missing Slack token, pass --token, set SLACK_TOKEN, or add token to the config file"))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
