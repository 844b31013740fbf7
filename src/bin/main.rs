use anyhow::Error;
use reqwest::Client;
use std::path::PathBuf;
use structopt::StructOpt;

use seentia_session::{
    config, FileTokenStore, HttpBackend, SessionStatus, SessionStore,
};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "seentia-session",
    about = "Drive a SEENTIA session from the command line."
)]
struct Args {
    /// Backend base URL. Falls back to $SEENTIA_API_URL, then to the
    /// local-development address.
    #[structopt(long = "api-url")]
    api_url: Option<String>,
    /// Directory the token is persisted in.
    #[structopt(
        long = "state-dir",
        env = "SEENTIA_STATE_DIR",
        default_value = ".seentia"
    )]
    state_dir: PathBuf,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Sign in and persist the session token.
    Login { email: String, password: String },
    /// Create an account. You still need to log in afterwards.
    Register {
        email: String,
        password: String,
        #[structopt(long)]
        name: Option<String>,
    },
    /// Show the current session status.
    Status,
    /// Fetch and show the signed-in user's profile.
    Whoami,
    /// Drop the session and the persisted token.
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    let api_url = args
        .api_url
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(config::api_url);
    let client = Client::builder()
        .user_agent(seentia_session::DEFAULT_USER_AGENT)
        .build()?;
    let backend = HttpBackend::new(client, api_url);
    let tokens = FileTokenStore::new(&args.state_dir);

    let mut store = SessionStore::new(backend, Box::new(tokens));
    store.initialize();

    match args.cmd {
        Command::Login { email, password } => {
            store.login(&email, &password).await?;
            println!("Logged in as {}", email);
        },
        Command::Register {
            email,
            password,
            name,
        } => {
            let user =
                store.register(&email, &password, name.as_deref()).await?;
            println!("Registered {} (id {})", user.email, user.id);
        },
        Command::Status => match store.status() {
            SessionStatus::Authenticated => println!("Authenticated"),
            SessionStatus::Unauthenticated => println!("Not logged in"),
            SessionStatus::Initializing => println!("Initializing"),
        },
        Command::Whoami => {
            store.refresh_profile().await?;
            match store.user() {
                Some(user) => println!(
                    "{} <{}>",
                    user.name.as_deref().unwrap_or("(no name)"),
                    user.email
                ),
                None => println!("Not logged in"),
            }
        },
        Command::Logout => {
            store.logout();
            println!("Logged out");
        },
    }

    Ok(())
}
