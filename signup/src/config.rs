use clap::Parser;
use std::path::PathBuf;

/// A TUI for registering a new account
#[derive(Parser, Debug)]
#[clap(version)]
pub struct Config {
    /// The server to register with. Should only be the protocol and domain.
    #[clap(long, env = "SIGNUP_SERVER", default_value = "http://127.0.0.1:5000")]
    pub server: String,

    /// Use this CSRF token instead of reading one from the registration page.
    #[clap(long, env = "SIGNUP_CSRF_TOKEN")]
    pub csrf_token: Option<String>,

    /// Where should we store logs?
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

impl Config {
    /// Get either the configured or a default data directory. If no data
    /// directory can be found (e.g. because `$HOME` is unset) we will use the
    /// current directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("dev", "signup", "signup")
                    .map(|dirs| dirs.data_local_dir().to_owned())
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
