use clap::Parser;
use std::path::PathBuf;

use tubescript::config::{ExecutionMode, Overrides};

#[derive(Parser)]
#[command(
    name = "tubescript",
    about = "HTTP relay that returns YouTube transcripts as flat text",
    version
)]
pub struct Cli {
    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Default caption language when a request omits `lang`
    #[arg(short, long, env = "YOUTUBE_TRANSCRIPT_LANG")]
    pub lang: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS")]
    pub bind: Option<String>,

    /// standalone binds a listener; hosted hands the router to an external host
    #[arg(long, value_enum, env = "TUBESCRIPT_MODE", default_value_t = ExecutionMode::Standalone)]
    pub mode: ExecutionMode,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            lang: self.lang.clone(),
            port: self.port,
            bind: self.bind.clone(),
            mode: self.mode,
        }
    }
}
