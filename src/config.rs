use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Text generation gateway for local and cloud models")]
pub struct Config {
    #[arg(long, env, default_value = "0.0.0.0:8080")]
    pub bind_addr: String,
    /// Base URL of the local model daemon.
    #[arg(long, env, default_value = "http://localhost:11434")]
    pub local_url: String,
    /// Base URL of the cloud chat API.
    #[arg(long, env, default_value = "https://ollama.com")]
    pub cloud_url: String,
    /// Bearer credential for the cloud API. Cloud models are refused without it.
    #[arg(long, env = "OLLAMA_API_KEY", hide_env_values = true)]
    pub ollama_api_key: Option<String>,
    #[arg(long, env, default_value = "qwen:0.5b")]
    pub default_model: String,
    #[arg(long, env)]
    pub request_timeout_secs: Option<u64>,
    /// Serve Prometheus metrics on this address when set.
    #[arg(long, env)]
    pub metrics_addr: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Generate once and print the result.
    Ask {
        prompt: String,
        #[arg(long)]
        model: Option<String>,
    },
}

impl Config {
    /// The cloud credential, treating an empty value as absent.
    pub fn cloud_api_key(&self) -> Option<&str> {
        self.ollama_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}
