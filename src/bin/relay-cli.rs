use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Smoke-test client for the chat relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:10000")]
    url: String,

    /// Shared secret, sent as x-proxy-secret.
    #[arg(short, long, env = "PROXY_SECRET")]
    secret: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay liveness
    Health,
    /// Send a chat request
    Chat {
        /// Prompt sent as a single user message
        #[arg(required_unless_present = "messages_file")]
        prompt: Option<String>,

        /// JSON file holding a messages array
        #[arg(long, conflicts_with = "prompt")]
        messages_file: Option<PathBuf>,

        #[arg(long)]
        max_tokens: Option<u32>,

        #[arg(long)]
        temperature: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(secret) = &cli.secret {
        headers.insert("x-proxy-secret", HeaderValue::from_str(secret)?);
    }

    match cli.command {
        Commands::Health => {
            let res = client
                .get(format!("{}/health", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Chat {
            prompt,
            messages_file,
            max_tokens,
            temperature,
        } => {
            let mut body = json!({});
            if let Some(path) = messages_file {
                let messages: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
                body["messages"] = messages;
            } else if let Some(prompt) = prompt {
                body["prompt"] = Value::String(prompt);
            }
            if let Some(max_tokens) = max_tokens {
                body["max_tokens"] = json!(max_tokens);
            }
            if let Some(temperature) = temperature {
                body["temperature"] = json!(temperature);
            }

            let res = client
                .post(format!("{}/api/chat", cli.url))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("relay returned status {}", status).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn error_status_fails_the_command() {
        for status in [403, 429, 500] {
            let res = response(status, r#"{"error":"nope"}"#);
            assert!(print_response(res).await.is_err(), "status {status}");
        }
    }

    #[tokio::test]
    async fn success_prints_body() {
        assert!(print_response(response(200, r#"{"ok":true}"#)).await.is_ok());
    }
}
