use anyhow::Result;
use automotive_chat::agent::{AgentHandle, AssistantResponse, ChatAgent};
use automotive_chat::config::AppConfig;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "automotive-chat")]
#[command(about = "Ask questions in Thai about the automotive sewing and QC database")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a single question
    Ask {
        question: String,

        /// Also suggest a chart for the answer
        #[arg(long)]
        chart: bool,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the tables the assistant may query
    Tables {
        /// Include table descriptions
        #[arg(long)]
        describe: bool,
    },
    /// Show provider, model and readiness
    Status,
    /// Interactive session. `:reload` rebuilds the agent, `:quit` exits.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;
    let agent = ChatAgent::initialize(config).await?;

    match args.command {
        Command::Ask { question, chart, json } => {
            let response = if chart {
                agent.ask_with_chart(&question).await
            } else {
                agent.ask(&question).await
            };
            print_response(&response, json)?;
        }
        Command::Tables { describe } => {
            let catalog = agent.catalog();
            if catalog.is_fallback() {
                info!("Database unavailable, showing default table list");
            }
            if describe {
                for (table, description) in catalog.describe() {
                    println!("{:<28} {}", table, description);
                }
            } else {
                for table in catalog.tables() {
                    println!("{}", table);
                }
            }
        }
        Command::Status => {
            let status = agent.status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Chat => run_chat(AgentHandle::new(agent)).await?,
    }

    Ok(())
}

async fn run_chat(handle: AgentHandle) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            ":quit" | ":exit" => break,
            ":reload" => match handle.reload().await {
                Ok(agent) => println!("🔄 โหลด Agent ใหม่แล้ว ({} ตาราง)", agent.catalog().len()),
                Err(e) => {
                    error!("Reload failed: {}", e);
                    println!("{}", e.user_message());
                }
            },
            question => {
                let agent = handle.current().await;
                let response = agent.ask_with_chart(question).await;
                print_response(&response, false)?;
            }
        }
    }

    Ok(())
}

fn print_response(response: &AssistantResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    println!("{}", response.answer);
    if let Some(chart) = &response.chart {
        println!("\n📊 {}", chart.title);
        for point in &chart.data {
            println!("  {:<20} {}", point.label, point.value);
        }
    }
    Ok(())
}
