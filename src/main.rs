use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::timeout;
use tracing::info;

use yapyap::clipboard::WaylandClipboard;
use yapyap::config::Config;
use yapyap::page::InputAttrs;
use yapyap::popup::PopupController;
use yapyap::port::SocketPort;
use yapyap::tabs::LocalTabs;

/// Transcript lines the shell re-renders after each update, newest last.
const TRANSCRIPT_TAIL_LINES: usize = 8;

#[derive(Parser)]
#[command(name = "yapyap")]
#[command(about = "Voice dictation popup with in-page text injection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive popup shell against the recognizer socket
    Popup,
    /// Check the recognizer connection and print the first status
    Probe,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| dirs::config_dir().map(|d| d.join("yapyap/config.toml")))
        .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

    match cli.command {
        Some(Commands::Probe) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let config = Config::load(&config_path).await?;
                probe(config).await
            })?;
        }
        Some(Commands::Popup) | None => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let config = Config::load(&config_path).await?;
                info!("Starting YapYap popup");
                run_popup(config).await
            })?;
        }
    }

    Ok(())
}

async fn run_popup(config: Config) -> Result<()> {
    let (port, mut updates) = SocketPort::connect(&config.connection).await?;

    let mut controller = PopupController::new(
        &config.search,
        Box::new(port),
        Box::new(demo_tabs()),
        Box::new(WaylandClipboard::new(&config.clipboard)),
    );

    println!("YapYap popup. Commands: m=mic  c=copy  s=search  i=insert  q=quit");
    render(&controller);

    let mut input_lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            maybe = updates.recv() => match maybe {
                Some(update) => {
                    controller.handle_update(&update);
                    render(&controller);
                }
                None => {
                    println!("Recognizer disconnected.");
                    break;
                }
            },
            line = input_lines.next_line() => match line? {
                Some(cmd) => {
                    if handle_command(cmd.trim(), &mut controller).await? {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    Ok(())
}

async fn handle_command(cmd: &str, controller: &mut PopupController) -> Result<bool> {
    match cmd {
        "m" => controller.toggle().await?,
        "c" => controller.copy().await,
        "s" => controller.search().await?,
        "i" => controller.insert().await?,
        "q" => return Ok(true),
        "" => {}
        other => println!("Unknown command {:?} (m/c/s/i/q)", other),
    }
    Ok(false)
}

fn render(controller: &PopupController) {
    let mic = if controller.mic_active() { "●" } else { "○" };
    println!("[{} {}]", mic, controller.badge());
    let tail = controller.transcript().tail(TRANSCRIPT_TAIL_LINES);
    if !tail.is_empty() {
        print!("{}", tail);
    }
}

/// A local tab with a typical editable surface, so search and insert have
/// somewhere to land when no real page host is attached.
fn demo_tabs() -> LocalTabs {
    let mut tabs = LocalTabs::new();
    let tab = tabs.open("https://www.example.com/");
    if let Some(page) = tabs.page_mut(tab) {
        page.add_input(InputAttrs::of_type("search"), "");
        page.add_textarea("");
        page.add_editable("");
    }
    tabs
}

async fn probe(config: Config) -> Result<()> {
    let (_port, mut updates) = SocketPort::connect(&config.connection).await?;
    println!(
        "Connected to recognizer on channel {:?}.",
        config.connection.channel
    );

    match timeout(Duration::from_secs(5), updates.recv()).await {
        Ok(Some(update)) => println!("First status: {:?}", update),
        Ok(None) => println!("Recognizer closed the connection without a status."),
        Err(_) => println!("No status received within 5 seconds."),
    }

    Ok(())
}
