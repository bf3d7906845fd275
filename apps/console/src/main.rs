use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ChatOutcome, ClientError, MaintenanceOutcome, SessionController,
    SettingsOverrides, UploadFile, UploadOutcome, CHAT_FALLBACK_MESSAGE, UPLOAD_FALLBACK_MESSAGE,
};
use shared::domain::Role;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "resume-chat-cli", about = "Terminal client for the resume chat backend")]
struct Args {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[arg(long, global = true)]
    context_chunks: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show backend health and whether a resume is indexed.
    Status,
    /// Upload a PDF resume.
    Upload { path: PathBuf },
    /// Ask a single question.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Interactive chat; `/quit` or end of input leaves.
    Chat,
    /// Build the backend index from the stored resume.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Clear the backend's resume and index.
    Reset,
    /// List suggested questions.
    Questions,
    /// Print the effective configuration.
    Config,
}

impl Args {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            config_path: self.config.clone(),
            api_base_url: self.api_base_url.clone(),
            request_timeout_secs: self.timeout_secs,
            context_chunks: self.context_chunks,
            status_poll_interval_secs: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args.overrides()).context("loading client settings")?;
    if let Command::Config = args.command {
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    let controller =
        SessionController::with_http(&settings.api_base_url, settings.controller_settings())
            .context("building API client")?;
    let hint = |err: &ClientError| {
        if err.is_transport() {
            eprintln!("Is the backend running at {}?", settings.api_base_url);
        }
    };

    match args.command {
        Command::Status => print_status(&controller).await,
        Command::Upload { path } => upload(&controller, path, hint).await?,
        Command::Ask { question } => {
            ensure_resume(&controller).await?;
            ask(&controller, &question.join(" "), hint).await?;
        }
        Command::Chat => {
            ensure_resume(&controller).await?;
            interactive_chat(&controller).await?;
        }
        Command::Init { force } => {
            report_maintenance("initialize", controller.initialize_backend(force).await, hint)?;
            print_status(&controller).await;
        }
        Command::Reset => {
            report_maintenance("reset", controller.reset_backend().await, hint)?
        }
        Command::Questions => {
            if let Err(err) = controller.load_sample_questions().await {
                eprintln!("Using built-in suggestions ({err})");
            }
            for question in controller.snapshot().sample_questions() {
                println!("- {question}");
            }
        }
        Command::Config => {}
    }
    Ok(())
}

async fn print_status(controller: &SessionController) {
    let status = controller.refresh_status().await;
    let badge = controller.snapshot().badge();
    println!("{}", badge.text);
    println!("  backend:     {}", String::from(status.status.clone()));
    println!("  initialized: {}", status.initialized);
    if let Some(path) = status.resume_path.as_deref() {
        println!("  resume:      {path}");
    }
}

async fn ensure_resume(controller: &SessionController) -> Result<()> {
    controller.refresh_status().await;
    if !controller.go_to_chat() {
        bail!("{}", controller.snapshot().badge().text);
    }
    Ok(())
}

async fn upload(
    controller: &SessionController,
    path: PathBuf,
    hint: impl Fn(&ClientError),
) -> Result<()> {
    let shown = path.display().to_string();
    match controller.upload_file(UploadFile::from_path(path)).await {
        UploadOutcome::Uploaded => {
            let snapshot = controller.snapshot();
            tracing::info!(file = %shown, "resume uploaded");
            println!("Uploaded: {shown}");
            println!("{}", snapshot.badge().text);
            Ok(())
        }
        UploadOutcome::Rejected(err) | UploadOutcome::Failed(err) => {
            tracing::debug!(file = %shown, "upload failed: {err:?}");
            hint(&err);
            let message = controller
                .snapshot()
                .upload()
                .error_message
                .clone()
                .unwrap_or_else(|| err.user_message(UPLOAD_FALLBACK_MESSAGE));
            bail!("{message}")
        }
        UploadOutcome::Busy | UploadOutcome::Discarded => bail!("upload did not complete"),
    }
}

async fn ask(
    controller: &SessionController,
    question: &str,
    hint: impl Fn(&ClientError),
) -> Result<()> {
    match controller.send_chat_message(question).await {
        ChatOutcome::Answered(answer) => {
            println!("{answer}");
            Ok(())
        }
        ChatOutcome::Failed(err) => {
            hint(&err);
            bail!("{}", err.user_message(CHAT_FALLBACK_MESSAGE))
        }
        ChatOutcome::Ignored => bail!("question is empty"),
        ChatOutcome::Discarded => Ok(()),
    }
}

async fn interactive_chat(controller: &SessionController) -> Result<()> {
    println!("Ask about the resume. Type /questions for ideas, /quit to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/questions" => {
                for question in controller.snapshot().sample_questions() {
                    println!("  {question}");
                }
                continue;
            }
            _ => {}
        }

        match controller.send_chat_message(&line).await {
            ChatOutcome::Answered(_) => {
                if let Some(reply) = controller
                    .snapshot()
                    .transcript()
                    .last()
                    .filter(|message| message.role == Role::Assistant)
                {
                    println!("{}\n", reply.text);
                }
            }
            ChatOutcome::Failed(err) => {
                tracing::debug!("chat request failed: {err:?}");
                eprintln!("{}\n", err.user_message(CHAT_FALLBACK_MESSAGE));
            }
            ChatOutcome::Ignored | ChatOutcome::Discarded => {}
        }
    }
    controller.go_to_landing();
    Ok(())
}

fn report_maintenance(
    operation: &'static str,
    outcome: MaintenanceOutcome,
    hint: impl Fn(&ClientError),
) -> Result<()> {
    match outcome {
        MaintenanceOutcome::Done(message) => {
            tracing::info!(operation, "maintenance finished");
            println!("{message}");
            Ok(())
        }
        MaintenanceOutcome::Failed(err) => {
            hint(&err);
            Err(err).with_context(|| format!("{operation} request failed"))
        }
        MaintenanceOutcome::Busy => bail!("another maintenance request is running"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_joins_words_into_one_question() {
        let args = Args::parse_from(["resume-chat-cli", "ask", "what", "are", "your", "skills?"]);
        match args.command {
            Command::Ask { question } => assert_eq!(question.join(" "), "what are your skills?"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_become_overrides() {
        let args = Args::parse_from([
            "resume-chat-cli",
            "init",
            "--force",
            "--api-base-url",
            "http://localhost:9000",
        ]);
        assert!(matches!(args.command, Command::Init { force: true }));
        let overrides = args.overrides();
        assert_eq!(overrides.api_base_url.as_deref(), Some("http://localhost:9000"));
        assert!(overrides.status_poll_interval_secs.is_none());
    }
}
