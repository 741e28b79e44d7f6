use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    enter, load_settings, ApiClient, DashboardController, DashboardState, FileSessionStore,
    LoginController, Notice, NoticeKind, Route, SelectedFile, SessionStore, SignupController,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "summaize", about = "Upload PDFs and get model-generated summaries")]
struct Args {
    /// Backend base URL; overrides summaize.toml and environment settings.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    /// Where the signed-in session is kept.
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Logout,
    Whoami,
    /// Upload a PDF and print its summary.
    Summarize {
        file: PathBuf,
        #[arg(long, default_value = "bart-large")]
        model: String,
        /// Also store the summary on the backend.
        #[arg(long)]
        save: bool,
    },
    Feedback {
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
    /// List summaries stored on the backend.
    Summaries,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    if let Some(path) = args.session_file {
        settings.session_path = path;
    }

    let api = ApiClient::new(&settings.api_base_url)?;
    tracing::debug!(
        api_base_url = api.base_url(),
        session_path = %settings.session_path.display(),
        "client configured"
    );
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&settings.session_path));

    match args.command {
        Command::Login { email, password } => {
            let login = LoginController::new(api, store.clone());
            login.set_email(email);
            login.set_password(password);
            if let Err(e) = login.submit().await {
                bail!(login.state().error.unwrap_or_else(|| e.user_message()));
            }
            let session = store
                .load()
                .await?
                .ok_or_else(|| anyhow!("session was not stored"))?;
            println!("Logged in as {} (user_id={})", session.username, session.user_id);
        }
        Command::Signup {
            username,
            email,
            password,
            confirm_password,
        } => {
            let signup = SignupController::new(api, store);
            signup.set_username(username);
            signup.set_email(email);
            signup.set_password(password);
            signup.set_confirm_password(confirm_password);
            match signup.submit().await {
                Ok(Route::Dashboard) => println!("Account created and signed in."),
                Ok(_) => println!("Account created. Run `summaize login` to sign in."),
                Err(e) => bail!(signup.state().error.unwrap_or_else(|| e.user_message())),
            }
        }
        Command::Logout => match DashboardController::enter(api, store).await {
            Ok(dashboard) => {
                dashboard.logout().await?;
                println!("Logged out.");
            }
            Err(_) => println!("Not signed in."),
        },
        Command::Whoami => match enter(Route::Dashboard, store.as_ref()).await {
            Route::Dashboard => {
                let session = store.load().await?.ok_or_else(|| anyhow!("session vanished"))?;
                println!("{} (user_id={})", session.username, session.user_id);
            }
            _ => println!("Not signed in."),
        },
        Command::Summarize { file, model, save } => {
            let dashboard = open_dashboard(api, store).await?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document.pdf".to_string());

            dashboard.select_file(SelectedFile::pdf(file_name, bytes));
            run_step(&dashboard, dashboard.upload()).await?;
            dashboard.select_model(model);
            let summary = run_step(&dashboard, dashboard.summarize()).await?;
            println!("{}", summary.text);
            if !summary.model_used.is_empty() {
                eprintln!("model: {}", summary.model_used);
            }
            if save {
                run_step(&dashboard, dashboard.save_summary()).await?;
            }
        }
        Command::Feedback { rating, comment } => {
            let dashboard = open_dashboard(api, store).await?;
            dashboard.set_rating(rating)?;
            dashboard.set_comment(comment);
            run_step(&dashboard, dashboard.submit_feedback()).await?;
        }
        Command::Summaries => {
            let dashboard = open_dashboard(api, store).await?;
            print_summaries(&dashboard.state());
        }
    }

    Ok(())
}

async fn open_dashboard(
    api: ApiClient,
    store: Arc<dyn SessionStore>,
) -> Result<DashboardController> {
    DashboardController::enter(api, store).await.map_err(|route| {
        anyhow!(
            "not signed in; run `summaize login` (redirected to {})",
            route.path()
        )
    })
}

/// Awaits one dashboard action and echoes the notice it left behind.
async fn run_step<T>(
    dashboard: &DashboardController,
    step: impl std::future::Future<Output = Result<T, client_core::ClientError>>,
) -> Result<T> {
    dashboard.dismiss_notice();
    let outcome = step.await;
    if let Some(notice) = dashboard.state().notice {
        print_notice(&notice);
    }
    Ok(outcome?)
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Info => eprintln!("{}", notice.message),
        NoticeKind::Error => eprintln!("error: {}", notice.message),
    }
}

fn print_summaries(state: &DashboardState) {
    if state.summaries.is_empty() {
        println!("No summaries yet.");
        return;
    }
    for record in &state.summaries {
        let pdf = record
            .pdf_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[pdf {pdf}] {}",
            record.summary_text.as_deref().unwrap_or("(empty)")
        );
    }
}
