//! Marketplace command-line client.
//!
//! Drives the profile page against the marketplace API and renders its
//! events on the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketplace::navigation::{self, History, Route};
use marketplace::page::{PageEvent, ScopeHandle, SubmitOutcome};
use marketplace::validation::Field;
use marketplace::{ClientConfig, ProfileClient, ProfilePage, SessionStore};

type Page = ProfilePage<ProfileClient, History>;

#[derive(Parser)]
#[command(name = "marketplace")]
#[command(version, about = "Marketplace account command line tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Marketplace API URL (overrides MARKETPLACE_API_URL)
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a session token issued by the marketplace
    Login {
        /// Session token
        #[arg(long)]
        token: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show or change your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// List front-end routes and where they lead with the current session
    Routes,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show your profile
    Show,
    /// Change your name and password
    /// Examples:
    ///     marketplace profile update --first-name Ada --last-name Lovelace
    #[command(verbatim_doc_comment)]
    Update {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// New password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Password confirmation (prompted when omitted)
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Permanently delete your account
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,marketplace=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?.with_api_url(cli.api_url);
    tracing::debug!(
        api_url = %config.api_url,
        session_file = %config.session_file.display(),
        "Configuration loaded"
    );

    let mut session = SessionStore::load(&config.session_file)?;

    match cli.command {
        Commands::Login { token } => {
            session.set_token(token)?;
            println!("Session stored in {}", config.session_file.display());
            Ok(())
        }
        Commands::Logout => {
            log_out(&config, session);
            Ok(())
        }
        Commands::Routes => {
            for route in Route::ALL {
                let lands_on = navigation::guard(route, &session);
                if lands_on == route {
                    println!("{:<14} {}", route.path(), describe(route));
                } else {
                    println!("{:<14} {} (redirects to {})", route.path(), describe(route), lands_on);
                }
            }
            Ok(())
        }
        Commands::Profile { command } => {
            if navigation::guard(Route::Profile, &session) != Route::Profile {
                anyhow::bail!("Not logged in. Run `marketplace login --token <TOKEN>` first.");
            }

            let (mut page, mut rx) = open_page(&config, session);
            let result = run_profile_command(&mut page, &mut rx, command).await;
            page.unmount();
            render(&mut rx);
            result
        }
    }
}

fn open_page(config: &ClientConfig, session: SessionStore) -> (Page, mpsc::UnboundedReceiver<PageEvent>) {
    let api = Arc::new(ProfileClient::from_config(config));
    ProfilePage::new(api, session, History::new())
}

fn log_out(config: &ClientConfig, session: SessionStore) {
    let (mut page, mut rx) = open_page(config, session);
    page.log_out();
    render(&mut rx);
    print_location(&page);
}

/// Runs one profile command. Only the outcome of that command decides the
/// exit status.
///
/// Terminal input is read before the first network call is raced against
/// Ctrl-C: once the signal handler is installed, SIGINT no longer ends a
/// blocking prompt.
async fn run_profile_command(
    page: &mut Page,
    rx: &mut mpsc::UnboundedReceiver<PageEvent>,
    command: ProfileCommand,
) -> Result<()> {
    let scope = page.scope_handle();

    match command {
        ProfileCommand::Show => {
            until_interrupted(&scope, page.mount()).await?;
            render(rx);
            if let Some(error) = page.last_error() {
                anyhow::bail!("{}", error);
            }
            if page.profile().is_none() {
                anyhow::bail!("Profile could not be loaded");
            }
        }
        ProfileCommand::Update {
            first_name,
            last_name,
            password,
            confirm_password,
        } => {
            let (password, confirm_password) =
                collect_passwords(password, confirm_password, |prompt| rpassword::prompt_password(prompt))?;

            until_interrupted(&scope, page.mount()).await?;
            render(rx);

            page.set_field(Field::FirstName, first_name);
            page.set_field(Field::LastName, last_name);
            page.set_field(Field::Password, password);
            page.set_field(Field::ConfirmPassword, confirm_password);

            let outcome = until_interrupted(&scope, page.submit()).await?;
            render(rx);
            match outcome {
                SubmitOutcome::Updated => {}
                SubmitOutcome::Invalid(_) => anyhow::bail!("Profile not updated"),
                SubmitOutcome::Failed(e) => anyhow::bail!("Profile not updated: {}", e),
            }
        }
        ProfileCommand::Delete { force } => {
            if force {
                until_interrupted(&scope, page.mount()).await?;
                render(rx);
            } else {
                page.mount().await;
                render(rx);
                if !confirm_delete(page)? {
                    println!("Operation cancelled.");
                    return Ok(());
                }
            }

            let result = until_interrupted(&scope, page.delete_account()).await?;
            render(rx);
            result.context("Account not deleted")?;
            print_location(page);
        }
    }

    Ok(())
}

/// Prompts for whichever password fields were not given on the command line.
fn collect_passwords<F>(
    password: Option<String>,
    confirm_password: Option<String>,
    mut prompt: F,
) -> std::io::Result<(String, String)>
where
    F: FnMut(&str) -> std::io::Result<String>,
{
    let password = match password {
        Some(p) => p,
        None => prompt("New password: ")?,
    };
    let confirm_password = match confirm_password {
        Some(p) => p,
        None => prompt("Confirm new password: ")?,
    };
    Ok((password, confirm_password))
}

async fn until_interrupted<F: Future>(scope: &ScopeHandle, operation: F) -> Result<F::Output> {
    until_signalled(scope, operation, tokio::signal::ctrl_c()).await
}

/// Closes the page scope and gives up when `signal` resolves before `operation`.
async fn until_signalled<F, S>(scope: &ScopeHandle, operation: F, signal: S) -> Result<F::Output>
where
    F: Future,
    S: Future,
{
    tokio::select! {
        output = operation => Ok(output),
        _ = signal => {
            tracing::info!("Interrupted, cancelling pending requests");
            scope.close();
            anyhow::bail!("Interrupted")
        }
    }
}

fn confirm_delete(page: &Page) -> Result<bool> {
    let who = page
        .profile()
        .map(|p| p.email.clone())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "this account".to_string());

    print!("Permanently delete {}? This cannot be undone. [y/N]: ", who);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn render(rx: &mut mpsc::UnboundedReceiver<PageEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            PageEvent::ProfileLoaded(profile) => {
                println!("Full Name: {}", profile.full_name());
                println!("Email:     {}", profile.email);
            }
            PageEvent::Notice(notice) => println!("{}", notice.message()),
            PageEvent::ValidationFailed(errors) => {
                for (field, error) in errors.iter() {
                    eprintln!("  {:<16} {}", field.name(), error.message());
                }
            }
            PageEvent::RequestFailed(error) => {
                eprintln!("{}", error);
                if error.error.is_unauthorized() {
                    eprintln!("Run `marketplace login --token <TOKEN>` to sign in again.");
                }
            }
        }
    }
}

fn print_location(page: &Page) {
    if let Some(route) = page.navigator().current() {
        println!("Next: {}", route);
    }
}

fn describe(route: Route) -> &'static str {
    match route {
        Route::Home => "home",
        Route::Login => "log in",
        Route::SignUp => "sign up",
        Route::Profile => "your profile (login required)",
        Route::Collections => "collections",
        Route::ExploreItems => "explore items",
        Route::ItemDetail => "item detail",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace::page::ViewScope;

    #[test]
    fn test_passwords_from_arguments_skip_prompt() {
        let pair = collect_passwords(Some("P@ssword123".into()), Some("P@ssword123".into()), |_| {
            panic!("prompted although both passwords were given")
        })
        .unwrap();
        assert_eq!(pair, ("P@ssword123".to_string(), "P@ssword123".to_string()));
    }

    #[test]
    fn test_missing_passwords_are_prompted_in_order() {
        let mut asked = Vec::new();
        let pair = collect_passwords(None, None, |prompt| {
            asked.push(prompt.to_string());
            Ok(format!("answer{}", asked.len()))
        })
        .unwrap();
        assert_eq!(asked, vec!["New password: ", "Confirm new password: "]);
        assert_eq!(pair, ("answer1".to_string(), "answer2".to_string()));
    }

    #[tokio::test]
    async fn test_operation_finishing_first_keeps_scope_open() {
        let scope = ViewScope::new();
        let handle = scope.handle();

        let output = until_signalled(&handle, async { 7 }, std::future::pending::<()>()).await;

        assert_eq!(output.unwrap(), 7);
        assert!(!handle.is_closed());
    }

    #[tokio::test]
    async fn test_signal_closes_scope() {
        let scope = ViewScope::new();
        let handle = scope.handle();

        let output = until_signalled(&handle, std::future::pending::<()>(), async {}).await;

        assert_eq!(output.unwrap_err().to_string(), "Interrupted");
        assert!(handle.is_closed());
    }

    #[test]
    fn test_log_out_forgets_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");
        SessionStore::load(&path).unwrap().set_token("abc123").unwrap();

        log_out(&ClientConfig::default(), SessionStore::load(&path).unwrap());

        assert!(SessionStore::load(&path).unwrap().token().is_none());
    }
}
