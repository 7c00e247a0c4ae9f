//! Interactive command-line client for the ftpweb storage server.
//!
//! All rendering lives here; the library core only returns data and errors.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use ftpweb_client::app_state::app_state_factory;
use ftpweb_client::auth::session::Session;
use ftpweb_client::config::ProjectConfig;
use ftpweb_client::navigator::Navigator;
use ftpweb_client::operations::FileOperations;
use ftpweb_client::scheduler::quota_poller::{poll_once, QuotaPoller, QuotaSnapshot, POLL_INTERVAL};
use ftpweb_client::storage_service::storage_client::StorageApi;
use ftpweb_client::upload;

const LOGIN_ATTEMPTS: usize = 3;

#[derive(Parser)]
#[command(name = "ftpweb-cli", about = "Client for the ftpweb storage server")]
struct Args {
    /// Server address, e.g. http://localhost:3000
    #[arg(long)]
    server: Option<String>,

    /// Use a saved server preset
    #[arg(long)]
    preset: Option<String>,

    /// Save the resolved server address under this preset name
    #[arg(long, value_name = "NAME")]
    save_preset: Option<String>,

    /// Username; prompted when omitted
    #[arg(long)]
    username: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ProjectConfig::new().context("Failed to load settings")?;
    if let Some(name) = &args.preset {
        config.apply_preset(name)?;
    }
    if let Some(url) = &args.server {
        config.set_server_url(url)?;
    }
    if let Some(name) = &args.save_preset {
        config.save_preset(name)?;
    }
    println!("Server: {}", config.settings.last_url);

    let state = app_state_factory(config)?;
    let api: Arc<dyn StorageApi> = state.client.clone();

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    login(&state.session, &api, args.username.as_deref(), &mut input).await?;

    let poller = QuotaPoller::start(api.clone(), state.session.clone(), POLL_INTERVAL);
    let mut navigator = Navigator::new(api.clone(), state.session.clone());
    let ops = FileOperations::new(api.clone(), state.session.clone());
    navigator.refresh().await?;

    shell(&mut navigator, &ops, &api, &state.session, &poller, &mut input).await?;

    poller.stop();
    state.session.logout().await;
    Ok(())
}

/// Prompt for credentials until login succeeds or the attempts run out.
/// Each failure is shown once; retrying is purely this layer's policy.
async fn login<R: AsyncBufRead + Unpin>(
    session: &Session,
    api: &Arc<dyn StorageApi>,
    username: Option<&str>,
    input: &mut Lines<R>,
) -> Result<()> {
    for attempt in 1..=LOGIN_ATTEMPTS {
        let username = match username {
            Some(name) => name.to_string(),
            None => prompt_required(input, "Username: ").await?.trim().to_string(),
        };
        let password = match std::env::var("FTPWEB_PASSWORD") {
            Ok(password) => password,
            Err(_) => prompt_required(input, "Password: ").await?,
        };
        match session.login(api.as_ref(), &username, &password).await {
            Ok(()) => {
                let role = session.role().await.unwrap_or_else(|| "user".to_string());
                println!("Logged in as {} ({})", username, role);
                return Ok(());
            }
            Err(e) => eprintln!("Login failed ({}/{}): {}", attempt, LOGIN_ATTEMPTS, e),
        }
    }
    bail!("Giving up after {} failed login attempts", LOGIN_ATTEMPTS)
}

async fn shell<R: AsyncBufRead + Unpin>(
    nav: &mut Navigator,
    ops: &FileOperations,
    api: &Arc<dyn StorageApi>,
    session: &Session,
    poller: &QuotaPoller,
    input: &mut Lines<R>,
) -> Result<()> {
    println!("Type `help` for commands, `quit` to leave.");
    loop {
        let Some(line) = prompt(input, &format!("/{} > ", nav.current_path())).await? else {
            break;
        };
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else { continue };
        let args: Vec<&str> = parts.collect();

        let outcome = match verb {
            "ls" => list(nav).await,
            "cd" => with_one_arg(&args, "cd <dir>", |name| nav.enter(name)).await,
            "up" => nav.up().await.map_err(Into::into),
            "pwd" => {
                println!("/{}", nav.current_path());
                Ok(())
            }
            "get" => download(nav, ops, &args).await,
            "put" => put(nav, ops, api, session, &args).await,
            "mkdir" => with_one_arg(&args, "mkdir <name>", |name| ops.create_folder(nav, name)).await,
            "touch" => with_one_arg(&args, "touch <name>", |name| ops.create_file(nav, name)).await,
            "mv" => rename(nav, ops, &args).await,
            "rm" => remove(nav, ops, api, session, &args, input).await,
            "quota" => {
                print_quota(poller.latest());
                Ok(())
            }
            "help" => {
                print_help();
                Ok(())
            }
            "quit" | "exit" => break,
            other => {
                println!("Unknown command `{}`; try `help`.", other);
                Ok(())
            }
        };
        if let Err(e) = outcome {
            eprintln!("error: {}", e);
        }
    }
    Ok(())
}

async fn list(nav: &mut Navigator) -> Result<()> {
    nav.refresh().await?;
    for entry in nav.listing() {
        let marker = if entry.is_dir { "<dir>" } else { "     " };
        println!("{} {}", marker, entry.name);
    }
    Ok(())
}

async fn download(nav: &Navigator, ops: &FileOperations, args: &[&str]) -> Result<()> {
    let [name, rest @ ..] = args else {
        println!("usage: get <name> [local-path]");
        return Ok(());
    };
    let content = ops.download_file(nav, name).await?;
    let local = rest.first().copied().unwrap_or(*name);
    std::fs::write(local, content)
        .with_context(|| format!("Failed to write {}", local))?;
    println!("saved {}", local);
    Ok(())
}

/// Upload a local file or directory tree under the current remote path.
/// Best-effort: per-file failures are listed, the batch always runs to the
/// end, and exactly one refresh plus one quota re-poll follow.
async fn put(
    nav: &mut Navigator,
    ops: &FileOperations,
    api: &Arc<dyn StorageApi>,
    session: &Session,
    args: &[&str],
) -> Result<()> {
    let [local] = args else {
        println!("usage: put <local-path>");
        return Ok(());
    };
    let entries = upload::expand(Path::new(local), nav.current_path())?;
    println!("uploading {} file(s)...", entries.len());
    let report = upload::run_batch(ops, &entries).await;
    for (remote, reason) in &report.failed {
        eprintln!("failed: {} ({})", remote, reason);
    }
    println!("{} uploaded, {} failed", report.uploaded.len(), report.failed.len());

    nav.refresh().await?;
    if let Some(snapshot) = poll_once(api.as_ref(), session).await {
        print_quota(Some(snapshot));
    }
    Ok(())
}

async fn rename(nav: &mut Navigator, ops: &FileOperations, args: &[&str]) -> Result<()> {
    let [old_name, new_name] = args else {
        println!("usage: mv <old-name> <new-name>");
        return Ok(());
    };
    let Some(is_dir) = nav.entry(old_name).map(|entry| entry.is_dir) else {
        println!("no entry named `{}` here", old_name);
        return Ok(());
    };
    ops.rename(nav, old_name, new_name, is_dir).await?;
    Ok(())
}

/// Delete an entry after confirmation. Deleting frees space, so the quota
/// line is re-polled right away instead of waiting for the next tick.
async fn remove<R: AsyncBufRead + Unpin>(
    nav: &mut Navigator,
    ops: &FileOperations,
    api: &Arc<dyn StorageApi>,
    session: &Session,
    args: &[&str],
    input: &mut Lines<R>,
) -> Result<()> {
    let [name] = args else {
        println!("usage: rm <name>");
        return Ok(());
    };
    let answer = prompt(input, &format!("Delete {}? [y/N]: ", name))
        .await?
        .unwrap_or_default();
    if !answer.trim().eq_ignore_ascii_case("y") {
        println!("not deleted");
        return Ok(());
    }
    ops.delete(nav, name).await?;
    if let Some(snapshot) = poll_once(api.as_ref(), session).await {
        print_quota(Some(snapshot));
    }
    Ok(())
}

async fn with_one_arg<'a, F, Fut>(args: &[&'a str], usage: &str, run: F) -> Result<()>
where
    F: FnOnce(&'a str) -> Fut,
    Fut: std::future::Future<Output = std::result::Result<(), ftpweb_client::error::ClientError>>,
{
    let [arg] = args else {
        println!("usage: {}", usage);
        return Ok(());
    };
    run(*arg).await?;
    Ok(())
}

fn print_quota(snapshot: Option<QuotaSnapshot>) {
    match snapshot {
        Some(snapshot) => println!(
            "Storage: {:.2} GB / {} GB ({}%)",
            snapshot.used_gb, snapshot.limit_gb, snapshot.percent
        ),
        None => println!("no quota reading yet"),
    }
}

fn print_help() {
    println!("ls                 list the current directory");
    println!("cd <dir>           enter a directory");
    println!("up                 go to the parent directory");
    println!("pwd                print the current path");
    println!("get <name> [path]  download a file");
    println!("put <local>        upload a file or directory tree");
    println!("mkdir <name>       create a directory");
    println!("touch <name>       create an empty file");
    println!("mv <old> <new>     rename an entry");
    println!("rm <name>          delete an entry (asks first)");
    println!("quota              show the latest storage reading");
    println!("quit               log out and exit");
}

/// Read one line as typed; `None` means stdin was closed. No trimming here,
/// a password may legitimately carry leading or trailing whitespace.
async fn prompt<R: AsyncBufRead + Unpin>(
    input: &mut Lines<R>,
    label: &str,
) -> Result<Option<String>> {
    use std::io::Write as _;
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

async fn prompt_required<R: AsyncBufRead + Unpin>(
    input: &mut Lines<R>,
    label: &str,
) -> Result<String> {
    prompt(input, label)
        .await?
        .ok_or_else(|| anyhow::anyhow!("stdin closed"))
}
