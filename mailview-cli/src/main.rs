//! mailview CLI - command-line client for the `/api/emails` service.

use std::env;
use std::fs;
use std::future::Future;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use dialoguer::Confirm;
use env_logger::fmt::WriteStyle;
use log::{LevelFilter, debug, info};
use mailview_core::{
    Ack, AppConfig, AppPaths, EmailId, EmailSummary, Error as CoreError, MailBackend, MailView,
    NewEmail, Request, ServiceClient,
};
use serde::Serialize;
use serde_json::Value;

const APP_NAME: &str = env!("CARGO_PKG_NAME");

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    // `init` decides for itself whether to write the default config.
    let ensure_config = !matches!(cli.command, Command::Init);
    let ctx = RuntimeContext::new(cli.common.clone(), ensure_config)?;
    ctx.init_logging()?;
    debug!("config loaded from {}", ctx.paths.active_config().display());

    match cli.command {
        Command::List(args) => run_async(handle_list(&ctx, args)),
        Command::Show(args) => run_async(handle_show(&ctx, args)),
        Command::Read(args) => run_async(handle_mark(&ctx, args, false)),
        Command::Unread(args) => run_async(handle_mark(&ctx, args, true)),
        Command::Delete(args) => run_async(handle_delete(&ctx, args)),
        Command::Send(args) => run_async(handle_send(&ctx, args)),
        Command::Watch(args) => run_async(handle_watch(&ctx, args)),
        Command::Ping => run_async(handle_ping(&ctx)),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Init => handle_init(&ctx),
        Command::Completions { shell } => handle_completions(shell),
    }
}

/// Service commands run on a runtime built per invocation; the rest stay synchronous.
fn run_async<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(future)
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Command-line client for the /api/emails mail service.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(long, global = true)]
    debug: bool,
    #[arg(long, global = true)]
    trace: bool,
    #[arg(long, global = true, conflicts_with = "yaml")]
    json: bool,
    #[arg(long, global = true)]
    yaml: bool,
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    no_color: bool,
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    color: ColorOption,
    #[arg(short = 'y', long = "yes", alias = "force", global = true)]
    assume_yes: bool,
    #[arg(long = "timeout", value_name = "SECONDS", global = true)]
    timeout: Option<u64>,
    /// Override the configured service URL
    #[arg(long = "service-url", value_name = "URL", global = true)]
    service_url: Option<String>,
    #[arg(long = "diagnostics", global = true)]
    diagnostics: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorOption {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List emails
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show one email
    Show(ShowArgs),
    /// Mark an email read
    Read(IdArgs),
    /// Mark an email unread
    Unread(IdArgs),
    /// Delete an email
    #[command(alias = "rm")]
    Delete(IdArgs),
    /// Send an email
    Send(SendArgs),
    /// Poll the list and print it whenever it changes (Ctrl-C to stop)
    Watch(WatchArgs),
    /// Check the service is reachable
    Ping,
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Write a default config file (--force to overwrite)
    Init,
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Only unread emails
    #[arg(short, long)]
    unread: bool,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Email id
    id: String,
    /// Also mark it read, as opening it in a client would
    #[arg(long = "mark-read")]
    mark_read: bool,
}

#[derive(Debug, Args)]
struct IdArgs {
    /// Email id
    id: String,
}

#[derive(Debug, Args)]
struct SendArgs {
    /// Recipient address
    #[arg(short, long)]
    to: String,
    /// Subject line
    #[arg(short, long, default_value = "")]
    subject: String,
    /// Sender address (defaults to compose.from)
    #[arg(short, long)]
    from: Option<String>,
    /// Message body (otherwise read from --file or stdin)
    #[arg(short, long, conflicts_with = "file")]
    message: Option<String>,
    /// Read the message body from a file
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct WatchArgs {
    /// Poll interval in milliseconds (defaults to poll_interval_ms)
    #[arg(long = "interval-ms", value_name = "MS")]
    interval_ms: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    Show,
    Path,
    Reset,
}

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    paths: AppPaths,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts, ensure_config: bool) -> Result<Self> {
        let paths = AppPaths::discover(common.config.clone())?;
        if ensure_config {
            AppConfig::ensure_default(&paths.global_config)?;
        }
        let mut config = AppConfig::load(&paths)?;
        if let Some(url) = &common.service_url {
            config.service_url = url.clone();
            config.validate()?;
        }
        Ok(Self {
            common,
            paths,
            config,
        })
    }

    fn init_logging(&self) -> Result<()> {
        if self.common.quiet {
            log::set_max_level(LevelFilter::Off);
            return Ok(());
        }

        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

        builder.filter_level(self.effective_log_level());

        let force_color = matches!(self.common.color, ColorOption::Always)
            || env::var_os("FORCE_COLOR").is_some();
        let disable_color = self.common.no_color
            || matches!(self.common.color, ColorOption::Never)
            || env::var_os("NO_COLOR").is_some();

        if disable_color {
            builder.write_style(WriteStyle::Never);
        } else if force_color {
            builder.write_style(WriteStyle::Always);
        } else {
            builder.write_style(WriteStyle::Auto);
        }

        if self.common.diagnostics {
            builder.format_timestamp_millis();
            builder.format_module_path(true);
            builder.format_target(true);
        }

        builder.try_init().or_else(|err| {
            if self.common.verbose > 0 {
                eprintln!("logger already initialized: {err}");
            }
            Ok(())
        })
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.common.trace {
            LevelFilter::Trace
        } else if self.common.debug {
            LevelFilter::Debug
        } else {
            match self.common.verbose {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    fn service_client(&self) -> Result<ServiceClient> {
        let timeout = self
            .common
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.request_timeout());
        Ok(ServiceClient::new(&self.config.service_url, Some(timeout))?)
    }

    fn use_color(&self) -> bool {
        if self.common.no_color
            || matches!(self.common.color, ColorOption::Never)
            || env::var_os("NO_COLOR").is_some()
        {
            return false;
        }
        matches!(self.common.color, ColorOption::Always) || io::stdout().is_terminal()
    }
}

async fn handle_list(ctx: &RuntimeContext, args: ListArgs) -> Result<()> {
    let client = ctx.service_client()?;
    let mut emails = client.list_emails().await?;
    if args.unread {
        emails.retain(|e| e.unread);
    }
    debug!("listing {} emails", emails.len());
    emit_output(ctx, &emails)
}

async fn handle_show(ctx: &RuntimeContext, args: ShowArgs) -> Result<()> {
    let client = ctx.service_client()?;
    let id = EmailId::parse(&args.id);
    let emails = client.list_emails().await?;
    let mut email = emails
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow!("email not found: {id}"))?;

    if args.mark_read && email.unread {
        let ack = client.set_unread(&id, false).await?;
        require_ack(ack, &Request::MarkRead(id.clone()))?;
        email.unread = false;
    }

    if ctx.common.json || ctx.common.yaml {
        return emit_output(ctx, &email);
    }
    print_email_detail(&email, ctx.use_color());
    Ok(())
}

async fn handle_mark(ctx: &RuntimeContext, args: IdArgs, unread: bool) -> Result<()> {
    let client = ctx.service_client()?;
    let id = EmailId::parse(&args.id);
    let ack = client.set_unread(&id, unread).await?;
    let request = if unread {
        Request::MarkUnread(id.clone())
    } else {
        Request::MarkRead(id.clone())
    };
    require_ack(ack, &request)?;
    if !ctx.common.quiet {
        println!("Marked {id} {}", if unread { "unread" } else { "read" });
    }
    Ok(())
}

async fn handle_delete(ctx: &RuntimeContext, args: IdArgs) -> Result<()> {
    let id = EmailId::parse(&args.id);
    if !ctx.common.assume_yes {
        if !io::stdin().is_terminal() {
            bail!("refusing to delete {id} without confirmation (use --yes)");
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete email {id}?"))
            .default(false)
            .interact()
            .context("reading confirmation")?;
        if !confirmed {
            info!("delete cancelled");
            return Ok(());
        }
    }

    let client = ctx.service_client()?;
    let ack = client.delete_email(&id).await?;
    require_ack(ack, &Request::Delete(id.clone()))?;
    if !ctx.common.quiet {
        println!("Deleted {id}");
    }
    Ok(())
}

async fn handle_send(ctx: &RuntimeContext, args: SendArgs) -> Result<()> {
    if args.to.trim().is_empty() {
        bail!("recipient must not be empty");
    }
    let body = resolve_body(args.message.as_deref(), args.file.as_ref())?;
    let draft = NewEmail {
        sender: args
            .from
            .unwrap_or_else(|| ctx.config.compose.from.clone()),
        recipient: args.to,
        subject: args.subject,
        body,
    };

    let client = ctx.service_client()?;
    let ack = client.create_email(&draft).await?;
    require_ack(ack, &Request::Send(draft.clone()))?;
    if !ctx.common.quiet {
        println!("Sent to {}", draft.recipient);
    }
    Ok(())
}

async fn handle_watch(ctx: &RuntimeContext, args: WatchArgs) -> Result<()> {
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| ctx.config.poll_interval());
    if interval.is_zero() {
        bail!("--interval-ms must be greater than 0");
    }

    let mut view = MailView::new(ctx.service_client()?, interval);
    view.mount();
    info!("watching {} every {interval:?}", ctx.config.service_url);

    let mut shown: Option<Vec<EmailSummary>> = None;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res.context("listening for Ctrl-C")?;
                break;
            }
            _ = view.next_outcome() => {
                let emails = view.state().emails();
                if shown.as_deref() != Some(emails) {
                    print_snapshot(ctx, emails)?;
                    shown = Some(emails.to_vec());
                }
            }
        }
    }

    view.unmount();
    info!("stopped watching");
    Ok(())
}

async fn handle_ping(ctx: &RuntimeContext) -> Result<()> {
    let client = ctx.service_client()?;
    let count = client.health().await?;
    if ctx.common.json || ctx.common.yaml {
        let status = serde_json::json!({
            "service_url": client.base_url(),
            "ok": true,
            "emails": count,
        });
        return emit_output(ctx, &status);
    }
    println!("{} is up ({count} emails)", client.base_url());
    Ok(())
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => emit_output(ctx, &ctx.config),
        ConfigCommand::Path => {
            println!("{}", ctx.paths.active_config().display());
            Ok(())
        }
        ConfigCommand::Reset => Ok(AppConfig::write_default(&ctx.paths.global_config)?),
    }
}

fn handle_init(ctx: &RuntimeContext) -> Result<()> {
    if ctx.paths.global_config.exists() && !ctx.common.assume_yes {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            ctx.paths.global_config.display()
        ));
    }
    AppConfig::write_default(&ctx.paths.global_config)?;
    println!("wrote {}", ctx.paths.global_config.display());
    Ok(())
}

fn handle_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
    Ok(())
}

/// Turn a `success: false` reply into an error carrying the same text the view logs.
fn require_ack(ack: Ack, request: &Request) -> Result<()> {
    if ack.success {
        Ok(())
    } else {
        Err(CoreError::Rejected(request.describe_failure()).into())
    }
}

fn resolve_body(message: Option<&str>, file: Option<&PathBuf>) -> Result<String> {
    if let Some(message) = message {
        return Ok(message.to_string());
    }
    if let Some(path) = file {
        return fs::read_to_string(path)
            .with_context(|| format!("reading message from {}", path.display()));
    }
    if io::stdin().is_terminal() {
        return Ok(String::new());
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading message from stdin")?;
    Ok(buffer)
}

fn emit_output<T: ?Sized + Serialize>(ctx: &RuntimeContext, value: &T) -> Result<()> {
    if ctx.common.json {
        let json = serde_json::to_string_pretty(value)?;
        println!("{json}");
        return Ok(());
    }
    if ctx.common.yaml {
        let yaml = serde_yaml::to_string(value)?;
        println!("{yaml}");
        return Ok(());
    }

    let v = serde_json::to_value(value)?;
    pretty_print_value(&v, ctx.use_color());
    Ok(())
}

fn print_snapshot(ctx: &RuntimeContext, emails: &[EmailSummary]) -> Result<()> {
    if !(ctx.common.json || ctx.common.yaml) {
        let unread = emails.iter().filter(|e| e.unread).count();
        println!(
            "-- {} {} emails, {unread} unread --",
            chrono::Local::now().format("%H:%M:%S"),
            emails.len()
        );
    }
    emit_output(ctx, emails)
}

fn pretty_print_value(v: &Value, use_color: bool) {
    match v {
        Value::Array(items) if items.is_empty() => println!("No emails."),
        Value::Array(items) => {
            for item in items {
                pretty_print_item(item, use_color);
            }
        }
        Value::Object(_) => pretty_print_item(v, use_color),
        _ => println!("{v}"),
    }
}

fn display_id(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "???".to_string(),
    }
}

fn pretty_print_item(v: &Value, use_color: bool) {
    use owo_colors::OwoColorize;

    let obj = match v {
        Value::Object(map) => map,
        _ => {
            println!("{v}");
            return;
        }
    };

    if !(obj.contains_key("subject") && obj.contains_key("from")) {
        for (key, value) in obj {
            match value {
                Value::Object(inner) => {
                    println!("{key}:");
                    for (k, v) in inner {
                        println!("  {k}: {v}");
                    }
                }
                _ => println!("{key}: {value}"),
            }
        }
        return;
    }

    let subject = obj
        .get("subject")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("(no subject)");
    let id = display_id(obj.get("id"));
    let from = obj
        .get("from")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    let unread = obj.get("unread").and_then(|v| v.as_bool()).unwrap_or(false);
    let date_str = obj
        .get("date")
        .and_then(|v| v.as_str())
        .map(format_date_human)
        .unwrap_or_default();

    match (unread, use_color) {
        (false, true) => println!("  {} - {} [{}]", subject, date_str.dimmed(), id.cyan()),
        (false, false) => println!("  {subject} - {date_str} [{id}]"),
        (true, true) => println!(
            "{} {} - {} [{}]",
            "*".yellow().bold(),
            subject.bold(),
            date_str.dimmed(),
            id.cyan()
        ),
        (true, false) => println!("* {subject} - {date_str} [{id}]"),
    }
    if use_color {
        println!("  {}", from.dimmed());
    } else {
        println!("  {from}");
    }
    println!();
}

fn print_email_detail(email: &EmailSummary, use_color: bool) {
    use owo_colors::OwoColorize;

    let subject = if email.subject.is_empty() {
        "(no subject)"
    } else {
        email.subject.as_str()
    };
    let mut headers = vec![
        ("Id", email.id.to_string()),
        ("Subject", subject.to_string()),
        ("From", email.sender.clone()),
    ];
    if let Some(recipient) = &email.recipient {
        headers.push(("To", recipient.clone()));
    }
    if !email.date.is_empty() {
        headers.push(("Date", format_date_human(&email.date)));
    }
    headers.push((
        "Status",
        if email.unread { "unread" } else { "read" }.to_string(),
    ));

    for (label, value) in headers {
        if use_color {
            println!("{} {value}", format!("{label}:").bold());
        } else {
            println!("{label}: {value}");
        }
    }
    println!();
    println!("{}", email.body);
}

/// Format a server date for humans; unrecognised shapes pass through unchanged.
fn format_date_human(raw: &str) -> String {
    use chrono::{DateTime, Datelike, Local};

    let parsed = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Local));

    let dt = match parsed {
        Ok(dt) => dt,
        Err(_) => return raw.to_string(),
    };

    let now = Local::now();
    let today = now.date_naive();
    let date = dt.date_naive();
    let yesterday = today.pred_opt().unwrap_or(today);

    if date == today {
        format!("Today {}", dt.format("%H:%M"))
    } else if date == yesterday {
        format!("Yesterday {}", dt.format("%H:%M"))
    } else if (today - date).num_days() < 7 {
        dt.format("%a %H:%M").to_string()
    } else if date.year() == today.year() {
        dt.format("%b %-d").to_string()
    } else {
        dt.format("%b %-d %Y").to_string()
    }
}
