use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::AppError;
use crate::mailer;
use crate::models::{BugReport, Screenshot};

#[derive(Parser)]
#[command(
    name = "brundle",
    about = "Brundle — bug report form that forwards submissions by email",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (the default)
    Serve(ServeArgs),

    /// Print the email a submission would produce, without sending it
    Preview(PreviewArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Directory holding the page templates and static assets
    #[arg(long)]
    pub views_dir: Option<PathBuf>,
    /// Directory for the log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    /// Log file name inside the log directory
    #[arg(long)]
    pub log_file: Option<String>,
    /// Address every report is sent to
    #[arg(long)]
    pub recipient: Option<String>,
    /// SMTP relay host
    #[arg(long)]
    pub relay_host: Option<String>,
    /// SMTP relay port
    #[arg(long)]
    pub relay_port: Option<u16>,
    /// Relay connection timeout, in seconds
    #[arg(long)]
    pub relay_timeout: Option<u64>,
    /// Largest accepted screenshot, in bytes
    #[arg(long)]
    pub max_screenshot_size: Option<usize>,
}

impl ServeArgs {
    /// Compiled-in defaults, overridden by whatever flags were given
    pub fn into_config(self) -> Config {
        let mut config = Config::default();
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.views_dir {
            config.views_dir = dir;
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = dir;
        }
        if let Some(file) = self.log_file {
            config.log_file = file;
        }
        if let Some(recipient) = self.recipient {
            config.recipient = recipient;
        }
        if let Some(host) = self.relay_host {
            config.relay_host = host;
        }
        if let Some(port) = self.relay_port {
            config.relay_port = port;
        }
        if let Some(secs) = self.relay_timeout {
            config.relay_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = self.max_screenshot_size {
            config.max_screenshot_size = size;
        }
        config
    }
}

#[derive(Args)]
pub struct PreviewArgs {
    #[arg(long, default_value = "")]
    pub product: String,
    #[arg(long, default_value = "")]
    pub category: String,
    /// Sender address
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub action: String,
    #[arg(long, default_value = "")]
    pub context: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// File to attach as the screenshot
    #[arg(long)]
    pub screenshot: Option<PathBuf>,
    /// Override the recipient address
    #[arg(long)]
    pub recipient: Option<String>,
}

impl PreviewArgs {
    fn into_report(self) -> Result<BugReport, AppError> {
        let mut report = BugReport {
            product: self.product,
            category: self.category,
            email: self.email,
            action: self.action,
            context: self.context,
            description: self.description,
            screenshot: None,
        };

        if let Some(path) = self.screenshot {
            let data = fs::read(&path)?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "screenshot".to_string());
            report.attach(Screenshot::new(filename, data));
        }

        Ok(report)
    }
}

/// Compose the message `POST /send` would produce and write it out
pub fn run_preview(args: PreviewArgs, out: &mut impl Write) -> Result<(), AppError> {
    let recipient = args
        .recipient
        .clone()
        .unwrap_or_else(|| Config::default().recipient);
    let recipient = mailer::parse_recipient(&recipient)?;

    let report = args.into_report()?;
    let message = mailer::compose(&report, &recipient)?;
    out.write_all(&message.formatted())?;
    out.flush()?;
    Ok(())
}

pub fn run_preview_to_stdout(args: PreviewArgs) -> Result<(), AppError> {
    run_preview(args, &mut io::stdout().lock())
}
