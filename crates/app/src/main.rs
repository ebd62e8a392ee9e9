use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use url::Url;

use api::HttpApi;
use services::{AssessmentService, Clock, ManagementService, NotificationService, SessionContext};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidApiUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    assessments: Arc<AssessmentService>,
    session: Arc<SessionContext>,
    notifications: Arc<NotificationService>,
    management: Arc<ManagementService>,
}

impl UiApp for DesktopApp {
    fn assessments(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessments)
    }

    fn session(&self) -> Arc<SessionContext> {
        Arc::clone(&self.session)
    }

    fn notifications(&self) -> Arc<NotificationService> {
        Arc::clone(&self.notifications)
    }

    fn management(&self) -> Arc<ManagementService> {
        Arc::clone(&self.management)
    }
}

struct Args {
    api_url: Url,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api <base_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api http://localhost:8000/api/");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESS_API_URL, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut raw_api = std::env::var("ASSESS_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api/".into());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    raw_api = require_value(args, "--api")?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let api_url = normalize_api_url(&raw_api)?;
        Ok(Self { api_url })
    }
}

// reqwest's Url::join drops the last path segment without a trailing slash.
fn normalize_api_url(raw: &str) -> Result<Url, ArgsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ArgsError::InvalidApiUrl {
            raw: raw.to_string(),
        });
    }
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|_| ArgsError::InvalidApiUrl {
        raw: raw.to_string(),
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,api=debug,services=debug".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing::info!(api = %parsed.api_url, "starting desktop client");

    let backend = Arc::new(HttpApi::new(parsed.api_url));
    let clock = Clock::default_clock();
    let assessments = Arc::new(AssessmentService::new(
        clock,
        backend.clone(),
        backend.clone(),
    ));
    let session = Arc::new(SessionContext::new(backend.clone(), backend.clone()));
    let notifications = Arc::new(NotificationService::new(backend.clone()));
    let management = Arc::new(ManagementService::new(backend));

    let app = DesktopApp {
        assessments,
        session,
        notifications,
        management,
    };
    let context = build_app_context(Arc::new(app));

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Assess")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
