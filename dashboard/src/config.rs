use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::i18n::Locale;
use crate::route::Route;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportKind {
    /// Filtered brand score table
    #[default]
    Brands,
    /// Score history of one brand
    Trends,
    /// Per-model scores of one brand's latest card
    Models,
    /// Brand by model score grid
    Heatmap,
}

#[derive(Parser, Debug)]
#[command(
    name = "geo-dashboard",
    about = "Terminal dashboard for GEO Insights brand visibility scores"
)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "GEO_API_URL", default_value = "http://localhost:8000", global = true)]
    pub api_url: String,

    /// Workspace to scope brand and score requests to
    #[arg(long, env = "GEO_WORKSPACE_ID", default_value = "ws-demo-001", global = true)]
    pub workspace: String,

    /// Where the token, saved filters, locale and log file live
    #[arg(long, env = "GEO_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Evaluation poll and health check interval in seconds
    #[arg(long, default_value_t = 5, global = true)]
    pub interval: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout: u64,

    /// Color theme
    #[arg(long, default_value = "dark", value_enum, global = true)]
    pub theme: ThemeChoice,

    /// UI language (defaults to the last one used)
    #[arg(long, value_enum, global = true)]
    pub locale: Option<Locale>,

    /// Start on this page, e.g. /evaluations or /report/diag-1
    #[arg(long, default_value = "/dashboard", global = true)]
    pub route: String,

    /// Use built-in demo data instead of a backend
    #[arg(long, short, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Full-screen dashboard (default)
    Ui,
    /// Sign in and store the access token
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "GEO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account; sign in with `login` afterwards
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        /// Read from stdin when omitted
        #[arg(long, env = "GEO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Revoke and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Finish an OAuth sign-in from its redirect URL
    Callback { url: String },
    /// Write a CSV export
    Export {
        #[arg(long, value_enum, default_value = "brands")]
        kind: ExportKind,
        /// Brand id for trend and model exports
        #[arg(long)]
        brand: Option<String>,
        /// Output directory (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Queue an evaluation run
    NewRun {
        #[arg(long)]
        name: Option<String>,
        /// Repeatable; every model when omitted
        #[arg(long = "model")]
        models: Vec<String>,
        /// Repeatable; every brand when omitted
        #[arg(long = "brand")]
        brands: Vec<String>,
    },
}

/// Settings after CLI, environment and defaults are resolved.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub api_url: String,
    pub workspace_id: String,
    pub data_dir: PathBuf,
    pub interval: Duration,
    pub timeout: Duration,
    pub theme: ThemeChoice,
    pub locale: Option<Locale>,
    pub route: Route,
    pub demo: bool,
}

impl DashboardConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_url: cli.api_url.trim_end_matches('/').to_string(),
            workspace_id: cli.workspace.clone(),
            data_dir: cli.data_dir.clone().unwrap_or_else(default_data_dir),
            interval: Duration::from_secs(cli.interval.max(1)),
            timeout: Duration::from_secs(cli.timeout.max(1)),
            theme: cli.theme,
            locale: cli.locale,
            route: Route::parse(&cli.route),
            demo: cli.demo,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            workspace_id: "ws-demo-001".to_string(),
            data_dir: default_data_dir(),
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(10),
            theme: ThemeChoice::Dark,
            locale: None,
            route: Route::Dashboard,
            demo: false,
        }
    }
}

/// `$HOME/.geo-dashboard`, or `./.geo-dashboard` without a home dir.
pub fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".geo-dashboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve() {
        let cli = Cli::try_parse_from(["geo-dashboard", "--api-url", "http://api.test/", "--demo"]).unwrap();
        let cfg = DashboardConfig::from_cli(&cli);
        assert_eq!(cfg.api_url, "http://api.test");
        assert!(cfg.demo);
        assert_eq!(cfg.route, Route::Dashboard);
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert!(cli.command.is_none());
    }

    #[test]
    fn subcommands_take_global_options() {
        let cli = Cli::try_parse_from([
            "geo-dashboard",
            "export",
            "--kind",
            "trends",
            "--brand",
            "3",
            "--route",
            "/report/diag-2",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Export {
                kind: ExportKind::Trends,
                brand: Some("3".into()),
                out: None,
            })
        );
        assert_eq!(DashboardConfig::from_cli(&cli).route, Route::Report("diag-2".into()));
    }

    #[test]
    fn register_and_new_run_parse() {
        let cli = Cli::try_parse_from([
            "geo-dashboard",
            "register",
            "--email",
            "ana@example.com",
            "--name",
            "Ana",
            "--password",
            "hunter22",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Register {
                email: "ana@example.com".into(),
                name: Some("Ana".into()),
                password: Some("hunter22".into()),
            })
        );

        let cli = Cli::try_parse_from([
            "geo-dashboard",
            "new-run",
            "--model",
            "ChatGPT",
            "--model",
            "Claude",
            "--brand",
            "2",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::NewRun {
                name: None,
                models: vec!["ChatGPT".into(), "Claude".into()],
                brands: vec!["2".into()],
            })
        );
    }

    #[test]
    fn locale_flag_parses() {
        let cli = Cli::try_parse_from(["geo-dashboard", "--locale", "zh"]).unwrap();
        assert_eq!(cli.locale, Some(Locale::Zh));
    }
}
