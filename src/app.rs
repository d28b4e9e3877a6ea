// Console front-end: login gate, then a command loop over the running monitor.

use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use log::warn;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use crate::core::{
    alerts::{Alert, AlertFilter, AlertId, AlertStore},
    config::{ConfigManager, Settings},
    dashboard::{map_markers, Dashboard, Tab},
    error::MonitorError,
    metrics::MetricsSnapshot,
    monitor::{self, Intervals, MonitorHandle},
    session::{FileStore, Identity, SessionHolder},
};

type Input = Lines<BufReader<Stdin>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    Filter(AlertFilter),
    Resolve(AlertId),
    Dismiss(AlertId),
    Tab(Tab),
    Stats,
    SaveSettings,
    Help,
    Logout,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
    let arg = parts.next();

    let id = |arg: Option<&str>| -> Result<AlertId, String> {
        let raw = arg.ok_or_else(|| format!("usage: {} <id>", verb))?;
        raw.parse().map_err(|_| format!("'{}' is not an alert id", raw))
    };

    match verb.as_str() {
        "list" | "ls" => Ok(Command::List),
        "filter" => arg
            .unwrap_or("all")
            .parse()
            .map(Command::Filter)
            .map_err(|e| e.to_string()),
        "resolve" => id(arg).map(Command::Resolve),
        "dismiss" => id(arg).map(Command::Dismiss),
        "tab" => arg.unwrap_or("metrics").parse().map(Command::Tab),
        "stats" => Ok(Command::Stats),
        "save" => Ok(Command::SaveSettings),
        "help" | "?" => Ok(Command::Help),
        "logout" => Ok(Command::Logout),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err(String::new()),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

const HELP: &str = "commands: list | filter <all|critical|warning|info> | resolve <id> | dismiss <id> \
| tab <metrics|map|alerts> | stats | save | logout | quit";

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn render_alert(out: &mut String, alert: &Alert) {
    let _ = writeln!(
        out,
        "  [{}] {:<8} {} - {} ({}, {})",
        alert.id,
        alert.severity.label(),
        alert.title,
        alert.description,
        alert.location,
        local_time(alert.created_at)
    );
}

fn render_alerts(store: &AlertStore) -> String {
    let active = store.active_alerts();
    let resolved = store.resolved_alerts();
    let mut out = String::new();

    let _ = writeln!(out, "Active Alerts ({}) [filter: {:?}]", active.len(), store.filter());
    if active.is_empty() {
        let _ = writeln!(out, "  No active alerts. All systems operating normally");
    }
    for alert in active {
        render_alert(&mut out, alert);
    }

    let _ = writeln!(out, "Resolved Alerts ({})", resolved.len());
    if resolved.is_empty() {
        let _ = writeln!(out, "  No resolved alerts");
    }
    for alert in resolved {
        render_alert(&mut out, alert);
    }
    out
}

fn render_stats(dashboard: &Dashboard, store: &AlertStore) -> String {
    let mut out = String::new();
    for card in dashboard.stat_cards(store) {
        let _ = writeln!(out, "{:<22} {:>8}  {}", card.title, card.value, card.change);
    }
    out
}

fn render_metrics(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Real-time Traffic Flow");
    for point in snapshot.traffic.iter().rev().take(5) {
        let _ = writeln!(
            out,
            "  {}  volume {:>6.1}  speed {:>5.1} mph  congestion {:>5.1}%",
            point.time, point.volume, point.speed, point.congestion
        );
    }
    let _ = writeln!(out, "Intersection Performance");
    for site in &snapshot.intersections {
        let _ = writeln!(out, "  {:<20} volume {:>5}  efficiency {}%", site.name, site.volume, site.efficiency);
    }
    out
}

fn render_map() -> String {
    let mut out = String::from("Live Map\n");
    for marker in map_markers() {
        let _ = writeln!(out, "  ({:.2}, {:.2}) {}", marker.x, marker.y, marker.name);
    }
    out
}

async fn prompt(input: &mut Input, label: &str) -> io::Result<Option<String>> {
    println!("{}", label);
    Ok(input.next_line().await?.map(|line| line.trim().to_string()))
}

/// Ask for credentials until the mock login accepts them. `None` on end of input.
async fn login(input: &mut Input, session: &mut SessionHolder<FileStore>) -> io::Result<Option<Identity>> {
    loop {
        let Some(email) = prompt(input, "Email:").await? else {
            return Ok(None);
        };
        let Some(password) = prompt(input, "Password:").await? else {
            return Ok(None);
        };
        match session.login(&email, &password) {
            Ok(identity) => return Ok(Some(identity)),
            Err(e) => println!("Login failed: {}", e),
        }
    }
}

enum Exit {
    Logout,
    Quit,
}

/// Write the running settings to settings.json, creating it on first use.
fn save_settings(config: &ConfigManager, settings: &Settings) -> String {
    match config.save(settings) {
        Ok(()) => format!("Settings saved to {}", config.path().display()),
        Err(e) => {
            warn!("Could not save settings: {}", e);
            format!("Settings not saved: {}", e)
        }
    }
}

/// What a logged-in session runs against.
struct Context<'a> {
    config: &'a ConfigManager,
    settings: &'a Settings,
}

async fn handle(
    cmd: Command,
    ctx: &Context<'_>,
    dashboard: &mut Dashboard,
    monitor: &MonitorHandle,
) -> Result<Option<Exit>, MonitorError> {
    match cmd {
        Command::List => print!("{}", monitor.with_store(render_alerts)),
        Command::Filter(filter) => {
            monitor.set_filter(filter).await?;
            println!("Filter set to {:?}", filter);
        }
        Command::Resolve(id) => match monitor.resolve(id).await? {
            true => println!("Alert {} resolved", id),
            false => println!("Alert {} was already resolved", id),
        },
        Command::Dismiss(id) => {
            let alert = monitor.dismiss(id).await?;
            println!("Alert {} dismissed ({})", alert.id, alert.title);
        }
        Command::Tab(tab) => {
            dashboard.select_tab(tab);
            match tab {
                Tab::Metrics => print!("{}", render_metrics(&monitor.metrics())),
                Tab::Map => print!("{}", render_map()),
                Tab::Alerts => print!("{}", monitor.with_store(render_alerts)),
            }
        }
        Command::Stats => print!("{}", monitor.with_store(|store| render_stats(dashboard, store))),
        Command::SaveSettings => println!("{}", save_settings(ctx.config, ctx.settings)),
        Command::Help => println!("{}", HELP),
        Command::Logout => return Ok(Some(Exit::Logout)),
        Command::Quit => return Ok(Some(Exit::Quit)),
    }
    Ok(None)
}

/// Run one logged-in session until logout, quit or end of input.
async fn dashboard_session(user: Identity, ctx: &Context<'_>, input: &mut Input) -> io::Result<Exit> {
    let settings = ctx.settings;
    let store = AlertStore::seeded(Utc::now()).with_probability(settings.alert_probability);
    let monitor = monitor::spawn(store, Intervals::from(settings));
    let mut dashboard = Dashboard::new(user, monitor.subscribe());
    let mut clock = monitor.clock();

    println!("{} ({} active alerts)", dashboard.greeting(), dashboard.badge());
    println!("{}", HELP);

    let exit = loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else { break Exit::Quit };
                match parse_command(&line) {
                    Ok(cmd) => match handle(cmd, ctx, &mut dashboard, &monitor).await {
                        Ok(Some(exit)) => break exit,
                        Ok(None) => {}
                        Err(e) => println!("{}", e),
                    },
                    Err(msg) if msg.is_empty() => {}
                    Err(msg) => println!("{}", msg),
                }
            }
            Some(count) = dashboard.badge_changed() => {
                println!("[{}] active alerts: {}", dashboard.tab(), count);
            }
            Ok(()) = clock.changed() => {
                let now = *clock.borrow_and_update();
                dashboard.set_clock(now);
            }
        }
    };

    monitor.stop().await;
    Ok(exit)
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Also bridges `log` records from the library.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn config_dir() -> PathBuf {
    std::env::var_os("TRAFFIC_WATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| Settings::default().data_dir)
}

async fn run_console(config: ConfigManager, settings: Settings) -> io::Result<()> {
    let ctx = Context {
        config: &config,
        settings: &settings,
    };
    let mut session = SessionHolder::new(FileStore::new(settings.data_dir.clone()));
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let user = match session.load() {
            Some(user) => user,
            None => match login(&mut input, &mut session).await? {
                Some(user) => user,
                None => return Ok(()),
            },
        };

        match dashboard_session(user, &ctx, &mut input).await? {
            Exit::Logout => {
                if let Err(e) = session.logout() {
                    warn!("Logout did not clear the stored session: {}", e);
                }
            }
            Exit::Quit => return Ok(()),
        }
    }
}

pub fn run() -> io::Result<()> {
    let config = ConfigManager::new(config_dir());
    // Logging depends on the settings, so a bad file is reported once it is up.
    let (settings, config_error) = match config.read() {
        Ok(settings) => (settings.unwrap_or_default(), None),
        Err(e) => (Settings::default(), Some(e)),
    };
    init_logging(&settings.log_level);
    if let Some(e) = config_error {
        warn!("Ignoring {:?}, using defaults: {}", config.path(), e);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_console(config, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("list"), Ok(Command::List));
        assert_eq!(parse_command("resolve 2"), Ok(Command::Resolve(AlertId::new(2))));
        assert_eq!(parse_command("DISMISS 4"), Ok(Command::Dismiss(AlertId::new(4))));
        assert_eq!(parse_command("filter critical"), Ok(Command::Filter(AlertFilter::Critical)));
        assert_eq!(parse_command("filter"), Ok(Command::Filter(AlertFilter::All)));
        assert_eq!(parse_command("tab map"), Ok(Command::Tab(Tab::Map)));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command("save"), Ok(Command::SaveSettings));
    }

    #[test]
    fn test_save_settings_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::new(dir.path().join("conf"));
        let settings = Settings {
            alert_probability: 0.75,
            ..Settings::default()
        };

        let msg = save_settings(&config, &settings);
        assert!(msg.starts_with("Settings saved to"));
        assert_eq!(config.load(), settings);
    }

    #[test]
    fn test_save_settings_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the config directory should be.
        let blocker = dir.path().join("conf");
        std::fs::write(&blocker, "x").unwrap();

        let msg = save_settings(&ConfigManager::new(blocker), &Settings::default());
        assert!(msg.starts_with("Settings not saved"));
    }

    #[test]
    fn test_parse_command_errors() {
        assert_eq!(parse_command("   "), Err(String::new()));
        assert!(parse_command("resolve").unwrap_err().contains("usage"));
        assert!(parse_command("resolve x").unwrap_err().contains("not an alert id"));
        assert!(parse_command("filter urgent").is_err());
        assert!(parse_command("reboot").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn test_render_alerts_sections() {
        let mut store = AlertStore::seeded(Utc::now());
        let text = render_alerts(&store);
        assert!(text.contains("Active Alerts (3)"));
        assert!(text.contains("Resolved Alerts (1)"));
        assert!(text.contains("Sensor Communication Lost"));

        store.set_filter(AlertFilter::Info);
        store.resolve(AlertId::new(3)).unwrap();
        let text = render_alerts(&store);
        assert!(text.contains("No active alerts"));
        assert!(text.contains("Resolved Alerts (1)"));
    }

    #[test]
    fn test_render_stats_has_badge() {
        let store = AlertStore::seeded(Utc::now());
        let dashboard = Dashboard::new(Identity::from_email("a@b.com"), store.subscribe());
        let text = render_stats(&dashboard, &store);
        assert!(text.contains("Active Alerts"));
        assert!(text.contains("Critical: 1"));
    }

    #[test]
    fn test_render_map_lists_sites() {
        assert_eq!(render_map().lines().count(), 6);
    }
}
