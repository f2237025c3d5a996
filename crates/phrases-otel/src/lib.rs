use once_cell::sync::OnceCell;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

static ACCESS_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Target used by the server's per-request access log lines.
pub const ACCESS_TARGET: &str = "http.access";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    Minutely,
    Hourly,
    Daily,
}

impl Rotation {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hourly" => Rotation::Hourly,
            "minutely" => Rotation::Minutely,
            _ => Rotation::Daily,
        }
    }
}

/// Rolling file sink for access lines, enabled with `PHRASES_ACCESS_LOG_ROLL=1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessRoll {
    pub dir: String,
    pub prefix: String,
    pub rotation: Rotation,
}

impl AccessRoll {
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("PHRASES_ACCESS_LOG_ROLL").as_deref() != Some("1") {
            return None;
        }
        Some(Self {
            dir: lookup("PHRASES_ACCESS_LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            prefix: lookup("PHRASES_ACCESS_LOG_PREFIX").unwrap_or_else(|| "http-access".into()),
            rotation: Rotation::parse(
                &lookup("PHRASES_ACCESS_LOG_ROTATION").unwrap_or_else(|| "daily".into()),
            ),
        })
    }
}

/// Install the global subscriber: console output filtered by `RUST_LOG`
/// (default `info`), plus the optional rolling access log.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let roll = AccessRoll::from_lookup(|key| std::env::var(key).ok());
    install_console(filter, roll);
}

/// Console-only subscriber writing to stderr, for binaries whose stdout is
/// a protocol channel.
pub fn init_stderr() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(false);
    let _ = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init();
}

fn install_console(filter: EnvFilter, roll: Option<AccessRoll>) {
    let fmt_layer = fmt::layer();
    let registry = tracing_subscriber::registry().with(fmt_layer.with_filter(filter));
    let Some(roll) = roll else {
        let _ = registry.try_init();
        return;
    };
    if std::fs::create_dir_all(&roll.dir).is_err() {
        tracing::warn!(directory = %roll.dir, "failed to create access log directory");
    }
    let writer = match roll.rotation {
        Rotation::Hourly => tracing_appender::rolling::hourly(&roll.dir, &roll.prefix),
        Rotation::Minutely => tracing_appender::rolling::minutely(&roll.dir, &roll.prefix),
        Rotation::Daily => tracing_appender::rolling::daily(&roll.dir, &roll.prefix),
    };
    let (nb, guard) = tracing_appender::non_blocking(writer);
    let _ = ACCESS_GUARD.set(guard);
    let targets = Targets::new().with_target(ACCESS_TARGET, tracing::Level::INFO);
    let access_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(nb)
        .with_filter(targets);
    let _ = registry.with(access_layer).try_init();
}
