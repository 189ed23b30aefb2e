use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use idle_economy::{
    AssetCategory, BlockHeight, EconomyConfig, OwnerId, PlayerRegistry, Points, UpgradeOutcome,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser, Clone)]
#[command(author, version, about = "Idle farm economy block simulator", long_about = None)]
struct Args {
    /// Optional economy configuration (TOML). Built-in seeds if omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Player identifier
    #[arg(long, default_value = "0x123")]
    owner: String,

    /// Admin identifier used for point injection
    #[arg(long, default_value = "admin")]
    admin: String,

    /// Last block to simulate
    #[arg(long, default_value_t = 40)]
    until: BlockHeight,

    /// Delay between blocks in milliseconds
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,

    /// Scheduled events as HEIGHT:ACTION[:ARG]; replaces the built-in schedule.
    /// Actions: start, claim, peek:CATEGORY, credit:AMOUNT, upgrade:CATEGORY
    #[arg(long = "event", value_name = "EVENT")]
    events: Vec<ScheduledEvent>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Multi-line human-readable log output
    #[arg(long)]
    pretty_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Start,
    Claim,
    Peek(String),
    Credit(Points),
    Upgrade(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledEvent {
    height: BlockHeight,
    action: Action,
}

impl FromStr for ScheduledEvent {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let mut parts = raw.splitn(3, ':');
        let height = parts
            .next()
            .ok_or_else(|| anyhow!("empty event"))?
            .trim()
            .parse::<BlockHeight>()
            .with_context(|| format!("invalid block height in event {raw:?}"))?;
        let verb = parts
            .next()
            .ok_or_else(|| anyhow!("event {raw:?} is missing an action"))?
            .trim()
            .to_ascii_lowercase();
        let arg = parts.next().map(str::trim);

        let action = match (verb.as_str(), arg) {
            ("start", None) => Action::Start,
            ("claim", None) => Action::Claim,
            ("peek", Some(category)) => Action::Peek(category.to_string()),
            ("upgrade", Some(category)) => Action::Upgrade(category.to_string()),
            ("credit", Some(amount)) => Action::Credit(
                amount
                    .replace('_', "")
                    .parse()
                    .with_context(|| format!("invalid credit amount in event {raw:?}"))?,
            ),
            _ => bail!("unrecognized event {raw:?}"),
        };

        Ok(Self { height, action })
    }
}

/// The stock demo: start at 2, claim at 4 and 10, top up and upgrade crops at
/// 11, then keep claiming.
fn default_schedule() -> Vec<ScheduledEvent> {
    let crops = AssetCategory::Crops.as_str().to_string();
    vec![
        ScheduledEvent {
            height: 2,
            action: Action::Start,
        },
        ScheduledEvent {
            height: 4,
            action: Action::Claim,
        },
        ScheduledEvent {
            height: 10,
            action: Action::Claim,
        },
        ScheduledEvent {
            height: 11,
            action: Action::Peek(crops.clone()),
        },
        ScheduledEvent {
            height: 11,
            action: Action::Credit(920_000),
        },
        ScheduledEvent {
            height: 11,
            action: Action::Upgrade(crops),
        },
        ScheduledEvent {
            height: 12,
            action: Action::Claim,
        },
        ScheduledEvent {
            height: 15,
            action: Action::Claim,
        },
        ScheduledEvent {
            height: 40,
            action: Action::Claim,
        },
    ]
}

fn init_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.pretty_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn apply(
    registry: &mut PlayerRegistry,
    admin: &OwnerId,
    owner: &OwnerId,
    event: &ScheduledEvent,
) -> Result<()> {
    let height = event.height;
    match &event.action {
        Action::Start => {
            registry.start(owner.clone(), height)?;
        }
        Action::Claim => {
            let receipt = registry.claim(owner, height)?;
            info!(
                height,
                accrued = receipt.accrued,
                balance = receipt.balance,
                "claimed"
            );
        }
        Action::Peek(category) => {
            let cost = registry.account(owner)?.peek_upgrade_cost_by_name(category)?;
            info!(height, %category, cost, "upgrade cost");
        }
        Action::Credit(amount) => {
            let balance = registry.add_funds(admin, owner, *amount)?;
            info!(height, amount, balance, "admin credit");
        }
        Action::Upgrade(category) => match registry.upgrade(owner, category)? {
            UpgradeOutcome::Succeeded {
                charged_cost,
                new_rate,
                new_cost,
                ..
            } => info!(height, %category, charged_cost, new_rate, new_cost, "upgraded"),
            UpgradeOutcome::Failed { reason, .. } => {
                warn!(height, %category, ?reason, "did not upgrade")
            }
            UpgradeOutcome::Rejected { reason } => {
                warn!(height, ?reason, "upgrade rejected")
            }
        },
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = match &args.config {
        Some(path) => EconomyConfig::load_from_file(path)
            .with_context(|| format!("load economy config {}", path.display()))?,
        None => EconomyConfig::default(),
    };

    let admin = OwnerId::new(args.admin.clone());
    let owner = OwnerId::new(args.owner.clone());
    let mut registry = PlayerRegistry::with_config(admin.clone(), config);

    let mut schedule = if args.events.is_empty() {
        default_schedule()
    } else {
        args.events.clone()
    };
    // Stable sort keeps same-height events in the order given.
    schedule.sort_by_key(|event| event.height);

    let tick = Duration::from_millis(args.tick_ms);
    let mut pending = schedule.iter().peekable();
    for height in 0..=args.until {
        while let Some(event) = pending.next_if(|event| event.height == height) {
            if let Err(err) = apply(&mut registry, &admin, &owner, event) {
                warn!(height, error = %err, "event failed");
            }
        }
        if !tick.is_zero() {
            thread::sleep(tick);
        }
    }

    let skipped = pending.count();
    if skipped > 0 {
        warn!(
            skipped,
            until = args.until,
            "events scheduled past the last block were not run"
        );
    }

    match registry.account(&owner) {
        Ok(account) => {
            let summary =
                serde_json::to_string_pretty(account).context("serialize account summary")?;
            println!("{summary}");
        }
        Err(err) => warn!(error = %err, "no account to summarize"),
    }

    Ok(())
}
