//! Huddle command-line client.
//!
//! # Usage
//!
//! ```bash
//! # Watch a session, logging every signal
//! huddle --snapshot session.json
//!
//! # Post into #general once logged in
//! huddle --snapshot session.json --channel general --say "deploy finished"
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use huddle_client::{Session, SessionConfig, WebSocketTransport};
use huddle_core::{Listener, Notification, Signal};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Huddle real-time session client
#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(about = "Open a Huddle real-time session and log its traffic")]
#[command(version)]
struct Args {
    /// Path to the session snapshot (JSON with self, users, channels and url)
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Connect timeout in milliseconds
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Channel to post into, by name
    #[arg(short, long, requires = "say")]
    channel: Option<String>,

    /// Text to post once the session is established
    #[arg(long, requires = "channel")]
    say: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Lifecycle signals the main loop acts on.
#[derive(Debug, Clone, Copy)]
enum Lifecycle {
    LoggedIn,
    Closed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let text = tokio::fs::read_to_string(&args.snapshot).await?;
    let payload: serde_json::Value = serde_json::from_str(&text)?;

    let mut config = SessionConfig::default();
    if let Some(ms) = args.connect_timeout_ms {
        config = config.with_connect_timeout(Duration::from_millis(ms));
    }

    let (lifecycle_tx, mut lifecycle_rx) = mpsc::unbounded_channel();
    let session = Session::connect(&payload, &config, [signal_logger(lifecycle_tx)]).await?;

    tracing::info!(
        users = session.directory().users().count(),
        channels = session.directory().channels().count(),
        "session opened"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                session.close();
            },
            lifecycle = lifecycle_rx.recv() => match lifecycle {
                Some(Lifecycle::LoggedIn) => announce(&session, &args),
                Some(Lifecycle::Closed) | None => break,
            },
        }
    }

    Ok(())
}

/// Listener that logs every signal and forwards lifecycle changes.
fn signal_logger(lifecycle: mpsc::UnboundedSender<Lifecycle>) -> Arc<dyn Listener> {
    Arc::new(move |signal: &Signal| match signal {
        Signal::LoginComplete => {
            tracing::info!("logged in");
            let _ = lifecycle.send(Lifecycle::LoggedIn);
        },
        Signal::Closed => {
            let _ = lifecycle.send(Lifecycle::Closed);
        },
        Signal::Error(error) => tracing::error!(%error, code = ?error.code(), "session error"),
        Signal::Event(Notification::Message(event)) => tracing::info!(
            subtype = ?event.subtype(),
            channel = ?event.message.channel,
            user = event.user.as_ref().map(|u| u.name.as_str()),
            text = event.message.text.as_deref(),
            "message"
        ),
        Signal::Event(Notification::Sent(sent)) => {
            tracing::info!(id = sent.id, ts = sent.ts.as_deref(), "message delivered");
        },
        Signal::Event(Notification::Lifecycle(event)) => tracing::info!(
            kind = ?event.kind,
            channel = ?event.channel,
            user = ?event.user,
            "lifecycle event"
        ),
    })
}

fn announce(session: &Session<WebSocketTransport>, args: &Args) {
    let (Some(name), Some(text)) = (&args.channel, &args.say) else {
        return;
    };

    let Some(channel) = session.directory().channel(name) else {
        tracing::warn!(channel = %name, "unknown channel, not posting");
        return;
    };

    match session.send_text(text.as_str(), channel.id.clone()) {
        Ok(id) => tracing::info!(id, channel = %name, "message sent"),
        Err(error) => tracing::error!(%error, "failed to send message"),
    }
}
