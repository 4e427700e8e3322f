mod cli;

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use meeting_sign::source::{Credentials, GraphCalendar, RaplaCalendar, Source, TokenStore};
use meeting_sign::{state, ConsoleDisplay, Poller, Renderer, SystemClock};

use cli::SourceKind;

const CLIENT_ID: &str = "MEETING_SIGN_CLIENT_ID";
const CLIENT_SECRET: &str = "MEETING_SIGN_CLIENT_SECRET";

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "meeting_sign=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}

fn credentials() -> Result<Credentials> {
    Ok(Credentials {
        client_id: env::var(CLIENT_ID).with_context(|| format!("`{CLIENT_ID}` is not set"))?,
        client_secret: env::var(CLIENT_SECRET)
            .with_context(|| format!("`{CLIENT_SECRET}` is not set"))?,
    })
}

async fn connect(kind: SourceKind, timeout: Duration) -> Result<Source> {
    match kind {
        SourceKind::Graph { token_file } => {
            let tokens = TokenStore::new(&token_file, credentials()?);
            let graph =
                GraphCalendar::new(tokens, timeout).context("Failed to set up HTTP client")?;
            graph.authenticate().await.with_context(|| {
                format!(
                    "Failed to authenticate with the token file {}",
                    token_file.display()
                )
            })?;
            info!("Authenticated with Microsoft Graph");
            Ok(Source::Graph(graph))
        }
        SourceKind::Rapla {
            upstream,
            key,
            salt,
        } => {
            let rapla = RaplaCalendar::new(upstream, key, salt, timeout)
                .context("Failed to set up HTTP client")?;
            Ok(Source::Rapla(rapla))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => error!("Failed to listen for SIGTERM: {err}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let args = cli::parse(env::args().collect());

    let source = connect(args.source, args.request_timeout).await?;
    let clock = SystemClock::new(args.timezone);
    let display = ConsoleDisplay::new(args.width, args.rows);

    let (publisher, reader) = state::channel();
    let poller = Poller::new(source, publisher, clock, args.poller);
    let renderer = Renderer::new(display, reader, clock, args.renderer);

    let cancel = CancellationToken::new();

    let poll_task = tokio::spawn(poller.run(cancel.clone()));
    let render_task = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let result = renderer.run(cancel.clone()).await;
            if result.is_err() {
                cancel.cancel();
            }
            result
        }
    });

    tokio::select! {
        () = shutdown_signal() => info!("Shutting down"),
        () = cancel.cancelled() => {},
    }
    cancel.cancel();

    poll_task.await.context("Poller task panicked")?;
    render_task
        .await
        .context("Renderer task panicked")?
        .context("Display failed")
}
