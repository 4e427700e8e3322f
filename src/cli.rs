use std::env;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use chrono_tz::Tz;
use getopts::{Matches, Options};
use tokio::time::Duration;

use meeting_sign::source::RAPLA_UPSTREAM;
use meeting_sign::{poller, renderer};

pub enum SourceKind {
    Graph { token_file: PathBuf },
    Rapla {
        upstream: String,
        key: String,
        salt: String,
    },
}

pub struct Args {
    pub source: SourceKind,
    pub timezone: Tz,
    pub width: u8,
    pub rows: u8,
    pub poller: poller::Config,
    /// Bound on a single calendar request, kept below the poll interval
    pub request_timeout: Duration,
    pub renderer: renderer::Config,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "s",
        "source",
        "Calendar to poll, `graph` or `rapla` [Default: graph]",
        "SOURCE",
    );
    opts.optopt(
        "t",
        "token-file",
        "Microsoft Graph token file [Default: token.json]",
        "PATH",
    );
    opts.optopt(
        "",
        "rapla-upstream",
        "Rapla server to query [Default: https://rapla.dhbw.de]",
        "URL",
    );
    opts.optopt("", "rapla-key", "Key of the Rapla calendar", "KEY");
    opts.optopt("", "rapla-salt", "Salt of the Rapla calendar", "SALT");
    opts.optopt(
        "z",
        "timezone",
        "Time zone events are compared in [Default: America/Denver]",
        "ZONE",
    );
    opts.optopt(
        "w",
        "width",
        "Columns of the character display [Default: 16]",
        "COLUMNS",
    );
    opts.optopt(
        "r",
        "rows",
        "Rows of the character display, at least 2 [Default: 2]",
        "ROWS",
    );
    opts.optopt(
        "i",
        "poll-interval",
        "Time between calendar queries [Default: 30]",
        "SECONDS",
    );
    opts.optopt(
        "",
        "idle-message",
        "Shown while no meeting is running [Default: Please Knock]",
        "TEXT",
    );
    opts.optopt(
        "",
        "busy-message",
        "Shown above the remaining time of a meeting [Default: In a Meeting]",
        "TEXT",
    );
    opts
}

fn fail(message: String) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

fn get_or<T>(matches: &Matches, name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match matches.opt_get_default(name, default) {
        Ok(value) => value,
        Err(err) => fail(format!("Provided value for option '{name}' is invalid: {err}")),
    }
}

fn required(matches: &Matches, name: &str) -> String {
    matches
        .opt_str(name)
        .unwrap_or_else(|| fail(format!("Option '{name}' is required for the rapla source")))
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
        process::exit(0);
    }

    let source = match get_or(&matches, "source", String::from("graph")).as_str() {
        "graph" => SourceKind::Graph {
            token_file: get_or(&matches, "token-file", PathBuf::from("token.json")),
        },
        "rapla" => SourceKind::Rapla {
            upstream: get_or(&matches, "rapla-upstream", String::from(RAPLA_UPSTREAM)),
            key: required(&matches, "rapla-key"),
            salt: required(&matches, "rapla-salt"),
        },
        other => fail(format!("Unknown calendar source '{other}'")),
    };

    let timezone = get_or(&matches, "timezone", chrono_tz::America::Denver);

    let width = get_or(&matches, "width", 16u8);
    if width == 0 {
        fail("Option 'width' must be at least 1".into());
    }

    let rows = get_or(&matches, "rows", 2u8);
    if rows < 2 {
        fail("Option 'rows' must be at least 2".into());
    }

    let interval = get_or(&matches, "poll-interval", 30u64);
    if interval == 0 {
        fail("Option 'poll-interval' must be at least 1".into());
    }

    let poller = poller::Config {
        interval: Duration::from_secs(interval),
    };
    let request_timeout = Duration::from_secs((interval / 2).clamp(1, 20));

    let defaults = renderer::Config::default();
    let renderer = renderer::Config {
        idle_message: get_or(&matches, "idle-message", defaults.idle_message.clone()),
        busy_message: get_or(&matches, "busy-message", defaults.busy_message.clone()),
        ..defaults
    };

    Args {
        source,
        timezone,
        width,
        rows,
        poller,
        request_timeout,
        renderer,
    }
}
