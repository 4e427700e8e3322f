use chrono::Duration;

/// Smallest unit a humanized duration is rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Seconds,
    Minutes,
}

impl Unit {
    const fn seconds(self) -> i64 {
        match self {
            Unit::Seconds => 1,
            Unit::Minutes => 60,
        }
    }
}

const PARTS: [(i64, &str); 4] = [
    (24 * 60 * 60, "day"),
    (60 * 60, "hour"),
    (60, "minute"),
    (1, "second"),
];

/// Formats the time remaining until the end of a meeting, e.g.
/// `"1 hour and 5 minutes"`. Seconds are rounded away.
pub fn humanize(delta: Duration) -> String {
    precise_delta(delta, Unit::Minutes)
}

/// Spells out `delta` in days, hours, minutes and seconds, rounded half up to
/// `minimum`. Empty components are left out and negative durations count as
/// zero.
pub fn precise_delta(delta: Duration, minimum: Unit) -> String {
    let step = minimum.seconds();
    let seconds = delta.num_seconds().max(0);
    let mut rest = (seconds + step / 2) / step * step;

    let mut parts = Vec::new();
    for (size, name) in PARTS.into_iter().filter(|(size, _)| *size >= step) {
        let count = rest / size;
        rest %= size;
        if count > 0 {
            parts.push(quantity(count, name));
        }
    }

    match parts.as_slice() {
        [] => quantity(0, if minimum == Unit::Minutes { "minute" } else { "second" }),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

fn quantity(count: i64, name: &str) -> String {
    if count == 1 {
        format!("1 {name}")
    } else {
        format!("{count} {name}s")
    }
}
