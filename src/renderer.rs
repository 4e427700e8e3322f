use log::{debug, info};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::clock::{nap, Clock};
use crate::display::{DisplayError, DisplaySink};
use crate::event::{CurrentState, Event};
use crate::humanize::humanize;
use crate::scroll::scroll;
use crate::state::StateReader;

pub struct Config {
    pub idle_message: String,
    pub busy_message: String,
    /// How often the idle screen re-checks the shared state
    pub idle_refresh: Duration,
    /// Pause between updates of a remaining-time line that fits the display
    pub static_refresh: Duration,
    /// How long each marquee frame stays up
    pub frame_dwell: Duration,
    /// Pause after a full marquee cycle
    pub scroll_pause: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_message: "Please Knock".into(),
            busy_message: "In a Meeting".into(),
            idle_refresh: Duration::from_secs(3),
            static_refresh: Duration::from_secs(2),
            frame_dwell: Duration::from_millis(300),
            scroll_pause: Duration::from_secs(3),
        }
    }
}

/// Drives the display from whatever the poller last published.
pub struct Renderer<D, C> {
    display: D,
    state: StateReader,
    clock: C,
    config: Config,
    width: usize,
    rows: usize,
}

impl<D, C> Renderer<D, C>
where
    D: DisplaySink + Send + 'static,
    C: Clock,
{
    pub fn new(display: D, state: StateReader, clock: C, config: Config) -> Self {
        let (cols, rows) = display.dimensions();

        Self {
            display,
            state,
            clock,
            config,
            width: cols.into(),
            rows: rows.into(),
        }
    }

    /// Renders until `cancel` fires or the display fails.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), DisplayError> {
        info!("Rendering to a {}x{} display", self.width, self.rows);

        let mut idle_shown = false;

        while !cancel.is_cancelled() {
            if let CurrentState::Active(event) = self.state.read() {
                if event.covers(self.clock.now()) {
                    info!("Showing meeting \"{}\"", event.label());
                    self.render_meeting(&event, &cancel).await?;
                    idle_shown = false;
                    continue;
                }
            }

            if !idle_shown {
                debug!("Showing idle message");
                self.render_idle()?;
                idle_shown = true;
            }

            if !nap(&cancel, self.config.idle_refresh).await {
                break;
            }
        }

        info!("Renderer stopped");
        Ok(())
    }

    fn render_idle(&mut self) -> Result<(), DisplayError> {
        self.display.clear()?;

        let message = self.config.idle_message.chars().collect::<Vec<_>>();
        for (row, chunk) in message.chunks(self.width.max(1)).take(self.rows).enumerate() {
            let text = chunk.iter().collect::<String>();
            self.display.write(row as u8, 0, &text)?;
        }
        Ok(())
    }

    /// Shows `event` until it is over, replaced, or rendering is cancelled.
    async fn render_meeting(
        &mut self,
        event: &Event,
        cancel: &CancellationToken,
    ) -> Result<(), DisplayError> {
        self.display.clear()?;

        let header = fit(&self.config.busy_message, self.width.saturating_sub(1));

        loop {
            let now = self.clock.now();
            if !event.covers(now) {
                debug!("Meeting \"{}\" is over", event.label());
                return Ok(());
            }
            if !self.state.holds(event) {
                debug!("Meeting \"{}\" is no longer current", event.label());
                return Ok(());
            }

            self.display.write(0, 0, &header)?;

            let line = format!("{} left", humanize(event.remaining(now)));

            if line.chars().count() <= self.width {
                self.display.write(1, 0, &fit(&line, self.width))?;
                if !nap(cancel, self.config.static_refresh).await {
                    return Ok(());
                }
                continue;
            }

            for frame in scroll(&line, self.width) {
                self.display.write(1, 0, &fit(&frame, self.width))?;
                if !nap(cancel, self.config.frame_dwell).await {
                    return Ok(());
                }
            }

            if !nap(cancel, self.config.scroll_pause).await {
                return Ok(());
            }
        }
    }
}

/// Pads or truncates `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    format!("{:<width$}", text.chars().take(width).collect::<String>())
}
