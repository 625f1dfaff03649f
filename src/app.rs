//! Terminal session driving a [`BootMenu`]

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::{self, stdout, Stdout};
use std::time::Duration;
use tracing::info;

use crate::input::{self, Input};
use crate::menu::BootMenu;
use crate::navigate::Navigator;
use crate::timeline::{Clock, SystemClock};
use crate::ui;

/// Upper bound on how long one event poll blocks
const TICK: Duration = Duration::from_millis(100);

/// Run the menu until the session ends or the user interrupts.
///
/// The terminal is restored before returning, also on error.
pub fn run<N: Navigator>(menu: BootMenu<N>) -> Result<BootMenu<N>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| {
            let result = event_loop(&mut terminal, menu, &SystemClock::new());
            terminal.show_cursor()?;
            result
        });

    // Cleanup
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn event_loop<N: Navigator, C: Clock>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut menu: BootMenu<N>,
    clock: &C,
) -> Result<BootMenu<N>> {
    loop {
        menu.pump(clock.now());
        terminal.draw(|f| ui::draw(f, &menu))?;

        if menu.is_finished() {
            info!("Boot menu session finished");
            return Ok(menu);
        }

        if event::poll(poll_timeout(&menu, clock.now()))? {
            match event::read()? {
                Event::Key(key) if input::is_interrupt(&key) => {
                    info!("Interrupted");
                    return Ok(menu);
                }
                Event::Key(key) => {
                    if let Some(input) = Input::from_key(&key) {
                        // New cues are scheduled relative to the timeline's time
                        menu.pump(clock.now());
                        menu.handle(input);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Sleep until the next cue is due, capped at [`TICK`]
fn poll_timeout<N: Navigator>(menu: &BootMenu<N>, now: Duration) -> Duration {
    match menu.next_due() {
        Some(due) => due.saturating_sub(now).min(TICK),
        None => TICK,
    }
}

/// Restore the terminal if a panic unwinds through the session
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        previous(panic);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootConfig;
    use crate::navigate::DeferredNavigator;
    use crate::status::LocalTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn poll_timeout_tracks_next_cue() {
        let config = BootConfig::default();
        let mut menu = BootMenu::new(
            &config,
            DeferredNavigator::default(),
            StdRng::seed_from_u64(0),
            Box::new(LocalTime),
        );
        assert_eq!(poll_timeout(&menu, Duration::ZERO), TICK);

        menu.exit();
        assert_eq!(poll_timeout(&menu, Duration::ZERO), TICK);
        assert_eq!(poll_timeout(&menu, Duration::from_millis(960)), Duration::from_millis(40));
        assert_eq!(poll_timeout(&menu, Duration::from_secs(5)), Duration::ZERO);
    }
}
