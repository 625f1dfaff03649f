//! Boot menu controller
//!
//! Owns the cursor, the busy flag, the status board, and the timeline of
//! pending cues. The host feeds it [`Input`]s and advances it with
//! [`BootMenu::pump`]; rendering reads its state.

use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{BootConfig, BootEntry, MessageSettings};
use crate::input::Input;
use crate::navigate::Navigator;
use crate::schedule;
use crate::status::{StatusBoard, StatusLine, TimeSource, IDLE_MESSAGE};
use crate::timeline::Timeline;

/// Decides which entries get the extended boot sequence
pub type SpecialPredicate = Box<dyn Fn(&BootEntry) -> bool>;

/// Why a dialog is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    BootComplete,
    ExitMenu,
}

/// Blocking acknowledgment shown over the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cue {
    Status(String),
    Finish { name: String, url: Option<String> },
    Navigate(String),
    ExitPrompt,
}

pub struct BootMenu<N> {
    title: String,
    entries: Vec<BootEntry>,
    cursor: usize,
    booting: bool,
    blackout: bool,
    finished: bool,
    dialog: Option<Dialog>,
    status: StatusBoard,
    timeline: Timeline<Cue>,
    messages: MessageSettings,
    special: SpecialPredicate,
    redirect_delay: Duration,
    exit_delay: Duration,
    quit_on_exit: bool,
    rng: StdRng,
    navigator: N,
    navigation_error: Option<anyhow::Error>,
}

impl<N: Navigator> BootMenu<N> {
    /// Build a menu from a validated config.
    ///
    /// The entry list must not be empty; [`BootConfig::validate`] guards that.
    pub fn new(config: &BootConfig, navigator: N, rng: StdRng, clock: Box<dyn TimeSource>) -> Self {
        let cursor = config.initial_cursor();
        Self {
            title: config.menu.title.clone(),
            entries: config.entries.clone(),
            cursor,
            booting: false,
            blackout: false,
            finished: false,
            dialog: None,
            status: StatusBoard::new(config.menu.log_capacity, config.menu.timestamps, clock),
            timeline: Timeline::new(),
            messages: config.messages.clone(),
            special: Box::new(config.special_predicate()),
            redirect_delay: Duration::from_millis(config.menu.redirect_ms),
            exit_delay: Duration::from_millis(config.menu.exit_delay_ms),
            quit_on_exit: config.menu.quit_on_exit,
            rng,
            navigator,
            navigation_error: None,
        }
    }

    /// Replace the special-entry predicate
    pub fn with_special(mut self, predicate: SpecialPredicate) -> Self {
        self.special = predicate;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entries(&self) -> &[BootEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> &BootEntry {
        &self.entries[self.cursor]
    }

    pub fn is_selected(&self, index: usize) -> bool {
        index == self.cursor
    }

    pub fn is_booting(&self) -> bool {
        self.booting
    }

    pub fn is_blackout(&self) -> bool {
        self.blackout
    }

    /// The session is over: navigation happened or exit asked to quit
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn status(&self) -> &StatusLine {
        self.status.current()
    }

    pub fn status_board(&self) -> &StatusBoard {
        &self.status
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }

    /// Why the last navigation failed, if it did
    pub fn navigation_error(&self) -> Option<&anyhow::Error> {
        self.navigation_error.as_ref()
    }

    pub fn take_navigation_error(&mut self) -> Option<anyhow::Error> {
        self.navigation_error.take()
    }

    /// Earliest pending cue, for sizing the host's event poll
    pub fn next_due(&self) -> Option<Duration> {
        self.timeline.next_due()
    }

    pub fn pending(&self) -> usize {
        self.timeline.len()
    }

    /// Handle one input. Returns whether it changed anything.
    pub fn handle(&mut self, input: Input) -> bool {
        if self.dialog.is_some() {
            return match input {
                Input::Confirm | Input::Cancel | Input::Dismiss => {
                    self.acknowledge();
                    true
                }
                Input::Up | Input::Down => false,
            };
        }
        if self.booting {
            return false;
        }
        match input {
            Input::Up => self.move_selection(-1),
            Input::Down => self.move_selection(1),
            Input::Confirm => self.activate(),
            Input::Cancel => self.exit(),
            Input::Dismiss => return false,
        }
        true
    }

    /// Move the cursor by `direction`, wrapping at both ends
    pub fn move_selection(&mut self, direction: isize) {
        if self.booting {
            return;
        }
        let len = self.entries.len() as isize;
        self.cursor = (self.cursor as isize + direction).rem_euclid(len) as usize;
    }

    /// Start the boot sequence for the selected entry
    pub fn activate(&mut self) {
        if self.booting {
            return;
        }
        self.booting = true;

        let entry = self.entries[self.cursor].clone();
        let special = (self.special)(&entry);
        self.status.set(format!("Booting {}...", entry.name));

        let plan = schedule::plan_boot(&entry.name, special, &self.messages, &mut self.rng);
        debug!(
            entry = %entry.name,
            special,
            steps = plan.steps.len(),
            finish_ms = plan.finish_at.as_millis() as u64,
            "scheduled boot sequence"
        );

        for step in plan.steps {
            self.timeline.schedule_in(step.at, Cue::Status(step.message));
        }
        self.timeline.schedule_in(
            plan.finish_at,
            Cue::Finish {
                url: entry.target().map(str::to_string),
                name: entry.name,
            },
        );
    }

    /// Start the exit sequence
    pub fn exit(&mut self) {
        if self.booting {
            return;
        }
        self.booting = true;
        self.status.set("Exiting boot menu...");
        self.timeline.schedule_in(self.exit_delay, Cue::ExitPrompt);
    }

    /// Close the open dialog and return to idle
    pub fn acknowledge(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        self.booting = false;
        self.status.set(IDLE_MESSAGE);
        if dialog.kind == DialogKind::ExitMenu && self.quit_on_exit {
            self.finished = true;
        }
    }

    /// Fire every cue due at or before `now`
    pub fn pump(&mut self, now: Duration) {
        while let Some(cue) = self.timeline.pop_due(now) {
            self.fire(cue);
        }
        self.timeline.settle(now);
    }

    fn fire(&mut self, cue: Cue) {
        match cue {
            Cue::Status(message) => self.status.set(message),
            Cue::Finish { name, url: Some(url) } => {
                debug!(entry = %name, "boot sequence finished, redirecting");
                self.status.set(format!("Redirecting to {url}"));
                self.blackout = true;
                self.timeline.schedule_in(self.redirect_delay, Cue::Navigate(url));
            }
            Cue::Finish { name, url: None } => {
                self.status.set("Boot complete (no URL configured)");
                self.dialog = Some(Dialog {
                    kind: DialogKind::BootComplete,
                    text: format!("Boot sequence complete!\n\nProject: {name}\n\n(No URL configured)"),
                });
            }
            Cue::Navigate(url) => {
                if let Err(e) = self.navigator.navigate(&url) {
                    warn!("Navigation to {} failed: {:#}", url, e);
                    self.blackout = false;
                    self.status.set(format!("Redirect failed: {e}"));
                    self.navigation_error = Some(e.context(format!("Failed to open {url}")));
                }
                self.finished = true;
            }
            Cue::ExitPrompt => {
                self.dialog = Some(Dialog {
                    kind: DialogKind::ExitMenu,
                    text: String::from("Boot menu closed."),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigate::DeferredNavigator;
    use crate::status::FixedTime;
    use crate::timeline::{Clock, ManualClock};
    use chrono::NaiveTime;
    use rand::SeedableRng;

    /// Longest possible special sequence plus the redirect blackout
    const DRAIN: Duration = Duration::from_secs(30);

    fn config(entries: Vec<BootEntry>) -> BootConfig {
        let mut config = BootConfig::default();
        config.menu.timestamps = false;
        config.entries = entries;
        config
    }

    fn menu_with(config: &BootConfig, seed: u64) -> BootMenu<DeferredNavigator> {
        let clock = FixedTime(NaiveTime::from_hms_opt(23, 59, 1).unwrap());
        BootMenu::new(
            config,
            DeferredNavigator::default(),
            StdRng::seed_from_u64(seed),
            Box::new(clock),
        )
    }

    fn foo_jsos() -> BootConfig {
        config(vec![
            BootEntry::new("Foo", Some("https://foo")),
            BootEntry::new("JSOS", Some("https://jsos")),
        ])
    }

    fn snapshot<N: Navigator>(menu: &BootMenu<N>) -> (usize, bool, bool, String, usize, Option<Dialog>) {
        (
            menu.cursor(),
            menu.is_booting(),
            menu.is_blackout(),
            menu.status().to_string(),
            menu.pending(),
            menu.dialog().cloned(),
        )
    }

    #[test]
    fn starts_idle_on_marked_entry() {
        let mut cfg = foo_jsos();
        cfg.entries[1].selected = true;
        let menu = menu_with(&cfg, 1);
        assert_eq!(menu.cursor(), 1);
        assert!(!menu.is_booting());
        assert_eq!(menu.status().message, "System ready.");
    }

    #[test]
    fn moves_wrap_in_both_directions() {
        let cfg = config(vec![
            BootEntry::new("a", None),
            BootEntry::new("b", None),
            BootEntry::new("c", None),
        ]);
        let mut menu = menu_with(&cfg, 1);

        menu.handle(Input::Up);
        assert_eq!(menu.cursor(), 2);
        menu.handle(Input::Down);
        menu.handle(Input::Down);
        assert_eq!(menu.cursor(), 1);
    }

    #[test]
    fn cursor_tracks_sum_of_moves() {
        let cfg = config((0..5).map(|n| BootEntry::new(format!("e{n}"), None)).collect());
        let moves: [isize; 12] = [1, 1, -1, 1, 1, 1, 1, 1, -1, -1, -1, 1];
        for initial in 0..5 {
            let mut cfg = cfg.clone();
            cfg.entries[initial].selected = true;
            let mut menu = menu_with(&cfg, 0);

            let mut sum = 0isize;
            for direction in moves {
                menu.handle(if direction < 0 { Input::Up } else { Input::Down });
                sum += direction;
                let expected = (initial as isize + sum).rem_euclid(5) as usize;
                assert_eq!(menu.cursor(), expected);
                assert_eq!((0..5).filter(|&i| menu.is_selected(i)).count(), 1);
            }
        }
    }

    #[test]
    fn input_is_ignored_while_booting() {
        let cfg = foo_jsos();
        let mut menu = menu_with(&cfg, 3);
        assert!(menu.handle(Input::Confirm));
        assert!(menu.is_booting());

        let before = snapshot(&menu);
        for input in [Input::Up, Input::Down, Input::Confirm, Input::Cancel, Input::Dismiss] {
            assert!(!menu.handle(input));
            assert_eq!(snapshot(&menu), before);
        }
    }

    #[test]
    fn url_entry_navigates_once_and_stays_busy() {
        let cfg = foo_jsos();
        let mut menu = menu_with(&cfg, 9);
        menu.activate();
        assert_eq!(menu.status().message, "Booting Foo...");

        menu.pump(DRAIN);
        assert_eq!(menu.navigator().visited(), ["https://foo"]);
        assert!(menu.is_booting());
        assert!(menu.is_finished());
        assert!(menu.is_blackout());
        assert_eq!(menu.pending(), 0);

        menu.handle(Input::Confirm);
        menu.pump(DRAIN * 2);
        assert_eq!(menu.navigator().visited().len(), 1);
    }

    #[test]
    fn redirect_waits_for_blackout() {
        let cfg = foo_jsos();
        let mut menu = menu_with(&cfg, 4);
        let clock = ManualClock::default();
        menu.activate();

        while !menu.is_blackout() {
            clock.advance(Duration::from_millis(10));
            menu.pump(clock.now());
        }
        assert_eq!(menu.status().message, "Redirecting to https://foo");
        assert!(menu.navigator().visited().is_empty());

        let blackout_at = clock.now();
        clock.advance(Duration::from_millis(590));
        menu.pump(clock.now());
        assert!(menu.navigator().visited().is_empty());

        clock.advance(Duration::from_millis(20));
        menu.pump(clock.now());
        assert_eq!(menu.navigator().visited(), ["https://foo"]);
        assert!(clock.now() - blackout_at >= Duration::from_millis(600));
    }

    #[test]
    fn entry_without_url_returns_to_idle_after_ack() {
        let cfg = config(vec![BootEntry::new("Notes", None)]);
        let mut menu = menu_with(&cfg, 5);
        menu.activate();
        menu.pump(DRAIN);

        assert_eq!(menu.status().message, "Boot complete (no URL configured)");
        let dialog = menu.dialog().cloned().unwrap();
        assert_eq!(dialog.kind, DialogKind::BootComplete);
        assert!(dialog.text.contains("Project: Notes"));
        assert!(menu.is_booting());
        assert!(menu.navigator().visited().is_empty());

        assert!(!menu.handle(Input::Down));
        assert!(menu.handle(Input::Confirm));
        assert!(!menu.is_booting());
        assert!(menu.dialog().is_none());
        assert_eq!(menu.status().message, "System ready.");
        assert!(!menu.is_finished());
    }

    #[test]
    fn blank_url_counts_as_unconfigured() {
        let cfg = config(vec![BootEntry::new("Blank", Some(""))]);
        let mut menu = menu_with(&cfg, 5);
        menu.activate();
        menu.pump(DRAIN);
        assert_eq!(menu.dialog().map(|d| d.kind), Some(DialogKind::BootComplete));
    }

    #[test]
    fn exit_round_trips_through_dialog() {
        let cfg = foo_jsos();
        for start in 0..2 {
            let mut menu = menu_with(&cfg, 0);
            if start == 1 {
                menu.handle(Input::Down);
            }
            let clock = ManualClock::default();

            assert!(menu.handle(Input::Cancel));
            assert!(menu.is_booting());
            assert_eq!(menu.status().message, "Exiting boot menu...");

            clock.advance(Duration::from_millis(999));
            menu.pump(clock.now());
            assert!(menu.dialog().is_none());

            clock.advance(Duration::from_millis(1));
            menu.pump(clock.now());
            assert_eq!(menu.dialog().map(|d| d.kind), Some(DialogKind::ExitMenu));
            assert!(menu.is_booting());

            menu.handle(Input::Dismiss);
            assert!(!menu.is_booting());
            assert_eq!(menu.status().message, "System ready.");
            assert_eq!(menu.cursor(), start);
            assert!(!menu.is_finished());
        }
    }

    #[test]
    fn exit_can_end_the_session() {
        let mut cfg = foo_jsos();
        cfg.menu.quit_on_exit = true;
        let mut menu = menu_with(&cfg, 0);
        menu.exit();
        menu.pump(Duration::from_millis(1000));
        menu.acknowledge();
        assert!(menu.is_finished());
    }

    #[test]
    fn jsos_example_runs_extended_sequence() {
        let cfg = foo_jsos();
        let mut menu = menu_with(&cfg, 11);

        menu.handle(Input::Down);
        assert_eq!(menu.selected().name, "JSOS");
        menu.handle(Input::Confirm);
        assert!(menu.is_booting());
        // 5 messages, subsystem, 2 service lines, finish
        assert_eq!(menu.pending(), 9);

        let clock = ManualClock::default();
        while !menu.is_finished() {
            clock.advance(Duration::from_millis(25));
            menu.pump(clock.now());
        }

        let pool = schedule::message_pool(&cfg.messages, true);
        let shown: Vec<String> = menu
            .status_board()
            .history()
            .skip_while(|line| line.message != "Booting JSOS...")
            .skip(1)
            .map(|line| line.message.clone())
            .collect();
        assert_eq!(shown.len(), 9);

        let drawn = &shown[..5];
        assert!(drawn.iter().all(|m| pool.contains(&m.as_str())));
        let mut unique = drawn.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
        assert_eq!(shown[5], "Initializing JSOS subsystem...");
        assert_eq!(shown[6], "Bringing services online...");
        assert_eq!(shown[7], "Ready to launch desktop...");
        assert_eq!(shown[8], "Redirecting to https://jsos");
        assert_eq!(menu.navigator().visited(), ["https://jsos"]);
    }

    #[test]
    fn custom_predicate_overrides_keywords() {
        let cfg = foo_jsos();
        let mut menu = menu_with(&cfg, 2).with_special(Box::new(|e| e.name == "Foo"));
        menu.activate();
        assert_eq!(menu.pending(), 9);
    }

    #[test]
    fn failed_navigation_still_ends_session() {
        struct Broken;
        impl Navigator for Broken {
            fn navigate(&mut self, _url: &str) -> anyhow::Result<()> {
                anyhow::bail!("no opener")
            }
        }

        let cfg = foo_jsos();
        let clock = FixedTime(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        let mut menu = BootMenu::new(&cfg, Broken, StdRng::seed_from_u64(0), Box::new(clock));
        menu.activate();
        menu.pump(DRAIN);
        assert!(menu.is_finished());
        assert!(menu.is_booting());
        assert_eq!(menu.status().message, "Redirect failed: no opener");

        let err = menu.take_navigation_error().unwrap();
        assert_eq!(err.to_string(), "Failed to open https://foo");
        assert_eq!(err.root_cause().to_string(), "no opener");
        assert!(menu.navigation_error().is_none());
    }
}
