//! End-to-end tests of the registration state machine against a
//! scripted fake session.
//!
//! The fake schedules screen appearances on the (paused) tokio clock
//! and records every remote interaction, so the suites can assert both
//! the classification and the shape of the UI conversation that
//! produced it.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use simreg_appium::{ElementRef, Locator};
use simreg_core::{
    Batch, Config, Error, MailboxStore, Navigator, Outcome, ResultSink, Screen, UiSession,
    UnitReset, UnitRunner, WorkItem,
};
use tokio::time::Instant;

#[derive(Default)]
struct ScriptState {
    foreground: String,
    appearances: HashMap<String, Instant>,
    reveal_on_click: HashMap<String, Vec<String>>,
    reveal_on_keys: Vec<String>,
    clicks: Vec<String>,
    values: Vec<(String, String)>,
    keys: Vec<String>,
    deletes: usize,
    backs: usize,
    activations: usize,
    terminations: usize,
    ended: bool,
}

/// A fake automation session driven by a schedule of screen
/// appearances.
#[derive(Clone)]
struct ScriptedSession {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedSession {
    fn new(foreground: &str) -> Self {
        let state = ScriptState {
            foreground: foreground.to_string(),
            ..ScriptState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Makes an element visible immediately.
    fn show(&self, locator: &Locator) {
        self.show_at(locator, Duration::ZERO);
    }

    /// Makes an element visible at `delay` past now.
    fn show_at(&self, locator: &Locator, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state
            .appearances
            .insert(locator.value.clone(), Instant::now() + delay);
    }

    /// Makes `revealed` visible the moment `trigger` is clicked.
    fn reveal_on_click(&self, trigger: &Locator, revealed: &Locator) {
        let mut state = self.state.lock().unwrap();
        state
            .reveal_on_click
            .entry(trigger.value.clone())
            .or_default()
            .push(revealed.value.clone());
    }

    /// Makes an element visible once keystrokes are sent.
    fn reveal_on_keys(&self, revealed: &Locator) {
        let mut state = self.state.lock().unwrap();
        state.reveal_on_keys.push(revealed.value.clone());
    }

    fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    fn typed_values(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().values.clone()
    }

    fn sent_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().keys.clone()
    }

    fn count(&self, f: impl Fn(&ScriptState) -> usize) -> usize {
        f(&self.state.lock().unwrap())
    }
}

impl UiSession for ScriptedSession {
    async fn current_package(&self) -> simreg_appium::Result<String> {
        Ok(self.state.lock().unwrap().foreground.clone())
    }

    async fn activate_app(&self, app_id: &str) -> simreg_appium::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.foreground = app_id.to_string();
        state.activations += 1;
        Ok(())
    }

    async fn terminate_app(&self, _app_id: &str) -> simreg_appium::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.foreground = "com.android.launcher".to_string();
        state.terminations += 1;
        Ok(())
    }

    async fn back(&self) -> simreg_appium::Result<()> {
        self.state.lock().unwrap().backs += 1;
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> simreg_appium::Result<Option<ElementRef>> {
        let state = self.state.lock().unwrap();
        let visible = state
            .appearances
            .get(&locator.value)
            .is_some_and(|at| Instant::now() >= *at);
        Ok(visible.then(|| ElementRef {
            id: locator.value.clone(),
        }))
    }

    async fn click(&self, element: &ElementRef) -> simreg_appium::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(element.id.clone());
        if let Some(revealed) = state.reveal_on_click.get(&element.id).cloned() {
            let now = Instant::now();
            for value in revealed {
                state.appearances.insert(value, now);
            }
        }
        Ok(())
    }

    async fn set_value(&self, element: &ElementRef, text: &str) -> simreg_appium::Result<()> {
        self.state
            .lock()
            .unwrap()
            .values
            .push((element.id.clone(), text.to_string()));
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> simreg_appium::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.keys.push(text.to_string());
        let now = Instant::now();
        let revealed = std::mem::take(&mut state.reveal_on_keys);
        for value in revealed {
            state.appearances.insert(value, now);
        }
        Ok(())
    }

    async fn press_delete(&self) -> simreg_appium::Result<()> {
        self.state.lock().unwrap().deletes += 1;
        Ok(())
    }

    async fn end(self) -> simreg_appium::Result<()> {
        self.state.lock().unwrap().ended = true;
        Ok(())
    }
}

struct NoopReset;

impl UnitReset for NoopReset {
    async fn reset(&self, _unit_id: &str, _app_id: &str) -> simreg_core::Result<()> {
        Ok(())
    }
}

struct FailingReset {
    calls: AtomicUsize,
}

impl FailingReset {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl UnitReset for FailingReset {
    async fn reset(&self, _unit_id: &str, _app_id: &str) -> simreg_core::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Reset("device unreachable".into()))
    }
}

fn config() -> Config {
    Config::default()
}

fn item() -> WorkItem {
    WorkItem {
        phone_number: "34612345678".to_string(),
        unit_id: "SERIAL01".to_string(),
        port: "COM3".to_string(),
        iccid: "8934001234".to_string(),
    }
}

/// Puts the session on the phone-entry form with all controls present.
fn script_phone_entry(session: &ScriptedSession) {
    use simreg_core::screen::controls;

    session.show(&Screen::PhoneEntry.locator());
    session.show(&controls::country_code_field());
    session.show(&controls::national_number_field());
    session.show(&controls::submit_button());
    session.reveal_on_click(&controls::submit_button(), &controls::confirm_dialog());
}

fn mailbox(dir: &tempfile::TempDir) -> MailboxStore {
    MailboxStore::new(dir.path(), Duration::from_secs(2))
}

#[tokio::test(start_paused = true)]
async fn suspended_popup_wins_the_race() {
    let config = config();
    let session = ScriptedSession::new(&config.app_package);
    script_phone_entry(&session);
    // Suspended at 2s beats code entry at 5s.
    session.show_at(&Screen::SuspendedPopup.locator(), Duration::from_secs(2));
    session.show_at(&Screen::CodeEntry.locator(), Duration::from_secs(5));
    session.show(&simreg_core::screen::controls::popup_dismiss());

    let dir = tempfile::tempdir().unwrap();
    let mailbox = mailbox(&dir);
    let runner = UnitRunner::new(&session, &NoopReset, &mailbox, &config);

    let outcome = runner.run(&item()).await;

    assert_eq!(outcome, Outcome::Suspended);
    // The popup was dismissed, and the code path never ran.
    let dismiss = simreg_core::screen::controls::popup_dismiss().value;
    assert!(session.clicks().contains(&dismiss));
    assert!(session.sent_keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn direct_password_resolves_two_factor() {
    let config = config();
    let session = ScriptedSession::new(&config.app_package);
    script_phone_entry(&session);
    session.show_at(&Screen::PasswordDirect.locator(), Duration::from_secs(1));

    let dir = tempfile::tempdir().unwrap();
    let mailbox = mailbox(&dir);
    let runner = UnitRunner::new(&session, &NoopReset, &mailbox, &config);

    let outcome = runner.run(&item()).await;

    assert_eq!(outcome, Outcome::TwoFactor);
    // The split number went into the two fields.
    let values = session.typed_values();
    assert!(values.iter().any(|(_, v)| v == "34"));
    assert!(values.iter().any(|(_, v)| v == "612345678"));
}

#[tokio::test(start_paused = true)]
async fn navigation_exhaustion_classifies_unknown_without_submission() {
    let config = config();
    let session = ScriptedSession::new(&config.app_package);
    // No screen ever appears.

    let dir = tempfile::tempdir().unwrap();
    let mailbox = mailbox(&dir);
    let runner = UnitRunner::new(&session, &NoopReset, &mailbox, &config);

    let outcome = runner.run(&item()).await;

    assert_eq!(outcome, Outcome::Unknown);
    assert!(session.typed_values().is_empty());
    assert_eq!(session.count(|s| s.backs), 5);
}

#[tokio::test(start_paused = true)]
async fn welcome_screen_is_clicked_through() {
    let config = config();
    let session = ScriptedSession::new(&config.app_package);
    session.show(&Screen::Welcome.locator());
    session.reveal_on_click(&Screen::Welcome.locator(), &Screen::PhoneEntry.locator());

    Navigator::new(&config.app_package, &config.timing)
        .to_phone_entry(&session)
        .await
        .unwrap();

    assert!(session.clicks().contains(&Screen::Welcome.locator().value));
}

#[tokio::test(start_paused = true)]
async fn background_app_is_reactivated() {
    let config = config();
    let session = ScriptedSession::new("some.other.app");
    session.show(&Screen::PhoneEntry.locator());

    Navigator::new(&config.app_package, &config.timing)
        .to_phone_entry(&session)
        .await
        .unwrap();

    assert_eq!(session.count(|s| s.activations), 1);
}

#[tokio::test(start_paused = true)]
async fn late_code_without_followup_resolves_no_two_factor() {
    let config = config();
    let session = ScriptedSession::new(&config.app_package);
    script_phone_entry(&session);
    session.show_at(&Screen::CodeEntry.locator(), Duration::from_secs(1));

    let dir = tempfile::tempdir().unwrap();
    let mailbox = mailbox(&dir);
    let record = mailbox.record_path(&item().phone_number);
    let writer = tokio::spawn(async move {
        // Delivered ten minutes in; the rendezvous has no deadline.
        tokio::time::sleep(Duration::from_secs(600)).await;
        tokio::fs::write(&record, "12345").await.unwrap();
    });

    let runner = UnitRunner::new(&session, &NoopReset, &mailbox, &config);
    let outcome = runner.run(&item()).await;
    writer.await.unwrap();

    assert_eq!(outcome, Outcome::NoTwoFactor);
    assert_eq!(session.sent_keys(), vec!["12345".to_string()]);
    // Consumed destructively.
    assert!(!mailbox.record_path(&item().phone_number).exists());
}

#[tokio::test(start_paused = true)]
async fn code_followed_by_password_resolves_two_factor() {
    let config = config();
    let session = ScriptedSession::new(&config.app_package);
    script_phone_entry(&session);
    session.show_at(&Screen::CodeEntry.locator(), Duration::from_secs(1));
    session.reveal_on_keys(&Screen::PasswordFollowup.locator());

    let dir = tempfile::tempdir().unwrap();
    let mailbox = mailbox(&dir);
    tokio::fs::write(mailbox.record_path(&item().phone_number), "54321")
        .await
        .unwrap();

    let runner = UnitRunner::new(&session, &NoopReset, &mailbox, &config);
    let outcome = runner.run(&item()).await;

    assert_eq!(outcome, Outcome::TwoFactor);
    assert_eq!(session.sent_keys(), vec!["54321".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn reset_failure_does_not_prevent_the_attempt() {
    let config = config();
    let session = ScriptedSession::new(&config.app_package);
    script_phone_entry(&session);
    session.show_at(&Screen::PasswordDirect.locator(), Duration::from_secs(1));

    let dir = tempfile::tempdir().unwrap();
    let mailbox = mailbox(&dir);
    let reset = FailingReset::new();
    let runner = UnitRunner::new(&session, &reset, &mailbox, &config);

    let outcome = runner.run(&item()).await;

    assert_eq!(reset.calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome, Outcome::TwoFactor);
}

#[tokio::test(start_paused = true)]
async fn batch_classifies_every_item_and_cleans_the_mailbox() {
    let config = config();
    let session = ScriptedSession::new(&config.app_package);
    script_phone_entry(&session);
    session.show_at(&Screen::SuspendedPopup.locator(), Duration::from_secs(2));
    session.show(&simreg_core::screen::controls::popup_dismiss());

    let mailbox_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let mailbox = mailbox(&mailbox_dir);
    let sink = ResultSink::new(output_dir.path());

    let second = WorkItem {
        phone_number: "34687654321".to_string(),
        unit_id: "SERIAL01".to_string(),
        port: "COM3".to_string(),
        iccid: String::new(),
    };
    let items = vec![item(), second.clone()];
    for it in &items {
        mailbox.seed(&it.phone_number).await.unwrap();
    }

    let batch = Batch::new(&config, &NoopReset, &mailbox, &sink);
    let summary = batch
        .run(&items, || {
            let session = session.clone();
            async move { Ok(session) }
        })
        .await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.count(Outcome::Suspended), 2);
    // Exactly one record per item, in input order.
    let records =
        std::fs::read_to_string(output_dir.path().join("num_suspendidos.txt")).unwrap();
    let lines: Vec<&str> = records.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("34612345678,"));
    assert!(lines[1].starts_with("34687654321,"));
    // Mailbox cleaned up on every terminal path.
    assert!(!mailbox.record_path(&item().phone_number).exists());
    assert!(!mailbox.record_path(&second.phone_number).exists());
    assert!(session.count(|s| usize::from(s.ended)) == 1);
}

#[tokio::test(start_paused = true)]
async fn connection_failure_classifies_batch_without_ui_interaction() {
    let config = config();
    let output_dir = tempfile::tempdir().unwrap();
    let mailbox_dir = tempfile::tempdir().unwrap();
    let mailbox = mailbox(&mailbox_dir);
    let sink = ResultSink::new(output_dir.path());

    let attempts = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&attempts);

    let items = vec![item()];
    let batch = Batch::new(&config, &NoopReset, &mailbox, &sink);
    let summary = batch
        .run(&items, move || {
            counted.fetch_add(1, Ordering::SeqCst);
            async move {
                Err::<ScriptedSession, _>(simreg_appium::Error::UnexpectedStatus(503))
            }
        })
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 5);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.count(Outcome::Unknown), 1);
    let records = std::fs::read_to_string(output_dir.path().join("num_error.txt")).unwrap();
    assert_eq!(records.lines().count(), 1);
}
