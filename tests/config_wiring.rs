//! Integration tests for config wiring
//!
//! These tests verify that config settings reach the code that uses them:
//! the reminder window and poll interval, and the default profile.

use chrono::{Duration, Local};
use chronos::cli::open_store;
use chronos::config::{save_config, Config};
use chronos::reminder::ReminderPoller;
use chronos::store::{list_profiles, JsonFileStorage, TaskStore};
use chronos::task::{NewTask, Priority, Task, TaskKind};
use serial_test::serial;

fn setup_temp_home() -> tempfile::TempDir {
    let temp = tempfile::TempDir::new().unwrap();
    std::env::set_var("CHRONOS_HOME", temp.path());
    temp
}

fn add_due_in(store: &mut TaskStore<JsonFileStorage>, minutes: i64) {
    let deadline = Local::now().naive_local() + Duration::minutes(minutes);
    store
        .add_task(NewTask::new("wired", Priority::High, deadline, TaskKind::Daily))
        .unwrap();
}

#[test]
#[serial]
fn test_reminder_lead_from_config_widens_window() {
    let _temp = setup_temp_home();

    let mut config = Config::default();
    config.reminder.lead_minutes = 45;
    save_config(&config).unwrap();

    let config = Config::load().unwrap();
    let mut store = open_store("default", &config).unwrap();
    add_due_in(&mut store, 30);

    let fired = store
        .check_reminders(Local::now().naive_local(), &|_: &Task| {})
        .unwrap();
    assert_eq!(fired.len(), 1, "30 minutes out is inside a 45 minute lead");
}

#[test]
#[serial]
fn test_default_lead_ignores_distant_task() {
    let _temp = setup_temp_home();

    let config = Config::load().unwrap();
    let mut store = open_store("default", &config).unwrap();
    add_due_in(&mut store, 30);

    let fired = store
        .check_reminders(Local::now().naive_local(), &|_: &Task| {})
        .unwrap();
    assert!(fired.is_empty());
}

#[test]
#[serial]
fn test_poll_interval_reaches_poller() {
    let _temp = setup_temp_home();

    let mut config = Config::default();
    config.reminder.poll_interval_secs = 7;
    save_config(&config).unwrap();

    let config = Config::load().unwrap();
    let store = open_store("default", &config).unwrap();
    let poller = ReminderPoller::new(store, Box::new(|_: &Task| {}))
        .with_period(config.reminder.poll_period());
    assert_eq!(poller.period(), std::time::Duration::from_secs(7));
}

#[test]
#[serial]
fn test_default_profile_from_config() {
    let _temp = setup_temp_home();

    let config = Config {
        default_profile: "work".to_string(),
        ..Default::default()
    };
    save_config(&config).unwrap();

    let config = Config::load().unwrap();
    let profile = config.profile_or_default(None);
    let mut store = open_store(&profile, &config).unwrap();
    add_due_in(&mut store, 60);

    assert_eq!(store.storage().profile(), "work");
    assert_eq!(list_profiles().unwrap(), vec!["work".to_string()]);
}
