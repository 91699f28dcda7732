//! Integration tests for the MonitorService → arbitration → outputs pipeline.
//!
//! These run on the host (x86_64) and drive the service tick by tick
//! against mock adapters, asserting on the strip frames, buzzer levels
//! and emitted events.

use crate::mock_hw::{MockClock, MockHardware, MockStore, RecordingSink, clean_air, smoke};

use depotwatch::alarm::SystemStatus;
use depotwatch::alarm::pattern::{
    EDIT_CYAN, EMERGENCY_WHITE, FIRE_RED, INTRUSION_PURPLE, NORMAL_GREEN, TEMP_YELLOW,
};
use depotwatch::app::events::{AppEvent, Subsystem};
use depotwatch::app::ports::{ClimateReading, PresenceReading, TimeOfDay};
use depotwatch::app::service::{KeyAction, MonitorService};
use depotwatch::config::{LightMode, SettingParam, SystemConfig, ThresholdConfig};
use depotwatch::error::{ClockError, ConfigError, Error, SensorError};
use depotwatch::protocol::command::Command;
use depotwatch::protocol::telemetry::FaultCode;
use depotwatch::sensors::pms::ParticulateRecord;

fn make_service() -> (MonitorService, MockHardware, RecordingSink) {
    let mut svc = MonitorService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    svc.start(&MockStore::empty(), &mut sink);
    (svc, MockHardware::new(), sink)
}

/// Run `n` ticks with a fresh copy of `record` arriving before each one.
fn run_fed(svc: &mut MonitorService, hw: &mut MockHardware, sink: &mut RecordingSink, record: ParticulateRecord, n: usize) {
    for _ in 0..n {
        hw.publish(record);
        svc.tick(hw, sink);
    }
}

/// Run `n` ticks with no new particulate frame.
fn run_starved(svc: &mut MonitorService, hw: &mut MockHardware, sink: &mut RecordingSink, n: usize) {
    for _ in 0..n {
        svc.tick(hw, sink);
    }
}

fn all_pixels(hw: &MockHardware, colour: (u8, u8, u8)) -> bool {
    hw.last_frame().is_some_and(|f| f.pixels().iter().all(|&p| p == colour))
}

// ── Normal operation ──────────────────────────────────────────

#[test]
fn clean_air_stays_normal_and_green() {
    let (mut svc, mut hw, mut sink) = make_service();
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 20);

    assert_eq!(svc.status(), SystemStatus::Normal);
    assert!(all_pixels(&hw, NORMAL_GREEN));
    assert_eq!(hw.buzzer_on_count(), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::StatusChanged { .. })), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 2);
}

#[test]
fn every_tick_drives_strip_and_buzzer_once() {
    let (mut svc, mut hw, mut sink) = make_service();
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 7);
    assert_eq!(hw.frames.len(), 7);
    assert_eq!(hw.buzzer.len(), 7);
    assert_eq!(svc.tick_count(), 7);
}

#[test]
fn telemetry_snapshot_carries_readings() {
    let (mut svc, mut hw, mut sink) = make_service();
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 10);

    let Some(AppEvent::Telemetry(t)) = sink.events.iter().rev().find(|e| matches!(e, AppEvent::Telemetry(_)))
    else {
        panic!("no telemetry emitted");
    };
    assert_eq!(t.temperature_c, 22);
    assert_eq!(t.humidity_pct, 55);
    assert_eq!(t.pm2_5, 12);
    assert_eq!(t.fault, FaultCode::None);
    assert_eq!(t.thresholds, ThresholdConfig::default());
}

// ── Fire risk ─────────────────────────────────────────────────

#[test]
fn smoke_raises_fire_alert_with_red_flash_and_buzzer() {
    let (mut svc, mut hw, mut sink) = make_service();
    hw.climate = Ok(ClimateReading {
        temperature_c: 30,
        humidity_pct: 50,
    });
    run_fed(&mut svc, &mut hw, &mut sink, smoke(), 1);

    assert!(svc.fire_risk());
    assert_eq!(svc.status(), SystemStatus::FireAlert);
    assert!(all_pixels(&hw, FIRE_RED));
    assert!(hw.buzzer_on());
    assert!(sink.events.contains(&AppEvent::StatusChanged {
        from: SystemStatus::Normal,
        to: SystemStatus::FireAlert,
    }));
}

#[test]
fn sound_budget_ends_after_49_ticks_but_flash_continues() {
    let (mut svc, mut hw, mut sink) = make_service();
    run_fed(&mut svc, &mut hw, &mut sink, smoke(), 80);

    assert_eq!(hw.buzzer_on_count(), 49);
    assert!(hw.buzzer[..49].iter().all(|on| *on));
    assert!(!hw.buzzer_on());
    assert!(all_pixels(&hw, FIRE_RED));
    assert_eq!(svc.status(), SystemStatus::FireAlert);
}

#[test]
fn mute_silences_buzzer_only() {
    let (mut svc, mut hw, mut sink) = make_service();
    let mut clock = MockClock::default();
    svc.handle_command(Command::SetMute(true), &mut clock, &mut sink).unwrap();
    run_fed(&mut svc, &mut hw, &mut sink, smoke(), 10);

    assert_eq!(hw.buzzer_on_count(), 0);
    assert!(all_pixels(&hw, FIRE_RED));
    assert!(svc.modes().silent);
}

#[test]
fn verdict_is_latched_between_scheduled_inferences() {
    let (mut svc, mut hw, mut sink) = make_service();
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);
    assert!(!svc.fire_risk());

    // Hot and dry, but no new particulate frame: waits for the next
    // scheduled inference on tick 5.
    hw.climate = Ok(ClimateReading {
        temperature_c: 60,
        humidity_pct: 10,
    });
    run_starved(&mut svc, &mut hw, &mut sink, 3);
    assert!(!svc.fire_risk());
    assert_eq!(svc.status(), SystemStatus::EnvWarning);

    run_starved(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(svc.tick_count(), 5);
    assert!(svc.fire_risk());
    assert_eq!(svc.status(), SystemStatus::FireAlert);
}

// ── Staleness ─────────────────────────────────────────────────

#[test]
fn silent_particulate_sensor_faults_after_limit() {
    let (mut svc, mut hw, mut sink) = make_service();
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);
    run_starved(&mut svc, &mut hw, &mut sink, 30);
    assert!(!svc.is_faulted(Subsystem::Particulate));

    run_starved(&mut svc, &mut hw, &mut sink, 1);
    assert!(svc.is_faulted(Subsystem::Particulate));
    assert_eq!(svc.status(), SystemStatus::EnvWarning);
    assert_eq!(svc.build_telemetry().fault, FaultCode::Particulate);

    run_starved(&mut svc, &mut hw, &mut sink, 20);
    assert_eq!(sink.count(|e| *e == AppEvent::FaultRaised(Subsystem::Particulate)), 1);

    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);
    assert!(!svc.is_faulted(Subsystem::Particulate));
    assert_eq!(svc.status(), SystemStatus::Normal);
    assert_eq!(sink.count(|e| *e == AppEvent::FaultCleared(Subsystem::Particulate)), 1);
}

#[test]
fn particulate_fault_masks_fire_and_keeps_idle_look() {
    let (mut svc, mut hw, mut sink) = make_service();
    run_fed(&mut svc, &mut hw, &mut sink, smoke(), 1);
    assert!(svc.fire_risk());

    run_starved(&mut svc, &mut hw, &mut sink, 31);
    assert!(svc.is_faulted(Subsystem::Particulate));
    assert!(!svc.fire_risk());
    assert_eq!(svc.status(), SystemStatus::EnvWarning);
    assert!(all_pixels(&hw, NORMAL_GREEN));
    assert!(!hw.buzzer_on());
}

#[test]
fn failing_climate_sensor_faults_and_keeps_last_values() {
    let (mut svc, mut hw, mut sink) = make_service();
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);

    hw.climate = Err(SensorError::ReadFailed);
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 30);
    assert!(!svc.is_faulted(Subsystem::Climate));

    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);
    assert!(svc.is_faulted(Subsystem::Climate));
    let t = svc.build_telemetry();
    assert_eq!(t.fault, FaultCode::Climate);
    assert_eq!(t.temperature_c, 22);
    assert_eq!(sink.count(|e| *e == AppEvent::FaultRaised(Subsystem::Climate)), 1);
}

#[test]
fn climate_fault_outranks_particulate_in_report() {
    let (mut svc, mut hw, mut sink) = make_service();
    hw.climate = Err(SensorError::ReadFailed);
    run_starved(&mut svc, &mut hw, &mut sink, 40);
    assert!(svc.is_faulted(Subsystem::Climate));
    assert!(svc.is_faulted(Subsystem::Particulate));
    assert_eq!(svc.build_telemetry().fault, FaultCode::Climate);
}

// ── Intrusion and thresholds ──────────────────────────────────

#[test]
fn close_object_is_intrusion() {
    let (mut svc, mut hw, mut sink) = make_service();
    hw.presence = PresenceReading {
        distance_mm: 300,
        light_pct: 0,
    };
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 5);

    assert_eq!(svc.status(), SystemStatus::Intrusion);
    // Tick 5 is a lit tick of the 5-tick purple flash.
    assert!(all_pixels(&hw, INTRUSION_PURPLE));
    assert!(hw.buzzer_on());
    assert!(hw.frames[0].is_dark());
}

#[test]
fn bright_light_is_intrusion_but_distance_limit_is_exclusive() {
    let (mut svc, mut hw, mut sink) = make_service();
    hw.presence = PresenceReading {
        distance_mm: 500,
        light_pct: 90,
    };
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);
    assert_eq!(svc.status(), SystemStatus::Normal);

    hw.presence.light_pct = 91;
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);
    assert_eq!(svc.status(), SystemStatus::Intrusion);
}

#[test]
fn hot_store_is_env_warning_with_yellow_flash() {
    let (mut svc, mut hw, mut sink) = make_service();
    hw.climate = Ok(ClimateReading {
        temperature_c: 31,
        humidity_pct: 55,
    });
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 5);
    assert_eq!(svc.status(), SystemStatus::EnvWarning);
    assert!(all_pixels(&hw, TEMP_YELLOW));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn threshold_command_applies_and_marks_dirty() {
    let (mut svc, _hw, mut sink) = make_service();
    let mut clock = MockClock::default();

    svc.handle_command(Command::SetTempHigh(45), &mut clock, &mut sink).unwrap();
    assert_eq!(svc.thresholds().temp_high, 45);
    assert!(svc.is_config_dirty());
    assert!(sink.events.contains(&AppEvent::CommandApplied(Command::SetTempHigh(45))));
}

#[test]
fn out_of_range_command_is_rejected_without_change() {
    let (mut svc, _hw, mut sink) = make_service();
    let mut clock = MockClock::default();

    let err = svc.handle_command(Command::SetTempHigh(99), &mut clock, &mut sink).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::OutOfRange(_))));
    assert_eq!(svc.thresholds(), ThresholdConfig::default());
    assert!(!svc.is_config_dirty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CommandRejected(..))), 1);

    // Too large for any threshold.
    assert!(svc.handle_command(Command::SetPm25High(70_000), &mut clock, &mut sink).is_err());
    assert_eq!(svc.thresholds().pm25_high, 75);

    // Would invert the pair.
    assert!(svc.handle_command(Command::SetHumiLow(80), &mut clock, &mut sink).is_err());
    assert_eq!(svc.thresholds().humi_low, 40);
}

#[test]
fn clock_command_sets_time_or_rejects() {
    let (mut svc, _hw, mut sink) = make_service();
    let mut clock = MockClock::default();

    let bad = Command::SetClock {
        hour: 24,
        minute: 0,
        second: 0,
    };
    assert_eq!(
        svc.handle_command(bad, &mut clock, &mut sink),
        Err(Error::Clock(ClockError::InvalidTime))
    );
    assert_eq!(clock.time, TimeOfDay::default());

    let good = Command::SetClock {
        hour: 13,
        minute: 45,
        second: 30,
    };
    svc.handle_command(good, &mut clock, &mut sink).unwrap();
    assert_eq!(clock.time, TimeOfDay::new(13, 45, 30).unwrap());
    assert!(!svc.is_config_dirty());
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn changes_are_saved_after_quiet_period() {
    let (mut svc, mut hw, mut sink) = make_service();
    let mut store = MockStore::empty();
    let mut clock = MockClock::default();

    svc.handle_command(Command::SetPm25High(150), &mut clock, &mut sink).unwrap();
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 49);
    assert!(!svc.persist_if_dirty(&mut store, &mut sink));

    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);
    assert!(svc.persist_if_dirty(&mut store, &mut sink));
    assert_eq!(store.saves, 1);
    assert_eq!(store.stored.map(|c| c.pm25_high), Ok(150));
    assert!(!svc.is_config_dirty());

    // Nothing left to save.
    assert!(!svc.persist_if_dirty(&mut store, &mut sink));
}

#[test]
fn force_persist_skips_quiet_period() {
    let (mut svc, _hw, mut sink) = make_service();
    let mut store = MockStore::empty();
    let mut clock = MockClock::default();

    assert!(!svc.force_persist_if_dirty(&mut store, &mut sink));
    svc.handle_command(Command::SetHumiHigh(90), &mut clock, &mut sink).unwrap();
    assert!(svc.force_persist_if_dirty(&mut store, &mut sink));
    assert_eq!(store.saves, 1);
}

#[test]
fn failed_save_raises_storage_fault_until_a_save_succeeds() {
    let (mut svc, mut hw, mut sink) = make_service();
    let mut store = MockStore::empty();
    store.fail_saves = true;
    let mut clock = MockClock::default();

    svc.handle_command(Command::SetTempLow(5), &mut clock, &mut sink).unwrap();
    assert!(!svc.force_persist_if_dirty(&mut store, &mut sink));
    assert!(svc.is_faulted(Subsystem::Storage));
    assert!(svc.is_config_dirty());
    assert_eq!(svc.build_telemetry().fault, FaultCode::Storage);

    // Storage faults do not change the alarm picture.
    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 3);
    assert_eq!(svc.status(), SystemStatus::Normal);

    store.fail_saves = false;
    assert!(svc.force_persist_if_dirty(&mut store, &mut sink));
    assert!(!svc.is_faulted(Subsystem::Storage));
    assert_eq!(sink.count(|e| *e == AppEvent::FaultRaised(Subsystem::Storage)), 1);
    assert_eq!(sink.count(|e| *e == AppEvent::FaultCleared(Subsystem::Storage)), 1);
}

#[test]
fn start_uses_stored_thresholds() {
    let stored = ThresholdConfig {
        temp_high: 40,
        ..ThresholdConfig::default()
    };
    let mut svc = MonitorService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    svc.start(&MockStore::with(Ok(stored)), &mut sink);

    assert_eq!(svc.thresholds(), stored);
    assert!(!svc.is_config_dirty());
    assert_eq!(sink.events.first(), Some(&AppEvent::Started(stored)));
}

#[test]
fn corrupted_store_restores_defaults_and_rewrites() {
    let mut svc = MonitorService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    svc.start(&MockStore::with(Err(ConfigError::Corrupted)), &mut sink);

    assert_eq!(svc.thresholds(), ThresholdConfig::default());
    assert!(svc.is_config_dirty());
    assert!(!svc.is_faulted(Subsystem::Storage));
}

#[test]
fn unreadable_store_is_a_storage_fault() {
    let mut svc = MonitorService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    svc.start(&MockStore::with(Err(ConfigError::Storage)), &mut sink);

    assert_eq!(svc.thresholds(), ThresholdConfig::default());
    assert!(svc.is_faulted(Subsystem::Storage));
    assert_eq!(svc.build_telemetry().fault, FaultCode::Storage);
}

// ── Keys and light modes ──────────────────────────────────────

#[test]
fn edit_mode_shows_cyan_chase_and_steps_thresholds() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.handle_key(KeyAction::Select, &mut sink);
    svc.handle_key(KeyAction::Select, &mut sink);
    assert_eq!(svc.modes().editing, Some(SettingParam::TempLow));

    svc.handle_key(KeyAction::Down, &mut sink);
    assert_eq!(svc.thresholds().temp_low, 9);
    assert!(svc.is_config_dirty());

    run_fed(&mut svc, &mut hw, &mut sink, smoke(), 2);
    let frame = hw.last_frame().unwrap();
    assert_eq!(frame.pixels().iter().filter(|&&p| p == EDIT_CYAN).count(), 1);
    assert_eq!(frame.pixels().iter().filter(|&&p| p == (0, 0, 0)).count(), frame.pixels().len() - 1);
    // The alarm still sounds under the edit overlay.
    assert_eq!(svc.status(), SystemStatus::FireAlert);
}

#[test]
fn emergency_light_overrides_alarm_pattern() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.handle_key(KeyAction::Up, &mut sink);
    assert_eq!(svc.modes().light, LightMode::Emergency);

    run_fed(&mut svc, &mut hw, &mut sink, smoke(), 3);
    assert!(all_pixels(&hw, EMERGENCY_WHITE));
    assert_eq!(svc.status(), SystemStatus::FireAlert);
    // Solid light is not an alarm flash: the buzzer stays off.
    assert_eq!(hw.buzzer_on_count(), 0);
}

#[test]
fn off_mode_darkens_idle_strip() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.handle_key(KeyAction::Up, &mut sink);
    svc.handle_key(KeyAction::Up, &mut sink);
    assert_eq!(svc.modes().light, LightMode::Off);

    run_fed(&mut svc, &mut hw, &mut sink, clean_air(), 1);
    assert!(hw.last_frame().unwrap().is_dark());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ModesChanged(_))), 2);
}
