//! Byte-level pipeline: UART bytes → decoders → mailboxes → service.
//!
//! Uses local mailboxes so these tests do not race the firmware-wide
//! statics exercised by unit tests.

use crate::mock_hw::{MockClock, MockHardware, MockStore, RecordingSink};

use depotwatch::alarm::SystemStatus;
use depotwatch::app::events::AppEvent;
use depotwatch::app::ports::ClimateReading;
use depotwatch::app::service::MonitorService;
use depotwatch::config::SystemConfig;
use depotwatch::mailbox::Mailbox;
use depotwatch::protocol::command::Command;
use depotwatch::protocol::link::{CommandLine, CommandLink, pump_console, take_command};
use depotwatch::sensors::pms::{FRAME_LEN, ParticulateLink, ParticulateRecord, PmsDecoder, seal_frame};

/// Build a sealed frame carrying the fields the service looks at.
fn frame(pm2_5: u16, count_0_3: u16, count_2_5: u16) -> [u8; FRAME_LEN] {
    let mut f = [0u8; FRAME_LEN];
    f[2..4].copy_from_slice(&28u16.to_be_bytes());
    f[6..8].copy_from_slice(&pm2_5.to_be_bytes());
    f[16..18].copy_from_slice(&count_0_3.to_be_bytes());
    f[22..24].copy_from_slice(&count_2_5.to_be_bytes());
    seal_frame(&mut f);
    f
}

fn feed_pms(decoder: &mut PmsDecoder, mailbox: &Mailbox<ParticulateRecord>, bytes: &[u8]) {
    for &b in bytes {
        if let Some(record) = decoder.feed(b) {
            mailbox.publish(record);
        }
    }
}

fn feed_console(link: &mut CommandLink, mailbox: &Mailbox<CommandLine>, bytes: &[u8]) {
    for &b in bytes {
        if let Some(line) = link.feed(b) {
            mailbox.publish(line);
        }
    }
}

#[test]
fn smoke_frame_from_the_wire_raises_fire_alert() {
    let mailbox = Mailbox::new();
    let mut decoder = PmsDecoder::new();
    let mut link = ParticulateLink::new(&mailbox);

    // Line noise, then a valid frame.
    let mut bytes = vec![0x00, 0x42, 0x00, 0xFF];
    bytes.extend_from_slice(&frame(60, 5000, 300));
    feed_pms(&mut decoder, &mailbox, &bytes);

    let record = link.read();
    assert!(record.fresh);
    assert_eq!(record.pm2_5_std, 60);
    assert_eq!(record.count_0_3, 5000);
    assert!(!link.read().fresh);

    let mut svc = MonitorService::new(SystemConfig::default());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    svc.start(&MockStore::empty(), &mut sink);
    hw.climate = Ok(ClimateReading {
        temperature_c: 30,
        humidity_pct: 50,
    });
    hw.publish(record);
    svc.tick(&mut hw, &mut sink);

    assert_eq!(svc.status(), SystemStatus::FireAlert);
}

#[test]
fn corrupted_frame_never_reaches_the_service() {
    let mailbox = Mailbox::new();
    let mut decoder = PmsDecoder::new();

    let mut bad = frame(60, 5000, 300);
    bad[FRAME_LEN - 1] ^= 0x01;
    feed_pms(&mut decoder, &mailbox, &bad);
    assert!(mailbox.take().is_none());

    // The decoder is back in sync for the next frame.
    feed_pms(&mut decoder, &mailbox, &frame(12, 900, 15));
    assert_eq!(mailbox.take().map(|r| r.pm2_5_std), Some(12));
}

#[test]
fn newest_frame_wins_when_consumer_is_slow() {
    let mailbox = Mailbox::new();
    let mut decoder = PmsDecoder::new();
    let mut link = ParticulateLink::new(&mailbox);

    feed_pms(&mut decoder, &mailbox, &frame(10, 900, 15));
    feed_pms(&mut decoder, &mailbox, &frame(20, 900, 15));

    assert_eq!(link.read().pm2_5_std, 20);
    let again = link.read();
    assert!(!again.fresh);
    assert_eq!(again.pm2_5_std, 20);
}

#[test]
fn console_line_becomes_applied_command() {
    let mailbox = Mailbox::new();
    let mut link = CommandLink::new();
    let mut svc = MonitorService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    let mut clock = MockClock::default();

    // An abandoned line, then a complete one.
    feed_console(&mut link, &mailbox, b"$THH:4$PMH:150!\r\n");
    let cmd = take_command(&mailbox).unwrap();
    assert_eq!(cmd, Command::SetPm25High(150));

    svc.handle_command(cmd, &mut clock, &mut sink).unwrap();
    assert_eq!(svc.thresholds().pm25_high, 150);
    assert!(sink.events.contains(&AppEvent::CommandApplied(cmd)));
}

#[test]
fn malformed_console_line_is_dropped() {
    let mailbox = Mailbox::new();
    let mut link = CommandLink::new();

    feed_console(&mut link, &mailbox, b"$XYZ:1!");
    assert!(take_command(&mailbox).is_none());
    assert!(mailbox.take().is_none());
}

#[test]
fn temp_high_must_stay_above_temp_low() {
    let mailbox = Mailbox::new();
    let mut link = CommandLink::new();
    let mut svc = MonitorService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    let mut clock = MockClock::default();

    feed_console(&mut link, &mailbox, b"$THH:50!");
    let cmd = take_command(&mailbox).unwrap();
    assert!(svc.handle_command(cmd, &mut clock, &mut sink).is_ok());
    assert_eq!(svc.thresholds().temp_high, 50);

    feed_console(&mut link, &mailbox, b"$THH:5!");
    let cmd = take_command(&mailbox).unwrap();
    assert!(svc.handle_command(cmd, &mut clock, &mut sink).is_err());
    assert_eq!(svc.thresholds().temp_high, 50);
}

#[test]
fn two_lines_in_one_read_are_both_applied() {
    let mailbox = Mailbox::new();
    let mut link = CommandLink::new();
    let mut svc = MonitorService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    let mut clock = MockClock::default();

    // Both lines arrive within one control tick.
    pump_console(&mut link, &mailbox, b"$THH:50!$TLL:20!", |cmd| {
        svc.handle_command(cmd, &mut clock, &mut sink).unwrap();
    });

    assert_eq!(svc.thresholds().temp_high, 50);
    assert_eq!(svc.thresholds().temp_low, 20);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CommandApplied(_))), 2);
}
