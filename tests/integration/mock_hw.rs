//! Mock adapters for integration tests.
//!
//! Records every output call so tests can assert on the full strip and
//! buzzer history without touching real GPIO.

use depotwatch::app::events::AppEvent;
use depotwatch::app::ports::{
    AlarmOutputPort, ClimateReading, ClockPort, ConfigPort, EventSink, PresenceReading,
    SensorPort, TimeOfDay,
};
use depotwatch::config::ThresholdConfig;
use depotwatch::drivers::ws2812::{PixelBuffer, STRIP_LEN};
use depotwatch::error::{ClockError, ConfigError, SensorError};
use depotwatch::sensors::pms::ParticulateRecord;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pending: Option<ParticulateRecord>,
    last: ParticulateRecord,
    pub climate: Result<ClimateReading, SensorError>,
    pub presence: PresenceReading,
    pub frames: Vec<PixelBuffer<STRIP_LEN>>,
    pub buzzer: Vec<bool>,
}

#[allow(dead_code)]
impl MockHardware {
    /// Comfortable, empty, dark store.
    pub fn new() -> Self {
        Self {
            pending: None,
            last: ParticulateRecord::default(),
            climate: Ok(ClimateReading {
                temperature_c: 22,
                humidity_pct: 55,
            }),
            presence: PresenceReading::default(),
            frames: Vec::new(),
            buzzer: Vec::new(),
        }
    }

    /// Queue a particulate record for the next read.
    pub fn publish(&mut self, record: ParticulateRecord) {
        self.pending = Some(record);
    }

    pub fn last_frame(&self) -> Option<&PixelBuffer<STRIP_LEN>> {
        self.frames.last()
    }

    pub fn buzzer_on(&self) -> bool {
        self.buzzer.last().copied().unwrap_or(false)
    }

    pub fn buzzer_on_count(&self) -> usize {
        self.buzzer.iter().filter(|on| **on).count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_particulate(&mut self) -> ParticulateRecord {
        match self.pending.take() {
            Some(record) => {
                self.last = record;
                self.last.fresh = true;
            }
            None => self.last.fresh = false,
        }
        self.last
    }

    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.climate
    }

    fn read_presence(&mut self) -> PresenceReading {
        self.presence
    }
}

impl AlarmOutputPort for MockHardware {
    fn show(&mut self, frame: &PixelBuffer<STRIP_LEN>) {
        self.frames.push(*frame);
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.push(on);
    }
}

// ── Particulate records ───────────────────────────────────────

/// Clean air: PM2.5 12, low counts.
#[allow(dead_code)]
pub fn clean_air() -> ParticulateRecord {
    ParticulateRecord {
        pm2_5_std: 12,
        count_0_3: 900,
        count_2_5: 15,
        ..ParticulateRecord::default()
    }
}

/// Dense fine smoke that the forest isolates quickly.
#[allow(dead_code)]
pub fn smoke() -> ParticulateRecord {
    ParticulateRecord {
        pm2_5_std: 60,
        count_0_3: 5000,
        count_2_5: 300,
        ..ParticulateRecord::default()
    }
}

// ── MockStore ─────────────────────────────────────────────────

pub struct MockStore {
    pub stored: Result<ThresholdConfig, ConfigError>,
    pub fail_saves: bool,
    pub saves: usize,
}

#[allow(dead_code)]
impl MockStore {
    pub fn empty() -> Self {
        Self {
            stored: Err(ConfigError::NotFound),
            fail_saves: false,
            saves: 0,
        }
    }

    pub fn with(stored: Result<ThresholdConfig, ConfigError>) -> Self {
        Self {
            stored,
            ..Self::empty()
        }
    }
}

impl ConfigPort for MockStore {
    fn load(&self) -> Result<ThresholdConfig, ConfigError> {
        self.stored
    }

    fn save(&mut self, config: &ThresholdConfig) -> Result<(), ConfigError> {
        if self.fail_saves {
            return Err(ConfigError::Storage);
        }
        self.saves += 1;
        self.stored = Ok(*config);
        Ok(())
    }
}

// ── MockClock ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockClock {
    pub time: TimeOfDay,
}

impl ClockPort for MockClock {
    fn now(&self) -> TimeOfDay {
        self.time
    }

    fn set_time(&mut self, time: TimeOfDay) -> Result<(), ClockError> {
        self.time = time;
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
