//! Application service — the hexagonal core.
//!
//! [`MonitorService`] owns the thresholds, operator modes, staleness
//! monitors and the alarm arbitrator.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!     SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                    │      MonitorService      │
//! AlarmOutputPort ◀──│ staleness · forest · arb │ ◀── Command / KeyAction
//!                    └──────────────────────────┘
//!                         ▲              │
//!                    ClockPort       ConfigPort
//! ```

use log::{debug, info, warn};

use crate::alarm::{AlarmInputs, Arbitration, Arbitrator, SystemStatus};
use crate::anomaly::FIRE_FOREST;
use crate::anomaly::tree::Features;
use crate::config::{OperatorModes, SettingParam, Step, SystemConfig, ThresholdConfig};
use crate::drivers::ws2812::{PixelBuffer, STRIP_LEN};
use crate::error::{ConfigError, Result};
use crate::protocol::command::Command;
use crate::protocol::telemetry::FaultCode;
use crate::sensors::pms::ParticulateRecord;
use crate::sensors::staleness::StalenessMonitor;

use super::events::{AppEvent, Subsystem, TelemetryData};
use super::ports::{
    AlarmOutputPort, ClimateReading, ClockPort, ConfigPort, EventSink, PresenceReading, SensorPort,
    TimeOfDay,
};

/// Debounced front-panel key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Enter edit mode / move to the next threshold / leave edit mode.
    Select,
    /// Raise the selected threshold, or cycle the light mode.
    Up,
    /// Lower the selected threshold, or toggle mute.
    Down,
}

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    config: SystemConfig,
    thresholds: ThresholdConfig,
    modes: OperatorModes,
    arbitrator: Arbitrator,
    particulate_watch: StalenessMonitor,
    climate_watch: StalenessMonitor,
    storage_fault: bool,
    /// Last record seen; `fresh` reflects the current tick.
    particulate: ParticulateRecord,
    /// Last good climate reading.
    climate: ClimateReading,
    presence: PresenceReading,
    /// Latched verdict from the most recent inference.
    fire: bool,
    status: SystemStatus,
    arbitration: Option<Arbitration>,
    frame: PixelBuffer<STRIP_LEN>,
    tick_count: u32,
    config_dirty: bool,
    dirty_since_tick: u32,
}

impl MonitorService {
    /// Construct the service with default thresholds.
    ///
    /// Call [`start`](Self::start) next to load the stored thresholds.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            arbitrator: Arbitrator::new(config.sound_budget_ticks),
            particulate_watch: StalenessMonitor::new("particulate sensor", config.staleness_limit_ticks),
            climate_watch: StalenessMonitor::new("climate sensor", config.staleness_limit_ticks),
            config,
            thresholds: ThresholdConfig::default(),
            modes: OperatorModes::default(),
            storage_fault: false,
            particulate: ParticulateRecord::default(),
            climate: ClimateReading::default(),
            presence: PresenceReading::default(),
            fire: false,
            status: SystemStatus::Normal,
            arbitration: None,
            frame: PixelBuffer::new(),
            tick_count: 0,
            config_dirty: false,
            dirty_since_tick: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load stored thresholds and announce the start.
    ///
    /// A missing blob means first boot; a corrupted one is replaced by
    /// defaults and rewritten on the next persist.
    pub fn start(&mut self, storage: &impl ConfigPort, sink: &mut impl EventSink) {
        match storage.load() {
            Ok(stored) => {
                self.thresholds = stored;
                info!("Thresholds loaded from storage");
            }
            Err(ConfigError::NotFound) => {
                info!("No stored thresholds, using defaults");
            }
            Err(ConfigError::Corrupted) => {
                warn!("Stored thresholds corrupted, restoring defaults");
                self.mark_config_dirty();
            }
            Err(e) => {
                warn!("Threshold load failed: {e}");
                self.set_storage_fault(true, sink);
            }
        }
        sink.emit(&AppEvent::Started(self.thresholds));
        info!("MonitorService started with {:?}", self.thresholds);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: sensors → staleness → inference →
    /// thresholds → arbitration → strip and buzzer → events.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`AlarmOutputPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(&mut self, hw: &mut (impl SensorPort + AlarmOutputPort), sink: &mut impl EventSink) {
        self.tick_count = self.tick_count.wrapping_add(1);
        let tick = self.tick_count;

        // 1. Particulate sensor heartbeat
        self.particulate = hw.read_particulate();
        let was_faulted = self.particulate_watch.is_faulted();
        let particulate_fault = self.particulate_watch.observe(self.particulate.fresh);
        emit_fault_edge(Subsystem::Particulate, was_faulted, particulate_fault, sink);

        // 2. Climate sensor; a failed read keeps the previous values
        let climate_ok = match hw.read_climate() {
            Ok(reading) => {
                self.climate = reading;
                true
            }
            Err(e) => {
                debug!("Climate read: {e}");
                false
            }
        };
        let was_faulted = self.climate_watch.is_faulted();
        let climate_fault = self.climate_watch.observe(climate_ok);
        emit_fault_edge(Subsystem::Climate, was_faulted, climate_fault, sink);

        // 3. Intrusion
        self.presence = hw.read_presence();
        let intrusion = self.presence.distance_mm < self.config.intrusion_distance_mm
            || self.presence.light_pct > self.config.intrusion_light_percent;

        // 4. Fire-risk inference, only on a healthy particulate feed
        if particulate_fault {
            self.fire = false;
        } else if self.particulate.fresh || tick % self.config.inference_interval_ticks.max(1) == 0 {
            let verdict = FIRE_FOREST.predict(&self.features());
            if verdict.is_anomaly() != self.fire {
                info!("Fire-risk verdict: {:?} (mean path {:.2})", verdict.classification, verdict.mean_path);
            }
            self.fire = verdict.is_anomaly();
        }

        // 5. Threshold comparison
        let breaches = self.thresholds.evaluate(
            self.climate.temperature_c,
            self.climate.humidity_pct,
            self.particulate.pm2_5_std,
        );

        // 6. Arbitration
        let inputs = AlarmInputs {
            fire: self.fire,
            intrusion,
            pm_over: breaches.particulate,
            temp_out: breaches.temperature,
            humi_out: breaches.humidity,
            particulate_fault,
            climate_fault,
        }
        .masked();
        let arbitration = self.arbitrator.update(&inputs, &self.modes, tick);

        // 7. Outputs
        arbitration.pattern.render(tick, &mut self.frame);
        hw.show(&self.frame);
        hw.set_buzzer(arbitration.buzzer_on(tick));

        // 8. Events
        if arbitration.status != self.status {
            if arbitration.status == SystemStatus::Normal {
                info!("Status {} -> {}", self.status, arbitration.status);
            } else {
                warn!("Status {} -> {}", self.status, arbitration.status);
            }
            sink.emit(&AppEvent::StatusChanged {
                from: self.status,
                to: arbitration.status,
            });
            self.status = arbitration.status;
        }
        self.arbitration = Some(arbitration);

        if tick % self.config.telemetry_interval_ticks.max(1) == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a parsed remote command.
    ///
    /// Rejections leave every setting untouched and are reported through
    /// the sink as well as the return value.
    pub fn handle_command(
        &mut self,
        cmd: Command,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match self.apply_command(cmd, clock) {
            Ok(()) => {
                info!("Command applied: {cmd:?}");
                sink.emit(&AppEvent::CommandApplied(cmd));
                Ok(())
            }
            Err(e) => {
                warn!("Command rejected: {cmd:?}: {e}");
                sink.emit(&AppEvent::CommandRejected(cmd, e));
                Err(e)
            }
        }
    }

    fn apply_command(&mut self, cmd: Command, clock: &mut impl ClockPort) -> Result<()> {
        if let Some((param, value)) = cmd.threshold() {
            // Anything past u16 is past every cap and fails the range check.
            let value = u16::try_from(value).unwrap_or(u16::MAX);
            self.thresholds.apply(param, value)?;
            self.mark_config_dirty();
            return Ok(());
        }
        match cmd {
            Command::SetClock { hour, minute, second } => {
                clock.set_time(TimeOfDay::new(hour, minute, second)?)?;
            }
            Command::SetMute(silent) => self.modes.silent = silent,
            _ => {}
        }
        Ok(())
    }

    /// Process one front-panel key press.
    pub fn handle_key(&mut self, key: KeyAction, sink: &mut impl EventSink) {
        let before = self.modes;
        match (key, self.modes.editing) {
            (KeyAction::Select, None) => self.modes.editing = Some(SettingParam::FIRST),
            (KeyAction::Select, Some(param)) => self.modes.editing = param.next(),
            (KeyAction::Up, Some(param)) => self.step_threshold(param, Step::Up),
            (KeyAction::Down, Some(param)) => self.step_threshold(param, Step::Down),
            (KeyAction::Up, None) => self.modes.light = self.modes.light.next(),
            (KeyAction::Down, None) => self.modes.silent = !self.modes.silent,
        }
        if self.modes != before {
            debug!("Operator modes now {:?}", self.modes);
            sink.emit(&AppEvent::ModesChanged(self.modes));
        }
    }

    fn step_threshold(&mut self, param: SettingParam, step: Step) {
        if self.thresholds.step(param, step) {
            debug!("{} -> {}", param.name(), self.thresholds.get(param));
            self.mark_config_dirty();
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current readings.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            status: self.status,
            temperature_c: self.climate.temperature_c,
            humidity_pct: self.climate.humidity_pct,
            pm2_5: self.particulate.pm2_5_std,
            count_0_3: self.particulate.count_0_3,
            count_2_5: self.particulate.count_2_5,
            fault: FaultCode::from_flags(
                self.climate_watch.is_faulted(),
                self.particulate_watch.is_faulted(),
                self.storage_fault,
            ),
            thresholds: self.thresholds,
        }
    }

    /// Current arbitrated status.
    pub fn status(&self) -> SystemStatus {
        self.status
    }

    /// Output of the most recent tick (`None` before the first tick).
    pub fn last_arbitration(&self) -> Option<Arbitration> {
        self.arbitration
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        self.thresholds
    }

    pub fn modes(&self) -> OperatorModes {
        self.modes
    }

    /// Frame most recently sent to the strip.
    pub fn frame(&self) -> &PixelBuffer<STRIP_LEN> {
        &self.frame
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    /// Latched fire-risk verdict.
    pub fn fire_risk(&self) -> bool {
        self.fire
    }

    pub fn is_faulted(&self, subsystem: Subsystem) -> bool {
        match subsystem {
            Subsystem::Particulate => self.particulate_watch.is_faulted(),
            Subsystem::Climate => self.climate_watch.is_faulted(),
            Subsystem::Storage => self.storage_fault,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn features(&self) -> Features {
        [
            f32::from(self.climate.temperature_c),
            f32::from(self.climate.humidity_pct),
            f32::from(self.particulate.count_0_3),
            f32::from(self.particulate.count_2_5),
        ]
    }

    fn set_storage_fault(&mut self, faulted: bool, sink: &mut impl EventSink) {
        if faulted == self.storage_fault {
            return;
        }
        self.storage_fault = faulted;
        emit_fault_edge(Subsystem::Storage, !faulted, faulted, sink);
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the thresholds as modified.  Restarts the quiet period.
    pub fn mark_config_dirty(&mut self) {
        self.config_dirty = true;
        self.dirty_since_tick = self.tick_count;
    }

    /// Save once the thresholds have been left alone for
    /// `persist_delay_ticks`.  Returns `true` if they were saved.
    pub fn persist_if_dirty(&mut self, storage: &mut impl ConfigPort, sink: &mut impl EventSink) -> bool {
        if !self.config_dirty {
            return false;
        }
        let quiet_ticks = self.tick_count.wrapping_sub(self.dirty_since_tick);
        if quiet_ticks < self.config.persist_delay_ticks {
            return false;
        }
        self.save(storage, sink)
    }

    /// Save immediately if dirty (call before a planned restart).
    pub fn force_persist_if_dirty(&mut self, storage: &mut impl ConfigPort, sink: &mut impl EventSink) -> bool {
        self.config_dirty && self.save(storage, sink)
    }

    fn save(&mut self, storage: &mut impl ConfigPort, sink: &mut impl EventSink) -> bool {
        match storage.save(&self.thresholds) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Thresholds saved");
                self.set_storage_fault(false, sink);
                true
            }
            Err(e) => {
                warn!("Threshold save failed: {e}");
                // Retry after another quiet period.
                self.dirty_since_tick = self.tick_count;
                self.set_storage_fault(true, sink);
                false
            }
        }
    }

    /// Whether the thresholds have unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}

fn emit_fault_edge(subsystem: Subsystem, was: bool, now: bool, sink: &mut impl EventSink) {
    match (was, now) {
        (false, true) => sink.emit(&AppEvent::FaultRaised(subsystem)),
        (true, false) => sink.emit(&AppEvent::FaultCleared(subsystem)),
        _ => {}
    }
}
