//! Reading uplink
//!
//! Readings are collected into a small key/value payload stamped with a team
//! tag and handed to an [`Uplink`] at most once per
//! [`UPLINK_INTERVAL_MS`]. Delivery is best effort: a failed send is logged
//! and the acquisition loop carries on.

use heapless::{String, Vec};

use crate::acquisition::refresh::RefreshState;
use crate::config::UPLINK_INTERVAL_MS;
use crate::port::DeviceKind;
use crate::types::Reading;

/// Longest team tag
pub const TEAM_CAPACITY: usize = 16;

/// Most fields one payload carries
pub const MAX_FIELDS: usize = 8;

/// One named value
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Field {
    /// Field name on the dashboard
    pub key: &'static str,
    /// Value
    pub value: f32,
}

/// Tagged key/value bundle delivered to the dashboard.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload {
    team: String<TEAM_CAPACITY>,
    fields: Vec<Field, MAX_FIELDS>,
}

impl Payload {
    /// Empty payload for `team`. Tags longer than [`TEAM_CAPACITY`] are
    /// truncated.
    #[must_use]
    pub fn new(team: &str) -> Self {
        let mut tag = String::new();
        for c in team.chars() {
            if tag.push(c).is_err() {
                break;
            }
        }
        Self {
            team: tag,
            fields: Vec::new(),
        }
    }

    /// Team tag
    #[must_use]
    pub fn team(&self) -> &str {
        &self.team
    }

    /// Fields in insertion order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Value of `key`, if set
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f32> {
        self.fields.iter().find(|f| f.key == key).map(|f| f.value)
    }

    /// Set `key`, replacing an existing value. Returns `false` when the
    /// payload is full and `key` is new.
    pub fn insert(&mut self, key: &'static str, value: f32) -> bool {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.value = value;
            return true;
        }
        self.fields.push(Field { key, value }).is_ok()
    }

    /// Record a reading from a device of `kind` under its dashboard names
    #[allow(clippy::cast_precision_loss)]
    pub fn record(&mut self, kind: DeviceKind, reading: &Reading) {
        match *reading {
            Reading::TempHumidity {
                fahrenheit,
                humidity,
            } => {
                self.insert("temperature", fahrenheit);
                self.insert("humidity", humidity);
            }
            Reading::Lux(lux) => {
                self.insert("lux", lux as f32);
            }
            Reading::Co2 {
                ppm,
                fahrenheit,
                humidity,
            } => {
                self.insert("co2", ppm);
                self.insert("temperature", fahrenheit);
                self.insert("humidity", humidity);
            }
            Reading::Distance(d) => {
                self.insert("distance", d.value);
            }
            Reading::RawAnalog(raw) => {
                let key = match kind {
                    DeviceKind::WaterSensorAnalog => "water",
                    DeviceKind::SoundSensor => "sound",
                    _ => "soil",
                };
                self.insert(key, f32::from(raw));
            }
        }
    }
}

/// Best-effort transport to the dashboard.
pub trait Uplink {
    /// Delivery failure
    type Error: core::fmt::Debug;

    /// Deliver one payload
    ///
    /// # Errors
    ///
    /// Whatever the transport reports; callers log and drop it.
    fn send(&mut self, payload: &Payload) -> Result<(), Self::Error>;
}

/// Outcome of one [`UplinkScheduler::submit`] call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Delivery {
    /// Payload handed to the transport and accepted
    Sent,
    /// Transport reported a failure; the payload is kept for next time
    Failed,
    /// Too soon after the previous send
    Throttled,
}

/// Accumulates readings and sends them at the uplink cadence.
#[derive(Clone, Debug)]
pub struct UplinkScheduler {
    payload: Payload,
    gate: RefreshState,
}

impl UplinkScheduler {
    /// Scheduler for `team` at the default cadence
    #[must_use]
    pub fn new(team: &str) -> Self {
        Self::with_interval(team, UPLINK_INTERVAL_MS)
    }

    /// Scheduler for `team` sending again once `interval_ms` has passed
    #[must_use]
    pub fn with_interval(team: &str, interval_ms: u32) -> Self {
        Self {
            payload: Payload::new(team),
            gate: RefreshState::inclusive(interval_ms),
        }
    }

    /// Payload as it will be sent next
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Fold a reading into the pending payload
    pub fn record(&mut self, kind: DeviceKind, reading: &Reading) {
        self.payload.record(kind, reading);
    }

    /// Send the pending payload if at least the interval has passed since
    /// the last attempt. A failed send still starts a new interval.
    pub fn submit<U: Uplink>(&mut self, now_ms: u32, uplink: &mut U) -> Delivery {
        let payload = &self.payload;
        match self.gate.acquire(now_ms, || uplink.send(payload)) {
            None => Delivery::Throttled,
            Some(Ok(())) => {
                debug!("uplink delivered {} fields", payload.fields().len());
                Delivery::Sent
            }
            Some(Err(_)) => {
                warn!("uplink delivery failed");
                Delivery::Failed
            }
        }
    }
}
