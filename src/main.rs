//! Grove Node Main Application
//!
//! Entry point for the STM32G474 Grove carrier board. Binds the plug-in
//! sensors to their ports, samples them on a fixed period, renders the
//! readings on the OLED and hands them to the uplink task.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Flex, Input, Level, Output, Pull, Speed};
use embassy_stm32::i2c::I2c;
use embassy_stm32::time::Hertz;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use grove_firmware::bus::RefCellDevice;
use grove_firmware::drivers::dht::DhtVariant;
use grove_firmware::drivers::oled::Oled;
use grove_firmware::hal::adc::PortAdc;
use grove_firmware::hal::gpio::StatusLed;
use grove_firmware::hal::timer::EmbassyClock;
use grove_firmware::prelude::*;
use grove_firmware::sensors::{
    AnalogSensor, Co2Sensor, DigitalSensor, DistanceSensor, LightSensor, TempHumSensor,
};
use grove_firmware::uplink::{Payload, Uplink, UplinkScheduler};

/// Team tag stamped on every uplink payload
const TEAM: &str = "grove-node";

/// Readings on their way to the uplink task
static READINGS: Channel<CriticalSectionRawMutex, (DeviceKind, Reading), 8> = Channel::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Grove node firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(embassy_stm32::Config::default());
    info!("Peripherals initialized");

    let led = StatusLed::new(Output::new(p.PA5, Level::Low, Speed::Low));

    // Port 6: I2C1, PB8 = SCL, PB9 = SDA
    let i2c = I2c::new_blocking(
        p.I2C1,
        p.PB8,
        p.PB9,
        Hertz(I2C_FREQUENCY_HZ),
        Default::default(),
    );
    let bus = RefCell::new(i2c);
    info!("I2C1 initialized at {}Hz", I2C_FREQUENCY_HZ);

    let mut oled = report(Oled::new(RefCellDevice::new(&bus), None));
    let mut co2 = report(Co2Sensor::new(RefCellDevice::new(&bus), Delay, None));
    let mut light = report(LightSensor::new(RefCellDevice::new(&bus), None));
    let mut humiture = report(TempHumSensor::new(
        Flex::new(p.PB2),
        DhtVariant::Dht22,
        EmbassyClock,
        Delay,
        Some(3),
    ));
    let mut distance = report(DistanceSensor::new(
        Flex::new(p.PB0),
        EmbassyClock,
        Delay,
        Some(1),
    ));
    let mut motion = report(DigitalSensor::motion(Input::new(p.PB1, Pull::Down), Some(2)));
    let mut moisture = report(AnalogSensor::moisture(PortAdc::new(p.ADC1, p.PA0), None));

    if spawner.spawn(heartbeat_task(led)).is_err() {
        error!("heartbeat task could not be spawned");
    }
    if spawner.spawn(uplink_task(TEAM)).is_err() {
        error!("uplink task could not be spawned");
    }

    info!("Tasks spawned, entering acquisition loop");

    loop {
        let mut line = 1;
        if let Some(sensor) = humiture.as_mut() {
            sample(sensor, oled.as_mut(), &mut line);
        }
        if let Some(sensor) = distance.as_mut() {
            sample(sensor, oled.as_mut(), &mut line);
        }
        if let Some(sensor) = light.as_mut() {
            sample(sensor, oled.as_mut(), &mut line);
        }
        if let Some(sensor) = moisture.as_mut() {
            sample(sensor, oled.as_mut(), &mut line);
        }
        if let Some(sensor) = co2.as_mut() {
            sample(sensor, oled.as_mut(), &mut line);
        }
        if let Some(sensor) = motion.as_mut() {
            match sensor.is_active() {
                Ok(active) => info!("motion: {}", active),
                Err(e) => warn!("motion sensor: {}", e),
            }
        }

        Timer::after(Duration::from_millis(SAMPLE_PERIOD_MS)).await;
    }
}

/// Log a setup failure and carry on without the device
fn report<T>(result: Result<T, SetupError>) -> Option<T> {
    result.map_err(|e| error!("setup failed: {}", e)).ok()
}

/// Read one sensor, show it if there is a display and queue it for uplink.
/// `line` advances past the lines the sensor used.
fn sample<S: Sensor, D: DisplaySink>(sensor: &mut S, display: Option<&mut D>, line: &mut u8) {
    let kind = sensor.binding().kind();
    let result = match display {
        Some(display) => sensor.show_data(display, *line),
        None => sensor.get_data(),
    };
    match result {
        Ok(reading) => {
            if READINGS.try_send((kind, reading)).is_err() {
                warn!("uplink queue full, {} reading dropped", kind.name());
            }
        }
        Err(e) => warn!("{} read failed: {}", kind.name(), e),
    }
    let used = if kind == DeviceKind::Co2Sensor { 2 } else { 1 };
    *line = line.saturating_add(used);
}

/// Uplink that reports payloads over the debug probe
struct ProbeUplink;

impl Uplink for ProbeUplink {
    type Error = core::convert::Infallible;

    fn send(&mut self, payload: &Payload) -> Result<(), Self::Error> {
        info!("uplink [{}]", payload.team());
        for field in payload.fields() {
            info!("  {} = {}", field.key, field.value);
        }
        Ok(())
    }
}

/// Uplink task - folds queued readings into a payload and sends it at the
/// uplink cadence
#[embassy_executor::task]
async fn uplink_task(team: &'static str) {
    let mut scheduler = UplinkScheduler::new(team);
    let mut uplink = ProbeUplink;
    let clock = EmbassyClock;
    loop {
        let (kind, reading) = READINGS.receive().await;
        scheduler.record(kind, &reading);
        scheduler.submit(clock.now_ms(), &mut uplink);
    }
}

/// Heartbeat task - blinks LED to show system is running
#[embassy_executor::task]
async fn heartbeat_task(mut led: StatusLed<'static>) {
    loop {
        led.on();
        Timer::after(Duration::from_millis(100)).await;
        led.off();
        Timer::after(Duration::from_millis(900)).await;
    }
}
