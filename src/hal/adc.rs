//! ADC Driver
//!
//! Blocking single-channel reads for the analog Grove port.

use embassy_stm32::adc::{Adc, AdcChannel, AnyAdcChannel, SampleTime};
use embassy_stm32::peripherals::ADC1;

use crate::io::AnalogSource;

/// ADC1 bound to the port 4 channel.
pub struct PortAdc<'d> {
    adc: Adc<'d, ADC1>,
    channel: AnyAdcChannel<ADC1>,
}

impl<'d> PortAdc<'d> {
    /// Take the converter and the port's channel
    #[must_use]
    pub fn new(adc: ADC1, channel: impl AdcChannel<ADC1>) -> Self {
        let mut adc = Adc::new(adc);
        // Grove probes have high source impedance
        adc.set_sample_time(SampleTime::CYCLES247_5);
        Self {
            adc,
            channel: channel.degrade_adc(),
        }
    }
}

impl AnalogSource for PortAdc<'_> {
    fn read_raw(&mut self) -> u16 {
        self.adc.blocking_read(&mut self.channel)
    }
}
