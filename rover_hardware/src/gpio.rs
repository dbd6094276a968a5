//! Raspberry Pi peripherals on `rppal`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};
use rover_traits::{
    Direction, EdgeHandler, EdgeSensors, HalResult, InputEdges, InputId, MotorDriver, MotorSelect,
    Pitch, RangeSensor, Side,
};

use crate::KillSwitch;
use crate::buzzer::ToneOutput;
use crate::error::{HwError, Result};
use crate::util::{busy_wait, echo_to_cm, wait_while};

/// Software PWM carrier for the H-bridge enables.
const MOTOR_PWM_HZ: f64 = 200.0;

impl From<rppal::gpio::Error> for HwError {
    fn from(e: rppal::gpio::Error) -> Self {
        HwError::Gpio(e.to_string())
    }
}

/// BCM pin assignment for [`open`].
#[derive(Debug, Clone)]
pub struct GpioPins {
    pub trig: u8,
    pub echo: u8,
    pub edge_left: u8,
    pub edge_right: u8,
    /// `(forward, reverse)` inputs of each H-bridge channel.
    pub motor_left: (u8, u8),
    pub motor_right: (u8, u8),
    pub buttons: Vec<(InputId, u8)>,
    pub buzzer: Option<u8>,
    pub echo_timeout: Duration,
}

pub struct GpioRig {
    pub range: HcSr04,
    pub edges: LineSensors,
    pub motors: HBridge,
    pub buttons: GpioButtons,
    pub buzzer: Option<PwmTone>,
}

/// Claim every pin the rover uses.
pub fn open(pins: &GpioPins) -> Result<GpioRig> {
    let gpio = Gpio::new()?;
    let rig = GpioRig {
        range: HcSr04::new(&gpio, pins.trig, pins.echo, pins.echo_timeout)?,
        edges: LineSensors::new(&gpio, pins.edge_left, pins.edge_right)?,
        motors: HBridge::new(&gpio, pins.motor_left, pins.motor_right)?,
        buttons: GpioButtons::new(&gpio, pins.buttons.iter().copied()),
        buzzer: pins.buzzer.map(|p| PwmTone::new(&gpio, p)).transpose()?,
    };
    tracing::info!(?pins, "gpio opened");
    Ok(rig)
}

/// HC-SR04 ultrasonic ranger.
pub struct HcSr04 {
    trig: OutputPin,
    echo: InputPin,
    timeout: Duration,
}

impl HcSr04 {
    pub fn new(gpio: &Gpio, trig: u8, echo: u8, timeout: Duration) -> Result<Self> {
        Ok(Self {
            trig: gpio.get(trig)?.into_output_low(),
            echo: gpio.get(echo)?.into_input(),
            timeout,
        })
    }

    /// One measurement: a 10 µs trigger pulse, then time the echo pulse.
    pub fn measure(&mut self) -> Result<f32> {
        self.trig.set_low();
        busy_wait(Duration::from_micros(2));
        self.trig.set_high();
        busy_wait(Duration::from_micros(10));
        self.trig.set_low();

        let echo = &self.echo;
        wait_while(|| echo.is_low(), self.timeout, Duration::ZERO)?;
        let width = wait_while(|| echo.is_high(), self.timeout, Duration::ZERO)?;
        Ok(echo_to_cm(width))
    }
}

impl RangeSensor for HcSr04 {
    fn ping_cm(&mut self) -> HalResult<f32> {
        Ok(self.measure()?)
    }
}

/// Two digital line sensors; high means the floor reflects.
pub struct LineSensors {
    left: InputPin,
    right: InputPin,
}

impl LineSensors {
    pub fn new(gpio: &Gpio, left: u8, right: u8) -> Result<Self> {
        Ok(Self {
            left: gpio.get(left)?.into_input(),
            right: gpio.get(right)?.into_input(),
        })
    }
}

impl EdgeSensors for LineSensors {
    fn read_edge(&mut self, side: Side) -> HalResult<u8> {
        let pin = match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        };
        Ok(u8::from(pin.is_high()))
    }
}

struct Channel {
    fwd: OutputPin,
    rev: OutputPin,
}

impl Channel {
    fn set(&mut self, direction: Direction, speed: u8) -> Result<()> {
        let (on, off) = match direction {
            Direction::Forward => (&mut self.fwd, &mut self.rev),
            Direction::Reverse => (&mut self.rev, &mut self.fwd),
        };
        off.clear_pwm()?;
        off.set_low();
        if speed == 0 {
            on.clear_pwm()?;
            on.set_low();
        } else {
            on.set_pwm_frequency(MOTOR_PWM_HZ, f64::from(speed) / 255.0)?;
        }
        Ok(())
    }

    fn off(&mut self) -> Result<()> {
        for pin in [&mut self.fwd, &mut self.rev] {
            pin.clear_pwm()?;
            pin.set_low();
        }
        Ok(())
    }
}

/// Dual H-bridge, left channel first.
pub struct HBridge {
    channels: Arc<Mutex<[Channel; 2]>>,
}

impl HBridge {
    pub fn new(gpio: &Gpio, left: (u8, u8), right: (u8, u8)) -> Result<Self> {
        let channel = |(f, r): (u8, u8)| -> Result<Channel> {
            Ok(Channel {
                fwd: gpio.get(f)?.into_output_low(),
                rev: gpio.get(r)?.into_output_low(),
            })
        };
        Ok(Self {
            channels: Arc::new(Mutex::new([channel(left)?, channel(right)?])),
        })
    }

    /// Handle that cuts both channels from any thread.
    pub fn kill_switch(&self) -> KillSwitch {
        let channels = Arc::clone(&self.channels);
        Box::new(move || {
            let mut ch = channels.lock().unwrap_or_else(PoisonError::into_inner);
            for c in ch.iter_mut() {
                if let Err(e) = c.off() {
                    tracing::error!(error = %e, "kill switch failed");
                }
            }
        })
    }
}

impl MotorDriver for HBridge {
    fn drive(&mut self, motors: MotorSelect, direction: Direction, speed: u8) -> HalResult<()> {
        let mut ch = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let [left, right] = &mut *ch;
        match motors {
            MotorSelect::Left => left.set(direction, speed)?,
            MotorSelect::Right => right.set(direction, speed)?,
            MotorSelect::Both => {
                left.set(direction, speed)?;
                right.set(direction, speed)?;
            }
        }
        Ok(())
    }

    fn stop_all(&mut self) -> HalResult<()> {
        let mut ch = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        for c in ch.iter_mut() {
            c.off()?;
        }
        Ok(())
    }
}

/// Active-low push buttons. Handlers run on rppal's interrupt thread.
pub struct GpioButtons {
    gpio: Gpio,
    wiring: HashMap<InputId, u8>,
    armed: Vec<InputPin>,
}

impl GpioButtons {
    pub fn new(gpio: &Gpio, wiring: impl IntoIterator<Item = (InputId, u8)>) -> Self {
        Self {
            gpio: gpio.clone(),
            wiring: wiring.into_iter().collect(),
            armed: Vec::new(),
        }
    }
}

impl InputEdges for GpioButtons {
    fn on_edge(&mut self, input: InputId, handler: EdgeHandler) -> HalResult<()> {
        let Some(&bcm) = self.wiring.get(&input) else {
            tracing::debug!(?input, "input not wired");
            return Ok(());
        };
        let mut pin = self.gpio.get(bcm).map_err(HwError::from)?.into_input_pullup();
        pin.set_async_interrupt(Trigger::FallingEdge, move |_| handler())
            .map_err(HwError::from)?;
        self.armed.push(pin);
        Ok(())
    }
}

/// Piezo buzzer on a software PWM pin.
pub struct PwmTone {
    pin: OutputPin,
}

impl PwmTone {
    pub fn new(gpio: &Gpio, bcm: u8) -> Result<Self> {
        Ok(Self {
            pin: gpio.get(bcm)?.into_output_low(),
        })
    }
}

impl ToneOutput for PwmTone {
    fn sound(&mut self, pitch: Option<Pitch>) -> Result<()> {
        match pitch {
            Some(p) => self.pin.set_pwm_frequency(f64::from(p.frequency_hz()), 0.5)?,
            None => {
                self.pin.clear_pwm()?;
                self.pin.set_low();
            }
        }
        Ok(())
    }
}
