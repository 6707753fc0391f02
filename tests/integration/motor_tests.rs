//! MotorController behaviour against the recording mock board.

use feeder::app::ports::GpioError;
use feeder::config::{MotorConfig, PinRole, PinRoles};
use feeder::drivers::motor::{Direction, DirectionCommand, MotorController, ParamUpdate};
use feeder::error::Error;

use crate::mock_gpio::{Call, Fault, MockGpio};

fn motor(use_pwm: bool) -> (MockGpio, MotorController<MockGpio>) {
    let gpio = MockGpio::new();
    let config = MotorConfig {
        use_pwm,
        ..MotorConfig::default()
    };
    let m = MotorController::new(gpio.clone(), &config).unwrap();
    (gpio, m)
}

#[test]
fn construction_parks_direction_inputs() {
    let (gpio, m) = motor(false);
    assert_eq!(
        gpio.calls(),
        vec![
            Call::Configure(17),
            Call::Configure(4),
            Call::Configure(18),
            Call::Low(17),
            Call::Low(4),
        ]
    );
    assert_eq!(m.direction(), Direction::Off);
    assert!(!m.is_running());
}

#[test]
fn overridden_pins_are_used() {
    let gpio = MockGpio::new();
    let pins = PinRoles::default()
        .with(PinRole::In1, 23)
        .with(PinRole::Enable, 12);
    let config = MotorConfig {
        pins,
        ..MotorConfig::default()
    };
    let mut m = MotorController::new(gpio.clone(), &config).unwrap();
    m.start(None).unwrap();

    assert_eq!(gpio.level(12), Some(true));
    assert_eq!(gpio.level(23), Some(true));
    assert_eq!(gpio.level(4), Some(false));
    assert_eq!(gpio.level(18), None);
}

#[test]
fn start_stop_start_without_pwm() {
    let (gpio, mut m) = motor(false);

    m.start(None).unwrap();
    assert_eq!(gpio.level(18), Some(true));
    assert_eq!((gpio.level(17), gpio.level(4)), (Some(true), Some(false)));

    m.stop().unwrap();
    assert_eq!(gpio.level(18), Some(false));
    assert_eq!(m.direction(), Direction::Forward);

    gpio.clear();
    m.start(None).unwrap();
    assert_eq!(gpio.calls(), vec![Call::High(18)]);
    assert!(m.is_running());
}

#[test]
fn direction_changes_never_short_the_bridge() {
    let (gpio, mut m) = motor(false);
    for cmd in [
        DirectionCommand::Forward,
        DirectionCommand::Backward,
        DirectionCommand::Toggle,
        DirectionCommand::Toggle,
        DirectionCommand::Off,
        DirectionCommand::Backward,
        DirectionCommand::Forward,
    ] {
        m.set_direction(cmd).unwrap();
    }
    assert!(!gpio.both_high_at_any_point(17, 4));
}

#[test]
fn off_always_drives_both_inputs_low() {
    let (gpio, mut m) = motor(false);
    m.backward().unwrap();
    m.set_direction(DirectionCommand::Off).unwrap();
    m.set_direction(DirectionCommand::Off).unwrap();
    assert_eq!((gpio.level(17), gpio.level(4)), (Some(false), Some(false)));
}

#[test]
fn toggle_from_off_is_a_no_op() {
    let (gpio, mut m) = motor(false);
    gpio.clear();
    assert_eq!(m.toggle().unwrap(), Direction::Off);
    assert!(gpio.calls().is_empty());
}

#[test]
fn speed_without_pwm_is_stored_only() {
    let (gpio, mut m) = motor(false);
    gpio.clear();
    assert_eq!(m.set_speed(50.0).unwrap(), ParamUpdate::Deferred);
    assert_eq!(m.set_frequency(20.0).unwrap(), ParamUpdate::Deferred);
    assert!(gpio.calls().is_empty());
    assert!((m.speed() - 50.0).abs() < f64::EPSILON);
}

#[test]
fn speed_with_pwm_changes_duty_immediately() {
    let (gpio, mut m) = motor(true);
    gpio.clear();
    assert_eq!(m.set_speed(50.0).unwrap(), ParamUpdate::Applied);
    assert_eq!(gpio.calls(), vec![Call::PwmDuty(18, 50.0)]);
}

#[test]
fn speed_set_while_disabled_is_honoured_after_enable() {
    let (gpio, mut m) = motor(false);
    m.set_speed(40.0).unwrap();
    m.set_frequency(25.0).unwrap();
    m.set_use_pwm(true).unwrap();
    m.start(None).unwrap();

    let calls = gpio.calls();
    assert!(calls.contains(&Call::CreatePwm(18, 25.0)));
    assert!(calls.contains(&Call::PwmStart(18, 40.0)));
}

#[test]
fn disabling_pwm_stops_and_releases_channel() {
    let (gpio, mut m) = motor(true);
    m.start(Some(30.0)).unwrap();
    gpio.clear();
    m.set_use_pwm(false).unwrap();

    let calls = gpio.calls();
    let stop = calls.iter().position(|c| *c == Call::PwmStop(18));
    let drop = calls.iter().position(|c| *c == Call::PwmDrop(18));
    assert!(stop.is_some() && stop < drop);
    // Still running: restarted on the plain enable line.
    assert_eq!(calls.last(), Some(&Call::High(18)));
    assert!(!m.use_pwm());
}

#[test]
fn stop_before_start_is_safe_in_both_modes() {
    for use_pwm in [false, true] {
        let (_gpio, mut m) = motor(use_pwm);
        m.stop().unwrap();
        m.stop().unwrap();
        assert!(!m.is_running());
        assert_eq!(m.direction(), Direction::Off);
    }
}

#[test]
fn construction_fault_propagates() {
    let gpio = MockGpio::failing(Fault::Configure(4));
    let r = MotorController::new(gpio, &MotorConfig::default());
    assert!(matches!(r, Err(Error::Gpio(GpioError::AccessDenied))));
}

#[test]
fn pwm_creation_fault_propagates() {
    let gpio = MockGpio::failing(Fault::CreatePwm);
    let config = MotorConfig {
        use_pwm: true,
        ..MotorConfig::default()
    };
    let r = MotorController::new(gpio, &config);
    assert!(matches!(r, Err(Error::Gpio(GpioError::PwmFailed(18)))));
}

#[test]
fn enable_write_fault_propagates_from_start() {
    let gpio = MockGpio::failing(Fault::Write(18));
    let mut m = MotorController::new(gpio, &MotorConfig::default()).unwrap();
    assert_eq!(m.start(None), Err(Error::Gpio(GpioError::AccessDenied)));
}

#[test]
fn mode_switch_while_running_leaves_direction_pins_alone() {
    for enable in [true, false] {
        let (gpio, mut m) = motor(!enable);
        m.start(None).unwrap();
        m.set_direction(DirectionCommand::Off).unwrap();
        gpio.clear();

        m.set_use_pwm(enable).unwrap();

        let calls = gpio.calls();
        assert!(
            !calls
                .iter()
                .any(|c| matches!(c, Call::High(17 | 4) | Call::Low(17 | 4))),
            "direction pins written: {:?}",
            calls
        );
        assert_eq!(m.direction(), Direction::Off);
        assert!(m.is_running());
    }
}

#[test]
fn repeated_start_reapplies_enable_without_pwm() {
    let (gpio, mut m) = motor(false);
    m.backward().unwrap();
    gpio.clear();

    m.start(None).unwrap();
    m.start(None).unwrap();

    assert_eq!(gpio.calls(), vec![Call::High(18), Call::High(18)]);
    assert_eq!(m.direction(), Direction::Backward);
}

#[test]
fn repeated_start_reapplies_duty_with_pwm() {
    let (gpio, mut m) = motor(true);
    m.set_speed(60.0).unwrap();
    m.forward().unwrap();
    gpio.clear();

    m.start(None).unwrap();
    m.start(None).unwrap();

    assert_eq!(
        gpio.calls(),
        vec![Call::PwmStart(18, 60.0), Call::PwmStart(18, 60.0)]
    );
    assert_eq!(m.direction(), Direction::Forward);
}
