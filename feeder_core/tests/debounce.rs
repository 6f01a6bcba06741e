//! Button classification at the seam: raw line levels in, press events out.

use feeder_config::ButtonCfg;
use feeder_core::button::{DebouncedButton, PressKind};
use feeder_core::mocks::SharedButton;
use feeder_traits::Level;
use proptest::prelude::*;

fn classifier() -> (DebouncedButton<SharedButton>, std::rc::Rc<std::cell::Cell<Level>>) {
    let button = SharedButton::new();
    let line = button.line();
    (DebouncedButton::new(button, ButtonCfg::default()), line)
}

/// Establish the idle-high baseline so the next transition is a real press.
fn settle(button: &mut DebouncedButton<SharedButton>) {
    assert_eq!(button.poll(0).unwrap(), None);
}

#[test]
fn fifty_ms_tap_is_bounce_noise() {
    let (mut button, line) = classifier();
    settle(&mut button);
    line.set(Level::Low);
    assert_eq!(button.poll(10).unwrap(), None);
    line.set(Level::High);
    assert_eq!(button.poll(60).unwrap(), None);
}

#[test]
fn half_second_press_is_short() {
    let (mut button, line) = classifier();
    settle(&mut button);
    line.set(Level::Low);
    assert_eq!(button.poll(100).unwrap(), None);
    assert_eq!(button.poll(300).unwrap(), None);
    line.set(Level::High);
    let event = button.poll(600).unwrap().expect("press event");
    assert_eq!(event.kind, PressKind::Short);
    assert_eq!(event.duration_ms, 500);
}

#[test]
fn four_second_hold_is_long() {
    let (mut button, line) = classifier();
    settle(&mut button);
    line.set(Level::Low);
    assert_eq!(button.poll(1000).unwrap(), None);
    line.set(Level::High);
    let event = button.poll(5000).unwrap().expect("press event");
    assert_eq!(event.kind, PressKind::Long);
    assert_eq!(event.duration_ms, 4000);
}

#[test]
fn contact_bounce_inside_a_press_restarts_the_timer() {
    let (mut button, line) = classifier();
    settle(&mut button);
    line.set(Level::Low);
    assert_eq!(button.poll(10).unwrap(), None);
    // Bounce: a sub-threshold release restarts the measurement.
    line.set(Level::High);
    assert_eq!(button.poll(30).unwrap(), None);
    line.set(Level::Low);
    assert_eq!(button.poll(35).unwrap(), None);
    line.set(Level::High);
    assert_eq!(button.poll(40).unwrap(), None);
}

proptest! {
    /// Hold duration alone decides the classification, regardless of how
    /// often the line is polled while held.
    #[test]
    fn classification_matches_hold_duration(held in 1u64..6000, cadence in 1u64..25) {
        let (mut button, line) = classifier();
        settle(&mut button);
        line.set(Level::Low);
        let mut t = 0;
        while t < held {
            prop_assert_eq!(button.poll(t).unwrap(), None);
            t += cadence;
        }
        line.set(Level::High);
        let event = button.poll(held).unwrap();
        match held {
            0..100 => prop_assert!(event.is_none()),
            100..3000 => {
                let event = event.expect("short press");
                prop_assert_eq!(event.kind, PressKind::Short);
                prop_assert_eq!(event.duration_ms, held);
            }
            _ => {
                let event = event.expect("long press");
                prop_assert_eq!(event.kind, PressKind::Long);
                prop_assert_eq!(event.duration_ms, held);
            }
        }
    }
}
