//! SIGUSR1 delivery through the real signal handler. Lives in its own test
//! binary so the raised signal cannot reach other tests' runtimes.
#![cfg(unix)]

use std::time::Duration;

use nix::sys::signal::{Signal, raise};
use tokio::time::timeout;
use weather_feed_core::{IntervalSignalTriggers, Trigger, TriggerSource};

#[tokio::test]
async fn sigusr1_yields_a_signal_trigger() {
    let mut triggers =
        IntervalSignalTriggers::new(Duration::from_secs(3600)).expect("register SIGUSR1 handler");

    raise(Signal::SIGUSR1).expect("raise SIGUSR1");

    let trigger = timeout(Duration::from_secs(5), triggers.next_trigger())
        .await
        .expect("signal trigger within 5s");
    assert_eq!(trigger, Some(Trigger::Signal));
}
