//! End-to-end scenarios: two devices over one simulated relay.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use faro_core::{AlarmState, Modality, STROBE_PHASE};
use faro_test::{LossConfig, LossyConnector, TestDevice};
use faro_transport::{Connector, MemoryRelay};

const WAIT: Duration = Duration::from_secs(2);

async fn wait_for_state(device: &TestDevice, state: AlarmState) {
    let mut states = device.node.alarm_states();
    timeout(WAIT, states.wait_for(|s| *s == state))
        .await
        .expect("state not reached in time")
        .expect("state stream ended");
}

#[tokio::test]
async fn test_distress_reaches_contact_and_arms_alarm() {
    let relay = MemoryRelay::new();
    let ana = TestDevice::new("Ana", "ana@example.com", "papa@example.com", Arc::new(relay.connector()));
    let papa = TestDevice::new("Papa", "papa@example.com", "ana@example.com", Arc::new(relay.connector()));
    papa.node.start();

    ana.node.trigger_sos().await.unwrap();
    wait_for_state(&papa, AlarmState::Alerting).await;

    let report = papa.node.engine().report().await.unwrap();
    for modality in Modality::ALL {
        assert!(report.is_active(modality), "{modality} not active");
    }
    assert!(papa.sim.audio.is_playing());

    papa.node.shutdown().await;
    ana.node.shutdown().await;
    assert!(papa.sim.all_released());
}

#[tokio::test]
async fn test_local_silence_releases_within_strobe_bound() {
    let relay = MemoryRelay::new();
    let ana = TestDevice::new("Ana", "ana@example.com", "papa@example.com", Arc::new(relay.connector()));
    let papa = TestDevice::new("Papa", "papa@example.com", "ana@example.com", Arc::new(relay.connector()));
    papa.node.start();

    ana.node.trigger_sos().await.unwrap();
    wait_for_state(&papa, AlarmState::Alerting).await;

    let begin = Instant::now();
    papa.node.silence().await;
    assert!(begin.elapsed() <= STROBE_PHASE);
    assert!(papa.sim.all_released());
    assert_eq!(papa.node.alarm_state(), AlarmState::Silenced);

    papa.node.shutdown().await;
    ana.node.shutdown().await;
}

#[tokio::test]
async fn test_malformed_frames_never_kill_the_receiver() {
    let relay = MemoryRelay::new();
    let papa = TestDevice::new("Papa", "papa@example.com", "ana@example.com", Arc::new(relay.connector()));
    papa.node.start();

    let raw = relay.connector().connect().await.unwrap();
    let (raw_sink, mut raw_source) = raw.split();
    raw_source.next().await.unwrap(); // papa's registration

    raw_sink.send(r#"{"foo":"bar"}"#.into()).await.unwrap();
    raw_sink.send("garbage{{{".into()).await.unwrap();
    assert_eq!(papa.node.alarm_state(), AlarmState::Idle);

    raw_sink.send(r#"{"estado":"SOS"}"#.into()).await.unwrap();
    wait_for_state(&papa, AlarmState::Alerting).await;

    papa.node.shutdown().await;
}

#[tokio::test]
async fn test_receiver_survives_relay_restart() {
    let relay = MemoryRelay::new();
    let papa = TestDevice::new("Papa", "papa@example.com", "ana@example.com", Arc::new(relay.connector()));
    papa.node.start();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Relay restart: every link severed. Papa reconnects after its fixed
    // delay and re-registers on the new session.
    relay.disconnect_all();
    let raw = relay.connector().connect().await.unwrap();
    let (raw_sink, mut raw_source) = raw.split();

    let register = timeout(WAIT, raw_source.next())
        .await
        .expect("no re-registration")
        .unwrap();
    assert!(register.contains("register"));

    raw_sink.send(r#"{"tipo":"alerta"}"#.into()).await.unwrap();
    wait_for_state(&papa, AlarmState::Alerting).await;

    papa.node.shutdown().await;
}

#[tokio::test]
async fn test_duplicated_sos_arms_exactly_once() {
    let relay = MemoryRelay::new();
    // Papa's inbound link delivers every frame twice.
    let lossy = Arc::new(LossyConnector::new(
        Arc::new(relay.connector()),
        LossConfig::duplicating(),
    ));
    let papa = TestDevice::with_emitters(
        "Papa",
        "papa@example.com",
        "ana@example.com",
        lossy,
        faro_effects::sim::SimEmitters::new(),
    );
    papa.node.start();

    let ana = TestDevice::new("Ana", "ana@example.com", "papa@example.com", Arc::new(relay.connector()));
    ana.node.trigger_sos().await.unwrap();
    wait_for_state(&papa, AlarmState::Alerting).await;
    tokio::time::sleep(Duration::from_millis(50)).await; // let the duplicate land

    assert_eq!(papa.sim.audio.acquisitions(), 1);
    assert_eq!(papa.sim.audio.overlaps(), 0);

    papa.node.shutdown().await;
    ana.node.shutdown().await;
}
