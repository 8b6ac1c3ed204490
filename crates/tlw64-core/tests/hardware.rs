//! Tests against a real band.
//!
//! These require BLE hardware and should be run with:
//! `cargo test --package tlw64-core --test hardware -- --ignored --nocapture`
//!
//! Set TLW64_DEVICE to the band's name or address; it defaults to "TLW64".

use std::env;
use std::sync::Arc;
use std::time::Duration;

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::time::{sleep, timeout};

use tlw64_core::uuids::TLW64_SERVICE;
use tlw64_core::{
    BleChannel, BroadcastSink, ConnectionConfig, SettingsSnapshot, Watch, WatchEvent,
};

/// Overall timeout for one hardware test.
const BLE_TIMEOUT: Duration = Duration::from_secs(60);

fn device_name() -> String {
    env::var("TLW64_DEVICE").unwrap_or_else(|_| "TLW64".to_string())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tlw64_core=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Scan once and pick the first band whose name, address or service matches.
async fn find_band(wanted: &str) -> (Adapter, Peripheral) {
    let manager = Manager::new().await.expect("no BLE manager");
    let adapter = manager
        .adapters()
        .await
        .expect("failed to list adapters")
        .into_iter()
        .next()
        .expect("no Bluetooth adapter");

    adapter.start_scan(ScanFilter::default()).await.unwrap();
    sleep(Duration::from_secs(5)).await;
    adapter.stop_scan().await.unwrap();

    let wanted = wanted.to_lowercase();
    for peripheral in adapter.peripherals().await.unwrap() {
        let Ok(Some(props)) = peripheral.properties().await else {
            continue;
        };
        let name_matches = props
            .local_name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&wanted));
        let address_matches = props.address.to_string().to_lowercase() == wanted;
        if name_matches || address_matches || props.services.contains(&TLW64_SERVICE) {
            println!("Found {:?} ({})", props.local_name, props.address);
            return (adapter, peripheral);
        }
    }
    panic!("band {} not found", wanted);
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_connect_reports_name() {
    init_tracing();
    let (adapter, peripheral) = find_band(&device_name()).await;
    let channel = timeout(
        BLE_TIMEOUT,
        BleChannel::from_peripheral(adapter, peripheral, ConnectionConfig::default()),
    )
    .await
    .expect("connect timed out")
    .expect("connect failed");

    println!("Connected to {:?}", channel.name());
    assert!(channel.is_connected().await);
    assert_eq!(channel.state(), None);
    channel.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_initialize_and_buzz() {
    init_tracing();
    let (adapter, peripheral) = find_band(&device_name()).await;
    let channel = timeout(
        BLE_TIMEOUT,
        BleChannel::from_peripheral(adapter, peripheral, ConnectionConfig::default()),
    )
    .await
    .expect("connect timed out")
    .expect("connect failed");

    let sink = BroadcastSink::default();
    let mut events = sink.subscribe();
    let watch = Arc::new(Watch::new(channel, Arc::new(sink), SettingsSnapshot::default()));
    watch.attach().await.unwrap();
    watch.initialize().await.unwrap();

    // Give the band time to answer the firmware request
    let firmware = timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await {
                Ok(WatchEvent::FirmwareVersion { version }) => return version,
                Ok(_) => continue,
                Err(e) => panic!("event stream failed: {}", e),
            }
        }
    })
    .await
    .expect("no firmware version reported");
    println!("Firmware: {}", firmware);
    println!("Status: {:?}", watch.status());

    watch.on_find_device(true).await;
    sleep(Duration::from_secs(2)).await;

    watch.channel().disconnect().await.unwrap();
}
