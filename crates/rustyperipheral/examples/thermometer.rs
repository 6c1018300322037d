//! Example running the thermometer peripheral against a logging transport
//!
//! No Bluetooth daemon is involved. The transport prints what would be sent
//! over the bus and the example plays the role of a client: it reads the
//! temperature, subscribes, switches the unit to Fahrenheit and unsubscribes.
//!
//! Run with `RUST_LOG=debug` to see the GATT tree at work.

use rustyperipheral::thermometer::service::{
    TEMPERATURE_CHAR_ID, THERMOMETER_SERVICE_ID, UNIT_CHAR_ID,
};
use rustyperipheral::transport::{PropertyMap, RegistrationReply, Transport};
use rustyperipheral::{Peripheral, PeripheralConfig, SensorSource, WriteOptions};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct LoggingTransport;

impl Transport for LoggingTransport {
    fn register_advertisement(&self, path: &str, _options: PropertyMap, reply: RegistrationReply) {
        println!("RegisterAdvertisement({})", path);
        reply(Ok(()));
    }

    fn notify_value(&self, path: &str, value: &[u8]) -> rustyperipheral::Result<()> {
        println!("PropertiesChanged({}) Value={}", path, hex::encode(value));
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = PeripheralConfig {
        notify_interval: Duration::from_secs(1),
        sensor: SensorSource::Simulated,
        ..Default::default()
    };
    let peripheral = Peripheral::new(config, Arc::new(LoggingTransport))?;

    for (path, interfaces) in peripheral.tree().managed_objects() {
        println!("{}", path);
        for (interface, properties) in interfaces {
            println!("  {}", interface);
            for (name, value) in properties {
                println!("    {} = {}", name, value);
            }
        }
    }

    peripheral.publish();

    let tree = peripheral.tree();
    let value = tree.handle_read(THERMOMETER_SERVICE_ID, TEMPERATURE_CHAR_ID)?;
    println!("Read temperature: {}", hex::encode(&value));

    tree.handle_subscribe(THERMOMETER_SERVICE_ID, TEMPERATURE_CHAR_ID, true)?;
    thread::sleep(Duration::from_millis(3500));

    println!("Switching unit to Fahrenheit");
    tree.handle_write(
        THERMOMETER_SERVICE_ID,
        UNIT_CHAR_ID,
        b"F",
        &WriteOptions::default(),
    )?;
    thread::sleep(Duration::from_millis(2500));

    tree.handle_subscribe(THERMOMETER_SERVICE_ID, TEMPERATURE_CHAR_ID, false)?;
    peripheral.advertisement().release();
    println!("Done");

    Ok(())
}
