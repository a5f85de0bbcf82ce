//! This example connects to a motor, listens for stall events and runs the
//! motor through a few speed and rotation commands.
//!
//! No hardware is needed: the in-memory transport stands in for the link and
//! a stall is simulated halfway through.

use plezmo_session::elements::motor::{MotorDirection, MotorRotation, MotorSpeed};
use plezmo_session::{
    ElementEvent, ElementType, Error, EventKind, MemoryTransport, Session, SessionConfig,
};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let motor_name = std::env::args().nth(1).unwrap_or_else(|| "Motor".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;

    let batch = match session.connect_batch([(motor_name.as_str(), ElementType::Motor)]).await {
        Ok(batch) => batch,
        Err(e) => {
            log::error!("Could not connect to all the required elements: {}", e);
            return session.close().await;
        }
    };

    let motor = session.motor(motor_name.as_str());
    motor.on_stall(|_| {
        log::info!("Got motor stall event");
        Ok(())
    })?;

    log::info!("Starting motor with 50 RPM in CLOCKWISE direction");
    motor.start_with_rpm(50, MotorDirection::Clockwise).await?;
    sleep(Duration::from_millis(500)).await;

    transport.emit(ElementEvent::new(motor_name.as_str(), EventKind::Stall));

    log::info!("Rotating motor ONE turn in ANTICLOCKWISE direction");
    motor
        .rotate(MotorRotation::One, MotorDirection::Anticlockwise)
        .await?;

    log::info!("Starting motor at HIGH speed in CLOCKWISE direction");
    motor.start(MotorSpeed::High, MotorDirection::Clockwise).await?;
    sleep(Duration::from_millis(500)).await;

    log::info!("Stopping motor");
    motor.stop().await?;

    batch.release().await?;
    session.close().await
}
