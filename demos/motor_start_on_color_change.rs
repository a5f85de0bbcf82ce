//! This example starts a motor whenever the color sensor sees GREEN and
//! stops it whenever it sees RED.
//!
//! The session is captured by the event handlers, so they can command the
//! motor without any global state.

use plezmo_session::elements::color::SensorColor;
use plezmo_session::elements::motor::{MotorDirection, MotorSpeed};
use plezmo_session::{
    ElementEvent, ElementType, Error, EventKind, MemoryTransport, Session, SessionConfig,
};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let mut args = std::env::args().skip(1);
    let motor_name = args.next().unwrap_or_else(|| "Motor-A".to_string());
    let color_name = args.next().unwrap_or_else(|| "Color".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;

    let batch = match session
        .connect_batch([
            (color_name.as_str(), ElementType::Color),
            (motor_name.as_str(), ElementType::Motor),
        ])
        .await
    {
        Ok(batch) => batch,
        Err(e) => {
            log::error!("Could not connect to all the required elements: {}", e);
            return session.close().await;
        }
    };

    let color = session.color(color_name.as_str());

    let motor = session.motor(motor_name.as_str());
    color.on_color_change(SensorColor::Green, move |_| {
        log::info!("Got green color change event, starting motor");
        let motor = motor.clone();
        tokio::spawn(async move {
            if let Err(e) = motor.start(MotorSpeed::High, MotorDirection::Clockwise).await {
                log::error!("Failed to start motor: {}", e);
            }
        });
        Ok(())
    })?;

    let motor = session.motor(motor_name.as_str());
    color.on_color_change(SensorColor::Red, move |_| {
        log::info!("Got red color change event, stopping motor");
        let motor = motor.clone();
        tokio::spawn(async move {
            if let Err(e) = motor.stop().await {
                log::error!("Failed to stop motor: {}", e);
            }
        });
        Ok(())
    })?;

    log::info!("Event handlers registered, simulating GREEN then RED");

    for detected in [SensorColor::Green, SensorColor::Red] {
        transport.emit(
            ElementEvent::new(color_name.as_str(), EventKind::ColorChange).with_value(detected),
        );
        sleep(Duration::from_millis(500)).await;
    }

    batch.release().await?;
    session.close().await
}
