//! This example listens for tilt, flat and motion events on a motion sensor,
//! reads its angles and acceleration, and waits for a few gestures.

use plezmo_session::elements::motion::{AccelerationAxis, Axis, Movement, Tilt};
use plezmo_session::{
    ElementEvent, ElementType, Error, EventKind, MemoryTransport, Response, Session,
    SessionConfig,
};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let name = std::env::args().nth(1).unwrap_or_else(|| "Motion".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;
    let batch = session
        .connect_batch([(name.as_str(), ElementType::Motion)])
        .await?;

    let motion = session.motion(name.as_str());
    for tilt in [Tilt::Left, Tilt::Right, Tilt::Front, Tilt::Back] {
        motion.on_tilt(tilt, move |_| {
            log::info!("Got {:?} tilt", tilt);
            Ok(())
        })?;
    }
    motion.on_flat(|_| {
        log::info!("Got flat event");
        Ok(())
    })?;
    motion.on_motion(Movement::Start, |_| {
        log::info!("Got motion start event");
        Ok(())
    })?;
    motion.on_motion(Movement::Stop, |_| {
        log::info!("Got motion stop event");
        Ok(())
    })?;

    let tilted = |tilt: Tilt| ElementEvent::new(name.as_str(), EventKind::Tilt).with_value(tilt);
    let moved =
        |movement: Movement| ElementEvent::new(name.as_str(), EventKind::Motion).with_value(movement);

    transport.emit(tilted(Tilt::Left));
    transport.emit(ElementEvent::new(name.as_str(), EventKind::Flat));
    transport.emit(moved(Movement::Start));
    sleep(Duration::from_millis(100)).await;

    for angle in [12, -30, 5] {
        transport.push_response(name.as_str(), Response::Angle(angle));
        transport.push_response(name.as_str(), Response::Angle(-angle));
        log::info!(
            "Left to right {}, front to back {}",
            motion.get_angle(Axis::LeftToRight).await?,
            motion.get_angle(Axis::FrontToBack).await?
        );
    }

    // Without a queued value the element only acknowledges
    match motion.get_acceleration(AccelerationAxis::X).await {
        Ok(value) => log::info!("Acceleration on X {}", value),
        Err(e) => log::warn!("Could not read acceleration: {}", e),
    }

    let simulator = transport.clone();
    let events = [
        tilted(Tilt::Back),
        moved(Movement::Start),
        ElementEvent::new(name.as_str(), EventKind::Flat),
    ];
    tokio::spawn(async move {
        for event in events {
            sleep(Duration::from_millis(200)).await;
            simulator.emit(event);
        }
    });

    let timeout = Some(Duration::from_secs(5));
    motion.wait_for_tilt(Tilt::Back, timeout).await?;
    log::info!("Got BACK tilt after wait for");
    motion.wait_for_motion(Movement::Start, timeout).await?;
    log::info!("Got motion start after wait for");
    motion.wait_for_flat(timeout).await?;
    log::info!("Got flat after wait for");

    batch.release().await?;
    session.close().await
}
