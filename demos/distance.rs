//! This example registers NEAR/FAR handlers on a distance sensor, reads the
//! distance and then blocks until the next NEAR event.

use plezmo_session::elements::distance::DistanceZone;
use plezmo_session::{
    ElementEvent, ElementType, Error, EventKind, MemoryTransport, Response, Session,
    SessionConfig,
};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let name = std::env::args().nth(1).unwrap_or_else(|| "Distance".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;
    let batch = session
        .connect_batch([(name.as_str(), ElementType::Distance)])
        .await?;

    let distance = session.distance(name.as_str());
    distance.on_distance_event(DistanceZone::Near, |_| {
        log::info!("Got NEAR event");
        Ok(())
    })?;
    distance.on_distance_event(DistanceZone::Far, |_| {
        log::info!("Got FAR event");
        Ok(())
    })?;

    transport.push_response(name.as_str(), Response::DistanceCm(23.0));
    log::info!("Distance {} cm", distance.get_distance_cm().await?);

    let simulator = transport.clone();
    let event = ElementEvent::new(name.as_str(), EventKind::Distance).with_value(DistanceZone::Near);
    tokio::spawn(async move {
        sleep(Duration::from_millis(300)).await;
        simulator.emit(event);
    });

    match distance
        .wait_for_distance_event(DistanceZone::Near, Some(Duration::from_secs(5)))
        .await
    {
        Ok(()) => log::info!("Got NEAR event after wait for"),
        Err(e) => log::error!("Wait for NEAR failed: {}", e),
    }

    batch.release().await?;
    session.close().await
}
