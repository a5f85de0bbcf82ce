//! This example listens for color and light level changes on a color sensor,
//! reads its light values and then waits for specific changes.

use plezmo_session::elements::color::{LightComponent, LightLevel, SensorColor};
use plezmo_session::elements::light::Percentage;
use plezmo_session::{
    ElementEvent, ElementType, Error, EventKind, MemoryTransport, Response, Session,
    SessionConfig,
};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let name = std::env::args().nth(1).unwrap_or_else(|| "Color".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;
    let batch = session
        .connect_batch([(name.as_str(), ElementType::Color)])
        .await?;

    let color = session.color(name.as_str());
    color.on_color_change(SensorColor::Green, |_| {
        log::info!("Got GREEN color");
        Ok(())
    })?;
    color.on_color_change(SensorColor::Red, |_| {
        log::info!("Got RED color");
        Ok(())
    })?;
    color.on_light_event(LightLevel::Dark, |_| {
        log::info!("It got DARK");
        Ok(())
    })?;
    color.on_light_event(LightLevel::Bright, |_| {
        log::info!("It got BRIGHT");
        Ok(())
    })?;

    let change = |value: SensorColor| {
        ElementEvent::new(name.as_str(), EventKind::ColorChange).with_value(value)
    };
    transport.emit(change(SensorColor::Green));
    transport.emit(ElementEvent::new(name.as_str(), EventKind::LightLevel).with_value(LightLevel::Dark));
    sleep(Duration::from_millis(100)).await;

    transport.push_response(name.as_str(), Response::Lux(320.5));
    transport.push_response(name.as_str(), Response::Lux(88.0));
    transport.push_response(name.as_str(), Response::Percent(Percentage::new(42)?));
    transport.push_response(name.as_str(), Response::Color(SensorColor::Blue));
    log::info!("Light value {} lux", color.get_light_value_lux().await?);
    log::info!(
        "Green component {} lux",
        color.get_light_component_lux(LightComponent::Green).await?
    );
    log::info!("Light value {}%", color.get_light_value_percent().await?);
    log::info!("Current color {:?}", color.get_color().await?);

    let simulator = transport.clone();
    let events = [
        change(SensorColor::Yellow),
        change(SensorColor::Red),
        ElementEvent::new(name.as_str(), EventKind::LightLevel).with_value(LightLevel::Dark),
    ];
    tokio::spawn(async move {
        for event in events {
            sleep(Duration::from_millis(200)).await;
            simulator.emit(event);
        }
    });

    let timeout = Some(Duration::from_secs(5));
    log::info!("Color changed to {:?}", color.wait_for_color_change(timeout).await?);
    color.wait_for_color_to_change_to(SensorColor::Red, timeout).await?;
    log::info!("Color changed to RED");
    color.wait_for_light_event(LightLevel::Dark, timeout).await?;
    log::info!("Light level changed to DARK");

    batch.release().await?;
    session.close().await
}
