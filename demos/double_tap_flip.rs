//! This example uses the gestures of a light element: a double tap cycles it
//! through the rainbow, flipping it up turns it red and flipping it down
//! turns it off.

use plezmo_session::elements::display::Flip;
use plezmo_session::elements::light::{LightColor, LightState, Percentage};
use plezmo_session::elements::Light;
use plezmo_session::{
    ElementEvent, ElementType, Error, EventKind, MemoryTransport, Session, SessionConfig,
};
use tokio::time::{sleep, Duration};

const RAINBOW: [LightColor; 6] = [
    LightColor::rgb(0x94, 0x00, 0xD3),
    LightColor::rgb(0x00, 0x00, 0xFF),
    LightColor::rgb(0x00, 0xFF, 0x00),
    LightColor::rgb(0xFF, 0xFF, 0x00),
    LightColor::rgb(0xFF, 0x7F, 0x00),
    LightColor::rgb(0xFF, 0x00, 0x00),
];

async fn cycle(light: Light) -> Result<(), Error> {
    let brightness = Percentage::new(100)?;
    for color in RAINBOW {
        light.turn_on(color, brightness).await?;
        sleep(Duration::from_millis(200)).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let name = std::env::args().nth(1).unwrap_or_else(|| "Light".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;
    let batch = session
        .connect_batch([(name.as_str(), ElementType::Light)])
        .await?;

    let light = session.light(name.as_str());
    // Gestures are reported by the light itself
    let gestures = session.display(name.as_str());

    let tapped = light.clone();
    gestures.on_double_tap(move |_| {
        log::info!("Got double tap event");
        let light = tapped.clone();
        tokio::spawn(async move {
            if let Err(e) = cycle(light).await {
                log::error!("Rainbow failed: {}", e);
            }
        });
        Ok(())
    })?;

    let flipped = light.clone();
    gestures.on_flip(Flip::Up, move |_| {
        log::info!("Got flip UP event");
        let light = flipped.clone();
        tokio::spawn(async move {
            let brightness = Percentage::new(100)?;
            light.turn_on(RAINBOW[5], brightness).await
        });
        Ok(())
    })?;

    let flipped = light.clone();
    gestures.on_flip(Flip::Down, move |_| {
        log::info!("Got flip DOWN event");
        let light = flipped.clone();
        tokio::spawn(async move { light.set_state(LightState::Off).await });
        Ok(())
    })?;

    light.turn_on(RAINBOW[5], Percentage::new(100)?).await?;

    transport.emit(ElementEvent::new(name.as_str(), EventKind::DoubleTap));
    sleep(Duration::from_millis(1500)).await;
    transport.emit(ElementEvent::new(name.as_str(), EventKind::Flip).with_value(Flip::Down));
    sleep(Duration::from_millis(200)).await;
    transport.emit(ElementEvent::new(name.as_str(), EventKind::Flip).with_value(Flip::Up));
    sleep(Duration::from_millis(200)).await;

    batch.release().await?;
    session.close().await
}
