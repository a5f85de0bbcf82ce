//! This example turns a motion sensor into a magic wand: tilting it changes
//! the color of a light, laying it flat turns the light off.

use plezmo_session::elements::light::{LightColor, LightState, Percentage};
use plezmo_session::elements::motion::Tilt;
use plezmo_session::elements::Light;
use plezmo_session::{
    ElementEvent, ElementType, Error, EventKind, MemoryTransport, Session, SessionConfig,
};
use tokio::time::{sleep, Duration};

fn show(light: &Light, color: LightColor) {
    let light = light.clone();
    tokio::spawn(async move {
        let result = match Percentage::new(100) {
            Ok(brightness) => light.turn_on(color, brightness).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            log::error!("Failed to turn on light: {}", e);
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;
    let batch = session
        .connect_batch([("Motion", ElementType::Motion), ("Light", ElementType::Light)])
        .await?;

    let motion = session.motion("Motion");
    let light = session.light("Light");

    for (tilt, color) in [
        (Tilt::Left, "#FF0000"),
        (Tilt::Right, "#00FF00"),
        (Tilt::Front, "#0000FF"),
        (Tilt::Back, "#FFFF00"),
    ] {
        let color: LightColor = color.parse()?;
        let light = light.clone();
        motion.on_tilt(tilt, move |_| {
            show(&light, color);
            Ok(())
        })?;
    }

    let off = light.clone();
    motion.on_flat(move |_| {
        let light = off.clone();
        tokio::spawn(async move { light.set_state(LightState::Off).await.ok() });
        Ok(())
    })?;

    for tilt in [Tilt::Left, Tilt::Front] {
        transport.emit(ElementEvent::new("Motion", EventKind::Tilt).with_value(tilt));
        sleep(Duration::from_millis(300)).await;
    }
    transport.emit(ElementEvent::new("Motion", EventKind::Flat));
    sleep(Duration::from_millis(300)).await;

    batch.release().await?;
    session.close().await
}
