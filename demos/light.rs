//! This example runs a light element through its commands: turn on, switch
//! off, recolor, fade in and out, and read back its state.

use plezmo_session::elements::light::{FadeSpeed, LightColor, LightState, Percentage};
use plezmo_session::{ElementType, Error, MemoryTransport, Response, Session, SessionConfig};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let name = std::env::args().nth(1).unwrap_or_else(|| "Light".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;
    let batch = match session.connect_batch([(name.as_str(), ElementType::Light)]).await {
        Ok(batch) => batch,
        Err(e) => {
            log::error!("Could not connect to all the required elements: {}", e);
            return session.close().await;
        }
    };

    let light = session.light(name.as_str());
    let red: LightColor = "#FF0000".parse()?;

    log::info!("Turning light on with RED color, 100% brightness");
    light.turn_on(red, Percentage::new(100)?).await?;
    sleep(Duration::from_millis(500)).await;

    log::info!("Turning light off");
    light.set_state(LightState::Off).await?;

    log::info!("Turning light on with BLUE color, 10% brightness");
    light.set_color("#0000FF".parse()?).await?;
    light.set_brightness(Percentage::new(10)?).await?;
    light.set_state(LightState::On).await?;
    sleep(Duration::from_millis(500)).await;

    log::info!("Fading in to RED, then fading out");
    light.fade_in(Percentage::new(100)?, red, FadeSpeed::Fast).await?;
    light.fade_out(FadeSpeed::Slow).await?;

    transport.push_response(name.as_str(), Response::Percent(Percentage::new(0)?));
    transport.push_response(name.as_str(), Response::LightColor(red));
    transport.push_response(name.as_str(), Response::LightState(LightState::Off));
    log::info!(
        "Brightness {}%, color {}, state {:?}",
        light.get_brightness().await?.value(),
        light.get_color().await?,
        light.get_state().await?
    );

    batch.release().await?;
    session.close().await
}
