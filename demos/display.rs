//! This example listens for double tap and flip gestures on a display element
//! and then shows images, text and background colors.

use plezmo_session::elements::display::{
    DisplayColor, DisplayImage, DisplayLine, Flip, FontSize, TextAlignment,
};
use plezmo_session::{
    ElementEvent, ElementType, Error, EventKind, MemoryTransport, Session, SessionConfig,
};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let name = std::env::args().nth(1).unwrap_or_else(|| "Display".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;
    let batch = session
        .connect_batch([(name.as_str(), ElementType::Display)])
        .await?;

    let display = session.display(name.as_str());
    display.on_double_tap(|_| {
        log::info!("Got double tap event");
        Ok(())
    })?;
    display.on_flip(Flip::Up, |_| {
        log::info!("Got flip UP event");
        Ok(())
    })?;
    display.on_flip(Flip::Down, |_| {
        log::info!("Got flip DOWN event");
        Ok(())
    })?;

    transport.emit(ElementEvent::new(name.as_str(), EventKind::DoubleTap));
    transport.emit(ElementEvent::new(name.as_str(), EventKind::Flip).with_value(Flip::Down));
    sleep(Duration::from_millis(100)).await;

    log::info!("Showing INBOX image");
    display.show_image(DisplayImage::Inbox).await?;
    display.clear().await?;

    log::info!("Showing text");
    display
        .show_text(DisplayLine::Two, TextAlignment::Center, "Hola!")
        .await?;
    display.clear().await?;

    display.set_font_size(FontSize::Medium).await?;
    display.set_text_color(DisplayColor::Red).await?;
    display
        .show_text(DisplayLine::Two, TextAlignment::Center, "RED!")
        .await?;

    log::info!("Painting background BLUE");
    display.paint_background(DisplayColor::Blue).await?;

    batch.release().await?;
    session.close().await
}
