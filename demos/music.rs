//! This example plays audio clips, buzzes and notes on a music element and
//! reads back its settings.

use plezmo_session::elements::music::{Audio, AudioLoop, Instrument, Note, Tempo, Volume};
use plezmo_session::{ElementType, Error, MemoryTransport, Response, Session, SessionConfig};
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    plezmo_session::register_exception_handler(|e| log::info!("###### Got exception {}", e));

    let name = std::env::args().nth(1).unwrap_or_else(|| "Music".to_string());

    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), SessionConfig::default()).await?;
    let batch = session
        .connect_batch([(name.as_str(), ElementType::Music)])
        .await?;

    let music = session.music(name.as_str());

    log::info!("Playing PIANO_LOOP_2 at LOW volume");
    music.set_volume(Volume::Low).await?;
    music.play_audio(Audio::PianoLoop2).await?;

    if let Err(e) = music
        .play_audio_and_continue(Audio::PianoLoop1, AudioLoop::Once)
        .await
    {
        log::warn!("Could not start PIANO_LOOP_1: {}", e);
    }
    sleep(Duration::from_millis(300)).await;
    music.stop().await?;

    log::info!("Buzzing");
    music.start_buzzing().await?;
    sleep(Duration::from_millis(300)).await;
    music.stop_buzzing().await?;

    let note = Note::new(66)?;
    music.play_note(note, 1).await?;
    music.set_instrument(Instrument::Flute).await?;
    music.set_tempo(Tempo::Medium).await?;
    music.set_volume(Volume::High).await?;

    transport.push_response(name.as_str(), Response::Instrument(Instrument::Flute));
    transport.push_response(name.as_str(), Response::Tempo(Tempo::Medium));
    transport.push_response(name.as_str(), Response::Volume(Volume::High));
    log::info!(
        "Instrument {:?}, tempo {:?}, volume {:?}",
        music.get_instrument().await?,
        music.get_tempo().await?,
        music.get_volume().await?
    );

    music.play_note(note, 3).await?;

    batch.release().await?;
    session.close().await
}
