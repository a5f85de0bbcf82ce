//! This example discovers nearby elements and connects to the first one.

use plezmo_session::{
    DiscoveredElement, ElementType, Error, MemoryTransport, Session, SessionConfig,
};
use tokio::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    let transport = MemoryTransport::new();
    transport.add_discoverable(DiscoveredElement {
        name: "Light".to_string(),
        mac: "C0:FF:EE:00:00:01".to_string(),
        element_type: ElementType::Light,
    });

    let session = Session::start(transport, SessionConfig::default()).await?;

    let elements = session.discover(Duration::from_secs(5)).await?;
    if let Some(element) = elements.first() {
        log::info!("Connecting to first element {:?}", element);
        session.connect(&element.name, element.element_type).await?;
        log::info!("Connected elements {:?}", session.connected_elements());
        session.disconnect(&element.name).await?;
    }

    session.close().await
}
