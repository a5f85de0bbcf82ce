//! Tests for Session

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{join, join3};
use serial_test::serial;

use super::*;
use crate::elements::color::SensorColor;
use crate::elements::distance::DistanceZone;
use crate::elements::motor::{MotorCommand, MotorDirection, MotorSpeed};
use crate::memory::{MemoryTransport, TransportCall};

async fn start_with(config: SessionConfig) -> (Session, MemoryTransport) {
    let transport = MemoryTransport::new();
    let session = Session::start(transport.clone(), config).await.unwrap();
    (session, transport)
}

async fn start() -> (Session, MemoryTransport) {
    start_with(SessionConfig::default()).await
}

fn collect_exceptions() -> Arc<std::sync::Mutex<Vec<String>>> {
    let exceptions = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = exceptions.clone();
    crate::register_exception_handler(move |e| {
        sink.lock().unwrap().push(e.to_string());
    });
    exceptions
}

fn stall(element: &str) -> ElementEvent {
    ElementEvent::new(element, EventKind::Stall)
}

#[tokio::test]
async fn test_connect_batch() {
    let (session, transport) = start().await;

    let batch = session
        .connect_batch([("Color", ElementType::Color), ("Motor", ElementType::Motor)])
        .await
        .unwrap();

    assert_eq!(batch.names().collect::<Vec<_>>(), vec!["Color", "Motor"]);
    assert_eq!(session.state("Color"), ConnectionState::Connected);
    assert_eq!(session.state("Motor"), ConnectionState::Connected);
    assert_eq!(
        session.connected_elements(),
        vec![
            ElementSpec::new("Color", ElementType::Color),
            ElementSpec::new("Motor", ElementType::Motor),
        ]
    );
    assert!(transport.is_connected("Color"));
    assert!(transport.is_connected("Motor"));

    batch.release().await.unwrap();
}

#[tokio::test]
async fn test_connect_batch_rolls_back_on_failure() {
    let (session, transport) = start().await;
    transport.fail_connect("Motor");

    let result = session
        .connect_batch([
            ("Color", ElementType::Color),
            ("Light", ElementType::Light),
            ("Motor", ElementType::Motor),
            ("Music", ElementType::Music),
        ])
        .await;

    assert!(matches!(
        result,
        Err(Error::ConnectionFailure { ref name, .. }) if name == "Motor"
    ));
    assert_eq!(session.state("Color"), ConnectionState::Disconnected);
    assert_eq!(session.state("Light"), ConnectionState::Disconnected);
    assert_eq!(session.state("Motor"), ConnectionState::Failed);
    assert_eq!(session.state("Music"), ConnectionState::Disconnected);
    assert!(session.connected_elements().is_empty());

    assert_eq!(
        transport.calls(),
        vec![
            TransportCall::Connect("Color".to_string(), ElementType::Color),
            TransportCall::Connect("Light".to_string(), ElementType::Light),
            TransportCall::Connect("Motor".to_string(), ElementType::Motor),
            TransportCall::Disconnect("Color".to_string()),
            TransportCall::Disconnect("Light".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_rollback_failures_are_not_escalated() {
    let (session, transport) = start().await;
    transport.fail_connect("Motor");
    transport.fail_disconnect("Color");

    let result = session
        .connect_batch([
            ("Color", ElementType::Color),
            ("Light", ElementType::Light),
            ("Motor", ElementType::Motor),
        ])
        .await;

    assert!(matches!(result, Err(Error::ConnectionFailure { .. })));
    assert_eq!(session.state("Color"), ConnectionState::Disconnected);
    assert_eq!(session.state("Light"), ConnectionState::Disconnected);
    assert!(!transport.is_connected("Light"));
}

#[tokio::test]
async fn test_connect_twice_is_noop() {
    let (session, transport) = start().await;

    session.connect("Motor", ElementType::Motor).await.unwrap();
    session.connect("Motor", ElementType::Motor).await.unwrap();

    assert_eq!(transport.calls().len(), 1);
    assert!(matches!(
        session.connect("Motor", ElementType::Light).await,
        Err(Error::WrongElementType { .. })
    ));
}

#[tokio::test]
async fn test_disconnect_failed_element() {
    let (session, transport) = start().await;
    transport.fail_connect("Motor");

    assert!(session.connect("Motor", ElementType::Motor).await.is_err());
    assert_eq!(session.state("Motor"), ConnectionState::Failed);

    session.disconnect("Motor").await.unwrap();
    assert_eq!(session.state("Motor"), ConnectionState::Disconnected);
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Connect("Motor".to_string(), ElementType::Motor)]
    );
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let (session, transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();

    session.disconnect("Motor").await.unwrap();
    session.disconnect("Motor").await.unwrap();
    session.disconnect("Unknown").await.unwrap();

    assert_eq!(session.state("Motor"), ConnectionState::Disconnected);
    assert_eq!(
        transport
            .calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::Disconnect(_)))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_disconnect_removes_subscriptions() {
    let (session, _transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    session
        .subscribe("Motor", EventKind::Stall, EventFilter::Any, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    session.disconnect("Motor").await.unwrap();
    session.connect("Motor", ElementType::Motor).await.unwrap();
    session.dispatch(stall("Motor"));

    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(session.inner.registry.lock().subscription_count(), 0);
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let (session, _transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let id = session
        .subscribe("Motor", EventKind::Stall, EventFilter::Any, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    session.dispatch(stall("Motor"));
    assert!(session.unsubscribe(id));
    session.dispatch(stall("Motor"));

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!session.unsubscribe(id));
}

#[tokio::test]
async fn test_subscribe_to_unknown_element() {
    let (session, _transport) = start().await;

    let result = session.subscribe("Motor", EventKind::Stall, EventFilter::Any, |_| Ok(()));
    assert!(matches!(result, Err(Error::UnknownElement(_))));
}

#[tokio::test]
async fn test_dispatch_order() {
    let (session, _transport) = start().await;
    session.connect("Color", ElementType::Color).await.unwrap();

    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    for label in ["A", "B", "C"] {
        let order = order.clone();
        session
            .subscribe("Color", EventKind::ColorChange, EventFilter::Any, move |_| {
                order.lock().unwrap().push(label);
                Ok(())
            })
            .unwrap();
    }

    session.dispatch(ElementEvent::new("Color", EventKind::ColorChange).with_value(SensorColor::Red));

    assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
}

#[tokio::test]
#[serial]
async fn test_callback_failure_is_isolated() {
    let exceptions = collect_exceptions();
    let (session, _transport) = start().await;
    session.connect("Color", ElementType::Color).await.unwrap();

    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let log = order.clone();
    session
        .subscribe("Color", EventKind::ColorChange, EventFilter::Any, move |_| {
            log.lock().unwrap().push("A");
            Ok(())
        })
        .unwrap();
    session
        .subscribe("Color", EventKind::ColorChange, EventFilter::Any, |_| {
            Err("sensor handler failed".into())
        })
        .unwrap();
    let log = order.clone();
    session
        .subscribe("Color", EventKind::ColorChange, EventFilter::Any, move |_| {
            log.lock().unwrap().push("C");
            Ok(())
        })
        .unwrap();

    session.dispatch(ElementEvent::new("Color", EventKind::ColorChange));

    assert_eq!(*order.lock().unwrap(), vec!["A", "C"]);
    let exceptions = exceptions.lock().unwrap().clone();
    assert_eq!(exceptions.len(), 1);
    assert!(exceptions[0].contains("sensor handler failed"));

    crate::clear_exception_handler();
}

#[tokio::test]
#[serial]
async fn test_panicking_callback_is_isolated() {
    let exceptions = collect_exceptions();
    let (session, _transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    session
        .subscribe("Motor", EventKind::Stall, EventFilter::Any, |_| {
            panic!("stall handler panicked")
        })
        .unwrap();
    let counter = fired.clone();
    session
        .subscribe("Motor", EventKind::Stall, EventFilter::Any, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    session.dispatch(stall("Motor"));

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    let exceptions = exceptions.lock().unwrap().clone();
    assert_eq!(exceptions.len(), 1);
    assert!(exceptions[0].contains("stall handler panicked"));

    crate::clear_exception_handler();
}

#[tokio::test]
async fn test_wait_for_event() {
    let (session, _transport) = start().await;
    session.connect("Distance", ElementType::Distance).await.unwrap();

    let near = ElementEvent::new("Distance", EventKind::Distance).with_value(DistanceZone::Near);
    let far = ElementEvent::new("Distance", EventKind::Distance).with_value(DistanceZone::Far);

    let (result, _) = join(
        session.wait_for_event(
            "Distance",
            EventKind::Distance,
            EventFilter::value(DistanceZone::Near),
            None,
        ),
        async {
            session.dispatch(far.clone());
            session.dispatch(near.clone());
        },
    )
    .await;

    assert_eq!(result.unwrap(), near);
    assert_eq!(session.inner.registry.lock().wait_count(), 0);
}

#[tokio::test]
async fn test_waits_are_resolved_independently() {
    let (session, _transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();

    let waits = join(
        session.wait_for_event("Motor", EventKind::Stall, EventFilter::Any, None),
        session.wait_for_event("Motor", EventKind::Stall, EventFilter::Any, None),
    );
    let ((first, second), _) = join(waits, async { session.dispatch(stall("Motor")) }).await;

    assert_eq!(first.unwrap(), stall("Motor"));
    assert_eq!(second.unwrap(), stall("Motor"));
}

#[tokio::test]
async fn test_wait_timeout() {
    let (session, _transport) = start().await;
    session.connect("Distance", ElementType::Distance).await.unwrap();

    let timeout = Duration::from_millis(30);
    let started = tokio::time::Instant::now();
    let result = session
        .wait_for_event("Distance", EventKind::Distance, EventFilter::Any, Some(timeout))
        .await;

    assert!(started.elapsed() >= timeout);
    assert!(matches!(result, Err(Error::Timeout { after, .. }) if after == timeout));
    assert_eq!(session.inner.registry.lock().wait_count(), 0);
}

#[tokio::test]
async fn test_timed_out_wait_does_not_fire_late() {
    let (session, _transport) = start().await;
    session.connect("Distance", ElementType::Distance).await.unwrap();

    let resolved = Arc::new(AtomicUsize::new(0));
    let counter = resolved.clone();
    let waiter = session.clone();
    let handle = tokio::spawn(async move {
        let result = waiter
            .wait_for_event(
                "Distance",
                EventKind::Distance,
                EventFilter::Any,
                Some(Duration::from_millis(20)),
            )
            .await;
        if result.is_ok() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        result
    });

    tokio::time::sleep(Duration::from_millis(60)).await;
    session.dispatch(ElementEvent::new("Distance", EventKind::Distance));

    assert!(handle.await.unwrap().unwrap_err().is_timeout());
    assert_eq!(resolved.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wait_on_unknown_element() {
    let (session, _transport) = start().await;

    let result = session
        .wait_for_event("Motion", EventKind::Tilt, EventFilter::Any, None)
        .await;
    assert!(matches!(result, Err(Error::UnknownElement(_))));
}

#[tokio::test]
async fn test_disconnect_fails_pending_wait() {
    let (session, _transport) = start().await;
    session.connect("Motion", ElementType::Motion).await.unwrap();

    let (result, _) = join(
        session.wait_for_event("Motion", EventKind::Flat, EventFilter::Any, None),
        session.disconnect("Motion"),
    )
    .await;

    assert!(matches!(result, Err(Error::Disconnected(name)) if name == "Motion"));
}

#[tokio::test]
async fn test_send_command() {
    let (session, transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();

    session
        .motor("Motor")
        .start(MotorSpeed::High, MotorDirection::Clockwise)
        .await
        .unwrap();

    assert_eq!(
        transport.calls().last(),
        Some(&TransportCall::Command(
            "Motor".to_string(),
            Command::Motor(MotorCommand::Start {
                speed: MotorSpeed::High,
                direction: MotorDirection::Clockwise,
            })
        ))
    );
}

#[tokio::test]
async fn test_send_command_checks_element() {
    let (session, _transport) = start().await;

    assert!(matches!(
        session.motor("Motor").stop().await,
        Err(Error::UnknownElement(_))
    ));

    session.connect("Light", ElementType::Light).await.unwrap();
    assert!(matches!(
        session.motor("Light").stop().await,
        Err(Error::WrongElementType {
            expected: ElementType::Motor,
            actual: ElementType::Light,
            ..
        })
    ));
}

#[tokio::test]
async fn test_getters_parse_responses() {
    let (session, transport) = start().await;
    session.connect("Distance", ElementType::Distance).await.unwrap();

    transport.push_response("Distance", Response::DistanceCm(12.5));
    assert_eq!(
        session.distance("Distance").get_distance_cm().await.unwrap(),
        12.5
    );

    transport.push_response("Distance", Response::Angle(3));
    assert!(matches!(
        session.distance("Distance").get_distance_cm().await,
        Err(Error::UnexpectedResponse { .. })
    ));
}

#[tokio::test]
async fn test_command_timeout() {
    let (session, transport) =
        start_with(SessionConfig::default().command_timeout(Duration::from_millis(20))).await;
    session.connect("Motor", ElementType::Motor).await.unwrap();
    transport.delay_commands(Duration::from_millis(200));

    let result = session.motor("Motor").stop().await;

    assert!(result.unwrap_err().is_timeout());
    assert_eq!(session.state("Motor"), ConnectionState::Connected);
}

#[tokio::test]
async fn test_close() {
    let (session, transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();
    session.connect("Color", ElementType::Color).await.unwrap();

    let (wait, closed) = join(
        session.wait_for_event("Motor", EventKind::Stall, EventFilter::Any, None),
        session.close(),
    )
    .await;

    closed.unwrap();
    assert!(matches!(wait, Err(Error::SessionClosed)));
    assert!(session.is_closed());
    assert!(transport.is_closed());
    assert!(!transport.is_connected("Motor"));
    assert!(!transport.is_connected("Color"));
    assert_eq!(transport.calls().last(), Some(&TransportCall::Close));

    assert!(matches!(
        session.connect("Motor", ElementType::Motor).await,
        Err(Error::SessionClosed)
    ));
    assert!(matches!(
        session.subscribe("Motor", EventKind::Stall, EventFilter::Any, |_| Ok(())),
        Err(Error::SessionClosed)
    ));
    session.close().await.unwrap();
    session.disconnect("Motor").await.unwrap();
}

#[tokio::test]
async fn test_close_stops_listener() {
    let (session, transport) = start().await;
    session.close().await.unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!transport.emit(stall("Motor")));
}

#[tokio::test]
async fn test_dropped_batch_is_released() {
    let (session, transport) = start().await;

    let batch = session
        .connect_batch([("Color", ElementType::Color), ("Motor", ElementType::Motor)])
        .await
        .unwrap();
    drop(batch);

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(session.state("Color"), ConnectionState::Disconnected);
    assert_eq!(session.state("Motor"), ConnectionState::Disconnected);
    assert!(!transport.is_connected("Color"));
    assert!(!transport.is_connected("Motor"));
}

#[tokio::test]
async fn test_event_stream() {
    let (session, transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();

    let mut events = session.event_stream();
    transport.emit(stall("Unknown"));
    transport.emit(stall("Motor"));

    let event = tokio::time::timeout(Duration::from_secs(1), events.next())
        .await
        .unwrap();
    assert_eq!(event, Some(stall("Motor")));

    session.close().await.unwrap();
    assert_eq!(events.next().await, None);
}

#[tokio::test]
async fn test_discover() {
    let (session, transport) = start().await;
    let element = DiscoveredElement {
        name: "Motor-Kit11A".to_string(),
        mac: "C0:FF:EE:00:11:22".to_string(),
        element_type: ElementType::Motor,
    };
    transport.add_discoverable(element.clone());

    let found = session.discover(Duration::from_secs(5)).await.unwrap();
    assert_eq!(found, vec![element]);
}

#[tokio::test]
#[serial]
async fn test_stall_event_end_to_end() {
    let exceptions = collect_exceptions();
    let (session, transport) = start().await;

    let batch = session
        .connect_batch([("Color", ElementType::Color), ("Motor", ElementType::Motor)])
        .await
        .unwrap();

    let (stalls, mut stalled) = tokio::sync::mpsc::unbounded_channel();
    session
        .motor("Motor")
        .on_stall(move |event| {
            stalls.send(event.clone()).ok();
            Ok(())
        })
        .unwrap();

    assert!(transport.emit(stall("Motor")));

    let event = tokio::time::timeout(Duration::from_secs(1), stalled.recv())
        .await
        .unwrap();
    assert_eq!(event, Some(stall("Motor")));
    assert!(stalled.try_recv().is_err());

    assert_eq!(session.state("Color"), ConnectionState::Connected);
    assert_eq!(session.state("Motor"), ConnectionState::Connected);
    assert!(exceptions.lock().unwrap().is_empty());

    batch.release().await.unwrap();
    session.close().await.unwrap();
    crate::clear_exception_handler();
}

#[tokio::test]
async fn test_concurrent_connects_share_one_attempt() {
    let (session, transport) = start().await;
    transport.delay_connects(Duration::from_millis(20));

    let (first, second) = join(
        session.connect("Motor", ElementType::Motor),
        session.connect("Motor", ElementType::Motor),
    )
    .await;

    first.unwrap();
    second.unwrap();
    assert_eq!(session.state("Motor"), ConnectionState::Connected);
    assert!(transport.is_connected("Motor"));
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Connect("Motor".to_string(), ElementType::Motor)]
    );

    session.motor("Motor").stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_connects_share_failure() {
    let (session, transport) = start().await;
    transport.delay_connects(Duration::from_millis(20));
    transport.fail_connect("Motor");

    let (first, second) = join(
        session.connect("Motor", ElementType::Motor),
        session.connect("Motor", ElementType::Motor),
    )
    .await;

    assert!(matches!(first, Err(Error::ConnectionFailure { .. })));
    assert!(matches!(second, Err(Error::ConnectionFailure { .. })));
    assert_eq!(session.state("Motor"), ConnectionState::Failed);
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_disconnect_while_connecting() {
    let (session, transport) = start().await;
    transport.delay_connects(Duration::from_millis(20));

    let (connected, joined, disconnected) = join3(
        session.connect("Motor", ElementType::Motor),
        session.connect("Motor", ElementType::Motor),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            session.disconnect("Motor").await
        },
    )
    .await;

    assert!(matches!(connected, Err(Error::Disconnected(ref name)) if name == "Motor"));
    assert!(matches!(joined, Err(Error::Disconnected(ref name)) if name == "Motor"));
    disconnected.unwrap();
    assert_eq!(session.state("Motor"), ConnectionState::Disconnected);
    assert!(!transport.is_connected("Motor"));
}

#[tokio::test]
async fn test_reconnect_while_stale_connect_finishes() {
    let (session, transport) = start().await;
    transport.delay_connects(Duration::from_millis(20));

    let (stale, current) = join(session.connect("Motor", ElementType::Motor), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        session.disconnect("Motor").await.unwrap();
        session.connect("Motor", ElementType::Motor).await
    })
    .await;

    assert!(matches!(stale, Err(Error::Disconnected(_))));
    current.unwrap();
    assert_eq!(session.state("Motor"), ConnectionState::Connected);
    assert!(transport.is_connected("Motor"));
    session.motor("Motor").stop().await.unwrap();
}

#[tokio::test]
async fn test_close_while_connecting() {
    let (session, transport) = start().await;
    transport.delay_connects(Duration::from_millis(20));

    let (connected, closed) = join(session.connect("Motor", ElementType::Motor), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        session.close().await
    })
    .await;

    assert!(matches!(connected, Err(Error::Disconnected(_))));
    closed.unwrap();
    assert!(session.is_closed());
    assert_eq!(session.state("Motor"), ConnectionState::Disconnected);
    assert!(!transport.is_connected("Motor"));
}

#[tokio::test]
async fn test_batch_rollback_leaves_existing_connections() {
    let (session, transport) = start().await;
    session.connect("Color", ElementType::Color).await.unwrap();
    transport.fail_connect("Motor");

    let result = session
        .connect_batch([("Color", ElementType::Color), ("Motor", ElementType::Motor)])
        .await;

    assert!(matches!(result, Err(Error::ConnectionFailure { .. })));
    assert_eq!(session.state("Color"), ConnectionState::Connected);
    assert!(transport.is_connected("Color"));
    assert!(!transport
        .calls()
        .contains(&TransportCall::Disconnect("Color".to_string())));
}

#[tokio::test]
async fn test_batch_release_leaves_other_owners() {
    let (session, transport) = start().await;

    let first = session
        .connect_batch([("Color", ElementType::Color)])
        .await
        .unwrap();
    let second = session
        .connect_batch([("Color", ElementType::Color), ("Motor", ElementType::Motor)])
        .await
        .unwrap();
    assert_eq!(second.names().collect::<Vec<_>>(), vec!["Motor"]);

    second.release().await.unwrap();
    assert_eq!(session.state("Color"), ConnectionState::Connected);
    assert!(transport.is_connected("Color"));
    assert_eq!(session.state("Motor"), ConnectionState::Disconnected);

    first.release().await.unwrap();
    assert!(!transport.is_connected("Color"));
}

#[tokio::test]
async fn test_event_streams_end_on_close() {
    let (session, _transport) = start().await;

    for _ in 0..3 {
        drop(session.event_stream());
    }
    let mut events = session.event_stream();

    session.close().await.unwrap();
    assert_eq!(events.next().await, None);

    let mut late = session.event_stream();
    assert_eq!(late.next().await, None);
}

#[tokio::test]
async fn test_close_applies_disconnect_delay() {
    let config = SessionConfig::default().disconnect_delay(Duration::from_millis(30));
    let (session, _transport) = start_with(config).await;
    session.connect("Motor", ElementType::Motor).await.unwrap();
    session.connect("Color", ElementType::Color).await.unwrap();

    let started = tokio::time::Instant::now();
    session.close().await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_unsubscribe_during_dispatch_applies_to_next_event() {
    let (session, _transport) = start().await;
    session.connect("Motor", ElementType::Motor).await.unwrap();

    let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
    let later: Arc<std::sync::Mutex<Option<SubscriptionId>>> = Default::default();

    let (unsubscriber, log, target) = (session.clone(), calls.clone(), later.clone());
    session
        .subscribe("Motor", EventKind::Stall, EventFilter::Any, move |_| {
            log.lock().unwrap().push("first");
            if let Some(id) = target.lock().unwrap().take() {
                unsubscriber.unsubscribe(id);
            }
            Ok(())
        })
        .unwrap();

    let log = calls.clone();
    let id = session
        .subscribe("Motor", EventKind::Stall, EventFilter::Any, move |_| {
            log.lock().unwrap().push("second");
            Ok(())
        })
        .unwrap();
    *later.lock().unwrap() = Some(id);

    session.dispatch(stall("Motor"));
    session.dispatch(stall("Motor"));

    assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "first"]);
}
