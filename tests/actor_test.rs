use gesture_nav::actor::spawn_engine;
use gesture_nav::simulation::SimulatedPoseSource;
use gesture_nav::{
    GestureConfig, GestureEngine, NavigationCommand, NavigationSink, PoseFrame, PoseSource,
    SectionDeck,
};

fn engine() -> GestureEngine<SectionDeck> {
    let deck = SectionDeck::new(gesture_nav::config::default_sections()).unwrap();
    GestureEngine::new(GestureConfig::default(), deck)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn capture_thread_drives_engine_through_handle() {
    let (handle, task) = spawn_engine(engine());
    handle.enable().await.unwrap();

    let capture = handle.clone();
    let producer = std::thread::spawn(move || {
        let mut source = SimulatedPoseSource::from_script("right:1100", 16).unwrap();
        source.start().unwrap();
        while let Some(frame) = source.next_frame() {
            capture.observe_blocking(frame).unwrap();
        }
    });
    tokio::task::spawn_blocking(move || producer.join().unwrap())
        .await
        .unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.enabled);
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(snapshot.current_section, "Work Experience");

    let latest = handle.feedback().borrow().clone().unwrap();
    assert_eq!(latest.timestamp_ms, 68 * 16);
    assert_eq!(latest.current_index, 1);

    handle.shutdown().await.unwrap();
    let engine = task.await.unwrap();
    assert_eq!(engine.sink().current_index(), 1);
}

#[tokio::test]
async fn clicks_and_gestures_share_the_deck() {
    let (handle, task) = spawn_engine(engine());

    handle.click(NavigationCommand::Retreat).await.unwrap();
    handle.click(NavigationCommand::Retreat).await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().current_section, "Education");

    handle.enable().await.unwrap();
    let mut source = SimulatedPoseSource::from_script("left:1100", 16).unwrap();
    source.start().unwrap();
    while let Some(frame) = source.next_frame() {
        handle.observe(frame).await.unwrap();
    }

    handle.disable().await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.enabled);
    assert!(snapshot.state.is_none());
    assert_eq!(snapshot.current_section, "Work Experience");
    assert!(handle.feedback().borrow().is_none());

    drop(handle);
    let engine = task.await.unwrap();
    assert_eq!(engine.sink().current_index(), 1);
}

#[tokio::test]
async fn click_moves_the_page_shown_in_feedback() {
    let (handle, task) = spawn_engine(engine());
    handle.enable().await.unwrap();
    handle.observe(PoseFrame::empty(0)).await.unwrap();
    assert_eq!(handle.feedback().borrow().as_ref().unwrap().current_index, 0);

    handle.click(NavigationCommand::Advance).await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.current_index, 1);

    let latest = handle.feedback().borrow().clone().unwrap();
    assert_eq!(latest.current_index, 1);
    assert_eq!(latest.timestamp_ms, 0);
    assert!(latest.fired.is_none());

    handle.click(NavigationCommand::Retreat).await.unwrap();
    handle.click(NavigationCommand::Retreat).await.unwrap();
    handle.snapshot().await.unwrap();
    assert_eq!(handle.feedback().borrow().as_ref().unwrap().current_index, 3);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}
