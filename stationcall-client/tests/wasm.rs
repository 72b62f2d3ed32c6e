#![cfg(target_arch = "wasm32")]

use stationcall_client::{platform, EventBus, SessionEvent, SessionState};
use wasm_bindgen_test::*;

// Configure wasm_bindgen_test to use the browser (headless) test runner
wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn now_ms_reads_the_browser_clock() {
    assert!(platform::now_ms() > 1_000_000_000_000.0);
}

#[wasm_bindgen_test]
async fn event_bus_delivers_in_the_browser() {
    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    bus.emit(SessionEvent::StateChanged(SessionState::Authenticating));
    assert_eq!(
        rx.recv().await,
        Ok(SessionEvent::StateChanged(SessionState::Authenticating))
    );
}
