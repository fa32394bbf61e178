use super::*;

#[test]
fn configuration_message_names_the_problem() {
    let err = ParallaxError::Configuration("width and height are required".into());
    assert_eq!(err.to_string(), "invalid configuration: width and height are required");
}

#[test]
fn layer_load_message_names_the_layer() {
    let err = ParallaxError::LayerLoad { layer: "front".into(), cause: "404".into() };
    assert_eq!(err.to_string(), "failed to load layer \"front\": 404");
}

#[test]
fn runtime_draw_message_names_the_layer() {
    let err = ParallaxError::RuntimeDraw { layer: "middle".into(), cause: "hook threw".into() };
    assert_eq!(err.to_string(), "failed to draw layer \"middle\": hook threw");
}

#[test]
fn fatal_errors_are_construction_and_load() {
    assert!(ParallaxError::Configuration(String::new()).is_fatal());
    assert!(ParallaxError::LayerLoad { layer: String::new(), cause: String::new() }.is_fatal());
    assert!(!ParallaxError::RuntimeDraw { layer: String::new(), cause: String::new() }.is_fatal());
    assert!(!ParallaxError::Surface(String::new()).is_fatal());
    assert!(!ParallaxError::NotInitialized.is_fatal());
    assert!(!ParallaxError::AlreadyInitialized.is_fatal());
    assert!(ParallaxError::Destroyed.is_fatal());
}
