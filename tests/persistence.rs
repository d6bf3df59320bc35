use std::io;
use std::sync::{Arc, Mutex};

use ferrite_mnist::{Matrix, NetError, TwoLayerNet};

/// Log sink shared between the subscriber and the test body.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn save_then_load_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("artifacts").join("model.json");

    let mut net = TwoLayerNet::new(784, 128, 10, 11);
    let x = Matrix::from_vec(2, 784, (0..2 * 784).map(|i| (i % 255) as f32 / 255.0).collect());
    net.train_step(&x, &[3, 7], 0.1);
    net.save(&path).unwrap();

    let loaded = TwoLayerNet::load(&path).unwrap();
    assert_eq!(loaded, net);
    assert_eq!(loaded.predict_proba(&x), net.predict_proba(&x));
    assert_eq!(loaded.predict(&x), net.predict(&x));
}

#[test]
fn architecture_comes_from_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.json");
    TwoLayerNet::new(5, 3, 4, 0).save(&path).unwrap();

    let loaded = TwoLayerNet::load(&path).unwrap();
    assert_eq!((loaded.input_dim(), loaded.hidden_dim(), loaded.num_classes()), (5, 3, 4));
}

#[test]
fn edited_bias_length_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    TwoLayerNet::new(6, 4, 3, 0).save(&path).unwrap();

    let mut json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    json["b1"] = serde_json::json!([0.0, 0.0]);
    std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

    match TwoLayerNet::load(&path).unwrap_err() {
        NetError::ShapeMismatch { name, .. } => assert_eq!(name, "b1"),
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }
}

#[test]
fn missing_entry_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, r#"{"W1": {"rows": 1, "cols": 1, "data": [1.0]}, "b1": [0.0]}"#).unwrap();
    assert!(matches!(TwoLayerNet::load(&path).unwrap_err(), NetError::Json(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TwoLayerNet::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, NetError::Io(_)));
}

#[test]
fn load_logs_the_model_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    TwoLayerNet::new(5, 3, 4, 0).save(&path).unwrap();

    let captured = Captured::default();
    let sink = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || TwoLayerNet::load(&path).unwrap());

    let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("loaded model"), "log was: {}", text);
    assert!(text.contains("input_dim=5") && text.contains("hidden_dim=3") && text.contains("num_classes=4"));
}
