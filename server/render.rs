/// Template renderer for the drawing page.
///
/// The page lives in `server/assets/index.html` and is embedded at compile
/// time. `{{TOKEN}}` placeholders carry the model dimensions and the framing
/// constants shared with `ferrite_mnist::data::preprocess`, so the browser
/// crops and scales a drawing exactly like the `classify` command does.

use ferrite_mnist::data::preprocess::{BOX_OFFSET, DIGIT_BOX, INK_THRESHOLD};
use ferrite_mnist::TwoLayerNet;

const TEMPLATE: &str = include_str!("assets/index.html");

pub fn render_index(model: &TwoLayerNet) -> String {
    let html = TEMPLATE
        .replace("{{INPUT_DIM}}", &model.input_dim().to_string())
        .replace("{{HIDDEN_DIM}}", &model.hidden_dim().to_string())
        .replace("{{NUM_CLASSES}}", &model.num_classes().to_string())
        .replace("{{DIGIT_BOX}}", &DIGIT_BOX.to_string())
        .replace("{{BOX_OFFSET}}", &BOX_OFFSET.to_string())
        .replace("{{INK_THRESHOLD}}", &INK_THRESHOLD.to_string());
    blank_remaining(html)
}

/// Replaces any `{{TOKEN}}` left over with an empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        match html[start..].find("}}") {
            Some(end) => html.replace_range(start..start + end + 2, ""),
            None => break,
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_carries_model_shape_and_framing_constants() {
        let html = render_index(&TwoLayerNet::default());
        assert!(html.contains("784 &rarr; 128 (ReLU) &rarr; 10"));
        assert!(html.contains("DIGIT_BOX = 22, BOX_OFFSET = 4, INK = 0.15"));
        assert!(html.contains("const NUM_CLASSES = 10;"));
        assert!(html.contains("fetch(\"/predict\""));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn unknown_tokens_are_blanked() {
        assert_eq!(blank_remaining("a{{X}}b{{Y}}c".to_owned()), "abc");
        assert_eq!(blank_remaining("open {{ only".to_owned()), "open {{ only");
    }
}
