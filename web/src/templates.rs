//! HTML pages.
//!
//! Templates are embedded at compile time and filled by plain `{{name}}`
//! substitution. Every interpolated value goes through [`escape_html`]
//! unless it was built here from already escaped parts.

use kana_classifier::{Kana, Prediction, WeightsSource};

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const RESULT_TEMPLATE: &str = include_str!("../templates/result.html");

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn render(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |page, (name, value)| {
        page.replace(&format!("{{{{{}}}}}", name), value)
    })
}

fn weights_notice(weights: &WeightsSource) -> String {
    match weights {
        WeightsSource::Pretrained { .. } => String::new(),
        WeightsSource::Untrained => {
            r#"<p class="notice">No trained weights are loaded; predictions are not meaningful.</p>"#
                .to_string()
        }
    }
}

/// The upload form.
pub fn index_page(weights: &WeightsSource) -> String {
    let classes: String = Kana::ALL
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    render(
        INDEX_TEMPLATE,
        &[
            ("classes", escape_html(&classes)),
            ("weights_notice", weights_notice(weights)),
        ],
    )
}

/// The result page for one prediction.
pub fn result_page(image_path: &str, prediction: &Prediction, weights: &WeightsSource) -> String {
    let ranking = prediction
        .ranked()
        .into_iter()
        .map(|(kana, p)| {
            format!(
                "                <tr><td>{} ({})</td><td>{:.2}%</td></tr>",
                escape_html(&kana.to_string()),
                kana.romaji(),
                p * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    render(
        RESULT_TEMPLATE,
        &[
            ("image_path", escape_html(image_path)),
            ("predicted_class", escape_html(&prediction.class.to_string())),
            ("romaji", prediction.class.romaji().to_string()),
            ("confidence", prediction.confidence_label()),
            ("weights_notice", weights_notice(weights)),
            ("ranking", ranking),
        ],
    )
}
