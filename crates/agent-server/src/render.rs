//! HTML Rendering
//!
//! Server-side page for the form UI. Every user-supplied value goes through
//! `html_escape` before it reaches the markup.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use reno_advisor::{House, HouseNotice, RenovationShell, SaveOutcome, ShellState, TaskOutput};

/// Everything the page shows for one session
pub struct PageView<'a> {
    pub shell: &'a RenovationShell,
    pub houses: &'a [House],
    pub provider: &'a str,
    pub model: &'a str,
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:22rem;padding:1rem;background:#f3f3f3;min-height:100vh}\
main{flex:1;padding:1rem 2rem;max-width:50rem}\
textarea{width:100%;min-height:6rem}\
label{display:block;margin-top:.5rem}\
.error{color:#a00}.notice{color:#060}\
.result{border:1px solid #ccc;padding:1rem;margin-top:1rem}\
.response{white-space:pre-wrap}\
table{border-collapse:collapse;width:100%}td,th{text-align:left;padding:2px 4px}";

pub fn page(view: &PageView<'_>) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Home Renovation Assistant</title>");
    html.push_str(&format!("<style>{STYLE}</style></head><body>"));

    html.push_str(&sidebar(view));

    html.push_str("<main><h1>Home Renovation Assistant</h1>");
    html.push_str(&format!(
        "<p>Describe a renovation task. Model: {} via {}.</p>",
        text(view.model),
        text(view.provider)
    ));
    if !view.shell.has_agent() {
        html.push_str(&format!(
            "<p class=\"error\">{}</p>",
            text(&reno_advisor::ValidationError::MissingCredential.to_string())
        ));
    }
    html.push_str(&task_form(view));
    html.push_str(&result_panel(view.shell.state()));
    html.push_str("</main></body></html>");
    html
}

fn task_form(view: &PageView<'_>) -> String {
    let selected = view.shell.last_address().unwrap_or("");

    let mut options = format!(
        "<option value=\"\"{}>No address</option>",
        if selected.is_empty() { " selected" } else { "" }
    );
    for house in view.houses {
        options.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            attr(&house.address),
            if house.address == selected { " selected" } else { "" },
            text(&house.address)
        ));
    }

    let validation = match view.shell.state() {
        ShellState::CollectingInput { validation: Some(e) } => {
            format!("<p class=\"error\">{}</p>", text(&e.to_string()))
        }
        _ => String::new(),
    };

    format!(
        "<form method=\"post\" action=\"/run\">\
<label for=\"task\">Task description</label>\
<textarea id=\"task\" name=\"task\">{}</textarea>\
<label for=\"address\">House</label>\
<select id=\"address\" name=\"address\">{options}</select>\
<p><button type=\"submit\">Run assessment</button></p>{validation}</form>",
        text(view.shell.last_task())
    )
}

fn result_panel(state: &ShellState) -> String {
    match state {
        ShellState::DisplayingResult(output) => assessment(output),
        ShellState::DisplayingError(message) => format!(
            "<section class=\"result\"><h2>Assessment failed</h2><p class=\"error\">{}</p></section>",
            text(message)
        ),
        ShellState::Invoking => "<section class=\"result\"><p>Thinking...</p></section>".into(),
        ShellState::Idle | ShellState::CollectingInput { .. } => String::new(),
    }
}

fn assessment(output: &TaskOutput) -> String {
    format!(
        "<section class=\"result\"><h2>Assessment</h2>\
<p><strong>{}</strong></p>\
<p>Urgency: {}/10 <meter min=\"1\" max=\"10\" value=\"{}\"></meter></p>\
<div class=\"response\">{}</div></section>",
        pro_label(output.pro_required),
        output.urgency,
        output.urgency,
        text(&output.response_text)
    )
}

pub const fn pro_label(pro_required: bool) -> &'static str {
    if pro_required {
        "Professional recommended"
    } else {
        "DIY friendly"
    }
}

fn sidebar(view: &PageView<'_>) -> String {
    let mut rows = String::new();
    for house in view.houses {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>${}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            text(&house.address),
            house.price,
            house.num_bedrooms,
            house.num_bathrooms,
            house.square_feet
        ));
    }

    let notice = match view.shell.house_notice() {
        Some(HouseNotice::Saved { address, outcome }) => {
            let verb = match outcome {
                SaveOutcome::Inserted => "Added",
                SaveOutcome::Replaced => "Updated",
            };
            format!("<p class=\"notice\">{verb} {}.</p>", text(address))
        }
        Some(HouseNotice::Rejected(e)) => format!("<p class=\"error\">{}</p>", text(&e.to_string())),
        None => String::new(),
    };

    format!(
        "<aside><h2>Houses</h2>\
<table><tr><th>Address</th><th>Price</th><th>Bed</th><th>Bath</th><th>Sq ft</th></tr>{rows}</table>\
<h3>Add or update a house</h3>\
<form method=\"post\" action=\"/houses\">\
<label>Address <input name=\"address\"></label>\
<label>Price <input name=\"price\" inputmode=\"decimal\"></label>\
<label>Bedrooms <input name=\"bedrooms\" inputmode=\"numeric\"></label>\
<label>Bathrooms <input name=\"bathrooms\" inputmode=\"numeric\"></label>\
<label>Square feet <input name=\"square_feet\" inputmode=\"numeric\"></label>\
<p><button type=\"submit\">Save house</button></p></form>{notice}</aside>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reno_advisor::HouseStore;

    #[test]
    fn test_pro_label() {
        assert_eq!(pro_label(true), "Professional recommended");
        assert_eq!(pro_label(false), "DIY friendly");
    }

    #[test]
    fn test_assessment_is_escaped() {
        let html = assessment(&TaskOutput {
            response_text: "<b>Steps</b> & tips".into(),
            pro_required: true,
            urgency: 7,
        });
        assert!(html.contains("&lt;b&gt;Steps&lt;/b&gt; &amp; tips"));
        assert!(html.contains("Urgency: 7/10"));
        assert!(html.contains("Professional recommended"));
    }

    #[test]
    fn test_page_without_agent_warns() {
        let shell = RenovationShell::new(HouseStore::seeded(), None);
        let houses = reno_advisor::seed_houses();
        let html = page(&PageView {
            shell: &shell,
            houses: &houses,
            provider: "OpenAI",
            model: "gpt-4o",
        });

        assert!(html.contains("No model provider credential is configured"));
        assert!(html.contains("<option value=\"456 Oak Ave\">456 Oak Ave</option>"));
        assert!(html.contains("$350000"));
    }
}
