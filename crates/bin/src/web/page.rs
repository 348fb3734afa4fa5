//! HTML for the prediction form.

use incomeclass::output::DOWNLOAD_FILE_NAME;
use incomeclass::{CategoricalField, EncodingSchema, FeatureRecord, NumericField, Prediction};
use std::fmt::Write;

/// What to show under the form.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Outcome<'a> {
    /// Nothing submitted yet.
    Empty,
    /// A successful prediction.
    Prediction(&'a Prediction),
    /// Messages explaining why no prediction was made.
    Problems(&'a [String]),
}

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 760px; margin: 2em auto; color: #222; }
label { display: block; margin-top: 0.8em; font-weight: bold; }
input, select { width: 100%; padding: 0.3em; }
button { margin-top: 1.2em; padding: 0.5em 1.2em; }
table { border-collapse: collapse; margin-top: 0.5em; }
td, th { border: 1px solid #ccc; padding: 0.2em 0.6em; text-align: left; }
.success { background: #e6f4ea; border: 1px solid #34a853; padding: 0.8em; margin-top: 1em; }
.problems { background: #fdecea; border: 1px solid #d93025; padding: 0.8em; margin-top: 1em; }
"#;

const BATCH_SCRIPT: &str = r#"
const PREVIEW_ROWS = 5;
const upload = document.getElementById("batch-file");
const status = document.getElementById("batch-status");
const inputPreview = document.getElementById("batch-input-preview");
const outputPreview = document.getElementById("batch-output-preview");
const download = document.getElementById("batch-download");

function showPreview(container, caption, csv) {
  container.replaceChildren();
  const lines = csv.trim().split(/\r?\n/).slice(0, PREVIEW_ROWS + 1);
  const heading = document.createElement("p");
  heading.textContent = caption;
  const table = document.createElement("table");
  lines.forEach((line, i) => {
    const tr = document.createElement("tr");
    for (const cell of line.split(",")) {
      const td = document.createElement(i === 0 ? "th" : "td");
      td.textContent = cell;
      tr.appendChild(td);
    }
    table.appendChild(tr);
  });
  container.append(heading, table);
}

upload.addEventListener("change", async () => {
  const file = upload.files[0];
  if (!file) { return; }
  const input = await file.text();
  showPreview(inputPreview, "Uploaded data preview:", input);
  outputPreview.replaceChildren();
  status.textContent = "Predicting...";
  download.hidden = true;
  const response = await fetch("/batch", {
    method: "POST",
    headers: { "Content-Type": "text/csv" },
    body: input,
  });
  const text = await response.text();
  if (!response.ok) {
    status.textContent = text;
    return;
  }
  const rows = text.trim().split(/\r?\n/);
  status.textContent = "Predictions: " + (rows.length - 1) + " rows";
  showPreview(outputPreview, "Predictions:", text);
  download.href = URL.createObjectURL(new Blob([text], { type: "text/csv" }));
  download.hidden = false;
});
"#;

/// Escape text for use in element content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render the whole page with `record` preselected in the form.
pub(crate) fn render(schema: &EncodingSchema, record: &FeatureRecord, outcome: Outcome<'_>) -> String {
    let mut html = String::new();
    // Writing into a String cannot fail.
    write_page(&mut html, schema, record, outcome).ok();
    html
}

fn write_page(
    out: &mut String,
    schema: &EncodingSchema,
    record: &FeatureRecord,
    outcome: Outcome<'_>,
) -> std::fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\"><head><meta charset=\"utf-8\">")?;
    writeln!(out, "<title>Employee Salary Classification</title>")?;
    writeln!(out, "<style>{STYLE}</style></head><body>")?;
    writeln!(out, "<h1>Employee Salary Classification</h1>")?;
    writeln!(
        out,
        "<p>Predict whether an employee earns &gt;50K or &lt;=50K based on input features.</p>"
    )?;

    writeln!(out, "<form method=\"post\" action=\"/predict\">")?;
    write_number(out, NumericField::Age, record)?;
    write_select(out, schema, CategoricalField::Workclass, record)?;
    write_number(out, NumericField::Fnlwgt, record)?;
    write_number(out, NumericField::EducationalNum, record)?;
    for field in [
        CategoricalField::MaritalStatus,
        CategoricalField::Occupation,
        CategoricalField::Relationship,
        CategoricalField::Race,
        CategoricalField::Gender,
    ] {
        write_select(out, schema, field, record)?;
    }
    for field in [
        NumericField::CapitalGain,
        NumericField::CapitalLoss,
        NumericField::HoursPerWeek,
    ] {
        write_number(out, field, record)?;
    }
    write_select(out, schema, CategoricalField::NativeCountry, record)?;
    writeln!(out, "<button type=\"submit\">Predict Salary Class</button>")?;
    writeln!(out, "</form>")?;

    match outcome {
        Outcome::Empty => {}
        Outcome::Prediction(prediction) => {
            writeln!(
                out,
                "<div class=\"success\" id=\"prediction\">Prediction: <strong>{}</strong> \
                 (probability of &gt;50K: {:.3})</div>",
                escape(&prediction.bracket.to_string()),
                prediction.probability
            )?;
        }
        Outcome::Problems(problems) => {
            writeln!(out, "<div class=\"problems\" id=\"problems\"><ul>")?;
            for problem in problems {
                writeln!(out, "<li>{}</li>", escape(problem))?;
            }
            writeln!(out, "</ul></div>")?;
        }
    }

    writeln!(out, "<h2>Input Data</h2>")?;
    writeln!(out, "<table><tr>")?;
    for name in incomeclass::schema::feature_column_names() {
        write!(out, "<th>{}</th>", escape(name))?;
    }
    writeln!(out, "</tr><tr>")?;
    for cell in record.to_row() {
        write!(out, "<td>{}</td>", escape(&cell))?;
    }
    writeln!(out, "</tr></table>")?;

    writeln!(out, "<hr><h2>Batch Prediction</h2>")?;
    writeln!(
        out,
        "<label for=\"batch-file\">Upload a CSV file for batch prediction</label>"
    )?;
    writeln!(out, "<input type=\"file\" id=\"batch-file\" accept=\".csv,text/csv\">")?;
    writeln!(out, "<div id=\"batch-input-preview\"></div>")?;
    writeln!(out, "<p id=\"batch-status\"></p>")?;
    writeln!(out, "<div id=\"batch-output-preview\"></div>")?;
    writeln!(
        out,
        "<a id=\"batch-download\" download=\"{DOWNLOAD_FILE_NAME}\" hidden>Download Predictions CSV</a>"
    )?;
    writeln!(out, "<script>{BATCH_SCRIPT}</script>")?;
    writeln!(out, "</body></html>")
}

fn write_number(out: &mut String, field: NumericField, record: &FeatureRecord) -> std::fmt::Result {
    let bounds = field.bounds();
    writeln!(
        out,
        "<label for=\"{name}\">{caption}</label>\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" \
         step=\"1\" value=\"{value}\">",
        name = field.column(),
        caption = escape(field.caption()),
        min = bounds.min,
        max = bounds.max,
        value = record.numeric(field),
    )
}

fn write_select(
    out: &mut String,
    schema: &EncodingSchema,
    field: CategoricalField,
    record: &FeatureRecord,
) -> std::fmt::Result {
    let name = field.column();
    writeln!(
        out,
        "<label for=\"{name}\">{}</label><select id=\"{name}\" name=\"{name}\">",
        escape(field.caption())
    )?;

    let current = record.label(field);
    let labels = schema.labels(field);
    for label in &labels {
        let selected = if *label == current { " selected" } else { "" };
        writeln!(
            out,
            "<option value=\"{0}\"{selected}>{0}</option>",
            escape(label)
        )?;
    }
    // Keep a submitted label visible even when the schema does not know it.
    if !labels.contains(&current) {
        writeln!(
            out,
            "<option value=\"{0}\" selected>{0}</option>",
            escape(current)
        )?;
    }

    writeln!(out, "</select>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use incomeclass::{EncodedRecord, FeatureEncoder, IncomeBracket};

    fn encoded(record: &FeatureRecord) -> EncodedRecord {
        FeatureEncoder::default().encode(record).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<=50K"), "&lt;=50K");
        assert_eq!(escape("a\"b'c&"), "a&quot;b&#39;c&amp;");
    }

    #[test]
    fn test_form_lists_schema_labels() {
        let schema = EncodingSchema::builtin();
        let html = render(&schema, &FeatureRecord::default(), Outcome::Empty);

        for field in CategoricalField::all() {
            for label in schema.labels(field) {
                assert!(html.contains(&format!("<option value=\"{}\"", escape(label))));
            }
        }
        assert!(html.contains("<option value=\"Private\" selected>"));
        assert!(html.contains("<option value=\"United-States\" selected>"));
        assert!(html.contains("name=\"age\" min=\"18\" max=\"65\" step=\"1\" value=\"30\""));
        assert!(!html.contains("id=\"prediction\""));
    }

    #[test]
    fn test_batch_section_has_previews() {
        let html = render(&EncodingSchema::builtin(), &FeatureRecord::default(), Outcome::Empty);

        let input = html.find("<div id=\"batch-input-preview\">").unwrap();
        let output = html.find("<div id=\"batch-output-preview\">").unwrap();
        let download = html.find("<a id=\"batch-download\"").unwrap();
        assert!(input < output && output < download);
        assert!(html.contains("const PREVIEW_ROWS = 5;"));
        assert!(html.contains("showPreview(outputPreview, \"Predictions:\", text);"));
    }

    #[test]
    fn test_prediction_shown() {
        let record = FeatureRecord::default();
        let prediction = Prediction {
            encoded: encoded(&record),
            bracket: IncomeBracket::Above,
            probability: 0.8,
        };
        let html = render(
            &EncodingSchema::builtin(),
            &record,
            Outcome::Prediction(&prediction),
        );
        assert!(html.contains("Prediction: <strong>&gt;50K</strong>"));
        assert!(html.contains("0.800"));
    }

    #[test]
    fn test_problems_keep_entered_values() {
        let record = FeatureRecord {
            age: 99,
            workclass: "Freelance<script>".to_string(),
            ..FeatureRecord::default()
        };
        let problems = vec!["Age must be between 18 and 65, got 99".to_string()];
        let html = render(
            &EncodingSchema::builtin(),
            &record,
            Outcome::Problems(&problems),
        );

        assert!(html.contains("<li>Age must be between 18 and 65, got 99</li>"));
        assert!(html.contains("value=\"99\""));
        assert!(html.contains("<option value=\"Freelance&lt;script&gt;\" selected>"));
        assert!(!html.contains("Freelance<script>"));
    }
}
