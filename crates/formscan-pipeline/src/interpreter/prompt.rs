//! Prompts for schema-constrained field extraction.

use std::fmt::Write;

use formscan_core::types::{OcrResult, Schema};

pub(super) const PREAMBLE: &str = "\
You extract information from Israeli National Insurance (ביטוח לאומי) form 283, \
a request for medical treatment for a work injury, given its OCR output.
Extract only the values the person filled in, never the printed labels or instructions.
Rules:
1. Empty fields: if nothing was filled in, use null. Do not guess or borrow nearby text.
2. Signature: only report an actual signature, not a printed name from elsewhere on the form.
3. Dates: DD/MM/YYYY with zero padding, for example 02/03/1985.
4. ID numbers: read left to right and keep all 9 or 10 digits.
5. Phones: Israeli mobile numbers start with 05; landlines start with 0 and an area code.
6. Checkboxes: report a choice only if its box is marked [x].
7. The medical institution section at the bottom is separate from the claimant's details.
Always answer with a single JSON object and nothing else.";

const PROMPT_EXTRACT: &str = "\
Extract the filled-in values from the form below.
Use exactly these keys, one per field, and no others:";

const PROMPT_ANSWER: &str = "\
Answer with one JSON object using only the keys listed above. \
Every value is a string or null; use null for any field that was not filled in.";

const PROMPT_RETRY: &str = "\
Your previous answer could not be used";

const PROMPT_RETRY_RULES: &str = "\
This time reply with exactly one flat JSON object: the listed keys only, \
string or null values only, no nested objects or arrays, no code fences, no commentary.";

/// Builds the user prompt for the first attempt.
pub(super) fn build(ocr: &OcrResult, schema: &Schema) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "{}", PROMPT_EXTRACT);
    for field in schema.fields() {
        let required = if field.required { "required" } else { "optional" };
        let _ = write!(prompt, "- {} ({}, {})", quote(&field.name), field.field_type, required);
        if let Some(choices) = field.field_type.choices() {
            let _ = write!(prompt, "; one of: {}", choices.join(", "));
        }
        prompt.push('\n');
    }

    prompt.push('\n');
    render_ocr(&mut prompt, ocr);

    let _ = writeln!(prompt, "\n{}", PROMPT_ANSWER);
    render_template(&mut prompt, schema);
    prompt
}

/// Builds the stricter user prompt for the corrective attempt.
pub(super) fn build_retry(ocr: &OcrResult, schema: &Schema, failure: &str) -> String {
    let mut prompt = build(ocr, schema);
    let _ = write!(prompt, "\n{}: {}\n{}", PROMPT_RETRY, failure, PROMPT_RETRY_RULES);
    prompt
}

fn render_ocr(prompt: &mut String, ocr: &OcrResult) {
    let _ = writeln!(prompt, "=== OCR TEXT ===\n{}", ocr.raw_text.trim());

    if !ocr.tables.is_empty() {
        prompt.push_str("\n=== TABLES ===\n");
        for table in &ocr.tables {
            let _ = writeln!(prompt, "Table {}:", table.id());
            for row in table.rows() {
                let _ = writeln!(prompt, "| {} |", row.join(" | "));
            }
        }
    }

    if !ocr.checkboxes.is_empty() {
        prompt.push_str("\n=== CHECKBOXES ===\n");
        for (label, checked) in &ocr.checkboxes {
            let mark = if *checked { "[x]" } else { "[ ]" };
            let _ = writeln!(prompt, "{} {}", mark, label);
        }
    }

    if !ocr.key_value_pairs.is_empty() {
        prompt.push_str("\n=== KEY-VALUE PAIRS ===\n");
        for pair in &ocr.key_value_pairs {
            let _ = writeln!(prompt, "{} → {}", pair.key, pair.value);
        }
    }
}

fn render_template(prompt: &mut String, schema: &Schema) {
    prompt.push_str("{\n");
    let count = schema.fields().len();
    for (index, name) in schema.field_names().enumerate() {
        let comma = if index + 1 < count { "," } else { "" };
        let _ = writeln!(prompt, "  {}: null{}", quote(name), comma);
    }
    prompt.push_str("}\n");
}

fn quote(name: &str) -> String {
    serde_json::Value::from(name).to_string()
}

#[cfg(test)]
mod tests {
    use formscan_core::types::{KeyValuePair, OcrResult};
    use formscan_test::fixtures;

    use super::*;

    #[test]
    fn test_prompt_lists_fields_and_context() {
        let schema = fixtures::english_schema();
        let mut ocr = fixtures::english_ocr_result();
        ocr.key_value_pairs.push(KeyValuePair {
            key: "City".into(),
            value: "Haifa".into(),
            confidence: None,
        });

        let prompt = build(&ocr, &schema);
        assert!(prompt.contains(r#"- "idNumber" (id-number, required)"#));
        assert!(prompt.contains(r#"- "gender" (enum-choice, required); one of: male, female"#));
        assert!(prompt.contains(r#"- "poBox" (string, optional)"#));
        assert!(prompt.contains("| ID number | 123456782 |"));
        assert!(prompt.contains("[x] female"));
        assert!(prompt.contains("[ ] male"));
        assert!(prompt.contains("City → Haifa"));
        assert!(prompt.contains("  \"poBox\": null\n}"));
    }

    #[test]
    fn test_prompt_without_regions() {
        let prompt = build(&OcrResult::from_text("hello"), &fixtures::english_schema());
        assert!(!prompt.contains("=== TABLES ==="));
        assert!(!prompt.contains("=== CHECKBOXES ==="));
    }

    #[test]
    fn test_retry_prompt_quotes_failure() {
        let prompt = build_retry(
            &OcrResult::from_text("hello"),
            &fixtures::english_schema(),
            "reply is not valid JSON",
        );
        assert!(prompt.contains("could not be used: reply is not valid JSON"));
        assert!(prompt.contains("no nested objects"));
    }
}
