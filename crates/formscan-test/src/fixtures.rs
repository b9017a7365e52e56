//! Sample inputs shared by tests across the workspace.

use bytes::Bytes;
use formscan_core::types::{
    Document, FieldSpec, FieldType, FormLanguage, MediaKind, OcrResult, RegionConfidence, Schema,
    TableRegion,
};

/// OCR text of a filled-in English form.
pub const ENGLISH_FORM_TEXT: &str = "\
National Insurance Institute
Request for medical treatment for a work injury
Last name: Cohen   First name: Dana
ID number: 123456782
Date of birth: 02/03/1985
Mobile phone: 0501234567
P.O. box:";

/// OCR text of a filled-in Hebrew form.
pub const HEBREW_FORM_TEXT: &str = "\
המוסד לביטוח לאומי
בקשה למתן טיפול רפואי לנפגע עבודה
שם משפחה: כהן   שם פרטי: דנה
ת.ז. 123456782
טלפון נייד 0501234567";

/// A one-page PDF stand-in; only the signature matters to the pipeline.
pub fn pdf_document() -> Document {
    Document::new(Bytes::from_static(b"%PDF-1.7\n%fixture\n"), MediaKind::Pdf)
        .with_filename("form-283.pdf")
}

/// A small English schema covering every field type.
pub fn english_schema() -> Schema {
    let gender = FieldType::EnumChoice {
        choices: vec!["male".to_owned(), "female".to_owned()],
    };
    let fields = vec![
        FieldSpec::required("lastName", FieldType::String),
        FieldSpec::required("idNumber", FieldType::IdNumber),
        FieldSpec::required("mobilePhone", FieldType::Phone),
        FieldSpec::required("dateOfBirth", FieldType::Date),
        FieldSpec::required("gender", gender),
        FieldSpec::optional("poBox", FieldType::String),
    ];

    Schema::new(FormLanguage::English, fields)
        .map(|schema| schema.with_expected_regions(true))
        .unwrap_or_else(|error| panic!("fixture schema is invalid: {error}"))
}

/// OCR output for [`ENGLISH_FORM_TEXT`] with one table, checkboxes and
/// per-word confidences.
pub fn english_ocr_result() -> OcrResult {
    let mut table = TableRegion::empty("t0", 2, 2);
    table.set_cell(0, 0, "Last name");
    table.set_cell(0, 1, "Cohen");
    table.set_cell(1, 0, "ID number");
    table.set_cell(1, 1, "123456782");

    OcrResult::from_text(ENGLISH_FORM_TEXT)
        .with_table(table)
        .with_checkbox("male", false)
        .with_checkbox("female", true)
        .with_region(RegionConfidence::new("p1:w0", "Cohen", 0.98))
        .with_region(RegionConfidence::new("p1:w1", "123456782", 0.91))
        .with_region(RegionConfidence::new("p1:w2", "02/03/1985", 0.87))
        .with_region(RegionConfidence::new("p1:w3", "0501234567", 0.95))
}

/// A well-formed model reply for [`english_schema`].
pub const ENGLISH_REPLY: &str = r#"{
    "lastName": "Cohen",
    "idNumber": "123456782",
    "mobilePhone": "0501234567",
    "dateOfBirth": "02/03/1985",
    "gender": "female",
    "poBox": null
}"#;
