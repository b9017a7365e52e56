//! Built-in schemas for National Insurance form 283.
//!
//! Nested form sections are flattened into dotted names, and each date is a
//! single `DD/MM/YYYY` field.

use formscan_core::types::{FieldSpec, FieldType, FormLanguage};

/// Field layout shared by both language variants.
///
/// Each entry is `(english, hebrew, type, required)`.
const LAYOUT: &[(&str, &str, Kind, bool)] = &[
    ("lastName", "שם משפחה", Kind::Text, true),
    ("firstName", "שם פרטי", Kind::Text, true),
    ("idNumber", "מספר זהות", Kind::Id, true),
    ("gender", "מין", Kind::Gender, true),
    ("dateOfBirth", "תאריך לידה", Kind::Date, true),
    ("address.street", "כתובת.רחוב", Kind::Text, true),
    ("address.houseNumber", "כתובת.מספר בית", Kind::Text, true),
    ("address.entrance", "כתובת.כניסה", Kind::Text, false),
    ("address.apartment", "כתובת.דירה", Kind::Text, false),
    ("address.city", "כתובת.ישוב", Kind::Text, true),
    ("address.postalCode", "כתובת.מיקוד", Kind::Text, false),
    ("address.poBox", "כתובת.תא דואר", Kind::Text, false),
    ("landlinePhone", "טלפון קווי", Kind::Phone, false),
    ("mobilePhone", "טלפון נייד", Kind::Phone, true),
    ("jobType", "סוג העבודה", Kind::Text, true),
    ("dateOfInjury", "תאריך הפגיעה", Kind::Date, true),
    ("timeOfInjury", "שעת הפגיעה", Kind::Text, true),
    ("accidentLocation", "מקום התאונה", Kind::Text, true),
    ("accidentAddress", "כתובת מקום התאונה", Kind::Text, true),
    ("accidentDescription", "תיאור התאונה", Kind::Text, true),
    ("injuredBodyPart", "האיבר שנפגע", Kind::Text, true),
    ("signature", "חתימה", Kind::Text, true),
    ("formFillingDate", "תאריך מילוי הטופס", Kind::Date, true),
    ("formReceiptDateAtClinic", "תאריך קבלת הטופס בקופה", Kind::Date, false),
    (
        "medicalInstitutionFields.healthFundMember",
        "למילוי ע\"י המוסד הרפואי.חבר בקופת חולים",
        Kind::HealthFund,
        false,
    ),
    (
        "medicalInstitutionFields.natureOfAccident",
        "למילוי ע\"י המוסד הרפואי.מהות התאונה",
        Kind::Text,
        false,
    ),
    (
        "medicalInstitutionFields.medicalDiagnoses",
        "למילוי ע\"י המוסד הרפואי.אבחנות רפואיות",
        Kind::Text,
        false,
    ),
];

#[derive(Clone, Copy)]
enum Kind {
    Text,
    Id,
    Phone,
    Date,
    Gender,
    HealthFund,
}

impl Kind {
    fn field_type(self, language: FormLanguage) -> FieldType {
        let choices = |english: &[&str], hebrew: &[&str]| {
            let names = match language {
                FormLanguage::English => english,
                FormLanguage::Hebrew => hebrew,
            };
            FieldType::EnumChoice {
                choices: names.iter().map(|c| (*c).to_owned()).collect(),
            }
        };

        match self {
            Kind::Text => FieldType::String,
            Kind::Id => FieldType::IdNumber,
            Kind::Phone => FieldType::Phone,
            Kind::Date => FieldType::Date,
            Kind::Gender => choices(&["male", "female"], &["זכר", "נקבה"]),
            Kind::HealthFund => choices(
                &["clalit", "maccabi", "meuhedet", "leumit"],
                &["כללית", "מכבי", "מאוחדת", "לאומית"],
            ),
        }
    }
}

/// Fields of the built-in schema for `language`, in form order.
pub fn fields(language: FormLanguage) -> Vec<FieldSpec> {
    LAYOUT
        .iter()
        .map(|(english, hebrew, kind, required)| {
            let name = match language {
                FormLanguage::English => *english,
                FormLanguage::Hebrew => *hebrew,
            };
            FieldSpec::new(name, kind.field_type(language), *required)
        })
        .collect()
}
