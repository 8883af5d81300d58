//! Location records as retrievable documents

use serde_json::{json, Value};

use haven_core::{Category, Kind, LocationRecord, VectorDocument};
use haven_geo::{classify_with, level_label, MissingIntensity};

const DEFAULT_SOURCE: &str = "data";

/// Convert one record into a document with safety guidance for its kind
pub fn record_document(record: &LocationRecord, id: impl Into<String>) -> VectorDocument {
    VectorDocument {
        id: id.into(),
        content: document_content(record),
        embedding: None,
        metadata: document_metadata(record),
        score: None,
    }
}

/// One document per record, ids numbered in table order
pub fn record_documents(records: &[LocationRecord]) -> Vec<VectorDocument> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| record_document(record, format!("location_{}", i)))
        .collect()
}

fn document_content(record: &LocationRecord) -> String {
    let source = record.source.as_deref().unwrap_or(DEFAULT_SOURCE);
    let place = match &record.name {
        Some(name) if name != &record.city => format!("{}, {}", name, record.city),
        _ => record.city.clone(),
    };
    let header = format!("{} ({}, {})", place, record.lat, record.lon);

    let body = match (&record.kind, record.category()) {
        (Kind::Bunker, _) => format!(
            "BUNKER - {}\nMaximum protection from rockets/explosions. Go here during alerts.",
            header
        ),
        (Kind::Shelter, _) => format!(
            "SHELTER - {}\nGood protection during air raids. Stay until all-clear.",
            header
        ),
        (Kind::Embassy, _) => format!(
            "EMBASSY - {}\nSafe diplomatic facility. Contact for citizen services and emergency assistance.",
            header
        ),
        (kind, Category::Threat) => {
            let level = level_label(classify_with(record.intensity, MissingIntensity::TreatAsZero));
            format!(
                "{} - {}\nThreat level {}. AVOID AREA. Call 100 (Police) and follow Home Front Command instructions.",
                kind.display_name().to_uppercase(),
                header,
                level
            )
        }
        (kind, _) => format!(
            "LOCATION - {}\nType: {} - Location information available",
            header, kind
        ),
    };

    let mut content = body;
    if let Some(description) = &record.description {
        content.push_str(&format!("\nDetails: {}", description));
    }
    content.push_str(&format!("\nSource: {}", source));
    content
}

fn document_metadata(record: &LocationRecord) -> Value {
    let mut metadata = json!({
        "kind": record.kind.as_str(),
        "city": record.city,
        "lat": record.lat,
        "lon": record.lon,
        "category": record.category().as_str(),
        "source": record.source.as_deref().unwrap_or(DEFAULT_SOURCE),
    });

    if record.category() == Category::Threat {
        let level = classify_with(record.intensity, MissingIntensity::TreatAsZero);
        metadata["intensity"] = json!(record.intensity);
        metadata["threat_level"] = json!(level_label(level));
    }

    if let Some(name) = &record.name {
        metadata["name"] = json!(name);
    }

    metadata
}
