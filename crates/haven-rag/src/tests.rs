//! Snapshot tests for RAG components

#[cfg(test)]
mod snapshot_tests {
    use crate::{record_document, LocalVectorStore, RAGEngine, RAGQuery, SafetyRAGEngine, VectorStore};
    use haven_core::{Kind, LocationRecord};
    use insta::assert_yaml_snapshot;
    use std::sync::Arc;

    #[test]
    fn test_threat_document_metadata_snapshot() {
        let record = LocationRecord::new(Kind::MissileStrike, "Ashkelon", 31.67, 34.57)
            .with_intensity(0.65)
            .with_source("data/heat.csv");
        let doc = record_document(&record, "location_7");

        assert_yaml_snapshot!(doc.metadata, @r###"
        ---
        category: threat
        city: Ashkelon
        intensity: 0.65
        kind: missile_strike
        lat: 31.67
        lon: 34.57
        source: data/heat.csv
        threat_level: HIGH
        "###);
    }

    #[test]
    fn test_embassy_document_content_snapshot() {
        let record = LocationRecord::new(Kind::Embassy, "Jerusalem", 31.77, 35.21)
            .with_source("data/embassies.csv");
        let doc = record_document(&record, "location_0");
        let lines: Vec<&str> = doc.content.lines().collect();

        assert_yaml_snapshot!(lines, @r###"
        ---
        - "EMBASSY - Jerusalem (31.77, 35.21)"
        - Safe diplomatic facility. Contact for citizen services and emergency assistance.
        - "Source: data/embassies.csv"
        "###);
    }

    #[tokio::test]
    async fn test_engine_stats_snapshot() {
        let mut store = LocalVectorStore::new();
        store.connect().await.unwrap();
        let mut engine = SafetyRAGEngine::new(Arc::new(store));
        engine.initialize().await.unwrap();

        engine
            .index(&[
                LocationRecord::new(Kind::Shelter, "Haifa", 32.79, 34.99),
                LocationRecord::new(Kind::Bunker, "Haifa", 32.80, 34.98),
            ])
            .await
            .unwrap();

        let stats = engine.stats().await.unwrap();
        assert_yaml_snapshot!(stats, @r###"
        ---
        documents: 2
        embedding_model: ~
        initialized: true
        mode: lexical
        "###);

        let result = engine.retrieve(&RAGQuery::new("shelter in Haifa")).await.unwrap();
        assert_eq!(result.documents[0].metadata["kind"], "shelter");
    }
}
