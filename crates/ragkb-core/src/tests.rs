//! Snapshot tests for core types

#[cfg(test)]
mod snapshot_tests {
    use crate::{ChunkingConfig, IngestReport, IngestStatus, RetrievalConfig, StoreStats};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_chunking_config_snapshot() {
        assert_yaml_snapshot!(ChunkingConfig::default(), @r###"
        chunk_size: 500
        overlap: 50
        "###);
    }

    #[test]
    fn test_retrieval_config_snapshot() {
        assert_yaml_snapshot!(RetrievalConfig::default(), @"top_k: 5");
    }

    #[test]
    fn test_ingest_report_snapshot() {
        let report = IngestReport {
            documents: 1,
            chunks: 1,
            inserted: 1,
            cleared: 0,
            status: IngestStatus::Success,
        };

        assert_yaml_snapshot!(report, @r###"
        documents: 1
        chunks: 1
        inserted: 1
        cleared: 0
        status: success
        "###);
    }

    #[test]
    fn test_no_documents_report_snapshot() {
        assert_yaml_snapshot!(IngestReport::no_documents(3), @r###"
        documents: 0
        chunks: 0
        inserted: 0
        cleared: 3
        status: no_documents
        "###);
    }

    #[test]
    fn test_store_stats_snapshot() {
        let stats = StoreStats {
            total_chunks: 10,
            total_documents: 4,
            backend: "json-file".to_string(),
            location: "kb/chunks.json".to_string(),
        };

        assert_yaml_snapshot!(stats, @r###"
        total_chunks: 10
        total_documents: 4
        backend: json-file
        location: kb/chunks.json
        "###);
    }
}
