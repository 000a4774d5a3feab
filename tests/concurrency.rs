mod common;

use std::sync::Arc;

use common::{OWNER, engines};
use ragstore::{ChunkInput, RetrievalError};
use uuid::Uuid;

fn five_chunks() -> Vec<ChunkInput> {
    (0..5)
        .map(|i| ChunkInput::new(format!("chunk {}", i), vec![1.0, i as f32]))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingests_of_one_document() {
    for engine in engines(false) {
        let ingestion = engine.ingestion_service.clone();
        let file_id = Uuid::new_v4();

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let ingestion = ingestion.clone();
                tokio::spawn(async move {
                    ingestion
                        .ingest(file_id, "race.pdf", OWNER, five_chunks())
                        .await
                })
            })
            .collect();

        let results: Vec<_> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let winners = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(winners, 1, "backend {}", engine.backend);
        for result in results.iter().filter(|result| result.is_err()) {
            assert_eq!(result, &Err(RetrievalError::AlreadyIngested(file_id)));
        }
        assert_eq!(engine.chunk_store.get_by_document(file_id).await.unwrap().len(), 5);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_racing_ingest_is_all_or_nothing() {
    for engine in engines(false) {
        for _ in 0..10 {
            let file_id = Uuid::new_v4();
            let ingestion = engine.ingestion_service.clone();
            let lifecycle = engine.lifecycle_service.clone();

            let ingest = tokio::spawn(async move {
                ingestion
                    .ingest(file_id, "race.pdf", OWNER, five_chunks())
                    .await
            });
            let delete =
                tokio::spawn(async move { lifecycle.delete_document(file_id, OWNER).await });

            let ingest = ingest.await.unwrap();
            let delete = delete.await.unwrap();
            assert!(ingest.is_ok(), "backend {}", engine.backend);

            let remaining = engine.chunk_store.get_by_document(file_id).await.unwrap();
            let document = engine.chunk_store.find_document(file_id).await.unwrap();
            match delete {
                Ok(deleted) => {
                    assert_eq!(deleted.chunks_removed, 5);
                    assert!(remaining.is_empty());
                    assert!(document.is_none());
                }
                Err(error) => {
                    assert_eq!(error, RetrievalError::NotFound(file_id));
                    assert_eq!(remaining.len(), 5);
                    assert!(document.is_some());
                }
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_batches() {
    for engine in engines(false) {
        let engine = Arc::new(engine);
        let writer = {
            let engine = engine.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    engine
                        .ingestion_service
                        .ingest(Uuid::new_v4(), "batch.pdf", OWNER, five_chunks())
                        .await
                        .unwrap();
                }
            })
        };

        while !writer.is_finished() {
            let hits = engine
                .search_service
                .search(&[1.0, 2.0], OWNER, None, 1000)
                .await;
            match hits {
                Ok(hits) => assert_eq!(hits.len() % 5, 0, "backend {}", engine.backend),
                Err(error) => panic!("search failed: {}", error),
            }
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();

        assert_eq!(engine.chunk_store.count().await.unwrap(), 100);
    }
}
