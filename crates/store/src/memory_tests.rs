use super::*;
use serde_json::json;

fn event(id: &str, source: &str) -> CloudEvent {
    CloudEvent::new(id, source, "t")
}

async fn seeded() -> MemoryEventStore {
    // the A/B/A arrangement used across the read scenarios
    let store = MemoryEventStore::new();
    store.append(event("1", "A")).await.unwrap();
    store.append(event("2", "B")).await.unwrap();
    store.append(event("3", "A")).await.unwrap();
    store
}

fn sequences(records: &[CloudEventRecord]) -> Vec<u64> {
    records.iter().map(|r| r.sequence).collect()
}

#[tokio::test]
async fn append_assigns_increasing_gap_free_sequences() {
    let store = MemoryEventStore::new();
    for i in 0..5 {
        let record = store.append(event(&format!("e{i}"), "s")).await.unwrap();
        assert_eq!(record.sequence, i + 1);
    }
}

#[tokio::test]
async fn duplicate_identity_is_rejected() {
    let store = MemoryEventStore::new();
    store.append(event("a", "s")).await.unwrap();
    let err = store.append(event("a", "s")).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEvent { .. }));
}

#[tokio::test]
async fn forward_read_from_start() {
    let store = seeded().await;
    let records = store.read(ReadRequest::forwards(10).from_offset(0)).await.unwrap();
    assert_eq!(sequences(&records), vec![1, 2, 3]);
    // offset 0 and no offset read the same range forwards
    let records = store.read(ReadRequest::forwards(10)).await.unwrap();
    assert_eq!(sequences(&records), vec![1, 2, 3]);
}

#[tokio::test]
async fn forward_read_from_offset_and_budget() {
    let store = seeded().await;
    let records = store.read(ReadRequest::forwards(1).from_offset(2)).await.unwrap();
    assert_eq!(sequences(&records), vec![2]);
}

#[tokio::test]
async fn backward_read_defaults_to_stream_end() {
    let store = seeded().await;
    let records = store.read(ReadRequest::backwards(2)).await.unwrap();
    assert_eq!(sequences(&records), vec![3, 2]);
}

#[tokio::test]
async fn backward_read_from_offset() {
    let store = seeded().await;
    let records = store.read(ReadRequest::backwards(10).from_offset(2)).await.unwrap();
    assert_eq!(sequences(&records), vec![2, 1]);
}

#[tokio::test]
async fn read_past_the_end_is_empty_not_an_error() {
    let store = seeded().await;
    let meta = store.stream_metadata().await.unwrap();
    let past = meta.last_sequence.unwrap() + 1;
    let records = store.read(ReadRequest::forwards(10).from_offset(past)).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn reads_are_restartable() {
    let store = seeded().await;
    let request = ReadRequest::forwards(2).from_offset(1);
    let first = store.read(request).await.unwrap();
    let second = store.read(request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn partition_read_is_the_matching_subsequence() {
    let store = seeded().await;
    let partition = PartitionReference::by_source("A");
    let records =
        store.read_partition(&partition, ReadRequest::forwards(10).from_offset(0)).await.unwrap();
    assert_eq!(sequences(&records), vec![1, 3]);
    assert!(records.iter().all(|r| r.event.source == "A"));
}

#[tokio::test]
async fn partition_read_backwards_reverses_members() {
    let store = seeded().await;
    let partition = PartitionReference::by_source("A");
    let records = store.read_partition(&partition, ReadRequest::backwards(10)).await.unwrap();
    assert_eq!(sequences(&records), vec![3, 1]);
}

#[tokio::test]
async fn partition_offsets_are_global_sequences() {
    let store = seeded().await;
    let partition = PartitionReference::by_source("A");
    let records =
        store.read_partition(&partition, ReadRequest::forwards(10).from_offset(2)).await.unwrap();
    assert_eq!(sequences(&records), vec![3]);
}

#[tokio::test]
async fn unpopulated_partition_read_fails() {
    let store = seeded().await;
    let err = store
        .read_partition(&PartitionReference::by_source("nope"), ReadRequest::forwards(10))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::PartitionNotFound(_)));
}

#[tokio::test]
async fn correlation_partition_tracks_extension() {
    let store = MemoryEventStore::new();
    store.append(event("a", "s").with_extension("correlationid", "corr-1")).await.unwrap();
    store.append(event("b", "s")).await.unwrap();
    let partition = PartitionReference::new(PartitionType::ByCorrelationId, "corr-1");
    let records = store.read_partition(&partition, ReadRequest::forwards(10)).await.unwrap();
    assert_eq!(sequences(&records), vec![1]);
}

#[tokio::test]
async fn stream_metadata_counts_everything() {
    let store = seeded().await;
    let meta = store.stream_metadata().await.unwrap();
    assert_eq!(meta.first_sequence, Some(1));
    assert_eq!(meta.last_sequence, Some(3));
    assert_eq!(meta.length, 3);
}

#[tokio::test]
async fn partition_metadata_is_idempotent() {
    let store = seeded().await;
    let partition = PartitionReference::by_source("A");
    let first = store.partition_metadata(&partition).await.unwrap();
    let second = store.partition_metadata(&partition).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.first_sequence, 1);
    assert_eq!(first.last_sequence, 3);
    assert_eq!(first.length, 2);
}

#[tokio::test]
async fn list_partition_ids_by_kind() {
    let store = seeded().await;
    assert_eq!(store.list_partition_ids(PartitionType::BySource).await.unwrap(), vec!["A", "B"]);
    assert_eq!(store.list_partition_ids(PartitionType::ByType).await.unwrap(), vec!["t"]);
    assert!(store.list_partition_ids(PartitionType::BySubject).await.unwrap().is_empty());
}

#[tokio::test]
async fn sequencing_round_trip_exposes_sequence_attribute() {
    let store = MemoryEventStore::with_sequencing(SequencingConfig::attribute("sequence"));
    store.append(event("a", "s")).await.unwrap();
    let records = store.read(ReadRequest::forwards(1)).await.unwrap();
    assert_eq!(records[0].event.extension("sequence"), Some(&json!(1)));
}

#[tokio::test]
async fn length_zero_still_returns_one_record() {
    let store = seeded().await;
    let records = store.read(ReadRequest::forwards(0)).await.unwrap();
    assert_eq!(sequences(&records), vec![1]);
}

#[tokio::test]
async fn concurrent_appends_stay_gap_free() {
    let store = MemoryEventStore::new();
    let mut handles = Vec::new();
    for task in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                store.append(event(&format!("{task}-{i}"), "s")).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    let records = store.read(ReadRequest::forwards(1_000)).await.unwrap();
    assert_eq!(sequences(&records), (1..=200).collect::<Vec<u64>>());
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn appends_are_gap_free_for_any_event_mix(
            sources in proptest::collection::vec("[a-c]", 1..40),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            runtime.block_on(async {
                let store = MemoryEventStore::new();
                for (i, source) in sources.iter().enumerate() {
                    let record = store
                        .append(CloudEvent::new(format!("e{i}"), source.clone(), "t"))
                        .await
                        .map_err(|e| TestCaseError::fail(e.to_string()))?;
                    prop_assert_eq!(record.sequence, i as u64 + 1);
                }
                let meta = store
                    .stream_metadata()
                    .await
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(meta.length, sources.len() as u64);
                Ok(())
            })?;
        }
    }
}
