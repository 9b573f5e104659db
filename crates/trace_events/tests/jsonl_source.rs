#![cfg(feature = "tokio")]

use std::io::Write;

use trace_events::{
    reconstruct_chains, ChainOptions, EventType, FetchOptions, JsonlTraceSource, TraceSource,
    TraceSourceError,
};

const MIXED_SCHEMAS: &str = r#"
{"event":"session_start","timestamp":1700000000,"session_id":"s1"}
{"event":"message_in","timestamp":1700000001,"session_id":"s1","text":"please grep for x"}
{"type":"tool.call","version":2,"ts":"2023-11-14T22:13:22Z","session":"s1","data":{"toolName":"grep","params":{"q":"x"}}}
{"type":"tool.result","ts":"2023-11-14T22:13:23Z","session":"s1","data":{"toolName":"grep","error":"not found"}}
this line is garbage
{"event":"message_out","timestamp":1700000004,"session_id":"s1","content":"nothing matched"}
{"event":"message_in","timestamp":1700000900,"session_id":"s1","text":"try again later"}
{"event":"message_in","timestamp":1700000002,"session_id":"s2","text":"hello"}
{"event":"custom.metric","timestamp":1700000003,"session_id":"s2"}
"#;

fn write_trace(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write trace");
    file
}

#[tokio::test]
async fn fetch_normalizes_mixed_schemas_and_skips_garbage() {
    let file = write_trace(MIXED_SCHEMAS);
    let source = JsonlTraceSource::new(file.path());

    assert_eq!(
        source.session_ids().await.unwrap(),
        vec!["s1".to_string(), "s2".to_string()]
    );

    let events = source.fetch("s1", &FetchOptions::default()).await.unwrap();
    let kinds: Vec<_> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        vec![
            EventType::SessionStart,
            EventType::MessageIn,
            EventType::ToolCall,
            EventType::ToolResult,
            EventType::MessageOut,
            EventType::MessageIn,
        ]
    );
    assert!(events[3].is_tool_error());
    assert_eq!(events[2].tool_name(), Some("grep"));

    let chains = reconstruct_chains(events, ChainOptions::default());
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].len(), 5);
    assert_eq!(chains[1].chain_id, "s1:main:1");
}

#[tokio::test]
async fn unknown_types_survive_normalization() {
    let file = write_trace(MIXED_SCHEMAS);
    let source = JsonlTraceSource::new(file.path());
    let events = source.fetch("s2", &FetchOptions::default()).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].event_type, EventType::Unknown);

    let chains = reconstruct_chains(events, ChainOptions::default());
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].len(), 1);
}

#[tokio::test]
async fn snapshot_serves_fetches_without_rereading_the_file() {
    let file = write_trace(MIXED_SCHEMAS);
    let source = JsonlTraceSource::new(file.path());
    let snapshot = source.snapshot().await.unwrap();
    let path = file.path().to_path_buf();
    file.close().unwrap();

    assert_eq!(snapshot.session_ids(), vec!["s1".to_string(), "s2".to_string()]);
    let s1 = snapshot.fetch("s1", &FetchOptions::default()).await.unwrap();
    assert_eq!(s1.len(), 6);
    assert!(matches!(
        JsonlTraceSource::new(path).fetch("s1", &FetchOptions::default()).await,
        Err(TraceSourceError::Read { .. })
    ));
}

#[tokio::test]
async fn time_window_is_inclusive() {
    let file = write_trace(MIXED_SCHEMAS);
    let source = JsonlTraceSource::new(file.path());
    let options = FetchOptions {
        since: Some(1_700_000_001_000),
        until: Some(1_700_000_003_000),
        limit: None,
    };
    let events = source.fetch("s1", &options).await.unwrap();
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonlTraceSource::new(dir.path().join("absent.jsonl"));
    let err = source
        .fetch("s1", &FetchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TraceSourceError::Read { .. }));
}
