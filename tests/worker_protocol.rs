//! Worker-mode protocol integration tests.
//!
//! Feed framed request streams through the worker loop and check the
//! framed responses, exactly as the orchestrator would observe them.

use std::fs;
use std::io::Cursor;

use jdt_java_builder::{JavaCompiler, WorkerLoop};
use jdtb_protocol::{read_message, write_message, WorkRequest, WorkResponse};

/// Compiler that always reports success without doing anything; the loop
/// tests care about framing and sequencing, not compilation.
struct NoopCompiler;

impl JavaCompiler for NoopCompiler {
    fn compile(&self, _command: &str, _stdout: &mut String, _stderr: &mut String) -> bool {
        true
    }
}

fn framed(requests: &[(i32, Vec<String>)]) -> Vec<u8> {
    let mut buf = Vec::new();
    for (request_id, arguments) in requests {
        let request = WorkRequest {
            arguments: arguments.clone(),
            request_id: *request_id,
        };
        write_message(&mut buf, &request).unwrap();
    }
    buf
}

fn decode_all(bytes: Vec<u8>) -> Vec<WorkResponse> {
    let mut reader = Cursor::new(bytes);
    let mut responses = Vec::new();
    while let Some(response) = read_message::<_, WorkResponse>(&mut reader).unwrap() {
        responses.push(response);
    }
    responses
}

fn resource_only_request(tmp: &std::path::Path, name: &str) -> Vec<String> {
    let output_jar = tmp.join(format!("{name}.jar"));
    vec![
        "--target_label".to_string(),
        format!("//pkg:{name}"),
        "--output".to_string(),
        output_jar.to_string_lossy().into_owned(),
    ]
}

#[test]
fn two_requests_answered_in_order_with_matching_ids() {
    let tmp = tempfile::tempdir().unwrap();
    let input = framed(&[
        (1, resource_only_request(tmp.path(), "First")),
        (2, resource_only_request(tmp.path(), "Second")),
    ]);

    let mut worker = WorkerLoop::new(NoopCompiler);
    let mut reader = Cursor::new(input);
    let mut output = Vec::new();
    worker.run_with_io(&mut reader, &mut output).unwrap();

    let responses = decode_all(output);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].request_id, 1);
    assert_eq!(responses[0].exit_code, 0);
    assert_eq!(responses[1].request_id, 2);
    assert_eq!(responses[1].exit_code, 0);

    // Both cycles really ran: each left its own staging tree and jar.
    assert!(tmp.path().join("_jdt/First/classes").is_dir());
    assert!(tmp.path().join("_jdt/Second/classes").is_dir());
    assert!(tmp.path().join("First.jar").exists());
    assert!(tmp.path().join("Second.jar").exists());
}

#[test]
fn requests_sharing_a_worker_see_fresh_staging() {
    let tmp = tempfile::tempdir().unwrap();
    let request = resource_only_request(tmp.path(), "Same");
    let input = framed(&[(1, request.clone()), (2, request)]);

    let mut worker = WorkerLoop::new(NoopCompiler);
    let mut reader = Cursor::new(input.clone());
    let mut output = Vec::new();

    // Plant a stale artifact where the first cycle will stage; the second
    // cycle's reset must clear whatever the first one left.
    let stale = tmp.path().join("_jdt/Same/classes/Stale.class");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, b"stale").unwrap();

    worker.run_with_io(&mut reader, &mut output).unwrap();

    let responses = decode_all(output);
    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| r.exit_code == 0));
    assert!(!stale.exists());
}

#[test]
fn config_failure_is_answered_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let input = framed(&[
        (7, vec!["--output".to_string(), "no-label.jar".to_string()]),
        (8, resource_only_request(tmp.path(), "After")),
    ]);

    let mut worker = WorkerLoop::new(NoopCompiler);
    let mut reader = Cursor::new(input);
    let mut output = Vec::new();
    worker.run_with_io(&mut reader, &mut output).unwrap();

    let responses = decode_all(output);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].request_id, 7);
    assert_eq!(responses[0].exit_code, 1);
    assert!(responses[0].output.contains("--target_label"));
    assert_eq!(responses[1].request_id, 8);
    assert_eq!(responses[1].exit_code, 0);
}

#[test]
fn trailing_garbage_after_valid_request_kills_the_loop() {
    let tmp = tempfile::tempdir().unwrap();
    let mut input = framed(&[(1, resource_only_request(tmp.path(), "Ok"))]);
    input.extend_from_slice(&[0, 0]); // half a length prefix

    let mut worker = WorkerLoop::new(NoopCompiler);
    let mut reader = Cursor::new(input);
    let mut output = Vec::new();
    let err = worker.run_with_io(&mut reader, &mut output).unwrap_err();
    assert!(err.to_string().contains("frame"));

    // The valid request was still answered before the stream died.
    let responses = decode_all(output);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].request_id, 1);
}
