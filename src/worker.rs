//! Persistent worker loop.
//!
//! Services framed build requests off the process's standard streams until
//! the input reaches a clean end-of-stream. Each iteration is fully
//! independent; the only state carried across requests is the archive
//! cache of mounted source jars.

use std::io::{self, Read, Write};

use jdtb_protocol::{read_message, write_message, ProtocolError, WorkRequest, WorkResponse};

use crate::builder::BuildCycle;
use crate::compiler::JavaCompiler;
use crate::extract::ArchiveCache;

/// Long-lived worker servicing many requests over one process lifetime.
pub struct WorkerLoop<C: JavaCompiler> {
    compiler: C,
    archives: ArchiveCache,
}

impl<C: JavaCompiler> WorkerLoop<C> {
    pub fn new(compiler: C) -> Self {
        Self {
            compiler,
            archives: ArchiveCache::new(),
        }
    }

    /// Run against the process's standard streams.
    pub fn run(&mut self) -> Result<(), ProtocolError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with_io(&mut stdin.lock(), &mut stdout.lock())
    }

    /// Run against arbitrary streams (the test seam).
    ///
    /// Returns `Ok(())` on clean end-of-stream. Any framing or I/O error on
    /// the protocol stream is unrecoverable and bubbles up for the caller
    /// to turn into a non-zero process exit. A failure inside a build cycle
    /// is not: it becomes a failed response and the loop keeps serving.
    pub fn run_with_io<R: Read, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<(), ProtocolError> {
        while let Some(request) = read_message::<_, WorkRequest>(reader)? {
            let result = BuildCycle::new(&self.compiler, &mut self.archives)
                .run(&request.arguments);

            // The caller may start tearing down the working tree the
            // instant it sees the response. The cycle has already dropped
            // every per-request resource by this point; run the cache
            // release hook before a single response byte is written.
            self.archives.release();

            let response = WorkResponse::for_request(request.request_id, result.ok, result.output);
            write_message(writer, &response)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Compiler that records invocations; the loop tests never compile.
    struct RejectingCompiler;

    impl JavaCompiler for RejectingCompiler {
        fn compile(&self, _command: &str, _stdout: &mut String, stderr: &mut String) -> bool {
            stderr.push_str("unexpected compile\n");
            false
        }
    }

    fn frame_request(buf: &mut Vec<u8>, request_id: i32, arguments: &[&str]) {
        let request = WorkRequest {
            arguments: arguments.iter().map(|s| s.to_string()).collect(),
            request_id,
        };
        write_message(buf, &request).unwrap();
    }

    fn decode_responses(bytes: Vec<u8>) -> Vec<WorkResponse> {
        let mut reader = Cursor::new(bytes);
        let mut responses = Vec::new();
        while let Some(response) = read_message::<_, WorkResponse>(&mut reader).unwrap() {
            responses.push(response);
        }
        responses
    }

    #[test]
    fn empty_stream_terminates_cleanly() {
        let mut worker = WorkerLoop::new(RejectingCompiler);
        let mut reader = Cursor::new(Vec::new());
        let mut output = Vec::new();
        worker.run_with_io(&mut reader, &mut output).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn bad_request_fails_without_killing_the_worker() {
        let mut input = Vec::new();
        frame_request(&mut input, 5, &["--output", "out.jar"]); // no label
        frame_request(&mut input, 6, &["--bogus_flag"]);

        let mut worker = WorkerLoop::new(RejectingCompiler);
        let mut reader = Cursor::new(input);
        let mut output = Vec::new();
        worker.run_with_io(&mut reader, &mut output).unwrap();

        let responses = decode_responses(output);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].request_id, 5);
        assert_eq!(responses[0].exit_code, 1);
        assert!(responses[0].output.contains("--target_label"));
        assert_eq!(responses[1].request_id, 6);
        assert!(responses[1].output.contains("--bogus_flag"));
    }

    #[test]
    fn corrupt_frame_is_fatal() {
        let mut worker = WorkerLoop::new(RejectingCompiler);
        let mut reader = Cursor::new(vec![0u8, 0, 0]);
        let mut output = Vec::new();
        let err = worker.run_with_io(&mut reader, &mut output).unwrap_err();
        assert!(matches!(err, ProtocolError::TruncatedFrame { .. }));
    }
}
