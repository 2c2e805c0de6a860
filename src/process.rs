use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::info;

/// Final state of an external process: its exit status plus the combined,
/// line-interleaved stdout and stderr.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub output: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run a command to completion, forwarding every output line to the log as it
/// arrives while also capturing it. Install and build steps can run for a long
/// time, so the operator sees progress instead of a silent block.
pub fn run_streaming(mut command: Command, label: &'static str) -> std::io::Result<CommandOutcome> {
    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = command.spawn()?;

    let Some(stdout) = child.stdout.take() else {
        return Err(std::io::Error::other("child stdout was not captured"));
    };
    let Some(stderr) = child.stderr.take() else {
        return Err(std::io::Error::other("child stderr was not captured"));
    };

    let captured = Arc::new(Mutex::new(String::new()));

    let stderr_sink = captured.clone();
    let stderr_reader =
        thread::spawn(move || drain(BufReader::new(stderr), label, "stderr", &stderr_sink));
    drain(BufReader::new(stdout), label, "stdout", &captured);
    let _ = stderr_reader.join();

    let status = child.wait()?;
    let output = captured.lock().map(|buf| buf.clone()).unwrap_or_default();

    Ok(CommandOutcome {
        exit_code: status.code().unwrap_or(-1),
        output,
    })
}

fn drain<R: BufRead>(reader: R, label: &'static str, stream: &'static str, sink: &Mutex<String>) {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        info!(source = label, stream, "{line}");
        if let Ok(mut buf) = sink.lock() {
            buf.push_str(&line);
            buf.push('\n');
        }
    }
}
