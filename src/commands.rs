use anyhow::Context;
use std::ffi::OsStr;
use std::process::Command;
use tracing::{info, warn};

/// Runs an external tool to completion with a fixed argument vector.
///
/// Output is not captured and a non-zero exit status is not an error: the
/// reference-preparation steps have a fire-and-forget contract where the
/// caller never branches on tool success, so a failing `samtools` invocation
/// only produces a warning. Failing to *launch* the program at all (missing
/// binary, permission denied) does propagate to the caller.
pub fn run_tool<S: AsRef<OsStr>>(program: &str, args: &[S]) -> anyhow::Result<()> {
    info!(
        "[running] {} {}",
        program,
        args.iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    );
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("could not launch `{program}`; is it on your PATH?"))?;
    if !status.success() {
        warn!("`{}` exited with {}", program, status);
    }
    Ok(())
}
