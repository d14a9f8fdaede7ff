use anyhow::Result;
use tracing::error;
use zendoro::{cli::run_cli, utils::runtime::single_thread_runtime};

fn main() -> Result<()> {
    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(run_cli()).inspect_err(|e| {
        error!("Error running cli {e:?}");
    });
    // Stdin is read on a blocking thread which would otherwise wait for one more line.
    runtime.shutdown_background();
    result
}
