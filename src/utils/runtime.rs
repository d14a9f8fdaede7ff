use anyhow::Result;

/// Every tracker mutation happens on this one thread; persistence runs as a task beside it.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
