use quillpost_core::BlogSettings;

// Use mimalloc as the global allocator for lower fragmentation under
// image-sized allocations.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let settings = BlogSettings::from_env()?;

    let (state, router) = quillpost_api::setup::initialize_app(settings).await?;

    quillpost_api::setup::server::start_server(&state, router).await?;

    Ok(())
}
