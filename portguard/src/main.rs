use anyhow::Context as _;
use aya::programs::XdpFlags;
use clap::Parser;
use log::{info, warn};
use tokio::signal;

use portguard::{codec, lifecycle, loader, resolver, trace};

#[derive(Debug, Parser)]
struct Opt {
    /// name of the interface to guard
    iface: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    env_logger::init();

    let addr = resolver::local_ipv4(&opt.iface)?;
    let local_address = codec::encode_local_address(addr);
    info!("setting local_address to: {addr} ({local_address:#010x})");

    let mut program = loader::LoadedProgram::load(loader::DEFAULT_OBJECT_PATH)
        .context("failed to load the XDP object")?;
    let reader = trace::open_trace_pipe()
        .await
        .context("failed to open the kernel trace channel")?;

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
        }
    };

    lifecycle::run(
        &mut program,
        &opt.iface,
        XdpFlags::default(),
        local_address,
        reader,
        &mut std::io::stdout(),
        shutdown,
    )
    .await?;

    info!("done");
    Ok(())
}
