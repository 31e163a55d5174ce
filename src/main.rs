use std::time::Instant;

use anyhow::{ensure, Context};
use bytemuck::cast_slice;
use rand::{Rng as _, SeedableRng};
use staged_bitonic::BitonicSorter;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt as _},
    BufferAddress, BufferUsages, CommandEncoderDescriptor, MapMode,
};

use crate::wgpu_context::WgpuContext;

mod wgpu_context;

const DATA_LEN: usize = 1024 * 512;

#[tokio::main]
async fn main() {
    run().await.expect("failed to run");
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let ctx = WgpuContext::new()
        .await
        .context("failed to initialize wgpu context")?;

    let mut rng = rand::rngs::SmallRng::from_entropy();
    let data: Vec<i32> = (0..DATA_LEN).map(|_| rng.gen()).collect();

    let data_buffer = ctx.device.create_buffer_init(&BufferInitDescriptor {
        label: Some("data_buffer"),
        contents: cast_slice(&data),
        usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
    });

    let data_map_buffer = ctx.device.create_buffer_init(&BufferInitDescriptor {
        label: Some("data_map_buffer"),
        contents: cast_slice(&data),
        usage: BufferUsages::COPY_DST | BufferUsages::MAP_READ,
    });

    let sorter = BitonicSorter::new(
        &ctx.device,
        &data_buffer,
        "value: i32",
        "a.value > b.value",
    );

    let start = Instant::now();
    sorter
        .sort(&ctx.device, &ctx.queue, DATA_LEN as u32)
        .context("failed to encode sort")?;

    let mut encoder = ctx
        .device
        .create_command_encoder(&CommandEncoderDescriptor { label: None });
    encoder.copy_buffer_to_buffer(
        &data_buffer,
        0,
        &data_map_buffer,
        0,
        (DATA_LEN * 4) as BufferAddress,
    );
    ctx.queue.submit([encoder.finish()]);

    let slice = data_map_buffer.slice(..);
    slice.map_async(MapMode::Read, |_| {});
    ctx.device.poll(wgpu::MaintainBase::Wait).panic_on_timeout();

    let elapsed = start.elapsed();

    let view = slice.get_mapped_range();
    let sorted: &[i32] = cast_slice(&view);

    ensure!(
        sorted.windows(2).all(|pair| pair[0] <= pair[1]),
        "result is not sorted"
    );

    info!("sorted {DATA_LEN} elements in {elapsed:?}");

    Ok(())
}
