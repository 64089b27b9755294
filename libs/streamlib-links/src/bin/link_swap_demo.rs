// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Wires a camera → display link and a camera → network sink link, keeps
//! producer and consumer threads running, hot-swaps both links to their next
//! generation, then prints a registry snapshot and tears down.
//!
//! `RUST_LOG=streamlib_links=debug cargo run --bin link_swap_demo`

use std::path::Path;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, select, tick};
use tracing_subscriber::EnvFilter;

use streamlib_links::{
    AllocatorConfig, AllocatorSnapshot, LinkAllocator, LinkId, LinkInput, LinkInputDataReader,
    LinkOutput, LinkPortAddress, StaticTopology, SwapOutcome,
};

fn spawn_producer(
    output: LinkOutput<u64>,
    stop: Receiver<()>,
) -> thread::JoinHandle<u64> {
    thread::spawn(move || {
        let ticker = tick(Duration::from_micros(200));
        let mut next = 0u64;
        loop {
            select! {
                recv(stop) -> _ => return next,
                recv(ticker) -> _ => {
                    if output.write(next) {
                        next += 1;
                    }
                }
            }
        }
    })
}

fn spawn_display(input: LinkInput<u64>, stop: Receiver<()>) -> thread::JoinHandle<u64> {
    thread::spawn(move || {
        let mut received = 0u64;
        loop {
            if stop.try_recv().is_ok() {
                return received;
            }
            match input.read() {
                Some(_) => received += 1,
                None => thread::yield_now(),
            }
        }
    })
}

fn spawn_network_sink(reader: LinkInputDataReader<u64>) -> thread::JoinHandle<u64> {
    thread::spawn(move || {
        let mut sent = 0u64;
        loop {
            match reader.read() {
                Some(_) => sent += 1,
                None if !reader.is_connected() => return sent,
                None => thread::sleep(Duration::from_micros(50)),
            }
        }
    })
}

/// The snapshot is the demo's user-facing output.
#[allow(clippy::disallowed_macros)]
fn print_snapshot(snapshot: &AllocatorSnapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AllocatorConfig::load_or_default(Path::new("."));
    let topology = StaticTopology::new(["camera"], ["camera", "display", "rtp_sink"]);
    let mut allocator = LinkAllocator::new(&topology, config);

    let camera_video = LinkPortAddress::new("camera", "video_out");
    let camera_stream = LinkPortAddress::new("camera", "stream_out");
    let display_in = LinkPortAddress::new("display", "video_in");
    let rtp_in = LinkPortAddress::new("rtp_sink", "rtp_in");

    let video_out = LinkOutput::<u64>::at(&camera_video);
    let video_in = LinkInput::<u64>::at(&display_in);
    let stream_out = LinkOutput::<u64>::at(&camera_stream);

    let video_id = LinkId::for_ports(&camera_video, &display_in, 0);
    let stream_id = LinkId::for_ports(&camera_stream, &rtp_in, 0);

    allocator.bind(
        Some(&video_out),
        Some(&video_in),
        allocator.new_link(video_id.clone()),
    )?;

    let stream_link = allocator.new_link(stream_id.clone());
    let sink_reader = stream_link.reader();
    allocator.bind(Some(&stream_out), None, stream_link)?;

    let gate = allocator.readiness();
    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

    let workers = {
        let gate = gate.clone();
        let (video_out, video_in, stream_out) =
            (video_out.clone(), video_in.clone(), stream_out.clone());
        let stop_rx = stop_rx.clone();
        thread::spawn(move || {
            gate.wait_until_ready();
            (
                spawn_producer(video_out, stop_rx.clone()),
                spawn_display(video_in, stop_rx.clone()),
                spawn_producer(stream_out, stop_rx),
            )
        })
    };

    allocator.mark_ready();
    let (video_producer, display, stream_producer) = workers
        .join()
        .map_err(|_| anyhow::anyhow!("worker launcher panicked"))?;
    let first_sink = spawn_network_sink(sink_reader);

    thread::sleep(Duration::from_millis(50));

    let outcome = allocator.swap(
        &video_out,
        Some(&video_in),
        allocator.new_link(video_id.next_generation()),
    )?;
    if let SwapOutcome::HandedOff(retired) = outcome {
        tracing::info!("Display link {} retired with {} queued", retired.link_id(), retired.len());
    }

    let next_stream = allocator.new_link(stream_id.next_generation());
    let second_sink = spawn_network_sink(next_stream.reader());
    allocator.swap(&stream_out, None, next_stream)?;

    thread::sleep(Duration::from_millis(50));

    print_snapshot(&allocator.snapshot())?;

    // One stop message per worker that listens for it.
    for _ in 0..3 {
        stop_tx.send(())?;
    }
    let produced = video_producer.join().map_err(|_| anyhow::anyhow!("producer panicked"))?;
    let displayed = display.join().map_err(|_| anyhow::anyhow!("display panicked"))?;
    let streamed = stream_producer.join().map_err(|_| anyhow::anyhow!("producer panicked"))?;

    allocator.request_exit();
    let released = allocator.teardown();
    let sent_first = first_sink.join().map_err(|_| anyhow::anyhow!("sink panicked"))?;
    let sent_second = second_sink.join().map_err(|_| anyhow::anyhow!("sink panicked"))?;

    tracing::info!(
        "video: produced {} displayed {}; stream: produced {} sent {}; released {} links",
        produced,
        displayed,
        streamed,
        sent_first + sent_second,
        released
    );
    Ok(())
}
