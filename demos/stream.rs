//! Stream position/quaternion frames from the bird to stdout.
//!
//! Usage: cargo run --example stream [port]
//! Press Ctrl+C to stop.

use std::time::{Duration, Instant};

use flockbird::{DataFormat, Fob, SessionConfig};

fn main() {
    env_logger::init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| SessionConfig::DEFAULT_PORT.to_string());

    let mut bird = Fob::standalone();
    if let Err(e) = bird.open(SessionConfig::for_port(&port)) {
        eprintln!("Failed to open bird on {}: {}", port, e);
        std::process::exit(1);
    }

    if let Err(e) = bird
        .set_data_format(DataFormat::PositionQuaternion)
        .and_then(|()| bird.start_streaming())
    {
        eprintln!("Failed to start streaming: {}", e);
        std::process::exit(1);
    }

    println!("Streaming (Ctrl+C to stop)...");

    let start = Instant::now();
    let mut count: u64 = 0;
    let mut last_report = Instant::now();

    loop {
        if let Err(e) = bird.refresh() {
            eprintln!("Error: {}", e);
            break;
        }
        count += 1;

        // Print every ~25th frame to avoid flooding the terminal
        if count % 25 == 1 {
            let frame = bird.frame();
            let [x, y, z] = frame.position();
            let q = frame.quaternion();
            println!(
                "pos=[{:+.3}, {:+.3}, {:+.3}]  quat=[{:+.3}, {:+.3}, {:+.3}, {:+.3}]",
                x, y, z, q[0], q[1], q[2], q[3],
            );
        }

        // Report rate every 3 seconds
        let now = Instant::now();
        if now.duration_since(last_report) >= Duration::from_secs(3) {
            let elapsed = start.elapsed().as_secs_f64();
            println!("--- {} frames in {:.1}s ({:.1} Hz) ---", count, elapsed, count as f64 / elapsed);
            last_report = now;
        }
    }

    if let Err(e) = bird.stop_streaming().and_then(|()| bird.close()) {
        eprintln!("Failed to shut the bird down: {}", e);
    }
}
