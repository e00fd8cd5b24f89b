//! Read a single position/angles frame from the bird in point mode.
//!
//! Usage: cargo run --example point [port]

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

    println!("Port:          {}", bird.port());
    println!("Baud rate:     {}", bird.baud_rate());
    println!("Data format:   {:?}", bird.data_format());
    println!();

    if let Err(e) = bird
        .set_data_format(DataFormat::PositionAngles)
        .and_then(|()| bird.refresh())
    {
        eprintln!("Failed to read a frame: {}", e);
        std::process::exit(1);
    }

    let frame = bird.frame();
    let [x, y, z] = frame.position();
    println!("pos   = [{:+.3}, {:+.3}, {:+.3}] (range {} in)", x, y, z, frame.scaling());
    println!(
        "az/el/roll = [{:+.1}, {:+.1}, {:+.1}] deg",
        frame.azimuth_degrees(),
        frame.elevation_degrees(),
        frame.roll_degrees(),
    );
    println!(
        "raw   = [{}, {}, {}] [{}, {}, {}]",
        frame.raw_x(),
        frame.raw_y(),
        frame.raw_z(),
        frame.raw_azimuth(),
        frame.raw_elevation(),
        frame.raw_roll(),
    );

    if let Err(e) = bird.close() {
        eprintln!("Failed to close bird: {}", e);
    }
}
