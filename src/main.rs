use std::path::Path;

use sidescan_mosaic::config::load_config;
use sidescan_mosaic::ping::{Ping, PingTime};
use sidescan_mosaic::prelude::*;

fn main() {
    env_logger::init();

    // Optional config file argument; defaults otherwise.
    let params = match std::env::args().nth(1) {
        Some(path) => match load_config(Path::new(&path)).and_then(|cfg| {
            MosaicParams::try_from(cfg).map_err(|e| e.to_string())
        }) {
            Ok(params) => params,
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        },
        None => MosaicParams::default(),
    };

    // Demo stub: builds a short synthetic survey and assembles its mosaic
    // in memory.
    let samples = 128usize;
    let mut pings = Vec::new();
    for i in 0..200usize {
        let t = PingTime {
            year: 2024,
            month: 5,
            day: 14,
            hour: 9,
            minute: 30,
            second: (i / 4) as u32,
            hseconds: 0,
        };
        // One navigation fix per four pings, track running north.
        let geo = GeoPoint {
            lon: 39.65,
            lat: 59.2 + (i / 4) as f64 * 2e-5,
        };
        let amplitude: Vec<f32> = (0..samples)
            .map(|s| ((s as f32 * 0.2).sin() * 0.5 + 0.5) * (1.0 - s as f32 / samples as f32))
            .collect();
        let port: Vec<f32> = amplitude.iter().rev().copied().collect();
        pings.push(Ping::new(i, t, geo, port, amplitude, 25.0).expect("valid synthetic ping"));
    }

    let pipeline = MosaicPipeline::new(params);
    let abort = AbortToken::new();
    let files = vec![SurveyFile::new("demo", pings)];

    match pipeline.run(files, &abort, &mut LogProgress) {
        Ok(reports) => {
            for r in &reports {
                println!(
                    "{}: {} pings -> {} stripes, canvas {}x{} px (zone {})",
                    r.name, r.pings, r.stripes, r.canvas_width, r.canvas_height, r.projection_zone
                );
            }
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
