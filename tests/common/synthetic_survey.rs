use sidescan_mosaic::ping::{Ping, PingTime};
use sidescan_mosaic::types::GeoPoint;

/// Builds a survey running due north: `fix_count` navigation fixes, each
/// held for `pings_per_fix` pings, roughly 2.2 m apart on the ground.
pub fn northbound_survey(fix_count: usize, pings_per_fix: usize, samples: usize) -> Vec<Ping> {
    let mut pings = Vec::with_capacity(fix_count * pings_per_fix);
    for fix in 0..fix_count {
        let geo = GeoPoint {
            lon: 39.65,
            lat: 59.2 + fix as f64 * 2e-5,
        };
        for rep in 0..pings_per_fix {
            let index = fix * pings_per_fix + rep;
            let time = PingTime {
                year: 2024,
                month: 5,
                day: 14,
                hour: 9,
                minute: 30 + (fix / 60) as u32,
                second: (fix % 60) as u32,
                hseconds: 0,
            };
            let starboard: Vec<f32> = (0..samples)
                .map(|s| {
                    let fall_off = 1.0 - s as f32 / samples as f32;
                    ((s as f32 * 0.31 + index as f32 * 0.07).sin() * 0.5 + 0.5) * fall_off
                })
                .collect();
            let port: Vec<f32> = starboard.iter().rev().copied().collect();
            pings.push(
                Ping::new(index, time, geo, port, starboard, 25.0).expect("valid synthetic ping"),
            );
        }
    }
    pings
}
